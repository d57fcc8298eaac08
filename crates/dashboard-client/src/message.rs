//! Messages received over the live update channel
//!
//! Every frame is a JSON record `{type, message?, status?, data?}`. The
//! `type` tag selects a [`ChannelMessage`] variant; tags the dashboard does
//! not know land in [`ChannelMessage::Unknown`] instead of failing.

use crate::error::{DashboardError, Result};
use crate::model::{AgentOpinion, AggregatedDecision, RiskAssessment};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Text the client sends as a keepalive; the server answers with `pong`
pub const PING: &str = "ping";

/// Raw frame envelope
#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct FinalPayload {
    #[serde(default)]
    recommendations: String,
}

/// A classified inbound channel message
#[derive(Debug, Clone, PartialEq)]
pub enum ChannelMessage {
    /// Progress line; `stage` is the server's sub-stage tag when present
    Status {
        message: String,
        stage: Option<String>,
    },
    AgentOpinion(AgentOpinion),
    AggregatedDecision(AggregatedDecision),
    RiskAssessment(RiskAssessment),
    FinalRecommendations(String),
    /// Server-side run failure; `message` is absent when the server sent none
    Error {
        message: Option<String>,
    },
    /// Reply to a keepalive ping
    Pong,
    /// A tag this client does not handle
    Unknown {
        kind: String,
    },
}

impl ChannelMessage {
    /// Parse one text frame
    pub fn parse(text: &str) -> Result<Self> {
        let envelope: Envelope = serde_json::from_str(text)
            .map_err(|e| DashboardError::MalformedMessage(e.to_string()))?;
        Self::from_envelope(envelope)
    }

    fn from_envelope(envelope: Envelope) -> Result<Self> {
        let Envelope {
            kind,
            message,
            status,
            data,
        } = envelope;

        let message = match kind.as_str() {
            "status" => ChannelMessage::Status {
                message: message.or_else(|| status.clone()).unwrap_or_default(),
                stage: status,
            },
            "agent_opinion" => ChannelMessage::AgentOpinion(payload(&kind, data)?),
            "aggregated_decision" => ChannelMessage::AggregatedDecision(payload(&kind, data)?),
            "risk_assessment" => ChannelMessage::RiskAssessment(payload(&kind, data)?),
            "final_recommendations" => {
                let body: FinalPayload = payload(&kind, data)?;
                ChannelMessage::FinalRecommendations(body.recommendations)
            }
            "error" => ChannelMessage::Error {
                message: message
                    .or_else(|| data.as_ref().and_then(error_text))
                    .filter(|m| !m.trim().is_empty()),
            },
            "pong" => ChannelMessage::Pong,
            _ => ChannelMessage::Unknown { kind },
        };

        Ok(message)
    }

    /// The wire tag of this message
    pub fn kind(&self) -> &str {
        match self {
            ChannelMessage::Status { .. } => "status",
            ChannelMessage::AgentOpinion(_) => "agent_opinion",
            ChannelMessage::AggregatedDecision(_) => "aggregated_decision",
            ChannelMessage::RiskAssessment(_) => "risk_assessment",
            ChannelMessage::FinalRecommendations(_) => "final_recommendations",
            ChannelMessage::Error { .. } => "error",
            ChannelMessage::Pong => "pong",
            ChannelMessage::Unknown { kind } => kind.as_str(),
        }
    }
}

/// Decode `data`; a missing payload decodes as `{}` so optional-field
/// defaults apply.
fn payload<T: DeserializeOwned>(kind: &str, data: Option<Value>) -> Result<T> {
    let data = data.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
    serde_json::from_value(data)
        .map_err(|e| DashboardError::MalformedMessage(format!("{kind} payload: {e}")))
}

fn error_text(data: &Value) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| data.get(key).and_then(Value::as_str))
        .map(str::to_string)
}
