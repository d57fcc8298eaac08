//! Analysis payloads pushed over the channel and returned by the status poll

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Trading action recommended by an agent
///
/// Servers are inconsistent about casing (`BUY`, `Buy`, `buy`); parsing is
/// case-insensitive and anything unrecognised is kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Action {
    Buy,
    Sell,
    #[default]
    Hold,
    Other(String),
}

impl From<String> for Action {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "buy" => Action::Buy,
            "sell" => Action::Sell,
            "hold" => Action::Hold,
            _ => Action::Other(raw),
        }
    }
}

impl From<Action> for String {
    fn from(action: Action) -> Self {
        action.to_string()
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::Hold => write!(f, "HOLD"),
            Action::Other(raw) => write!(f, "{raw}"),
        }
    }
}

/// Upper bound of confidence and risk scores
pub const MAX_SCORE: u8 = 10;

/// Read a 0–10 score; accepts integers or floats, clamps out-of-range values,
/// and treats `null` as 0.
fn score<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<f64>::deserialize(deserializer)?.unwrap_or_default();
    Ok(raw.round().clamp(0.0, f64::from(MAX_SCORE)) as u8)
}

/// One agent's opinion about one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentOpinion {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub agent_name: String,
    #[serde(default)]
    pub action: Action,
    #[serde(default, deserialize_with = "score")]
    pub confidence: u8,
    /// Markdown
    #[serde(default)]
    pub reasoning: String,
}

/// Consensus over all agents for one ticker
///
/// The dashboard never renders these; they are only logged.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AggregatedDecision {
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub final_action: String,
    #[serde(default)]
    pub confidence_score: f64,
    #[serde(default)]
    pub consensus_strength: f64,
}

/// Risk evaluation for one ticker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    #[serde(default)]
    pub ticker: String,
    #[serde(default, deserialize_with = "score")]
    pub risk_level: u8,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub recommendations: String,
}

impl RiskAssessment {
    /// Coarse label used by the views
    pub fn band(&self) -> RiskBand {
        match self.risk_level {
            0..=3 => RiskBand::Low,
            4..=6 => RiskBand::Medium,
            _ => RiskBand::High,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Medium,
    High,
}

/// Server-side run status reported by `GET /api/status`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    #[default]
    Ready,
    Analyzing,
    Completed,
    Error,
    #[serde(other)]
    Unknown,
}

/// Body of `GET /api/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default)]
    pub agent_opinions: Vec<AgentOpinion>,
    #[serde(default)]
    pub aggregated_decisions: Vec<AggregatedDecision>,
    #[serde(default)]
    pub risk_assessments: Vec<RiskAssessment>,
    #[serde(default)]
    pub final_recommendations: String,
    #[serde(default)]
    pub error: Option<String>,
}
