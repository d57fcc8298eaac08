//! Routing of inbound messages to state transitions
//!
//! The [`UpdateDispatcher`] is synchronous: every call takes the injected
//! [`DashboardContext`], applies exactly one transition and returns the
//! [`ViewUpdate`]s a view needs to reflect it. Timers and I/O live in
//! [`crate::dashboard`]; nothing here awaits.

use crate::channel::ChannelState;
use crate::error::{DashboardError, Result};
use crate::message::ChannelMessage;
use crate::model::{
    AgentOpinion, AggregatedDecision, NewsItem, Portfolio, RiskAssessment, RunStatus,
    StatusSnapshot,
};
use crate::state::{AnalysisPhase, DashboardContext, LogEntry};
use tracing::{debug, info, warn};

/// Where initial data came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Live,
    /// Built-in demonstration data, used when the backend call failed
    Demo,
}

/// A change the view layer should render
#[derive(Debug, Clone, PartialEq)]
pub enum ViewUpdate {
    Channel(ChannelState),
    Portfolio {
        portfolio: Portfolio,
        source: DataSource,
    },
    News {
        items: Vec<NewsItem>,
        source: DataSource,
    },
    /// Feeds and recommendations were cleared for a new run
    RunStarted,
    Status(LogEntry),
    Opinion(AgentOpinion),
    Risk(RiskAssessment),
    Progress(f64),
    Recommendations(String),
    /// Complete result from a status poll; replaces what the feeds showed
    FullResult {
        opinions: Vec<AgentOpinion>,
        risks: Vec<RiskAssessment>,
        recommendations: String,
    },
    Phase(AnalysisPhase),
    /// User-visible notice, e.g. an error message
    Notice(String),
}

#[derive(Debug, Default)]
pub struct UpdateDispatcher {
    dropped: u64,
}

impl UpdateDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames discarded because they could not be parsed
    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Parse and apply one text frame. Malformed frames are dropped.
    pub fn dispatch_text(&mut self, ctx: &mut DashboardContext, text: &str) -> Vec<ViewUpdate> {
        match ChannelMessage::parse(text) {
            Ok(message) => self.dispatch(ctx, message),
            Err(e) => {
                self.dropped += 1;
                warn!(error = %e, "dropping malformed channel frame");
                Vec::new()
            }
        }
    }

    pub fn dispatch(&mut self, ctx: &mut DashboardContext, message: ChannelMessage) -> Vec<ViewUpdate> {
        debug!(kind = message.kind(), "dispatching channel message");
        match message {
            ChannelMessage::Status { message, stage } => self.on_status(ctx, message, stage),
            ChannelMessage::AgentOpinion(opinion) => self.on_agent_opinion(ctx, opinion),
            ChannelMessage::AggregatedDecision(decision) => self.on_aggregated_decision(&decision),
            ChannelMessage::RiskAssessment(risk) => self.on_risk_assessment(ctx, risk),
            ChannelMessage::FinalRecommendations(text) => self.on_final_recommendations(ctx, text),
            ChannelMessage::Error { message } => self.on_error(ctx, message),
            ChannelMessage::Pong => {
                debug!("keepalive acknowledged");
                Vec::new()
            }
            ChannelMessage::Unknown { kind } => {
                debug!(%kind, "ignoring unknown message type");
                Vec::new()
            }
        }
    }

    fn on_status(
        &mut self,
        ctx: &mut DashboardContext,
        message: String,
        stage: Option<String>,
    ) -> Vec<ViewUpdate> {
        ctx.state.set_status(message.clone(), stage);
        let entry = LogEntry::now(message);
        ctx.discussion.push_log(entry.clone());
        vec![ViewUpdate::Status(entry)]
    }

    fn on_agent_opinion(&mut self, ctx: &mut DashboardContext, opinion: AgentOpinion) -> Vec<ViewUpdate> {
        ctx.discussion.push_opinion(opinion.clone());
        vec![ViewUpdate::Opinion(opinion)]
    }

    fn on_aggregated_decision(&mut self, decision: &AggregatedDecision) -> Vec<ViewUpdate> {
        info!(
            ticker = %decision.ticker,
            action = %decision.final_action,
            confidence = decision.confidence_score,
            consensus = decision.consensus_strength,
            "aggregated decision"
        );
        Vec::new()
    }

    fn on_risk_assessment(&mut self, ctx: &mut DashboardContext, risk: RiskAssessment) -> Vec<ViewUpdate> {
        ctx.risks.push(risk.clone());
        vec![ViewUpdate::Risk(risk)]
    }

    fn on_final_recommendations(&mut self, ctx: &mut DashboardContext, text: String) -> Vec<ViewUpdate> {
        ctx.recommendations.clone_from(&text);
        let mut updates = vec![ViewUpdate::Recommendations(text)];
        updates.extend(complete_run(ctx));
        updates
    }

    fn on_error(&mut self, ctx: &mut DashboardContext, message: Option<String>) -> Vec<ViewUpdate> {
        let updates = fail_run(ctx, message);
        log_server_failure(ctx);
        updates
    }

    /// Reflect a channel lifecycle change
    pub fn channel_changed(&mut self, ctx: &mut DashboardContext, state: ChannelState) -> Vec<ViewUpdate> {
        ctx.channel_state = state;
        vec![ViewUpdate::Channel(state)]
    }

    /// Start a new run. Returns `None` while a run is already in flight, in
    /// which case nothing was touched and no request should be sent.
    pub fn begin_run(&mut self, ctx: &mut DashboardContext) -> Option<Vec<ViewUpdate>> {
        if !ctx.state.begin() {
            debug!("analysis already running, ignoring start request");
            return None;
        }
        ctx.cancel_poller();
        ctx.clear_run();
        info!("analysis run started");
        Some(vec![
            ViewUpdate::RunStarted,
            ViewUpdate::Progress(ctx.progress.value()),
            ViewUpdate::Phase(AnalysisPhase::Analyzing),
        ])
    }

    /// Apply the outcome of `POST /api/start_analysis`
    ///
    /// On success nothing changes here; the caller starts the poller if the
    /// run is still in flight.
    pub fn acknowledge_start(&mut self, ctx: &mut DashboardContext, result: Result<()>) -> Vec<ViewUpdate> {
        match result {
            Ok(()) => {
                debug!("start request acknowledged");
                Vec::new()
            }
            Err(e) => {
                warn!(error = %e, "start request failed");
                fail_run(ctx, Some(format!("Failed to start analysis: {e}")))
            }
        }
    }

    /// Apply one status poll
    pub fn apply_poll(&mut self, ctx: &mut DashboardContext, result: Result<StatusSnapshot>) -> Vec<ViewUpdate> {
        match result {
            Ok(snapshot) => self.apply_status(ctx, snapshot),
            Err(e) => {
                warn!(error = %e, "status poll failed");
                Vec::new()
            }
        }
    }

    pub fn apply_status(&mut self, ctx: &mut DashboardContext, snapshot: StatusSnapshot) -> Vec<ViewUpdate> {
        match snapshot.status {
            RunStatus::Analyzing if ctx.state.is_busy() => {
                vec![ViewUpdate::Progress(ctx.progress.tick())]
            }
            RunStatus::Completed => {
                let StatusSnapshot {
                    agent_opinions,
                    risk_assessments,
                    final_recommendations,
                    ..
                } = snapshot;
                ctx.discussion.replace_opinions(agent_opinions.clone());
                ctx.risks.replace(risk_assessments.clone());
                ctx.recommendations.clone_from(&final_recommendations);

                let mut updates = vec![ViewUpdate::FullResult {
                    opinions: agent_opinions,
                    risks: risk_assessments,
                    recommendations: final_recommendations,
                }];
                updates.extend(complete_run(ctx));
                updates
            }
            RunStatus::Error => {
                let updates = fail_run(ctx, snapshot.error);
                log_server_failure(ctx);
                updates
            }
            RunStatus::Analyzing | RunStatus::Ready | RunStatus::Unknown => Vec::new(),
        }
    }
}

fn complete_run(ctx: &mut DashboardContext) -> Vec<ViewUpdate> {
    ctx.state.complete();
    ctx.cancel_poller();
    info!("analysis completed");
    vec![
        ViewUpdate::Progress(ctx.progress.finish()),
        ViewUpdate::Phase(AnalysisPhase::Completed),
    ]
}

fn fail_run(ctx: &mut DashboardContext, message: Option<String>) -> Vec<ViewUpdate> {
    let message = ctx.state.fail(message).to_string();
    ctx.cancel_poller();
    vec![
        ViewUpdate::Phase(AnalysisPhase::Error),
        ViewUpdate::Notice(message),
    ]
}

fn log_server_failure(ctx: &DashboardContext) {
    let err = DashboardError::ServerReported(ctx.state.error_message.clone().unwrap_or_default());
    warn!(error = %err, "analysis failed");
}
