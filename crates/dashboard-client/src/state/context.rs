//! The dashboard's mutable state, owned by the event loop

use super::analysis::AnalysisState;
use super::feed::{DiscussionFeed, RiskFeed};
use super::progress::ProgressMeter;
use crate::channel::ChannelState;
use crate::config::DashboardConfig;
use crate::model::{NewsItem, Portfolio};
use crate::scheduler::TaskHandle;
use tracing::debug;

/// Everything the dispatcher reads and writes
///
/// Exactly one task holds the context. Other tasks communicate with it
/// through events, never by sharing it.
#[derive(Debug)]
pub struct DashboardContext {
    pub state: AnalysisState,
    pub discussion: DiscussionFeed,
    pub risks: RiskFeed,
    /// Markdown; empty until a run completes
    pub recommendations: String,
    pub progress: ProgressMeter,
    pub portfolio: Portfolio,
    pub news: Vec<NewsItem>,
    pub channel_state: ChannelState,
    poller: Option<TaskHandle>,
}

impl DashboardContext {
    pub fn new(config: &DashboardConfig) -> Self {
        Self::with_progress(ProgressMeter::new(config.progress_cap, config.progress_step))
    }

    pub fn with_progress(progress: ProgressMeter) -> Self {
        Self {
            state: AnalysisState::new(),
            discussion: DiscussionFeed::new(),
            risks: RiskFeed::new(),
            recommendations: String::new(),
            progress,
            portfolio: Portfolio::default(),
            news: Vec::new(),
            channel_state: ChannelState::Disconnected,
            poller: None,
        }
    }

    /// Drop everything a previous run produced
    pub fn clear_run(&mut self) {
        self.discussion.clear();
        self.risks.clear();
        self.recommendations.clear();
        self.progress.reset();
    }

    /// Install the status poller, cancelling any previous one
    pub fn set_poller(&mut self, poller: TaskHandle) {
        self.cancel_poller();
        self.poller = Some(poller);
    }

    /// Stop the poller. Returns whether one was running.
    pub fn cancel_poller(&mut self) -> bool {
        match self.poller.take() {
            Some(poller) => {
                debug!(task = poller.name(), "stopping status poller");
                poller.cancel();
                true
            }
            None => false,
        }
    }

    pub fn has_poller(&self) -> bool {
        self.poller.is_some()
    }
}

impl Drop for DashboardContext {
    fn drop(&mut self) {
        self.cancel_poller();
    }
}
