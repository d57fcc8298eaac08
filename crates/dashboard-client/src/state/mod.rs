//! State owned by the dashboard event loop

pub mod analysis;
pub mod context;
pub mod feed;
pub mod progress;

pub use analysis::{AnalysisPhase, AnalysisState, GENERIC_FAILURE};
pub use context::DashboardContext;
pub use feed::{DiscussionEntry, DiscussionFeed, LogEntry, RiskFeed, TickerGroup};
pub use progress::ProgressMeter;
