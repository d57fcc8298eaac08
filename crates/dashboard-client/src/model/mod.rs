//! Wire data model shared by the channel, the REST client and the views

pub mod analysis;
pub mod market;
pub mod report;

pub use analysis::{
    Action, AgentOpinion, AggregatedDecision, MAX_SCORE, RiskAssessment, RiskBand, RunStatus,
    StatusSnapshot,
};
pub use market::{NewsItem, Portfolio, Position, Sentiment};
pub use report::{
    BACKTEST_DAYS, BacktestReport, BacktestResult, DailyResult, HealthStatus,
    RecommendationsBody,
};
