//! REST API of the analysis backend

pub mod demo;
pub mod http;

pub use http::HttpDashboardApi;

use crate::error::Result;
use crate::model::{
    AgentOpinion, BacktestReport, HealthStatus, NewsItem, Portfolio, RiskAssessment,
    StatusSnapshot,
};
use async_trait::async_trait;

/// Backend endpoints used by the dashboard
///
/// Implemented over HTTP by [`HttpDashboardApi`]; tests substitute a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DashboardApi: Send + Sync {
    /// `GET /api/portfolio`
    async fn get_portfolio(&self) -> Result<Portfolio>;

    /// `GET /api/news`
    async fn get_news(&self) -> Result<Vec<NewsItem>>;

    /// `POST /api/start_analysis`; any 2xx acknowledges the run
    async fn start_analysis(&self) -> Result<()>;

    /// `GET /api/status`
    async fn get_status(&self) -> Result<StatusSnapshot>;

    async fn get_agent_opinions(&self) -> Result<Vec<AgentOpinion>>;

    async fn get_risk_assessments(&self) -> Result<Vec<RiskAssessment>>;

    /// Final recommendations of the last completed run, markdown
    async fn get_recommendations(&self) -> Result<String>;

    async fn health(&self) -> Result<HealthStatus>;

    /// `GET /api/backtest?days=N`, N within [`crate::model::BACKTEST_DAYS`]
    async fn backtest(&self, days: u32) -> Result<BacktestReport>;
}
