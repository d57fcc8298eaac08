//! HTTP implementation of [`DashboardApi`]

use super::DashboardApi;
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::model::{
    AgentOpinion, BACKTEST_DAYS, BacktestReport, HealthStatus, NewsItem, Portfolio,
    RecommendationsBody, RiskAssessment, StatusSnapshot,
};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

/// Dashboard backend client
#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    client: Client,
    config: DashboardConfig,
}

impl HttpDashboardApi {
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.config.endpoint(path)?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let response = check_status(path, response)?;
        Ok(response.json().await?)
    }

    fn url_with_query(&self, path: &str, query: &[(&str, String)]) -> Result<Url> {
        let mut url = self.config.endpoint(path)?;
        url.query_pairs_mut()
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        Ok(url)
    }
}

fn check_status(endpoint: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(DashboardError::RequestRejected {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        })
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn get_portfolio(&self) -> Result<Portfolio> {
        self.get_json("/api/portfolio").await
    }

    async fn get_news(&self) -> Result<Vec<NewsItem>> {
        self.get_json("/api/news").await
    }

    async fn start_analysis(&self) -> Result<()> {
        let path = "/api/start_analysis";
        let url = self.config.endpoint(path)?;
        debug!(%url, "POST");
        let response = self.client.post(url).send().await?;
        check_status(path, response)?;
        Ok(())
    }

    async fn get_status(&self) -> Result<StatusSnapshot> {
        self.get_json("/api/status").await
    }

    async fn get_agent_opinions(&self) -> Result<Vec<AgentOpinion>> {
        self.get_json("/api/agent_opinions").await
    }

    async fn get_risk_assessments(&self) -> Result<Vec<RiskAssessment>> {
        self.get_json("/api/risk_assessments").await
    }

    async fn get_recommendations(&self) -> Result<String> {
        let body: RecommendationsBody = self.get_json("/api/recommendations").await?;
        Ok(body.recommendations)
    }

    async fn health(&self) -> Result<HealthStatus> {
        self.get_json("/api/health").await
    }

    async fn backtest(&self, days: u32) -> Result<BacktestReport> {
        if !BACKTEST_DAYS.contains(&days) {
            return Err(DashboardError::InvalidArgument(format!(
                "backtest days must be between {} and {}, got {days}",
                BACKTEST_DAYS.start(),
                BACKTEST_DAYS.end()
            )));
        }
        let path = "/api/backtest";
        let url = self.url_with_query(path, &[("days", days.to_string())])?;
        debug!(%url, "GET");
        let response = self.client.get(url).send().await?;
        let response = check_status(path, response)?;
        Ok(response.json().await?)
    }
}
