//! Auxiliary REST bodies: health and backtest reports

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Body of `GET /api/health`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub agent_initialized: bool,
    #[serde(default)]
    pub analysis_status: String,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Body of `GET /api/recommendations`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationsBody {
    #[serde(default)]
    pub recommendations: String,
}

/// Shortest and longest backtest window the server accepts, in days
pub const BACKTEST_DAYS: std::ops::RangeInclusive<u32> = 1..=30;

/// Body of `GET /api/backtest?days=N`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
    pub result: BacktestResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub start_date: String,
    pub end_date: String,
    pub initial_portfolio_value: f64,
    pub final_portfolio_value: f64,
    pub total_pnl: f64,
    pub total_return_pct: f64,
    /// Per-ticker figures; shape is backend-defined
    #[serde(default)]
    pub ticker_performance: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub daily_results: Vec<DailyResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    pub date: String,
    pub ticker: String,
    #[serde(default)]
    pub open_price: f64,
    #[serde(default)]
    pub close_price: f64,
    #[serde(default)]
    pub high_price: f64,
    #[serde(default)]
    pub low_price: f64,
    #[serde(default)]
    pub volume: f64,
    #[serde(default)]
    pub signal: String,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub daily_pnl: f64,
    #[serde(default)]
    pub cumulative_pnl: f64,
}
