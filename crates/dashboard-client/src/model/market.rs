//! Portfolio and news data loaded when the dashboard starts

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One holding in the user's portfolio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub avg_price: f64,
    #[serde(default)]
    pub current_price: f64,
    #[serde(default)]
    pub sector: String,
}

impl Position {
    pub fn market_value(&self) -> f64 {
        self.quantity as f64 * self.current_price
    }

    pub fn cost_basis(&self) -> f64 {
        self.quantity as f64 * self.avg_price
    }

    pub fn pnl(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }

    /// P&L relative to the average entry price; 0 when the entry price is 0
    pub fn pnl_pct(&self) -> f64 {
        if self.avg_price == 0.0 {
            return 0.0;
        }
        (self.current_price - self.avg_price) / self.avg_price * 100.0
    }
}

/// Ticker → position, as served by `GET /api/portfolio`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Portfolio {
    pub positions: BTreeMap<String, Position>,
}

impl Portfolio {
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn total_value(&self) -> f64 {
        self.positions.values().map(Position::market_value).sum()
    }

    pub fn total_pnl(&self) -> f64 {
        self.positions.values().map(Position::pnl).sum()
    }

    pub fn total_pnl_pct(&self) -> f64 {
        let cost: f64 = self.positions.values().map(Position::cost_basis).sum();
        if cost == 0.0 {
            return 0.0;
        }
        self.total_pnl() / cost * 100.0
    }
}

impl FromIterator<(String, Position)> for Portfolio {
    fn from_iter<I: IntoIterator<Item = (String, Position)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().collect(),
        }
    }
}

/// Headline sentiment; anything other than positive/negative is neutral
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    Negative,
    #[default]
    #[serde(other)]
    Neutral,
}

/// One news item, as served by `GET /api/news`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub ticker: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub sentiment: Sentiment,
}
