//! Fixed demonstration data shown when the backend cannot serve the
//! initial portfolio or news

use crate::model::{NewsItem, Portfolio, Position, Sentiment};

pub fn portfolio() -> Portfolio {
    [
        ("SBER", 100, 250.0, 275.5, "Finance"),
        ("GAZP", 200, 180.0, 162.3, "Energy"),
        ("LKOH", 10, 6_800.0, 7_150.0, "Energy"),
        ("YNDX", 15, 2_500.0, 2_620.0, "Technology"),
    ]
    .into_iter()
    .map(|(ticker, quantity, avg_price, current_price, sector)| {
        (
            ticker.to_string(),
            Position {
                quantity,
                avg_price,
                current_price,
                sector: sector.to_string(),
            },
        )
    })
    .collect()
}

pub fn news() -> Vec<NewsItem> {
    [
        (
            "Sberbank reports record quarterly profit",
            "Net income beat analyst expectations on strong retail lending.",
            "SBER",
            Sentiment::Positive,
        ),
        (
            "Gas exports to Europe decline further",
            "Pipeline volumes fell again, weighing on revenue guidance.",
            "GAZP",
            Sentiment::Negative,
        ),
        (
            "Lukoil keeps dividend policy unchanged",
            "The board confirmed the payout ratio for the coming year.",
            "LKOH",
            Sentiment::Neutral,
        ),
    ]
    .into_iter()
    .map(|(title, summary, ticker, sentiment)| NewsItem {
        title: title.to_string(),
        summary: summary.to_string(),
        ticker: ticker.to_string(),
        date: "2024-05-01".to_string(),
        sentiment,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_data_is_populated() {
        let portfolio = portfolio();
        assert_eq!(portfolio.len(), 4);
        assert!(portfolio.positions.contains_key("SBER"));
        assert!(portfolio.total_value() > 0.0);

        let news = news();
        assert!(!news.is_empty());
        assert!(news.iter().all(|item| !item.ticker.is_empty()));
    }
}
