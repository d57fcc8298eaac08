//! Discussion and risk feeds
//!
//! Both feeds are append-only during a run and cleared when a new run
//! starts. Opinions are never deduplicated.

use crate::model::{AgentOpinion, RiskAssessment};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A timestamped progress line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub text: String,
}

impl LogEntry {
    pub fn now(text: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DiscussionEntry {
    Log(LogEntry),
    Opinion(AgentOpinion),
}

/// Opinions for one ticker, in arrival order
#[derive(Debug, Clone, PartialEq)]
pub struct TickerGroup<'a> {
    pub ticker: &'a str,
    pub opinions: Vec<&'a AgentOpinion>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscussionFeed {
    entries: Vec<DiscussionEntry>,
}

impl DiscussionFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_log(&mut self, entry: LogEntry) {
        self.entries.push(DiscussionEntry::Log(entry));
    }

    pub fn push_opinion(&mut self, opinion: AgentOpinion) {
        self.entries.push(DiscussionEntry::Opinion(opinion));
    }

    pub fn entries(&self) -> &[DiscussionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn opinions(&self) -> impl Iterator<Item = &AgentOpinion> {
        self.entries.iter().filter_map(|entry| match entry {
            DiscussionEntry::Opinion(opinion) => Some(opinion),
            DiscussionEntry::Log(_) => None,
        })
    }

    /// Group opinions by ticker; groups appear in order of each ticker's
    /// first opinion.
    pub fn grouped_by_ticker(&self) -> Vec<TickerGroup<'_>> {
        let mut groups: Vec<TickerGroup<'_>> = Vec::new();
        for opinion in self.opinions() {
            match groups.iter_mut().find(|g| g.ticker == opinion.ticker) {
                Some(group) => group.opinions.push(opinion),
                None => groups.push(TickerGroup {
                    ticker: &opinion.ticker,
                    opinions: vec![opinion],
                }),
            }
        }
        groups
    }

    /// Swap every opinion entry for `opinions`, keeping log lines in place
    pub fn replace_opinions(&mut self, opinions: Vec<AgentOpinion>) {
        self.entries
            .retain(|entry| matches!(entry, DiscussionEntry::Log(_)));
        self.entries
            .extend(opinions.into_iter().map(DiscussionEntry::Opinion));
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskFeed {
    assessments: Vec<RiskAssessment>,
}

impl RiskFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, assessment: RiskAssessment) {
        self.assessments.push(assessment);
    }

    pub fn assessments(&self) -> &[RiskAssessment] {
        &self.assessments
    }

    pub fn len(&self) -> usize {
        self.assessments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assessments.is_empty()
    }

    pub fn clear(&mut self) {
        self.assessments.clear();
    }

    pub fn replace(&mut self, assessments: Vec<RiskAssessment>) {
        self.assessments = assessments;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Action;

    fn opinion(ticker: &str, agent: &str) -> AgentOpinion {
        AgentOpinion {
            ticker: ticker.to_string(),
            agent_name: agent.to_string(),
            action: Action::Hold,
            confidence: 5,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_grouping_preserves_first_appearance() {
        let mut feed = DiscussionFeed::new();
        feed.push_log(LogEntry::now("Agents discussing"));
        feed.push_opinion(opinion("GAZP", "Technical"));
        feed.push_opinion(opinion("SBER", "Fundamental"));
        feed.push_opinion(opinion("GAZP", "Risk"));

        let groups = feed.grouped_by_ticker();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].ticker, "GAZP");
        assert_eq!(groups[0].opinions.len(), 2);
        assert_eq!(groups[0].opinions[1].agent_name, "Risk");
        assert_eq!(groups[1].ticker, "SBER");
        assert_eq!(feed.len(), 4);
    }

    #[test]
    fn test_opinions_are_not_deduplicated() {
        let mut feed = DiscussionFeed::new();
        feed.push_opinion(opinion("SBER", "Fundamental"));
        feed.push_opinion(opinion("SBER", "Fundamental"));
        assert_eq!(feed.opinions().count(), 2);
    }

    #[test]
    fn test_replace_opinions_keeps_log_lines() {
        let mut feed = DiscussionFeed::new();
        feed.push_log(LogEntry::now("Loading"));
        feed.push_opinion(opinion("SBER", "Fundamental"));
        feed.push_opinion(opinion("LKOH", "Technical"));

        feed.replace_opinions(vec![opinion("YNDX", "News")]);
        assert_eq!(feed.len(), 2);
        assert!(matches!(feed.entries()[0], DiscussionEntry::Log(_)));
        assert_eq!(feed.grouped_by_ticker()[0].ticker, "YNDX");
    }

    #[test]
    fn test_risk_feed_order() {
        let mut feed = RiskFeed::new();
        for ticker in ["SBER", "GAZP"] {
            feed.push(RiskAssessment {
                ticker: ticker.to_string(),
                risk_level: 4,
                risk_factors: vec![],
                recommendations: String::new(),
            });
        }
        assert_eq!(feed.assessments()[1].ticker, "GAZP");
        feed.clear();
        assert!(feed.is_empty());
    }
}
