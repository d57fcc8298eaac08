//! Rendering of view updates and REST payloads to text

use crate::dispatcher::{DataSource, ViewUpdate};
use crate::model::{
    AgentOpinion, BacktestReport, HealthStatus, MAX_SCORE, NewsItem, Portfolio, RiskAssessment,
    Sentiment,
};
use crate::state::{AnalysisPhase, DiscussionFeed, LogEntry};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, CellAlignment, Color, ContentArrangement, Table};

/// Width of the progress bar, in cells
const PROGRESS_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputStyle {
    /// Unicode tables and bars
    #[default]
    Terminal,
    /// Line-oriented output without box drawing
    Plain,
}

pub trait Formatter: Send + Sync {
    fn style(&self) -> OutputStyle;
    fn format_portfolio(&self, portfolio: &Portfolio, source: DataSource) -> String;
    fn format_news(&self, items: &[NewsItem], source: DataSource) -> String;
    fn format_opinion(&self, opinion: &AgentOpinion) -> String;
    fn format_risk(&self, risk: &RiskAssessment) -> String;
    fn format_progress(&self, value: f64) -> String;
    fn format_health(&self, health: &HealthStatus) -> String;
    fn format_backtest(&self, report: &BacktestReport) -> String;
    fn format_error(&self, error: &str) -> String;

    fn format_status(&self, entry: &LogEntry) -> String {
        format!("[{}] {}", entry.at.format("%H:%M:%S"), entry.text)
    }

    fn format_recommendations(&self, markdown: &str) -> String {
        format!("Final recommendations\n\n{}", markdown.trim_end())
    }

    /// Opinions of a feed, one block per ticker in first-appearance order
    fn format_discussion(&self, feed: &DiscussionFeed) -> String {
        let mut out = String::new();
        for group in feed.grouped_by_ticker() {
            out.push_str(&format!("── {} ──\n", group.ticker));
            for opinion in group.opinions {
                out.push_str(&self.format_opinion(opinion));
                out.push('\n');
            }
        }
        out
    }

    fn format_risks(&self, risks: &[RiskAssessment]) -> String {
        risks
            .iter()
            .map(|risk| self.format_risk(risk))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text for one update; `None` when there is nothing to show
    fn format_update(&self, update: &ViewUpdate) -> Option<String> {
        let text = match update {
            ViewUpdate::Channel(state) => format!("Channel {state}"),
            ViewUpdate::Portfolio { portfolio, source } => self.format_portfolio(portfolio, *source),
            ViewUpdate::News { items, source } => self.format_news(items, *source),
            ViewUpdate::RunStarted => "Analysis started".to_string(),
            ViewUpdate::Status(entry) => self.format_status(entry),
            ViewUpdate::Opinion(opinion) => self.format_opinion(opinion),
            ViewUpdate::Risk(risk) => self.format_risk(risk),
            ViewUpdate::Progress(value) => self.format_progress(*value),
            ViewUpdate::Recommendations(text) => self.format_recommendations(text),
            ViewUpdate::FullResult {
                opinions,
                risks,
                recommendations,
            } => {
                let mut feed = DiscussionFeed::new();
                feed.replace_opinions(opinions.clone());
                let mut out = self.format_discussion(&feed);
                if !risks.is_empty() {
                    out.push_str(&self.format_risks(risks));
                    out.push_str("\n\n");
                }
                out.push_str(&self.format_recommendations(recommendations));
                out
            }
            ViewUpdate::Phase(AnalysisPhase::Analyzing) => return None,
            ViewUpdate::Phase(phase) => format!("Phase: {}", phase_label(*phase)),
            ViewUpdate::Notice(message) => self.format_error(message),
        };
        Some(text)
    }
}

pub fn phase_label(phase: AnalysisPhase) -> &'static str {
    match phase {
        AnalysisPhase::Idle => "idle",
        AnalysisPhase::Analyzing => "analyzing",
        AnalysisPhase::Completed => "completed",
        AnalysisPhase::Error => "error",
    }
}

/// `███████░░░ 7/10`
pub fn risk_bar(level: u8) -> String {
    let level = level.min(MAX_SCORE);
    format!(
        "{}{} {level}/{MAX_SCORE}",
        "█".repeat(usize::from(level)),
        "░".repeat(usize::from(MAX_SCORE - level))
    )
}

pub fn progress_bar(value: f64, width: usize) -> String {
    let value = value.clamp(0.0, 100.0);
    let filled = ((value / 100.0) * width as f64).round() as usize;
    format!(
        "[{}{}] {value:.0}%",
        "#".repeat(filled),
        "-".repeat(width - filled)
    )
}

fn source_suffix(source: DataSource) -> &'static str {
    match source {
        DataSource::Live => "",
        DataSource::Demo => " (demo data)",
    }
}

fn sentiment_marker(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "+",
        Sentiment::Negative => "-",
        Sentiment::Neutral => "=",
    }
}

fn signed(value: f64) -> String {
    format!("{value:+.2}")
}

pub struct TerminalFormatter;

impl TerminalFormatter {
    fn table(headers: Vec<&str>) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(headers);
        table
    }

    fn pnl_cell(value: f64, text: String) -> Cell {
        let cell = Cell::new(text).set_alignment(CellAlignment::Right);
        if value > 0.0 {
            cell.fg(Color::Green)
        } else if value < 0.0 {
            cell.fg(Color::Red)
        } else {
            cell
        }
    }
}

impl Formatter for TerminalFormatter {
    fn style(&self) -> OutputStyle {
        OutputStyle::Terminal
    }

    fn format_portfolio(&self, portfolio: &Portfolio, source: DataSource) -> String {
        if portfolio.is_empty() {
            return format!("Portfolio is empty{}", source_suffix(source));
        }

        let mut table = Self::table(vec![
            "Ticker", "Sector", "Qty", "Avg", "Price", "Value", "P&L", "P&L %",
        ]);
        for (ticker, position) in &portfolio.positions {
            table.add_row(vec![
                Cell::new(ticker),
                Cell::new(&position.sector),
                Cell::new(position.quantity).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", position.avg_price)).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", position.current_price))
                    .set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.2}", position.market_value()))
                    .set_alignment(CellAlignment::Right),
                Self::pnl_cell(position.pnl(), signed(position.pnl())),
                Self::pnl_cell(position.pnl(), format!("{}%", signed(position.pnl_pct()))),
            ]);
        }
        table.add_row(vec![
            Cell::new("TOTAL"),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
            Cell::new(format!("{:.2}", portfolio.total_value())).set_alignment(CellAlignment::Right),
            Self::pnl_cell(portfolio.total_pnl(), signed(portfolio.total_pnl())),
            Self::pnl_cell(
                portfolio.total_pnl(),
                format!("{}%", signed(portfolio.total_pnl_pct())),
            ),
        ]);

        format!("Portfolio{}\n{table}", source_suffix(source))
    }

    fn format_news(&self, items: &[NewsItem], source: DataSource) -> String {
        if items.is_empty() {
            return format!("No news{}", source_suffix(source));
        }

        let mut table = Self::table(vec!["Date", "Ticker", "", "Headline"]);
        for item in items {
            table.add_row(vec![
                Cell::new(&item.date),
                Cell::new(&item.ticker),
                Cell::new(sentiment_marker(item.sentiment)),
                Cell::new(format!("{}\n{}", item.title, item.summary)),
            ]);
        }
        format!("News{}\n{table}", source_suffix(source))
    }

    fn format_opinion(&self, opinion: &AgentOpinion) -> String {
        format!(
            "  {} · {} · confidence {}/{MAX_SCORE}\n    {}",
            opinion.agent_name,
            opinion.action,
            opinion.confidence,
            opinion.reasoning.trim().replace('\n', "\n    ")
        )
    }

    fn format_risk(&self, risk: &RiskAssessment) -> String {
        let mut out = format!("{:<6} {}", risk.ticker, risk_bar(risk.risk_level));
        for factor in &risk.risk_factors {
            out.push_str(&format!("\n       • {factor}"));
        }
        if !risk.recommendations.is_empty() {
            out.push_str(&format!("\n       → {}", risk.recommendations));
        }
        out
    }

    fn format_progress(&self, value: f64) -> String {
        progress_bar(value, PROGRESS_WIDTH)
    }

    fn format_health(&self, health: &HealthStatus) -> String {
        let mut table = Self::table(vec!["Status", "Agent initialized", "Analysis"]);
        table.add_row(vec![
            Cell::new(&health.status).fg(if health.is_healthy() {
                Color::Green
            } else {
                Color::Red
            }),
            Cell::new(if health.agent_initialized { "yes" } else { "no" }),
            Cell::new(&health.analysis_status),
        ]);
        table.to_string()
    }

    fn format_backtest(&self, report: &BacktestReport) -> String {
        let result = &report.result;
        let mut summary = Self::table(vec!["Period", "Initial", "Final", "P&L", "Return"]);
        summary.add_row(vec![
            Cell::new(format!("{} → {}", result.start_date, result.end_date)),
            Cell::new(format!("{:.2}", result.initial_portfolio_value)),
            Cell::new(format!("{:.2}", result.final_portfolio_value)),
            Self::pnl_cell(result.total_pnl, signed(result.total_pnl)),
            Self::pnl_cell(result.total_pnl, format!("{}%", signed(result.total_return_pct))),
        ]);

        let mut daily = Self::table(vec![
            "Date", "Ticker", "Close", "Signal", "Conf", "Daily P&L", "Cumulative",
        ]);
        for day in &result.daily_results {
            daily.add_row(vec![
                Cell::new(&day.date),
                Cell::new(&day.ticker),
                Cell::new(format!("{:.2}", day.close_price)),
                Cell::new(&day.signal),
                Cell::new(format!("{:.0}", day.confidence)),
                Self::pnl_cell(day.daily_pnl, signed(day.daily_pnl)),
                Cell::new(signed(day.cumulative_pnl)),
            ]);
        }

        format!("{}\n{summary}\n{daily}", report.message)
    }

    fn format_error(&self, error: &str) -> String {
        format!("❌ Error: {error}")
    }
}

pub struct PlainFormatter;

impl Formatter for PlainFormatter {
    fn style(&self) -> OutputStyle {
        OutputStyle::Plain
    }

    fn format_portfolio(&self, portfolio: &Portfolio, source: DataSource) -> String {
        let mut out = format!("Portfolio{}\n", source_suffix(source));
        for (ticker, position) in &portfolio.positions {
            out.push_str(&format!(
                "{ticker} {} x {:.2} = {:.2} ({}, {}%)\n",
                position.quantity,
                position.current_price,
                position.market_value(),
                signed(position.pnl()),
                signed(position.pnl_pct())
            ));
        }
        out.push_str(&format!(
            "Total {:.2} ({})",
            portfolio.total_value(),
            signed(portfolio.total_pnl())
        ));
        out
    }

    fn format_news(&self, items: &[NewsItem], source: DataSource) -> String {
        let mut out = format!("News{}", source_suffix(source));
        for item in items {
            out.push_str(&format!(
                "\n{} [{}] {} {}",
                item.date,
                item.ticker,
                sentiment_marker(item.sentiment),
                item.title
            ));
        }
        out
    }

    fn format_opinion(&self, opinion: &AgentOpinion) -> String {
        format!(
            "{} {}: {} ({}/{MAX_SCORE}) {}",
            opinion.ticker,
            opinion.agent_name,
            opinion.action,
            opinion.confidence,
            opinion.reasoning.trim()
        )
    }

    fn format_risk(&self, risk: &RiskAssessment) -> String {
        let mut out = format!("{} risk {}/{MAX_SCORE}", risk.ticker, risk.risk_level);
        if !risk.risk_factors.is_empty() {
            out.push_str(&format!(": {}", risk.risk_factors.join("; ")));
        }
        out
    }

    fn format_progress(&self, value: f64) -> String {
        format!("Progress {value:.0}%")
    }

    fn format_health(&self, health: &HealthStatus) -> String {
        format!(
            "status={} agent_initialized={} analysis={}",
            health.status, health.agent_initialized, health.analysis_status
        )
    }

    fn format_backtest(&self, report: &BacktestReport) -> String {
        let result = &report.result;
        format!(
            "{}\n{} to {}: {:.2} -> {:.2} ({}, {}%), {} trading records",
            report.message,
            result.start_date,
            result.end_date,
            result.initial_portfolio_value,
            result.final_portfolio_value,
            signed(result.total_pnl),
            signed(result.total_return_pct),
            result.daily_results.len()
        )
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {error}")
    }
}

pub struct FormatterFactory;

impl FormatterFactory {
    pub fn create(style: OutputStyle) -> Box<dyn Formatter> {
        match style {
            OutputStyle::Terminal => Box::new(TerminalFormatter),
            OutputStyle::Plain => Box::new(PlainFormatter),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::demo;
    use crate::channel::ChannelState;
    use crate::model::Action;

    fn opinion(ticker: &str, agent: &str) -> AgentOpinion {
        AgentOpinion {
            ticker: ticker.to_string(),
            agent_name: agent.to_string(),
            action: Action::Buy,
            confidence: 8,
            reasoning: "Strong **growth**".to_string(),
        }
    }

    #[test]
    fn test_risk_bar() {
        assert_eq!(risk_bar(7), "███████░░░ 7/10");
        assert_eq!(risk_bar(0), "░░░░░░░░░░ 0/10");
        assert_eq!(risk_bar(42), "██████████ 10/10");
    }

    #[test]
    fn test_progress_bar() {
        assert_eq!(progress_bar(50.0, 10), "[#####-----] 50%");
        assert_eq!(progress_bar(150.0, 4), "[####] 100%");
        assert_eq!(progress_bar(-3.0, 4), "[----] 0%");
    }

    #[test]
    fn test_discussion_grouped_by_ticker() {
        let mut feed = DiscussionFeed::new();
        feed.push_opinion(opinion("SBER", "Fundamental"));
        feed.push_opinion(opinion("GAZP", "Technical"));
        feed.push_opinion(opinion("SBER", "News"));

        let text = TerminalFormatter.format_discussion(&feed);
        let sber = text.find("── SBER ──").unwrap();
        let gazp = text.find("── GAZP ──").unwrap();
        let news = text.find("News").unwrap();
        assert!(sber < news && news < gazp);
    }

    #[test]
    fn test_terminal_portfolio_marks_demo_data() {
        let text = TerminalFormatter.format_portfolio(&demo::portfolio(), DataSource::Demo);
        assert!(text.starts_with("Portfolio (demo data)"));
        assert!(text.contains("SBER"));
        assert!(text.contains("TOTAL"));

        let text = TerminalFormatter.format_portfolio(&Portfolio::default(), DataSource::Live);
        assert_eq!(text, "Portfolio is empty");
    }

    #[test]
    fn test_plain_formatter() {
        let formatter = FormatterFactory::create(OutputStyle::Plain);
        assert_eq!(formatter.style(), OutputStyle::Plain);
        assert_eq!(
            formatter.format_opinion(&opinion("SBER", "Fundamental")),
            "SBER Fundamental: BUY (8/10) Strong **growth**"
        );
        assert_eq!(formatter.format_error("HTTP 500"), "Error: HTTP 500");
    }

    #[test]
    fn test_format_update() {
        let formatter = FormatterFactory::create(OutputStyle::Terminal);
        assert_eq!(
            formatter.format_update(&ViewUpdate::Phase(AnalysisPhase::Analyzing)),
            None
        );
        assert_eq!(
            formatter.format_update(&ViewUpdate::Channel(ChannelState::Open)),
            Some("Channel connected".to_string())
        );

        let risk = RiskAssessment {
            ticker: "GAZP".to_string(),
            risk_level: 7,
            risk_factors: vec!["sanctions".to_string()],
            recommendations: String::new(),
        };
        let text = formatter.format_update(&ViewUpdate::Risk(risk)).unwrap();
        assert!(text.contains("███████░░░ 7/10"));
        assert!(text.contains("• sanctions"));

        let text = formatter
            .format_update(&ViewUpdate::Recommendations("Hold".to_string()))
            .unwrap();
        assert!(text.ends_with("Hold"));
    }
}
