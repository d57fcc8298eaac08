//! Command-line interface for the stock analysis dashboard

use clap::{Parser, Subcommand};
use dashboard_client::config::ORIGIN_ENV;
use dashboard_client::model::{BACKTEST_DAYS, RunStatus};
use dashboard_client::state::DiscussionFeed;
use dashboard_client::{
    Dashboard, DashboardApi, DashboardConfig, DataSource, Formatter, FormatterFactory,
    HttpDashboardApi, OutputStyle, WsConnector,
};
use dashboard_utils::LogConfig;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dashboard")]
#[command(about = "Live view of the multi-agent stock analysis backend", long_about = None)]
#[command(version)]
struct Args {
    /// Backend origin [default: $DASHBOARD_URL, else http://localhost:8000]
    #[arg(long, global = true)]
    url: Option<String>,

    /// Print plain lines instead of tables
    #[arg(long, global = true)]
    plain: bool,

    /// Log filter directive, e.g. "debug"; RUST_LOG takes precedence
    #[arg(long, global = true)]
    log_filter: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow the live channel until interrupted
    Watch {
        /// Start an analysis run right away
        #[arg(long)]
        start: bool,

        /// Send a keepalive ping at this interval
        #[arg(long)]
        keepalive_secs: Option<u64>,
    },
    /// Show the latest run status and results
    Status,
    /// Show the portfolio
    Portfolio,
    /// Show recent news
    News,
    /// Show agent opinions of the last run
    Opinions,
    /// Show risk assessments of the last run
    Risks,
    /// Show final recommendations of the last run
    Recommendations,
    /// Check backend health
    Health,
    /// Run a backtest over recent days
    Backtest {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut log_config = LogConfig::default();
    if let Some(filter) = &args.log_filter {
        log_config = log_config.with_filter(filter.clone());
    }
    if args.log_json {
        log_config = log_config.json();
    }
    dashboard_utils::init_tracing_with(&log_config);

    let style = if args.plain {
        OutputStyle::Plain
    } else {
        OutputStyle::Terminal
    };
    let formatter = FormatterFactory::create(style);

    let mut builder = DashboardConfig::builder().with_env_origin();
    if let Some(url) = &args.url {
        builder = builder.origin(url.clone());
    }
    if let Command::Watch {
        keepalive_secs: Some(secs),
        ..
    } = &args.command
    {
        builder = builder.keepalive_interval(Duration::from_secs(*secs));
    }
    let config = builder.build()?;
    let api = HttpDashboardApi::new(config.clone())?;

    info!(origin = %config.origin, env = ORIGIN_ENV, "dashboard-cli starting");

    match args.command {
        Command::Watch { start, .. } => watch(config, api, formatter.as_ref(), start).await?,
        Command::Status => status(&api, formatter.as_ref()).await?,
        Command::Portfolio => {
            let portfolio = api.get_portfolio().await?;
            println!("{}", formatter.format_portfolio(&portfolio, DataSource::Live));
        }
        Command::News => {
            let news = api.get_news().await?;
            println!("{}", formatter.format_news(&news, DataSource::Live));
        }
        Command::Opinions => {
            let mut feed = DiscussionFeed::new();
            feed.replace_opinions(api.get_agent_opinions().await?);
            println!("{}", formatter.format_discussion(&feed));
        }
        Command::Risks => {
            let risks = api.get_risk_assessments().await?;
            println!("{}", formatter.format_risks(&risks));
        }
        Command::Recommendations => {
            let recommendations = api.get_recommendations().await?;
            println!("{}", formatter.format_recommendations(&recommendations));
        }
        Command::Health => {
            let health = api.health().await?;
            println!("{}", formatter.format_health(&health));
        }
        Command::Backtest { days } => {
            if !BACKTEST_DAYS.contains(&days) {
                anyhow::bail!(
                    "--days must be between {} and {}",
                    BACKTEST_DAYS.start(),
                    BACKTEST_DAYS.end()
                );
            }
            let report = api.backtest(days).await?;
            println!("{}", formatter.format_backtest(&report));
        }
    }

    Ok(())
}

async fn watch(
    config: DashboardConfig,
    api: HttpDashboardApi,
    formatter: &dyn Formatter,
    start: bool,
) -> anyhow::Result<()> {
    let (views_tx, mut views) = tokio::sync::mpsc::unbounded_channel();
    let dashboard = Dashboard::new(config, Arc::new(api), views_tx);
    let handle = dashboard.handle();
    if start {
        handle.start_analysis();
    }

    let task = tokio::spawn(dashboard.run(Arc::new(WsConnector::default())));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            update = views.recv() => match update {
                Some(update) => {
                    if let Some(text) = formatter.format_update(&update) {
                        println!("{text}");
                    }
                }
                None => break,
            },
            _ = &mut ctrl_c => {
                info!("interrupted, shutting down");
                handle.shutdown();
                break;
            }
        }
    }

    task.await??;
    Ok(())
}

async fn status(api: &HttpDashboardApi, formatter: &dyn Formatter) -> anyhow::Result<()> {
    let snapshot = api.get_status().await?;
    let label = match snapshot.status {
        RunStatus::Ready => "ready",
        RunStatus::Analyzing => "analyzing",
        RunStatus::Completed => "completed",
        RunStatus::Error => "error",
        RunStatus::Unknown => "unknown",
    };
    println!("Status: {label}");
    if let Some(error) = &snapshot.error {
        println!("{}", formatter.format_error(error));
    }

    let mut feed = DiscussionFeed::new();
    feed.replace_opinions(snapshot.agent_opinions);
    if !feed.is_empty() {
        println!("{}", formatter.format_discussion(&feed));
    }
    if !snapshot.risk_assessments.is_empty() {
        println!("{}", formatter.format_risks(&snapshot.risk_assessments));
    }
    if !snapshot.final_recommendations.is_empty() {
        println!("{}", formatter.format_recommendations(&snapshot.final_recommendations));
    }
    Ok(())
}
