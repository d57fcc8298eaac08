//! Live client for the multi-agent stock analysis dashboard
//!
//! The crate connects to an analysis backend over REST and a WebSocket
//! update channel, and turns what arrives into a stream of view updates:
//!
//! - Portfolio and news loading, with demonstration data as fallback
//! - Agent opinions grouped by ticker, risk assessments, final recommendations
//! - A run state machine (`Idle → Analyzing → Completed | Error`) driven by
//!   channel messages and a status poller
//! - Automatic channel reconnects after a fixed delay
//!
//! # Architecture
//!
//! A single [`Dashboard`] task owns all mutable state in a
//! [`DashboardContext`]. The [`ChannelSupervisor`], the start request and the
//! status poller run as their own tasks and report back through
//! [`DashboardEvent`]s. Each event goes through the [`UpdateDispatcher`],
//! which applies one transition and returns the [`ViewUpdate`]s to render.
//!
//! # Example
//!
//! ```rust,ignore
//! use dashboard_client::{Dashboard, DashboardConfig, HttpDashboardApi, WsConnector};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = DashboardConfig::builder().with_env_origin().build()?;
//!     let api = Arc::new(HttpDashboardApi::new(config.clone())?);
//!     let (views_tx, mut views) = tokio::sync::mpsc::unbounded_channel();
//!
//!     let dashboard = Dashboard::new(config, api, views_tx);
//!     dashboard.handle().start_analysis();
//!     tokio::spawn(dashboard.run(Arc::new(WsConnector::default())));
//!
//!     while let Some(update) = views.recv().await {
//!         println!("{update:?}");
//!     }
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod channel;
pub mod config;
pub mod dashboard;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod model;
pub mod scheduler;
pub mod state;
pub mod view;

pub use api::{DashboardApi, HttpDashboardApi};
pub use channel::{ChannelConnector, ChannelState, ChannelSupervisor, ChannelTransport, WsConnector};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, DashboardEvent, DashboardHandle};
pub use dispatcher::{DataSource, UpdateDispatcher, ViewUpdate};
pub use error::{DashboardError, Result};
pub use message::ChannelMessage;
pub use scheduler::TaskHandle;
pub use state::{AnalysisPhase, AnalysisState, DashboardContext};
pub use view::{Formatter, FormatterFactory, OutputStyle};
