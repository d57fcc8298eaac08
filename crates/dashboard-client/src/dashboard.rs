//! The dashboard event loop
//!
//! A [`Dashboard`] owns the [`DashboardContext`] and is the only place it is
//! mutated. The channel supervisor, the start request and the status poller
//! run as separate tasks and report back through [`DashboardEvent`]s, which
//! are applied strictly in arrival order.

use crate::api::{DashboardApi, demo};
use crate::channel::{ChannelConnector, ChannelState, ChannelSupervisor};
use crate::config::DashboardConfig;
use crate::dispatcher::{DataSource, UpdateDispatcher, ViewUpdate};
use crate::error::{DashboardError, Result};
use crate::model::{NewsItem, Portfolio, StatusSnapshot};
use crate::scheduler::schedule_every;
use crate::state::DashboardContext;
use std::ops::ControlFlow;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

/// Input to the event loop
#[derive(Debug)]
pub enum DashboardEvent {
    /// Raw text frame from the channel
    Inbound(String),
    ChannelStateChanged(ChannelState),
    /// The user asked for a new analysis run
    StartRequested,
    /// Outcome of `POST /api/start_analysis`
    StartAcknowledged(Result<()>),
    PollResult(Result<StatusSnapshot>),
    /// Outcome of `GET /api/portfolio`
    PortfolioLoaded(Result<Portfolio>),
    /// Outcome of `GET /api/news`
    NewsLoaded(Result<Vec<NewsItem>>),
    Shutdown,
}

/// Sends requests to a running [`Dashboard`]
#[derive(Debug, Clone)]
pub struct DashboardHandle {
    events: UnboundedSender<DashboardEvent>,
}

impl DashboardHandle {
    /// Request a new analysis run. Returns `false` if the dashboard is gone.
    pub fn start_analysis(&self) -> bool {
        self.send(DashboardEvent::StartRequested)
    }

    pub fn shutdown(&self) -> bool {
        self.send(DashboardEvent::Shutdown)
    }

    pub fn send(&self, event: DashboardEvent) -> bool {
        self.events.send(event).is_ok()
    }
}

pub struct Dashboard {
    config: DashboardConfig,
    api: Arc<dyn DashboardApi>,
    ctx: DashboardContext,
    dispatcher: UpdateDispatcher,
    events_tx: UnboundedSender<DashboardEvent>,
    events_rx: UnboundedReceiver<DashboardEvent>,
    views: UnboundedSender<ViewUpdate>,
}

impl Dashboard {
    pub fn new(
        config: DashboardConfig,
        api: Arc<dyn DashboardApi>,
        views: UnboundedSender<ViewUpdate>,
    ) -> Self {
        let ctx = DashboardContext::new(&config);
        Self::with_context(config, api, views, ctx)
    }

    pub fn with_context(
        config: DashboardConfig,
        api: Arc<dyn DashboardApi>,
        views: UnboundedSender<ViewUpdate>,
        ctx: DashboardContext,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            config,
            api,
            ctx,
            dispatcher: UpdateDispatcher::new(),
            events_tx,
            events_rx,
            views,
        }
    }

    pub fn handle(&self) -> DashboardHandle {
        DashboardHandle {
            events: self.events_tx.clone(),
        }
    }

    pub fn context(&self) -> &DashboardContext {
        &self.ctx
    }

    /// Run until [`DashboardEvent::Shutdown`]
    pub async fn run(mut self, connector: Arc<dyn ChannelConnector>) -> Result<()> {
        let supervisor =
            ChannelSupervisor::new(&self.config, connector, self.events_tx.clone())?;
        info!(url = %supervisor.url(), "dashboard starting");
        let supervisor = supervisor.spawn();

        self.load_initial_data();

        while let Some(event) = self.next_event().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }

        supervisor.cancel();
        self.ctx.cancel_poller();
        info!("dashboard stopped");
        Ok(())
    }

    pub async fn next_event(&mut self) -> Option<DashboardEvent> {
        self.events_rx.recv().await
    }

    /// Fetch portfolio and news in the background
    ///
    /// Each response comes back as its own event, so a slow backend never
    /// holds up channel frames or start requests.
    pub fn load_initial_data(&self) {
        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.get_portfolio().await;
            let _ = events.send(DashboardEvent::PortfolioLoaded(result));
        });

        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.get_news().await;
            let _ = events.send(DashboardEvent::NewsLoaded(result));
        });
    }

    /// Store the portfolio, substituting demonstration data on failure
    fn apply_portfolio(&mut self, result: Result<Portfolio>) -> Vec<ViewUpdate> {
        let (portfolio, source) = match result {
            Ok(portfolio) => (portfolio, DataSource::Live),
            Err(e) => {
                log_data_load("portfolio", &e);
                (demo::portfolio(), DataSource::Demo)
            }
        };
        self.ctx.portfolio = portfolio.clone();
        vec![ViewUpdate::Portfolio { portfolio, source }]
    }

    fn apply_news(&mut self, result: Result<Vec<NewsItem>>) -> Vec<ViewUpdate> {
        let (items, source) = match result {
            Ok(items) => (items, DataSource::Live),
            Err(e) => {
                log_data_load("news", &e);
                (demo::news(), DataSource::Demo)
            }
        };
        self.ctx.news = items.clone();
        vec![ViewUpdate::News { items, source }]
    }

    /// Apply one event
    pub fn handle_event(&mut self, event: DashboardEvent) -> ControlFlow<()> {
        let updates = match event {
            DashboardEvent::Inbound(text) => self.dispatcher.dispatch_text(&mut self.ctx, &text),
            DashboardEvent::ChannelStateChanged(state) => {
                self.dispatcher.channel_changed(&mut self.ctx, state)
            }
            DashboardEvent::StartRequested => self.start_analysis(),
            DashboardEvent::StartAcknowledged(result) => {
                let acknowledged = result.is_ok();
                let updates = self.dispatcher.acknowledge_start(&mut self.ctx, result);
                if acknowledged && self.ctx.state.is_busy() && !self.ctx.has_poller() {
                    self.start_poller();
                }
                updates
            }
            DashboardEvent::PollResult(result) => self.dispatcher.apply_poll(&mut self.ctx, result),
            DashboardEvent::PortfolioLoaded(result) => self.apply_portfolio(result),
            DashboardEvent::NewsLoaded(result) => self.apply_news(result),
            DashboardEvent::Shutdown => return ControlFlow::Break(()),
        };
        self.publish(updates);
        ControlFlow::Continue(())
    }

    fn start_analysis(&mut self) -> Vec<ViewUpdate> {
        let Some(updates) = self.dispatcher.begin_run(&mut self.ctx) else {
            return Vec::new();
        };

        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let result = api.start_analysis().await;
            // The loop may already be gone; nothing to report to then.
            let _ = events.send(DashboardEvent::StartAcknowledged(result));
        });
        updates
    }

    fn start_poller(&mut self) {
        let api = Arc::clone(&self.api);
        let events = self.events_tx.clone();
        debug!(interval = ?self.config.poll_interval, "starting status poller");
        let poller = schedule_every("status-poller", self.config.poll_interval, move || {
            let api = Arc::clone(&api);
            let events = events.clone();
            async move {
                let result = api.get_status().await;
                let _ = events.send(DashboardEvent::PollResult(result));
            }
        });
        self.ctx.set_poller(poller);
    }

    fn publish(&self, updates: Vec<ViewUpdate>) {
        for update in updates {
            if self.views.send(update).is_err() {
                debug!("view receiver dropped");
                return;
            }
        }
    }
}

fn log_data_load(resource: &str, cause: &DashboardError) {
    let err = DashboardError::DataLoad {
        resource: resource.to_string(),
        reason: cause.to_string(),
    };
    warn!(error = %err, "falling back to demo data");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockDashboardApi;
    use crate::channel::ChannelTransport;
    use crate::model::{
        Action, AgentOpinion, BacktestReport, HealthStatus, RiskAssessment, RunStatus, Sentiment,
    };
    use async_trait::async_trait;
    use url::Url;
    use crate::state::{AnalysisPhase, ProgressMeter};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio_test::assert_ok;

    fn config() -> DashboardConfig {
        DashboardConfig::builder().build().unwrap()
    }

    fn dashboard(api: MockDashboardApi) -> (Dashboard, UnboundedReceiver<ViewUpdate>) {
        let (views_tx, views_rx) = mpsc::unbounded_channel();
        let ctx = DashboardContext::with_progress(ProgressMeter::with_seed(90.0, 10.0, 3));
        (
            Dashboard::with_context(config(), Arc::new(api), views_tx, ctx),
            views_rx,
        )
    }

    fn drain(rx: &mut UnboundedReceiver<ViewUpdate>) -> Vec<ViewUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = rx.try_recv() {
            updates.push(update);
        }
        updates
    }

    fn opinion_frame() -> DashboardEvent {
        DashboardEvent::Inbound(
            r#"{"type":"agent_opinion","data":{"ticker":"SBER","agent_name":"Fundamental","action":"BUY","confidence":8,"reasoning":"growth"}}"#
                .to_string(),
        )
    }

    #[tokio::test]
    async fn test_rejected_start_enters_error_without_poller() {
        let mut api = MockDashboardApi::new();
        api.expect_start_analysis().times(1).returning(|| {
            Err(DashboardError::RequestRejected {
                endpoint: "/api/start_analysis".to_string(),
                status: 500,
            })
        });
        api.expect_get_status().never();
        let (mut dashboard, mut views) = dashboard(api);

        assert!(dashboard.handle_event(DashboardEvent::StartRequested).is_continue());
        assert_eq!(dashboard.context().state.phase, AnalysisPhase::Analyzing);

        let ack = dashboard.next_event().await.unwrap();
        assert!(matches!(ack, DashboardEvent::StartAcknowledged(Err(_))));
        let _ = dashboard.handle_event(ack);

        let ctx = dashboard.context();
        assert_eq!(ctx.state.phase, AnalysisPhase::Error);
        assert!(ctx.state.error_message.as_deref().unwrap().contains("500"));
        assert!(!ctx.has_poller());
        assert!(
            drain(&mut views)
                .iter()
                .any(|u| matches!(u, ViewUpdate::Notice(n) if n.contains("500")))
        );
    }

    #[tokio::test]
    async fn test_second_start_while_analyzing_is_noop() {
        let requests = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&requests);
        let mut api = MockDashboardApi::new();
        api.expect_start_analysis().returning(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        api.expect_get_status()
            .returning(|| Ok(StatusSnapshot::default()));
        let (mut dashboard, _views) = dashboard(api);

        let _ = dashboard.handle_event(DashboardEvent::StartRequested);
        let _ = dashboard.handle_event(opinion_frame());
        let _ = dashboard.handle_event(DashboardEvent::StartRequested);
        assert_eq!(dashboard.context().discussion.len(), 1);

        let ack = dashboard.next_event().await.unwrap();
        assert!(matches!(ack, DashboardEvent::StartAcknowledged(Ok(()))));
        let _ = dashboard.handle_event(ack);
        assert!(dashboard.context().has_poller());

        let next = tokio::time::timeout(Duration::from_millis(50), dashboard.next_event()).await;
        assert!(next.is_err(), "unexpected event {next:?}");
        assert_eq!(requests.load(Ordering::SeqCst), 1);
        assert_eq!(dashboard.context().discussion.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_completion_stops_poller() {
        let mut api = MockDashboardApi::new();
        api.expect_start_analysis().times(1).returning(|| Ok(()));
        api.expect_get_status().returning(|| {
            Ok(StatusSnapshot {
                status: RunStatus::Completed,
                final_recommendations: "Hold".to_string(),
                ..StatusSnapshot::default()
            })
        });
        let (mut dashboard, mut views) = dashboard(api);

        let _ = dashboard.handle_event(DashboardEvent::StartRequested);
        let ack = dashboard.next_event().await.unwrap();
        let _ = dashboard.handle_event(ack);
        assert!(dashboard.context().has_poller());

        let poll = dashboard.next_event().await.unwrap();
        assert!(matches!(poll, DashboardEvent::PollResult(Ok(_))));
        let _ = dashboard.handle_event(poll);

        let ctx = dashboard.context();
        assert_eq!(ctx.state.phase, AnalysisPhase::Completed);
        assert_eq!(ctx.recommendations, "Hold");
        assert!(!ctx.has_poller());
        assert!(drain(&mut views).contains(&ViewUpdate::Phase(AnalysisPhase::Completed)));
    }

    #[tokio::test]
    async fn test_initial_data_falls_back_per_resource() {
        let mut api = MockDashboardApi::new();
        api.expect_get_portfolio()
            .returning(|| Err(DashboardError::Transport("connection refused".to_string())));
        api.expect_get_news().returning(|| {
            Ok(vec![NewsItem {
                title: "Live headline".to_string(),
                summary: String::new(),
                ticker: "SBER".to_string(),
                date: "2024-05-02".to_string(),
                sentiment: Sentiment::Positive,
            }])
        });
        let (mut dashboard, mut views) = dashboard(api);

        dashboard.load_initial_data();
        for _ in 0..2 {
            let event = dashboard.next_event().await.unwrap();
            assert!(matches!(
                event,
                DashboardEvent::PortfolioLoaded(_) | DashboardEvent::NewsLoaded(_)
            ));
            let _ = dashboard.handle_event(event);
        }

        assert_eq!(dashboard.context().portfolio, demo::portfolio());
        assert_eq!(dashboard.context().news.len(), 1);

        let updates = drain(&mut views);
        assert_eq!(updates.len(), 2);
        assert!(updates.iter().any(|u| matches!(
            u,
            ViewUpdate::Portfolio {
                source: DataSource::Demo,
                ..
            }
        )));
        assert!(updates.iter().any(|u| matches!(
            u,
            ViewUpdate::News {
                source: DataSource::Live,
                ..
            }
        )));
    }

    /// Backend whose portfolio endpoint takes 25 seconds to answer
    struct SlowPortfolioApi;

    #[async_trait]
    impl DashboardApi for SlowPortfolioApi {
        async fn get_portfolio(&self) -> Result<Portfolio> {
            tokio::time::sleep(Duration::from_secs(25)).await;
            Ok(demo::portfolio())
        }

        async fn get_news(&self) -> Result<Vec<NewsItem>> {
            Ok(Vec::new())
        }

        async fn start_analysis(&self) -> Result<()> {
            Ok(())
        }

        async fn get_status(&self) -> Result<StatusSnapshot> {
            Ok(StatusSnapshot::default())
        }

        async fn get_agent_opinions(&self) -> Result<Vec<AgentOpinion>> {
            Ok(Vec::new())
        }

        async fn get_risk_assessments(&self) -> Result<Vec<RiskAssessment>> {
            Ok(Vec::new())
        }

        async fn get_recommendations(&self) -> Result<String> {
            Ok(String::new())
        }

        async fn health(&self) -> Result<HealthStatus> {
            Err(DashboardError::Other("not served".to_string()))
        }

        async fn backtest(&self, _days: u32) -> Result<BacktestReport> {
            Err(DashboardError::Other("not served".to_string()))
        }
    }

    /// Channel that delivers one status frame and then stays open
    struct OneFrameTransport {
        frame: Option<String>,
    }

    #[async_trait]
    impl ChannelTransport for OneFrameTransport {
        async fn recv(&mut self) -> Option<Result<String>> {
            match self.frame.take() {
                Some(frame) => Some(Ok(frame)),
                None => std::future::pending().await,
            }
        }

        async fn send_text(&mut self, _text: &str) -> Result<()> {
            Ok(())
        }
    }

    struct OneFrameConnector;

    #[async_trait]
    impl ChannelConnector for OneFrameConnector {
        async fn connect(&self, _url: &Url) -> Result<Box<dyn ChannelTransport>> {
            Ok(Box::new(OneFrameTransport {
                frame: Some(r#"{"type":"status","message":"Collecting news..."}"#.to_string()),
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_initial_load_does_not_hold_up_the_loop() {
        let (views_tx, mut views) = mpsc::unbounded_channel();
        let ctx = DashboardContext::with_progress(ProgressMeter::with_seed(90.0, 10.0, 3));
        let dashboard =
            Dashboard::with_context(config(), Arc::new(SlowPortfolioApi), views_tx, ctx);
        let handle = dashboard.handle();
        assert!(handle.start_analysis());
        let running = tokio::spawn(dashboard.run(Arc::new(OneFrameConnector)));

        let started = tokio::time::Instant::now();
        let mut seen = Vec::new();
        while let Some(update) = views.recv().await {
            let is_portfolio = matches!(update, ViewUpdate::Portfolio { .. });
            seen.push(update);
            if is_portfolio {
                break;
            }
        }
        assert!(started.elapsed() >= Duration::from_secs(25));

        let position = |pred: fn(&ViewUpdate) -> bool| seen.iter().position(|u| pred(u));
        let portfolio = position(|u| matches!(u, ViewUpdate::Portfolio { .. })).unwrap();
        let status = position(|u| matches!(u, ViewUpdate::Status(_))).unwrap();
        let run_started = position(|u| matches!(u, ViewUpdate::RunStarted)).unwrap();
        assert!(status < portfolio);
        assert!(run_started < portfolio);

        assert!(handle.shutdown());
        assert_ok!(assert_ok!(running.await));
    }

    #[tokio::test]
    async fn test_channel_frames_and_shutdown() {
        let api = MockDashboardApi::new();
        let (mut dashboard, mut views) = dashboard(api);
        let handle = dashboard.handle();

        assert!(handle.send(DashboardEvent::ChannelStateChanged(ChannelState::Open)));
        assert!(handle.send(opinion_frame()));
        assert!(handle.shutdown());

        let mut flow = ControlFlow::Continue(());
        while flow.is_continue() {
            let event = assert_ok!(
                dashboard.next_event().await.ok_or("event channel closed")
            );
            flow = dashboard.handle_event(event);
        }

        assert_eq!(dashboard.context().channel_state, ChannelState::Open);
        let updates = drain(&mut views);
        assert!(matches!(&updates[1], ViewUpdate::Opinion(o) if o.action == Action::Buy));
    }
}
