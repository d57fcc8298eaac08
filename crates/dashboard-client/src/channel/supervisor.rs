//! Reconnecting channel supervisor

use super::ChannelState;
use super::transport::{ChannelConnector, ChannelTransport};
use crate::config::DashboardConfig;
use crate::dashboard::DashboardEvent;
use crate::error::{DashboardError, Result};
use crate::message::PING;
use crate::scheduler::{TaskHandle, schedule_once, spawn_task};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc::UnboundedSender, oneshot};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tracing::{debug, info, warn};
use url::Url;

/// Keeps the channel connected and forwards every frame to the event loop
///
/// Runs until the event loop goes away or its [`TaskHandle`] is cancelled.
pub struct ChannelSupervisor {
    url: Url,
    connector: Arc<dyn ChannelConnector>,
    events: UnboundedSender<DashboardEvent>,
    reconnect_delay: Duration,
    keepalive: Option<Duration>,
}

impl ChannelSupervisor {
    pub fn new(
        config: &DashboardConfig,
        connector: Arc<dyn ChannelConnector>,
        events: UnboundedSender<DashboardEvent>,
    ) -> Result<Self> {
        Ok(Self {
            url: config.channel_url()?,
            connector,
            events,
            reconnect_delay: config.reconnect_delay,
            keepalive: config.keepalive_interval,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn spawn(self) -> TaskHandle {
        spawn_task("channel-supervisor", self.run())
    }

    /// Connect, pump, and reconnect after `reconnect_delay`, forever
    pub async fn run(self) {
        let mut attempt: u64 = 0;

        loop {
            attempt += 1;
            if !self.notify(ChannelState::Connecting) {
                break;
            }

            match self.connector.connect(&self.url).await {
                Ok(transport) => {
                    info!(url = %self.url, attempt, "channel open");
                    attempt = 0;
                    if !self.notify(ChannelState::Open) {
                        break;
                    }
                    match self.pump(transport).await {
                        Ok(()) => info!("channel closed"),
                        Err(e) => warn!(error = %e, "channel dropped"),
                    }
                }
                Err(e) => warn!(url = %self.url, attempt, error = %e, "channel connect failed"),
            }

            if !self.notify(ChannelState::Disconnected) {
                break;
            }
            if !self.wait_for_reconnect().await {
                break;
            }
        }

        debug!("event loop gone, channel supervisor stopping");
    }

    /// Park until the reconnect one-shot fires. `false` if it was cancelled.
    async fn wait_for_reconnect(&self) -> bool {
        debug!(delay = ?self.reconnect_delay, "reconnecting");
        let (wake, woken) = oneshot::channel();
        let _timer = schedule_once("channel-reconnect", self.reconnect_delay, async move {
            let _ = wake.send(());
        });
        woken.await.is_ok()
    }

    async fn pump(&self, mut transport: Box<dyn ChannelTransport>) -> Result<()> {
        let mut keepalive = self.keepalive.map(|period| {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            ticker
        });

        loop {
            tokio::select! {
                frame = transport.recv() => match frame {
                    Some(Ok(text)) => {
                        if self.events.send(DashboardEvent::Inbound(text)).is_err() {
                            return Err(DashboardError::Transport("event loop closed".to_string()));
                        }
                    }
                    Some(Err(e)) => return Err(e),
                    None => return Ok(()),
                },
                () = next_tick(keepalive.as_mut()) => {
                    transport.send_text(PING).await?;
                    debug!("keepalive sent");
                }
            }
        }
    }

    fn notify(&self, state: ChannelState) -> bool {
        self.events
            .send(DashboardEvent::ChannelStateChanged(state))
            .is_ok()
    }
}

async fn next_tick(interval: Option<&mut Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}
