//! Scheduled tasks with cancellation handles
//!
//! Timers in the dashboard (status poller, channel reconnect delay) run as tokio
//! tasks. Each one is represented by a [`TaskHandle`] so that its owner can
//! stop it deterministically.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

/// Handle to a scheduled task
///
/// Dropping the handle detaches the task; only [`TaskHandle::cancel`] stops it.
#[derive(Debug)]
pub struct TaskHandle {
    name: &'static str,
    handle: JoinHandle<()>,
}

impl TaskHandle {
    /// Name given when the task was scheduled
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the task is still scheduled or running
    pub fn is_active(&self) -> bool {
        !self.handle.is_finished()
    }

    /// Stop the task. Aborts an in-flight run; calling it again is a no-op.
    pub fn cancel(&self) {
        if self.is_active() {
            debug!(task = self.name, "cancelling scheduled task");
        }
        self.handle.abort();
    }
}

/// Wrap an already running future in a [`TaskHandle`]
pub fn spawn_task<F>(name: &'static str, task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    TaskHandle {
        name,
        handle: tokio::spawn(task),
    }
}

/// Run `task` once after `delay`
pub fn schedule_once<F>(name: &'static str, delay: Duration, task: F) -> TaskHandle
where
    F: Future<Output = ()> + Send + 'static,
{
    spawn_task(name, async move {
        tokio::time::sleep(delay).await;
        task.await;
    })
}

/// Run `task` every `period`, first after one full period
///
/// Runs never overlap: a slow run delays the next tick instead of stacking.
pub fn schedule_every<F, Fut>(name: &'static str, period: Duration, mut task: F) -> TaskHandle
where
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    spawn_task(name, async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            task().await;
        }
    })
}
