//! Live update channel
//!
//! The channel is a WebSocket at `/ws` on the dashboard origin. A
//! [`ChannelSupervisor`] keeps it connected for the lifetime of the process:
//! every close, error or failed connect schedules one reconnect attempt after
//! a fixed delay.

pub mod supervisor;
pub mod transport;

pub use supervisor::ChannelSupervisor;
pub use transport::{ChannelConnector, ChannelTransport, WsConnector};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the channel: `Disconnected → Connecting → Open → Disconnected`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    #[default]
    Disconnected,
    Connecting,
    Open,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChannelState::Disconnected => write!(f, "disconnected"),
            ChannelState::Connecting => write!(f, "connecting"),
            ChannelState::Open => write!(f, "connected"),
        }
    }
}
