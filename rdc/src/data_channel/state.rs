use serde::{Deserialize, Serialize};
use std::fmt;

/// ChannelState is the position of a data channel in its lifecycle.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ChannelState {
    /// The establishment handshake has not completed yet.
    #[default]
    Connecting,
    /// The channel is established and may carry messages.
    Open,
    /// Teardown was requested and awaits transport confirmation.
    Closing,
    /// The channel is fully torn down. Terminal.
    Closed,
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChannelState::Connecting => "connecting",
            ChannelState::Open => "open",
            ChannelState::Closing => "closing",
            ChannelState::Closed => "closed",
        };
        write!(f, "{s}")
    }
}
