use bytes::BytesMut;
use shared::error::Result;
use std::fmt;
use std::rc::Rc;

use crate::data_channel::DataChannel;
use crate::parameters::ChannelParameters;

/// TransportKind identifies the concrete transport behind a
/// [`DataTransport`]. Channels never branch on it except for diagnostics.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum TransportKind {
    /// An SCTP association carried over DTLS.
    #[default]
    Sctp,
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportKind::Sctp => write!(f, "SCTP"),
        }
    }
}

/// DataTransport is the capability interface a concrete transport offers
/// to the channel layer.
///
/// One transport instance is shared read-only by every channel bound to
/// it; it owns no channels itself. Implementations keep their own
/// per-channel bookkeeping (see [`DataChannel::transport_handle`]) and must
/// enter the runtime's upcall scope before driving a channel's state
/// machine or delivering messages, since those upcalls may reenter this
/// layer before they return.
pub trait DataTransport {
    /// Identifies the concrete transport kind.
    fn kind(&self) -> TransportKind;

    /// Registers a newly constructed channel with the transport. Invoked
    /// by the channel constructor before the channel is handed to the
    /// caller; an error aborts channel construction.
    fn channel_create(
        &self,
        channel: &Rc<DataChannel>,
        parameters: &ChannelParameters,
    ) -> Result<()>;

    /// Asks the transport to tear the channel down. Completion is reported
    /// back through [`DataChannel::set_state`].
    fn channel_close(&self, channel: &DataChannel) -> Result<()>;

    /// Hands one outgoing message to the transport, which takes ownership
    /// of the buffer. An empty buffer is a valid zero-length message, not
    /// an error.
    fn channel_send(&self, channel: &DataChannel, buffer: BytesMut, is_binary: bool)
        -> Result<()>;

    /// Switches the channel between per-message framing and raw streaming
    /// delivery. A transport that cannot honour the requested mode fails
    /// with `ErrStreamingNotSupported` instead of silently ignoring the
    /// request.
    fn channel_set_streaming(&self, channel: &DataChannel, on: bool) -> Result<()>;
}
