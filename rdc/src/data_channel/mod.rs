
pub mod state;

use bytes::BytesMut;
use log::{debug, warn};
use shared::error::{Error, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::parameters::ChannelParameters;
use crate::transport::{DataTransport, TransportKind};

pub use state::ChannelState;

/// ChannelMessage is one application message delivered on a data channel.
#[derive(Debug, Default, Clone)]
pub struct ChannelMessage {
    /// Whether the payload is binary rather than text.
    pub is_binary: bool,
    /// The payload. An empty payload is a valid zero-length message.
    pub data: BytesMut,
}

/// ChannelObserver receives the events of one data channel.
///
/// Every method has a no-op default, so implementations only provide the
/// events they care about. Observer methods may call back into the channel
/// (for example `send` or `close` from within `on_message`); the channel
/// holds no borrow across a dispatch.
pub trait ChannelObserver {
    /// The channel transitioned to [`ChannelState::Open`]. Fires at most
    /// once per channel lifetime.
    fn on_open(&self, _channel: &DataChannel) {}

    /// The transport's outgoing buffer fell to or below the channel's
    /// buffered-amount-low threshold.
    fn on_buffered_amount_low(&self, _channel: &DataChannel) {}

    /// The transport reported an unrecoverable error. Followed by
    /// `on_close`.
    fn on_error(&self, _channel: &DataChannel, _error: &Error) {}

    /// The channel transitioned to [`ChannelState::Closed`]. Fires at most
    /// once per channel lifetime.
    fn on_close(&self, _channel: &DataChannel) {}

    /// An application message arrived. Only delivered while the channel is
    /// open.
    fn on_message(&self, _channel: &DataChannel, _message: ChannelMessage) {}
}

/// DataChannel is one logical, independently reliable and ordered message
/// stream multiplexed over a shared transport association.
///
/// The channel is shared between the application and its transport as
/// `Rc<DataChannel>` and stays alive as long as either side holds it. All
/// interior state lives in cells, so observer upcalls may reenter the
/// public API.
pub struct DataChannel {
    state: Cell<ChannelState>,
    streamed: Cell<bool>,
    opened: Cell<bool>,
    suppress_open: Cell<bool>,
    transport: Rc<dyn DataTransport>,
    parameters: Rc<ChannelParameters>,
    transport_handle: Cell<Option<usize>>,
    buffered_amount_low_threshold: Cell<usize>,
    observer: RefCell<Option<Rc<dyn ChannelObserver>>>,

    // stats
    messages_sent: Cell<usize>,
    messages_received: Cell<usize>,
    bytes_sent: Cell<usize>,
    bytes_received: Cell<usize>,
}

impl DataChannel {
    /// Creates a data channel bound to `transport` with the given
    /// parameters and registers it with the transport. A registration
    /// failure aborts construction and never yields a channel.
    pub fn create(
        transport: Rc<dyn DataTransport>,
        parameters: Rc<ChannelParameters>,
        observer: Option<Rc<dyn ChannelObserver>>,
    ) -> Result<Rc<Self>> {
        Self::create_internal(transport, parameters, observer, true)
    }

    /// Creates a data channel on behalf of a transport implementation.
    ///
    /// With `call_observer` unset, an open event that would fire while the
    /// transport's `channel_create` drives the channel open is deferred
    /// until the transport's next [`DataChannel::set_state`] call, so the
    /// transport can finish its own handshake first. The open event still
    /// fires at most once.
    pub fn create_internal(
        transport: Rc<dyn DataTransport>,
        parameters: Rc<ChannelParameters>,
        observer: Option<Rc<dyn ChannelObserver>>,
        call_observer: bool,
    ) -> Result<Rc<Self>> {
        let channel = Rc::new(Self {
            state: Cell::new(ChannelState::Connecting),
            streamed: Cell::new(false),
            opened: Cell::new(false),
            suppress_open: Cell::new(!call_observer),
            transport,
            parameters,
            transport_handle: Cell::new(None),
            buffered_amount_low_threshold: Cell::new(0),
            observer: RefCell::new(observer),
            messages_sent: Cell::new(0),
            messages_received: Cell::new(0),
            bytes_sent: Cell::new(0),
            bytes_received: Cell::new(0),
        });

        if let Err(err) = channel
            .transport
            .channel_create(&channel, &channel.parameters)
        {
            // The transport never registered the channel; make sure
            // teardown does not notify it either.
            channel.state.set(ChannelState::Closed);
            return Err(err);
        }
        channel.suppress_open.set(false);

        Ok(channel)
    }

    /// Sends a message to the remote peer. The channel must be open; the
    /// transport is not consulted otherwise. An empty buffer is sent as a
    /// zero-length message.
    pub fn send(&self, data: BytesMut, is_binary: bool) -> Result<()> {
        if self.state.get() != ChannelState::Open {
            return Err(Error::ErrDataChannelClosed);
        }

        let len = data.len();
        self.transport.channel_send(self, data, is_binary)?;

        self.messages_sent.set(self.messages_sent.get() + 1);
        self.bytes_sent.set(self.bytes_sent.get() + len);
        Ok(())
    }

    /// Requests teardown. Idempotent: a channel that is already closing or
    /// closed is left untouched. The transport confirms completion through
    /// [`DataChannel::set_state`]; a failed close leaves the state
    /// unchanged.
    pub fn close(&self) -> Result<()> {
        match self.state.get() {
            ChannelState::Closing | ChannelState::Closed => Ok(()),
            ChannelState::Connecting | ChannelState::Open => {
                self.transport.channel_close(self)?;
                // The transport may have confirmed teardown during the
                // call already.
                if matches!(
                    self.state.get(),
                    ChannelState::Connecting | ChannelState::Open
                ) {
                    self.set_state(ChannelState::Closing);
                }
                Ok(())
            }
        }
    }

    /// Switches the channel between per-message framing and raw streaming
    /// delivery. A no-op when the channel is already in the requested
    /// mode; fails once teardown has begun.
    pub fn set_streaming(&self, on: bool) -> Result<()> {
        if matches!(
            self.state.get(),
            ChannelState::Closing | ChannelState::Closed
        ) {
            return Err(Error::ErrDataChannelClosed);
        }
        if self.streamed.get() == on {
            return Ok(());
        }

        self.transport.channel_set_streaming(self, on)?;
        self.streamed.set(on);
        Ok(())
    }

    /// Registers the observer receiving this channel's events, replacing
    /// any previous one.
    pub fn set_observer(&self, observer: Rc<dyn ChannelObserver>) {
        *self.observer.borrow_mut() = Some(observer);
    }

    /// Removes the registered observer; subsequent events are dropped.
    pub fn clear_observer(&self) {
        *self.observer.borrow_mut() = None;
    }

    /// Drives the channel's state machine. Transport implementations call
    /// this to report establishment and teardown progress.
    ///
    /// `Closed` is terminal: any transition requested afterwards is
    /// ignored, as are transitions that would move the machine backwards.
    /// The open and close events each fire at most once per channel
    /// lifetime.
    pub fn set_state(&self, state: ChannelState) {
        let previous = self.state.get();
        if previous == ChannelState::Closed {
            return;
        }

        let allowed = match state {
            ChannelState::Connecting => previous == ChannelState::Connecting,
            ChannelState::Open => {
                matches!(previous, ChannelState::Connecting | ChannelState::Open)
            }
            ChannelState::Closing | ChannelState::Closed => true,
        };
        if !allowed {
            warn!("ignoring data channel state transition {previous} -> {state}");
            return;
        }

        if previous != state {
            self.state.set(state);
            debug!("data channel state {previous} -> {state}");
        }

        match state {
            ChannelState::Open => {
                if !self.opened.get() && !self.suppress_open.get() {
                    self.opened.set(true);
                    self.with_observer(|observer| observer.on_open(self));
                }
            }
            ChannelState::Closed => {
                self.with_observer(|observer| observer.on_close(self));
            }
            ChannelState::Connecting | ChannelState::Closing => {}
        }
    }

    /// Reports an unrecoverable transport error: dispatches the error to
    /// the observer, then closes the channel directly from any state.
    pub fn fail(&self, error: Error) {
        if self.state.get() == ChannelState::Closed {
            return;
        }

        warn!("data channel failed: {error}");
        self.with_observer(|observer| observer.on_error(self, &error));
        self.set_state(ChannelState::Closed);
    }

    /// Delivers one incoming message to the observer. Messages arriving
    /// while the channel is not open are dropped.
    pub fn deliver_message(&self, message: ChannelMessage) {
        if self.state.get() != ChannelState::Open {
            debug!(
                "dropping message received on {} data channel",
                self.state.get()
            );
            return;
        }

        self.messages_received.set(self.messages_received.get() + 1);
        self.bytes_received
            .set(self.bytes_received.get() + message.data.len());
        self.with_observer(|observer| observer.on_message(self, message));
    }

    /// Signals that the transport's outgoing buffer fell to or below the
    /// channel's threshold. Ignored unless the channel is open.
    pub fn notify_buffered_amount_low(&self) {
        if self.state.get() != ChannelState::Open {
            return;
        }
        self.with_observer(|observer| observer.on_buffered_amount_low(self));
    }

    /// The channel's current lifecycle state.
    pub fn state(&self) -> ChannelState {
        self.state.get()
    }

    /// The negotiated parameters the channel was created with.
    pub fn parameters(&self) -> &ChannelParameters {
        &self.parameters
    }

    /// The kind of the transport the channel is bound to. Diagnostics
    /// only.
    pub fn transport_kind(&self) -> TransportKind {
        self.transport.kind()
    }

    /// Whether the channel currently delivers data in streaming mode.
    pub fn is_streamed(&self) -> bool {
        self.streamed.get()
    }

    /// The opaque per-channel slot the owning transport uses as a lookup
    /// key into its own bookkeeping. Never interpreted by this layer.
    pub fn transport_handle(&self) -> Option<usize> {
        self.transport_handle.get()
    }

    pub fn set_transport_handle(&self, handle: Option<usize>) {
        self.transport_handle.set(handle);
    }

    /// The threshold at which the transport's outgoing buffer is
    /// considered low. Defaults to 0.
    pub fn buffered_amount_low_threshold(&self) -> usize {
        self.buffered_amount_low_threshold.get()
    }

    /// SetBufferedAmountLowThreshold is used to update the threshold. See
    /// [`DataChannel::buffered_amount_low_threshold`].
    pub fn set_buffered_amount_low_threshold(&self, threshold: usize) {
        self.buffered_amount_low_threshold.set(threshold);
    }

    /// MessagesSent returns the number of messages sent.
    pub fn messages_sent(&self) -> usize {
        self.messages_sent.get()
    }

    /// MessagesReceived returns the number of messages received.
    pub fn messages_received(&self) -> usize {
        self.messages_received.get()
    }

    /// BytesSent returns the number of payload bytes sent.
    pub fn bytes_sent(&self) -> usize {
        self.bytes_sent.get()
    }

    /// BytesReceived returns the number of payload bytes received.
    pub fn bytes_received(&self) -> usize {
        self.bytes_received.get()
    }

    // Dispatch helper: clones the observer handle out so no borrow is held
    // while the observer runs and possibly reenters the channel. No-ops
    // when no observer is registered.
    fn with_observer(&self, f: impl FnOnce(&dyn ChannelObserver)) {
        let observer = self.observer.borrow().clone();
        if let Some(observer) = observer {
            f(observer.as_ref());
        }
    }
}

impl Drop for DataChannel {
    fn drop(&mut self) {
        // Last holder let go without closing; ask the transport to tear
        // the channel down best-effort.
        if self.state.get() != ChannelState::Closed {
            debug!("dropping {} data channel", self.state.get());
            if let Err(err) = self.transport.channel_close(self) {
                warn!("transport close on drop failed: {err}");
            }
        }
    }
}
