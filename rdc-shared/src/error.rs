use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A structurally inconsistent combination of inputs.
    #[error("invalid argument")]
    ErrInvalidArgument,

    /// The underlying transport engine failed to start.
    #[error("initialise failed")]
    ErrInitializeFailed,

    /// ErrDataChannelClosed indicates an operation executed when the data
    /// channel is not (yet) open or closed.
    #[error("data channel closed")]
    ErrDataChannelClosed,

    /// The transport cannot switch to the requested delivery mode.
    #[error("streaming mode not supported")]
    ErrStreamingNotSupported,

    /// An operation was executed on a runtime that has been closed.
    #[error("runtime closed")]
    ErrRuntimeClosed,

    /// The host timer handler reported a failure.
    #[error("timer handler failed")]
    ErrTimerHandlerFailed,

    /// Failure reported by the concrete transport.
    #[error("transport: {0}")]
    ErrTransport(String),
}
