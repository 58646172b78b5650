#![warn(rust_2018_idioms)]
#![allow(dead_code)]

//! # rdc - Data Channel Protocol Layer
//!
//! A sans-I/O data channel layer that turns a raw, stream-oriented,
//! congestion-controlled transport association into a set of independently
//! addressable, independently reliable logical channels with
//! RTCDataChannel-style lifecycle and delivery semantics.
//!
//! The crate contains no networking and starts no threads: a concrete
//! transport implements the [`transport::DataTransport`] trait and drives
//! each channel's state machine through synchronous upcalls, while the host
//! advances the transport engine's internal clocks by calling
//! [`runtime::Runtime::tick`] with elapsed wall time. Segmentation,
//! retransmission, congestion control and wire framing stay on the
//! transport's side of that seam.

pub mod data_channel;
pub mod parameters;
pub mod runtime;
pub mod transport;

pub use data_channel::{ChannelMessage, ChannelObserver, ChannelState, DataChannel};
pub use parameters::{ChannelParameters, ChannelType, ReliabilityMode};
pub use runtime::{Runtime, TimerHandler, TransportEngine};
pub use transport::{DataTransport, TransportKind};
