#[cfg(test)]
mod parameters_test;

use serde::{Deserialize, Serialize};
use shared::error::{Error, Result};

/// ChannelType packs a channel's reliability contract together with its
/// message ordering guarantee into the externally visible type value.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum ChannelType {
    /// Messages are retransmitted until acknowledged and delivered in order.
    #[default]
    Reliable,
    /// Messages are retransmitted until acknowledged; ordering is not
    /// preserved.
    ReliableUnordered,
    /// Retransmission is bounded by a count; in-order delivery.
    PartialReliableRexmit,
    /// Retransmission is bounded by a count; ordering is not preserved.
    PartialReliableRexmitUnordered,
    /// (Re-)transmission is bounded by a time window; in-order delivery.
    PartialReliableTimed,
    /// (Re-)transmission is bounded by a time window; ordering is not
    /// preserved.
    PartialReliableTimedUnordered,
}

/// ReliabilityMode is the retransmission bound of a [`ChannelType`] with
/// the ordering guarantee factored out.
#[derive(Default, Debug, Copy, Clone, Eq, PartialEq)]
pub enum ReliabilityMode {
    #[default]
    Reliable,
    Rexmit,
    Timed,
}

impl ChannelType {
    /// Ordered returns true if messages on a channel of this type are
    /// delivered in order.
    pub fn ordered(&self) -> bool {
        matches!(
            self,
            ChannelType::Reliable
                | ChannelType::PartialReliableRexmit
                | ChannelType::PartialReliableTimed
        )
    }

    /// Reliability returns the retransmission bound of this channel type.
    pub fn reliability(&self) -> ReliabilityMode {
        match self {
            ChannelType::Reliable | ChannelType::ReliableUnordered => ReliabilityMode::Reliable,
            ChannelType::PartialReliableRexmit | ChannelType::PartialReliableRexmitUnordered => {
                ReliabilityMode::Rexmit
            }
            ChannelType::PartialReliableTimed | ChannelType::PartialReliableTimedUnordered => {
                ReliabilityMode::Timed
            }
        }
    }

    /// Maps the (ordered, max_retransmits, max_packet_life_time) triple a
    /// negotiation surface works with onto the channel type and reliability
    /// parameter carried on the wire.
    ///
    /// max_retransmits and max_packet_life_time are mutually exclusive;
    /// setting both fails with `ErrInvalidArgument`.
    pub fn negotiate(
        ordered: bool,
        max_retransmits: Option<u16>,
        max_packet_life_time: Option<u16>,
    ) -> Result<(ChannelType, u32)> {
        match (max_retransmits, max_packet_life_time) {
            (None, None) => {
                if ordered {
                    Ok((ChannelType::Reliable, 0))
                } else {
                    Ok((ChannelType::ReliableUnordered, 0))
                }
            }
            (Some(max_retransmits), None) => {
                if ordered {
                    Ok((ChannelType::PartialReliableRexmit, max_retransmits as u32))
                } else {
                    Ok((
                        ChannelType::PartialReliableRexmitUnordered,
                        max_retransmits as u32,
                    ))
                }
            }
            (None, Some(max_packet_life_time)) => {
                if ordered {
                    Ok((ChannelType::PartialReliableTimed, max_packet_life_time as u32))
                } else {
                    Ok((
                        ChannelType::PartialReliableTimedUnordered,
                        max_packet_life_time as u32,
                    ))
                }
            }
            (Some(_), Some(_)) => Err(Error::ErrInvalidArgument),
        }
    }
}

/// ChannelParameters describes the negotiated identity and reliability
/// contract of a single data channel.
///
/// Parameters are immutable once built and shared read-only by every holder
/// of the channel.
#[derive(Default, Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChannelParameters {
    label: Option<String>,
    protocol: Option<String>,
    channel_type: ChannelType,
    reliability_parameter: u32,
    negotiated: bool,
    id: u16,
}

impl ChannelParameters {
    /// Creates data channel parameters, copying the label and protocol
    /// text.
    ///
    /// For the `Reliable*` channel types the reliability parameter is
    /// ignored. For `PartialReliableRexmit*` it is the number of times a
    /// retransmission occurs if not acknowledged before the message is
    /// discarded. For `PartialReliableTimed*` it is the time window in
    /// milliseconds during which (re-)transmissions may occur before the
    /// message is discarded.
    ///
    /// In case `negotiated` is set to `false`, the `id` is ignored.
    pub fn new(
        label: Option<&str>,
        channel_type: ChannelType,
        reliability_parameter: u32,
        protocol: Option<&str>,
        negotiated: bool,
        id: u16,
    ) -> Self {
        Self::build(
            label.map(str::to_owned),
            channel_type,
            reliability_parameter,
            protocol.map(str::to_owned),
            negotiated,
            id,
        )
    }

    /// Creates data channel parameters from already-owned label and
    /// protocol text without copying. Establishment parsers hand their
    /// decoded strings straight through here.
    pub fn from_owned(
        label: Option<String>,
        channel_type: ChannelType,
        reliability_parameter: u32,
        protocol: Option<String>,
        negotiated: bool,
        id: u16,
    ) -> Self {
        Self::build(
            label,
            channel_type,
            reliability_parameter,
            protocol,
            negotiated,
            id,
        )
    }

    fn build(
        label: Option<String>,
        channel_type: ChannelType,
        reliability_parameter: u32,
        protocol: Option<String>,
        negotiated: bool,
        id: u16,
    ) -> Self {
        // Reliable channels carry no reliability parameter.
        let reliability_parameter = match channel_type.reliability() {
            ReliabilityMode::Reliable => 0,
            ReliabilityMode::Rexmit | ReliabilityMode::Timed => reliability_parameter,
        };

        Self {
            label,
            protocol,
            channel_type,
            reliability_parameter,
            negotiated,
            id: if negotiated { id } else { 0 },
        }
    }

    /// The label distinguishing this channel from others on the same
    /// transport, or `None` if no label has been set.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// The name of the sub-protocol in use, or `None` if no protocol has
    /// been set.
    pub fn protocol(&self) -> Option<&str> {
        self.protocol.as_deref()
    }

    pub fn channel_type(&self) -> ChannelType {
        self.channel_type
    }

    /// The reliability parameter, or `None` for the `Reliable*` channel
    /// types which carry no such bound.
    pub fn reliability_parameter(&self) -> Option<u32> {
        match self.channel_type.reliability() {
            ReliabilityMode::Reliable => None,
            ReliabilityMode::Rexmit | ReliabilityMode::Timed => Some(self.reliability_parameter),
        }
    }

    /// Whether the channel id was agreed out-of-band before creation.
    pub fn negotiated(&self) -> bool {
        self.negotiated
    }

    /// The pre-agreed stream identifier, or `None` when the channel is not
    /// negotiated and the id is assigned by the establishment handshake
    /// instead.
    pub fn id(&self) -> Option<u16> {
        if self.negotiated {
            Some(self.id)
        } else {
            None
        }
    }
}
