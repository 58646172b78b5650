use super::*;

#[test]
fn test_reliable_parameters_ignore_reliability_parameter() {
    for channel_type in [ChannelType::Reliable, ChannelType::ReliableUnordered] {
        let parameters =
            ChannelParameters::new(Some("chat"), channel_type, 1337, None, false, 0);
        assert_eq!(
            parameters.reliability_parameter(),
            None,
            "reliable channels should carry no reliability parameter"
        );
    }
}

#[test]
fn test_partial_reliable_parameters_keep_reliability_parameter() {
    let parameters = ChannelParameters::new(
        None,
        ChannelType::PartialReliableRexmitUnordered,
        7,
        None,
        false,
        0,
    );
    assert_eq!(parameters.reliability_parameter(), Some(7));

    let parameters =
        ChannelParameters::new(None, ChannelType::PartialReliableTimed, 300, None, false, 0);
    assert_eq!(parameters.reliability_parameter(), Some(300));
}

#[test]
fn test_negotiated_id() {
    let parameters = ChannelParameters::new(None, ChannelType::Reliable, 0, None, true, 5);
    assert!(parameters.negotiated());
    assert_eq!(parameters.id(), Some(5), "negotiated id should be stored");

    let parameters = ChannelParameters::new(None, ChannelType::Reliable, 0, None, false, 5);
    assert!(!parameters.negotiated());
    assert_eq!(
        parameters.id(),
        None,
        "id should be absent unless negotiated"
    );
}

#[test]
fn test_label_and_protocol_round_trip() {
    let label = String::from("chat");
    let protocol = String::from("v1");
    let parameters = ChannelParameters::new(
        Some(&label),
        ChannelType::Reliable,
        0,
        Some(&protocol),
        false,
        0,
    );

    // The parameters own independent copies of the caller's text.
    drop(label);
    drop(protocol);
    assert_eq!(parameters.label(), Some("chat"));
    assert_eq!(parameters.protocol(), Some("v1"));

    let parameters = ChannelParameters::new(None, ChannelType::Reliable, 0, None, false, 0);
    assert_eq!(parameters.label(), None);
    assert_eq!(parameters.protocol(), None);
}

#[test]
fn test_from_owned_matches_copying_constructor() {
    let copied = ChannelParameters::new(
        Some("chat"),
        ChannelType::PartialReliableRexmit,
        3,
        Some("v1"),
        true,
        11,
    );
    let owned = ChannelParameters::from_owned(
        Some(String::from("chat")),
        ChannelType::PartialReliableRexmit,
        3,
        Some(String::from("v1")),
        true,
        11,
    );
    assert_eq!(copied, owned, "both constructors should build equal values");
}

#[test]
fn test_channel_type_ordering_and_reliability() {
    let cases = [
        (ChannelType::Reliable, true, ReliabilityMode::Reliable),
        (ChannelType::ReliableUnordered, false, ReliabilityMode::Reliable),
        (ChannelType::PartialReliableRexmit, true, ReliabilityMode::Rexmit),
        (
            ChannelType::PartialReliableRexmitUnordered,
            false,
            ReliabilityMode::Rexmit,
        ),
        (ChannelType::PartialReliableTimed, true, ReliabilityMode::Timed),
        (
            ChannelType::PartialReliableTimedUnordered,
            false,
            ReliabilityMode::Timed,
        ),
    ];

    for (channel_type, ordered, reliability) in cases {
        assert_eq!(channel_type.ordered(), ordered, "{channel_type:?}");
        assert_eq!(channel_type.reliability(), reliability, "{channel_type:?}");
    }
}

#[test]
fn test_negotiate_channel_type() -> Result<()> {
    assert_eq!(
        ChannelType::negotiate(true, None, None)?,
        (ChannelType::Reliable, 0)
    );
    assert_eq!(
        ChannelType::negotiate(false, None, None)?,
        (ChannelType::ReliableUnordered, 0)
    );
    assert_eq!(
        ChannelType::negotiate(false, Some(5), None)?,
        (ChannelType::PartialReliableRexmitUnordered, 5)
    );
    assert_eq!(
        ChannelType::negotiate(true, None, Some(1000))?,
        (ChannelType::PartialReliableTimed, 1000)
    );
    assert_eq!(
        ChannelType::negotiate(true, Some(5), Some(1000)),
        Err(Error::ErrInvalidArgument),
        "retransmit count and packet lifetime are mutually exclusive"
    );
    Ok(())
}
