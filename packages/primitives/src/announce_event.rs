//! The event a peer attaches to an `announce` request.
use std::str::FromStr;

/// Announce events. Described on the
/// [BEP 3. The `BitTorrent` Protocol Specification](https://www.bittorrent.org/beps/bep_0003.html).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnnounceEvent {
    /// The peer has started downloading the torrent.
    Started,
    /// The peer has ceased downloading the torrent.
    Stopped,
    /// The peer has completed downloading the torrent.
    Completed,
    /// A regular re-announce; no event.
    #[default]
    None,
}

impl AnnounceEvent {
    /// Decodes the numeric event used by the UDP tracker protocol
    /// ([BEP 15](https://www.bittorrent.org/beps/bep_0015.html)).
    ///
    /// Values outside the protocol range map to [`AnnounceEvent::None`],
    /// which is how existing trackers treat them.
    #[must_use]
    pub fn from_udp_id(id: u32) -> Self {
        match id {
            1 => Self::Completed,
            2 => Self::Started,
            3 => Self::Stopped,
            _ => Self::None,
        }
    }

    /// Encodes the event as the numeric value used by the UDP tracker
    /// protocol.
    #[must_use]
    pub fn to_udp_id(self) -> u32 {
        match self {
            Self::None => 0,
            Self::Completed => 1,
            Self::Started => 2,
            Self::Stopped => 3,
        }
    }
}

impl FromStr for AnnounceEvent {
    type Err = InvalidAnnounceEvent;

    /// Parses the textual event names used by the HTTP announce request.
    /// An empty string means "no event", like a missing param.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "started" => Ok(Self::Started),
            "stopped" => Ok(Self::Stopped),
            "completed" => Ok(Self::Completed),
            "" | "empty" => Ok(Self::None),
            other => Err(InvalidAnnounceEvent(other.to_string())),
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid announce event: {0}")]
pub struct InvalidAnnounceEvent(pub String);

#[cfg(test)]
mod tests {

    mod the_announce_event {
        use crate::announce_event::AnnounceEvent;

        #[test]
        fn it_should_round_trip_through_the_udp_numeric_encoding() {
            for event in [
                AnnounceEvent::None,
                AnnounceEvent::Completed,
                AnnounceEvent::Started,
                AnnounceEvent::Stopped,
            ] {
                assert_eq!(AnnounceEvent::from_udp_id(event.to_udp_id()), event);
            }
        }

        #[test]
        fn it_should_treat_unknown_udp_ids_as_no_event() {
            assert_eq!(AnnounceEvent::from_udp_id(42), AnnounceEvent::None);
        }

        #[test]
        fn it_should_be_parsed_from_the_http_event_param() {
            assert_eq!("started".parse(), Ok(AnnounceEvent::Started));
            assert_eq!("stopped".parse(), Ok(AnnounceEvent::Stopped));
            assert_eq!("completed".parse(), Ok(AnnounceEvent::Completed));
            assert_eq!("".parse(), Ok(AnnounceEvent::None));
            assert!("paused".parse::<AnnounceEvent>().is_err());
        }
    }
}
