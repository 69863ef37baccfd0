//! Application port numbers.

/// Selects which application protocol a [`Data`](crate::Data) payload
/// belongs to. Wire values are fixed by the firmware; ranges below 64 are
/// core protocols, 64–255 registered modules, 256–511 private use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PortNum {
    Unknown = 0,
    TextMessage = 1,
    RemoteHardware = 2,
    Position = 3,
    NodeInfo = 4,
    /// Route traces and delivery error reports.
    Routing = 5,
    /// Device administration (this crate's [`AdminMessage`](crate::AdminMessage)).
    Admin = 6,
    Waypoint = 8,
    Audio = 9,
    DetectionSensor = 10,
    Reply = 32,
    Paxcounter = 34,
    Serial = 64,
    StoreForward = 65,
    RangeTest = 66,
    Telemetry = 67,
    Traceroute = 70,
    NeighborInfo = 71,
    PrivateApp = 256,
    Max = 511,
}

impl PortNum {
    /// Ports the companion app itself originates requests on.
    pub fn is_client_originated(self) -> bool {
        matches!(
            self,
            Self::TextMessage | Self::Admin | Self::Traceroute | Self::RangeTest | Self::PrivateApp
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_are_stable() {
        assert_eq!(PortNum::Routing as i32, 5);
        assert_eq!(PortNum::Admin as i32, 6);
        assert_eq!(PortNum::Telemetry as i32, 67);
        assert_eq!(PortNum::PrivateApp as i32, 256);
    }

    #[test]
    fn unknown_wire_value_does_not_convert() {
        assert!(PortNum::try_from(7777).is_err());
    }
}
