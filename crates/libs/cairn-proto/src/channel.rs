//! Channel records.

/// One entry in a node's channel table.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Channel {
    #[prost(int32, tag = "1")]
    pub index: i32,
    #[prost(message, optional, tag = "2")]
    pub settings: Option<ChannelSettings>,
    #[prost(enumeration = "ChannelRole", tag = "3")]
    pub role: i32,
}

/// Over-the-air parameters for one channel.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ChannelSettings {
    /// Pre-shared key; empty means the well-known default key.
    #[prost(bytes = "vec", tag = "1")]
    pub psk: Vec<u8>,
    #[prost(string, tag = "2")]
    pub name: String,
    /// Random identifier salting the channel hash so same-named channels
    /// with different keys stay distinct.
    #[prost(uint32, tag = "3")]
    pub id: u32,
    #[prost(bool, tag = "4")]
    pub uplink_enabled: bool,
    #[prost(bool, tag = "5")]
    pub downlink_enabled: bool,
}

/// Whether a channel slot is unused, the primary channel, or secondary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ChannelRole {
    Disabled = 0,
    Primary = 1,
    Secondary = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_channel_slot_is_disabled() {
        let channel = Channel::default();
        assert_eq!(channel.role, ChannelRole::Disabled as i32);
        assert!(channel.settings.is_none());
    }
}
