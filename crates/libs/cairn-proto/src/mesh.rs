//! Mesh packet envelope and application payload.
//!
//! [`MeshPacket`] is the outer addressed container every message travels
//! in. Its payload is exactly one of `decoded` (a [`Data`] the local side
//! can read) or `encrypted` (opaque bytes prior to decryption) — the two
//! never coexist, and an envelope with neither is malformed.

use crate::portnum::PortNum;
use crate::wire::WireError;

/// The outer wire container: addressing, relay budget, and one payload.
///
/// `rx_time`/`rx_snr` are receive-side metadata stamped by the local
/// radio; they are zero on the sending side and never round-trip through
/// the mesh.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeshPacket {
    /// Sending node, `0` = broadcast origin (never a valid unicast source).
    #[prost(uint32, tag = "1")]
    pub from: u32,
    /// Destination node, `0` = broadcast.
    #[prost(uint32, tag = "2")]
    pub to: u32,
    /// Channel index the packet was sent on.
    #[prost(uint32, tag = "3")]
    pub channel: u32,
    #[prost(oneof = "mesh_packet::PayloadVariant", tags = "4, 5")]
    pub payload_variant: Option<mesh_packet::PayloadVariant>,
    /// Packet identifier, unique per sender for the packet's lifetime.
    /// Replies carry it back in [`Data::request_id`].
    #[prost(uint32, tag = "6")]
    pub id: u32,
    /// Local receive timestamp (epoch seconds), receive side only.
    #[prost(uint32, tag = "7")]
    pub rx_time: u32,
    /// Signal-to-noise ratio measured on receive, receive side only.
    #[prost(float, tag = "8")]
    pub rx_snr: f32,
    /// Remaining relay budget. Each hop decrements it; the mesh silently
    /// drops the packet when it reaches zero.
    #[prost(uint32, tag = "9")]
    pub hop_limit: u32,
    /// Request a link-level acknowledgement from the destination.
    #[prost(bool, tag = "10")]
    pub want_ack: bool,
    #[prost(int32, tag = "11")]
    pub priority: i32,
    /// Deferred-send marker for store-and-forward style delivery.
    #[prost(int32, tag = "12")]
    pub delayed: i32,
}

pub mod mesh_packet {
    /// Exactly one of these is present on a well-formed packet.
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        /// Payload after decryption (or before encryption on send).
        #[prost(message, tag = "4")]
        Decoded(super::Data),
        /// Opaque ciphertext as carried over the air.
        #[prost(bytes, tag = "5")]
        Encrypted(Vec<u8>),
    }
}

impl MeshPacket {
    /// The decoded payload, if this envelope has been decrypted.
    pub fn decoded(&self) -> Option<&Data> {
        match &self.payload_variant {
            Some(mesh_packet::PayloadVariant::Decoded(data)) => Some(data),
            _ => None,
        }
    }

    /// Checked accessor for [`MeshPacket::priority`].
    pub fn priority(&self) -> Result<Priority, WireError> {
        Priority::try_from(self.priority)
            .map_err(|_| WireError::unknown_variant("MeshPacket.priority", self.priority))
    }

    /// Checked accessor for [`MeshPacket::delayed`].
    pub fn delayed(&self) -> Result<Delayed, WireError> {
        Delayed::try_from(self.delayed)
            .map_err(|_| WireError::unknown_variant("MeshPacket.delayed", self.delayed))
    }
}

/// An application payload: which protocol it belongs to, the bytes, and
/// the correlation ids tying replies to the packets they answer.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Data {
    #[prost(int32, tag = "1")]
    pub portnum: i32,
    /// Opaque bytes, interpreted according to `portnum`.
    #[prost(bytes = "vec", tag = "2")]
    pub payload: Vec<u8>,
    /// The sender expects an application-level reply to this payload.
    #[prost(bool, tag = "3")]
    pub want_response: bool,
    /// Logical destination for multi-hop replies, distinct from the
    /// envelope's `to`.
    #[prost(uint32, tag = "4")]
    pub dest: u32,
    /// Logical source for multi-hop replies, distinct from the envelope's
    /// `from`.
    #[prost(uint32, tag = "5")]
    pub source: u32,
    /// Non-zero when this payload is itself a reply: the envelope `id` of
    /// the packet it answers.
    #[prost(uint32, tag = "6")]
    pub request_id: u32,
    #[prost(uint32, tag = "7")]
    pub reply_id: u32,
    /// Tapback reaction marker (`reply_id` names the reacted-to message).
    #[prost(uint32, tag = "8")]
    pub emoji: u32,
}

impl Data {
    /// Checked accessor for [`Data::portnum`].
    pub fn portnum(&self) -> Result<PortNum, WireError> {
        PortNum::try_from(self.portnum)
            .map_err(|_| WireError::unknown_variant("Data.portnum", self.portnum))
    }
}

/// Transmit priority for the envelope.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Priority {
    Unset = 0,
    Min = 1,
    Background = 10,
    Default = 64,
    Reliable = 70,
    Ack = 120,
    Max = 127,
}

/// Deferred-send marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Delayed {
    None = 0,
    Broadcast = 1,
    Direct = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoded_accessor_sees_through_variant() {
        let packet = MeshPacket {
            payload_variant: Some(mesh_packet::PayloadVariant::Decoded(Data {
                portnum: PortNum::Admin as i32,
                ..Default::default()
            })),
            ..Default::default()
        };
        assert_eq!(packet.decoded().map(|d| d.portnum), Some(PortNum::Admin as i32));
    }

    #[test]
    fn decoded_accessor_ignores_ciphertext() {
        let packet = MeshPacket {
            payload_variant: Some(mesh_packet::PayloadVariant::Encrypted(vec![0xAA; 8])),
            ..Default::default()
        };
        assert!(packet.decoded().is_none());
    }

    #[test]
    fn unknown_priority_is_an_error_not_a_panic() {
        let packet = MeshPacket { priority: 999, ..Default::default() };
        assert!(matches!(packet.priority(), Err(WireError::UnknownVariant { .. })));
    }

    #[test]
    fn default_priority_is_unset() {
        let packet = MeshPacket::default();
        assert_eq!(packet.priority().expect("default priority decodes"), Priority::Unset);
    }
}
