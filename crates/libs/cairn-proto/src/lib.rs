//! # cairn-proto
//!
//! Wire protocol for administering mesh-radio nodes from a companion
//! application. This crate is the shared contract between the app and the
//! node firmware — both must produce and consume identical byte sequences.
//!
//! ## Message layering
//!
//! ```text
//! MeshPacket (envelope: from/to/channel/id/hop_limit)
//!   └── Data (portnum + opaque payload + request/reply correlation ids)
//!         ├── AdminMessage (get/set unions, session passkey)
//!         │     ├── Config (one of 9 radio config sections)
//!         │     └── ModuleConfig (one of 13 optional-module sections)
//!         └── Routing (route trace / delivery error reason)
//! ```
//!
//! Field tags are fixed by the firmware protocol and must never change.
//! Every `oneof` group is a real Rust enum, so constructing a message with
//! two populated branches is impossible; [`wire`] enforces the remaining
//! invariants (required branch present, known enum values) on both the
//! encode and decode paths.

pub mod admin;
pub mod channel;
pub mod config;
pub mod mesh;
pub mod module_config;
pub mod portnum;
pub mod routing;
pub mod wire;

pub use admin::{AdminMessage, DeviceMetadata, Position, User};
pub use channel::{Channel, ChannelRole, ChannelSettings};
pub use config::{Config, ConfigType, DeviceRole};
pub use mesh::{Data, Delayed, MeshPacket, Priority};
pub use module_config::{ModuleConfig, ModuleConfigType};
pub use portnum::PortNum;
pub use routing::{RouteDiscovery, Routing, RoutingError};
pub use wire::{decode, decode_payload, encode, DecodedPayload, WireError, WireMessage};

/// Node address meaning "every node" — a packet sent `to` this address is
/// broadcast, and `from == 0` is never a valid unicast source.
pub const BROADCAST_ADDR: u32 = 0;

/// Default relay budget for a freshly built packet.
pub const DEFAULT_HOP_LIMIT: u32 = 3;
