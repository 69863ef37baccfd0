//! Device administration messages.
//!
//! [`AdminMessage`] is a union of get/set pairs plus device lifecycle
//! actions. Branches split into two disjoint operation classes: *reads*
//! (the `get_*` pairs, tag block 1–23) and *writes/lifecycle* (`set_*`,
//! the edit-settings bracket, resets and reboots, tag block 32–100).
//! Writes must carry the rotating session passkey in
//! [`AdminMessage::session_passkey`]; the session layer enforces that —
//! this crate only classifies.

use crate::channel::Channel;
use crate::config::{Config, ConfigType, DeviceRole};
use crate::module_config::{ModuleConfig, ModuleConfigType};
use crate::wire::WireError;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AdminMessage {
    #[prost(
        oneof = "admin_message::PayloadVariant",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 11, 12, 32, 33, 34, 35, 38, 39, 40, 41, 42, 43, 47, 48, 64, 65, 94, 95, 97, 98, 99, 100"
    )]
    pub payload_variant: Option<admin_message::PayloadVariant>,
    /// Rotating authorization token bracketing a batch of writes. Granted
    /// by the node in admin replies; echoed on every write request.
    #[prost(bytes = "vec", tag = "101")]
    pub session_passkey: Vec<u8>,
}

pub mod admin_message {
    use super::*;

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        /// Read the channel at the given index.
        #[prost(uint32, tag = "1")]
        GetChannelRequest(u32),
        #[prost(message, tag = "2")]
        GetChannelResponse(Channel),
        #[prost(bool, tag = "3")]
        GetOwnerRequest(bool),
        #[prost(message, tag = "4")]
        GetOwnerResponse(User),
        /// Read one config section, selected by [`ConfigType`].
        #[prost(enumeration = "ConfigType", tag = "5")]
        GetConfigRequest(i32),
        #[prost(message, tag = "6")]
        GetConfigResponse(Config),
        #[prost(enumeration = "ModuleConfigType", tag = "7")]
        GetModuleConfigRequest(i32),
        #[prost(message, tag = "8")]
        GetModuleConfigResponse(ModuleConfig),
        #[prost(bool, tag = "11")]
        GetDeviceMetadataRequest(bool),
        #[prost(message, tag = "12")]
        GetDeviceMetadataResponse(DeviceMetadata),

        #[prost(message, tag = "32")]
        SetOwner(User),
        #[prost(message, tag = "33")]
        SetChannel(Channel),
        #[prost(message, tag = "34")]
        SetConfig(Config),
        #[prost(message, tag = "35")]
        SetModuleConfig(ModuleConfig),
        /// Forget everything known about the given node.
        #[prost(uint32, tag = "38")]
        RemoveByNodenum(u32),
        #[prost(uint32, tag = "39")]
        SetFavoriteNode(u32),
        #[prost(uint32, tag = "40")]
        RemoveFavoriteNode(u32),
        #[prost(message, tag = "41")]
        SetFixedPosition(Position),
        #[prost(bool, tag = "42")]
        RemoveFixedPosition(bool),
        /// Set the node clock without touching position.
        #[prost(uint32, tag = "43")]
        SetTimeOnly(u32),
        #[prost(uint32, tag = "47")]
        SetIgnoredNode(u32),
        #[prost(uint32, tag = "48")]
        RemoveIgnoredNode(u32),
        /// Open an edit transaction; must precede any `set_*` of a batch.
        #[prost(bool, tag = "64")]
        BeginEditSettings(bool),
        /// Close the transaction; the node applies the batch atomically.
        #[prost(bool, tag = "65")]
        CommitEditSettings(bool),
        #[prost(int32, tag = "94")]
        FactoryResetDevice(i32),
        #[prost(int32, tag = "95")]
        RebootOtaSeconds(i32),
        #[prost(int32, tag = "97")]
        RebootSeconds(i32),
        #[prost(int32, tag = "98")]
        ShutdownSeconds(i32),
        #[prost(int32, tag = "99")]
        FactoryResetConfig(i32),
        #[prost(int32, tag = "100")]
        NodedbReset(i32),
    }

    impl PayloadVariant {
        /// True for `set_*`, the edit bracket, and lifecycle actions —
        /// everything that requires a valid session passkey.
        pub fn is_write(&self) -> bool {
            !matches!(
                self,
                Self::GetChannelRequest(_)
                    | Self::GetChannelResponse(_)
                    | Self::GetOwnerRequest(_)
                    | Self::GetOwnerResponse(_)
                    | Self::GetConfigRequest(_)
                    | Self::GetConfigResponse(_)
                    | Self::GetModuleConfigRequest(_)
                    | Self::GetModuleConfigResponse(_)
                    | Self::GetDeviceMetadataRequest(_)
                    | Self::GetDeviceMetadataResponse(_)
            )
        }
    }
}

impl AdminMessage {
    /// Build a request around one branch, passkey left empty.
    pub fn request(variant: admin_message::PayloadVariant) -> Self {
        Self { payload_variant: Some(variant), session_passkey: Vec::new() }
    }

    /// Whether the populated branch is a write/lifecycle operation.
    /// A message with no branch is malformed and classifies as neither.
    pub fn is_write(&self) -> bool {
        self.payload_variant.as_ref().is_some_and(admin_message::PayloadVariant::is_write)
    }
}

// ── Supporting messages ───────────────────────────────────────────────────────

/// Owner identity record for a node.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct User {
    /// Stable node identifier string, e.g. `"!a4c13b92"`.
    #[prost(string, tag = "1")]
    pub id: String,
    #[prost(string, tag = "2")]
    pub long_name: String,
    /// Up to four characters, shown on tiny screens.
    #[prost(string, tag = "3")]
    pub short_name: String,
    #[prost(uint32, tag = "4")]
    pub hw_model: u32,
    #[prost(bool, tag = "5")]
    pub is_licensed: bool,
    #[prost(int32, tag = "6")]
    pub role: i32,
    #[prost(bytes = "vec", tag = "7")]
    pub public_key: Vec<u8>,
}

/// Device-state schema generation in which the role numbering changed;
/// owner records written before it use the retired numbering.
pub const DEVICE_STATE_ROLE_RENUMBER: u32 = 22;

impl User {
    /// Checked accessor for [`User::role`] in the current numbering.
    pub fn role(&self) -> Result<DeviceRole, WireError> {
        DeviceRole::from_wire(self.role)
    }

    /// Role accessor for records whose era is known from the reporting
    /// node's [`DeviceMetadata::device_state_version`]. Records older
    /// than [`DEVICE_STATE_ROLE_RENUMBER`] are decoded through the
    /// legacy mapping.
    pub fn role_for_state_version(
        &self,
        device_state_version: u32,
    ) -> Result<DeviceRole, WireError> {
        if device_state_version < DEVICE_STATE_ROLE_RENUMBER {
            DeviceRole::from_legacy(self.role)
        } else {
            DeviceRole::from_wire(self.role)
        }
    }
}

/// A pinned geographic position (fixed-point degrees ×1e-7).
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Position {
    #[prost(sint32, tag = "1")]
    pub latitude_i: i32,
    #[prost(sint32, tag = "2")]
    pub longitude_i: i32,
    /// Meters above mean sea level.
    #[prost(int32, tag = "3")]
    pub altitude: i32,
    /// Epoch seconds the fix was taken.
    #[prost(uint32, tag = "4")]
    pub time: u32,
}

/// Capability and version probe, read right after connecting.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceMetadata {
    #[prost(string, tag = "1")]
    pub firmware_version: String,
    #[prost(uint32, tag = "2")]
    pub device_state_version: u32,
    #[prost(bool, tag = "3")]
    pub can_shutdown: bool,
    #[prost(bool, tag = "4")]
    pub has_wifi: bool,
    #[prost(bool, tag = "5")]
    pub has_bluetooth: bool,
    #[prost(enumeration = "DeviceRole", tag = "6")]
    pub role: i32,
}
