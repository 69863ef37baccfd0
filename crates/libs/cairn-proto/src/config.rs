//! Radio configuration sections.
//!
//! [`Config`] carries exactly one of nine sections. A
//! [`ConfigType`] value sent in `get_config_request` selects which
//! section the responder populates in `get_config_response`;
//! [`Config::kind`] is the other half of that contract and the two must
//! stay in lockstep.

use crate::wire::WireError;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Config {
    #[prost(oneof = "config::PayloadVariant", tags = "1, 2, 3, 4, 5, 6, 7, 8, 9")]
    pub payload_variant: Option<config::PayloadVariant>,
}

pub mod config {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "1")]
        Device(super::DeviceConfig),
        #[prost(message, tag = "2")]
        Position(super::PositionConfig),
        #[prost(message, tag = "3")]
        Power(super::PowerConfig),
        #[prost(message, tag = "4")]
        Network(super::NetworkConfig),
        #[prost(message, tag = "5")]
        Display(super::DisplayConfig),
        #[prost(message, tag = "6")]
        Lora(super::LoraConfig),
        #[prost(message, tag = "7")]
        Bluetooth(super::BluetoothConfig),
        #[prost(message, tag = "8")]
        Security(super::SecurityConfig),
        #[prost(message, tag = "9")]
        Sessionkey(super::SessionkeyConfig),
    }
}

impl Config {
    /// The [`ConfigType`] selecting this config's populated section, or
    /// an error when no section is populated.
    pub fn kind(&self) -> Result<ConfigType, WireError> {
        use config::PayloadVariant::*;
        match &self.payload_variant {
            Some(Device(_)) => Ok(ConfigType::Device),
            Some(Position(_)) => Ok(ConfigType::Position),
            Some(Power(_)) => Ok(ConfigType::Power),
            Some(Network(_)) => Ok(ConfigType::Network),
            Some(Display(_)) => Ok(ConfigType::Display),
            Some(Lora(_)) => Ok(ConfigType::Lora),
            Some(Bluetooth(_)) => Ok(ConfigType::Bluetooth),
            Some(Security(_)) => Ok(ConfigType::Security),
            Some(Sessionkey(_)) => Ok(ConfigType::Sessionkey),
            None => Err(WireError::MissingVariant { message: "Config" }),
        }
    }
}

/// Selector for one [`Config`] section. Wire values are the section tags
/// minus one and must track [`config::PayloadVariant`] exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ConfigType {
    Device = 0,
    Position = 1,
    Power = 2,
    Network = 3,
    Display = 4,
    Lora = 5,
    Bluetooth = 6,
    Security = 7,
    Sessionkey = 8,
}

impl ConfigType {
    /// Does `config`'s populated section match this selector?
    pub fn expects(self, config: &Config) -> bool {
        config.kind().is_ok_and(|kind| kind == self)
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeviceConfig {
    #[prost(int32, tag = "1")]
    pub role: i32,
    #[prost(bool, tag = "2")]
    pub serial_enabled: bool,
    #[prost(uint32, tag = "4")]
    pub button_gpio: u32,
    #[prost(uint32, tag = "5")]
    pub buzzer_gpio: u32,
    /// Seconds between unsolicited node-info broadcasts.
    #[prost(uint32, tag = "6")]
    pub node_info_broadcast_secs: u32,
    #[prost(bool, tag = "7")]
    pub double_tap_as_button_press: bool,
    /// POSIX timezone definition string.
    #[prost(string, tag = "8")]
    pub tzdef: String,
}

impl DeviceConfig {
    /// Checked accessor for [`DeviceConfig::role`].
    pub fn role(&self) -> Result<DeviceRole, WireError> {
        DeviceRole::from_wire(self.role)
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PositionConfig {
    #[prost(uint32, tag = "1")]
    pub position_broadcast_secs: u32,
    #[prost(bool, tag = "2")]
    pub position_broadcast_smart_enabled: bool,
    /// Position is operator-pinned rather than GPS-derived.
    #[prost(bool, tag = "3")]
    pub fixed_position: bool,
    #[prost(uint32, tag = "4")]
    pub gps_update_interval: u32,
    /// Bitfield selecting which optional fields position reports carry.
    #[prost(uint32, tag = "5")]
    pub position_flags: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PowerConfig {
    #[prost(bool, tag = "1")]
    pub is_power_saving: bool,
    #[prost(uint32, tag = "2")]
    pub on_battery_shutdown_after_secs: u32,
    /// Super-deep-sleep interval.
    #[prost(uint32, tag = "3")]
    pub sds_secs: u32,
    /// Light-sleep interval.
    #[prost(uint32, tag = "4")]
    pub ls_secs: u32,
    #[prost(uint32, tag = "5")]
    pub min_wake_secs: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NetworkConfig {
    #[prost(bool, tag = "1")]
    pub wifi_enabled: bool,
    #[prost(string, tag = "3")]
    pub wifi_ssid: String,
    #[prost(string, tag = "4")]
    pub wifi_psk: String,
    #[prost(string, tag = "5")]
    pub ntp_server: String,
    #[prost(bool, tag = "6")]
    pub eth_enabled: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DisplayConfig {
    #[prost(uint32, tag = "1")]
    pub screen_on_secs: u32,
    #[prost(uint32, tag = "3")]
    pub auto_screen_carousel_secs: u32,
    #[prost(bool, tag = "5")]
    pub flip_screen: bool,
    #[prost(bool, tag = "8")]
    pub heading_bold: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct LoraConfig {
    /// Use `modem_preset` instead of the explicit bandwidth/sf/cr triple.
    #[prost(bool, tag = "1")]
    pub use_preset: bool,
    #[prost(int32, tag = "2")]
    pub modem_preset: i32,
    #[prost(uint32, tag = "3")]
    pub bandwidth: u32,
    #[prost(uint32, tag = "4")]
    pub spread_factor: u32,
    #[prost(uint32, tag = "5")]
    pub coding_rate: u32,
    #[prost(float, tag = "6")]
    pub frequency_offset: f32,
    #[prost(int32, tag = "7")]
    pub region: i32,
    /// Default relay budget stamped on locally originated packets.
    #[prost(uint32, tag = "8")]
    pub hop_limit: u32,
    #[prost(bool, tag = "9")]
    pub tx_enabled: bool,
    #[prost(int32, tag = "10")]
    pub tx_power: i32,
    #[prost(uint32, tag = "11")]
    pub channel_num: u32,
    #[prost(bool, tag = "13")]
    pub sx126x_rx_boosted_gain: bool,
}

impl LoraConfig {
    pub fn region(&self) -> Result<LoraRegion, WireError> {
        LoraRegion::try_from(self.region)
            .map_err(|_| WireError::unknown_variant("LoraConfig.region", self.region))
    }

    pub fn modem_preset(&self) -> Result<ModemPreset, WireError> {
        ModemPreset::try_from(self.modem_preset)
            .map_err(|_| WireError::unknown_variant("LoraConfig.modem_preset", self.modem_preset))
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BluetoothConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(enumeration = "PairingMode", tag = "2")]
    pub mode: i32,
    #[prost(uint32, tag = "3")]
    pub fixed_pin: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SecurityConfig {
    #[prost(bytes = "vec", tag = "1")]
    pub public_key: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub private_key: Vec<u8>,
    /// Public keys authorized to administer this node remotely.
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub admin_key: Vec<Vec<u8>>,
    /// Node is fleet-managed; local config edits are refused.
    #[prost(bool, tag = "4")]
    pub is_managed: bool,
    #[prost(bool, tag = "5")]
    pub serial_enabled: bool,
    /// Allow legacy admin traffic on the named admin channel.
    #[prost(bool, tag = "8")]
    pub admin_channel_enabled: bool,
}

/// Empty marker section: requesting it rotates and returns a fresh
/// session passkey in the response's `session_passkey` field.
#[derive(Clone, Copy, PartialEq, ::prost::Message)]
pub struct SessionkeyConfig {}

// ── Enumerations ──────────────────────────────────────────────────────────────

/// What role a node plays in mesh routing and broadcast behavior.
///
/// This is the single canonical role enumeration. Firmware before the
/// device-state renumbering wrote owner records with a smaller,
/// differently-valued role set; [`DeviceRole::from_legacy`] maps that
/// retired numbering onto the canonical values at the decode boundary,
/// so a second role enum never exists on this side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum DeviceRole {
    Client = 0,
    ClientMute = 1,
    Router = 2,
    RouterClient = 3,
    Repeater = 4,
    Tracker = 5,
    Sensor = 6,
    Tak = 7,
    ClientHidden = 8,
    LostAndFound = 9,
    TakTracker = 10,
}

impl DeviceRole {
    /// Decode a wire value in the current numbering.
    pub fn from_wire(value: i32) -> Result<Self, WireError> {
        Self::try_from(value).map_err(|_| WireError::unknown_variant("DeviceRole", value))
    }

    /// Decode a wire value in the retired pre-renumbering set.
    ///
    /// That era had no mute/hidden roles and packed the relay roles
    /// directly after `Client`, so its values collide with different
    /// canonical roles and cannot be told apart without knowing the
    /// record's device-state version (see
    /// [`User::role_for_state_version`](crate::User::role_for_state_version)).
    pub fn from_legacy(value: i32) -> Result<Self, WireError> {
        match value {
            0 => Ok(Self::Client),
            1 => Ok(Self::Router),
            2 => Ok(Self::Repeater),
            3 => Ok(Self::Tracker),
            4 => Ok(Self::Sensor),
            other => Err(WireError::unknown_variant("DeviceRole(legacy)", other)),
        }
    }
}

/// Named LoRa modem parameter bundles, fastest to longest-range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ModemPreset {
    LongFast = 0,
    LongSlow = 1,
    VeryLongSlow = 2,
    MediumSlow = 3,
    MediumFast = 4,
    ShortSlow = 5,
    ShortFast = 6,
    LongModerate = 7,
    ShortTurbo = 8,
}

/// Regulatory region the radio operates under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum LoraRegion {
    Unset = 0,
    Us = 1,
    Eu433 = 2,
    Eu868 = 3,
    Cn = 4,
    Jp = 5,
    Anz = 6,
    Kr = 7,
    Tw = 8,
    Ru = 9,
    In = 10,
    Nz865 = 11,
    Th = 12,
    Ua433 = 14,
    Ua868 = 15,
}

/// Bluetooth pairing behavior.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum PairingMode {
    RandomPin = 0,
    FixedPin = 1,
    NoPin = 2,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section_for(kind: ConfigType) -> config::PayloadVariant {
        use config::PayloadVariant::*;
        match kind {
            ConfigType::Device => Device(DeviceConfig::default()),
            ConfigType::Position => Position(PositionConfig::default()),
            ConfigType::Power => Power(PowerConfig::default()),
            ConfigType::Network => Network(NetworkConfig::default()),
            ConfigType::Display => Display(DisplayConfig::default()),
            ConfigType::Lora => Lora(LoraConfig::default()),
            ConfigType::Bluetooth => Bluetooth(BluetoothConfig::default()),
            ConfigType::Security => Security(SecurityConfig::default()),
            ConfigType::Sessionkey => Sessionkey(SessionkeyConfig::default()),
        }
    }

    const ALL_KINDS: [ConfigType; 9] = [
        ConfigType::Device,
        ConfigType::Position,
        ConfigType::Power,
        ConfigType::Network,
        ConfigType::Display,
        ConfigType::Lora,
        ConfigType::Bluetooth,
        ConfigType::Security,
        ConfigType::Sessionkey,
    ];

    #[test]
    fn kind_agrees_with_populated_section_for_all_nine() {
        for kind in ALL_KINDS {
            let config = Config { payload_variant: Some(section_for(kind)) };
            assert_eq!(config.kind().expect("populated config has a kind"), kind);
            assert!(kind.expects(&config));
        }
    }

    #[test]
    fn mismatched_section_is_detected() {
        let config = Config {
            payload_variant: Some(config::PayloadVariant::Lora(LoraConfig::default())),
        };
        assert!(!ConfigType::Bluetooth.expects(&config));
    }

    #[test]
    fn empty_config_has_no_kind() {
        let config = Config::default();
        assert!(matches!(config.kind(), Err(WireError::MissingVariant { message: "Config" })));
    }

    #[test]
    fn role_decodes_current_numbering() {
        assert_eq!(DeviceRole::from_wire(2).expect("router"), DeviceRole::Router);
        assert_eq!(DeviceRole::from_wire(10).expect("tak tracker"), DeviceRole::TakTracker);
        assert!(DeviceRole::from_wire(99).is_err());
    }

    #[test]
    fn legacy_role_values_map_onto_canonical_set() {
        // Same wire value, different meaning per era.
        assert_eq!(DeviceRole::from_legacy(1).expect("legacy router"), DeviceRole::Router);
        assert_eq!(DeviceRole::from_wire(1).expect("current mute"), DeviceRole::ClientMute);
        assert!(DeviceRole::from_legacy(5).is_err());
    }
}
