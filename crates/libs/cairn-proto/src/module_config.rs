//! Optional-module configuration sections.
//!
//! Parallel to [`crate::config`]: [`ModuleConfig`] carries exactly one of
//! thirteen sections, selected by a [`ModuleConfigType`] in
//! `get_module_config_request`.

use crate::wire::WireError;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ModuleConfig {
    #[prost(
        oneof = "module_config::PayloadVariant",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13"
    )]
    pub payload_variant: Option<module_config::PayloadVariant>,
}

pub mod module_config {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum PayloadVariant {
        #[prost(message, tag = "1")]
        Mqtt(super::MqttConfig),
        #[prost(message, tag = "2")]
        Serial(super::SerialConfig),
        #[prost(message, tag = "3")]
        ExternalNotification(super::ExternalNotificationConfig),
        #[prost(message, tag = "4")]
        StoreForward(super::StoreForwardConfig),
        #[prost(message, tag = "5")]
        RangeTest(super::RangeTestConfig),
        #[prost(message, tag = "6")]
        Telemetry(super::TelemetryConfig),
        #[prost(message, tag = "7")]
        CannedMessage(super::CannedMessageConfig),
        #[prost(message, tag = "8")]
        Audio(super::AudioConfig),
        #[prost(message, tag = "9")]
        RemoteHardware(super::RemoteHardwareConfig),
        #[prost(message, tag = "10")]
        NeighborInfo(super::NeighborInfoConfig),
        #[prost(message, tag = "11")]
        AmbientLighting(super::AmbientLightingConfig),
        #[prost(message, tag = "12")]
        DetectionSensor(super::DetectionSensorConfig),
        #[prost(message, tag = "13")]
        Paxcounter(super::PaxcounterConfig),
    }
}

impl ModuleConfig {
    /// The [`ModuleConfigType`] selecting this config's populated section.
    pub fn kind(&self) -> Result<ModuleConfigType, WireError> {
        use module_config::PayloadVariant::*;
        match &self.payload_variant {
            Some(Mqtt(_)) => Ok(ModuleConfigType::Mqtt),
            Some(Serial(_)) => Ok(ModuleConfigType::Serial),
            Some(ExternalNotification(_)) => Ok(ModuleConfigType::ExternalNotification),
            Some(StoreForward(_)) => Ok(ModuleConfigType::StoreForward),
            Some(RangeTest(_)) => Ok(ModuleConfigType::RangeTest),
            Some(Telemetry(_)) => Ok(ModuleConfigType::Telemetry),
            Some(CannedMessage(_)) => Ok(ModuleConfigType::CannedMessage),
            Some(Audio(_)) => Ok(ModuleConfigType::Audio),
            Some(RemoteHardware(_)) => Ok(ModuleConfigType::RemoteHardware),
            Some(NeighborInfo(_)) => Ok(ModuleConfigType::NeighborInfo),
            Some(AmbientLighting(_)) => Ok(ModuleConfigType::AmbientLighting),
            Some(DetectionSensor(_)) => Ok(ModuleConfigType::DetectionSensor),
            Some(Paxcounter(_)) => Ok(ModuleConfigType::Paxcounter),
            None => Err(WireError::MissingVariant { message: "ModuleConfig" }),
        }
    }
}

/// Selector for one [`ModuleConfig`] section; tracks
/// [`module_config::PayloadVariant`] exactly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ModuleConfigType {
    Mqtt = 0,
    Serial = 1,
    ExternalNotification = 2,
    StoreForward = 3,
    RangeTest = 4,
    Telemetry = 5,
    CannedMessage = 6,
    Audio = 7,
    RemoteHardware = 8,
    NeighborInfo = 9,
    AmbientLighting = 10,
    DetectionSensor = 11,
    Paxcounter = 12,
}

impl ModuleConfigType {
    pub fn expects(self, config: &ModuleConfig) -> bool {
        config.kind().is_ok_and(|kind| kind == self)
    }
}

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MqttConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(string, tag = "2")]
    pub address: String,
    #[prost(string, tag = "3")]
    pub username: String,
    #[prost(string, tag = "4")]
    pub password: String,
    #[prost(bool, tag = "5")]
    pub encryption_enabled: bool,
    #[prost(bool, tag = "6")]
    pub json_enabled: bool,
    #[prost(string, tag = "7")]
    pub root: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SerialConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(bool, tag = "2")]
    pub echo: bool,
    #[prost(uint32, tag = "3")]
    pub rxd: u32,
    #[prost(uint32, tag = "4")]
    pub txd: u32,
    #[prost(uint32, tag = "5")]
    pub baud: u32,
    #[prost(uint32, tag = "6")]
    pub timeout: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExternalNotificationConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(uint32, tag = "2")]
    pub output_ms: u32,
    #[prost(uint32, tag = "3")]
    pub output: u32,
    #[prost(bool, tag = "4")]
    pub active: bool,
    #[prost(bool, tag = "5")]
    pub alert_message: bool,
    #[prost(bool, tag = "6")]
    pub alert_bell: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StoreForwardConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(bool, tag = "2")]
    pub heartbeat: bool,
    #[prost(uint32, tag = "3")]
    pub records: u32,
    #[prost(uint32, tag = "4")]
    pub history_return_max: u32,
    #[prost(uint32, tag = "5")]
    pub history_return_window: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RangeTestConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    /// Seconds between test transmissions; zero means receive-only.
    #[prost(uint32, tag = "2")]
    pub sender: u32,
    #[prost(bool, tag = "3")]
    pub save: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TelemetryConfig {
    #[prost(uint32, tag = "1")]
    pub device_update_interval: u32,
    #[prost(uint32, tag = "2")]
    pub environment_update_interval: u32,
    #[prost(bool, tag = "3")]
    pub environment_measurement_enabled: bool,
    #[prost(bool, tag = "4")]
    pub environment_screen_enabled: bool,
    #[prost(bool, tag = "5")]
    pub air_quality_enabled: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CannedMessageConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(bool, tag = "2")]
    pub rotary1_enabled: bool,
    #[prost(bool, tag = "3")]
    pub send_bell: bool,
    #[prost(string, tag = "4")]
    pub allow_input_source: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AudioConfig {
    #[prost(bool, tag = "1")]
    pub codec2_enabled: bool,
    #[prost(uint32, tag = "2")]
    pub ptt_pin: u32,
    #[prost(uint32, tag = "3")]
    pub bitrate: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RemoteHardwareConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(bool, tag = "2")]
    pub allow_undefined_pin_access: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NeighborInfoConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(uint32, tag = "2")]
    pub update_interval: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AmbientLightingConfig {
    #[prost(bool, tag = "1")]
    pub led_state: bool,
    #[prost(uint32, tag = "2")]
    pub current: u32,
    #[prost(uint32, tag = "3")]
    pub red: u32,
    #[prost(uint32, tag = "4")]
    pub green: u32,
    #[prost(uint32, tag = "5")]
    pub blue: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DetectionSensorConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(uint32, tag = "2")]
    pub minimum_broadcast_secs: u32,
    #[prost(uint32, tag = "3")]
    pub state_broadcast_secs: u32,
    #[prost(bool, tag = "4")]
    pub send_bell: bool,
    #[prost(string, tag = "5")]
    pub name: String,
    #[prost(uint32, tag = "6")]
    pub monitor_pin: u32,
    #[prost(bool, tag = "7")]
    pub use_pullup: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PaxcounterConfig {
    #[prost(bool, tag = "1")]
    pub enabled: bool,
    #[prost(uint32, tag = "2")]
    pub paxcounter_update_interval: u32,
    #[prost(int32, tag = "3")]
    pub wifi_threshold: i32,
    #[prost(int32, tag = "4")]
    pub ble_threshold: i32,
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn section_for(kind: ModuleConfigType) -> module_config::PayloadVariant {
        use module_config::PayloadVariant::*;
        match kind {
            ModuleConfigType::Mqtt => Mqtt(MqttConfig::default()),
            ModuleConfigType::Serial => Serial(SerialConfig::default()),
            ModuleConfigType::ExternalNotification => {
                ExternalNotification(ExternalNotificationConfig::default())
            }
            ModuleConfigType::StoreForward => StoreForward(StoreForwardConfig::default()),
            ModuleConfigType::RangeTest => RangeTest(RangeTestConfig::default()),
            ModuleConfigType::Telemetry => Telemetry(TelemetryConfig::default()),
            ModuleConfigType::CannedMessage => CannedMessage(CannedMessageConfig::default()),
            ModuleConfigType::Audio => Audio(AudioConfig::default()),
            ModuleConfigType::RemoteHardware => RemoteHardware(RemoteHardwareConfig::default()),
            ModuleConfigType::NeighborInfo => NeighborInfo(NeighborInfoConfig::default()),
            ModuleConfigType::AmbientLighting => AmbientLighting(AmbientLightingConfig::default()),
            ModuleConfigType::DetectionSensor => DetectionSensor(DetectionSensorConfig::default()),
            ModuleConfigType::Paxcounter => Paxcounter(PaxcounterConfig::default()),
        }
    }

    pub(crate) const ALL_KINDS: [ModuleConfigType; 13] = [
        ModuleConfigType::Mqtt,
        ModuleConfigType::Serial,
        ModuleConfigType::ExternalNotification,
        ModuleConfigType::StoreForward,
        ModuleConfigType::RangeTest,
        ModuleConfigType::Telemetry,
        ModuleConfigType::CannedMessage,
        ModuleConfigType::Audio,
        ModuleConfigType::RemoteHardware,
        ModuleConfigType::NeighborInfo,
        ModuleConfigType::AmbientLighting,
        ModuleConfigType::DetectionSensor,
        ModuleConfigType::Paxcounter,
    ];

    #[test]
    fn kind_agrees_with_populated_section_for_all_thirteen() {
        for kind in ALL_KINDS {
            let config = ModuleConfig { payload_variant: Some(section_for(kind)) };
            assert_eq!(config.kind().expect("populated config has a kind"), kind);
            assert!(kind.expects(&config));
        }
    }

    #[test]
    fn empty_module_config_has_no_kind() {
        assert!(ModuleConfig::default().kind().is_err());
    }
}
