//! Request/response agreement across the admin wire surface.

use cairn_proto::admin::admin_message::PayloadVariant;
use cairn_proto::config::config;
use cairn_proto::module_config::module_config;
use cairn_proto::{
    decode, encode, AdminMessage, Config, ConfigType, ModuleConfig, ModuleConfigType,
};

fn config_section(kind: ConfigType) -> config::PayloadVariant {
    use cairn_proto::config::*;
    match kind {
        ConfigType::Device => config::PayloadVariant::Device(DeviceConfig::default()),
        ConfigType::Position => config::PayloadVariant::Position(PositionConfig::default()),
        ConfigType::Power => config::PayloadVariant::Power(PowerConfig::default()),
        ConfigType::Network => config::PayloadVariant::Network(NetworkConfig::default()),
        ConfigType::Display => config::PayloadVariant::Display(DisplayConfig::default()),
        ConfigType::Lora => config::PayloadVariant::Lora(LoraConfig::default()),
        ConfigType::Bluetooth => config::PayloadVariant::Bluetooth(BluetoothConfig::default()),
        ConfigType::Security => config::PayloadVariant::Security(SecurityConfig::default()),
        ConfigType::Sessionkey => config::PayloadVariant::Sessionkey(SessionkeyConfig::default()),
    }
}

fn module_section(kind: ModuleConfigType) -> module_config::PayloadVariant {
    use cairn_proto::module_config::*;
    match kind {
        ModuleConfigType::Mqtt => module_config::PayloadVariant::Mqtt(MqttConfig::default()),
        ModuleConfigType::Serial => module_config::PayloadVariant::Serial(SerialConfig::default()),
        ModuleConfigType::ExternalNotification => {
            module_config::PayloadVariant::ExternalNotification(
                ExternalNotificationConfig::default(),
            )
        }
        ModuleConfigType::StoreForward => {
            module_config::PayloadVariant::StoreForward(StoreForwardConfig::default())
        }
        ModuleConfigType::RangeTest => {
            module_config::PayloadVariant::RangeTest(RangeTestConfig::default())
        }
        ModuleConfigType::Telemetry => {
            module_config::PayloadVariant::Telemetry(TelemetryConfig::default())
        }
        ModuleConfigType::CannedMessage => {
            module_config::PayloadVariant::CannedMessage(CannedMessageConfig::default())
        }
        ModuleConfigType::Audio => module_config::PayloadVariant::Audio(AudioConfig::default()),
        ModuleConfigType::RemoteHardware => {
            module_config::PayloadVariant::RemoteHardware(RemoteHardwareConfig::default())
        }
        ModuleConfigType::NeighborInfo => {
            module_config::PayloadVariant::NeighborInfo(NeighborInfoConfig::default())
        }
        ModuleConfigType::AmbientLighting => {
            module_config::PayloadVariant::AmbientLighting(AmbientLightingConfig::default())
        }
        ModuleConfigType::DetectionSensor => {
            module_config::PayloadVariant::DetectionSensor(DetectionSensorConfig::default())
        }
        ModuleConfigType::Paxcounter => {
            module_config::PayloadVariant::Paxcounter(PaxcounterConfig::default())
        }
    }
}

const CONFIG_TYPES: [ConfigType; 9] = [
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

const MODULE_TYPES: [ModuleConfigType; 13] = [
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

/// The selector a requester sends and the branch a responder populates
/// must pick the same section, for every selector value — this is the
/// contract keeping both ends of `get_config` in agreement.
#[test]
fn config_selector_matches_response_branch_for_all_nine() {
    for kind in CONFIG_TYPES {
        let request =
            AdminMessage::request(PayloadVariant::GetConfigRequest(kind as i32));
        let request: AdminMessage =
            decode(&encode(&request).expect("request encodes")).expect("request decodes");
        let Some(PayloadVariant::GetConfigRequest(raw)) = request.payload_variant else {
            panic!("request branch survived the round trip");
        };
        let requested = ConfigType::try_from(raw).expect("selector survives");

        // Fabricate the response a well-behaved node would send.
        let response = AdminMessage::request(PayloadVariant::GetConfigResponse(Config {
            payload_variant: Some(config_section(requested)),
        }));
        let response: AdminMessage =
            decode(&encode(&response).expect("response encodes")).expect("response decodes");
        let Some(PayloadVariant::GetConfigResponse(config)) = response.payload_variant else {
            panic!("response branch survived the round trip");
        };
        assert!(requested.expects(&config), "section for {kind:?} must match its selector");
    }
}

#[test]
fn mismatched_config_response_branch_is_detected() {
    let config = Config { payload_variant: Some(config_section(ConfigType::Bluetooth)) };
    assert!(!ConfigType::Lora.expects(&config));
    assert_eq!(config.kind().expect("populated"), ConfigType::Bluetooth);
}

#[test]
fn module_selector_matches_response_branch_for_all_thirteen() {
    for kind in MODULE_TYPES {
        let config = ModuleConfig { payload_variant: Some(module_section(kind)) };
        let admin = AdminMessage::request(PayloadVariant::GetModuleConfigResponse(config));
        let decoded: AdminMessage =
            decode(&encode(&admin).expect("encodes")).expect("decodes");
        let Some(PayloadVariant::GetModuleConfigResponse(config)) = decoded.payload_variant
        else {
            panic!("module response branch survived the round trip");
        };
        assert!(kind.expects(&config));
    }
}

#[test]
fn session_passkey_rides_alongside_every_branch() {
    let mut admin = AdminMessage::request(PayloadVariant::CommitEditSettings(true));
    admin.session_passkey = vec![0xA7; 16];
    let decoded: AdminMessage = decode(&encode(&admin).expect("encodes")).expect("decodes");
    assert_eq!(decoded.session_passkey, admin.session_passkey);
    assert!(decoded.is_write());
}
