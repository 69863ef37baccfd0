//! Wire codec: validated encode/decode for the protocol roots.
//!
//! `prost` supplies the byte-level varint/tag encoding; this module adds
//! the structural rules the encoding alone cannot express: a required
//! union branch must be present, enum fields must carry known values,
//! and a payload must belong to the port it arrived on. Unknown field
//! tags are skipped on decode (newer firmware may send fields this
//! build does not know), never treated as fatal.

use prost::Message;

use crate::admin::{admin_message, AdminMessage};
use crate::config::{Config, ConfigType};
use crate::mesh::{mesh_packet, Data, MeshPacket};
use crate::module_config::{ModuleConfig, ModuleConfigType};
use crate::portnum::PortNum;
use crate::routing::Routing;

/// Errors from wire encode/decode.
///
/// All of these are local programming or compatibility faults: they are
/// surfaced immediately and never retried.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    #[error("malformed protocol data: {0}")]
    Malformed(#[from] prost::DecodeError),

    /// A union the protocol requires exactly one branch of has none.
    #[error("{message}: no payload variant populated")]
    MissingVariant { message: &'static str },

    /// An enum field carries a wire value with no corresponding variant.
    #[error("{field}: unknown wire value {value}")]
    UnknownVariant { field: &'static str, value: i32 },

    /// A payload arrived on a different port than the caller expected.
    #[error("expected port {expected:?}, found wire value {found}")]
    UnexpectedPort { expected: PortNum, found: i32 },
}

impl WireError {
    pub(crate) fn unknown_variant(field: &'static str, value: i32) -> Self {
        Self::UnknownVariant { field, value }
    }
}

/// A protocol root that can be validated, encoded, and decoded.
pub trait WireMessage: Message + Default + Sized {
    /// Check the structural invariants the byte encoding cannot.
    fn validate(&self) -> Result<(), WireError>;
}

/// Validate and serialize one protocol root.
pub fn encode<M: WireMessage>(message: &M) -> Result<Vec<u8>, WireError> {
    message.validate()?;
    Ok(message.encode_to_vec())
}

/// Deserialize and validate one protocol root.
pub fn decode<M: WireMessage>(bytes: &[u8]) -> Result<M, WireError> {
    let message = M::decode(bytes)?;
    message.validate()?;
    Ok(message)
}

impl WireMessage for MeshPacket {
    fn validate(&self) -> Result<(), WireError> {
        match &self.payload_variant {
            Some(mesh_packet::PayloadVariant::Decoded(data)) => data.validate(),
            Some(mesh_packet::PayloadVariant::Encrypted(_)) => Ok(()),
            None => Err(WireError::MissingVariant { message: "MeshPacket" }),
        }
    }
}

impl WireMessage for Data {
    fn validate(&self) -> Result<(), WireError> {
        self.portnum()?;
        Ok(())
    }
}

impl WireMessage for AdminMessage {
    fn validate(&self) -> Result<(), WireError> {
        use admin_message::PayloadVariant::*;
        match &self.payload_variant {
            None => Err(WireError::MissingVariant { message: "AdminMessage" }),
            Some(GetConfigRequest(raw)) => ConfigType::try_from(*raw)
                .map(|_| ())
                .map_err(|_| WireError::unknown_variant("AdminMessage.get_config_request", *raw)),
            Some(GetModuleConfigRequest(raw)) => {
                ModuleConfigType::try_from(*raw).map(|_| ()).map_err(|_| {
                    WireError::unknown_variant("AdminMessage.get_module_config_request", *raw)
                })
            }
            Some(GetConfigResponse(config)) | Some(SetConfig(config)) => config.validate(),
            Some(GetModuleConfigResponse(config)) | Some(SetModuleConfig(config)) => {
                config.validate()
            }
            Some(_) => Ok(()),
        }
    }
}

impl WireMessage for Config {
    fn validate(&self) -> Result<(), WireError> {
        self.kind().map(|_| ())
    }
}

impl WireMessage for ModuleConfig {
    fn validate(&self) -> Result<(), WireError> {
        self.kind().map(|_| ())
    }
}

impl WireMessage for Routing {
    fn validate(&self) -> Result<(), WireError> {
        if self.variant.is_none() {
            return Err(WireError::MissingVariant { message: "Routing" });
        }
        self.error_reason().map(|_| ())
    }
}

/// A [`Data`] payload decoded according to its port.
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub enum DecodedPayload {
    Admin(Box<AdminMessage>),
    Routing(Routing),
    /// A port this layer carries but does not interpret.
    Opaque { portnum: PortNum, payload: Vec<u8> },
}

/// Decode a payload the caller expects on a specific port.
///
/// The port check runs first: a payload on the wrong port is a protocol
/// violation even when its bytes would happen to parse.
pub fn decode_payload(data: &Data, expected: PortNum) -> Result<DecodedPayload, WireError> {
    let portnum = data
        .portnum()
        .map_err(|_| WireError::UnexpectedPort { expected, found: data.portnum })?;
    if portnum != expected {
        return Err(WireError::UnexpectedPort { expected, found: data.portnum });
    }
    match portnum {
        PortNum::Admin => decode::<AdminMessage>(&data.payload)
            .map(Box::new)
            .map(DecodedPayload::Admin),
        PortNum::Routing => decode::<Routing>(&data.payload).map(DecodedPayload::Routing),
        other => Ok(DecodedPayload::Opaque { portnum: other, payload: data.payload.clone() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::User;
    use crate::config::{config, LoraConfig, LoraRegion, ModemPreset};
    use crate::module_config::{module_config, TelemetryConfig};
    use crate::routing::{routing, RouteDiscovery, RoutingError};

    fn lora_config() -> Config {
        Config {
            payload_variant: Some(config::PayloadVariant::Lora(LoraConfig {
                use_preset: true,
                modem_preset: ModemPreset::LongFast as i32,
                region: LoraRegion::Eu868 as i32,
                hop_limit: 3,
                tx_enabled: true,
                tx_power: 27,
                ..Default::default()
            })),
        }
    }

    fn admin_packet(id: u32, admin: &AdminMessage) -> MeshPacket {
        MeshPacket {
            from: 0x0a0a_0a0a,
            to: 0x0b0b_0b0b,
            id,
            hop_limit: 3,
            payload_variant: Some(mesh_packet::PayloadVariant::Decoded(Data {
                portnum: PortNum::Admin as i32,
                payload: encode(admin).expect("admin encodes"),
                want_response: true,
                ..Default::default()
            })),
            ..Default::default()
        }
    }

    #[test]
    fn mesh_packet_round_trips() {
        let admin = AdminMessage::request(admin_message::PayloadVariant::GetOwnerRequest(true));
        let packet = admin_packet(42, &admin);
        let bytes = encode(&packet).expect("packet encodes");
        let decoded: MeshPacket = decode(&bytes).expect("packet decodes");
        assert_eq!(decoded, packet);
    }

    #[test]
    fn encrypted_envelope_round_trips() {
        let packet = MeshPacket {
            to: 0x22,
            id: 7,
            payload_variant: Some(mesh_packet::PayloadVariant::Encrypted(vec![0xDE, 0xAD, 0xBE])),
            ..Default::default()
        };
        let decoded: MeshPacket = decode(&encode(&packet).expect("encodes")).expect("decodes");
        assert_eq!(decoded, packet);
    }

    #[test]
    fn envelope_without_payload_fails_encode() {
        let packet = MeshPacket { id: 9, ..Default::default() };
        assert!(matches!(
            encode(&packet),
            Err(WireError::MissingVariant { message: "MeshPacket" })
        ));
    }

    #[test]
    fn admin_without_branch_fails_encode() {
        let admin = AdminMessage::default();
        assert!(matches!(
            encode(&admin),
            Err(WireError::MissingVariant { message: "AdminMessage" })
        ));
    }

    #[test]
    fn every_config_section_round_trips_through_admin() {
        use crate::config::{
            BluetoothConfig, DeviceConfig, DisplayConfig, NetworkConfig, PositionConfig,
            PowerConfig, SecurityConfig, SessionkeyConfig,
        };
        let sections = [
            config::PayloadVariant::Device(DeviceConfig::default()),
            config::PayloadVariant::Position(PositionConfig::default()),
            config::PayloadVariant::Power(PowerConfig::default()),
            config::PayloadVariant::Network(NetworkConfig {
                wifi_enabled: true,
                wifi_ssid: "basecamp".into(),
                ..Default::default()
            }),
            config::PayloadVariant::Display(DisplayConfig::default()),
            config::PayloadVariant::Lora(LoraConfig::default()),
            config::PayloadVariant::Bluetooth(BluetoothConfig::default()),
            config::PayloadVariant::Security(SecurityConfig {
                public_key: vec![1; 32],
                admin_key: vec![vec![2; 32]],
                ..Default::default()
            }),
            config::PayloadVariant::Sessionkey(SessionkeyConfig::default()),
        ];
        for section in sections {
            let admin = AdminMessage::request(admin_message::PayloadVariant::SetConfig(Config {
                payload_variant: Some(section),
            }));
            let decoded: AdminMessage = decode(&encode(&admin).expect("encodes")).expect("decodes");
            assert_eq!(decoded, admin);
        }
    }

    #[test]
    fn every_module_section_round_trips_through_admin() {
        for kind in crate::module_config::tests::ALL_KINDS {
            let admin = AdminMessage::request(admin_message::PayloadVariant::SetModuleConfig(
                ModuleConfig {
                    payload_variant: Some(crate::module_config::tests::section_for(kind)),
                },
            ));
            let decoded: AdminMessage = decode(&encode(&admin).expect("encodes")).expect("decodes");
            assert_eq!(decoded, admin);
        }
    }

    #[test]
    fn module_config_with_values_round_trips() {
        let config = ModuleConfig {
            payload_variant: Some(module_config::PayloadVariant::Telemetry(TelemetryConfig {
                device_update_interval: 900,
                environment_measurement_enabled: true,
                ..Default::default()
            })),
        };
        let decoded: ModuleConfig = decode(&encode(&config).expect("encodes")).expect("decodes");
        assert_eq!(decoded, config);
    }

    #[test]
    fn empty_config_union_fails_both_directions() {
        assert!(encode(&Config::default()).is_err());
        // An empty byte string decodes to a Config with no branch, which
        // must fail validation rather than infer one.
        assert!(decode::<Config>(&[]).is_err());
    }

    #[test]
    fn config_request_with_unknown_selector_fails() {
        let admin =
            AdminMessage::request(admin_message::PayloadVariant::GetConfigRequest(250));
        assert!(matches!(encode(&admin), Err(WireError::UnknownVariant { .. })));
    }

    #[test]
    fn routing_round_trips_and_rejects_unknown_reason() {
        let reply = Routing {
            variant: Some(routing::Variant::RouteReply(RouteDiscovery {
                route: vec![0x11, 0x22, 0x33],
            })),
        };
        let decoded: Routing = decode(&encode(&reply).expect("encodes")).expect("decodes");
        assert_eq!(decoded, reply);

        let unknown = Routing { variant: Some(routing::Variant::ErrorReason(200)) };
        let bytes = unknown.encode_to_vec();
        assert!(matches!(decode::<Routing>(&bytes), Err(WireError::UnknownVariant { .. })));
    }

    #[test]
    fn unknown_field_tags_are_skipped_on_decode() {
        let admin = AdminMessage::request(admin_message::PayloadVariant::GetOwnerRequest(true));
        let mut bytes = encode(&admin).expect("encodes");
        // Field 120 (varint), unknown to this build: tag key 0x03C0 → bytes C0 07, value 1.
        bytes.extend_from_slice(&[0xC0, 0x07, 0x01]);
        let decoded: AdminMessage = decode(&bytes).expect("unknown field must be skipped");
        assert_eq!(decoded.payload_variant, admin.payload_variant);
    }

    #[test]
    fn decode_payload_dispatches_admin() {
        let admin = AdminMessage {
            payload_variant: Some(admin_message::PayloadVariant::GetOwnerResponse(User {
                id: "!a4c13b92".into(),
                long_name: "Ridge repeater".into(),
                short_name: "RDG".into(),
                ..Default::default()
            })),
            session_passkey: vec![0x55; 8],
        };
        let data = Data {
            portnum: PortNum::Admin as i32,
            payload: encode(&admin).expect("encodes"),
            ..Default::default()
        };
        match decode_payload(&data, PortNum::Admin).expect("dispatches") {
            DecodedPayload::Admin(decoded) => assert_eq!(*decoded, admin),
            other => panic!("expected admin payload, got {other:?}"),
        }
    }

    #[test]
    fn decode_payload_rejects_port_mismatch() {
        let data = Data { portnum: PortNum::Telemetry as i32, ..Default::default() };
        assert!(matches!(
            decode_payload(&data, PortNum::Admin),
            Err(WireError::UnexpectedPort { expected: PortNum::Admin, found }) if found == PortNum::Telemetry as i32
        ));
    }

    #[test]
    fn decode_payload_passes_unparsed_ports_through() {
        let data = Data {
            portnum: PortNum::Telemetry as i32,
            payload: vec![9, 9, 9],
            ..Default::default()
        };
        match decode_payload(&data, PortNum::Telemetry).expect("opaque payload passes") {
            DecodedPayload::Opaque { portnum, payload } => {
                assert_eq!(portnum, PortNum::Telemetry);
                assert_eq!(payload, vec![9, 9, 9]);
            }
            other => panic!("expected opaque payload, got {other:?}"),
        }
    }
}
