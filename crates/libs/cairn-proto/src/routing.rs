//! Route traces and delivery outcome reports.
//!
//! A [`Routing`] message is created when a route trace completes or when
//! a packet fails in transit; it is consumed exactly once by the outcome
//! classifier and never mutated after creation.

use crate::wire::WireError;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Routing {
    #[prost(oneof = "routing::Variant", tags = "1, 2, 3")]
    pub variant: Option<routing::Variant>,
}

pub mod routing {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Variant {
        /// A trace on its way out, collecting relayers.
        #[prost(message, tag = "1")]
        RouteRequest(super::RouteDiscovery),
        /// The completed trace on its way back.
        #[prost(message, tag = "2")]
        RouteReply(super::RouteDiscovery),
        /// Why a packet could not be delivered.
        #[prost(enumeration = "super::RoutingError", tag = "3")]
        ErrorReason(i32),
    }
}

impl Routing {
    /// The delivery error carried by this message, if it is an error
    /// report. Unknown error codes surface as [`WireError::UnknownVariant`].
    pub fn error_reason(&self) -> Result<Option<RoutingError>, WireError> {
        match &self.variant {
            Some(routing::Variant::ErrorReason(raw)) => RoutingError::try_from(*raw)
                .map(Some)
                .map_err(|_| WireError::unknown_variant("Routing.error_reason", *raw)),
            _ => Ok(None),
        }
    }
}

/// Ordered list of the nodes that relayed a traced packet.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RouteDiscovery {
    #[prost(uint32, repeated, tag = "1")]
    pub route: Vec<u32>,
}

/// Why the mesh could not deliver a packet.
///
/// Values 1–9 are transport-layer outcomes; 32–37 are request- and
/// authorization-level rejections from the destination node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum RoutingError {
    None = 0,
    /// No known path toward the destination.
    NoRoute = 1,
    /// A relay refused the packet.
    GotNak = 2,
    Timeout = 3,
    /// No interface on this node can reach the destination.
    NoInterface = 4,
    /// The link layer gave up after its retransmit budget.
    MaxRetransmit = 5,
    /// The destination does not share the packet's channel.
    NoChannel = 6,
    /// Payload exceeds what this link can carry.
    TooLarge = 7,
    /// The destination saw the request but sent nothing back.
    NoResponse = 8,
    /// Regional duty-cycle budget exhausted; sending paused.
    DutyCycleLimit = 9,
    BadRequest = 32,
    NotAuthorized = 33,
    /// Public-key channel decryption failed.
    PkcFailed = 34,
    PkiUnknownPubkey = 35,
    AdminBadSessionKey = 36,
    AdminPublicKeyUnauthorized = 37,
}

impl RoutingError {
    /// Rejections that mean the current admin session (or key material)
    /// is no longer accepted; the caller must re-authenticate before any
    /// retry.
    pub fn is_auth_failure(self) -> bool {
        matches!(
            self,
            Self::BadRequest
                | Self::NotAuthorized
                | Self::PkcFailed
                | Self::PkiUnknownPubkey
                | Self::AdminBadSessionKey
                | Self::AdminPublicKeyUnauthorized
        )
    }
}
