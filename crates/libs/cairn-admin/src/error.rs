//! Terminal errors surfaced to callers of the client facade.

use cairn_link::{CorrelateError, FailureReason};
use cairn_proto::{RoutingError, WireError};

use crate::session::SessionError;
use crate::transport::TransportError;

/// Why one admin or data exchange ultimately failed.
///
/// Transient routing failures are retried inside the client up to the
/// configured budget and only surface here once that budget is spent or
/// the failure is not retryable.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AdminError {
    /// Codec fault — malformed bytes or a structurally invalid message.
    /// Always local, never retried.
    #[error(transparent)]
    Wire(#[from] WireError),

    /// Session precondition violated; rejected before any wire traffic.
    #[error(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Correlation bookkeeping fault (caller-side id misuse).
    #[error(transparent)]
    Correlate(#[from] CorrelateError),

    /// The mesh reported a failure retrying cannot fix, or the retry
    /// budget is spent. `error` carries the wire reason when the mesh
    /// reported one (as opposed to inferred silent loss).
    #[error("{reason}")]
    Delivery { reason: FailureReason, error: Option<RoutingError> },

    /// Every transmission attempt timed out with no reply at all.
    #[error("request abandoned after retries ({attempts} attempts)")]
    Abandoned { attempts: u32 },

    /// The connection's protocol task is gone.
    #[error("connection closed")]
    Closed,
}

impl AdminError {
    /// True when re-running the passkey exchange could make the same
    /// request succeed.
    pub fn needs_reauthentication(&self) -> bool {
        matches!(
            self,
            Self::Session(SessionError::NotAuthenticated | SessionError::StalePasskey)
                | Self::Delivery { reason: FailureReason::Unauthorized, .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_error_displays_the_user_facing_reason() {
        let error = AdminError::Delivery {
            reason: FailureReason::Unauthorized,
            error: Some(RoutingError::AdminBadSessionKey),
        };
        assert_eq!(error.to_string(), "not authorized — reconnect");
        assert!(error.needs_reauthentication());
    }

    #[test]
    fn abandoned_error_names_the_attempt_count() {
        let error = AdminError::Abandoned { attempts: 3 };
        assert_eq!(error.to_string(), "request abandoned after retries (3 attempts)");
        assert!(!error.needs_reauthentication());
    }
}
