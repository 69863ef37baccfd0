//! Classifying delivery failures into retry/abort verdicts.
//!
//! Input is either an explicit routing error report from the mesh or
//! silent loss inferred from a correlation timeout. Output is a
//! [`Verdict`]: what to do next, and the reason shown to the user.

use std::fmt;
use std::time::Duration;

use cairn_proto::RoutingError;
use serde::{Deserialize, Serialize};

/// How long to stay quiet after tripping the regional duty-cycle budget.
pub const DUTY_CYCLE_COOLDOWN: Duration = Duration::from_secs(30);

/// What the caller should do about a failed delivery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Disposition {
    /// Retry with backoff, bounded attempts.
    Retry,
    /// Wait out the cooldown window, then retry.
    RetryAfterCooldown(Duration),
    /// Re-establish the admin session first; blind retries will keep
    /// failing with the same rejection.
    Reauthenticate,
    /// Stop. Retrying cannot change the outcome.
    Abort,
}

/// User-facing reason a delivery failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum FailureReason {
    /// No path to the destination exists right now.
    Unreachable,
    /// The mesh lost or refused this transmission; a later attempt may
    /// land.
    Transient,
    /// The link layer exhausted its retransmit budget.
    Abandoned,
    /// The request itself cannot traverse this link; retrying the same
    /// request is pointless.
    FixRequest,
    /// Regulatory rate limit; sending is paused.
    RateLimited,
    /// The node rejected our authorization.
    Unauthorized,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Unreachable => "destination unreachable",
            Self::Transient => "transient delivery failure",
            Self::Abandoned => "delivery abandoned",
            Self::FixRequest => "permanent failure, fix request",
            Self::RateLimited => "rate limited, backing off",
            Self::Unauthorized => "not authorized — reconnect",
        };
        f.write_str(label)
    }
}

/// A classified delivery outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub disposition: Disposition,
    pub reason: FailureReason,
}

impl Verdict {
    fn new(disposition: Disposition, reason: FailureReason) -> Self {
        Self { disposition, reason }
    }

    pub fn is_retryable(&self) -> bool {
        matches!(self.disposition, Disposition::Retry | Disposition::RetryAfterCooldown(_))
    }
}

/// Classify an explicit routing error report.
///
/// Returns `None` for [`RoutingError::None`], which is the mesh's
/// acknowledgement, not a failure.
pub fn classify(error: RoutingError) -> Option<Verdict> {
    use RoutingError as E;
    let verdict = match error {
        E::None => return None,
        E::NoRoute => Verdict::new(Disposition::Abort, FailureReason::Unreachable),
        E::GotNak | E::Timeout | E::NoResponse => {
            Verdict::new(Disposition::Retry, FailureReason::Transient)
        }
        E::MaxRetransmit => Verdict::new(Disposition::Abort, FailureReason::Abandoned),
        E::NoChannel | E::TooLarge | E::NoInterface => {
            Verdict::new(Disposition::Abort, FailureReason::FixRequest)
        }
        E::DutyCycleLimit => Verdict::new(
            Disposition::RetryAfterCooldown(DUTY_CYCLE_COOLDOWN),
            FailureReason::RateLimited,
        ),
        E::BadRequest
        | E::NotAuthorized
        | E::PkcFailed
        | E::PkiUnknownPubkey
        | E::AdminBadSessionKey
        | E::AdminPublicKeyUnauthorized => {
            Verdict::new(Disposition::Reauthenticate, FailureReason::Unauthorized)
        }
    };
    Some(verdict)
}

/// Classify silent loss: the correlation deadline elapsed with no
/// application reply.
///
/// When the packet was last seen with its relay budget exhausted
/// (`hop_limit == 0`), the loss is indistinguishable from having no
/// route — only budget exhaustion is assumed, never a specific hop
/// count. Otherwise the loss is treated as a transient timeout.
pub fn classify_silent_loss(hop_limit_exhausted: bool) -> Verdict {
    if hop_limit_exhausted {
        Verdict::new(Disposition::Abort, FailureReason::Unreachable)
    } else {
        Verdict::new(Disposition::Retry, FailureReason::Transient)
    }
}
