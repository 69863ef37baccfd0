//! Admin session state machine.
//!
//! A batch of configuration writes is bracketed by
//! `begin_edit_settings` / `commit_edit_settings` and authorized by a
//! rotating passkey the node hands out in admin replies. The machine
//! moves `Unauthenticated → Active → Unauthenticated`; writes outside an
//! active bracket are rejected here, locally, before anything touches
//! the wire.
//!
//! The passkey lives in this one value and is threaded through
//! [`AdminSession::stamp`] — it is never ambient state.

use std::time::{Duration, Instant};

use cairn_proto::admin::admin_message::PayloadVariant;
use cairn_proto::AdminMessage;

/// How long an untouched `Active` bracket stays valid. An abandoned
/// session is invalidated by [`AdminSession::tick`] after this window
/// and must be re-begun.
pub const SESSION_INACTIVITY_WINDOW: Duration = Duration::from_secs(300);

/// How long an observed passkey is trusted before a fresh exchange is
/// required.
pub const PASSKEY_VALIDITY: Duration = Duration::from_secs(300);

/// Local precondition violations. None of these produce wire traffic.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("write outside an edit session; begin_edit_settings first")]
    NotAuthenticated,

    #[error("edit session already active; commit or abandon it first")]
    AlreadyActive,

    #[error("commit_edit_settings without a matching begin")]
    CommitWithoutBegin,

    #[error("session passkey missing or stale; re-run the passkey exchange")]
    StalePasskey,
}

#[derive(Debug)]
enum State {
    Unauthenticated,
    Active { last_activity: Instant },
}

/// Session state for one device connection (single writer: the
/// connection's protocol task).
#[derive(Debug)]
pub struct AdminSession {
    state: State,
    passkey: Option<(Vec<u8>, Instant)>,
    inactivity_window: Duration,
    passkey_validity: Duration,
}

impl Default for AdminSession {
    fn default() -> Self {
        Self::new(SESSION_INACTIVITY_WINDOW, PASSKEY_VALIDITY)
    }
}

impl AdminSession {
    pub fn new(inactivity_window: Duration, passkey_validity: Duration) -> Self {
        Self { state: State::Unauthenticated, passkey: None, inactivity_window, passkey_validity }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }

    /// Record the rotating passkey carried by an admin reply. Empty
    /// passkeys (replies to reads on nodes without an established
    /// session) are ignored.
    pub fn observe_passkey(&mut self, passkey: &[u8], now: Instant) {
        if passkey.is_empty() {
            return;
        }
        log::trace!("session: passkey rotated ({})", hex::encode(&passkey[..passkey.len().min(4)]));
        self.passkey = Some((passkey.to_vec(), now));
    }

    fn fresh_passkey(&self, now: Instant) -> Result<&[u8], SessionError> {
        match &self.passkey {
            Some((passkey, observed)) if now.duration_since(*observed) < self.passkey_validity => {
                Ok(passkey)
            }
            _ => Err(SessionError::StalePasskey),
        }
    }

    pub fn has_fresh_passkey(&self, now: Instant) -> bool {
        self.fresh_passkey(now).is_ok()
    }

    /// Attach the passkey to an outbound admin message and advance the
    /// state machine according to its branch.
    ///
    /// Reads pass through (passkey attached when one is known). Writes
    /// require an active bracket; `begin_edit_settings` opens one and
    /// `commit_edit_settings` closes it.
    pub fn stamp(&mut self, message: &mut AdminMessage, now: Instant) -> Result<(), SessionError> {
        let Some(variant) = &message.payload_variant else {
            // Branchless messages never leave this process; the codec
            // rejects them before transmit.
            return Ok(());
        };

        match variant {
            PayloadVariant::BeginEditSettings(_) => {
                if self.is_active() {
                    return Err(SessionError::AlreadyActive);
                }
                message.session_passkey = self.fresh_passkey(now)?.to_vec();
                self.state = State::Active { last_activity: now };
                log::debug!("session: edit bracket opened");
                Ok(())
            }
            PayloadVariant::CommitEditSettings(_) => {
                if !self.is_active() {
                    return Err(SessionError::CommitWithoutBegin);
                }
                message.session_passkey = self.fresh_passkey(now)?.to_vec();
                self.state = State::Unauthenticated;
                log::debug!("session: edit bracket committed");
                Ok(())
            }
            variant if variant.is_write() => {
                let State::Active { last_activity } = &mut self.state else {
                    return Err(SessionError::NotAuthenticated);
                };
                *last_activity = now;
                message.session_passkey = self.fresh_passkey(now)?.to_vec();
                Ok(())
            }
            _ => {
                // Reads carry the passkey once one is established, but
                // never require it.
                if let Ok(passkey) = self.fresh_passkey(now) {
                    message.session_passkey = passkey.to_vec();
                }
                Ok(())
            }
        }
    }

    /// Drop the session after an authorization rejection from the node.
    /// The passkey is discarded too: the node no longer honors it.
    pub fn invalidate(&mut self) {
        if self.is_active() {
            log::warn!("session: invalidated by the node; re-authentication required");
        }
        self.state = State::Unauthenticated;
        self.passkey = None;
    }

    /// Expire an abandoned bracket. Call periodically from the protocol
    /// task's timer.
    pub fn tick(&mut self, now: Instant) {
        if let State::Active { last_activity } = self.state {
            if now.duration_since(last_activity) >= self.inactivity_window {
                log::debug!("session: edit bracket expired after inactivity");
                self.state = State::Unauthenticated;
            }
        }
    }
}
