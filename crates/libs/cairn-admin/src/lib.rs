//! # cairn-admin
//!
//! The client side of Cairn device administration: an authenticated
//! read-modify-write transaction over an unreliable mesh transport.
//!
//! A batch of configuration writes looks like:
//!
//! ```text
//! begin_session()            passkey exchange + begin_edit_settings
//!   send_admin(set_config)   stamped with the rotating passkey
//!   send_admin(set_channel)  same passkey, issuance order preserved
//! commit_session()           node applies the batch atomically
//! ```
//!
//! [`AdminClient`] runs one protocol task per connected node. The task
//! exclusively owns the pending-request table and the session state, so
//! all correlation and passkey handling is single-writer; callers only
//! ever see the documented async operations. Transient delivery failures
//! retry automatically within a bounded budget; authorization rejections
//! invalidate the session and surface as
//! "not authorized — reconnect".

pub mod client;
pub mod error;
pub mod session;
pub mod transport;

pub use client::{AdminClient, AdminReply, ClientConfig, RoutingFailure};
pub use error::AdminError;
pub use session::{AdminSession, SessionError, PASSKEY_VALIDITY, SESSION_INACTIVITY_WINDOW};
pub use transport::{ChannelTransport, MeshTransport, TransportError};
