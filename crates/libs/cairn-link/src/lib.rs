//! # cairn-link
//!
//! Delivery semantics over an unordered, at-most-once mesh: matching
//! inbound replies to outbound requests, expiring the ones that never
//! come back, and deciding what a delivery failure means for the caller.
//!
//! The mesh transport has no native request/response notion, so
//! [`correlate::PendingTable`] keeps an explicit id → ticket table with
//! injected clocks — cancellation and timeout stay auditable and testable
//! without a runtime. [`outcome`] maps routing error codes (and silent
//! loss) onto retry/abort verdicts, and [`retry`] bounds how hard the
//! transient ones are retried.

pub mod correlate;
pub mod outcome;
pub mod retry;

pub use correlate::{CorrelateError, PendingTable, Resolution, SentRequest};
pub use outcome::{classify, classify_silent_loss, Disposition, FailureReason, Verdict};
pub use retry::RetrySchedule;
