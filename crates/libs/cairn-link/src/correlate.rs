//! Pending-request table matching replies to the packets they answer.
//!
//! One table per device connection, owned by that connection's protocol
//! task (single writer). Clocks are passed in by the caller, so deadline
//! behavior is deterministic under test.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use cairn_proto::{MeshPacket, PortNum};

/// Errors from registering an outbound request.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum CorrelateError {
    /// The id is still outstanding; re-using it before the first
    /// exchange resolves would make replies ambiguous.
    #[error("packet id {0:#010x} already has an outstanding request")]
    DuplicateId(u32),

    /// Zero marks "not a reply" on the wire and can never correlate.
    #[error("packet id 0 is reserved and cannot be tracked")]
    ZeroId,
}

/// What the tracker remembers about one in-flight request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SentRequest {
    /// Envelope id of the outbound packet; replies echo it in
    /// `Data.request_id`.
    pub packet_id: u32,
    /// Port the reply is expected on.
    pub expect_port: PortNum,
    /// How long to wait for the reply.
    pub timeout: Duration,
    /// 1-based transmission attempt this registration belongs to.
    pub attempt: u32,
}

/// Outcome of one tracked exchange.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// An inbound packet answered the request.
    Reply { request: SentRequest, packet: Box<MeshPacket> },
    /// The deadline passed with no reply.
    Timeout { request: SentRequest },
}

impl Resolution {
    pub fn request(&self) -> &SentRequest {
        match self {
            Self::Reply { request, .. } | Self::Timeout { request } => request,
        }
    }
}

#[derive(Debug)]
struct Pending {
    request: SentRequest,
    deadline: Instant,
}

/// The id → ticket table for one device connection.
#[derive(Debug, Default)]
pub struct PendingTable {
    pending: HashMap<u32, Pending>,
}

impl PendingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn contains(&self, packet_id: u32) -> bool {
        self.pending.contains_key(&packet_id)
    }

    /// Register an outbound request. At most one ticket may exist per
    /// packet id; a collision is a caller error, not a wire condition.
    pub fn send(&mut self, request: SentRequest, now: Instant) -> Result<(), CorrelateError> {
        if request.packet_id == 0 {
            return Err(CorrelateError::ZeroId);
        }
        if self.pending.contains_key(&request.packet_id) {
            return Err(CorrelateError::DuplicateId(request.packet_id));
        }
        let deadline = now + request.timeout;
        log::trace!(
            "link: tracking id={:#010x} port={:?} attempt={}",
            request.packet_id,
            request.expect_port,
            request.attempt
        );
        self.pending.insert(request.packet_id, Pending { request, deadline });
        Ok(())
    }

    /// Offer an inbound packet to the table.
    ///
    /// Resolves (and removes) the matching ticket if the packet is a
    /// reply to one; anything else — unsolicited traffic, an orphaned
    /// reply to an expired or cancelled request, a duplicate
    /// retransmission of a reply already consumed — returns `None` with
    /// no effect. Resolutions therefore come out in packet-arrival
    /// order, and a reply resolves at most once.
    pub fn on_packet(&mut self, packet: &MeshPacket) -> Option<Resolution> {
        let request_id = packet.decoded().map(|data| data.request_id).unwrap_or(0);
        if request_id == 0 {
            return None;
        }
        match self.pending.remove(&request_id) {
            Some(pending) => Some(Resolution::Reply {
                request: pending.request,
                packet: Box::new(packet.clone()),
            }),
            None => {
                log::trace!("link: dropping reply to unknown id={request_id:#010x}");
                None
            }
        }
    }

    /// Expire every ticket whose deadline has passed, oldest deadline
    /// first.
    pub fn tick(&mut self, now: Instant) -> Vec<Resolution> {
        let mut expired: Vec<u32> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline <= now)
            .map(|(id, _)| *id)
            .collect();
        expired.sort_by_key(|id| self.pending[id].deadline);
        expired
            .into_iter()
            .filter_map(|id| self.pending.remove(&id))
            .map(|pending| {
                log::debug!("link: id={:#010x} timed out", pending.request.packet_id);
                Resolution::Timeout { request: pending.request }
            })
            .collect()
    }

    /// Remove a ticket without resolving it. No wire side effects: the
    /// request may still reach the node, and its late reply will then be
    /// dropped as unmatched.
    pub fn cancel(&mut self, packet_id: u32) -> Option<SentRequest> {
        self.pending.remove(&packet_id).map(|pending| pending.request)
    }
}
