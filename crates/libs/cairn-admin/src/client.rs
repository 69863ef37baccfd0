//! Async client facade for one connected node.
//!
//! One protocol task per connection owns the pending-request table and
//! the session state machine (single writer for both). Inbound frames
//! are processed strictly in arrival order; callers talk to the task
//! over a command channel and block on per-call oneshot replies, so the
//! task itself never waits on the mesh.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use cairn_link::{
    classify, classify_silent_loss, Disposition, PendingTable, Resolution, RetrySchedule,
    SentRequest, Verdict,
};
use cairn_proto::admin::admin_message::PayloadVariant;
use cairn_proto::config::ConfigType;
use cairn_proto::mesh::mesh_packet;
use cairn_proto::wire;
use cairn_proto::{
    AdminMessage, Data, MeshPacket, PortNum, Priority, RoutingError, WireError, DEFAULT_HOP_LIMIT,
};
use rand_core::{OsRng, RngCore};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::MissedTickBehavior;

use crate::error::AdminError;
use crate::session::AdminSession;
use crate::transport::MeshTransport;

/// How often the protocol task sweeps deadlines and due retransmissions.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Current instant on the runtime clock, so deadlines follow
/// `tokio::time` (including virtual time under test).
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

/// Settings for one device connection.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Our node id (envelope `from`).
    pub local_node: u32,
    /// The node being administered (envelope `to`).
    pub target_node: u32,
    /// Channel index admin traffic rides on.
    pub channel: u32,
    /// Per-attempt reply deadline.
    pub reply_timeout: Duration,
    /// Retry budget for transient failures and silent loss.
    pub retry: RetrySchedule,
    /// Relay budget stamped on outbound packets.
    pub hop_limit: u32,
}

impl ClientConfig {
    pub fn new(local_node: u32, target_node: u32) -> Self {
        Self {
            local_node,
            target_node,
            channel: 0,
            reply_timeout: Duration::from_secs(15),
            retry: RetrySchedule::default(),
            hop_limit: DEFAULT_HOP_LIMIT,
        }
    }
}

/// Successful outcome of an admin exchange.
#[derive(Debug, PartialEq)]
pub enum AdminReply {
    /// The node answered with an admin message.
    Message(Box<AdminMessage>),
    /// The node acknowledged without an admin payload (typical for
    /// writes).
    Ack,
}

/// A classified routing failure, published to subscribers as it happens.
#[derive(Clone, Debug)]
pub struct RoutingFailure {
    /// Id of the outbound packet the failure concerns.
    pub packet_id: u32,
    pub error: RoutingError,
    pub verdict: Verdict,
}

enum Command {
    SendAdmin {
        message: AdminMessage,
        reply: oneshot::Sender<Result<AdminReply, AdminError>>,
    },
    SendData {
        portnum: PortNum,
        payload: Vec<u8>,
        want_response: bool,
        reply: oneshot::Sender<Result<Option<Box<MeshPacket>>, AdminError>>,
    },
}

/// Handle to one connection's protocol task.
///
/// Cheap to clone; dropping every clone stops the task and fails any
/// exchanges still in flight with [`AdminError::Closed`].
#[derive(Clone)]
pub struct AdminClient {
    commands: mpsc::Sender<Command>,
    routing_errors: broadcast::Sender<RoutingFailure>,
}

impl AdminClient {
    /// Spawn the protocol task for one connection. `inbound` is the
    /// stream of whole received packet buffers from the transport.
    pub fn spawn<T: MeshTransport>(
        config: ClientConfig,
        transport: T,
        inbound: mpsc::Receiver<Vec<u8>>,
    ) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(16);
        let (routing_errors, _) = broadcast::channel(32);
        let task = Task {
            config,
            transport,
            inbound,
            commands: commands_rx,
            routing_errors: routing_errors.clone(),
            table: PendingTable::new(),
            session: AdminSession::default(),
            calls: HashMap::new(),
        };
        tokio::spawn(task.run());
        Self { commands: commands_tx, routing_errors }
    }

    /// Send one admin request and await its reply (or ack), with
    /// automatic bounded retry on transient failures.
    pub async fn send_admin(&self, branch: PayloadVariant) -> Result<AdminReply, AdminError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::SendAdmin { message: AdminMessage::request(branch), reply: reply_tx })
            .await
            .map_err(|_| AdminError::Closed)?;
        reply_rx.await.map_err(|_| AdminError::Closed)?
    }

    /// Send an ordinary application payload. With `want_response` the
    /// call resolves to the reply packet; without, it resolves to `None`
    /// as soon as the frame is handed to the transport.
    pub async fn send_data(
        &self,
        portnum: PortNum,
        payload: Vec<u8>,
        want_response: bool,
    ) -> Result<Option<Box<MeshPacket>>, AdminError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::SendData { portnum, payload, want_response, reply: reply_tx })
            .await
            .map_err(|_| AdminError::Closed)?;
        reply_rx.await.map_err(|_| AdminError::Closed)?
    }

    /// Open an edit bracket: run the passkey exchange, then
    /// `begin_edit_settings`. Writes are accepted until
    /// [`AdminClient::commit_session`].
    pub async fn begin_session(&self) -> Result<(), AdminError> {
        // The passkey rotates, so fetch a fresh one every time rather
        // than guessing whether the cached one is still honored.
        self.send_admin(PayloadVariant::GetConfigRequest(ConfigType::Sessionkey as i32)).await?;
        self.send_admin(PayloadVariant::BeginEditSettings(true)).await?;
        Ok(())
    }

    /// Close the edit bracket; the node applies the batched writes
    /// atomically.
    pub async fn commit_session(&self) -> Result<(), AdminError> {
        self.send_admin(PayloadVariant::CommitEditSettings(true)).await?;
        Ok(())
    }

    /// Subscribe to classified routing failures for this connection.
    pub fn routing_errors(&self) -> broadcast::Receiver<RoutingFailure> {
        self.routing_errors.subscribe()
    }
}

enum ReplySlot {
    Admin(oneshot::Sender<Result<AdminReply, AdminError>>),
    Data(oneshot::Sender<Result<Option<Box<MeshPacket>>, AdminError>>),
}

impl ReplySlot {
    fn fail(self, error: AdminError) {
        match self {
            Self::Admin(tx) => {
                let _ = tx.send(Err(error));
            }
            Self::Data(tx) => {
                let _ = tx.send(Err(error));
            }
        }
    }

    fn is_closed(&self) -> bool {
        match self {
            Self::Admin(tx) => tx.is_closed(),
            Self::Data(tx) => tx.is_closed(),
        }
    }
}

struct Call {
    /// Encoded envelope, kept for retransmission.
    frame: Vec<u8>,
    slot: ReplySlot,
    expect_port: PortNum,
    /// Attempt number the next retransmission will carry.
    next_attempt: u32,
    /// When the next retransmission is due, if one is scheduled.
    retry_at: Option<Instant>,
}

struct Task<T> {
    config: ClientConfig,
    transport: T,
    inbound: mpsc::Receiver<Vec<u8>>,
    commands: mpsc::Receiver<Command>,
    routing_errors: broadcast::Sender<RoutingFailure>,
    table: PendingTable,
    session: AdminSession,
    calls: HashMap<u32, Call>,
}

impl<T: MeshTransport> Task<T> {
    async fn run(mut self) {
        let mut timer = tokio::time::interval(TICK_INTERVAL);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.on_command(command).await,
                    None => break,
                },
                frame = self.inbound.recv() => match frame {
                    Some(frame) => self.on_frame(&frame),
                    None => break,
                },
                _ = timer.tick() => self.on_tick(now()).await,
            }
        }
        for (_, call) in self.calls.drain() {
            call.slot.fail(AdminError::Closed);
        }
    }

    async fn on_command(&mut self, command: Command) {
        match command {
            Command::SendAdmin { mut message, reply } => {
                let now = now();
                if let Err(err) = self.session.stamp(&mut message, now) {
                    let _ = reply.send(Err(err.into()));
                    return;
                }
                let payload = match wire::encode(&message) {
                    Ok(payload) => payload,
                    Err(err) => {
                        let _ = reply.send(Err(err.into()));
                        return;
                    }
                };
                self.transmit(PortNum::Admin, payload, true, ReplySlot::Admin(reply), now).await;
            }
            Command::SendData { portnum, payload, want_response, reply } => {
                let now = now();
                if want_response {
                    self.transmit(portnum, payload, true, ReplySlot::Data(reply), now).await;
                } else {
                    let frame = match self.encode_envelope(portnum, payload, false) {
                        Ok((_, frame)) => frame,
                        Err(err) => {
                            let _ = reply.send(Err(err));
                            return;
                        }
                    };
                    let result = self
                        .transport
                        .send_frame(frame)
                        .await
                        .map(|()| None)
                        .map_err(AdminError::from);
                    let _ = reply.send(result);
                }
            }
        }
    }

    fn encode_envelope(
        &mut self,
        portnum: PortNum,
        payload: Vec<u8>,
        want_response: bool,
    ) -> Result<(u32, Vec<u8>), AdminError> {
        let packet_id = self.next_packet_id();
        let packet = MeshPacket {
            from: self.config.local_node,
            to: self.config.target_node,
            channel: self.config.channel,
            id: packet_id,
            hop_limit: self.config.hop_limit,
            want_ack: true,
            priority: Priority::Reliable as i32,
            payload_variant: Some(mesh_packet::PayloadVariant::Decoded(Data {
                portnum: portnum as i32,
                payload,
                want_response,
                ..Default::default()
            })),
            ..Default::default()
        };
        let frame = wire::encode(&packet)?;
        Ok((packet_id, frame))
    }

    async fn transmit(
        &mut self,
        portnum: PortNum,
        payload: Vec<u8>,
        want_response: bool,
        slot: ReplySlot,
        now: Instant,
    ) {
        let (packet_id, frame) = match self.encode_envelope(portnum, payload, want_response) {
            Ok(encoded) => encoded,
            Err(err) => {
                slot.fail(err);
                return;
            }
        };
        let request = SentRequest {
            packet_id,
            expect_port: portnum,
            timeout: self.config.reply_timeout,
            attempt: 1,
        };
        if let Err(err) = self.table.send(request, now) {
            slot.fail(err.into());
            return;
        }
        self.calls.insert(
            packet_id,
            Call { frame: frame.clone(), slot, expect_port: portnum, next_attempt: 2, retry_at: None },
        );
        if let Err(err) = self.transport.send_frame(frame).await {
            self.table.cancel(packet_id);
            if let Some(call) = self.calls.remove(&packet_id) {
                call.slot.fail(err.into());
            }
        }
    }

    fn on_frame(&mut self, frame: &[u8]) {
        let packet: MeshPacket = match wire::decode(frame) {
            Ok(packet) => packet,
            Err(err) => {
                log::warn!("link: dropping undecodable frame: {err}");
                return;
            }
        };
        let Some(Resolution::Reply { request, packet }) = self.table.on_packet(&packet) else {
            // Unsolicited traffic, or a reply to something expired,
            // cancelled, or already answered. Dropped by design.
            return;
        };
        let Some(call) = self.calls.remove(&request.packet_id) else {
            return;
        };
        let now = now();

        let Some(data) = packet.decoded() else {
            // An envelope still encrypted cannot be interpreted here.
            call.slot.fail(WireError::MissingVariant { message: "MeshPacket" }.into());
            return;
        };
        match data.portnum() {
            Ok(PortNum::Routing) => self.on_routing_reply(request, call, &packet, now),
            Ok(PortNum::Admin) => self.on_admin_reply(call, data, now),
            Ok(_) => match call.slot {
                ReplySlot::Data(tx) => {
                    let _ = tx.send(Ok(Some(packet)));
                }
                ReplySlot::Admin(tx) => {
                    let _ = tx.send(Err(WireError::UnexpectedPort {
                        expected: PortNum::Admin,
                        found: data.portnum,
                    }
                    .into()));
                }
            },
            Err(err) => call.slot.fail(err.into()),
        }
    }

    fn on_admin_reply(&mut self, call: Call, data: &Data, now: Instant) {
        let reply: AdminMessage = match wire::decode(&data.payload) {
            Ok(reply) => reply,
            Err(err) => {
                call.slot.fail(err.into());
                return;
            }
        };
        self.session.observe_passkey(&reply.session_passkey, now);
        let expected = call.expect_port;
        match call.slot {
            ReplySlot::Admin(tx) => {
                let _ = tx.send(Ok(AdminReply::Message(Box::new(reply))));
            }
            ReplySlot::Data(tx) => {
                let _ = tx.send(Err(WireError::UnexpectedPort {
                    expected,
                    found: data.portnum,
                }
                .into()));
            }
        }
    }

    fn on_routing_reply(
        &mut self,
        request: SentRequest,
        call: Call,
        packet: &MeshPacket,
        now: Instant,
    ) {
        let Some(data) = packet.decoded() else { return };
        let routing: cairn_proto::Routing = match wire::decode(&data.payload) {
            Ok(routing) => routing,
            Err(err) => {
                call.slot.fail(err.into());
                return;
            }
        };
        let reason = match routing.error_reason() {
            Ok(Some(reason)) => reason,
            Ok(None) => {
                // A route trace answering a traceroute request.
                match call.slot {
                    ReplySlot::Data(tx) => {
                        let _ = tx.send(Ok(Some(Box::new(packet.clone()))));
                    }
                    ReplySlot::Admin(tx) => {
                        let _ = tx.send(Ok(AdminReply::Ack));
                    }
                }
                return;
            }
            Err(err) => {
                call.slot.fail(err.into());
                return;
            }
        };
        let Some(verdict) = classify(reason) else {
            // Explicit acknowledgement.
            match call.slot {
                ReplySlot::Admin(tx) => {
                    let _ = tx.send(Ok(AdminReply::Ack));
                }
                ReplySlot::Data(tx) => {
                    let _ = tx.send(Ok(Some(Box::new(packet.clone()))));
                }
            }
            return;
        };

        log::debug!(
            "link: id={:#010x} failed: {:?} -> {}",
            request.packet_id,
            reason,
            verdict.reason
        );
        let _ = self.routing_errors.send(RoutingFailure {
            packet_id: request.packet_id,
            error: reason,
            verdict,
        });
        if reason.is_auth_failure() {
            self.session.invalidate();
        }

        match verdict.disposition {
            Disposition::Retry if self.config.retry.attempts_left(request.attempt) => {
                let delay = self
                    .config
                    .retry
                    .delay_before(request.attempt + 1)
                    .unwrap_or(Duration::ZERO);
                self.schedule_retry(request.packet_id, call, now + delay);
            }
            Disposition::RetryAfterCooldown(cooldown)
                if self.config.retry.attempts_left(request.attempt) =>
            {
                self.schedule_retry(request.packet_id, call, now + cooldown);
            }
            _ => {
                call.slot.fail(AdminError::Delivery {
                    reason: verdict.reason,
                    error: Some(reason),
                });
            }
        }
    }

    fn schedule_retry(&mut self, packet_id: u32, mut call: Call, due: Instant) {
        call.retry_at = Some(due);
        self.calls.insert(packet_id, call);
    }

    async fn on_tick(&mut self, now: Instant) {
        self.session.tick(now);

        for resolution in self.table.tick(now) {
            let Resolution::Timeout { request } = resolution else { continue };
            self.on_timeout(request, now);
        }

        let due: Vec<u32> = self
            .calls
            .iter()
            .filter(|(_, call)| call.retry_at.is_some_and(|at| at <= now))
            .map(|(id, _)| *id)
            .collect();
        for packet_id in due {
            self.retransmit(packet_id, now).await;
        }

        // Callers that dropped their future cancel the exchange; the
        // request may still reach the node, and its reply will then be
        // dropped as unmatched.
        let cancelled: Vec<u32> = self
            .calls
            .iter()
            .filter(|(_, call)| call.slot.is_closed())
            .map(|(id, _)| *id)
            .collect();
        for packet_id in cancelled {
            self.table.cancel(packet_id);
            self.calls.remove(&packet_id);
            log::trace!("link: id={packet_id:#010x} cancelled by caller");
        }
    }

    fn on_timeout(&mut self, request: SentRequest, now: Instant) {
        let verdict = classify_silent_loss(false);
        if verdict.is_retryable() && self.config.retry.attempts_left(request.attempt) {
            let delay =
                self.config.retry.delay_before(request.attempt + 1).unwrap_or(Duration::ZERO);
            if let Some(call) = self.calls.get_mut(&request.packet_id) {
                call.retry_at = Some(now + delay);
                call.next_attempt = request.attempt + 1;
            }
        } else if let Some(call) = self.calls.remove(&request.packet_id) {
            call.slot.fail(AdminError::Abandoned { attempts: request.attempt });
        }
    }

    async fn retransmit(&mut self, packet_id: u32, now: Instant) {
        let Some(call) = self.calls.get_mut(&packet_id) else { return };
        call.retry_at = None;
        let attempt = call.next_attempt;
        call.next_attempt = attempt + 1;
        let request = SentRequest {
            packet_id,
            expect_port: call.expect_port,
            timeout: self.config.reply_timeout,
            attempt,
        };
        let frame = call.frame.clone();
        log::debug!("link: retransmitting id={packet_id:#010x} attempt={attempt}");
        if let Err(err) = self.table.send(request, now) {
            log::warn!("link: cannot re-track id={packet_id:#010x}: {err}");
        }
        if let Err(err) = self.transport.send_frame(frame).await {
            self.table.cancel(packet_id);
            if let Some(call) = self.calls.remove(&packet_id) {
                call.slot.fail(err.into());
            }
        }
    }

    fn next_packet_id(&self) -> u32 {
        loop {
            let id = OsRng.next_u32();
            if id != 0 && !self.table.contains(id) && !self.calls.contains_key(&id) {
                return id;
            }
        }
    }
}
