//! TCP server for the host adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::core::GameState;
use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Stable 64-bit FNV-1a hasher for deterministic `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions/platforms.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(|b| b.is_ascii_digit()).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7777,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Create from `HEXON_*` environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; missing keys keep their defaults,
    /// unparsable ones are errors.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("HEXON_HOST") {
            config.host = host;
        }
        if let Some(v) = lookup("HEXON_PORT") {
            config.port = v
                .trim()
                .parse()
                .with_context(|| format!("invalid HEXON_PORT {:?}", v))?;
        }
        if let Some(v) = lookup("HEXON_MAX_PENDING") {
            config.max_pending_commands = v
                .trim()
                .parse()
                .with_context(|| format!("invalid HEXON_MAX_PENDING {:?}", v))?;
        }

        Ok(config)
    }

    /// Check if the adapter is disabled via environment
    pub fn is_disabled() -> bool {
        std::env::var("HEXON_ADAPTER_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>, // Client id
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub is_controller: bool,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    tx: mpsc::UnboundedSender<ClientOutbound>,
}

#[derive(Debug, Clone)]
enum ClientOutbound {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(Box<ObservationMessage>),
    Report(Box<SessionReportMessage>),
}

async fn is_handshaken(state: &ServerState, client_id: usize) -> bool {
    let clients = state.clients.read().await;
    clients
        .iter()
        .find(|c| c.id == client_id)
        .map(|c| c.handshaken)
        .unwrap_or(false)
}

async fn check_and_update_seq(state: &ServerState, client_id: usize, seq: u64) -> bool {
    let mut clients = state.clients.write().await;
    let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
        return true;
    };

    match client.last_seq {
        Some(prev) if seq <= prev => false,
        _ => {
            client.last_seq = Some(seq);
            true
        }
    }
}

/// Handshake and sequencing checks shared by command and control messages.
///
/// Sends the error itself and returns false when the message must be dropped.
async fn admit(
    state: &ServerState,
    client_id: usize,
    seq: u64,
    tx: &mpsc::UnboundedSender<ClientOutbound>,
) -> bool {
    if !is_handshaken(state, client_id).await {
        let error = create_error(seq, ErrorCode::HandshakeRequired, "Send hello first");
        let _ = tx.send(ClientOutbound::Error(error));
        return false;
    }
    if !check_and_update_seq(state, client_id, seq).await {
        let error = create_error(
            seq,
            ErrorCode::InvalidCommand,
            "seq must be strictly increasing",
        );
        let _ = tx.send(ClientOutbound::Error(error));
        return false;
    }
    true
}

async fn send_to(state: &ServerState, client_id: usize, msg: ClientOutbound) {
    let clients = state.clients.read().await;
    if let Some(c) = clients.iter().find(|c| c.id == client_id) {
        let _ = c.tx.send(msg);
    }
}

/// Start the TCP server
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    let bound = listener.local_addr()?;
    info!(addr = %bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        send_to(&state, client_id, ClientOutbound::Ack(ack)).await;
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        send_to(&state, client_id, ClientOutbound::Observation(obs)).await;
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        let clients = state.clients.read().await;
                        for c in clients
                            .iter()
                            .filter(|c| c.handshaken && c.stream_observations)
                        {
                            let _ = c.tx.send(ClientOutbound::Observation(obs.clone()));
                        }
                    }
                    OutboundMessage::BroadcastReport { report } => {
                        let clients = state.clients.read().await;
                        for c in clients.iter().filter(|c| c.handshaken) {
                            let _ = c.tx.send(ClientOutbound::Report(report.clone()));
                        }
                    }
                }
            }
        });
    }

    // Accept incoming connections
    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;

        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

async fn write_json<W, T>(writer: &mut W, buf: &mut Vec<u8>, value: &T) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    buf.clear();
    serde_json::to_writer(&mut *buf, value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    buf.push(b'\n');
    writer.write_all(buf).await?;
    writer.flush().await
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: Arc<ServerState>,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = tokio::io::split(socket);
    let mut reader = BufReader::new(reader);

    // Channel to send messages to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<ClientOutbound>();

    {
        let mut clients = state.clients.write().await;
        clients.push(ClientHandle {
            id: client_id,
            addr,
            is_controller: false,
            stream_observations: false,
            handshaken: false,
            last_seq: None,
            tx: tx.clone(),
        });
    }

    // Spawn task to write messages to client
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = rx.recv().await {
            let result = match &msg {
                ClientOutbound::Welcome(m) => write_json(&mut writer, &mut buf, m).await,
                ClientOutbound::Ack(m) => write_json(&mut writer, &mut buf, m).await,
                ClientOutbound::Error(m) => write_json(&mut writer, &mut buf, m).await,
                ClientOutbound::Observation(m) => write_json(&mut writer, &mut buf, m).await,
                ClientOutbound::Report(m) => write_json(&mut writer, &mut buf, m).await,
            };
            if result.is_err() {
                break;
            }
        }
    });

    // Handle incoming messages
    let mut line = String::new();

    loop {
        line.clear();
        let bytes_read = reader.read_line(&mut line).await?;

        if bytes_read == 0 {
            // Client disconnected
            break;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        match parse_message(trimmed) {
            Ok(ParsedMessage::Hello(hello)) => {
                // A repeated hello still has to respect sequencing.
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, hello.seq).await
                {
                    let error = create_error(
                        hello.seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                if !is_compatible_version(&hello.protocol_version) {
                    warn!(client_id, version = %hello.protocol_version, "protocol mismatch");
                    let error = create_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    break;
                }

                // First client to hello becomes controller
                let (role, controller_id) = {
                    let mut controller = state.controller.write().await;
                    let mut clients = state.clients.write().await;
                    let became_controller = controller.is_none();
                    if became_controller {
                        *controller = Some(client_id);
                        info!(client_id, "client is now controller");
                    }
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.stream_observations = hello.requested.stream_observations;
                        client.is_controller = *controller == Some(client_id);
                    }
                    let role = if *controller == Some(client_id) {
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    (role, controller.map(|id| id as u64))
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id as u64,
                    role,
                    controller_id,
                );
                let _ = tx.send(ClientOutbound::Welcome(welcome));

                // Request an immediate snapshot for this client if desired.
                if hello.requested.stream_observations
                    && command_tx
                        .try_send(InboundCommand {
                            client_id,
                            seq: hello.seq,
                            payload: InboundPayload::SnapshotRequest,
                        })
                        .is_err()
                {
                    debug!(client_id, seq = hello.seq, "command queue full, snapshot dropped");
                }
            }

            Ok(ParsedMessage::Command(cmd)) => {
                if !admit(&state, client_id, cmd.seq, &tx).await {
                    continue;
                }

                let is_controller = *state.controller.read().await == Some(client_id);
                if !is_controller {
                    let error = create_error(
                        cmd.seq,
                        ErrorCode::NotController,
                        "Only controller may send commands",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }

                let mapped = match map_command(&cmd) {
                    Ok(c) => c,
                    Err((code, message)) => {
                        let error = create_error(cmd.seq, code, &message);
                        let _ = tx.send(ClientOutbound::Error(error));
                        continue;
                    }
                };

                // Backpressure: bounded queue. The game loop acks after applying.
                if command_tx
                    .try_send(InboundCommand {
                        client_id,
                        seq: cmd.seq,
                        payload: InboundPayload::Command(mapped),
                    })
                    .is_err()
                {
                    debug!(client_id, seq = cmd.seq, "command queue full");
                    let error =
                        create_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                    let _ = tx.send(ClientOutbound::Error(error));
                }
            }

            Ok(ParsedMessage::Control(ctrl)) => {
                if !admit(&state, client_id, ctrl.seq, &tx).await {
                    continue;
                }

                let mut controller = state.controller.write().await;
                let mut clients = state.clients.write().await;
                match ctrl.action {
                    ControlAction::Claim => {
                        if controller.is_none() || *controller == Some(client_id) {
                            *controller = Some(client_id);
                            if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                                client.is_controller = true;
                            }
                            info!(client_id, "controller claimed");
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        } else {
                            let error = create_error(
                                ctrl.seq,
                                ErrorCode::ControllerActive,
                                "Controller already assigned",
                            );
                            let _ = tx.send(ClientOutbound::Error(error));
                        }
                    }
                    ControlAction::Release => {
                        if *controller == Some(client_id) {
                            *controller = None;
                            if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                                client.is_controller = false;
                            }
                            info!(client_id, "controller released");
                            let _ = tx.send(ClientOutbound::Ack(create_ack(ctrl.seq)));
                        } else {
                            let error = create_error(
                                ctrl.seq,
                                ErrorCode::NotController,
                                "Only controller may release",
                            );
                            let _ = tx.send(ClientOutbound::Error(error));
                        }
                    }
                }
            }

            Ok(ParsedMessage::Unknown(unknown)) => {
                let seq = unknown.seq;
                if is_handshaken(&state, client_id).await
                    && !check_and_update_seq(&state, client_id, seq).await
                {
                    let error = create_error(
                        seq,
                        ErrorCode::InvalidCommand,
                        "seq must be strictly increasing",
                    );
                    let _ = tx.send(ClientOutbound::Error(error));
                    continue;
                }
                let error = create_error(seq, ErrorCode::InvalidCommand, "Unknown message type");
                let _ = tx.send(ClientOutbound::Error(error));
            }

            Err(e) => {
                debug!(client_id, error = %e, "unparsable message");
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                let error = create_error(
                    seq,
                    ErrorCode::InvalidCommand,
                    &format!("JSON parse error: {}", e),
                );
                let _ = tx.send(ClientOutbound::Error(error));
            }
        }
    }

    // Clean up: remove client and release/promote controller if needed.
    {
        let mut controller = state.controller.write().await;
        let mut clients = state.clients.write().await;

        let was_controller = *controller == Some(client_id);
        clients.retain(|c| c.id != client_id);

        if was_controller {
            // Promote the next handshaken client (lowest id) to controller.
            let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
            *controller = next_id;
            if let Some(new_id) = next_id {
                if let Some(c) = clients.iter_mut().find(|c| c.id == new_id) {
                    c.is_controller = true;
                }
                info!(client_id = new_id, "controller promoted");
            } else {
                info!(client_id, "controller released on disconnect");
            }
        }
    }

    drop(tx);
    let _ = write_task.await;

    Ok(())
}

/// Map a protocol command into an engine command.
pub fn map_command(cmd: &CommandMessage) -> Result<ClientCommand, (ErrorCode, String)> {
    match cmd.mode {
        CommandMode::Action => {
            let Some(list) = cmd.actions.as_ref() else {
                return Err((ErrorCode::InvalidCommand, "Missing actions".to_string()));
            };
            if list.0.is_empty() {
                return Err((ErrorCode::InvalidCommand, "Empty action list".to_string()));
            }
            Ok(ClientCommand::Actions(list.actions().collect()))
        }
        CommandMode::Sync => match cmd.gp {
            Some(gp) => Ok(ClientCommand::SyncGp(gp)),
            None => Err((ErrorCode::InvalidCommand, "Missing gp".to_string())),
        },
    }
}

/// Build observation message from game state
pub fn build_observation(
    game_state: &GameState,
    seq: u64,
    last_event: Option<LastEvent>,
) -> ObservationMessage {
    use std::hash::{Hash, Hasher};

    let snap = game_state.snapshot();

    let mut hasher = Fnv1aHasher::new();
    snap.hash(&mut hasher);
    last_event.hash(&mut hasher);
    let state_hash = StateHash(hasher.finish());

    let active = snap.active.map(|piece| ActivePieceSnapshot {
        kind: PieceKindLower::from(piece.kind),
        rotation: piece.rotation,
        x: piece.x,
        y: piece.y,
        cells: piece.cells.map(|(x, y)| [x, y]),
    });

    ObservationMessage {
        msg_type: ObservationType::Observation,
        seq,
        ts: current_timestamp_ms(),
        playable: snap.playable(),
        game_over: snap.game_over,
        episode_id: snap.episode_id,
        seed: snap.seed,
        piece_id: snap.piece_id,
        board: BoardSnapshot {
            width: snap.cols,
            height: snap.rows,
            cells: snap.board,
        },
        active,
        next: snap.next.map(PieceKindLower::from),
        last_event,
        state_hash,
        score: snap.score,
        gp: snap.gp,
        level: snap.level,
        lines: snap.lines,
        combo: snap.combo,
        drop_interval_ms: snap.drop_interval_ms,
    }
}
