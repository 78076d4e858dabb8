//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server. Network tasks never
//! touch game state: they only enqueue `InboundCommand`s, which the game loop
//! drains and applies serially.

use anyhow::Context;
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::protocol::{AckMessage, ObservationMessage, SessionReportMessage, MAX_ACTIONS};
use crate::server::{run_server, ServerConfig};
use crate::types::GameAction;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    /// A client finished its handshake and wants the current state.
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientCommand {
    Actions(ArrayVec<GameAction, MAX_ACTIONS>),
    /// Authoritative currency balance from the remote rewards service
    SyncGp(u32),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientObservation { client_id: usize, obs: Box<ObservationMessage> },
    BroadcastObservation { obs: Box<ObservationMessage> },
    BroadcastReport { report: Box<SessionReportMessage> },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
}

impl Adapter {
    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `HEXON_ADAPTER_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            info!("adapter disabled via HEXON_ADAPTER_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()?).map(Some)
    }

    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None).await {
                error!(error = %e, "adapter server stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
        })
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }
}
