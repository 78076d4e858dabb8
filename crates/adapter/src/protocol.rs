//! Protocol module - JSON message types for the host adapter
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sequence number)
//! and `ts` (timestamp in ms).

use serde::{Deserialize, Serialize};

use crate::core::{ActionRecord, LoggedAction, SessionReport};
use crate::types::{CoreLastEvent, GameAction, PieceKind};

use arrayvec::ArrayVec;

/// Most actions one command may carry
pub const MAX_ACTIONS: usize = 32;

/// Protocol version spoken by this adapter; clients must share the major version
pub const PROTOCOL_VERSION: &str = "1.0.0";

// ============== Client -> Game Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HelloType {
    #[default]
    #[serde(rename = "hello")]
    Hello,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CommandType {
    #[default]
    #[serde(rename = "command")]
    Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ControlType {
    #[default]
    #[serde(rename = "control")]
    Control,
}

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: HelloType,
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default = "default_true")]
    pub stream_observations: bool,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssignedRole {
    #[serde(rename = "controller")]
    Controller,
    #[serde(rename = "observer")]
    Observer,
}

/// Command message (controller only)
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: CommandType,
    pub seq: u64,
    pub ts: u64,
    pub mode: CommandMode,
    /// For action mode
    #[serde(default)]
    pub actions: Option<ActionList>,
    /// For sync mode: authoritative currency balance
    #[serde(default)]
    pub gp: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandMode {
    Action,
    Sync,
}

impl<'de> Deserialize<'de> for CommandMode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("action") {
            Ok(Self::Action)
        } else if s.eq_ignore_ascii_case("sync") {
            Ok(Self::Sync)
        } else {
            Err(serde::de::Error::custom("invalid command mode"))
        }
    }
}

impl Serialize for CommandMode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            CommandMode::Action => serializer.serialize_str("action"),
            CommandMode::Sync => serializer.serialize_str("sync"),
        }
    }
}

/// Wire name of a logical action (case-insensitive on input)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ActionName(pub GameAction);

impl<'de> Deserialize<'de> for ActionName {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        GameAction::from_str(s)
            .map(ActionName)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown action: {}", s)))
    }
}

impl Serialize for ActionName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionList(pub ArrayVec<ActionName, MAX_ACTIONS>);

impl ActionList {
    pub fn actions(&self) -> impl Iterator<Item = GameAction> + '_ {
        self.0.iter().map(|a| a.0)
    }
}

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = ActionList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of action strings")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<ActionName, MAX_ACTIONS>::new();
                while let Some(a) = seq.next_element::<ActionName>()? {
                    out.try_push(a)
                        .map_err(|_| serde::de::Error::custom("too many actions"))?;
                }
                Ok(ActionList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    #[serde(rename = "type")]
    #[serde(default)]
    pub msg_type: ControlType,
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlAction {
    Claim,
    Release,
}

impl<'de> Deserialize<'de> for ControlAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = <&str>::deserialize(deserializer)?;
        if s.eq_ignore_ascii_case("claim") {
            Ok(Self::Claim)
        } else if s.eq_ignore_ascii_case("release") {
            Ok(Self::Release)
        } else {
            Err(serde::de::Error::custom("invalid control action"))
        }
    }
}

impl Serialize for ControlAction {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            ControlAction::Claim => serializer.serialize_str("claim"),
            ControlAction::Release => serializer.serialize_str("release"),
        }
    }
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WelcomeType {
    #[serde(rename = "welcome")]
    Welcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckType {
    #[serde(rename = "ack")]
    Ack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorType {
    #[serde(rename = "error")]
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    #[serde(rename = "handshake_required")]
    HandshakeRequired,
    #[serde(rename = "protocol_mismatch")]
    ProtocolMismatch,
    #[serde(rename = "not_controller")]
    NotController,
    #[serde(rename = "controller_active")]
    ControllerActive,
    #[serde(rename = "invalid_command")]
    InvalidCommand,
    #[serde(rename = "backpressure")]
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    #[serde(rename = "type")]
    pub msg_type: WelcomeType,
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: u64,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<u64>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: [CapabilityFormat; 1],
    pub command_modes: [CapabilityCommandMode; 2],
    pub actions: Vec<String>,
    pub features: Vec<CapabilityFeature>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFormat {
    #[serde(rename = "json")]
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityCommandMode {
    #[serde(rename = "action")]
    Action,
    #[serde(rename = "sync")]
    Sync,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapabilityFeature {
    #[serde(rename = "next")]
    Next,
    #[serde(rename = "last_event")]
    LastEvent,
    #[serde(rename = "state_hash")]
    StateHash,
    #[serde(rename = "score")]
    Score,
    #[serde(rename = "gp")]
    Gp,
    #[serde(rename = "session_report")]
    SessionReport,
}

/// Acknowledgment for command receipt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    #[serde(rename = "type")]
    pub msg_type: AckType,
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    #[serde(rename = "type")]
    pub msg_type: ErrorType,
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservationType {
    #[serde(rename = "observation")]
    Observation,
}

/// Game state observation (sent to streaming clients)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    #[serde(rename = "type")]
    pub msg_type: ObservationType,
    pub seq: u64,
    pub ts: u64,
    pub playable: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub piece_id: u32,
    pub board: BoardSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<ActivePieceSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PieceKindLower>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_event: Option<LastEvent>,
    pub state_hash: StateHash,
    pub score: u32,
    pub gp: u32,
    pub level: u32,
    pub lines: u32,
    pub combo: u32,
    pub drop_interval_ms: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major, 0 = empty, 1-7 = piece kind
    pub cells: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivePieceSnapshot {
    pub kind: PieceKindLower,
    pub rotation: u8,
    pub x: i8,
    pub y: i8,
    /// Absolute `[x, y]` cells; `y` may be negative above the board
    pub cells: [[i8; 2]; 4],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKindLower {
    #[serde(rename = "i")]
    I,
    #[serde(rename = "j")]
    J,
    #[serde(rename = "l")]
    L,
    #[serde(rename = "o")]
    O,
    #[serde(rename = "s")]
    S,
    #[serde(rename = "t")]
    T,
    #[serde(rename = "z")]
    Z,
}

impl From<PieceKind> for PieceKindLower {
    fn from(value: PieceKind) -> Self {
        match value {
            PieceKind::I => Self::I,
            PieceKind::J => Self::J,
            PieceKind::L => Self::L,
            PieceKind::O => Self::O,
            PieceKind::S => Self::S,
            PieceKind::T => Self::T,
            PieceKind::Z => Self::Z,
        }
    }
}

/// Deterministic state hash serialized as 16 lowercase hex digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(&format_args!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LastEvent {
    pub cells_locked: u8,
    pub lines_cleared: u32,
    pub line_clear_score: u32,
    pub gp_awarded: u32,
    pub combo: u32,
    pub level_up: bool,
    pub game_over: bool,
}

impl From<CoreLastEvent> for LastEvent {
    fn from(value: CoreLastEvent) -> Self {
        Self {
            cells_locked: value.cells_locked,
            lines_cleared: value.lines_cleared,
            line_clear_score: value.line_clear_score,
            gp_awarded: value.gp_awarded,
            combo: value.combo,
            level_up: value.level_up,
            game_over: value.game_over,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionReportType {
    #[serde(rename = "session_report")]
    SessionReport,
}

/// End-of-game payload for the remote scoring service (broadcast once per game over)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReportMessage {
    #[serde(rename = "type")]
    pub msg_type: SessionReportType,
    pub seq: u64,
    pub ts: u64,
    pub session_id: String,
    pub episode_id: u32,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    pub gp_earned: u32,
    pub action_log: Vec<ActionLogEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionLogEntry {
    pub seq: u64,
    #[serde(flatten)]
    pub action: ActionLogDetail,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum ActionLogDetail {
    Spawn { kind: PieceKindLower },
    Move { dir: i8 },
    SoftDrop,
    HardDrop { falls: u32 },
    Rotate { rotation: u8 },
    TickDrop { moved: bool },
    Clear { count: u32, combo: u32 },
    GameOver { score: u32, lines: u32 },
    CurrencySync { gp: u32 },
}

impl From<LoggedAction> for ActionLogDetail {
    fn from(value: LoggedAction) -> Self {
        match value {
            LoggedAction::Spawn { kind } => Self::Spawn { kind: kind.into() },
            LoggedAction::Move { dir } => Self::Move { dir },
            LoggedAction::SoftDrop => Self::SoftDrop,
            LoggedAction::HardDrop { falls } => Self::HardDrop { falls },
            LoggedAction::Rotate { rotation } => Self::Rotate { rotation },
            LoggedAction::TickDrop { moved } => Self::TickDrop { moved },
            LoggedAction::Clear { count, combo } => Self::Clear { count, combo },
            LoggedAction::GameOver { score, lines } => Self::GameOver { score, lines },
            LoggedAction::CurrencySync { gp } => Self::CurrencySync { gp },
        }
    }
}

impl From<&ActionRecord> for ActionLogEntry {
    fn from(value: &ActionRecord) -> Self {
        Self {
            seq: value.seq,
            action: value.action.into(),
        }
    }
}

// ============== Message Parsing ==============

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // Unknown message type is not a hard parse error for the protocol.
            #[derive(Debug, Deserialize)]
            struct TypeOnly {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let probe = serde_json::from_str::<TypeOnly>(json)?;
            let msg_type = probe.msg_type.as_deref().unwrap_or("unknown");
            if msg_type != "hello" && msg_type != "command" && msg_type != "control" {
                return Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: probe.seq.unwrap_or(0),
                }));
            }
            Err(e)
        }
    }
}

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Whether a client's version shares our major version
pub fn is_compatible_version(version: &str) -> bool {
    let ours = PROTOCOL_VERSION.split('.').next().unwrap_or_default();
    version.trim().split('.').next() == Some(ours)
}

// ============== Utility Functions ==============

/// Create a hello message
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        msg_type: HelloType::Hello,
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        requested: RequestedCapabilities {
            stream_observations: true,
        },
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: u64,
    role: AssignedRole,
    controller_id: Option<u64>,
) -> WelcomeMessage {
    WelcomeMessage {
        msg_type: WelcomeType::Welcome,
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: "hexon-tetris".to_string(),
        capabilities: ServerCapabilities {
            formats: [CapabilityFormat::Json],
            command_modes: [CapabilityCommandMode::Action, CapabilityCommandMode::Sync],
            actions: [
                GameAction::MoveLeft,
                GameAction::MoveRight,
                GameAction::SoftDrop,
                GameAction::HardDrop,
                GameAction::Rotate,
                GameAction::Tick,
                GameAction::Restart,
            ]
            .iter()
            .map(|a| a.as_str().to_string())
            .collect(),
            features: vec![
                CapabilityFeature::Next,
                CapabilityFeature::LastEvent,
                CapabilityFeature::StateHash,
                CapabilityFeature::Score,
                CapabilityFeature::Gp,
                CapabilityFeature::SessionReport,
            ],
        },
    }
}

/// Create an acknowledgment for the command with sequence `seq`
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        msg_type: AckType::Ack,
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        msg_type: ErrorType::Error,
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Wrap an engine session report for the wire
pub fn create_session_report(
    seq: u64,
    episode_id: u32,
    report: &SessionReport,
) -> SessionReportMessage {
    SessionReportMessage {
        msg_type: SessionReportType::SessionReport,
        seq,
        ts: current_timestamp_ms(),
        session_id: report.session_id.to_string(),
        episode_id,
        score: report.score,
        lines: report.lines,
        level: report.level,
        gp_earned: report.gp_earned,
        action_log: report.action_log.iter().map(ActionLogEntry::from).collect(),
    }
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
