//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! Lets an external controller drive the engine and lets observers watch it.
//! Network tasks never mutate game state: they enqueue commands that the
//! game loop applies serially, and the loop pushes results back out.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7777)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends a state observation after every applied command
//! 5. **Commanding**: Controller sends commands to execute game actions
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: `mode: "action"` with up to 32 actions, or `mode: "sync"` with a `gp` balance
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with role and capabilities
//! - **observation**: Full game state (board, active piece, score, gp, ...) plus `state_hash`
//! - **ack**: Command acknowledgment
//! - **error**: Error response with code and message
//! - **session_report**: End-of-game payload, sent once per game over
//!
//! # Environment Variables
//!
//! - `HEXON_HOST`: Bind address (default: "127.0.0.1")
//! - `HEXON_PORT`: Port number (default: 7777)
//! - `HEXON_MAX_PENDING`: Command queue depth (default: 10)
//! - `HEXON_ADAPTER_DISABLED`: Set to "1" or "true" to disable adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1234567890,"client":{"name":"bot","version":"1.0.0"},"protocol_version":"1.0.0","requested":{"stream_observations":true}}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1234567890,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1234567891,"board":{...},"active":{...},...}
//! Client -> Server: {"type":"command","seq":2,"ts":1234567892,"mode":"action","actions":["moveLeft","rotate","hardDrop"]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1234567892,"status":"ok"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use hexon_tetris_core as core;
pub use hexon_tetris_types as types;

// Re-export protocol types for convenience
pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{build_observation, map_command, run_server, ServerConfig};
