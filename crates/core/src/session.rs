//! Session identity and the end-of-game report
//!
//! A report is the payload a host submits to the remote scoring service once a
//! game ends. The engine only builds it; sending it is the host's business.

use std::fmt;

use crate::action_log::ActionRecord;
use crate::rng::SimpleRng;

const SESSION_ID_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Short random session identifier (6 lowercase base-36 characters)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    pub fn generate(rng: &mut SimpleRng) -> Self {
        let id = (0..SESSION_ID_LEN)
            .map(|_| BASE36[rng.next_range(BASE36.len() as u32) as usize] as char)
            .collect();
        Self(id)
    }

    pub fn from_seed(seed: u32) -> Self {
        Self::generate(&mut SimpleRng::new(seed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    pub session_id: SessionId,
    pub score: u32,
    pub lines: u32,
    pub level: u32,
    /// Currency earned this game according to the engine
    pub gp_earned: u32,
    /// Trailing slice of the action log, oldest first
    pub action_log: Vec<ActionRecord>,
}
