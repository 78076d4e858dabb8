//! Serial game-loop driver.
//!
//! `Host` is the only place the engine is mutated at runtime. Adapter commands
//! and timer ticks both arrive here, one at a time, and every change is
//! answered with outbound messages for the adapter to deliver.

use tracing::{debug, info};

use crate::adapter::{
    build_observation, create_ack, create_session_report, ClientCommand, InboundCommand,
    InboundPayload, LastEvent, ObservationMessage, OutboundMessage,
};
use crate::core::{GameState, SessionId, SimpleRng};
use crate::types::GameAction;

/// Session ids draw from their own stream, derived from the game seed
const SESSION_SEED_SALT: u32 = 0x5EED_1D00;

pub struct Host {
    game: GameState,
    session_rng: SimpleRng,
    session_id: SessionId,
    episode_id: u32,
    obs_seq: u64,
    report_seq: u64,
    drop_timer_ms: u32,
    report_sent: bool,
    last_event: Option<LastEvent>,
}

impl Host {
    /// Take ownership of a game and start it
    pub fn new(mut game: GameState) -> Self {
        game.start();
        let mut session_rng = SimpleRng::new(game.seed() ^ SESSION_SEED_SALT);
        let session_id = SessionId::generate(&mut session_rng);
        info!(session = %session_id, seed = game.seed(), "session started");
        Self {
            episode_id: game.episode_id(),
            game,
            session_rng,
            session_id,
            obs_seq: 0,
            report_seq: 0,
            drop_timer_ms: 0,
            report_sent: false,
            last_event: None,
        }
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Apply one inbound command and return the messages it produces
    pub fn handle(&mut self, cmd: InboundCommand) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        match cmd.payload {
            InboundPayload::SnapshotRequest => {
                let obs = self.observation();
                out.push(OutboundMessage::ToClientObservation {
                    client_id: cmd.client_id,
                    obs: Box::new(obs),
                });
            }
            InboundPayload::Command(ClientCommand::Actions(actions)) => {
                for action in actions {
                    self.apply(action, &mut out);
                }
                self.respond(cmd.client_id, cmd.seq, &mut out);
            }
            InboundPayload::Command(ClientCommand::SyncGp(gp)) => {
                self.game.sync_gp(gp);
                self.respond(cmd.client_id, cmd.seq, &mut out);
            }
        }
        out
    }

    /// Advance the drop timer; ticks the engine once the interval has elapsed
    pub fn on_timer(&mut self, elapsed_ms: u32) -> Vec<OutboundMessage> {
        let mut out = Vec::new();
        if !self.game.playing() {
            self.drop_timer_ms = 0;
            return out;
        }

        self.drop_timer_ms = self.drop_timer_ms.saturating_add(elapsed_ms);
        if self.drop_timer_ms < self.game.drop_interval_ms() {
            return out;
        }
        self.drop_timer_ms = 0;

        self.game.tick();
        self.capture_event();
        let obs = self.observation();
        out.push(OutboundMessage::BroadcastObservation { obs: Box::new(obs) });
        self.check_game_over(&mut out);
        out
    }

    fn apply(&mut self, action: GameAction, out: &mut Vec<OutboundMessage>) {
        let changed = self.game.apply_action(action);
        if changed && action == GameAction::Restart {
            self.last_event = None;
        }
        if changed
            && matches!(
                action,
                GameAction::HardDrop | GameAction::Tick | GameAction::Restart
            )
        {
            // New piece, fresh gravity countdown.
            self.drop_timer_ms = 0;
        }
        self.capture_event();
        // A batch may end one game and restart the next.
        self.check_game_over(out);
        self.check_episode();
    }

    fn respond(&mut self, client_id: usize, seq: u64, out: &mut Vec<OutboundMessage>) {
        out.push(OutboundMessage::ToClientAck {
            client_id,
            ack: create_ack(seq),
        });
        let obs = self.observation();
        out.push(OutboundMessage::BroadcastObservation { obs: Box::new(obs) });
        self.check_game_over(out);
    }

    fn capture_event(&mut self) {
        if let Some(event) = self.game.take_last_event() {
            self.last_event = Some(event.into());
        }
    }

    fn check_episode(&mut self) {
        if self.game.episode_id() == self.episode_id {
            return;
        }
        self.episode_id = self.game.episode_id();
        self.session_id = SessionId::generate(&mut self.session_rng);
        self.report_sent = false;
        info!(session = %self.session_id, episode = self.episode_id, "new session");
    }

    fn check_game_over(&mut self, out: &mut Vec<OutboundMessage>) {
        if !self.game.game_over() {
            self.report_sent = false;
            return;
        }
        if self.report_sent {
            return;
        }
        self.report_sent = true;

        let report = self.game.session_report(&self.session_id);
        info!(
            session = %report.session_id,
            score = report.score,
            lines = report.lines,
            level = report.level,
            gp_earned = report.gp_earned,
            "session report"
        );
        self.report_seq += 1;
        let msg = create_session_report(self.report_seq, self.game.episode_id(), &report);
        out.push(OutboundMessage::BroadcastReport {
            report: Box::new(msg),
        });
    }

    fn observation(&mut self) -> ObservationMessage {
        self.obs_seq += 1;
        debug!(seq = self.obs_seq, "observation");
        build_observation(&self.game, self.obs_seq, self.last_event.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_host_starts_game() {
        let host = Host::new(GameState::new(5));
        assert!(host.game().playing());
        assert_eq!(host.session_id().as_str().len(), 6);
    }

    #[test]
    fn test_snapshot_request_goes_to_requester() {
        let mut host = Host::new(GameState::new(5));
        let out = host.handle(InboundCommand {
            client_id: 4,
            seq: 1,
            payload: InboundPayload::SnapshotRequest,
        });
        assert_eq!(out.len(), 1);
        assert!(matches!(
            out[0],
            OutboundMessage::ToClientObservation { client_id: 4, .. }
        ));
    }

    #[test]
    fn test_timer_waits_for_interval() {
        let mut host = Host::new(GameState::new(5));
        let y = host.game().active().unwrap().y;
        assert!(host.on_timer(999).is_empty());
        let out = host.on_timer(1);
        assert_eq!(out.len(), 1);
        assert_eq!(host.game().active().unwrap().y, y + 1);
    }
}
