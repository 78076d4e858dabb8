//! Game state module - the board and piece engine
//!
//! `GameState` owns the board, the active piece, the piece queue and every
//! progression counter. All operations are synchronous and run to completion;
//! the host calls `tick()` on its own timer, no more often than
//! `drop_interval_ms()`.
//!
//! Illegal commands (moving into a wall, rotating into an obstruction, any
//! command after game over) are silent no-ops reported through `bool` returns.
//! Game over is entered only when a spawn collides.

use tracing::{debug, info};

use crate::action_log::{ActionLog, LoggedAction};
use crate::board::Board;
use crate::config::{ConfigError, EngineConfig};
use crate::pieces::{absolute_cells, get_shape, spawn_x, try_rotate};
use crate::rng::PieceQueue;
use crate::scoring::{
    clear_gp_reward, hard_drop_reward, levels_up, line_clear_score, next_drop_interval,
    soft_drop_reward,
};
use crate::session::{SessionId, SessionReport};
use crate::snapshot::{ActiveSnapshot, GameSnapshot};
use crate::types::{
    CoreLastEvent, GameAction, PieceKind, REPORT_LOG_TAIL, SPAWN_Y, START_LEVEL,
};

/// Active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tetromino {
    pub kind: PieceKind,
    /// Index into the kind's rotation states
    pub rotation: u8,
    pub x: i8,
    pub y: i8,
}

impl Tetromino {
    /// Create a new tetromino at the spawn anchor for a board of `cols` columns
    pub fn new(kind: PieceKind, cols: u8) -> Self {
        Self {
            kind,
            rotation: 0,
            x: spawn_x(cols),
            y: SPAWN_Y,
        }
    }

    /// Get the shape (mino offsets) for current rotation
    pub fn shape(&self) -> [(i8, i8); 4] {
        get_shape(self.kind, self.rotation)
    }

    /// Absolute board cells
    pub fn cells(&self) -> [(i8, i8); 4] {
        absolute_cells(&self.shape(), self.x, self.y)
    }

    fn shifted(&self, dx: i8, dy: i8) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
            ..*self
        }
    }
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    config: EngineConfig,
    board: Board,
    active: Option<Tetromino>,
    /// Preview of the upcoming kind (display-only unless `commit_preview`)
    next: Option<PieceKind>,
    piece_queue: PieceQueue,
    seed: u32,
    /// Monotonic episode id (increments on restart).
    episode_id: u32,
    /// Successful spawns in this episode.
    piece_id: u32,
    /// Last lock event (consumed by observers).
    last_event: Option<CoreLastEvent>,
    action_log: ActionLog,
    score: u32,
    /// Currency balance; overwritten by `sync_gp`
    gp: u32,
    /// Currency earned by play since the last reset
    gp_earned: u32,
    level: u32,
    lines: u32,
    combo: u32,
    drop_interval_ms: u32,
    playing: bool,
    game_over: bool,
    started: bool,
}

impl GameState {
    /// Create a new game with the default configuration
    pub fn new(seed: u32) -> Self {
        Self::build(EngineConfig::default(), seed)
    }

    /// Create a new game with a validated configuration
    pub fn with_config(config: EngineConfig, seed: u32) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, seed))
    }

    fn build(config: EngineConfig, seed: u32) -> Self {
        let piece_queue = PieceQueue::new(seed, config.randomizer);
        let mut state = Self {
            board: Board::new(config.rows, config.cols),
            config,
            active: None,
            next: None,
            piece_queue,
            seed,
            episode_id: 0,
            piece_id: 0,
            last_event: None,
            action_log: ActionLog::new(),
            score: 0,
            gp: 0,
            gp_earned: 0,
            level: START_LEVEL,
            lines: 0,
            combo: 0,
            drop_interval_ms: 0,
            playing: false,
            game_over: false,
            started: false,
        };
        state.reset();
        state
    }

    /// Allocate an empty `rows x cols` board and reset progression.
    ///
    /// Does not spawn. The currency balance survives; per-game earnings do not.
    /// Dimensions go through the same validation as `with_config`; on error the
    /// current game is left untouched.
    pub fn initialize(&mut self, rows: u8, cols: u8) -> Result<(), ConfigError> {
        let config = EngineConfig {
            rows,
            cols,
            ..self.config.clone()
        };
        config.validate()?;
        self.config = config;
        self.reset();
        Ok(())
    }

    /// Empty the board at the current dimensions and reset progression
    pub fn reset(&mut self) {
        self.board = Board::new(self.config.rows, self.config.cols);
        self.active = None;
        self.next = None;
        self.piece_id = 0;
        self.last_event = None;
        self.action_log.clear();
        self.score = 0;
        self.gp_earned = 0;
        self.level = START_LEVEL;
        self.lines = 0;
        self.combo = 0;
        self.drop_interval_ms = self.config.initial_drop_ms;
        self.playing = false;
        self.game_over = false;
        self.started = false;
    }

    /// Spawn the first piece if the game has not started yet
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.spawn();
    }

    pub fn started(&self) -> bool {
        self.started
    }

    /// Reset, bump the episode and spawn a fresh piece
    pub fn restart(&mut self) {
        self.reset();
        self.episode_id = self.episode_id.wrapping_add(1);
        self.started = true;
        self.spawn();
        debug!(episode = self.episode_id, "game restarted");
    }

    /// Spawn a new piece (random kind, or the preview when `commit_preview` is set)
    ///
    /// Returns false, and enters game over, when the spawn position collides.
    pub fn spawn(&mut self) -> bool {
        let kind = match self.next.take() {
            Some(preview) if self.config.commit_preview => preview,
            _ => self.piece_queue.draw(),
        };
        self.spawn_kind(kind)
    }

    /// Spawn a specific kind at the spawn anchor
    pub fn spawn_kind(&mut self, kind: PieceKind) -> bool {
        let piece = Tetromino::new(kind, self.board.width());
        self.next = Some(self.piece_queue.draw());
        self.action_log.push(LoggedAction::Spawn { kind });

        if self.board.collision(&piece.cells()) {
            self.enter_game_over();
            return false;
        }

        self.active = Some(piece);
        self.piece_id = self.piece_id.wrapping_add(1);
        self.playing = true;
        true
    }

    fn enter_game_over(&mut self) {
        self.active = None;
        self.playing = false;
        self.game_over = true;
        self.action_log.push(LoggedAction::GameOver {
            score: self.score,
            lines: self.lines,
        });
        info!(
            score = self.score,
            lines = self.lines,
            level = self.level,
            "game over"
        );
    }

    /// True if any cell collides with a wall, the floor, or a locked cell
    pub fn collision(&self, cells: &[(i8, i8)]) -> bool {
        self.board.collision(cells)
    }

    fn can_accept_commands(&self) -> bool {
        self.playing && !self.game_over && self.active.is_some()
    }

    fn try_shift(&mut self, dx: i8, dy: i8) -> bool {
        if !self.can_accept_commands() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let candidate = active.shifted(dx, dy);
        if self.board.collision(&candidate.cells()) {
            return false;
        }
        self.active = Some(candidate);
        true
    }

    /// Shift the piece one column (`dir` is -1 or +1)
    pub fn move_horizontal(&mut self, dir: i8) -> bool {
        let dir = dir.signum();
        if dir == 0 {
            return false;
        }
        let moved = self.try_shift(dir, 0);
        if moved {
            self.action_log.push(LoggedAction::Move { dir });
        }
        moved
    }

    /// Move the piece down one row; false means it has landed
    pub fn step_down(&mut self) -> bool {
        self.try_shift(0, 1)
    }

    /// One step down with a small reward; a failed step does nothing (never locks)
    pub fn soft_drop(&mut self) -> bool {
        if !self.step_down() {
            return false;
        }
        let reward = soft_drop_reward();
        self.add_score(reward);
        self.add_gp(reward);
        self.action_log.push(LoggedAction::SoftDrop);
        true
    }

    /// Drop to the lowest free row and lock; returns the rows fallen
    pub fn hard_drop(&mut self) -> u32 {
        if !self.can_accept_commands() {
            return 0;
        }
        let mut falls = 0u32;
        while self.step_down() {
            falls += 1;
        }
        let reward = hard_drop_reward(falls);
        self.add_score(reward);
        self.add_gp(reward);
        self.action_log.push(LoggedAction::HardDrop { falls });
        self.lock();
        falls
    }

    /// Advance the rotation state, trying kicks in order
    pub fn rotate(&mut self) -> bool {
        if !self.can_accept_commands() {
            return false;
        }
        let Some(active) = self.active else {
            return false;
        };
        let board = &self.board;
        let Some((rotation, (dx, dy))) =
            try_rotate(active.kind, active.rotation, active.x, active.y, |cells| {
                !board.collision(cells)
            })
        else {
            return false;
        };

        self.active = Some(Tetromino {
            rotation,
            x: active.x + dx,
            y: active.y + dy,
            ..active
        });
        self.action_log.push(LoggedAction::Rotate { rotation });
        true
    }

    /// Write the active piece into the board, clear full rows, then spawn
    pub fn lock(&mut self) {
        let Some(active) = self.active.take() else {
            return;
        };

        let cells_locked = self.board.lock_cells(&active.cells(), active.kind);
        let full = self.board.full_rows();

        let mut event = CoreLastEvent {
            cells_locked,
            combo: self.combo,
            ..CoreLastEvent::default()
        };

        if full.is_empty() {
            self.combo = 0;
            event.combo = 0;
        } else {
            let count = self.board.clear_rows(&full);
            let points = line_clear_score(count, self.level);
            self.add_score(points);
            self.lines = self.lines.saturating_add(count as u32);
            self.combo = self.combo.saturating_add(1);
            let gp = clear_gp_reward(count, self.combo);
            self.add_gp(gp);
            self.action_log.push(LoggedAction::Clear {
                count: count as u32,
                combo: self.combo,
            });
            debug!(count, combo = self.combo, points, gp, "lines cleared");

            if levels_up(self.lines) {
                self.level += 1;
                self.drop_interval_ms =
                    next_drop_interval(self.drop_interval_ms, self.config.drop_floor_ms);
                event.level_up = true;
                debug!(
                    level = self.level,
                    drop_interval_ms = self.drop_interval_ms,
                    "level up"
                );
            }

            event.lines_cleared = count as u32;
            event.line_clear_score = points;
            event.gp_awarded = gp;
            event.combo = self.combo;
        }

        debug!(kind = active.kind.as_str(), cells_locked, "piece locked");

        self.spawn();
        event.game_over = self.game_over;
        self.last_event = Some(event);
    }

    /// Automatic gravity step: descend, or lock when landed
    ///
    /// Returns true when the tick locked the piece.
    pub fn tick(&mut self) -> bool {
        if !self.can_accept_commands() {
            return false;
        }
        let moved = self.step_down();
        self.action_log.push(LoggedAction::TickDrop { moved });
        if !moved {
            self.lock();
        }
        !moved
    }

    /// Apply a logical command; returns whether anything changed
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::MoveLeft => self.move_horizontal(-1),
            GameAction::MoveRight => self.move_horizontal(1),
            GameAction::SoftDrop => self.soft_drop(),
            GameAction::HardDrop => {
                if !self.can_accept_commands() {
                    return false;
                }
                self.hard_drop();
                true
            }
            GameAction::Rotate => self.rotate(),
            GameAction::Tick => {
                if !self.can_accept_commands() {
                    return false;
                }
                self.tick();
                true
            }
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Overwrite the currency balance with the remote service's value
    pub fn sync_gp(&mut self, gp: u32) {
        self.gp = gp;
        self.action_log.push(LoggedAction::CurrencySync { gp });
        debug!(gp, "currency synced");
    }

    fn add_score(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    fn add_gp(&mut self, gp: u32) {
        self.gp = self.gp.saturating_add(gp);
        self.gp_earned = self.gp_earned.saturating_add(gp);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Direct board access (scenario setup in tests and tools)
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    pub fn active(&self) -> Option<Tetromino> {
        self.active
    }

    pub fn active_cells(&self) -> Option<[(i8, i8); 4]> {
        self.active.map(|p| p.cells())
    }

    pub fn next_piece(&self) -> Option<PieceKind> {
        self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn gp(&self) -> u32 {
        self.gp
    }

    pub fn gp_earned(&self) -> u32 {
        self.gp_earned
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn drop_interval_ms(&self) -> u32 {
        self.drop_interval_ms
    }

    pub fn playing(&self) -> bool {
        self.playing
    }

    pub fn game_over(&self) -> bool {
        self.game_over
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn piece_id(&self) -> u32 {
        self.piece_id
    }

    /// Seed the game was created with
    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }

    /// Take and clear the last lock event.
    pub fn take_last_event(&mut self) -> Option<CoreLastEvent> {
        self.last_event.take()
    }

    /// Fill a reusable snapshot in place
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.rows = self.board.height();
        out.cols = self.board.width();
        self.board.write_u8_grid(&mut out.board);
        out.active = self.active.map(|p| ActiveSnapshot {
            kind: p.kind,
            rotation: p.rotation,
            x: p.x,
            y: p.y,
            cells: p.cells(),
        });
        out.next = self.next;
        out.score = self.score;
        out.gp = self.gp;
        out.level = self.level;
        out.lines = self.lines;
        out.combo = self.combo;
        out.drop_interval_ms = self.drop_interval_ms;
        out.playing = self.playing;
        out.game_over = self.game_over;
        out.episode_id = self.episode_id;
        out.piece_id = self.piece_id;
        out.seed = self.seed;
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut snap = GameSnapshot::default();
        self.snapshot_into(&mut snap);
        snap
    }

    /// Build the end-of-game payload for the remote scoring service
    pub fn session_report(&self, session_id: &SessionId) -> SessionReport {
        SessionReport {
            session_id: session_id.clone(),
            score: self.score,
            lines: self.lines,
            level: self.level,
            gp_earned: self.gp_earned,
            action_log: self.action_log.tail(REPORT_LOG_TAIL),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(seed: u32) -> GameState {
        let mut gs = GameState::new(seed);
        gs.start();
        gs
    }

    #[test]
    fn test_new_game_is_idle() {
        let gs = GameState::new(1);
        assert!(gs.active().is_none());
        assert!(!gs.playing());
        assert!(!gs.game_over());
        assert_eq!(gs.level(), 1);
        assert_eq!(gs.drop_interval_ms(), 1000);
    }

    #[test]
    fn test_start_spawns_once() {
        let mut gs = started(1);
        assert!(gs.active().is_some());
        assert!(gs.playing());
        assert_eq!(gs.piece_id(), 1);
        gs.start();
        assert_eq!(gs.piece_id(), 1);
    }

    #[test]
    fn test_spawn_anchor() {
        let mut gs = GameState::new(1);
        assert!(gs.spawn_kind(PieceKind::T));
        let active = gs.active().unwrap();
        assert_eq!((active.x, active.y, active.rotation), (3, -1, 0));
    }

    #[test]
    fn test_move_into_wall_is_noop() {
        let mut gs = GameState::new(1);
        gs.spawn_kind(PieceKind::O);
        let mut moves = 0;
        while gs.move_horizontal(-1) {
            moves += 1;
        }
        // O occupies columns x+1..=x+2, so from x=3 it can go to x=-1.
        assert_eq!(moves, 4);
        let before = gs.active();
        assert!(!gs.move_horizontal(-1));
        assert_eq!(gs.active(), before);
    }

    #[test]
    fn test_soft_drop_rewards_and_never_locks() {
        let mut gs = GameState::new(1);
        gs.spawn_kind(PieceKind::O);
        assert!(gs.soft_drop());
        assert_eq!(gs.score(), 1);
        assert_eq!(gs.gp(), 1);

        while gs.soft_drop() {}
        let score = gs.score();
        assert!(!gs.soft_drop());
        assert_eq!(gs.score(), score);
        assert_eq!(gs.board().filled_count(), 0);
        assert_eq!(gs.piece_id(), 1);
    }

    #[test]
    fn test_tick_locks_when_landed() {
        let mut gs = GameState::new(1);
        gs.spawn_kind(PieceKind::O);
        let mut locks = 0;
        for _ in 0..25 {
            if gs.tick() {
                locks += 1;
                break;
            }
        }
        assert_eq!(locks, 1);
        assert_eq!(gs.board().filled_count(), 4);
        assert_eq!(gs.piece_id(), 2);
        let event = gs.take_last_event().unwrap();
        assert_eq!(event.cells_locked, 4);
        assert_eq!(event.lines_cleared, 0);
        assert!(gs.take_last_event().is_none());
    }

    #[test]
    fn test_commands_ignored_after_game_over() {
        let mut gs = GameState::new(1);
        for x in 0..10 {
            gs.board_mut().set(x, 0, Some(PieceKind::Z));
        }
        assert!(!gs.spawn());
        assert!(gs.game_over());
        assert!(!gs.apply_action(GameAction::MoveLeft));
        assert!(!gs.apply_action(GameAction::HardDrop));
        assert!(!gs.apply_action(GameAction::Tick));
        assert!(!gs.apply_action(GameAction::Rotate));
        assert!(gs.apply_action(GameAction::Restart));
        assert!(!gs.game_over());
        assert!(gs.playing());
        assert_eq!(gs.episode_id(), 1);
    }

    #[test]
    fn test_sync_gp_overwrites_balance_only() {
        let mut gs = GameState::new(1);
        gs.spawn_kind(PieceKind::I);
        gs.soft_drop();
        gs.sync_gp(500);
        assert_eq!(gs.gp(), 500);
        assert_eq!(gs.gp_earned(), 1);
        assert_eq!(
            gs.action_log().last().map(|r| r.action),
            Some(LoggedAction::CurrencySync { gp: 500 })
        );
    }

    #[test]
    fn test_initialize_changes_dimensions() {
        let mut gs = started(3);
        gs.initialize(24, 14).unwrap();
        assert_eq!((gs.board().height(), gs.board().width()), (24, 14));
        assert!(gs.active().is_none());
        gs.spawn_kind(PieceKind::T);
        assert_eq!(gs.active().unwrap().x, 5);
        gs.reset();
        assert_eq!(gs.board().width(), 14);
    }

    #[test]
    fn test_initialize_rejects_invalid_dimensions() {
        let mut gs = started(3);
        gs.hard_drop();
        let score = gs.score();

        assert!(matches!(
            gs.initialize(20, 2),
            Err(ConfigError::TooNarrow { cols: 2, .. })
        ));
        assert_eq!(gs.initialize(0, 10), Err(ConfigError::TooShort(0)));
        assert_eq!(gs.initialize(20, 200), Err(ConfigError::TooLarge(200)));

        // The running game is untouched.
        assert_eq!((gs.board().height(), gs.board().width()), (20, 10));
        assert_eq!(gs.score(), score);
        assert!(gs.active().is_some());
    }

    #[test]
    fn test_snapshot_reflects_state() {
        let gs = started(9);
        let snap = gs.snapshot();
        assert_eq!(snap.rows, 20);
        assert_eq!(snap.cols, 10);
        assert_eq!(snap.board.len(), 20);
        assert!(snap.board.iter().all(|row| row.len() == 10));
        assert_eq!(snap.active.map(|a| a.cells), gs.active_cells());
        assert_eq!(snap.next, gs.next_piece());
        assert!(snap.playing);
    }
}
