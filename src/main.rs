//! Hexon Tetris runner (default binary).
//!
//! Serves the JSON adapter and drives the engine from a fixed-rate loop. With
//! `HEXON_ADAPTER_DISABLED=1` it instead plays a headless demo: every piece is
//! hard-dropped until game over and the session report is logged.

use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use arrayvec::ArrayVec;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use hexon_tetris::adapter::{
    Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage,
};
use hexon_tetris::core::{EngineConfig, GameState};
use hexon_tetris::host::Host;
use hexon_tetris::types::{GameAction, TICK_MS};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::from_env()?;
    let seed = seed_from_env()?;
    info!(
        rows = config.rows,
        cols = config.cols,
        randomizer = config.randomizer.as_str(),
        seed,
        "engine configured"
    );
    let host = Host::new(GameState::with_config(config, seed)?);

    match Adapter::start_from_env()? {
        Some(adapter) => serve(adapter, host),
        None => {
            run_headless(host);
            Ok(())
        }
    }
}

fn seed_from_env() -> Result<u32> {
    match std::env::var("HEXON_SEED") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .with_context(|| format!("invalid HEXON_SEED: {raw}")),
        Err(_) => {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default()
                .subsec_nanos();
            Ok(nanos)
        }
    }
}

fn serve(mut adapter: Adapter, mut host: Host) -> Result<()> {
    let tick_duration = Duration::from_millis(TICK_MS as u64);
    let mut last_tick = Instant::now();

    loop {
        while let Some(cmd) = adapter.try_recv() {
            for msg in host.handle(cmd) {
                adapter.send(msg);
            }
        }

        let sleep_for = tick_duration.saturating_sub(last_tick.elapsed());
        if !sleep_for.is_zero() {
            thread::sleep(sleep_for);
        }

        let elapsed = last_tick.elapsed();
        last_tick = Instant::now();
        let elapsed_ms = u32::try_from(elapsed.as_millis()).unwrap_or(u32::MAX);
        for msg in host.on_timer(elapsed_ms) {
            adapter.send(msg);
        }
    }
}

fn run_headless(mut host: Host) {
    let mut seq = 0u64;
    while !host.game().game_over() {
        seq += 1;
        let mut actions = ArrayVec::new();
        actions.push(GameAction::HardDrop);
        let cmd = InboundCommand {
            client_id: 0,
            seq,
            payload: InboundPayload::Command(ClientCommand::Actions(actions)),
        };
        for msg in host.handle(cmd) {
            if let OutboundMessage::BroadcastReport { report } = msg {
                info!(
                    session = %report.session_id,
                    score = report.score,
                    lines = report.lines,
                    actions = report.action_log.len(),
                    "headless demo finished"
                );
            }
        }
        if seq > 10_000 {
            warn!("headless demo did not reach game over");
            break;
        }
    }
}
