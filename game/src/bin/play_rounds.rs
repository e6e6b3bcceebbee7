use std::sync::Arc;

use clap::Parser;
use database::{in_memory_session_store, MemoryHistoryStore};
use game::GameService;

/// Plays rounds against throwaway in-memory stores and prints the session tally.
#[derive(Parser, Debug)]
struct Params {
    #[arg(short, long, default_value_t = 10)]
    rounds: usize,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Params::parse();
    log::info!("args: {args:?}");

    let sessions = in_memory_session_store().await?;
    let service = GameService::new(sessions, Arc::new(MemoryHistoryStore::new()));

    for _ in 0..args.rounds {
        service.start_game().await?;
        let outcome = service.roll_dice().await?;
        log::debug!("{outcome}");
    }

    service.flush_history().await;
    let snapshot = service.stats().await?;
    log::info!(
        "{} games: player {} computer {} ties {} ({}% player wins)",
        snapshot.stats.total_games,
        snapshot.stats.player_wins,
        snapshot.stats.computer_wins,
        snapshot.stats.ties,
        snapshot.player_win_rate
    );
    for record in service.history().await? {
        log::info!("{record:?}");
    }

    service.shutdown().await;
    Ok(())
}
