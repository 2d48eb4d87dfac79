//! Timer-driven tick runner.
//!
//! Ticks run back to back on a `tokio` interval. Each tick is synchronous,
//! so two ticks never overlap; a late tick delays the following ones.
use std::future::Future;
use std::time::Duration;
use tokio::time::{MissedTickBehavior, interval};

use crate::game_loop::{GameLoop, TickReport};
use crate::{CatalogSource, CatchLedger, PlayerHooks};

fn tick_interval<S, L, H>(game: &GameLoop<S, L, H>) -> tokio::time::Interval
where
    S: CatalogSource,
    L: CatchLedger,
    H: PlayerHooks,
{
    let mut timer = interval(Duration::from_millis(game.config().tick_interval_ms.max(1)));
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    timer
}

/// Run exactly `ticks` ticks, one per interval, and return their reports.
pub async fn run_for<S, L, H>(game: &mut GameLoop<S, L, H>, ticks: u64) -> Vec<TickReport>
where
    S: CatalogSource,
    L: CatchLedger,
    H: PlayerHooks,
{
    drive(game, ticks, |_| {}).await
}

/// Like [`run_for`], but hands the loop to `before_tick` once the timer
/// fires and before each tick runs, so callers can queue casts or claim
/// catches between ticks.
pub async fn drive<S, L, H, F>(
    game: &mut GameLoop<S, L, H>,
    ticks: u64,
    mut before_tick: F,
) -> Vec<TickReport>
where
    S: CatalogSource,
    L: CatchLedger,
    H: PlayerHooks,
    F: FnMut(&mut GameLoop<S, L, H>),
{
    let mut timer = tick_interval(game);
    let mut reports = Vec::new();
    for _ in 0..ticks {
        timer.tick().await;
        before_tick(game);
        reports.push(game.tick());
    }
    reports
}

/// Tick until `shutdown` resolves, handing every report to `on_tick`.
/// Returns the number of ticks run.
pub async fn run_until<S, L, H, F, Fut>(
    game: &mut GameLoop<S, L, H>,
    shutdown: Fut,
    mut on_tick: F,
) -> u64
where
    S: CatalogSource,
    L: CatchLedger,
    H: PlayerHooks,
    F: FnMut(&TickReport),
    Fut: Future<Output = ()>,
{
    let mut timer = tick_interval(game);
    let mut ran = 0_u64;
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;
            () = &mut shutdown => {
                log::info!("tick runner stopping after {ran} ticks");
                return ran;
            }
            _ = timer.tick() => {
                let report = game.tick();
                ran += 1;
                on_tick(&report);
            }
        }
    }
}
