#![cfg(feature = "async")]

use std::convert::Infallible;
use std::time::Duration;

use castline_game::runtime::{drive, run_for, run_until};
use castline_game::{
    CardCatalog, CatalogSource, CatchLedger, CatchRecord, CatchSummary, FishCatalog, GameLoop,
    LoopConfig, PlayerHooks, PlayerId, default_catalog,
};

struct Embedded;

impl CatalogSource for Embedded {
    type Error = castline_game::CatalogError;

    fn load_fish_catalog(&self) -> Result<FishCatalog, Self::Error> {
        FishCatalog::embedded()
    }

    fn load_card_catalog(&self) -> Result<CardCatalog, Self::Error> {
        CardCatalog::embedded()
    }
}

struct Discard;

impl CatchLedger for Discard {
    type Error = Infallible;

    fn append_history(&mut self, _record: &CatchRecord) -> Result<(), Self::Error> {
        Ok(())
    }

    fn append_unclaimed(&mut self, _record: &CatchRecord) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[derive(Default)]
struct CountResets(usize);

impl PlayerHooks for CountResets {
    type Error = Infallible;

    fn notify_catch(&mut self, _player: &PlayerId, _summary: &CatchSummary) -> Result<(), Self::Error> {
        Ok(())
    }

    fn reset_all_decks(&mut self) -> Result<(), Self::Error> {
        self.0 += 1;
        Ok(())
    }

    fn on_claim(&mut self, _player: &PlayerId, _record: &CatchRecord) -> Result<(), Self::Error> {
        Ok(())
    }
}

fn fast_loop() -> GameLoop<Embedded, Discard, CountResets> {
    let config = LoopConfig {
        tick_interval_ms: 1,
        sample_size: 200,
        ..LoopConfig::default_config().with_seed(3)
    };
    GameLoop::new(config, Embedded, Discard, CountResets::default())
}

#[test]
fn run_for_ticks_a_full_day_in_order() {
    assert!(default_catalog().is_ok());
    let mut game = fast_loop();
    let reports = tokio_test::block_on(run_for(&mut game, 24));
    let hours: Vec<u8> = reports.iter().map(|report| report.hour).collect();
    assert_eq!(hours, (0..24).collect::<Vec<u8>>());
    assert!(reports.last().is_some_and(|report| report.wrapped));
    assert_eq!(game.hooks().0, 1);
    assert_eq!(game.ticks(), 24);
}

#[tokio::test]
async fn run_until_stops_on_shutdown() {
    let mut game = fast_loop();
    let mut seen = 0_u64;
    let ran = run_until(
        &mut game,
        tokio::time::sleep(Duration::from_millis(30)),
        |_| seen += 1,
    )
    .await;
    assert_eq!(ran, seen);
    assert!(ran >= 1);
    assert_eq!(game.ticks(), ran);
}

#[test]
fn drive_lets_players_cast_between_ticks() {
    let mut game = fast_loop();
    let player = PlayerId::from("ana");
    let mut claimed = 0_usize;
    let reports = tokio_test::block_on(drive(&mut game, 6, |game| {
        if game.claim_catch(&player).is_ok() {
            claimed += 1;
        }
        game.submit_cast(&player, &[11], &[11, 4, 2]).unwrap();
    }));
    assert_eq!(reports.len(), 6);
    assert!(reports.iter().all(|report| report.catches.len() == 1));
    assert_eq!(claimed, 5);
    assert_eq!(game.desk().unclaimed().len(), 1);
}
