//! End-to-end scenarios for the idle farm session.
//!
//! Each test drives a [`GameSession`] through its public command surface
//! with explicit timestamps, the same way a front end or the runner would.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use idlefarm_core::command::Command;
use idlefarm_core::config::GameConfig;
use idlefarm_core::session::GameSession;
use idlefarm_types::{FarmDimensions, PlotState, Timestamp, UpgradeType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn session_with_money(money: Decimal) -> GameSession {
    let mut config = GameConfig::default();
    config.economy.starting_money = money;
    GameSession::new(&config, Timestamp(0)).unwrap()
}

fn assert_plot_invariants(session: &GameSession) {
    for plot in session.plots() {
        let occupied = plot.state != PlotState::Empty;
        assert_eq!(plot.planted_at.is_some(), occupied, "plot {}", plot.coord);
        assert_eq!(plot.crop_index.is_some(), occupied, "plot {}", plot.coord);
        assert!(session.crop_catalog().get(plot.last_crop_index).is_some());
    }
    let dims = session.farm_dimensions();
    assert_eq!(
        u32::try_from(session.plots().len()).unwrap(),
        dims.plot_count().unwrap()
    );
}

#[test]
fn wheat_scenario() {
    let mut s = session_with_money(dec!(20));
    assert!(s.plant_at(0, 0, 0, Timestamp(0)).unwrap());

    s.tick(Timestamp(14_999)).unwrap();
    assert_eq!(s.plot(0, 0).unwrap().state, PlotState::Growing);

    s.tick(Timestamp(15_000)).unwrap();
    assert_eq!(s.plot(0, 0).unwrap().state, PlotState::Ready);

    assert_eq!(s.harvest_at(0, 0, Timestamp(15_000)).unwrap(), dec!(10));
    assert_eq!(s.money(), dec!(28));
}

#[test]
fn update_is_idempotent_once_ready() {
    let mut s = session_with_money(dec!(20));
    s.plant_at(2, 2, 0, Timestamp(100)).unwrap();
    s.tick(Timestamp(15_100)).unwrap();
    let ready = s.plot(2, 2).unwrap();
    assert_eq!(ready.state, PlotState::Ready);

    for t in [15_200, 40_000, 1_000_000] {
        s.tick(Timestamp(t)).unwrap();
        assert_eq!(s.plot(2, 2).unwrap(), ready);
    }
    assert_eq!(s.harvest_at(2, 2, Timestamp(1_000_000)).unwrap(), dec!(10));
}

#[test]
fn unaffordable_purchase_is_noop() {
    let mut s = session_with_money(dec!(50));
    assert!(!s.purchase_upgrade(UpgradeType::Planter).unwrap());
    assert_eq!(s.money(), dec!(50));
    assert_eq!(s.upgrade_state().get(UpgradeType::Planter).unwrap().level, 0);
}

#[test]
fn costs_strictly_increase_by_factor() {
    let mut s = session_with_money(dec!(1_000_000_000));
    for upgrade in UpgradeType::ALL.into_iter().filter(|u| !u.is_unlock()) {
        for _ in 0..6 {
            let before = s.upgrade_state().get(upgrade).cloned().unwrap();
            assert!(before.growth_factor > Decimal::ONE);
            assert!(s.purchase_upgrade(upgrade).unwrap());
            let after = s.upgrade_state().get(upgrade).cloned().unwrap();
            assert!(after.cost > before.cost);
            assert_eq!(
                after.cost,
                before.cost.checked_mul(before.growth_factor).unwrap().floor()
            );
        }
    }
}

#[test]
fn property_purchase_expands_and_preserves() {
    let mut s = session_with_money(dec!(104));
    assert!(s.plant_at(0, 0, 0, Timestamp(0)).unwrap());
    assert!(s.plant_at(2, 2, 0, Timestamp(10)).unwrap());
    assert_eq!(s.money(), dec!(100));

    assert!(s.purchase_upgrade(UpgradeType::Property).unwrap());
    assert_eq!(s.money(), Decimal::ZERO);
    assert_eq!(s.farm_dimensions(), FarmDimensions { width: 4, height: 3 });

    assert_eq!(s.plot(0, 0).unwrap().planted_at, Some(Timestamp(0)));
    assert_eq!(s.plot(2, 2).unwrap().planted_at, Some(Timestamp(10)));
    for y in 0..3 {
        assert_eq!(s.plot(3, y).unwrap().state, PlotState::Empty);
    }
    assert_plot_invariants(&s);
}

#[test]
fn harvest_all_conserves_payouts() {
    let mut s = session_with_money(dec!(500));
    assert!(s.unlock_crop(1).unwrap());
    // Mix of wheat and carrots, one plot left empty.
    for (x, y, crop) in [(0, 0, 0), (1, 0, 1), (2, 0, 0), (0, 1, 1), (1, 1, 1)] {
        assert!(s.plant_at(x, y, crop, Timestamp(0)).unwrap());
    }
    s.tick(Timestamp(15_000)).unwrap();

    let mut individual = s.clone();
    let mut expected = Decimal::ZERO;
    for plot in individual.plots() {
        if plot.state == PlotState::Ready {
            let payout = individual
                .harvest_at(plot.coord.x, plot.coord.y, Timestamp(15_000))
                .unwrap();
            expected = expected.checked_add(payout).unwrap();
        }
    }

    let total = s.harvest_all(Timestamp(15_000)).unwrap();
    assert_eq!(total, expected);
    assert_eq!(total, dec!(95));
    assert_eq!(s.money(), individual.money());
    assert!(s.plots().iter().all(|p| p.state != PlotState::Ready));
}

#[test]
fn auto_plant_scenario() {
    let mut s = session_with_money(dec!(402));
    assert!(s.purchase_upgrade(UpgradeType::AutoPlant).unwrap());
    assert_eq!(s.money(), dec!(2));
    for plot in s.plots() {
        if plot.coord.y > 0 || plot.coord.x > 1 {
            s.set_auto_plant(plot.coord.x, plot.coord.y, false).unwrap();
        }
    }

    let early = s.tick(Timestamp(1_499)).unwrap();
    assert!(!early.auto_plant_fired);

    // Row-major order: (0,0) takes the last of the money.
    let sweep = s.tick(Timestamp(1_500)).unwrap();
    assert!(sweep.auto_plant_fired);
    assert_eq!(sweep.auto_planted, 1);
    assert_eq!(s.money(), Decimal::ZERO);
    assert_eq!(s.plot(0, 0).unwrap().state, PlotState::Growing);
    assert_eq!(s.plot(1, 0).unwrap().state, PlotState::Empty);
    assert_eq!(s.plot(2, 0).unwrap().state, PlotState::Empty);

    assert!(!s.tick(Timestamp(2_999)).unwrap().auto_plant_fired);
    let broke = s.tick(Timestamp(3_000)).unwrap();
    assert!(broke.auto_plant_fired);
    assert_eq!(broke.auto_planted, 0);
}

#[test]
fn auto_harvest_feeds_auto_plant() {
    let mut s = session_with_money(dec!(700));
    assert!(s.purchase_upgrade(UpgradeType::AutoHarvest).unwrap());
    assert!(s.purchase_upgrade(UpgradeType::AutoPlant).unwrap());
    assert_eq!(s.money(), dec!(50));

    // First auto-plant sweep fills the farm.
    let planted = s.tick(Timestamp(1_500)).unwrap();
    assert_eq!(planted.auto_planted, 9);
    assert_eq!(s.money(), dec!(32));

    // Ripen, harvest, replant, all on automation.
    let mut harvested: u32 = 0;
    for t in (1_750..=40_000).step_by(250) {
        let summary = s.tick(Timestamp(t)).unwrap();
        harvested = harvested.checked_add(summary.auto_harvested).unwrap();
    }
    assert!(harvested >= 18);
    assert!(s.money() > dec!(32));
    assert!(s.audit().is_balanced());
    assert_plot_invariants(&s);
}

#[test]
fn queued_crop_replants_after_harvest() {
    let mut s = session_with_money(dec!(160));
    assert!(s.unlock_crop(1).unwrap());
    assert!(s.plant_at(0, 0, 0, Timestamp(0)).unwrap());
    s.queue_crop_change(0, 0, 1).unwrap();

    s.tick(Timestamp(15_000)).unwrap();
    assert_eq!(s.harvest_at(0, 0, Timestamp(15_000)).unwrap(), dec!(10));

    let plot = s.plot(0, 0).unwrap();
    assert_eq!(plot.state, PlotState::Growing);
    assert_eq!(plot.crop_name.as_deref(), Some("Carrot"));
    assert_eq!(plot.last_crop_index, 1);
    assert_eq!(plot.queued_crop_index, None);
}

#[test]
fn growth_upgrades_shorten_cycle() {
    let mut s = session_with_money(dec!(1_000));
    assert!(s.purchase_upgrade(UpgradeType::Fertilizer).unwrap());
    assert_eq!(s.upgrade_state().effective_growth_time_ms, dec!(12750));

    assert!(s.plant_at(0, 0, 0, Timestamp(0)).unwrap());
    let half = s.growth_progress(0, 0, Timestamp(6_375)).unwrap();
    assert!(half > 0.499_999 && half < 0.500_001);
    s.tick(Timestamp(12_750)).unwrap();
    assert_eq!(s.plot(0, 0).unwrap().state, PlotState::Ready);
}

#[test]
fn ledger_stays_balanced_under_random_commands() {
    let mut rng = StdRng::seed_from_u64(0x1d1e_fa53);
    let mut s = session_with_money(dec!(300));
    let mut now: u64 = 0;

    for _ in 0..2_000 {
        now = now.checked_add(rng.random_range(0..2_000)).unwrap();
        let dims = s.farm_dimensions();
        // Occasionally aim one past the edge to exercise input errors.
        let x = rng.random_range(0..=dims.width);
        let y = rng.random_range(0..=dims.height);
        let crop_index = rng.random_range(0..6);
        let command = match rng.random_range(0..9) {
            0 => Command::PlantAt { x, y, crop_index },
            1 => Command::HarvestAt { x, y },
            2 => Command::HarvestAll,
            3 => Command::ReplantAll,
            4 => Command::PurchaseUpgrade {
                upgrade: UpgradeType::ALL[rng.random_range(0..UpgradeType::ALL.len())],
            },
            5 => Command::UnlockCrop { crop_index },
            6 => Command::SetAutoPlant {
                x,
                y,
                enabled: rng.random_bool(0.7),
            },
            7 => Command::QueueCropChange { x, y, crop_index },
            _ => Command::SetAutoHarvestEnabled {
                enabled: rng.random_bool(0.8),
            },
        };

        let money_before = s.money();
        let result = s.apply(command, Timestamp(now));
        if result.is_err() {
            assert_eq!(s.money(), money_before, "{command:?} failed but moved money");
        }
        s.tick(Timestamp(now)).unwrap();

        assert!(s.money() >= Decimal::ZERO);
        assert!(s.audit().is_balanced());
    }
    assert_plot_invariants(&s);
}

#[test]
fn config_yaml_drives_session() {
    let yaml = r"
farm:
  width: 2
  height: 2
economy:
  starting_money: 10
crops:
  - name: Rye
    base_value: 4
    plant_cost: 1
    unlocked: true
pacing:
  base_growth_time_ms: 1000
";
    let config = GameConfig::parse(yaml).unwrap();
    let mut s = GameSession::new(&config, Timestamp(0)).unwrap();
    assert_eq!(s.farm_dimensions(), FarmDimensions { width: 2, height: 2 });
    assert_eq!(s.replant_all_with_last_crop(Timestamp(0)).unwrap(), 4);
    s.tick(Timestamp(1_000)).unwrap();
    assert_eq!(s.harvest_all(Timestamp(1_000)).unwrap(), dec!(16));
    assert_eq!(s.money(), dec!(22));
}
