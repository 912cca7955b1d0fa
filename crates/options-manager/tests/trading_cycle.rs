mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{harness, ist, ist_on, FailingSink, ScriptedSource};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use scalper_core::{
    AppConfig, DailyResetPolicy, Direction, ExitReason, FeedError, LifecycleEvent, SignalOrigin,
    SignalStrength,
};
use scalper_options_manager::{DenyReason, MarketState, TradingCycle};

/// Feeds 24000, 24005, 24012 at 10:00–10:02; the third cycle opens a CALL.
async fn open_call(h: &mut common::Harness) {
    for price in [dec!(24000), dec!(24005), dec!(24012)] {
        h.source.push(price);
    }
    for minute in 0..3 {
        h.cycle.run_cycle(ist(10, minute)).await.unwrap();
    }
    assert_eq!(h.cycle.ledger().open_count(), 1);
}

#[tokio::test]
async fn momentum_signal_opens_position() {
    let mut h = harness(&AppConfig::default());
    h.source.push(dec!(24000));
    h.source.push(dec!(24005));
    h.source.push(dec!(24012));

    let first = h.cycle.run_cycle(ist(10, 0)).await.unwrap();
    let second = h.cycle.run_cycle(ist(10, 1)).await.unwrap();
    assert!(first.signal.is_none());
    assert!(second.signal.is_none());

    let third = h.cycle.run_cycle(ist(10, 2)).await.unwrap();
    let signal = third.signal.unwrap();
    assert_eq!(signal.direction, Direction::Call);
    assert_eq!(signal.strength, SignalStrength::Moderate);
    assert_eq!(signal.reference_price, dec!(24012));

    // 24012 + 150 → 24150, 138 points out, premium 120 under the 123 cap
    let position = third.opened.unwrap();
    assert_eq!(position.strike, dec!(24150));
    assert_eq!(position.entry_premium, dec!(120));
    assert_eq!(position.quantity, 65);
    assert_eq!(position.investment, dec!(7800));
    assert!(third.closed.is_empty());

    let events = h.sink.events();
    assert_eq!(events.len(), 1);
    let LifecycleEvent::Opened {
        target_premium,
        stop_premium,
        ..
    } = &events[0]
    else {
        panic!("expected open event, got {:?}", events[0]);
    };
    assert_eq!(*target_premium, dec!(156));
    assert_eq!(*stop_premium, dec!(84));
}

#[tokio::test]
async fn admission_precedes_exit_and_target_books_profit() {
    let mut config = AppConfig::default();
    config.exits.target_fraction = dec!(0.20);
    let mut h = harness(&config);
    open_call(&mut h).await;

    // +48 from entry: TARGET. The same sample is also a fresh CALL signal,
    // which is evaluated first and hits the one-position cap.
    h.source.push(dec!(24060));
    let outcome = h.cycle.run_cycle(ist(10, 3)).await.unwrap();

    assert_eq!(outcome.denied, Some(DenyReason::MaxPositions));
    assert_eq!(outcome.closed.len(), 1);
    let closed = &outcome.closed[0];
    assert_eq!(closed.exit_reason, Some(ExitReason::Target));
    // 120 × 0.20 × 65
    assert_eq!(closed.realized_pnl, Some(dec!(1560)));
    assert_eq!(closed.exit_premium, Some(dec!(144)));

    let account = h.cycle.ledger().account();
    assert_eq!(account.current_capital, dec!(11560));
    assert_eq!(account.daily_pnl, dec!(1560));
    assert_eq!(h.sink.kinds(), vec!["open", "close"]);
}

#[tokio::test]
async fn position_opened_this_cycle_is_not_exit_checked() {
    let mut config = AppConfig::default();
    // Any time held at all is past the limit.
    config.exits.max_hold_minutes = 0;
    let mut h = harness(&config);

    open_call(&mut h).await;
    assert!(h.sink.kinds() == vec!["open"]);

    h.source.push(dec!(24013));
    let outcome = h.cycle.run_cycle(ist(10, 3)).await.unwrap();
    assert!(outcome.signal.is_none());
    assert_eq!(outcome.closed.len(), 1);
    assert_eq!(outcome.closed[0].exit_reason, Some(ExitReason::TimeExit));
    // residual 0.05 × 120 × 65
    assert_eq!(outcome.closed[0].realized_pnl, Some(dec!(390)));
}

#[tokio::test]
async fn stop_loss_then_loss_limit_blocks_new_trades() {
    let mut h = harness(&AppConfig::default());
    open_call(&mut h).await;

    h.source.push(dec!(23980));
    let stop = h.cycle.run_cycle(ist(10, 3)).await.unwrap();
    assert_eq!(stop.closed[0].exit_reason, Some(ExitReason::StopLoss));
    assert_eq!(stop.closed[0].realized_pnl, Some(dec!(-2340)));

    // 24012 → 23980 → 23970 is a PUT signal; -2340 is past the -1500 limit.
    h.source.push(dec!(23970));
    let blocked = h.cycle.run_cycle(ist(10, 4)).await.unwrap();
    assert_eq!(blocked.signal.map(|s| s.direction), Some(Direction::Put));
    assert_eq!(blocked.denied, Some(DenyReason::LossLimit));
    assert!(blocked.opened.is_none());
    assert_eq!(h.cycle.ledger().open_count(), 0);
    assert_eq!(h.cycle.ledger().account().current_capital, dec!(7660));
}

#[tokio::test]
async fn reset_daily_reopens_the_gate() {
    let mut h = harness(&AppConfig::default());
    open_call(&mut h).await;
    h.source.push(dec!(23980));
    h.cycle.run_cycle(ist(10, 3)).await.unwrap();

    h.cycle.reset_daily(ist(10, 4));
    let snapshot = h.cycle.snapshot();
    assert_eq!(snapshot.daily_pnl, Decimal::ZERO);
    assert_eq!(snapshot.session_start_capital, dec!(7660));
    assert_eq!(snapshot.loss_limit, dec!(-1149.0));

    // Budget is now 7660 × 0.8 = 6128 < 7800, so selection rejects instead.
    h.source.push(dec!(23970));
    let outcome = h.cycle.run_cycle(ist(10, 4)).await.unwrap();
    assert!(outcome.denied.is_none());
    assert!(outcome.skipped.is_some());
    assert_eq!(h.sink.kinds().last(), Some(&"skip"));
}

#[tokio::test]
async fn date_rollover_resets_daily_pnl() {
    let mut config = AppConfig::default();
    config.risk.daily_reset = DailyResetPolicy::DateRollover;
    let mut h = harness(&config);
    open_call(&mut h).await;
    h.source.push(dec!(23980));
    h.cycle.run_cycle(ist(10, 3)).await.unwrap();
    assert_eq!(h.cycle.ledger().account().daily_pnl, dec!(-2340));

    h.source.push(dec!(23990));
    h.cycle.run_cycle(ist_on(7, 9, 20)).await.unwrap();
    let account = h.cycle.ledger().account();
    assert_eq!(account.daily_pnl, Decimal::ZERO);
    assert_eq!(account.session_start_capital, dec!(7660));
}

#[tokio::test]
async fn daily_pnl_persists_without_reset_policy() {
    let mut h = harness(&AppConfig::default());
    open_call(&mut h).await;
    h.source.push(dec!(23980));
    h.cycle.run_cycle(ist(10, 3)).await.unwrap();

    h.source.push(dec!(23990));
    h.cycle.run_cycle(ist_on(7, 9, 20)).await.unwrap();
    assert_eq!(h.cycle.ledger().account().daily_pnl, dec!(-2340));
}

#[tokio::test]
async fn disabled_switch_denies_admission() {
    let mut h = harness(&AppConfig::default());
    h.cycle.set_enabled(false);
    for price in [dec!(24000), dec!(24005), dec!(24012)] {
        h.source.push(price);
    }
    let mut last = None;
    for minute in 0..3 {
        last = Some(h.cycle.run_cycle(ist(10, minute)).await.unwrap());
    }
    let outcome = last.unwrap();
    assert!(outcome.signal.is_some());
    assert_eq!(outcome.denied, Some(DenyReason::Disabled));
    assert!(h.sink.events().is_empty());
}

#[tokio::test]
async fn unavailable_price_skips_cycle() {
    let mut h = harness(&AppConfig::default());
    h.source.push_err(FeedError::Status {
        status: 503,
        body: "maintenance".into(),
    });

    let outcome = h.cycle.run_cycle(ist(10, 0)).await.unwrap();
    assert!(outcome.spot.is_none());
    assert!(h.cycle.history().is_empty());
    assert_eq!(h.cycle.snapshot().cycles, 1);
}

#[tokio::test]
async fn unavailable_price_keeps_open_positions() {
    let mut config = AppConfig::default();
    config.exits.max_hold_minutes = -1;
    let mut h = harness(&config);
    open_call(&mut h).await;

    h.source.push_err(FeedError::Timeout);
    let outcome = h.cycle.run_cycle(ist(10, 3)).await.unwrap();
    assert!(outcome.closed.is_empty());
    assert_eq!(h.cycle.ledger().open_count(), 1);
    assert_eq!(h.cycle.history().len(), 3);
}

#[tokio::test]
async fn step_backs_off_after_failure_and_recovers() {
    let mut h = harness(&AppConfig::default());
    h.source.push(Decimal::ZERO);
    h.source.push(dec!(24000));

    assert_eq!(h.cycle.step(ist(10, 0)).await, Duration::from_secs(30));
    assert_eq!(h.cycle.step(ist(10, 1)).await, Duration::from_secs(60));
    assert_eq!(h.cycle.snapshot().market_state, MarketState::MarketOpen);
}

#[tokio::test]
async fn closed_market_sleeps_without_fetching() {
    let mut h = harness(&AppConfig::default());

    // Saturday
    let delay = h.cycle.step(ist_on(4, 11, 0)).await;
    assert_eq!(delay, Duration::from_secs(300));
    // Monday before the open
    let delay = h.cycle.step(ist(9, 0)).await;
    assert_eq!(delay, Duration::from_secs(300));

    assert_eq!(h.source.calls(), 0);
    assert_eq!(h.cycle.snapshot().market_state, MarketState::MarketClosed);
}

#[tokio::test]
async fn signal_injected_after_close_does_not_carry_to_next_open() {
    let mut h = harness(&AppConfig::default());

    // Monday evening, market already closed.
    h.cycle.inject_signal(Direction::Call);
    assert_eq!(h.cycle.step(ist(20, 0)).await, Duration::from_secs(300));
    assert_eq!(h.source.calls(), 0);

    // Tuesday open: one flat sample, nothing for the detector either.
    h.source.push(dec!(24000));
    assert_eq!(h.cycle.step(ist_on(7, 9, 20)).await, Duration::from_secs(60));
    assert_eq!(h.source.calls(), 1);
    assert_eq!(h.cycle.ledger().open_count(), 0);
    assert!(h.sink.kinds().is_empty());
}

#[tokio::test]
async fn market_close_sweep_settles_open_positions() {
    let mut h = harness(&AppConfig::default());
    for (minute, price) in [(0, dec!(24000)), (1, dec!(24005)), (2, dec!(24012))] {
        h.source.push(price);
        h.cycle.step(ist(10, minute)).await;
    }
    assert_eq!(h.cycle.ledger().open_count(), 1);

    let delay = h.cycle.step(ist(15, 31)).await;
    assert_eq!(delay, Duration::from_secs(300));
    assert_eq!(h.cycle.ledger().open_count(), 0);
    assert_eq!(h.source.calls(), 3);

    let closed: Vec<_> = h.cycle.ledger().recent_closed().cloned().collect();
    assert_eq!(closed.len(), 1);
    assert_eq!(closed[0].exit_reason, Some(ExitReason::MarketClose));
    assert_eq!(closed[0].realized_pnl, Some(dec!(390)));
    assert_eq!(h.sink.kinds(), vec!["open", "close"]);
}

#[tokio::test]
async fn market_close_overrides_other_triggers() {
    let mut h = harness(&AppConfig::default());
    open_call(&mut h).await;

    // Flat price, well inside the hold limit, but past the close.
    h.source.push(dec!(24012));
    let outcome = h.cycle.run_cycle(ist(15, 45)).await.unwrap();
    assert_eq!(outcome.closed.len(), 1);
    assert_eq!(outcome.closed[0].exit_reason, Some(ExitReason::MarketClose));
}

#[tokio::test]
async fn injected_signal_is_gated_and_uses_spot() {
    let mut h = harness(&AppConfig::default());
    h.cycle.inject_signal(Direction::Put);
    h.source.push(dec!(24000));

    let outcome = h.cycle.run_cycle(ist(11, 0)).await.unwrap();
    let signal = outcome.signal.unwrap();
    assert_eq!(signal.origin, SignalOrigin::External);
    assert_eq!(signal.reference_price, dec!(24000));

    // 24000 - 150 → 23850, premium 120
    let position = outcome.opened.unwrap();
    assert_eq!(position.direction, Direction::Put);
    assert_eq!(position.strike, dec!(23850));

    h.cycle.inject_signal(Direction::Call);
    h.source.push(dec!(24001));
    let outcome = h.cycle.run_cycle(ist(11, 1)).await.unwrap();
    assert_eq!(outcome.denied, Some(DenyReason::MaxPositions));
}

#[tokio::test]
async fn notification_failure_does_not_abort_cycle() {
    let source = ScriptedSource::default();
    let mut cycle = TradingCycle::new(
        &AppConfig::default(),
        Box::new(source.clone()),
        Arc::new(FailingSink),
    )
    .unwrap();
    for price in [dec!(24000), dec!(24005), dec!(24012)] {
        source.push(price);
    }
    for minute in 0..3 {
        cycle.run_cycle(ist(10, minute)).await.unwrap();
    }
    assert_eq!(cycle.ledger().open_count(), 1);
}

#[tokio::test]
async fn capital_tracks_realized_pnl_across_trades() {
    let mut h = harness(&AppConfig::default());
    open_call(&mut h).await;
    // target: +2340
    h.source.push(dec!(24060));
    h.cycle.run_cycle(ist(10, 3)).await.unwrap();

    h.cycle.inject_signal(Direction::Call);
    h.source.push(dec!(24060));
    let opened = h.cycle.run_cycle(ist(10, 4)).await.unwrap();
    assert!(opened.opened.is_some());
    // stop: favourable -40
    h.source.push(dec!(24020));
    h.cycle.run_cycle(ist(10, 5)).await.unwrap();

    let snapshot = h.cycle.snapshot();
    let realized: Decimal = snapshot
        .recent_closed
        .iter()
        .filter_map(|p| p.realized_pnl)
        .sum();
    assert_eq!(snapshot.recent_closed.len(), 2);
    assert_eq!(snapshot.current_capital, snapshot.starting_capital + realized);
    assert_eq!(snapshot.daily_pnl, realized);
    assert_eq!((snapshot.wins, snapshot.losses), (1, 1));
    for position in &snapshot.recent_closed {
        assert!(position.exit_reason.is_some());
        assert!(position.realized_pnl.is_some());
        assert!(!snapshot.open_positions.iter().any(|p| p.id == position.id));
    }
}
