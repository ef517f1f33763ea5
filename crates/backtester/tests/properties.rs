//! Property tests for whole runs: equity conservation once flat, one equity
//! point per bar plus the liquidation point, and bit-identical replays.

use analytics::PerformanceAnalyzer;
use backtester::Backtester;
use chrono::{Duration, TimeZone, Utc};
use configuration::{BacktestSettings, LedgerConfig, ReversalCommission, SmaCrossoverParams};
use core_types::{Bar, StrategyId};
use ledger::PositionLedger;
use market_data::{BarSeries, MarketDataSource};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use strategies::SmaCrossover;

fn series(cents: &[i64]) -> BarSeries {
    let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
    let bars = cents
        .iter()
        .enumerate()
        .map(|(i, cents)| {
            let price = Decimal::new(*cents, 2);
            Bar {
                symbol: "NQ".to_string(),
                timestamp: start + Duration::hours(i as i64),
                open: price,
                high: price,
                low: price,
                close: price,
                volume: dec!(1),
            }
        })
        .collect();
    BarSeries::new(bars)
}

fn backtester() -> Backtester {
    let strategy = SmaCrossover::new(SmaCrossoverParams {
        short_period: 2,
        long_period: 5,
    })
    .unwrap();
    Backtester::new(
        BacktestSettings {
            symbol: "NQ".to_string(),
            strategy: StrategyId::SmaCrossover,
            warmup_bars: 5,
            order_budget: dec!(10000),
            frequency: "hourly".to_string(),
            risk_free_rate: 0.0,
        },
        PositionLedger::new(LedgerConfig {
            initial_cash: dec!(1000000),
            commission: dec!(2.7),
            leverage: dec!(1),
            reversal_commission: ReversalCommission::PerLeg,
        }),
        Box::new(strategy),
        PerformanceAnalyzer::default(),
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        .. ProptestConfig::default()
    })]

    #[test]
    fn runs_conserve_equity_and_replay_identically(
        cents in prop::collection::vec(5_000i64..15_000, 8..80),
    ) {
        let mut source = series(&cents);
        let first = backtester().run(&mut source).unwrap();

        prop_assert_eq!(first.bars_processed, cents.len() - 5);
        prop_assert_eq!(first.equity_curve.len(), first.bars_processed + 1);
        prop_assert_eq!(first.rejected_orders, 0);
        prop_assert_eq!(first.final_equity, first.initial_cash + first.realized_pnl);

        source.reset();
        let second = backtester().run(&mut source).unwrap();
        prop_assert_eq!(&first.trades, &second.trades);
        prop_assert_eq!(first.final_equity, second.final_equity);
        prop_assert_eq!(&first.equity_curve, &second.equity_curve);
    }
}
