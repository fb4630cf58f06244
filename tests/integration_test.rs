//! Integration tests.
//!
//! Cover the full replay pipeline end-to-end:
//! - mock bar source → series → scheduler → sink, with the bundled
//!   crossover strategy entering and exiting
//! - CSV adapters on both ends of the hexagon (tempdir-backed)
//! - failure isolation: one broken strategy never stalls the others
//! - sequencing: replaying an old timestamp is rejected without state damage
//! - engine-level contracts for the indicator and normalizer scenarios

mod common;

use common::*;

use allokit::domain::allocation::{normalize, Allocation};
use allokit::domain::calendar::Interval;
use allokit::domain::crossover::SmaCrossover;
use allokit::domain::error::EngineError;
use allokit::domain::harness::DecisionStep;
use allokit::domain::indicator::{IndicatorKind, IndicatorValue};
use allokit::domain::lifecycle::ExitRules;
use allokit::domain::replay::ReplayScheduler;
use allokit::domain::series::HistoryView;
use allokit::domain::state::StrategyState;
use allokit::ports::data_port::BarSource;

mod full_replay_pipeline {
    use super::*;

    #[test]
    fn crossover_enters_and_stops_out() {
        // closes pick the fast SMA up through the slow one, then crash:
        // entry at 100 on day 2, stop-loss (5%) breached by 94 on day 3
        let closes = [98.0, 99.0, 100.0, 94.0, 94.5];
        let source = MockBarSource::new().with_bars("GLD", generate_bars("GLD", &closes));

        let bars = source
            .fetch_bars("GLD", ts(0), ts(10))
            .expect("mock fetch cannot fail");
        let series = series_from_bars(bars);

        let strategy = SmaCrossover {
            exits: ExitRules {
                stop_loss_pct: Some(0.05),
                ..Default::default()
            },
            ..SmaCrossover::new("GLD", 2, 3)
        };

        let mut scheduler = ReplayScheduler::new();
        scheduler.register("gld-cross", Interval::Day, Box::new(strategy));

        let mut sink = RecordingSink::new();
        scheduler.run(&series, &mut sink).unwrap();

        let emitted = sink.for_strategy("gld-cross");
        assert_eq!(emitted.len(), 5, "one allocation per daily bar");

        // flat during warm-up
        assert!(emitted[0].2.is_flat());
        assert!(emitted[1].2.is_flat());
        // entered on the crossover bar
        assert_eq!(emitted[2].2.weight("GLD"), 1.0);
        // stopped out: allocation back to zero, entry price cleared
        assert_eq!(emitted[3].2.weight("GLD"), 0.0);

        let state = scheduler.state("gld-cross").unwrap();
        assert_eq!(state.entry_price, None);
        assert_eq!(state.days_held, 0);
    }

    #[test]
    fn equal_weight_step_splits_across_instruments() {
        struct EqualWeightStep {
            instruments: Vec<String>,
        }

        impl DecisionStep for EqualWeightStep {
            fn decide(
                &self,
                view: &HistoryView<'_>,
                _state: &mut StrategyState,
            ) -> Result<Allocation, EngineError> {
                // equal weight across instruments that traded today
                let active: Vec<&String> = self
                    .instruments
                    .iter()
                    .filter(|instrument| view.has_bar_at(instrument))
                    .collect();
                let mut allocation = Allocation::flat();
                for instrument in &active {
                    allocation.set(instrument, 1.0 / active.len() as f64);
                }
                Ok(allocation)
            }
        }

        let mut bars = generate_bars("GLD", &[100.0, 101.0, 102.0]);
        bars.extend(generate_bars("SPY", &[400.0, 401.0]));
        // SPY has no bar on day 2
        let series = series_from_bars(bars);

        let mut scheduler = ReplayScheduler::new();
        scheduler.register(
            "equal",
            Interval::Day,
            Box::new(EqualWeightStep {
                instruments: vec!["GLD".into(), "SPY".into()],
            }),
        );

        let mut sink = RecordingSink::new();
        scheduler.run(&series, &mut sink).unwrap();

        let emitted = sink.for_strategy("equal");
        assert_eq!(emitted[0].2.weight("GLD"), 0.5);
        assert_eq!(emitted[0].2.weight("SPY"), 0.5);
        // missing instrument drops out of the split
        assert_eq!(emitted[2].2.weight("GLD"), 1.0);
        assert_eq!(emitted[2].2.weight("SPY"), 0.0);
    }

    #[test]
    fn mock_source_error_surfaces_as_data_source() {
        let source = MockBarSource::new().with_error("GLD", "connection refused");
        let result = source.fetch_bars("GLD", ts(0), ts(10));
        assert!(matches!(result, Err(EngineError::DataSource { .. })));
    }
}

mod csv_round_trip {
    use super::*;
    use allokit::adapters::csv_adapter::CsvBarSource;
    use allokit::adapters::csv_sink_adapter::CsvSinkAdapter;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn replay_from_csv_files_to_csv_sink() {
        let dir = TempDir::new().unwrap();

        let mut content = String::from("timestamp,open,high,low,close,volume\n");
        for (i, close) in [98.0, 99.0, 100.0, 101.0, 102.0].iter().enumerate() {
            content.push_str(&format!(
                "2024-01-{:02},{},{},{},{},1000\n",
                i + 1,
                close - 1.0,
                close + 1.0,
                close - 2.0,
                close
            ));
        }
        fs::write(dir.path().join("GLD.csv"), content).unwrap();

        let source = CsvBarSource::new(dir.path().to_path_buf());
        let bars = source.fetch_bars("GLD", ts(0), ts(30)).unwrap();
        assert_eq!(bars.len(), 5);
        let series = series_from_bars(bars);

        let output = dir.path().join("allocations.csv");
        let mut sink = CsvSinkAdapter::create(&output).unwrap();

        let mut scheduler = ReplayScheduler::new();
        scheduler.register(
            "gld-cross",
            Interval::Day,
            Box::new(SmaCrossover::new("GLD", 2, 3)),
        );
        scheduler.run(&series, &mut sink).unwrap();
        sink.flush().unwrap();

        let written = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        // header + one row per tick
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[0], "strategy_id,timestamp,instrument,weight");
        // warm-up days are explicit flat rows
        assert!(lines[1].ends_with(",,0"));
        assert!(lines[2].ends_with(",,0"));
        // the uptrend holds a full position from day 3 on
        assert!(lines[3].contains(",GLD,1"));
        assert!(lines[5].contains(",GLD,1"));
    }
}

mod failure_isolation {
    use super::*;

    struct PanickyMath;

    impl DecisionStep for PanickyMath {
        fn decide(
            &self,
            _view: &HistoryView<'_>,
            state: &mut StrategyState,
        ) -> Result<Allocation, EngineError> {
            state.days_held += 1;
            Err(EngineError::Decision {
                strategy_id: "broken".into(),
                reason: "division by zero range".into(),
            })
        }
    }

    #[test]
    fn broken_strategy_stays_local() {
        let series = series_from_bars(generate_bars("GLD", &[100.0, 101.0, 102.0]));

        let mut scheduler = ReplayScheduler::new();
        scheduler.register("broken", Interval::Day, Box::new(PanickyMath));
        scheduler.register(
            "healthy",
            Interval::Day,
            Box::new(SmaCrossover::new("GLD", 1, 2)),
        );

        let mut sink = RecordingSink::new();
        scheduler.run(&series, &mut sink).unwrap();

        // broken strategy emitted flat allocations every bar, never advanced state
        let broken = sink.for_strategy("broken");
        assert_eq!(broken.len(), 3);
        assert!(broken.iter().all(|(_, _, allocation)| allocation.is_flat()));
        assert_eq!(scheduler.state("broken").unwrap().days_held, 0);

        // healthy strategy ran all bars
        assert_eq!(sink.for_strategy("healthy").len(), 3);
    }

    #[test]
    fn replaying_an_old_timestamp_is_rejected_without_state_damage() {
        let series = series_from_bars(generate_bars("GLD", &[98.0, 99.0, 100.0, 101.0]));

        let mut scheduler = ReplayScheduler::new();
        scheduler.register(
            "gld-cross",
            Interval::Day,
            Box::new(SmaCrossover::new("GLD", 2, 3)),
        );

        let mut sink = RecordingSink::new();
        for day in [0u64, 1, 2, 3] {
            scheduler.process(&series, ts(day), &mut sink).unwrap();
        }
        let state_before = scheduler.state("gld-cross").unwrap().clone();
        let emitted_before = sink.emitted.len();

        // out-of-order tick: the harness rejects it, nothing is emitted
        scheduler.process(&series, ts(1), &mut sink).unwrap();

        assert_eq!(sink.emitted.len(), emitted_before);
        assert_eq!(scheduler.state("gld-cross").unwrap(), &state_before);
    }
}

mod engine_contracts {
    use super::*;

    #[test]
    fn macd_histogram_flat_on_constant_closes() {
        let bars = generate_bars("GLD", &[50.0; 40]);
        let kind = IndicatorKind::Macd {
            fast: 12,
            slow: 26,
            signal: 9,
        };
        kind.validate().unwrap();

        let series = kind.compute(&bars);
        assert_eq!(series.values.len(), 40);

        let defined: Vec<_> = series.values.iter().filter(|p| p.valid).collect();
        assert!(!defined.is_empty());
        for point in defined {
            if let IndicatorValue::Macd { histogram, .. } = point.value {
                assert!(histogram.abs() < 1e-9);
            } else {
                panic!("expected MACD value");
            }
        }
    }

    #[test]
    fn warm_up_bounds_hold_for_every_kind() {
        let bars = generate_bars("GLD", &(0..60).map(|i| 100.0 + i as f64).collect::<Vec<_>>());

        let kinds = [
            IndicatorKind::Sma(20),
            IndicatorKind::Ema(20),
            IndicatorKind::Wma(20),
            IndicatorKind::Hma(15),
            IndicatorKind::Rsi(14),
            IndicatorKind::Atr(14),
            IndicatorKind::Stddev(20),
            IndicatorKind::WilliamsR(14),
            IndicatorKind::RealizedVol(20),
            IndicatorKind::Macd {
                fast: 12,
                slow: 26,
                signal: 9,
            },
            IndicatorKind::Bollinger {
                period: 20,
                stddev_mult_x100: 200,
            },
        ];

        for kind in kinds {
            kind.validate().unwrap();
            let series = kind.compute(&bars);
            assert_eq!(series.values.len(), bars.len(), "{kind}: length mismatch");

            let warm_up = kind.warm_up();
            for (i, point) in series.values.iter().enumerate() {
                if i + 1 < warm_up {
                    assert!(!point.valid, "{kind}: index {i} inside warm-up is defined");
                }
            }
            assert!(
                series.values[warm_up - 1].valid,
                "{kind}: first post-warm-up value undefined"
            );
        }
    }

    #[test]
    fn normalizer_scales_oversubscribed_proposal() {
        let mut raw = Allocation::flat();
        raw.set("A", 0.6);
        raw.set("B", 0.6);

        let normalized = normalize(&raw).unwrap();
        assert!((normalized.weight("A") - 0.5).abs() < 1e-12);
        assert!((normalized.weight("B") - 0.5).abs() < 1e-12);

        // idempotent on the already-normalized result
        assert_eq!(normalize(&normalized).unwrap(), normalized);
    }
}
