//! CLI definition and dispatch.

use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvBarSource;
use crate::adapters::csv_sink_adapter::CsvSinkAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::calendar::Interval;
use crate::domain::config_validation::{validate_replay_config, validate_strategy_config};
use crate::domain::crossover::SmaCrossover;
use crate::domain::error::EngineError;
use crate::domain::lifecycle::ExitRules;
use crate::domain::replay::ReplayScheduler;
use crate::domain::series::BarSeries;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::BarSource;

#[derive(Parser, Debug)]
#[command(name = "allokit", about = "Indicator engine and allocation replay harness")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay bar history through the configured strategy
    Replay {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        instrument: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List instruments available in the data directory
    ListInstruments {
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show the stored data range for an instrument
    Info {
        #[arg(long)]
        instrument: String,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Replay {
            config,
            output,
            instrument,
            dry_run,
        } => run_replay(&config, output.as_ref(), instrument.as_deref(), dry_run),
        Command::Validate { config } => run_validate(&config),
        Command::ListInstruments { data_dir, config } => {
            run_list_instruments(data_dir, config.as_ref())
        }
        Command::Info {
            instrument,
            data_dir,
            config,
        } => run_info(&instrument, data_dir, config.as_ref()),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|e| {
        let err = EngineError::ConfigParse {
            file: path.display().to_string(),
            reason: e.to_string(),
        };
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn run_replay(
    config_path: &PathBuf,
    output_override: Option<&PathBuf>,
    instrument_override: Option<&str>,
    dry_run: bool,
) -> ExitCode {
    // Stage 1: load and validate configuration
    eprintln!("Loading config from {}", config_path.display());
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };
    if let Err(e) = validate_replay_config(&config).and_then(|()| validate_strategy_config(&config))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }

    // Stage 2: resolve strategy and replay parameters
    let strategy = build_strategy(&config, instrument_override);
    let strategy_id = config
        .get_string("strategy", "name")
        .unwrap_or_else(|| format!("crossover-{}", strategy.instrument.to_lowercase()));
    let interval = resolve_interval(&config);
    let (start, end) = resolve_date_range(&config);

    if dry_run {
        eprintln!(
            "Config OK: strategy {} on {} at {}, SMA({}/{})",
            strategy_id, strategy.instrument, interval, strategy.fast_period, strategy.slow_period
        );
        return ExitCode::SUCCESS;
    }

    // Stage 3: load bars
    let data_dir = config
        .get_string("replay", "data_dir")
        .unwrap_or_default();
    let source = CsvBarSource::new(PathBuf::from(data_dir));
    let minimum_bars = strategy.slow_period;
    let series = match load_series(&source, &strategy.instrument, start, end, minimum_bars) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    eprintln!(
        "Loaded {} bars for {}",
        series.bar_count(&strategy.instrument),
        strategy.instrument
    );

    // Stage 4: wire the sink and run the replay
    let output_path = output_override.cloned().unwrap_or_else(|| {
        config
            .get_string("replay", "output")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("allocations.csv"))
    });
    let mut sink = match CsvSinkAdapter::create(&output_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    let mut scheduler = ReplayScheduler::new();
    let ticks = series.timeline().len();
    scheduler.register(&strategy_id, interval, Box::new(strategy));

    if let Err(e) = scheduler.run(&series, &mut sink).and_then(|()| sink.flush()) {
        eprintln!("error: {e}");
        return (&e).into();
    }

    eprintln!(
        "Replayed {} timeline ticks; allocations written to {}",
        ticks,
        output_path.display()
    );
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(code) => return code,
    };

    if let Err(e) = validate_replay_config(&config).and_then(|()| validate_strategy_config(&config))
    {
        eprintln!("error: {e}");
        return (&e).into();
    }
    eprintln!("Config OK");
    ExitCode::SUCCESS
}

fn run_list_instruments(data_dir: Option<PathBuf>, config_path: Option<&PathBuf>) -> ExitCode {
    let dir = match resolve_data_dir(data_dir, config_path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    match CsvBarSource::new(dir).list_instruments() {
        Ok(instruments) => {
            for instrument in instruments {
                println!("{instrument}");
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn run_info(
    instrument: &str,
    data_dir: Option<PathBuf>,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let dir = match resolve_data_dir(data_dir, config_path) {
        Ok(d) => d,
        Err(code) => return code,
    };

    match CsvBarSource::new(dir).data_range(instrument) {
        Ok(Some((first, last, count))) => {
            println!("{instrument}: {count} bars from {first} to {last}");
            ExitCode::SUCCESS
        }
        Ok(None) => {
            let err = EngineError::NoData {
                instrument: instrument.to_string(),
            };
            eprintln!("error: {err}");
            (&err).into()
        }
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

fn resolve_data_dir(
    data_dir: Option<PathBuf>,
    config_path: Option<&PathBuf>,
) -> Result<PathBuf, ExitCode> {
    if let Some(dir) = data_dir {
        return Ok(dir);
    }
    let Some(path) = config_path else {
        eprintln!("error: either --data-dir or --config is required");
        return Err(ExitCode::from(2));
    };
    let config = load_config(path)?;
    match config.get_string("replay", "data_dir") {
        Some(dir) => Ok(PathBuf::from(dir)),
        None => {
            let err = EngineError::ConfigMissing {
                section: "replay".to_string(),
                key: "data_dir".to_string(),
            };
            eprintln!("error: {err}");
            Err((&err).into())
        }
    }
}

pub fn build_strategy(config: &dyn ConfigPort, instrument_override: Option<&str>) -> SmaCrossover {
    let instrument = instrument_override
        .map(str::to_string)
        .or_else(|| config.get_string("strategy", "instrument"))
        .unwrap_or_default();

    let stop = config.get_double("strategy", "stop_loss_pct", 0.0);
    let max_hold = config.get_usize("strategy", "max_hold_days", 0);
    let streak = config.get_usize("strategy", "bullish_streak_limit", 0);

    SmaCrossover {
        instrument,
        fast_period: config.get_usize("strategy", "fast_period", 10),
        slow_period: config.get_usize("strategy", "slow_period", 50),
        target_weight: config.get_double("strategy", "target_weight", 1.0),
        exits: ExitRules {
            stop_loss_pct: (stop > 0.0).then_some(stop),
            max_hold_days: (max_hold > 0).then_some(max_hold as u32),
            bullish_streak_limit: (streak > 0).then_some(streak as u32),
        },
    }
}

pub fn resolve_interval(config: &dyn ConfigPort) -> Interval {
    config
        .get_string("replay", "interval")
        .and_then(|raw| Interval::parse(&raw))
        .unwrap_or(Interval::Day)
}

fn resolve_date_range(config: &dyn ConfigPort) -> (DateTime<Utc>, DateTime<Utc>) {
    let parse = |key: &str| {
        config
            .get_string("replay", key)
            .and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok())
    };
    let start = parse("start_date")
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let end = parse("end_date")
        .and_then(|d| d.and_hms_opt(23, 59, 59))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

fn load_series(
    source: &dyn BarSource,
    instrument: &str,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    minimum_bars: usize,
) -> Result<BarSeries, EngineError> {
    let bars = source.fetch_bars(instrument, start, end)?;
    if bars.is_empty() {
        return Err(EngineError::NoData {
            instrument: instrument.to_string(),
        });
    }
    if bars.len() < minimum_bars {
        return Err(EngineError::InsufficientData {
            instrument: instrument.to_string(),
            bars: bars.len(),
            minimum: minimum_bars,
        });
    }

    let mut series = BarSeries::new();
    for bar in bars {
        series.append(bar)?;
    }
    Ok(series)
}
