//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and installs logging
//! - layers calibration (defaults -> environment -> flags)
//! - loads the network tables
//! - resolves the segment (flags or interactive prompts)
//! - runs predictions, prints reports and writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{BatchArgs, CalibrationArgs, Command, ListArgs, PredictArgs};
use crate::error::AppError;
use crate::io::{NetworkData, load_network, open_source, read_readings};
use crate::predict::{Calibration, CutPredictor};
use crate::report::{format_batch_summary, format_listing, format_prediction, format_row_errors};
use crate::topology::{SegmentSelection, Topology};

pub mod pipeline;

/// Maximum number of skipped ingest rows echoed to stderr.
const MAX_ROW_ERRORS_SHOWN: usize = 10;

pub const ENV_OVERREAD_FACTOR: &str = "CUTLOC_OVERREAD_FACTOR";
pub const ENV_SLACK_SPAN_M: &str = "CUTLOC_SLACK_SPAN_M";
pub const ENV_SLACK_LOOP_M: &str = "CUTLOC_SLACK_LOOP_M";
pub const ENV_SLACK_RATIO: &str = "CUTLOC_SLACK_RATIO";

/// Entry point for the `cutloc` binary.
pub fn run() -> Result<(), AppError> {
    let cli = crate::cli::Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Predict(args) => handle_predict(args),
        Command::List(args) => handle_list(args),
        Command::Batch(args) => handle_batch(args),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // A subscriber may already be installed when embedded; keep the existing one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let calibration = calibration_from_args(&args.calibration)?;
    let predictor = CutPredictor::new(calibration)?;
    let network = load(&args.data.sources())?;
    let topology = &network.topology;

    let selection = resolve_selection(topology, &args)?;
    let distance = match args.distance {
        Some(d) => d,
        None => crate::cli::picker::prompt_distance()?,
    };

    let slack_ratio = calibration.slack_ratio;
    let trace = pipeline::run_prediction(topology, &predictor, &selection, distance, slack_ratio)?;

    println!("{}", format_prediction(&selection, &calibration, slack_ratio, &trace));

    if let Some(path) = &args.export_json {
        let record = crate::io::PredictionRecord::new(&selection, &calibration, slack_ratio, &trace);
        crate::io::write_prediction_json(path, &record)?;
        tracing::info!(path = %path.display(), "prediction exported");
    }

    Ok(())
}

fn handle_list(args: ListArgs) -> Result<(), AppError> {
    let network = load(&args.data.sources())?;
    let topology = &network.topology;

    let listing = match (&args.city, &args.olt) {
        (None, _) => format_listing("Cities", &topology.cities()),
        (Some(city), None) => {
            let olts: Vec<String> = topology.olts_in_city(city)?.iter().map(|o| o.label()).collect();
            format_listing(&format!("OLTs in {city}"), &olts)
        }
        (Some(city), Some(olt)) => {
            format_listing(&format!("Segments for {olt} in {city}"), &topology.segments_for(city, olt)?)
        }
    };
    print!("{listing}");
    Ok(())
}

fn handle_batch(args: BatchArgs) -> Result<(), AppError> {
    let calibration = calibration_from_args(&args.calibration)?;
    let predictor = CutPredictor::new(calibration)?;
    let network = load(&args.data.sources())?;

    let readings = read_readings(open_source(&args.readings)?.as_slice())?;
    if let Some(summary) = format_row_errors(&readings.row_errors, MAX_ROW_ERRORS_SHOWN) {
        eprint!("{summary}");
    }
    if readings.rows.is_empty() {
        return Err(AppError::new(3, "No valid readings to predict."));
    }

    let defaults = pipeline::BatchDefaults {
        city: args.city.clone(),
        olt: args.olt.clone(),
        slack_ratio: calibration.slack_ratio,
    };
    let outcomes = pipeline::run_batch(&network.topology, &predictor, &readings.rows, &defaults);

    println!("{}", format_batch_summary(&outcomes));

    if let Some(path) = &args.export {
        crate::io::write_batch_csv(path, &outcomes)?;
        tracing::info!(path = %path.display(), rows = outcomes.len(), "batch results exported");
    }

    Ok(())
}

/// Defaults, then `CUTLOC_*` environment, then explicit flags.
pub fn calibration_from_args(args: &CalibrationArgs) -> Result<Calibration, AppError> {
    dotenvy::dotenv().ok();
    let env = calibration_from_vars(|key| std::env::var(key).ok())?;
    let calibration = apply_overrides(env, args);
    calibration.validate()?;
    tracing::debug!(?calibration, "calibration resolved");
    Ok(calibration)
}

/// Defaults overridden by whatever `get` returns for the `CUTLOC_*` keys.
pub fn calibration_from_vars(get: impl Fn(&str) -> Option<String>) -> Result<Calibration, AppError> {
    let mut calibration = Calibration::default();
    let fields: [(&str, &mut f64); 4] = [
        (ENV_OVERREAD_FACTOR, &mut calibration.overread_factor),
        (ENV_SLACK_SPAN_M, &mut calibration.slack_span_m),
        (ENV_SLACK_LOOP_M, &mut calibration.slack_loop_m),
        (ENV_SLACK_RATIO, &mut calibration.slack_ratio),
    ];
    for (key, slot) in fields {
        let Some(raw) = get(key) else { continue };
        let raw = raw.trim();
        if raw.is_empty() {
            continue;
        }
        *slot = raw
            .parse::<f64>()
            .map_err(|e| AppError::new(2, format!("Invalid {key}='{raw}': {e}")))?;
    }
    calibration
        .validate()
        .map_err(|e| AppError::new(2, format!("Invalid calibration from environment: {e}")))?;
    Ok(calibration)
}

fn apply_overrides(base: Calibration, args: &CalibrationArgs) -> Calibration {
    Calibration {
        overread_factor: args.overread_factor.unwrap_or(base.overread_factor),
        slack_span_m: args.slack_span_m.unwrap_or(base.slack_span_m),
        slack_loop_m: args.slack_loop_m.unwrap_or(base.slack_loop_m),
        slack_ratio: args.slack_ratio.unwrap_or(base.slack_ratio),
    }
}

fn load(sources: &crate::io::DataSources) -> Result<NetworkData, AppError> {
    let network = load_network(sources)?;
    if let Some(summary) = format_row_errors(&network.row_errors, MAX_ROW_ERRORS_SHOWN) {
        eprint!("{summary}");
    }
    Ok(network)
}

/// Fill in city/OLT/segment from flags, prompting for whatever is missing.
fn resolve_selection(topology: &Topology, args: &PredictArgs) -> Result<SegmentSelection, AppError> {
    use crate::cli::picker::prompt_select;

    let city = match &args.city {
        Some(city) => city.clone(),
        None => prompt_select("city", &topology.cities())?,
    };

    let olt = match &args.olt {
        Some(olt) => olt.clone(),
        None => {
            let ids: Vec<String> = topology
                .olts_in_city(&city)?
                .iter()
                .map(|o| o.olt_id.clone())
                .collect();
            prompt_select("OLT", &ids)?
        }
    };

    let segment_id = match &args.segment {
        Some(segment) => segment.clone(),
        None => prompt_select("segment", &topology.segments_for(&city, &olt)?)?,
    };

    Ok(SegmentSelection { city, olt, segment_id })
}
