//! Command-line parsing for the OTDR cut locator.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! prediction code. Anything left unspecified on the command line for
//! `predict` is asked for interactively (`picker`).

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::io::DataSources;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "cutloc", version, about = "FTTH cut location from OTDR readings")]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Predict the cut location for one OTDR reading.
    Predict(PredictArgs),
    /// List cities, OLTs of a city, or segments of an OLT.
    List(ListArgs),
    /// Predict cut locations for every reading in a CSV file.
    Batch(BatchArgs),
}

/// Where the network tables come from (local paths or http(s) URLs).
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// Poles table (Pole_ID, Latitude, Longitude).
    #[arg(long, value_name = "CSV|URL", default_value = "poles_db.csv")]
    pub poles: String,

    /// Segments table (Residences, OLT_ID, Segment_ID, Pole_ID, Distance (m)).
    #[arg(long, value_name = "CSV|URL", default_value = "segments_db.csv")]
    pub segments: String,

    /// OLT table (Residences, OLT_ID[, OLT_Name]).
    #[arg(long, value_name = "CSV|URL", default_value = "olt_db.csv")]
    pub olts: String,
}

impl DataArgs {
    pub fn sources(&self) -> DataSources {
        DataSources {
            poles: self.poles.clone(),
            segments: self.segments.clone(),
            olts: self.olts.clone(),
        }
    }
}

/// Calibration overrides. Unset flags fall back to `CUTLOC_*` env vars, then defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct CalibrationArgs {
    /// OTDR overread correction factor (adjusted = reading x factor).
    #[arg(long)]
    pub overread_factor: Option<f64>,

    /// Route length (m) between slack loops.
    #[arg(long = "slack-span")]
    pub slack_span_m: Option<f64>,

    /// Cable length (m) held in each slack loop.
    #[arg(long = "slack-loop")]
    pub slack_loop_m: Option<f64>,

    /// Slack ratio multiplier for this run.
    #[arg(long)]
    pub slack_ratio: Option<f64>,
}

#[derive(Debug, Args, Clone)]
pub struct PredictArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub calibration: CalibrationArgs,

    /// City (Residences). Prompted if omitted.
    #[arg(long)]
    pub city: Option<String>,

    /// OLT id or name. Prompted if omitted.
    #[arg(long)]
    pub olt: Option<String>,

    /// Segment id. Prompted if omitted.
    #[arg(long)]
    pub segment: Option<String>,

    /// Raw OTDR cut distance in meters. Prompted if omitted.
    #[arg(short, long)]
    pub distance: Option<f64>,

    /// Export the prediction (with calibration and trace) to JSON.
    #[arg(long = "export-json", value_name = "JSON")]
    pub export_json: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// List OLTs of this city.
    #[arg(long)]
    pub city: Option<String>,

    /// With --city, list segments of this OLT.
    #[arg(long, requires = "city")]
    pub olt: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct BatchArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub calibration: CalibrationArgs,

    /// Readings table (Segment_ID, Distance (m)[, Residences, OLT_ID, Slack_Ratio]).
    #[arg(long, value_name = "CSV|URL")]
    pub readings: String,

    /// City for readings that do not name one.
    #[arg(long)]
    pub city: Option<String>,

    /// OLT for readings that do not name one.
    #[arg(long)]
    pub olt: Option<String>,

    /// Export per-reading results to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,
}
