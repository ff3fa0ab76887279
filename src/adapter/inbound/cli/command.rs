//! Command-line interface definitions.
//!
//! Defines the CLI structure for hass-detective using `clap`. Global flags
//! select the recorder database and output mode; subcommands map onto the
//! analysis operations.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::paths;
use crate::domain::Frequency;

/// Explore, correlate and forecast Home Assistant recorder history
#[derive(Parser, Debug)]
#[command(name = "hass-detective")]
#[command(version)]
pub struct Cli {
    /// Color output mode [auto, always, never]
    #[arg(
        long,
        global = true,
        default_value = "auto",
        hide_possible_values = true
    )]
    pub color: ColorChoice,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    /// Decrease output verbosity
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase output verbosity
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Path to the configuration file
    #[arg(long, global = true, default_value_os_t = paths::default_config())]
    pub config: PathBuf,

    /// Recorder database URL (overrides config and discovery)
    #[arg(long, global = true, value_name = "URL")]
    pub db_url: Option<String>,

    /// Home Assistant config directory used to discover the database
    #[arg(long, global = true, value_name = "DIR")]
    pub hass_config: Option<PathBuf>,

    /// Maximum number of rows fetched per query
    #[arg(
        long,
        global = true,
        value_name = "ROWS",
        value_parser = clap::value_parser!(u64).range(1..),
        conflicts_with = "no_limit"
    )]
    pub limit: Option<u64>,

    /// Fetch every row
    #[arg(long, global = true)]
    pub no_limit: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Color output mode for terminal rendering.
#[derive(Clone, Debug, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect automatically
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List recorded entities grouped by domain
    Entities(EntitiesArgs),

    /// Fetch a table of states for entities of one domain
    Fetch(FetchArgs),

    /// Fetch the numeric sensor table
    Sensors(TableArgs),

    /// Fetch the binary sensor table
    Binary(TableArgs),

    /// Rank pairwise correlations between numeric sensors
    Correlations(CorrelationsArgs),

    /// Draw sparkline charts of entity histories
    Plot(PlotArgs),

    /// Draw an on/off strip of a binary sensor
    Timeline(TimelineArgs),

    /// Forecast the future values of one sensor
    Forecast(ForecastArgs),

    /// Print the resolved recorder database URL
    DbUrl,

    /// List Home Assistant users and refresh tokens
    Users,
}

/// Arguments for `hass-detective entities`.
#[derive(Args, Debug)]
pub struct EntitiesArgs {
    /// Only list entities of this domain
    #[arg(long)]
    pub domain: Option<String>,

    /// Show friendly name, device class and unit of each entity
    #[arg(long)]
    pub details: bool,
}

/// Arguments for `hass-detective fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Entity ids, all from the same domain
    #[arg(required = true, num_args = 1..)]
    pub entities: Vec<String>,

    /// Write the table as CSV to stdout
    #[arg(long)]
    pub csv: bool,
}

/// Arguments for the `sensors` and `binary` commands.
#[derive(Args, Debug)]
pub struct TableArgs {
    /// Write the table as CSV to stdout
    #[arg(long)]
    pub csv: bool,
}

/// Arguments for `hass-detective correlations`.
#[derive(Args, Debug)]
pub struct CorrelationsArgs {
    /// Restrict to these sensors instead of every numeric sensor
    pub entities: Vec<String>,

    /// Only show the N strongest pairs
    #[arg(long, value_name = "N")]
    pub top: Option<usize>,

    /// Keep both orderings of every pair
    #[arg(long)]
    pub ordered: bool,
}

/// Arguments for `hass-detective plot`.
#[derive(Args, Debug)]
pub struct PlotArgs {
    /// Entity ids to chart
    #[arg(required = true, num_args = 1..)]
    pub entities: Vec<String>,

    /// Chart width in characters
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

/// Arguments for `hass-detective timeline`.
#[derive(Args, Debug)]
pub struct TimelineArgs {
    /// Binary sensor entity id
    pub entity: String,

    /// Sampling step, e.g. `1min`, `15min`, `1H`
    #[arg(long, default_value = "1min")]
    pub freq: Frequency,

    /// Strip width in characters
    #[arg(long, default_value_t = 60)]
    pub width: usize,
}

/// Arguments for `hass-detective forecast`.
#[derive(Args, Debug)]
pub struct ForecastArgs {
    /// Sensor entity id
    pub entity: String,

    /// Number of future steps to predict
    #[arg(long, default_value_t = 24)]
    pub periods: usize,

    /// Step between predictions, e.g. `1H`, `30min`, `1D`
    #[arg(long, default_value = "1H")]
    pub freq: Frequency,

    /// Samples per season (overrides `analysis.season_length`)
    #[arg(long)]
    pub season_length: Option<usize>,

    /// Write fitted and predicted values as CSV to stdout
    #[arg(long)]
    pub csv: bool,
}
