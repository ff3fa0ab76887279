//! CLI module graph and command dispatch.

pub mod chart;
pub mod command;
pub mod correlate;
pub mod diagnostic;
pub mod entities;
pub mod forecast;
pub mod hass;
pub mod output;
pub mod paths;
pub mod source;
pub mod table;

use command::{Cli, Commands};
use output::OutputConfig;
use source::Source;

/// Run a parsed command line.
///
/// # Errors
/// Returns a rendered diagnostic for any failure.
pub fn run(cli: Cli) -> miette::Result<()> {
    let output_config = OutputConfig::new(cli.json, cli.quiet, cli.verbose);
    output::configure(output_config, &cli.color);

    let config = source::load_config(&cli.config)?;
    let logging = match output_config.log_level() {
        Some(level) => config.logging.clone().with_level(level),
        None => config.logging.clone(),
    };
    logging.init();

    let source = Source::new(&cli, config);
    dispatch(&source, &cli.command).map_err(diagnostic::report)
}

fn dispatch(source: &Source, command: &Commands) -> crate::error::Result<()> {
    match command {
        Commands::Entities(args) => entities::execute(source, args),
        Commands::Fetch(args) => table::fetch(source, args),
        Commands::Sensors(args) => table::sensors(source, args),
        Commands::Binary(args) => table::binary(source, args),
        Commands::Correlations(args) => correlate::execute(source, args),
        Commands::Plot(args) => chart::plot(source, args),
        Commands::Timeline(args) => chart::timeline(source, args),
        Commands::Forecast(args) => forecast::execute(source, args),
        Commands::DbUrl => hass::db_url(source),
        Commands::Users => hass::users(source),
    }
}
