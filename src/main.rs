use clap::Parser;

use hass_detective::adapter::inbound::cli::{self, command::Cli};

fn main() -> miette::Result<()> {
    let _ = dotenvy::dotenv();
    cli::run(Cli::parse())
}
