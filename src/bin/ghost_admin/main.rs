//! ghost-admin: Ghost admin API command-line client

#![deny(clippy::all, clippy::pedantic)]

mod args;
mod error;
mod handlers;
mod io;
mod print;


use std::process;

use clap::Parser;
use ghost_admin::{AdminClient, config, telemetry};

use args::{Cli, Commands};
use error::CliError;
use handlers::{members, posts};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(&cli).await {
        report_fatal(&err);
        process::exit(1);
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    let settings = config::load(&cli.overrides())?;
    telemetry::init(&settings.logging)?;

    let client = AdminClient::new(settings.site.url.as_str(), &settings.site.api_key)?;
    execute(&client, cli.command_or_default(), &settings.cleanup.preserved_email).await
}

async fn execute(client: &AdminClient, command: Commands, preserved: &str) -> Result<(), CliError> {
    match command {
        Commands::Members(cmd) => members::handle(client, cmd.action, preserved).await,
        Commands::Posts(cmd) => posts::handle(client, cmd.action).await,
    }
}

fn report_fatal(err: &CliError) {
    eprintln!("Fatal error: {err}");
}
