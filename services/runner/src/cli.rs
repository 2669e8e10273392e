use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use secretary_bot::error::AppError;

use crate::demo::{run_simulation, SimulateArgs};
use crate::server;

#[derive(Parser, Debug)]
#[command(
    name = "Secretary Runner",
    about = "Drive the capitol secretary appointment routine and expose its status",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the routine on its interval and serve the status API (default command)
    Serve(ServeArgs),
    /// Run a fixed number of cycles against a simulated game and print what happened
    Simulate(SimulateArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Scenario JSON for the simulated game (defaults to the built-in demo)
    #[arg(long)]
    pub(crate) scenario: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Simulate(args) => run_simulation(args),
    }
}
