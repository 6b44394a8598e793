use crate::report::{run_import, run_scores, ImportArgs, ScoresArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use regional_gap::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Regional Gap Dashboard",
    about = "Score, rank and analyse Indonesian provinces from BPS indicator collections",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print the composite ranking for a year
    Scores(ScoresArgs),
    /// Validate a seed file and summarise what it would load
    Import(ImportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Scores(args) => run_scores(args).await,
        Command::Import(args) => run_import(args).await,
    }
}
