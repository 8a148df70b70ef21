use crate::demo::{run_assign, run_demo, AssignArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use team_placement::config::AppConfig;
use team_placement::error::AppError;
use team_placement::telemetry;

#[derive(Parser, Debug)]
#[command(
    name = "Team Placement",
    about = "Assign pending applicants to teams from the command line or over HTTP",
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
    /// Run an assignment pass over CSV exports of teams and applicants
    Assign(AssignArgs),
    /// Run the built-in sample cohort and print the outcome
    Demo(DemoArgs),
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
        Command::Assign(args) => {
            let config = AppConfig::load()?;
            telemetry::init(&config.telemetry)?;
            run_assign(args)
        }
        Command::Demo(args) => run_demo(args),
    }
}
