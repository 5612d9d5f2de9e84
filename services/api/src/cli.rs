use crate::demo::{run_demo, run_reconcile, DemoArgs, ReconcileArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kheticulture::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Kheticulture",
    about = "Run the farm labour marketplace service or walk through it from the command line",
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
    /// Seed a sample marketplace and run one job status reconciliation pass over it
    Reconcile(ReconcileArgs),
    /// Walk a harvest job from posting to completion and print each step
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
        Command::Reconcile(args) => run_reconcile(args),
        Command::Demo(args) => run_demo(args),
    }
}
