use crate::demo::{run_demo, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand, ValueEnum};
use loan_desk::error::AppError;
use loan_desk::workflows::approval::RejectionDisplay;

#[derive(Parser, Debug)]
#[command(
    name = "Loan Desk",
    about = "Serve and demonstrate the loan approval and session workflows",
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
    /// Walk a loan and a login session through their lifecycles
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
    /// Which milestone renders as failed for rejected loans
    #[arg(long, value_enum, default_value_t = RejectionDisplayArg::Suggested)]
    pub(crate) rejection_display: RejectionDisplayArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum RejectionDisplayArg {
    #[default]
    Suggested,
    Approved,
}

impl From<RejectionDisplayArg> for RejectionDisplay {
    fn from(value: RejectionDisplayArg) -> Self {
        match value {
            RejectionDisplayArg::Suggested => RejectionDisplay::FlagSuggested,
            RejectionDisplayArg::Approved => RejectionDisplay::FlagApproved,
        }
    }
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
