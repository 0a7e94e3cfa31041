use crate::demo::{
    run_calendar, run_dashboard, run_demo, run_import, run_lists, CalendarArgs, DashboardArgs,
    DemoArgs, ImportArgs, ListsArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use licita::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Licita",
    about = "Track public tenders from registration through dispute and qualification",
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
    /// Print the dashboard counters, today's board and the upcoming agenda
    Dashboard(DashboardArgs),
    /// Print the month calendar with openings, returns and legal deadlines
    Calendar(CalendarArgs),
    /// Register tenders from a spreadsheet export or restore a JSON export
    Import(ImportArgs),
    /// Show or edit the option lists used by the registration form
    Lists(ListsArgs),
    /// Run an in-memory walkthrough with sample tenders
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
        Command::Dashboard(args) => run_dashboard(args),
        Command::Calendar(args) => run_calendar(args),
        Command::Import(args) => run_import(args),
        Command::Lists(args) => run_lists(args),
        Command::Demo(args) => run_demo(args),
    }
}
