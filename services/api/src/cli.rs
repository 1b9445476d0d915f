use crate::demo::{run_demo, run_job_once, DemoArgs, JobRunArgs};
use crate::routes::schedule_entries;
use crate::server;
use clap::{Args, Parser, Subcommand};
use campus_flow::config::WorkflowConfig;
use campus_flow::error::AppError;
use chrono::Utc;

#[derive(Parser, Debug)]
#[command(
    name = "Campus Flow",
    about = "Run the school workflow service and its scheduled jobs from the command line",
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
    /// Inspect or trigger the scheduled jobs
    Jobs {
        #[command(subcommand)]
        command: JobsCommand,
    },
    /// Walk a demo school through linking, enrollment, payment and promotion
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum JobsCommand {
    /// Print every job with its schedule and next fire time
    Schedule,
    /// Run one job immediately against the demo school
    Run(JobRunArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// Start without the background job timers
    #[arg(long)]
    pub(crate) no_scheduler: bool,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Jobs {
            command: JobsCommand::Schedule,
        } => {
            print_schedule();
            Ok(())
        }
        Command::Jobs {
            command: JobsCommand::Run(args),
        } => run_job_once(args),
        Command::Demo(args) => run_demo(args),
    }
}

fn print_schedule() {
    let workflows = crate::demo::demo_workflows(&WorkflowConfig::default());
    println!("{:<28} {:<28} next run", "job", "schedule");
    for entry in schedule_entries(&workflows.jobs, Utc::now()) {
        println!(
            "{:<28} {:<28} {}",
            entry.job,
            entry.schedule,
            entry.next_run.format("%Y-%m-%d %H:%M UTC")
        );
    }
}
