use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, prelude::*};

mod advisors;
mod commands;
mod config;
mod output;
mod state;
mod time;

use commands::Ctx;

#[derive(Parser, Debug)]
#[command(
    name = "triage",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("TRIAGE_BUILD_SHA"), ")"),
    about = "Rank tasks by urgency, importance, effort and what they unblock"
)]
struct Cli {
    /// User whose weights and feedback to use (default: [defaults].user)
    #[arg(long, global = true)]
    user: Option<String>,

    /// Debug logging on stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Task batch (.json or .csv)
    #[arg(long, short)]
    pub file: PathBuf,

    /// Preset: smart_balance, fastest_wins, high_impact, deadline_driven
    #[arg(long)]
    pub strategy: Option<String>,

    /// Custom weights "urgency,importance,effort,blocking" (must sum to 1.0)
    #[arg(long)]
    pub weights: Option<String>,

    /// Skip business-day deadlines for corporate tasks
    #[arg(long)]
    pub no_weekends: bool,

    /// Skip the LLM advisory
    #[arg(long)]
    pub offline: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Order {
    #[default]
    Priority,
    /// Never list a task before one of its dependencies
    Dependency,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score and rank every task in a batch
    Analyze {
        #[command(flatten)]
        args: AnalyzeArgs,

        #[arg(long, value_enum, default_value_t = Order::Priority)]
        order: Order,
    },

    /// Show the top N tasks
    Suggest {
        #[command(flatten)]
        args: AnalyzeArgs,

        #[arg(short = 'n', long, default_value_t = 3)]
        count: usize,
    },

    /// Sort tasks into the Eisenhower matrix
    Matrix {
        #[command(flatten)]
        args: AnalyzeArgs,
    },

    /// Show, set or reset stored weights
    Weights {
        #[command(subcommand)]
        command: WeightsCommand,
    },

    /// Rate a suggestion from the last analysis
    Feedback {
        #[arg(long)]
        task_id: String,

        #[arg(long, conflicts_with = "not_helpful", required_unless_present = "not_helpful")]
        helpful: bool,

        #[arg(long)]
        not_helpful: bool,

        #[arg(long)]
        comment: Option<String>,
    },

    /// Adjust weights from recorded feedback
    Learn {
        /// Heuristic only
        #[arg(long)]
        offline: bool,

        /// Print the outcome without saving it
        #[arg(long)]
        dry_run: bool,
    },

    /// Manage ~/.triage/config.toml
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum WeightsCommand {
    /// Print the weights analyses will use
    Show,
    /// Store custom weights
    Set {
        urgency: f64,
        importance: f64,
        effort: f64,
        blocking: f64,
    },
    /// Forget custom weights and go back to the preset
    Reset,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_filter(env_filter),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let home = state::ensure_triage_home()?;
    let ctx = Ctx::load(home, cli.user)?;

    match cli.command {
        Command::Analyze { args, order } => commands::analyze(&ctx, &args, order)?,
        Command::Suggest { args, count } => commands::suggest(&ctx, &args, count)?,
        Command::Matrix { args } => commands::matrix(&ctx, &args)?,

        Command::Weights { command } => match command {
            WeightsCommand::Show => commands::weights_show(&ctx)?,
            WeightsCommand::Set {
                urgency,
                importance,
                effort,
                blocking,
            } => commands::weights_set(&ctx, urgency, importance, effort, blocking)?,
            WeightsCommand::Reset => commands::weights_reset(&ctx)?,
        },

        Command::Feedback {
            task_id,
            helpful,
            not_helpful,
            comment,
        } => commands::feedback(&ctx, &task_id, helpful && !not_helpful, comment)?,

        Command::Learn { offline, dry_run } => commands::learn(&ctx, offline, dry_run)?,

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&ctx.home)?,
            ConfigCommand::Show => commands::config_show(&ctx)?,
        },
    }

    Ok(())
}
