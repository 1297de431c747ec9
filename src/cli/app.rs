//! Main CLI application structure

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use super::output::{Output, OutputFormat};
use super::{parse_date, ranking, task};
use crate::domain::Strategy;
use crate::storage::{Config, Project};

#[derive(Parser)]
#[command(name = "rank")]
#[command(author, version, about = "Multi-factor task prioritization")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format (defaults to the global config, then text)
    #[arg(long, short = 'f', global = true)]
    pub format: Option<OutputFormat>,

    /// Enable verbose output for debugging
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new rank project
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: String,
    },

    /// Rank a batch of tasks from a JSON request
    ///
    /// The request looks like `{"strategy": "deadline", "tasks": [...]}`.
    /// Reads from stdin when INPUT is omitted or `-`.
    Analyze {
        /// Request file
        input: Option<PathBuf>,

        /// Strategy to use, overriding the request
        #[arg(long, short, value_parser = parse_strategy)]
        strategy: Option<Strategy>,

        /// Reference date for urgency (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,

        /// Show each term's contribution to the score
        #[arg(long)]
        explain: bool,
    },

    /// Rank the project's tasks
    Prioritize {
        /// Strategy to use (defaults to the project config)
        #[arg(long, short, value_parser = parse_strategy)]
        strategy: Option<Strategy>,

        /// Reference date for urgency (YYYY-MM-DD, defaults to today)
        #[arg(long, value_parser = parse_date)]
        today: Option<NaiveDate>,

        /// Show at most this many tasks
        #[arg(long, short = 'n')]
        limit: Option<usize>,

        /// Show each term's contribution to the score
        #[arg(long)]
        explain: bool,
    },

    /// List scoring strategies and their weights
    Strategies,

    /// Manage tasks
    #[command(subcommand)]
    Task(task::TaskCommands),
}

fn parse_strategy(s: &str) -> Result<Strategy, String> {
    s.parse().map_err(|e: crate::domain::UnknownStrategy| e.to_string())
}

fn local_today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Main entry point for the CLI
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let format = match cli.format {
        Some(format) => format,
        None => Config::load()
            .map(|config| OutputFormat::from(config.global.default_format))
            .unwrap_or_default(),
    };
    let output = Output::new(format, cli.verbose);

    output.verbose("rank starting");

    match cli.command {
        Commands::Init { path } => {
            output.verbose_ctx("init", &format!("Initializing project at: {}", path));
            let project = Project::init(&path)?;
            output.verbose_ctx("init", &format!("Created .rank directory at: {}", project.rank_dir().display()));
            output.success(&format!("Initialized rank project at {}", project.root().display()));
        }

        Commands::Analyze { input, strategy, today, explain } => {
            let today = today.unwrap_or_else(local_today);
            output.verbose_ctx("analyze", &format!("Input: {:?}, strategy: {:?}, today: {}", input, strategy, today));
            ranking::analyze(&output, input.as_deref(), strategy, today, explain)?
        }

        Commands::Prioritize { strategy, today, limit, explain } => {
            let today = today.unwrap_or_else(local_today);
            output.verbose_ctx("prioritize", &format!("Strategy: {:?}, today: {}, limit: {:?}", strategy, today, limit));
            ranking::prioritize(&output, strategy, today, limit, explain)?
        }

        Commands::Strategies => ranking::strategies(&output)?,

        Commands::Task(cmd) => task::run(cmd, &output)?,
    }

    output.verbose("Command completed successfully");
    Ok(())
}
