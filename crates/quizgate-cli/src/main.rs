//! quizgate CLI: validate, score, and review quiz data from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use quizgate_core::config::{load_config_from, QuizgateConfig};
use quizgate_core::model::Difficulty;

mod commands;

#[derive(Parser)]
#[command(name = "quizgate", version, about = "Quiz data validation and question quality review")]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate JSON records against a named schema
    Validate {
        /// Schema name (e.g. "User", "CreateQuestion")
        #[arg(long)]
        schema: String,

        /// JSON file holding one object or an array of objects
        #[arg(long)]
        input: PathBuf,
    },

    /// Print the quality score of question records
    Score {
        /// JSON file holding one question or an array of questions
        #[arg(long)]
        input: PathBuf,
    },

    /// Run the staged review over generated questions
    Review {
        /// JSON file holding one generated question or an array of them
        #[arg(long)]
        input: PathBuf,

        /// Text the questions were generated from
        #[arg(long)]
        source: Option<PathBuf>,

        /// Difficulty to assign, overriding the input (easy, medium, hard)
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List registered schemas and their fields
    Schemas {
        /// Show a single schema
        #[arg(long)]
        name: Option<String>,
    },

    /// Create a starter config and sample questions
    Init,
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config_from(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    init_tracing(&config);
    tracing::debug!(?config, "config loaded");

    let result = match cli.command {
        Commands::Validate { schema, input } => commands::validate::execute(schema, input),
        Commands::Score { input } => commands::score::execute(input),
        Commands::Review {
            input,
            source,
            difficulty,
            format,
        } => commands::review::execute(input, source, difficulty, format, &config),
        Commands::Schemas { name } => commands::schemas::execute(name),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing(config: &QuizgateConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_filter))
        .unwrap_or_else(|_| EnvFilter::new("quizgate=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
