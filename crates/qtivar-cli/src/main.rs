//! qtivar CLI — inspect response declarations and recovery payloads.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "qtivar",
    version,
    about = "QTI response variable encoder, decoder and status inspector"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a declarations file
    Validate {
        /// Path to the declarations TOML file
        #[arg(long)]
        declarations: PathBuf,
    },

    /// Assign a response and print its wire element
    Encode {
        /// Path to the declarations TOML file
        #[arg(long)]
        declarations: PathBuf,

        /// Item identifier
        #[arg(long)]
        item: String,

        /// Response identifier within the item
        #[arg(long)]
        response: String,

        /// Literal value; repeat for multiple/ordered responses
        #[arg(long = "value")]
        values: Vec<String>,

        /// Interaction state in the state notation
        #[arg(long)]
        state: Option<String>,
    },

    /// Restore a recovery payload and show the variables it sets
    Decode {
        /// Path to the declarations TOML file
        #[arg(long)]
        declarations: PathBuf,

        /// Recovery payload (a <responses> document or a single <response>)
        #[arg(long)]
        input: PathBuf,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Show attempted/completed status per item and response
    Status {
        /// Path to the declarations TOML file
        #[arg(long)]
        declarations: PathBuf,

        /// Recovery payload to restore first
        #[arg(long)]
        input: Option<PathBuf>,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Create a starter config and example declarations
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("qtivar=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = cli.config;

    let result = match cli.command {
        Commands::Validate { declarations } => commands::validate::execute(declarations, config),
        Commands::Encode {
            declarations,
            item,
            response,
            values,
            state,
        } => commands::encode::execute(declarations, item, response, values, state, config),
        Commands::Decode {
            declarations,
            input,
            format,
        } => commands::decode::execute(declarations, input, format, config),
        Commands::Status {
            declarations,
            input,
            format,
        } => commands::status::execute(declarations, input, format, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
