mod commands;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// AI risk self-assessment engine.
#[derive(Parser)]
#[command(name = "riskmap", version, about = "AI risk self-assessment engine")]
struct Cli {
    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full assessment for one session: flags, facts, prefill,
    /// relevant risks, tier and controls
    Assess {
        /// Directory holding the configuration documents
        #[arg(long)]
        config: PathBuf,
        /// Session file (inventory data, repeat blocks, answers, selections)
        #[arg(long)]
        session: PathBuf,
    },

    /// Show what routing would prefill for a session, with reasons
    Prefill {
        /// Directory holding the configuration documents
        #[arg(long)]
        config: PathBuf,
        /// Session file
        #[arg(long)]
        session: PathBuf,
    },

    /// Resolve intake form step visibility and requiredness for a session
    Form {
        /// Directory holding the configuration documents
        #[arg(long)]
        config: PathBuf,
        /// Session file
        #[arg(long)]
        session: PathBuf,
    },

    /// Run static analysis checks on a configuration directory
    Check {
        /// Directory holding the configuration documents
        #[arg(long)]
        config: PathBuf,
        /// Comma-separated list of analyses to run (fact_order,references,inert). Default: all.
        #[arg(long)]
        analysis: Option<String>,
        /// Exit non-zero on warnings as well as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Assess { config, session } => {
            commands::assess::cmd_assess(&config, &session, cli.output, cli.quiet);
        }
        Commands::Prefill { config, session } => {
            commands::prefill::cmd_prefill(&config, &session, cli.output, cli.quiet);
        }
        Commands::Form { config, session } => {
            commands::form::cmd_form(&config, &session, cli.output, cli.quiet);
        }
        Commands::Check {
            config,
            analysis,
            strict,
        } => {
            commands::check::cmd_check(&config, analysis.as_deref(), strict, cli.output, cli.quiet);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` (default `warn`).
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub(crate) fn report_error(msg: &str, output: OutputFormat, quiet: bool) {
    if quiet {
        return;
    }
    match output {
        OutputFormat::Text => eprintln!("error: {}", msg),
        OutputFormat::Json => eprintln!("{}", serde_json::json!({ "error": msg })),
    }
}

/// Report and exit 1.
pub(crate) fn fail(msg: &str, output: OutputFormat, quiet: bool) -> ! {
    report_error(msg, output, quiet);
    process::exit(1);
}
