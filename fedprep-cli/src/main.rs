use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod config;
mod input;
mod output;

#[derive(Parser)]
#[command(name = "fedprep")]
#[command(about = "Prepare tabular data for homomorphic computation")]
#[command(version)]
struct Cli {
    /// Output format
    #[arg(long, global = true)]
    json: bool,

    /// FHE backend: "tfhe" (default), "mock" (testing only)
    #[arg(long, global = true, env = "FEDPREP_BACKEND")]
    backend: Option<String>,

    /// Worker threads for cell encryption
    #[arg(long, global = true)]
    threads: Option<usize>,

    /// Config file (defaults to the platform config directory)
    #[arg(long, global = true, env = "FEDPREP_CONFIG")]
    config: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable debug instrumentation (timing, detailed logs)
    #[arg(long, global = true, env = "FEDPREP_DEBUG")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that a CSV table can be encoded
    Validate(commands::validate::ValidateArgs),
    /// Encrypt a CSV table into a submission
    Encrypt(commands::encrypt::EncryptArgs),
    /// Describe a submission without decrypting it
    Inspect(commands::inspect::InspectArgs),
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigCommand,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.debug {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fedprep=debug,fedprep_core=debug"))
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("fedprep=warn,fedprep_core=warn"))
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_timer(fmt::time::uptime())
        .init();

    let ctx = commands::Context {
        json_output: cli.json,
        backend_override: cli.backend,
        threads_override: cli.threads,
        config_path: cli.config.map(Into::into),
        verbose: cli.verbose,
    };

    match cli.command {
        Commands::Validate(args) => commands::validate::run(args, &ctx),
        Commands::Encrypt(args) => commands::encrypt::run(args, &ctx),
        Commands::Inspect(args) => commands::inspect::run(args, &ctx),
        Commands::Config { action } => commands::config::run(action, &ctx),
    }
}
