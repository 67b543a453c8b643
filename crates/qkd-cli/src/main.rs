//! QKD Command-Line Interface
//!
//! The main entry point for the `qkd` tool: runs BB84 sessions against a
//! registered backend and prints the sifted keys with their error rate.
//!
//! ```text
//! qkd run -n 16                        # one session on the local simulator
//! qkd run -n 4096 --intercept-rate 1   # simulate a full intercept-resend attack
//! qkd run --sessions 8 --format json   # concurrent sessions as JSON reports
//! qkd backends                         # list backends and their availability
//! ```

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use console::style;
use tracing_subscriber::EnvFilter;

mod commands;

use commands::{backends, run, version};

/// QKD - BB84 quantum key distribution over simulated and remote backends
#[derive(Parser)]
#[command(name = "qkd")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file (defaults to ~/.qkd/config.yaml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one or more BB84 sessions
    Run {
        /// Number of qubits per session
        #[arg(short, long)]
        n_bits: Option<usize>,

        /// Backend to use (simulator, auto)
        #[arg(short, long)]
        backend: Option<String>,

        /// Seed for reproducible simulated runs
        #[arg(long)]
        seed: Option<u64>,

        /// Simulated readout bit-flip probability
        #[arg(long)]
        readout_error: Option<f64>,

        /// Fraction of qubits a simulated eavesdropper intercepts
        #[arg(long)]
        intercept_rate: Option<f64>,

        /// QBER above which a key is reported as compromised
        #[arg(long)]
        qber_threshold: Option<f64>,

        /// Deadline for the random draws, in milliseconds
        #[arg(long)]
        draw_timeout_ms: Option<u64>,

        /// Deadline for transmission, in milliseconds
        #[arg(long)]
        transmit_timeout_ms: Option<u64>,

        /// Number of concurrent sessions
        #[arg(short, long, default_value = "1")]
        sessions: usize,

        /// Output format
        #[arg(short, long, value_enum, default_value = "table")]
        format: OutputFormat,
    },

    /// List available backends
    Backends,

    /// Show version information
    Version,
}

/// How session results are printed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging; QKD_LOG takes precedence over -v
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = std::env::var("QKD_LOG").unwrap_or_else(|_| filter.to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();

    // Execute command
    let result = match cli.command {
        Commands::Run {
            n_bits,
            backend,
            seed,
            readout_error,
            intercept_rate,
            qber_threshold,
            draw_timeout_ms,
            transmit_timeout_ms,
            sessions,
            format,
        } => {
            let overrides = run::Overrides {
                n_bits,
                backend,
                seed,
                readout_error,
                intercept_rate,
                qber_threshold,
                draw_timeout_ms,
                transmit_timeout_ms,
            };
            run::execute(cli.config.as_deref(), overrides, sessions, format).await
        }

        Commands::Backends => backends::execute(cli.config.as_deref()).await,

        Commands::Version => {
            version::execute();
            Ok(())
        }
    };

    // Handle errors
    if let Err(e) = result {
        eprintln!("{} {}", style("Error:").red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
