//! Run command implementation.

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use qkd_core::{Config, ProtocolOrchestrator, SessionSources};
use qkd_hal::{BackendBitSource, BackendChannel};

use super::common::{
    FailureReport, build_registry, connect, load_config, print_failure, print_session,
};
use crate::OutputFormat;

/// Command-line values that take precedence over file and environment.
#[derive(Debug, Default)]
pub struct Overrides {
    pub n_bits: Option<usize>,
    pub backend: Option<String>,
    pub seed: Option<u64>,
    pub readout_error: Option<f64>,
    pub intercept_rate: Option<f64>,
    pub qber_threshold: Option<f64>,
    pub draw_timeout_ms: Option<u64>,
    pub transmit_timeout_ms: Option<u64>,
}

impl Overrides {
    /// Apply every value that was given on the command line.
    pub fn apply(self, mut config: Config) -> Result<Config> {
        if let Some(n) = self.n_bits {
            config.session.n_bits = n;
        }
        if let Some(name) = self.backend {
            config.backend.name = name;
        }
        if let Some(seed) = self.seed {
            config.backend.seed = Some(seed);
        }
        if let Some(p) = self.readout_error {
            config.backend.readout_error = p;
        }
        if let Some(p) = self.intercept_rate {
            config.backend.intercept_rate = p;
        }
        if let Some(t) = self.qber_threshold {
            config.session.qber_threshold = t;
        }
        if let Some(ms) = self.draw_timeout_ms {
            config.session.draw_timeout_ms = Some(ms);
        }
        if let Some(ms) = self.transmit_timeout_ms {
            config.session.transmit_timeout_ms = Some(ms);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Execute the run command.
pub async fn execute(
    config_path: Option<&Path>,
    overrides: Overrides,
    sessions: usize,
    format: OutputFormat,
) -> Result<()> {
    if sessions == 0 {
        anyhow::bail!("--sessions must be at least 1");
    }

    let config = overrides.apply(load_config(config_path)?)?;
    let table = format == OutputFormat::Table;

    if table {
        println!(
            "{} Running BB84 on {} ({} qubits, {} session{})",
            style("→").cyan().bold(),
            style(&config.backend.name).yellow(),
            config.session.n_bits,
            sessions,
            if sessions == 1 { "" } else { "s" }
        );
    }

    let registry = build_registry();
    let backend = connect(&registry, &config).await?;
    info!("Using backend {}", backend.name());

    let avail = backend.availability().await?;
    if !avail.is_available {
        anyhow::bail!(
            "Backend '{}' is not available: {}",
            backend.name(),
            avail.status_message.unwrap_or_default()
        );
    }

    let policy = config.wait_policy();
    let source = BackendBitSource::new(Arc::clone(&backend)).with_wait_policy(policy);
    let channel = BackendChannel::new(backend).with_wait_policy(policy);
    let orchestrator = ProtocolOrchestrator::new(
        SessionSources::shared(Arc::new(source)),
        Arc::new(channel),
        config.session_config(),
    );

    let spinner = table.then(|| {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message("Exchanging qubits...");
        spinner.enable_steady_tick(std::time::Duration::from_millis(100));
        spinner
    });

    let outcomes = if sessions == 1 {
        vec![orchestrator.run().await]
    } else {
        orchestrator.run_many(sessions).await
    };

    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    let threshold = config.session.qber_threshold;
    let failed = outcomes.iter().filter(|o| o.is_err()).count();

    match format {
        OutputFormat::Table => {
            for (i, outcome) in outcomes.iter().enumerate() {
                if i > 0 {
                    println!("\n{}\n", style("─".repeat(60)).dim());
                }
                match outcome {
                    Ok(result) => print_session(result, threshold),
                    Err(failure) => print_failure(failure),
                }
            }
        }
        OutputFormat::Json => {
            let mut values = Vec::with_capacity(outcomes.len());
            for outcome in &outcomes {
                values.push(match outcome {
                    Ok(result) => serde_json::to_value(result.report(threshold))?,
                    Err(failure) => serde_json::to_value(FailureReport::from(failure))?,
                });
            }
            let json = if values.len() == 1 {
                serde_json::to_string_pretty(&values[0])?
            } else {
                serde_json::to_string_pretty(&values)?
            };
            println!("{json}");
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {sessions} session(s) failed");
    }

    Ok(())
}
