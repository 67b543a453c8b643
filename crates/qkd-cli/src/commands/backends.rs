//! Backends command implementation.

use std::path::Path;

use anyhow::Result;
use console::style;

use super::common::{AUTO_BACKEND, build_registry, load_config};

/// Execute the backends command.
pub async fn execute(config_path: Option<&Path>) -> Result<()> {
    let config = load_config(config_path)?;
    let registry = build_registry();

    println!("{} Available backends:\n", style("QKD").cyan().bold());

    for name in registry.available_backends() {
        let mut backend_config = config.backend_config();
        backend_config.name = name.clone();

        let backend = match registry.create(&name, backend_config) {
            Ok(b) => b,
            Err(e) => {
                println!("  {} {} ({e})", style("○").dim(), style(&name).dim());
                println!();
                continue;
            }
        };

        let caps = backend.capabilities();
        let avail = backend.availability().await?;

        println!(
            "  {} {} {}",
            if avail.is_available {
                style("●").green()
            } else {
                style("○").red()
            },
            style(&name).bold(),
            if caps.is_simulator { "(local)" } else { "" }
        );
        println!("    Max batch: {}", caps.max_batch);
        println!("    Gates: {}", caps.native_gates.join(", "));
        if let Some(depth) = avail.queue_depth {
            println!("    Queue depth: {depth}");
        }
        if let Some(noise) = &caps.noise_profile {
            println!(
                "    Noise: readout {:.2}%, intercept {:.2}% (expected QBER {:.2}%)",
                noise.readout_error.unwrap_or(0.0) * 100.0,
                noise.intercept_rate.unwrap_or(0.0) * 100.0,
                noise.expected_qber() * 100.0
            );
        }
        if let Some(message) = avail.status_message {
            println!("    Status: {message}");
        }
        println!();
    }

    println!(
        "Use {} to pick the least busy backend.",
        style(format!("--backend {AUTO_BACKEND}")).cyan()
    );

    Ok(())
}
