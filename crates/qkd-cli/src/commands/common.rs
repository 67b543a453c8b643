//! Shared helpers for CLI commands.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use console::style;
use serde::Serialize;
use uuid::Uuid;

use qkd_adapter_sim::SimulatorBackend;
use qkd_core::{Config, FailureKind, SessionFailure, SessionResult, Stage};
use qkd_hal::registry::least_busy;
use qkd_hal::{Backend, BackendRegistry};
use qkd_ir::{Basis, Bit};

/// Backend name that selects the least busy registered backend.
pub const AUTO_BACKEND: &str = "auto";

/// Registry with every backend this build knows how to construct.
pub fn build_registry() -> BackendRegistry {
    let mut registry = BackendRegistry::new();
    registry.register::<SimulatorBackend>("simulator");
    registry
}

/// Resolve user-facing aliases to registered backend names.
pub fn canonical_backend(name: &str) -> String {
    match name.to_lowercase().as_str() {
        "sim" | "local" => "simulator".to_string(),
        other => other.to_string(),
    }
}

/// Load the configuration file (if any) and apply `QKD_*` overrides.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    Config::load(path).with_context(|| match path {
        Some(p) => format!("Failed to load configuration from {}", p.display()),
        None => "Failed to load configuration".to_string(),
    })
}

/// Construct the backend the configuration selects.
///
/// `auto` creates every registered backend and keeps the one with the
/// shortest queue.
pub async fn connect(registry: &BackendRegistry, config: &Config) -> Result<Arc<dyn Backend>> {
    let name = canonical_backend(&config.backend.name);

    if name == AUTO_BACKEND {
        let mut candidates = Vec::new();
        for registered in registry.available_backends() {
            let mut backend_config = config.backend_config();
            backend_config.name = registered.clone();
            candidates.push(registry.create_shared(&registered, backend_config)?);
        }
        return Ok(least_busy(&candidates).await?);
    }

    if !registry.has_backend(&name) {
        anyhow::bail!(
            "Unknown backend: '{name}'. Available: {}, {AUTO_BACKEND}",
            registry.available_backends().join(", ")
        );
    }

    let mut backend_config = config.backend_config();
    backend_config.name = name.clone();
    Ok(registry.create_shared(&name, backend_config)?)
}

/// Serializable description of a failed session.
#[derive(Debug, Serialize)]
pub struct FailureReport {
    pub session_id: Uuid,
    pub stage: Stage,
    pub kind: FailureKind,
    pub error: String,
}

impl From<&SessionFailure> for FailureReport {
    fn from(failure: &SessionFailure) -> Self {
        Self {
            session_id: failure.session_id,
            stage: failure.stage,
            kind: failure.kind(),
            error: failure.error.to_string(),
        }
    }
}

/// Render a bit stream as `[0, 1, 1, 0]`.
pub fn format_bits(bits: &[Bit]) -> String {
    let items: Vec<String> = bits.iter().map(|b| b.as_u8().to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Render a basis stream as `[Z, X, X, Z]`.
pub fn format_bases(bases: &[Basis]) -> String {
    let items: Vec<String> = bases.iter().map(|b| b.symbol().to_string()).collect();
    format!("[{}]", items.join(", "))
}

/// Print a completed session in human-readable form.
pub fn print_session(result: &SessionResult, threshold: f64) {
    let analysis = result.analysis();

    println!(
        "{} Session {}",
        style("●").cyan(),
        style(result.session_id()).bold()
    );
    println!();
    println!("Initial values:");
    println!("  Alice's bits:  {}", format_bits(result.sender_bits()));
    println!("  Alice's bases: {}", format_bases(result.sender_bases()));
    println!("  Bob's bases:   {}", format_bases(result.receiver_bases()));
    println!("  Bob's results: {}", format_bits(result.receiver_outcomes()));
    println!();
    println!("Generated keys:");
    println!("  Alice's key:   {}", format_bits(result.sender_key()));
    println!("  Bob's key:     {}", format_bits(result.receiver_key()));
    println!();
    println!(
        "QBER: {} / {} = {}",
        analysis.mismatches, analysis.sifted_len, analysis.qber
    );
    println!("Key Rate: {:.2}%", analysis.key_rate * 100.0);
    println!();

    if analysis.keys_match() {
        println!("{} Success: Keys match!", style("✓").green().bold());
    } else {
        println!("{} Warning: Keys do not match", style("!").yellow().bold());
        let sender_key = result.sender_key();
        let receiver_key = result.receiver_key();
        for &i in &analysis.mismatch_positions {
            println!(
                "  Position {i}: Alice has {}, Bob has {}",
                sender_key[i].as_u8(),
                receiver_key[i].as_u8()
            );
        }
        println!("  Quantum Bit Error Rate (QBER): {}", analysis.qber);
    }

    if analysis.exceeds(threshold) {
        println!(
            "{} QBER exceeds {:.2}%: possible eavesdropping, discard this key",
            style("!").red().bold(),
            threshold * 100.0
        );
    }

    println!();
    println!(
        "Channel: {}  Job ID: {}",
        style(result.channel()).yellow(),
        style(result.job_id()).dim()
    );
}

/// Print a failed session in human-readable form.
pub fn print_failure(failure: &SessionFailure) {
    eprintln!(
        "{} Session {} failed during {} ({}): {}",
        style("✗").red().bold(),
        failure.session_id,
        failure.stage,
        failure.kind(),
        failure.error
    );
}
