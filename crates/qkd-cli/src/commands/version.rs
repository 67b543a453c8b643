//! Version command implementation.

use console::style;

/// Execute the version command.
pub fn execute() {
    let version = env!("CARGO_PKG_VERSION");

    println!(
        "{} {} - BB84 quantum key distribution",
        style("QKD").cyan().bold(),
        style(format!("v{version}")).yellow()
    );
    println!();
    println!("Components:");
    println!("  qkd-ir           Qubit encoding and single-qubit programs");
    println!("  qkd-hal          Backends, random-bit sources and channels");
    println!("  qkd-core         Sifting, QBER analysis and session orchestration");
    println!("  qkd-adapter-sim  Local statevector simulator");
    println!("  qkd-cli          Command-line interface");
    println!();
    println!(
        "Repository: {}",
        style("https://github.com/qkd-rs/qkd").underlined()
    );
    println!("License:    {}", style("Apache-2.0").dim());
}
