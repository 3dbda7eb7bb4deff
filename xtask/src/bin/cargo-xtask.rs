use std::env;
use std::path::Path;
use std::process::{exit, Command};

/// Lets the tasks run as `cargo xtask <cmd>` instead of
/// `cargo run --manifest-path xtask/Cargo.toml -- <cmd>`.
fn main() {
    // cargo invokes us as `cargo-xtask xtask <args...>`
    let args: Vec<String> = env::args()
        .skip_while(|arg| arg != "xtask")
        .skip(1)
        .collect();

    if args.is_empty() {
        eprintln!("usage: cargo xtask <generate-docs|check|test|clippy|fmt-check|bench>");
    }

    let cargo = env::var("CARGO").unwrap_or_else(|_| "cargo".to_string());
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR")).join("Cargo.toml");

    let status = Command::new(&cargo)
        .args(["run", "--quiet", "--bin", "xtask", "--manifest-path"])
        .arg(&manifest)
        .arg("--")
        .args(&args)
        .status();

    match status {
        Ok(status) => exit(status.code().unwrap_or(1)),
        Err(e) => {
            eprintln!("failed to run xtask: {e}");
            exit(1);
        }
    }
}
