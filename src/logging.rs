//! Tracing setup for hosts embedding the session core.

use std::fs::File;
use std::path::Path;
use tracing_subscriber::prelude::*;

/// Install a subscriber based on the environment.
///
/// `MEDESENSE_LOG=<path>` writes `medesense=debug` logs to that file.
/// Otherwise `RUST_LOG` enables stderr logging with its filter. With neither
/// set nothing is installed. Safe to call more than once.
pub fn init() {
    if let Ok(path) = std::env::var("MEDESENSE_LOG") {
        if let Err(err) = init_file(Path::new(&path)) {
            eprintln!("Failed to create log file {path}: {err}");
        }
    } else if std::env::var("RUST_LOG").is_ok() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    }
}

fn init_file(path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(file)
        .with_ansi(false);
    let filter = tracing_subscriber::EnvFilter::new("medesense=debug");
    let _ = tracing_subscriber::registry()
        .with(file_layer.with_filter(filter))
        .try_init();
    Ok(())
}
