// Headless entry point: sovereign-entry [signals.json]
// Signals are read from the file, or from stdin when no path is given.

use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let level = if cfg!(debug_assertions) {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let path = std::env::args().nth(1).map(PathBuf::from);
    let data_dir = std::env::var_os("SOVEREIGN_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    if let Err(e) = sovereign_entry_lib::headless::run(path, data_dir).await {
        eprintln!("sovereign-entry: {}", e);
        std::process::exit(1);
    }
}
