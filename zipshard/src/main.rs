mod application;
mod presentation;

use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use zipshard_core::ShardError;

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ZIPSHARD_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    init_tracing();
    match application::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            if matches!(e, ShardError::WrongPassword | ShardError::PasswordRequired) {
                eprintln!("hint: run again with --password <PASSWORD>");
            }
            ExitCode::FAILURE
        }
    }
}
