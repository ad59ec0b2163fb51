use std::process::ExitCode;

use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    // Logs go to stderr; stdout carries the run report.
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    match enroll_fill::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
