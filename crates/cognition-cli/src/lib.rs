//! Cognition deploy step: discover experiment files and upload them one at a time.

pub mod discovery;
pub mod runner;
pub mod uploader;

pub use discovery::discover;
pub use runner::{deploy, run, DeploySummary, FIRST_UPLOAD_SETTLE};
pub use uploader::{report_outcome, ExperimentUploader, Uploader};

/// Initialize tracing for the CLI binary.
///
/// Logs go to stderr; stdout carries workflow commands for the runner.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
