//! CI pipeline plumbing.
//!
//! The uploader and run orchestrator report through the [`Pipeline`] trait:
//! log lines, the `link` output and the failed marker. [`GithubActions`]
//! speaks the GitHub Actions workflow-command protocol; [`MemoryPipeline`]
//! records everything for tests.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Sink for pipeline-visible logs, outputs and the failure marker.
pub trait Pipeline: Send + Sync {
    fn info(&self, message: &str);

    fn debug(&self, message: &str);

    fn error(&self, message: &str);

    /// Set a named output. Later calls overwrite earlier ones.
    fn set_output(&self, name: &str, value: &str);

    /// Log `message` as an error and mark the run as failed.
    fn set_failed(&self, message: &str);

    fn is_failed(&self) -> bool;
}

/// GitHub Actions runner protocol.
#[derive(Debug, Default)]
pub struct GithubActions {
    output_file: Option<PathBuf>,
    failed: AtomicBool,
}

impl GithubActions {
    pub fn new(output_file: Option<PathBuf>) -> Self {
        Self {
            output_file,
            failed: AtomicBool::new(false),
        }
    }

    /// Use the output file the runner advertises in `GITHUB_OUTPUT`.
    pub fn from_env() -> Self {
        let output_file = std::env::var_os("GITHUB_OUTPUT")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::new(output_file)
    }

    fn command(name: &str, message: &str) {
        println!("::{}::{}", name, escape_data(message));
    }

    fn append_output(&self, path: &Path, name: &str, value: &str) -> std::io::Result<()> {
        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        if value.contains('\n') || value.contains('\r') {
            let delimiter = output_delimiter(value);
            writeln!(file, "{}<<{}", name, delimiter)?;
            writeln!(file, "{}", value)?;
            writeln!(file, "{}", delimiter)?;
        } else {
            writeln!(file, "{}={}", name, value)?;
        }
        Ok(())
    }
}

impl Pipeline for GithubActions {
    fn info(&self, message: &str) {
        tracing::info!("{}", message);
        println!("{}", message);
    }

    fn debug(&self, message: &str) {
        tracing::debug!("{}", message);
        Self::command("debug", message);
    }

    fn error(&self, message: &str) {
        tracing::error!("{}", message);
        Self::command("error", message);
    }

    fn set_output(&self, name: &str, value: &str) {
        tracing::info!(output = name, value, "Setting pipeline output");
        match &self.output_file {
            Some(path) => {
                if let Err(e) = self.append_output(path, name, value) {
                    tracing::error!(path = %path.display(), error = %e, "Failed to write output file");
                    println!("::set-output name={}::{}", name, escape_data(value));
                }
            }
            None => println!("::set-output name={}::{}", name, escape_data(value)),
        }
    }

    fn set_failed(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        self.error(message);
    }

    fn is_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }
}

/// Escape a workflow command payload so it stays on one line.
fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn output_delimiter(value: &str) -> String {
    let mut delimiter = String::from("ghadelimiter");
    while value.contains(delimiter.as_str()) {
        delimiter.push('_');
    }
    delimiter
}

/// Recorded state of a [`MemoryPipeline`].
#[derive(Debug, Default, Clone)]
pub struct PipelineRecord {
    pub info: Vec<String>,
    pub debug: Vec<String>,
    pub errors: Vec<String>,
    pub outputs: Vec<(String, String)>,
    pub failures: Vec<String>,
}

/// In-memory pipeline, used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryPipeline {
    record: Mutex<PipelineRecord>,
}

impl MemoryPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_record<T>(&self, f: impl FnOnce(&mut PipelineRecord) -> T) -> T {
        // A poisoned lock only means a test panicked mid-write; keep the data.
        let mut guard = match self.record.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut guard)
    }

    pub fn snapshot(&self) -> PipelineRecord {
        self.with_record(|r| r.clone())
    }

    /// Current value of output `name` (last writer wins).
    pub fn output(&self, name: &str) -> Option<String> {
        self.with_record(|r| {
            r.outputs
                .iter()
                .rev()
                .find(|(n, _)| n == name)
                .map(|(_, v)| v.clone())
        })
    }

    /// Message of the most recent failure, which is what the run reports.
    pub fn last_failure(&self) -> Option<String> {
        self.with_record(|r| r.failures.last().cloned())
    }
}

impl Pipeline for MemoryPipeline {
    fn info(&self, message: &str) {
        self.with_record(|r| r.info.push(message.to_string()));
    }

    fn debug(&self, message: &str) {
        self.with_record(|r| r.debug.push(message.to_string()));
    }

    fn error(&self, message: &str) {
        self.with_record(|r| r.errors.push(message.to_string()));
    }

    fn set_output(&self, name: &str, value: &str) {
        self.with_record(|r| r.outputs.push((name.to_string(), value.to_string())));
    }

    fn set_failed(&self, message: &str) {
        self.with_record(|r| {
            r.errors.push(message.to_string());
            r.failures.push(message.to_string());
        });
    }

    fn is_failed(&self) -> bool {
        self.with_record(|r| !r.failures.is_empty())
    }
}
