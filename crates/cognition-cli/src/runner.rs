//! Run orchestration.
//!
//! The first discovered file is uploaded on its own, unfiltered. The service
//! creates the task for the repository from that upload, so after it we wait
//! [`FIRST_UPLOAD_SETTLE`] before sending the remaining qualifying files, one
//! at a time, in discovery order.

use std::path::PathBuf;
use std::time::Duration;

use cognition_core::{is_qualifying_file, DeployError, Pipeline};
use futures::{Stream, StreamExt};

use crate::uploader::Uploader;

/// Pause after the first upload so the service can finish creating the task.
pub const FIRST_UPLOAD_SETTLE: Duration = Duration::from_millis(1000);

/// Counts for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeploySummary {
    /// Upload requests completed, including rejected ones.
    pub uploaded: usize,
    /// Discovered files skipped by the classifier or ignore list.
    pub skipped: usize,
}

/// Upload every file from `files`, stopping at the first error.
pub async fn deploy<S, U>(files: S, uploader: &U) -> Result<DeploySummary, DeployError>
where
    S: Stream<Item = Result<PathBuf, DeployError>>,
    U: Uploader + ?Sized,
{
    let mut files = std::pin::pin!(files);
    let mut summary = DeploySummary::default();

    let first = files.next().await.ok_or(DeployError::NoFiles)??;
    uploader.upload(&first).await?;
    summary.uploaded += 1;

    tokio::time::sleep(FIRST_UPLOAD_SETTLE).await;

    while let Some(file) = files.next().await {
        let file = file?;
        if !is_qualifying_file(&file) {
            tracing::debug!(path = %file.display(), "Skipping file");
            summary.skipped += 1;
            continue;
        }

        uploader.upload(&file).await?;
        summary.uploaded += 1;
    }

    Ok(summary)
}

/// Top-level entry: run [`deploy`] and turn any error into a single pipeline failure.
pub async fn run<S, U, P>(files: S, uploader: &U, pipeline: &P) -> Option<DeploySummary>
where
    S: Stream<Item = Result<PathBuf, DeployError>>,
    U: Uploader + ?Sized,
    P: Pipeline + ?Sized,
{
    match deploy(files, uploader).await {
        Ok(summary) => {
            tracing::info!(
                uploaded = summary.uploaded,
                skipped = summary.skipped,
                "Deployment finished"
            );
            Some(summary)
        }
        Err(e) => {
            tracing::error!(error = %e, "Deployment aborted");
            pipeline.set_failed(&e.to_string());
            None
        }
    }
}
