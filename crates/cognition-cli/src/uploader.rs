//! Per-file upload and reporting.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cognition_api_client::{CognitionClient, UploadOutcome, UploadStatus};
use cognition_core::{DeployError, Pipeline, UploadFailure};

/// Name of the output slot holding the last public link.
pub const LINK_OUTPUT: &str = "link";

/// Uploads a single discovered file.
///
/// Rejections by the service are reported to the pipeline and are not
/// errors. An `Err` aborts the whole run.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<(), DeployError>;
}

/// Uploads through [`CognitionClient`] and reports each outcome to a [`Pipeline`].
pub struct ExperimentUploader<P: Pipeline> {
    client: CognitionClient,
    pipeline: Arc<P>,
}

impl<P: Pipeline> ExperimentUploader<P> {
    pub fn new(client: CognitionClient, pipeline: Arc<P>) -> Self {
        Self { client, pipeline }
    }
}

#[async_trait]
impl<P: Pipeline> Uploader for ExperimentUploader<P> {
    async fn upload(&self, path: &Path) -> Result<(), DeployError> {
        self.pipeline
            .debug(&format!("Uploading {} to Cognition.", path.display()));

        let outcome = self.client.upload_file(path).await?;
        report_outcome(&outcome, self.pipeline.as_ref());
        Ok(())
    }
}

/// Report one finished upload: the `link` output on success, or an error,
/// a debug line and the failed marker on rejection.
pub fn report_outcome(outcome: &UploadOutcome, pipeline: &dyn Pipeline) {
    if !outcome.body.is_empty() {
        pipeline.debug(&format!("Body: {}", outcome.body));
    }

    match outcome.classify() {
        UploadStatus::Success { public_link } => {
            if let Some(link) = public_link {
                pipeline.set_output(LINK_OUTPUT, &link);
            }
            pipeline.info(&format!(
                "{} successfully uploaded to Cognition.",
                outcome.path
            ));
        }
        UploadStatus::Failed(failure) => {
            tracing::warn!(
                path = %outcome.path,
                status = outcome.status,
                failure = ?failure,
                "Upload rejected"
            );
            pipeline.error(&failure.message(&outcome.path));
            pipeline.debug(&outcome.describe_failure());
            pipeline.set_failed(&UploadFailure::summary(&outcome.path));
        }
    }
}
