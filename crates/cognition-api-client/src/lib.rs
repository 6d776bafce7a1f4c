//! HTTP client for the Cognition experiment hosting API.
//!
//! One call uploads one file as `multipart/form-data` to
//! `{endpoint}/{repository}` with a Bearer token, and returns the raw
//! status and body as an [`UploadOutcome`]. Interpreting the outcome is left
//! to the caller (see [`UploadOutcome::classify`]).

pub mod outcome;

use std::path::Path;
use std::time::Duration;

use cognition_core::files::file_name;
use cognition_core::{DeployConfig, DeployError};
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method};
use tokio_util::io::ReaderStream;

pub use outcome::{PublicLinkResponse, UploadOutcome, UploadStatus};

/// Multipart field carrying the file.
pub const FILE_FIELD: &str = "file";
/// Multipart field carrying the jsPsych version tag.
pub const VERSION_FIELD: &str = "jspsych_version";
/// Content type declared on the file part. The server expects this value for every file.
pub const FILE_CONTENT_TYPE: &str = "multipart/form-data";

const CONNECT_TIMEOUT_SECS: u64 = 30;

/// HTTP client bound to one deployment configuration.
#[derive(Clone, Debug)]
pub struct CognitionClient {
    client: Client,
    config: DeployConfig,
}

impl CognitionClient {
    pub fn new(config: DeployConfig) -> Result<Self, DeployError> {
        // No overall request timeout: video stimuli can take a while to stream.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &DeployConfig {
        &self.config
    }

    pub fn request_url(&self) -> String {
        self.config.request_url()
    }

    /// Build the multipart body for `path`: the optional version field, then the file streamed from disk.
    ///
    /// Relative paths are resolved against the configured workspace. Failing
    /// to open or stat the file is returned as [`DeployError::FileAccess`].
    pub async fn build_form(&self, path: &Path) -> Result<Form, DeployError> {
        let local = self.config.workspace.join(path);
        let file_access = |source| DeployError::FileAccess {
            path: local.clone(),
            source,
        };

        let file = tokio::fs::File::open(&local).await.map_err(file_access)?;
        let length = file.metadata().await.map_err(file_access)?.len();

        let display = path.to_string_lossy();
        let part = Part::stream_with_length(
            reqwest::Body::wrap_stream(ReaderStream::new(file)),
            length,
        )
        .file_name(file_name(&display).to_string())
        .mime_str(FILE_CONTENT_TYPE)
        .map_err(|e| DeployError::InvalidRequest(e.to_string()))?;

        let mut form = Form::new();
        if let Some(version) = &self.config.jspsych_version {
            form = form.text(VERSION_FIELD, version.clone());
        }

        Ok(form.part(FILE_FIELD, part))
    }

    /// Upload one file and wait for the complete response body.
    ///
    /// Any HTTP status is returned as an outcome; only file access and
    /// transport failures are errors.
    pub async fn upload_file(&self, path: &Path) -> Result<UploadOutcome, DeployError> {
        let url = self.request_url();
        tracing::debug!(path = %path.display(), url = %url, "Uploading file");

        let form = self.build_form(path).await?;

        let response = self
            .client
            .request(Method::POST, &url)
            .header(AUTHORIZATION, self.config.authorization())
            .multipart(form)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;

        tracing::debug!(path = %path.display(), status, body_len = body.len(), "Upload response received");

        Ok(UploadOutcome {
            path: path.to_string_lossy().into_owned(),
            method: Method::POST.to_string(),
            url,
            status,
            body,
        })
    }
}
