//! Configuration module
//!
//! Values are resolved once at process entry and handed to the client
//! explicitly; nothing here reads ambient state after construction.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Base URL of the experiment resource API. The repository name is appended as the last segment.
pub const DEFAULT_ENDPOINT: &str = "https://www.cognition.run/external/api/github/v1/resource";

/// Deployment configuration for one run.
#[derive(Clone, Debug)]
pub struct DeployConfig {
    /// Personal access token. May be empty; it is sent as-is.
    pub token: String,
    /// jsPsych version tag sent alongside every file when set.
    pub jspsych_version: Option<String>,
    pub endpoint: String,
    /// Repository name taken from the triggering event, empty when unknown.
    pub repository: String,
    /// Root directory scanned for experiment files.
    pub workspace: PathBuf,
}

impl DeployConfig {
    pub fn new(
        token: impl Into<String>,
        jspsych_version: Option<String>,
        endpoint: impl Into<String>,
        repository: impl Into<String>,
        workspace: impl Into<PathBuf>,
    ) -> Self {
        // An empty input is how the runner reports an unset optional input.
        let jspsych_version = jspsych_version
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty());

        Self {
            token: token.into(),
            jspsych_version,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            repository: repository.into(),
            workspace: workspace.into(),
        }
    }

    /// Full upload URL: `{endpoint}/{repository}`.
    pub fn request_url(&self) -> String {
        format!("{}/{}", self.endpoint, self.repository)
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

#[derive(Deserialize)]
struct EventPayload {
    repository: Option<EventRepository>,
}

#[derive(Deserialize)]
struct EventRepository {
    name: Option<String>,
}

/// Read `repository.name` from the webhook payload the runner stores at `GITHUB_EVENT_PATH`.
///
/// Returns an empty string when the file is missing, unreadable, not JSON, or
/// has no repository; uploads then go to the bare endpoint.
pub fn repository_name_from_event(event_path: Option<&Path>) -> String {
    let Some(path) = event_path else {
        return String::new();
    };

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Event payload not readable");
            return String::new();
        }
    };

    match serde_json::from_str::<EventPayload>(&raw) {
        Ok(payload) => payload
            .repository
            .and_then(|r| r.name)
            .unwrap_or_default(),
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "Event payload is not valid JSON");
            String::new()
        }
    }
}
