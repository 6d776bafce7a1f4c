//! Error types module
//!
//! `DeployError` covers failures that abort a run: the file system, the
//! network transport and an empty discovery result. Rejections reported by
//! the hosting service are not errors in that sense; they are classified as
//! an `UploadFailure`, reported against the file, and the run continues.

use std::io;
use std::path::PathBuf;

/// Where users manage their personal access token.
pub const API_KEY_URL: &str = "https://www.cognition.run/account";
/// Where users upgrade their plan.
pub const UPGRADE_URL: &str = "https://www.cognition.run/account";
/// Support contact form.
pub const SUPPORT_FORM: &str =
    "https://docs.google.com/forms/d/e/1FAIpQLSdYg3h6ESzd81rHlGlAib_kXA56ERuy0MBM1CwPeUdTv4lvcQ/viewform";

#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("Unable to read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unable to scan {}: {source}", .path.display())]
    Discovery {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Request to Cognition failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid upload request: {0}")]
    InvalidRequest(String),

    #[error("No experiment files found to deploy")]
    NoFiles,
}

/// Classified rejection of a single upload by the hosting service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFailure {
    /// 401 / 403: token expired or unknown.
    Unauthorized,
    /// 402: stored task limit reached or plan does not cover the experiment.
    PlanLimit,
    /// 404 / 422: the server refused the deploy, usually an outdated action.
    DeployRejected,
    /// Any other non-200 status.
    Unexpected,
}

impl UploadFailure {
    /// Classify a response status. `None` means the upload succeeded.
    pub fn from_status(status: u16) -> Option<Self> {
        match status {
            200 => None,
            401 | 403 => Some(Self::Unauthorized),
            402 => Some(Self::PlanLimit),
            404 | 422 => Some(Self::DeployRejected),
            _ => Some(Self::Unexpected),
        }
    }

    /// Detailed message logged as an error for `path`.
    pub fn message(&self, path: &str) -> String {
        match self {
            Self::Unauthorized => format!(
                "Unable to deploy {path} to Cognition. The action could connect to the Cognition server, \
                 but the API key has expired or is not recognized by the system. \
                 Check your Cognition account API key at {API_KEY_URL} . \
                 If the problem persists, please contact us at {SUPPORT_FORM} ."
            ),
            Self::PlanLimit => format!(
                "Unable to deploy {path} to Cognition. Your credentials are correct, but your account has \
                 reached the limit of stored tasks or your current plan does not support this experiment. \
                 Upgrade your plan at: {UPGRADE_URL}"
            ),
            Self::DeployRejected => format!(
                "Unable to deploy {path} to Cognition. The action could connect to the server, but the deploy \
                 was rejected. This can be caused by a deprecated action version. Please update your workflow \
                 file to require the latest version of this action. \
                 If the problem persists, please contact us at {SUPPORT_FORM} ."
            ),
            Self::Unexpected => format!(
                "Unable to deploy {path} to Cognition. The action could connect to the Cognition server, \
                 but it found an unexpected error. Please try again later. \
                 If the problem persists, please contact us at {SUPPORT_FORM} ."
            ),
        }
    }

    /// Short message carried by the pipeline failure marker.
    pub fn summary(path: &str) -> String {
        format!("Unable to deploy {path} to Cognition.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_status_is_not_a_failure() {
        assert_eq!(UploadFailure::from_status(200), None);
    }

    #[test]
    fn auth_statuses() {
        assert_eq!(
            UploadFailure::from_status(401),
            Some(UploadFailure::Unauthorized)
        );
        assert_eq!(
            UploadFailure::from_status(403),
            Some(UploadFailure::Unauthorized)
        );
    }

    #[test]
    fn plan_and_rejected_statuses() {
        assert_eq!(UploadFailure::from_status(402), Some(UploadFailure::PlanLimit));
        assert_eq!(
            UploadFailure::from_status(404),
            Some(UploadFailure::DeployRejected)
        );
        assert_eq!(
            UploadFailure::from_status(422),
            Some(UploadFailure::DeployRejected)
        );
    }

    #[test]
    fn everything_else_is_unexpected() {
        for status in [201, 204, 301, 400, 409, 429, 500, 502, 503] {
            assert_eq!(
                UploadFailure::from_status(status),
                Some(UploadFailure::Unexpected),
                "status {}",
                status
            );
        }
    }

    #[test]
    fn messages_name_the_file_and_the_remedy() {
        let msg = UploadFailure::Unauthorized.message("src/index.html");
        assert!(msg.contains("src/index.html"));
        assert!(msg.contains(API_KEY_URL));

        let msg = UploadFailure::PlanLimit.message("a.js");
        assert!(msg.contains("Upgrade your plan"));

        let msg = UploadFailure::DeployRejected.message("a.js");
        assert!(msg.contains("deprecated action version"));

        let msg = UploadFailure::Unexpected.message("a.js");
        assert!(msg.contains("unexpected error"));
        assert!(msg.contains("try again later"));
    }

    #[test]
    fn summary_names_the_file() {
        assert_eq!(
            UploadFailure::summary("img/cat.png"),
            "Unable to deploy img/cat.png to Cognition."
        );
    }

    #[test]
    fn no_files_error_message() {
        assert_eq!(
            DeployError::NoFiles.to_string(),
            "No experiment files found to deploy"
        );
    }
}
