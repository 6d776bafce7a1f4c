//! Upload responses and their classification.

use cognition_core::UploadFailure;
use serde::Deserialize;

/// Success body returned by the resource endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PublicLinkResponse {
    pub public_link: Option<String>,
}

/// Result of one completed upload request.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Path of the uploaded file, as given by the caller.
    pub path: String,
    pub method: String,
    pub url: String,
    pub status: u16,
    /// Raw response body, possibly empty.
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    /// HTTP 200. `public_link` is present when the body carried one.
    Success { public_link: Option<String> },
    Failed(UploadFailure),
}

impl UploadOutcome {
    pub fn classify(&self) -> UploadStatus {
        match UploadFailure::from_status(self.status) {
            Some(failure) => UploadStatus::Failed(failure),
            None => UploadStatus::Success {
                public_link: self.public_link(),
            },
        }
    }

    /// `public_link` from a 200 body. An empty or unparseable body yields `None`.
    fn public_link(&self) -> Option<String> {
        if self.body.is_empty() {
            return None;
        }

        match serde_json::from_str::<PublicLinkResponse>(&self.body) {
            Ok(parsed) => parsed.public_link,
            Err(e) => {
                tracing::warn!(path = %self.path, error = %e, "Upload succeeded but response body is not valid JSON");
                None
            }
        }
    }

    /// Debug line describing a rejected request.
    pub fn describe_failure(&self) -> String {
        format!(
            "Error uploading {} to {}:{} with status code {}",
            self.path, self.method, self.url, self.status
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(status: u16, body: &str) -> UploadOutcome {
        UploadOutcome {
            path: "exp/index.html".to_string(),
            method: "POST".to_string(),
            url: "https://www.cognition.run/external/api/github/v1/resource/stroop".to_string(),
            status,
            body: body.to_string(),
        }
    }

    #[test]
    fn success_with_public_link() {
        assert_eq!(
            outcome(200, r#"{"public_link":"https://x/y"}"#).classify(),
            UploadStatus::Success {
                public_link: Some("https://x/y".to_string())
            }
        );
    }

    #[test]
    fn success_with_extra_fields() {
        let body = r#"{"id":42,"public_link":"https://x/y","status":"stored"}"#;
        assert_eq!(
            outcome(200, body).classify(),
            UploadStatus::Success {
                public_link: Some("https://x/y".to_string())
            }
        );
    }

    #[test]
    fn success_with_empty_or_unparseable_body() {
        assert_eq!(
            outcome(200, "").classify(),
            UploadStatus::Success { public_link: None }
        );
        assert_eq!(
            outcome(200, "<html>ok</html>").classify(),
            UploadStatus::Success { public_link: None }
        );
        assert_eq!(
            outcome(200, r#"{"message":"ok"}"#).classify(),
            UploadStatus::Success { public_link: None }
        );
    }

    #[test]
    fn failures_ignore_the_body() {
        assert_eq!(
            outcome(401, r#"{"public_link":"https://x/y"}"#).classify(),
            UploadStatus::Failed(UploadFailure::Unauthorized)
        );
        assert_eq!(
            outcome(402, "").classify(),
            UploadStatus::Failed(UploadFailure::PlanLimit)
        );
        assert_eq!(
            outcome(422, "").classify(),
            UploadStatus::Failed(UploadFailure::DeployRejected)
        );
        assert_eq!(
            outcome(500, "boom").classify(),
            UploadStatus::Failed(UploadFailure::Unexpected)
        );
    }

    #[test]
    fn describe_failure_names_method_url_and_status() {
        assert_eq!(
            outcome(403, "").describe_failure(),
            "Error uploading exp/index.html to POST:https://www.cognition.run/external/api/github/v1/resource/stroop with status code 403"
        );
    }
}
