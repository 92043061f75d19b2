//! GitHub REST API client used as the feedback tracker.

mod issues;
mod repos;

pub use issues::IssueRef;
pub use repos::RepoDetails;

use serde::Deserialize;

use crate::config::TrackerConfig;
use crate::feedback::IssuePayload;
use crate::http_client;

/// Media type GitHub documents for REST responses.
pub const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
/// Pinned REST API version.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

const MAX_RESPONSE_BYTES: usize = 256 * 1024;

/// Failures talking to the tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The tracker answered with a non-success status.
    #[error("GitHub API error (HTTP {status}): {message}")]
    Status { status: u16, message: String },
    /// No response was received.
    #[error("HTTP error: {0}")]
    Transport(String),
    /// A success response could not be read or parsed.
    #[error("Unexpected GitHub response: {0}")]
    Decode(String),
}

impl TrackerError {
    /// Text that may be shown to the person who submitted feedback.
    ///
    /// Status errors carry the tracker's own explanation; transport and
    /// decode details stay in the server log.
    pub fn client_message(&self) -> String {
        match self {
            Self::Status { message, .. } => message.clone(),
            Self::Transport(_) => "Issue tracker is unreachable".to_string(),
            Self::Decode(_) => "Unexpected response from issue tracker".to_string(),
        }
    }
}

/// Seam between the request handlers and the upstream tracker.
pub trait IssueTracker: Send + Sync {
    /// File one issue. A single attempt; never retried.
    fn create_issue(&self, payload: &IssuePayload) -> Result<IssueRef, TrackerError>;

    /// Fetch a summary of the configured repository.
    fn repo_details(&self) -> Result<RepoDetails, TrackerError>;
}

/// Tracker backed by the GitHub REST API for one fixed repository.
#[derive(Clone, Debug)]
pub struct GithubClient {
    api_base: String,
    config: TrackerConfig,
}

impl GithubClient {
    pub fn new(api_base: &str, config: TrackerConfig) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            config,
        }
    }

    /// `owner/repo` of the target repository.
    pub fn slug(&self) -> String {
        self.config.slug()
    }

    fn repo_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.api_base, self.config.owner, self.config.repo
        )
    }

    fn authorized(&self, request: ureq::Request) -> ureq::Request {
        request
            .set("Accept", GITHUB_MEDIA_TYPE)
            .set("X-GitHub-Api-Version", GITHUB_API_VERSION)
            .set("Authorization", &format!("Bearer {}", self.config.token))
    }
}

impl IssueTracker for GithubClient {
    fn create_issue(&self, payload: &IssuePayload) -> Result<IssueRef, TrackerError> {
        issues::create_issue(self, payload)
    }

    fn repo_details(&self) -> Result<RepoDetails, TrackerError> {
        repos::fetch_repo_details(self)
    }
}

/// Turn a ureq outcome into the success body or a [`TrackerError`].
fn read_outcome(outcome: Result<ureq::Response, ureq::Error>) -> Result<String, TrackerError> {
    match outcome {
        Ok(response) => http_client::read_response_text(response, MAX_RESPONSE_BYTES)
            .map_err(|err| TrackerError::Decode(err.to_string())),
        Err(ureq::Error::Status(status, response)) => {
            let body = http_client::read_response_text(response, MAX_RESPONSE_BYTES)
                .unwrap_or_default();
            Err(TrackerError::Status {
                status,
                message: upstream_message(status, &body),
            })
        }
        Err(ureq::Error::Transport(err)) => Err(TrackerError::Transport(err.to_string())),
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBodyWire {
    message: Option<String>,
    #[serde(default)]
    errors: Vec<ErrorDetailWire>,
}

#[derive(Debug, Deserialize)]
struct ErrorDetailWire {
    message: Option<String>,
    field: Option<String>,
    code: Option<String>,
}

/// Extract GitHub's explanation from an error body, or fall back to a
/// generic status message.
fn upstream_message(status: u16, body: &str) -> String {
    let generic = format!("GitHub API responded with status {status}");
    let Ok(parsed) = serde_json::from_str::<ErrorBodyWire>(body.trim()) else {
        return generic;
    };
    let Some(message) = parsed.message.filter(|m| !m.trim().is_empty()) else {
        return generic;
    };
    let details: Vec<String> = parsed
        .errors
        .iter()
        .filter_map(|detail| match (&detail.message, &detail.field, &detail.code) {
            (Some(text), _, _) => Some(text.clone()),
            (None, Some(field), Some(code)) => Some(format!("{field} {code}")),
            _ => None,
        })
        .collect();
    if details.is_empty() {
        message
    } else {
        format!("{message}: {}", details.join("; "))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_prefers_github_message() {
        assert_eq!(
            upstream_message(422, r#"{"message":"Validation Failed"}"#),
            "Validation Failed"
        );
    }

    #[test]
    fn upstream_message_appends_error_details() {
        let body = r#"{"message":"Validation Failed","errors":[{"resource":"Issue","field":"title","code":"missing_field"},{"message":"labels are invalid"}]}"#;
        assert_eq!(
            upstream_message(422, body),
            "Validation Failed: title missing_field; labels are invalid"
        );
    }

    #[test]
    fn upstream_message_falls_back_to_generic() {
        assert_eq!(
            upstream_message(502, "<html>Bad gateway</html>"),
            "GitHub API responded with status 502"
        );
        assert_eq!(
            upstream_message(404, r#"{"message":"  "}"#),
            "GitHub API responded with status 404"
        );
    }

    #[test]
    fn client_message_hides_transport_details() {
        let err = TrackerError::Transport("dns error: api.github.com".to_string());
        assert!(!err.client_message().contains("dns"));
        let err = TrackerError::Status {
            status: 401,
            message: "Bad credentials".to_string(),
        };
        assert_eq!(err.client_message(), "Bad credentials");
    }

    #[test]
    fn client_trims_trailing_slash_from_api_base() {
        let client = GithubClient::new(
            "https://api.github.com/",
            TrackerConfig {
                token: "t".into(),
                owner: "octo".into(),
                repo: "site".into(),
            },
        );
        assert_eq!(client.repo_url(), "https://api.github.com/repos/octo/site");
        assert_eq!(client.slug(), "octo/site");
    }
}
