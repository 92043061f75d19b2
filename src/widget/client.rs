//! HTTP client for the submit endpoint, shared by the widget and the CLI.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::feedback::Submission;
use crate::http_client;

/// Default submit endpoint of a locally running server.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:8787/submit-feedback";
/// Environment variable overriding the submit endpoint.
pub const ENDPOINT_ENV: &str = "FEEDBOX_ENDPOINT";

const MAX_RESPONSE_BYTES: usize = 64 * 1024;
const FALLBACK_ERROR: &str = "Failed to submit feedback";

/// A submission the server accepted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub message: String,
    /// Link to the created issue, when the server reported one.
    pub issue_url: Option<String>,
}

/// Why a submission did not go through. `Display` is the text shown to the
/// person submitting.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    /// Rejected before any request was made.
    #[error("Please fill in all fields")]
    IncompleteForm,
    /// The server answered with a non-success status.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// The response body was not JSON.
    #[error("Invalid server response")]
    InvalidResponse,
    /// The server could not be reached.
    #[error("Failed to submit feedback: {0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
struct SubmitResponseWire {
    message: Option<String>,
    #[serde(rename = "issueUrl")]
    issue_url: Option<String>,
    error: Option<String>,
}

/// Resolve the endpoint from an explicit value, then `FEEDBOX_ENDPOINT`,
/// then the default.
pub fn resolve_endpoint(
    explicit: Option<String>,
    lookup: impl Fn(&str) -> Option<String>,
) -> String {
    explicit
        .or_else(|| lookup(ENDPOINT_ENV))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
}

/// Trim every field, refusing the form if any ends up empty.
pub fn prepare_submission(name: &str, email: &str, message: &str) -> Result<Submission, SubmitError> {
    let (name, email, message) = (name.trim(), email.trim(), message.trim());
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(SubmitError::IncompleteForm);
    }
    Ok(Submission {
        name: name.to_string(),
        email: email.to_string(),
        message: message.to_string(),
    })
}

/// POST one submission to `endpoint`. A single attempt.
pub fn submit_feedback(endpoint: &str, submission: &Submission) -> Result<SubmitReceipt, SubmitError> {
    debug!(%endpoint, "Submitting feedback");
    let (status, body) = match http_client::agent()
        .post(endpoint)
        .set("Accept", "application/json")
        .send_json(submission)
    {
        Ok(response) => (response.status(), read_body(response)?),
        Err(ureq::Error::Status(status, response)) => (status, read_body(response)?),
        Err(ureq::Error::Transport(err)) => {
            warn!("Feedback endpoint unreachable: {err}");
            return Err(SubmitError::Transport(err.to_string()));
        }
    };
    interpret_response(status, &body)
}

fn read_body(response: ureq::Response) -> Result<String, SubmitError> {
    http_client::read_response_text(response, MAX_RESPONSE_BYTES)
        .map_err(|_| SubmitError::InvalidResponse)
}

fn interpret_response(status: u16, body: &str) -> Result<SubmitReceipt, SubmitError> {
    let parsed: SubmitResponseWire =
        serde_json::from_str(body.trim()).map_err(|_| SubmitError::InvalidResponse)?;
    if !(200..300).contains(&status) {
        let message = parsed
            .error
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| FALLBACK_ERROR.to_string());
        return Err(SubmitError::Rejected { status, message });
    }
    Ok(SubmitReceipt {
        message: parsed
            .message
            .unwrap_or_else(|| "Feedback submitted successfully".to_string()),
        issue_url: parsed.issue_url,
    })
}
