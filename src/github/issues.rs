//! Create GitHub issues via the REST API.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{GithubClient, TrackerError, read_outcome};
use crate::feedback::IssuePayload;
use crate::http_client;

/// A successfully created issue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssueRef {
    /// HTML URL of the created issue.
    pub url: String,
    /// Issue number within the repository.
    pub number: u64,
}

#[derive(Debug, Deserialize)]
struct CreatedIssueWire {
    html_url: String,
    number: u64,
}

pub(super) fn create_issue(
    client: &GithubClient,
    payload: &IssuePayload,
) -> Result<IssueRef, TrackerError> {
    let url = format!("{}/issues", client.repo_url());
    debug!(%url, title = %payload.title, "Creating GitHub issue");
    let request = client.authorized(http_client::agent().post(&url));
    let body = read_outcome(request.send_json(payload))?;
    parse_created_issue(&body)
}

fn parse_created_issue(body: &str) -> Result<IssueRef, TrackerError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Err(TrackerError::Decode("Empty response body".to_string()));
    }
    let parsed: CreatedIssueWire =
        serde_json::from_str(trimmed).map_err(|err| TrackerError::Decode(err.to_string()))?;
    Ok(IssueRef {
        url: parsed.html_url,
        number: parsed.number,
    })
}
