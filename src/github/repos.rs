//! Repository metadata lookup.

use serde::{Deserialize, Serialize};

use super::{GithubClient, TrackerError, read_outcome};
use crate::http_client;

/// Public summary of the configured repository.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoDetails {
    pub name: String,
    pub description: Option<String>,
    pub stars: u64,
    pub forks: u64,
    pub open_issues: u64,
    pub language: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub homepage: Option<String>,
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
struct RepositoryWire {
    name: String,
    description: Option<String>,
    #[serde(default)]
    stargazers_count: u64,
    #[serde(default)]
    forks_count: u64,
    #[serde(default)]
    open_issues_count: u64,
    language: Option<String>,
    created_at: String,
    updated_at: String,
    homepage: Option<String>,
    default_branch: String,
}

impl From<RepositoryWire> for RepoDetails {
    fn from(wire: RepositoryWire) -> Self {
        Self {
            name: wire.name,
            description: wire.description,
            stars: wire.stargazers_count,
            forks: wire.forks_count,
            open_issues: wire.open_issues_count,
            language: wire.language,
            created_at: wire.created_at,
            updated_at: wire.updated_at,
            homepage: wire.homepage.filter(|homepage| !homepage.is_empty()),
            default_branch: wire.default_branch,
        }
    }
}

pub(super) fn fetch_repo_details(client: &GithubClient) -> Result<RepoDetails, TrackerError> {
    let request = client.authorized(http_client::agent().get(&client.repo_url()));
    let body = read_outcome(request.call())?;
    serde_json::from_str::<RepositoryWire>(body.trim())
        .map(RepoDetails::from)
        .map_err(|err| TrackerError::Decode(err.to_string()))
}
