use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::Submission;

/// Hard ceiling on issue title length, in characters.
pub const MAX_TITLE_CHARS: usize = 256;
/// Labels attached to every feedback issue.
pub const FEEDBACK_LABELS: [&str; 2] = ["feedback", "website"];

const TITLE_PREFIX: &str = "Feedback from ";
const BODY_FOOTER: &str = "_Submitted via the website feedback form._";

static TITLE_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s-]").expect("title sanitizer regex must compile"));

/// Title, Markdown body and labels sent to the tracker for one submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct IssuePayload {
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
}

/// Strip everything except word characters, whitespace and hyphens, then trim.
pub fn sanitize_name(name: &str) -> String {
    TITLE_UNSAFE.replace_all(name, "").trim().to_string()
}

/// Build the tracker issue for a validated submission.
pub fn format_issue(submission: &Submission) -> IssuePayload {
    let title: String = format!("{TITLE_PREFIX}{}", sanitize_name(&submission.name))
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect();
    let body = format!(
        "## New feedback\n\n**Name:** {name}\n**Email:** {email}\n\n### Message\n\n{message}\n\n---\n{BODY_FOOTER}\n",
        name = submission.name,
        email = submission.email,
        message = submission.message.trim(),
    );
    IssuePayload {
        title,
        body,
        labels: FEEDBACK_LABELS.iter().map(|label| label.to_string()).collect(),
    }
}
