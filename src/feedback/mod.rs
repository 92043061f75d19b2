//! Feedback submissions: validation of inbound bodies and formatting into
//! tracker issues.

mod format;
mod validate;

pub use format::{FEEDBACK_LABELS, IssuePayload, MAX_TITLE_CHARS, format_issue, sanitize_name};
pub use validate::{ValidationError, parse_body, validate};

use serde::Serialize;

/// One user-provided feedback entry that passed validation.
///
/// Fields hold the values as submitted; trimming happens where each value is
/// rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// Required submission fields, in reporting order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SubmissionField {
    Name,
    Email,
    Message,
}

impl SubmissionField {
    /// All required fields in the order they are checked.
    pub const ALL: [SubmissionField; 3] = [Self::Name, Self::Email, Self::Message];

    /// JSON key of the field.
    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Message => "message",
        }
    }
}
