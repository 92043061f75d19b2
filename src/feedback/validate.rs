use serde_json::{Map, Value};

use super::{Submission, SubmissionField};

/// Reasons an inbound body is rejected before reaching the tracker.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The body was empty or whitespace only.
    #[error("Request body is empty")]
    EmptyBody,
    /// The body was not a JSON object.
    #[error("Malformed request body")]
    MalformedBody,
    /// The body exceeded the accepted size.
    #[error("Request body too large")]
    BodyTooLarge,
    /// Required fields were absent, blank, or not strings.
    #[error("Missing required fields: {}", field_list(.0))]
    MissingFields(Vec<SubmissionField>),
}

fn field_list(fields: &[SubmissionField]) -> String {
    fields
        .iter()
        .map(|field| field.key())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse raw request bytes into a JSON value.
pub fn parse_body(raw: &[u8]) -> Result<Value, ValidationError> {
    if raw.iter().all(|byte| byte.is_ascii_whitespace()) {
        return Err(ValidationError::EmptyBody);
    }
    serde_json::from_slice(raw).map_err(|_| ValidationError::MalformedBody)
}

/// Check that `raw` is an object carrying non-blank `name`, `email` and
/// `message` strings.
pub fn validate(raw: &Value) -> Result<Submission, ValidationError> {
    let object = raw.as_object().ok_or(ValidationError::MalformedBody)?;
    let missing: Vec<SubmissionField> = SubmissionField::ALL
        .into_iter()
        .filter(|field| required_str(object, *field).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }
    let take = |field| required_str(object, field).unwrap_or_default().to_string();
    Ok(Submission {
        name: take(SubmissionField::Name),
        email: take(SubmissionField::Email),
        message: take(SubmissionField::Message),
    })
}

fn required_str(object: &Map<String, Value>, field: SubmissionField) -> Option<&str> {
    object
        .get(field.key())
        .and_then(Value::as_str)
        .filter(|value| !value.trim().is_empty())
}
