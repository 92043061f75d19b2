use std::time::Instant;

/// Tone of the status line under the form.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusTone {
    Success,
    Error,
}

/// Outcome message shown inside the panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitStatus {
    pub tone: StatusTone,
    pub message: String,
}

impl SubmitStatus {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            tone: StatusTone::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            tone: StatusTone::Error,
            message: message.into(),
        }
    }
}

/// UI state for the feedback panel.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FeedbackWidgetState {
    /// Whether the panel is open; otherwise only the floating button shows.
    pub open: bool,
    /// Name input.
    pub name: String,
    /// Email input.
    pub email: String,
    /// Message input.
    pub message: String,
    /// Whether to focus the name field on the next frame.
    pub focus_name_requested: bool,
    /// True while a submission is in flight.
    pub submitting: bool,
    /// Result of the last submission attempt.
    pub status: Option<SubmitStatus>,
    /// URL of the last created issue.
    pub last_issue_url: Option<String>,
    /// When the last successful submission completed; drives auto-dismiss.
    pub succeeded_at: Option<Instant>,
}

impl FeedbackWidgetState {
    pub fn clear_fields(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }
}
