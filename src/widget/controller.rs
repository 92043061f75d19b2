use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use super::client::{self, SubmitError, SubmitReceipt};
use super::state::{FeedbackWidgetState, SubmitStatus};
use crate::feedback::Submission;

/// How long the confirmation stays up before the panel closes itself.
pub const DISMISS_DELAY: Duration = Duration::from_secs(2);

const SUCCESS_MESSAGE: &str = "Feedback submitted successfully! Thank you.";

/// Delivers one submission somewhere. Called off the UI thread.
pub trait FeedbackSender: Send + Sync {
    fn send(&self, submission: &Submission) -> Result<SubmitReceipt, SubmitError>;
}

/// Sender posting to the feedback server over HTTP.
#[derive(Clone, Debug)]
pub struct HttpSender {
    endpoint: String,
}

impl HttpSender {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl FeedbackSender for HttpSender {
    fn send(&self, submission: &Submission) -> Result<SubmitReceipt, SubmitError> {
        client::submit_feedback(&self.endpoint, submission)
    }
}

#[derive(Debug)]
struct SubmitJobResult {
    result: Result<SubmitReceipt, SubmitError>,
}

/// Background submission plumbing: one job at a time, results over a channel.
struct SubmitJobs {
    sender: Arc<dyn FeedbackSender>,
    message_tx: Sender<SubmitJobResult>,
    message_rx: Receiver<SubmitJobResult>,
    in_progress: bool,
}

impl SubmitJobs {
    fn new(sender: Arc<dyn FeedbackSender>) -> Self {
        let (message_tx, message_rx) = mpsc::channel();
        Self {
            sender,
            message_tx,
            message_rx,
            in_progress: false,
        }
    }

    fn begin(&mut self, submission: Submission) {
        if self.in_progress {
            return;
        }
        self.in_progress = true;
        let tx = self.message_tx.clone();
        let sender = Arc::clone(&self.sender);
        thread::spawn(move || {
            let result = sender.send(&submission);
            let _ = tx.send(SubmitJobResult { result });
        });
    }

    fn try_recv(&self) -> Result<SubmitJobResult, TryRecvError> {
        self.message_rx.try_recv()
    }

    fn clear(&mut self) {
        self.in_progress = false;
    }
}

/// Drives the feedback panel: form edits land in [`FeedbackWidgetState`],
/// submissions run on a worker thread and are applied by [`Self::poll`].
pub struct WidgetController {
    pub state: FeedbackWidgetState,
    jobs: SubmitJobs,
}

impl WidgetController {
    pub fn new(sender: Arc<dyn FeedbackSender>) -> Self {
        Self {
            state: FeedbackWidgetState::default(),
            jobs: SubmitJobs::new(sender),
        }
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self::new(Arc::new(HttpSender::new(endpoint)))
    }

    pub fn open_panel(&mut self) {
        self.state.open = true;
        self.state.focus_name_requested = true;
        self.state.status = None;
        self.state.last_issue_url = None;
        self.state.succeeded_at = None;
    }

    /// Hide the panel. Field values survive so a reopened panel keeps them.
    pub fn close_panel(&mut self) {
        self.state.open = false;
        self.state.focus_name_requested = false;
        self.state.status = None;
        self.state.succeeded_at = None;
    }

    /// Validate locally and start a submission. Ignored while one is in flight.
    pub fn submit(&mut self) {
        if self.state.submitting {
            return;
        }
        let submission = match client::prepare_submission(
            &self.state.name,
            &self.state.email,
            &self.state.message,
        ) {
            Ok(submission) => submission,
            Err(err) => {
                self.state.status = Some(SubmitStatus::error(err.to_string()));
                return;
            }
        };
        self.state.submitting = true;
        self.state.status = None;
        self.state.last_issue_url = None;
        self.state.succeeded_at = None;
        self.jobs.begin(submission);
    }

    /// Apply any finished submission.
    pub fn poll(&mut self, now: Instant) {
        loop {
            match self.jobs.try_recv() {
                Ok(message) => self.apply_submit_result(message.result, now),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
    }

    /// Close the panel once the confirmation has been visible long enough.
    pub fn tick(&mut self, now: Instant) {
        if let Some(at) = self.state.succeeded_at
            && now.saturating_duration_since(at) >= DISMISS_DELAY
        {
            self.close_panel();
        }
    }

    /// Time until the next state change the UI should repaint for.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        if self.state.submitting {
            return Some(Duration::from_millis(100));
        }
        self.state
            .succeeded_at
            .map(|at| DISMISS_DELAY.saturating_sub(now.saturating_duration_since(at)))
    }

    /// Open the last created issue in the system browser.
    pub fn open_issue_link(&mut self) {
        let Some(url) = self.state.last_issue_url.clone() else {
            return;
        };
        if let Err(err) = open::that(&url) {
            warn!("Failed to open {url}: {err}");
            self.state.status = Some(SubmitStatus::error(format!("Failed to open link: {err}")));
        }
    }

    fn apply_submit_result(&mut self, result: Result<SubmitReceipt, SubmitError>, now: Instant) {
        self.jobs.clear();
        self.state.submitting = false;
        match result {
            Ok(receipt) => {
                info!(issue_url = ?receipt.issue_url, "Feedback submitted");
                self.state.clear_fields();
                self.state.status = Some(SubmitStatus::success(SUCCESS_MESSAGE));
                self.state.last_issue_url = receipt.issue_url;
                self.state.succeeded_at = Some(now);
            }
            Err(err) => {
                warn!("Feedback submission failed: {err}");
                self.state.status = Some(SubmitStatus::error(err.to_string()));
            }
        }
    }
}
