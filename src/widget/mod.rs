//! Feedback widget: a floating button that opens a form and posts it to the
//! feedback server.

pub mod client;
mod controller;
mod state;
pub mod style;
mod ui;

pub use client::{SubmitError, SubmitReceipt, prepare_submission, resolve_endpoint, submit_feedback};
pub use controller::{DISMISS_DELAY, FeedbackSender, HttpSender, WidgetController};
pub use state::{FeedbackWidgetState, StatusTone, SubmitStatus};
pub use ui::FeedbackWidgetApp;
