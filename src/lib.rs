//! Library exports for the server, widget, benchmarks and tests.
/// Application directory resolution.
pub mod app_dirs;
/// Server settings and tracker credentials.
pub mod config;
/// Submission validation and issue formatting.
pub mod feedback;
/// GitHub issue tracker client.
pub mod github;
/// Shared outbound HTTP agent.
pub mod http_client;
/// Tracing setup and log file rotation.
pub mod logging;
/// HTTP front end for feedback submissions.
pub mod server;
/// Native feedback widget.
pub mod widget;
