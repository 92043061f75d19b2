pub mod fake_github;
pub mod feedback_server;
