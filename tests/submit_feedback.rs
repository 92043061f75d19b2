mod support;

use feedbox::config::{ConfigError, TOKEN_ENV};
use feedbox::widget::{SubmitError, prepare_submission, submit_feedback};
use support::fake_github::FakeGithub;
use support::feedback_server::{TestServer, send, tracker_config};

const VALID: &str = r#"{"name":"Ada <Lovelace>","email":"ada@example.com","message":"  Great site!  "}"#;

#[test]
fn valid_submission_creates_issue_and_returns_url() {
    let github = FakeGithub::creating_issues();
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));

    let reply = send("POST", &server.url("/submit-feedback"), Some(VALID));
    assert_eq!(reply.status, 201);
    assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(reply.header("Content-Type"), Some("application/json"));
    let body = reply.json();
    assert_eq!(body["message"], "Feedback submitted successfully");
    assert_eq!(body["issueUrl"], "https://github.com/octo/site/issues/1");

    let requests = github.requests();
    assert_eq!(requests.len(), 1);
    let upstream = &requests[0];
    assert_eq!(upstream.method, "POST");
    assert_eq!(upstream.path, "/repos/octo/site/issues");
    assert_eq!(
        upstream.header("Authorization"),
        Some("Bearer ghp_integration_token")
    );
    assert_eq!(upstream.header("Accept"), Some("application/vnd.github+json"));
    assert!(upstream.header("User-Agent").unwrap().starts_with("feedbox/"));

    let payload = upstream.json();
    assert_eq!(payload["title"], "Feedback from Ada Lovelace");
    assert_eq!(payload["labels"], serde_json::json!(["feedback", "website"]));
    let issue_body = payload["body"].as_str().unwrap();
    assert!(issue_body.contains("ada@example.com"));
    assert!(issue_body.contains("Great site!"));
    assert!(!issue_body.contains("  Great site!  "));
}

#[test]
fn blank_name_is_rejected_without_upstream_call() {
    let github = FakeGithub::creating_issues();
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));

    let reply = send(
        "POST",
        &server.url("/submit-feedback"),
        Some(r#"{"name":"","email":"x@y.com","message":"hi"}"#),
    );
    assert_eq!(reply.status, 400);
    assert!(
        reply.json()["error"]
            .as_str()
            .unwrap()
            .contains("name")
    );

    let reply = send("POST", &server.url("/submit-feedback"), Some("not json"));
    assert_eq!(reply.status, 400);
    assert_eq!(reply.json()["error"], "Malformed request body");
    assert!(github.requests().is_empty());
}

#[test]
fn missing_credentials_report_configuration_error() {
    let github = FakeGithub::creating_issues();
    let server = TestServer::start(
        github.base_url(),
        Err(ConfigError::MissingEnv {
            names: vec![TOKEN_ENV],
        }),
    );

    let reply = send("POST", &server.url("/submit-feedback"), Some(VALID));
    assert_eq!(reply.status, 500);
    assert_eq!(reply.json()["error"], "Server configuration error");
    assert!(!reply.body.contains(TOKEN_ENV));
    assert!(github.requests().is_empty());
}

#[test]
fn upstream_rejection_is_reported_as_failure() {
    let github = FakeGithub::always(422, r#"{"message":"Validation Failed"}"#);
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));

    let reply = send("POST", &server.url("/submit-feedback"), Some(VALID));
    assert_eq!(reply.status, 500);
    let body = reply.json();
    assert_eq!(body["message"], "Failed to submit feedback");
    assert!(body["error"].as_str().unwrap().contains("Validation Failed"));
}

#[test]
fn unreachable_tracker_fails_and_server_keeps_serving() {
    let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let dead_base = format!("http://{}", closed.local_addr().unwrap());
    drop(closed);
    let server = TestServer::start(&dead_base, Ok(tracker_config()));

    for _ in 0..2 {
        let reply = send("POST", &server.url("/submit-feedback"), Some(VALID));
        assert_eq!(reply.status, 500);
        assert!(!reply.json()["error"].as_str().unwrap().is_empty());
    }
}

#[test]
fn preflight_returns_cors_headers_and_no_body() {
    let github = FakeGithub::creating_issues();
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));

    let reply = send("OPTIONS", &server.url("/submit-feedback"), None);
    assert_eq!(reply.status, 200);
    assert!(reply.body.is_empty());
    assert_eq!(reply.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(
        reply.header("Access-Control-Allow-Methods"),
        Some("POST, OPTIONS")
    );
    assert_eq!(
        reply.header("Access-Control-Allow-Headers"),
        Some("Content-Type")
    );
    assert!(github.requests().is_empty());
}

#[test]
fn get_on_submit_path_is_method_not_allowed() {
    let github = FakeGithub::creating_issues();
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));

    let reply = send("GET", &server.url("/submit-feedback"), None);
    assert_eq!(reply.status, 405);
    assert_eq!(reply.header("Allow"), Some("POST, OPTIONS"));

    let reply = send("GET", &server.url("/nowhere"), None);
    assert_eq!(reply.status, 404);
    assert_eq!(reply.json()["error"], "Not found");
}

#[test]
fn identical_submissions_create_two_issues() {
    let github = FakeGithub::creating_issues();
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));

    let first = send("POST", &server.url("/submit-feedback"), Some(VALID));
    let second = send("POST", &server.url("/submit-feedback"), Some(VALID));
    assert_eq!(first.status, 201);
    assert_eq!(second.status, 201);
    assert_ne!(first.json()["issueUrl"], second.json()["issueUrl"]);
    assert_eq!(github.requests().len(), 2);
}

#[test]
fn repo_details_summarises_repository() {
    let github = FakeGithub::always(
        200,
        r#"{"name":"site","description":"Website","stargazers_count":4,"forks_count":1,
            "open_issues_count":2,"language":"Rust","created_at":"2024-01-01T00:00:00Z",
            "updated_at":"2024-02-01T00:00:00Z","homepage":"https://example.com",
            "default_branch":"main"}"#,
    );
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));

    let reply = send("GET", &server.url("/repo-details"), None);
    assert_eq!(reply.status, 200);
    let body = reply.json();
    assert_eq!(body["name"], "site");
    assert_eq!(body["stars"], 4);
    assert_eq!(body["homepage"], "https://example.com");
    assert_eq!(github.requests()[0].path, "/repos/octo/site");
}

#[test]
fn widget_client_round_trip_against_server() {
    let github = FakeGithub::creating_issues();
    let server = TestServer::start(github.base_url(), Ok(tracker_config()));
    let endpoint = server.url("/submit-feedback");

    let submission = prepare_submission(" Ada ", "ada@example.com", "Hello").unwrap();
    let receipt = submit_feedback(&endpoint, &submission).unwrap();
    assert_eq!(
        receipt.issue_url.as_deref(),
        Some("https://github.com/octo/site/issues/1")
    );

    let err = submit_feedback(&server.url("/repo-details"), &submission).unwrap_err();
    assert!(matches!(err, SubmitError::Rejected { status: 405, .. }));
}
