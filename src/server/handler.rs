use std::io::{self, Read};

use serde_json::json;
use tracing::{error, info, warn};

use super::response::{DETAILS_METHODS, JsonResponse, SUBMIT_METHODS};
use crate::config::{ConfigError, ServerSettings, TrackerConfig};
use crate::feedback::{self, ValidationError};
use crate::github::{GithubClient, IssueTracker};
use crate::http_client;

/// Inbound bodies above this size are rejected unread.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

const CONFIG_ERROR_MESSAGE: &str = "Server configuration error";

/// HTTP methods the handlers distinguish.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
    Options,
    Other,
}

impl From<&tiny_http::Method> for RequestMethod {
    fn from(method: &tiny_http::Method) -> Self {
        match method {
            tiny_http::Method::Get => Self::Get,
            tiny_http::Method::Post => Self::Post,
            tiny_http::Method::Options => Self::Options,
            _ => Self::Other,
        }
    }
}

/// One inbound request as seen by the handlers. The body is read lazily so
/// requests rejected early never touch it.
pub struct InboundRequest<'a> {
    pub method: RequestMethod,
    /// Request target; any query string is ignored for routing.
    pub target: &'a str,
    pub content_length: Option<usize>,
    pub body: &'a mut dyn Read,
}

/// Routes requests to the feedback and repository details handlers.
///
/// Holds only immutable configuration, so one instance is shared by every
/// request worker.
pub struct FeedbackService {
    settings: ServerSettings,
    tracker: Result<Box<dyn IssueTracker>, ConfigError>,
}

impl FeedbackService {
    pub fn new(settings: ServerSettings, tracker: Result<Box<dyn IssueTracker>, ConfigError>) -> Self {
        Self { settings, tracker }
    }

    /// Build the service with the GitHub tracker, keeping a configuration
    /// failure around so every request reports it.
    pub fn with_github(
        settings: ServerSettings,
        tracker_config: Result<TrackerConfig, ConfigError>,
    ) -> Self {
        let tracker = tracker_config.map(|config| {
            Box::new(GithubClient::new(&settings.api_base, config)) as Box<dyn IssueTracker>
        });
        Self::new(settings, tracker)
    }

    pub fn settings(&self) -> &ServerSettings {
        &self.settings
    }

    /// Whether the tracker configuration loaded.
    pub fn is_configured(&self) -> bool {
        self.tracker.is_ok()
    }

    /// Dispatch by path and attach the allowed origin.
    pub fn route(&self, request: InboundRequest<'_>) -> JsonResponse {
        let path = request
            .target
            .split_once('?')
            .map_or(request.target, |(path, _)| path);
        let response = if path == self.settings.submit_path {
            self.handle_submit(request)
        } else if path == self.settings.repo_details_path {
            self.handle_repo_details(request)
        } else {
            JsonResponse::error(404, "Not found")
        };
        response.with_header(
            "Access-Control-Allow-Origin",
            self.settings.allowed_origin.clone(),
        )
    }

    /// File one feedback submission as a tracker issue.
    pub fn handle_submit(&self, request: InboundRequest<'_>) -> JsonResponse {
        match request.method {
            RequestMethod::Post => {}
            RequestMethod::Options => return JsonResponse::preflight(SUBMIT_METHODS),
            RequestMethod::Get | RequestMethod::Other => {
                return JsonResponse::method_not_allowed(SUBMIT_METHODS);
            }
        }

        let tracker = match &self.tracker {
            Ok(tracker) => tracker,
            Err(err) => {
                error!("Rejecting feedback submission: {err}");
                return JsonResponse::error(500, CONFIG_ERROR_MESSAGE);
            }
        };

        let submission = match read_body(request.body, request.content_length)
            .and_then(|raw| feedback::parse_body(&raw))
            .and_then(|value| feedback::validate(&value))
        {
            Ok(submission) => submission,
            Err(err) => {
                warn!("Rejected feedback submission: {err}");
                return JsonResponse::error(400, err.to_string());
            }
        };

        let payload = feedback::format_issue(&submission);
        match tracker.create_issue(&payload) {
            Ok(issue) => {
                info!(number = issue.number, url = %issue.url, "Created feedback issue");
                JsonResponse::json(
                    201,
                    json!({
                        "message": "Feedback submitted successfully",
                        "issueUrl": issue.url,
                    }),
                )
            }
            Err(err) => {
                error!("Failed to create feedback issue: {err}");
                JsonResponse::json(
                    500,
                    json!({
                        "message": "Failed to submit feedback",
                        "error": err.client_message(),
                    }),
                )
            }
        }
    }

    /// Summarise the configured repository.
    pub fn handle_repo_details(&self, request: InboundRequest<'_>) -> JsonResponse {
        match request.method {
            RequestMethod::Get => {}
            RequestMethod::Options => return JsonResponse::preflight(DETAILS_METHODS),
            RequestMethod::Post | RequestMethod::Other => {
                return JsonResponse::method_not_allowed(DETAILS_METHODS);
            }
        }
        let tracker = match &self.tracker {
            Ok(tracker) => tracker,
            Err(err) => {
                error!("Rejecting repository details request: {err}");
                return JsonResponse::error(500, CONFIG_ERROR_MESSAGE);
            }
        };
        match tracker.repo_details() {
            Ok(details) => match serde_json::to_value(&details) {
                Ok(body) => JsonResponse::json(200, body),
                Err(err) => {
                    error!("Failed to serialize repository details: {err}");
                    JsonResponse::error(500, "Failed to fetch repository details")
                }
            },
            Err(err) => {
                error!("Failed to fetch repository details: {err}");
                JsonResponse::error(500, err.client_message())
            }
        }
    }
}

fn read_body(body: &mut dyn Read, content_length: Option<usize>) -> Result<Vec<u8>, ValidationError> {
    let declared = content_length.map(|length| length.to_string());
    http_client::check_content_length(declared.as_deref(), MAX_BODY_BYTES)
        .and_then(|()| http_client::read_limited(body, MAX_BODY_BYTES))
        .map_err(|err| match err.kind() {
            io::ErrorKind::InvalidData => ValidationError::BodyTooLarge,
            _ => ValidationError::MalformedBody,
        })
}
