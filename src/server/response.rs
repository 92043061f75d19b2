use std::io::Cursor;

use serde_json::{Value, json};

/// Methods advertised for the submit endpoint.
pub const SUBMIT_METHODS: &str = "POST, OPTIONS";
/// Methods advertised for the repository details endpoint.
pub const DETAILS_METHODS: &str = "GET, OPTIONS";

const PREFLIGHT_MAX_AGE_SECS: u32 = 60 * 60;

/// Framework-independent response produced by the handlers.
#[derive(Clone, Debug, PartialEq)]
pub struct JsonResponse {
    pub status: u16,
    pub body: Option<Value>,
    pub headers: Vec<(&'static str, String)>,
}

impl JsonResponse {
    pub fn json(status: u16, body: Value) -> Self {
        Self {
            status,
            body: Some(body),
            headers: Vec::new(),
        }
    }

    /// `{"error": message}` with the given status.
    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::json(status, json!({ "error": message.into() }))
    }

    /// Empty `200` answering a CORS preflight.
    pub fn preflight(methods: &'static str) -> Self {
        Self {
            status: 200,
            body: None,
            headers: vec![
                ("Access-Control-Allow-Methods", methods.to_string()),
                ("Access-Control-Allow-Headers", "Content-Type".to_string()),
                ("Access-Control-Max-Age", PREFLIGHT_MAX_AGE_SECS.to_string()),
            ],
        }
    }

    pub fn method_not_allowed(methods: &'static str) -> Self {
        Self::error(405, "Method not allowed").with_header("Allow", methods)
    }

    pub fn with_header(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.headers.push((name, value.into()));
        self
    }

    /// First value of header `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Serialized body; empty for bodiless responses.
    pub fn body_bytes(&self) -> Vec<u8> {
        self.body
            .as_ref()
            .map(|body| body.to_string().into_bytes())
            .unwrap_or_default()
    }

    pub(crate) fn into_http(self) -> tiny_http::Response<Cursor<Vec<u8>>> {
        let has_body = self.body.is_some();
        let mut response = tiny_http::Response::from_data(self.body_bytes())
            .with_status_code(tiny_http::StatusCode(self.status));
        if has_body {
            push_header(&mut response, "Content-Type", "application/json");
        }
        for (name, value) in &self.headers {
            push_header(&mut response, name, value);
        }
        response
    }
}

fn push_header(response: &mut tiny_http::Response<Cursor<Vec<u8>>>, name: &str, value: &str) {
    match tiny_http::Header::from_bytes(name.as_bytes(), value.as_bytes()) {
        Ok(header) => response.add_header(header),
        Err(()) => tracing::warn!("Dropping invalid response header {name}"),
    }
}
