use std::io::Read;

use feedbox::config::{ConfigError, ServerSettings, TrackerConfig};
use feedbox::server::{FeedbackServer, FeedbackService, RunningServer};

/// A real feedback server on an ephemeral port, stopped on drop.
pub struct TestServer {
    running: Option<RunningServer>,
    base_url: String,
}

impl TestServer {
    pub fn start(api_base: &str, tracker: Result<TrackerConfig, ConfigError>) -> Self {
        let settings = ServerSettings {
            bind_addr: "127.0.0.1:0".to_string(),
            api_base: api_base.to_string(),
            ..ServerSettings::default()
        };
        let server = FeedbackServer::bind(FeedbackService::with_github(settings, tracker)).unwrap();
        let running = server.spawn();
        let addr = running.local_addr().unwrap();
        Self {
            running: Some(running),
            base_url: format!("http://{addr}"),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.take() {
            let _ = running.stop();
        }
    }
}

pub fn tracker_config() -> TrackerConfig {
    TrackerConfig {
        token: "ghp_integration_token".to_string(),
        owner: "octo".to_string(),
        repo: "site".to_string(),
    }
}

/// Status, selected headers and body of one reply.
#[derive(Debug)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl Reply {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

/// Send a request, treating every HTTP status as a reply rather than an error.
pub fn send(method: &str, url: &str, body: Option<&str>) -> Reply {
    let request = ureq::request(method, url).set("Content-Type", "application/json");
    let outcome = match body {
        Some(body) => request.send_string(body),
        None => request.call(),
    };
    let response = match outcome {
        Ok(response) => response,
        Err(ureq::Error::Status(_, response)) => response,
        Err(err) => panic!("request to {url} failed: {err}"),
    };
    let status = response.status();
    let headers = response
        .headers_names()
        .into_iter()
        .filter_map(|name| {
            let value = response.header(&name)?.to_string();
            Some((name, value))
        })
        .collect();
    let mut body = String::new();
    response.into_reader().read_to_string(&mut body).unwrap();
    Reply {
        status,
        headers,
        body,
    }
}
