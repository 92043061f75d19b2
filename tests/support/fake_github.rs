use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// One request received by [`FakeGithub`].
#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
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

type Responder = dyn Fn(&RecordedRequest, usize) -> (u16, String) + Send + Sync;

/// Stand-in for the GitHub REST API: records every request and answers with
/// whatever the responder returns for it.
pub struct FakeGithub {
    base_url: String,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl FakeGithub {
    pub fn start(
        responder: impl Fn(&RecordedRequest, usize) -> (u16, String) + Send + Sync + 'static,
    ) -> Self {
        let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));
        let stop = Arc::new(AtomicBool::new(false));
        let responder: Box<Responder> = Box::new(responder);
        let thread = {
            let requests = Arc::clone(&requests);
            let stop = Arc::clone(&stop);
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    let Ok(Some(mut request)) = server.recv_timeout(Duration::from_millis(50))
                    else {
                        continue;
                    };
                    let mut body = String::new();
                    let _ = request.as_reader().read_to_string(&mut body);
                    let recorded = RecordedRequest {
                        method: request.method().to_string(),
                        path: request.url().to_string(),
                        headers: request
                            .headers()
                            .iter()
                            .map(|header| {
                                (header.field.to_string(), header.value.as_str().to_string())
                            })
                            .collect(),
                        body,
                    };
                    let index = {
                        let mut requests = requests.lock().unwrap();
                        requests.push(recorded.clone());
                        requests.len()
                    };
                    let (status, body) = responder(&recorded, index);
                    let header =
                        tiny_http::Header::from_bytes("Content-Type", "application/json").unwrap();
                    let response = tiny_http::Response::from_string(body)
                        .with_status_code(status)
                        .with_header(header);
                    let _ = request.respond(response);
                }
            })
        };
        Self {
            base_url: format!("http://{addr}"),
            requests,
            stop,
            thread: Some(thread),
        }
    }

    /// Answer every issue creation with `201` and a fresh issue number.
    pub fn creating_issues() -> Self {
        Self::start(|request, index| {
            if request.method == "POST" {
                (
                    201,
                    format!(
                        r#"{{"id":{index},"number":{index},"html_url":"https://github.com/octo/site/issues/{index}"}}"#
                    ),
                )
            } else {
                (404, r#"{"message":"Not Found"}"#.to_string())
            }
        })
    }

    /// Answer every request with the same status and body.
    pub fn always(status: u16, body: &str) -> Self {
        let body = body.to_string();
        Self::start(move |_, _| (status, body.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Drop for FakeGithub {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
