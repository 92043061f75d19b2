//! HTTP front end for the feedback service.
//!
//! A blocking accept loop hands each request to its own worker thread; the
//! workers share one [`FeedbackService`] and nothing else.

mod handler;
mod response;

pub use handler::{FeedbackService, InboundRequest, MAX_BODY_BYTES, RequestMethod};
pub use response::{DETAILS_METHODS, JsonResponse, SUBMIT_METHODS};

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

/// How often the accept loop checks for shutdown while idle.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Errors that stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("Failed to accept connection: {0}")]
    Accept(#[from] std::io::Error),
    #[error("Server thread panicked")]
    Panicked,
}

/// Flag asking a running server to stop accepting requests.
#[derive(Clone, Debug, Default)]
pub struct ShutdownHandle(Arc<AtomicBool>);

impl ShutdownHandle {
    pub fn request_shutdown(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// A bound listener plus the service answering its requests.
pub struct FeedbackServer {
    server: tiny_http::Server,
    service: Arc<FeedbackService>,
    shutdown: ShutdownHandle,
}

impl FeedbackServer {
    /// Bind the address from the service settings.
    pub fn bind(service: FeedbackService) -> Result<Self, ServerError> {
        let addr = service.settings().bind_addr.clone();
        let server = tiny_http::Server::http(addr.as_str())
            .map_err(|source| ServerError::Bind { addr, source })?;
        Ok(Self {
            server,
            service: Arc::new(service),
            shutdown: ShutdownHandle::default(),
        })
    }

    /// Actual listening address; useful when bound to port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    /// Serve until shutdown is requested. Requests already handed to a
    /// worker finish on their own.
    pub fn run(self) -> Result<(), ServerError> {
        if let Some(addr) = self.local_addr() {
            info!("Feedback server listening on http://{addr}");
        }
        while !self.shutdown.is_requested() {
            let Some(request) = self.server.recv_timeout(POLL_INTERVAL)? else {
                continue;
            };
            let service = Arc::clone(&self.service);
            thread::spawn(move || serve_request(&service, request));
        }
        info!("Feedback server stopped");
        Ok(())
    }

    /// Run on a background thread.
    pub fn spawn(self) -> RunningServer {
        let addr = self.local_addr();
        let shutdown = self.shutdown_handle();
        let thread = thread::spawn(move || self.run());
        RunningServer {
            addr,
            shutdown,
            thread,
        }
    }
}

/// Handle to a server started with [`FeedbackServer::spawn`].
pub struct RunningServer {
    addr: Option<SocketAddr>,
    shutdown: ShutdownHandle,
    thread: JoinHandle<Result<(), ServerError>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.addr
    }

    /// Request shutdown and wait for the accept loop to exit.
    pub fn stop(self) -> Result<(), ServerError> {
        self.shutdown.request_shutdown();
        self.thread.join().map_err(|_| ServerError::Panicked)?
    }
}

fn serve_request(service: &FeedbackService, mut request: tiny_http::Request) {
    let method = RequestMethod::from(request.method());
    let target = request.url().to_string();
    let content_length = request.body_length();
    let response = service.route(InboundRequest {
        method,
        target: &target,
        content_length,
        body: request.as_reader(),
    });
    debug!(?method, %target, status = response.status, "Handled request");
    if let Err(err) = request.respond(response.into_http()) {
        warn!("Failed to send response for {target}: {err}");
    }
}
