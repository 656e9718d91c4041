use std::io::{self, Read};
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};
use toolbelt_core::config::Settings;
use toolbelt_core::ApiError;

use crate::router::{Incoming, Reply, Route, Router};

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to start server on {addr}: {message}")]
    Bind { addr: String, message: String },

    #[error("server is not listening on an IP address")]
    NotIp,

    #[error("failed to spawn worker: {0}")]
    Spawn(#[from] io::Error),
}

/// A bound, not yet running, HTTP server.
pub struct ApiServer {
    server: Arc<Server>,
    addr: SocketAddr,
    router: Router,
    workers: usize,
    max_body_bytes: usize,
}

impl ApiServer {
    pub fn bind(settings: &Settings) -> Result<Self, ServerError> {
        let listen = settings.listen_addr();
        let server = Server::http(&listen).map_err(|e| ServerError::Bind {
            addr: listen.clone(),
            message: e.to_string(),
        })?;
        let addr = server.server_addr().to_ip().ok_or(ServerError::NotIp)?;
        Ok(Self {
            server: Arc::new(server),
            addr,
            router: Router::new(settings.limits),
            workers: settings.workers.max(1),
            max_body_bytes: settings.max_body_bytes,
        })
    }

    /// Starts the worker threads and returns immediately.
    pub fn spawn(self) -> Result<RunningServer, ServerError> {
        let mut handles = Vec::with_capacity(self.workers);
        for id in 0..self.workers {
            let server = Arc::clone(&self.server);
            let router = self.router;
            let max_body_bytes = self.max_body_bytes;
            let handle = thread::Builder::new()
                .name(format!("toolbelt-worker-{id}"))
                .spawn(move || {
                    for request in server.incoming_requests() {
                        handle_request(&router, request, max_body_bytes);
                    }
                    tracing::debug!(worker = id, "worker stopped");
                })?;
            handles.push(handle);
        }
        tracing::info!(addr = %self.addr, workers = self.workers, "toolbelt-server listening");
        Ok(RunningServer {
            server: self.server,
            addr: self.addr,
            handles,
        })
    }
}

/// Handle to a server whose workers are running.
pub struct RunningServer {
    server: Arc<Server>,
    addr: SocketAddr,
    handles: Vec<JoinHandle<()>>,
}

impl RunningServer {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Blocks until every worker exits.
    pub fn join(self) {
        for handle in self.handles {
            let _ = handle.join();
        }
    }

    /// Unblocks every worker and waits for them to finish.
    pub fn shutdown(self) {
        for _ in &self.handles {
            self.server.unblock();
        }
        self.join();
    }
}

fn header(name: &str, value: &str) -> Option<Header> {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).ok()
}

fn request_header<'a>(request: &'a Request, name: &'static str) -> Option<&'a str> {
    request
        .headers()
        .iter()
        .find(|h| h.field.equiv(name))
        .map(|h| h.value.as_str())
}

fn read_body(request: &mut Request, limit: usize) -> Result<Vec<u8>, ApiError> {
    if request.body_length().is_some_and(|len| len > limit) {
        return Err(ApiError::BodyTooLarge);
    }
    let mut body = Vec::new();
    request
        .as_reader()
        .take(limit as u64 + 1)
        .read_to_end(&mut body)
        .map_err(|e| ApiError::Internal(format!("failed to read body: {}", e)))?;
    if body.len() > limit {
        return Err(ApiError::BodyTooLarge);
    }
    Ok(body)
}

/// Reads and discards the body. Used where the body is ignored, so no cap applies.
fn drain_body(request: &mut Request) -> Vec<u8> {
    if let Err(e) = io::copy(request.as_reader(), &mut io::sink()) {
        tracing::debug!(error = %e, "failed to drain ignored body");
    }
    Vec::new()
}

fn handle_request(router: &Router, mut request: Request, max_body_bytes: usize) {
    let started = Instant::now();
    let body = if Route::from_url(request.url()) == Some(Route::Health) {
        Ok(drain_body(&mut request))
    } else {
        read_body(&mut request, max_body_bytes)
    };
    let reply = match body {
        Ok(body) => router.dispatch(Incoming {
            method: request.method(),
            url: request.url(),
            body: &body,
            cors_request_headers: request_header(&request, "Access-Control-Request-Headers"),
        }),
        Err(err) => Reply::error(&err),
    };

    let method = request.method().to_string();
    let url = request.url().to_string();
    let status = reply.status;

    let mut response = Response::from_data(reply.body).with_status_code(StatusCode(status));
    let mut headers = vec![
        ("Access-Control-Allow-Origin", "*".to_string()),
        ("Cache-Control", "no-store".to_string()),
    ];
    if status != 204 {
        headers.push(("Content-Type", "application/json".to_string()));
    }
    headers.extend(reply.headers);
    for (name, value) in headers {
        if let Some(h) = header(name, &value) {
            response.add_header(h);
        }
    }

    if let Err(e) = request.respond(response) {
        tracing::warn!(%method, %url, error = %e, "failed to write response");
    }
    tracing::info!(
        %method,
        path = %url,
        status,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
}
