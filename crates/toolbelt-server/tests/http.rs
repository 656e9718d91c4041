//! End-to-end tests over a real socket.

use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use serde_json::Value;
use toolbelt_core::config::Settings;
use toolbelt_server::{ApiServer, RunningServer};

struct RawResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: String,
}

impl RawResponse {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("json body")
    }
}

fn start(max_body_bytes: usize) -> RunningServer {
    let settings = Settings {
        host: "127.0.0.1".to_string(),
        port: 0,
        workers: 2,
        max_body_bytes,
        ..Settings::default()
    };
    ApiServer::bind(&settings)
        .expect("bind")
        .spawn()
        .expect("spawn")
}

fn send(
    addr: SocketAddr,
    method: &str,
    path: &str,
    extra: &[(&str, &str)],
    body: &str,
) -> RawResponse {
    let mut stream = TcpStream::connect(addr).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("timeout");
    let mut raw = format!(
        "{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\nContent-Type: application/json\r\nContent-Length: {}\r\n",
        body.len()
    );
    for (k, v) in extra {
        raw.push_str(&format!("{k}: {v}\r\n"));
    }
    raw.push_str("\r\n");
    raw.push_str(body);
    stream.write_all(raw.as_bytes()).expect("write");

    let mut buf = Vec::new();
    stream.read_to_end(&mut buf).expect("read");
    let text = String::from_utf8(buf).expect("utf8");
    let (head, body) = text.split_once("\r\n\r\n").expect("header terminator");
    let mut lines = head.lines();
    let status = lines
        .next()
        .and_then(|l| l.split_whitespace().nth(1))
        .and_then(|s| s.parse().ok())
        .expect("status line");
    let headers = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();
    RawResponse {
        status,
        headers,
        body: body.to_string(),
    }
}

#[test]
fn serves_json_with_cors_headers() {
    let server = start(64 * 1024);
    let addr = server.local_addr();

    let res = send(
        addr,
        "POST",
        "/api/calculator/add",
        &[("Origin", "http://localhost:3000")],
        r#"{"num1": 1.5, "num2": 2}"#,
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(res.header("Content-Type"), Some("application/json"));
    assert_eq!(res.json()["result"], 3.5);

    let res = send(addr, "GET", "/health", &[], "");
    assert_eq!(res.status, 200);
    assert_eq!(res.json()["status"], "healthy");

    server.shutdown();
}

#[test]
fn answers_preflight() {
    let server = start(64 * 1024);
    let res = send(
        server.local_addr(),
        "OPTIONS",
        "/api/credentials_generator/generate_password",
        &[
            ("Origin", "http://localhost:3000"),
            ("Access-Control-Request-Method", "POST"),
            ("Access-Control-Request-Headers", "content-type"),
        ],
        "",
    );
    assert_eq!(res.status, 204);
    assert_eq!(res.header("Access-Control-Allow-Origin"), Some("*"));
    assert_eq!(res.header("Access-Control-Allow-Headers"), Some("content-type"));
    server.shutdown();
}

#[test]
fn rejects_oversized_body() {
    let server = start(32);
    let body = format!(r#"{{"abbreviation": "{}"}}"#, "A".repeat(64));
    let res = send(
        server.local_addr(),
        "POST",
        "/api/abbreviation/time_zones",
        &[],
        &body,
    );
    assert_eq!(res.status, 413);
    assert_eq!(res.json()["error"], "Request body too large.");
    server.shutdown();
}

#[test]
fn health_ignores_oversized_body() {
    let server = start(32);
    let body = "x".repeat(70 * 1024);
    let res = send(server.local_addr(), "GET", "/health", &[], &body);
    assert_eq!(res.status, 200);
    assert_eq!(
        res.json(),
        serde_json::json!({"status": "healthy", "service": "backend"})
    );
    server.shutdown();
}

#[test]
fn invalid_json_is_a_bad_request() {
    let server = start(64 * 1024);
    let res = send(
        server.local_addr(),
        "POST",
        "/api/credentials_generator/generate_username",
        &[],
        "{not json",
    );
    assert_eq!(res.status, 400);
    assert_eq!(res.json()["error"], "Invalid input parameters.");
    server.shutdown();
}
