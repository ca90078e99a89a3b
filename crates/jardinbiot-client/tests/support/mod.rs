//! Scripted HTTP server for exercising the client against a real socket.
//!
//! Each route holds an ordered list of response rules; the first live rule
//! matching a request answers it, and unmatched requests get a 404. Every
//! response carries `Connection: close`, so each request arrives on its own
//! connection.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::Value;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tracing_subscriber::EnvFilter;

/// Install a tracing subscriber honoring `RUST_LOG`, once per binary.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A request as the server saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Path plus query string, exactly as sent.
    pub target: String,
    /// Header names lowercased.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn bearer(&self) -> Option<&str> {
        self.header("authorization")?.strip_prefix("Bearer ")
    }

    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

struct Rule {
    when_bearer: Option<String>,
    once: bool,
    used: bool,
    status: u16,
    body: String,
    delay: Option<Duration>,
}

#[derive(Default)]
struct Route {
    rules: Vec<Rule>,
    hits: usize,
    requests: Vec<RecordedRequest>,
}

#[derive(Default)]
struct ServerState {
    routes: HashMap<(String, String), Route>,
}

pub struct MockServer {
    addr: SocketAddr,
    state: Arc<Mutex<ServerState>>,
}

impl MockServer {
    pub async fn start() -> MockServer {
        init_tracing();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(Mutex::new(ServerState::default()));

        let accept_state = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let state = Arc::clone(&accept_state);
                        tokio::spawn(handle_connection(stream, state));
                    }
                    Err(_) => break,
                }
            }
        });

        MockServer { addr, state }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Handle for scripting and inspecting one method + path.
    pub fn route(&self, method: &str, path: &str) -> RouteHandle {
        RouteHandle {
            state: Arc::clone(&self.state),
            key: (method.to_ascii_uppercase(), path.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct RouteHandle {
    state: Arc<Mutex<ServerState>>,
    key: (String, String),
}

impl RouteHandle {
    /// Answer every matching request with this status and JSON body.
    pub fn respond(&self, status: u16, body: Value) {
        self.push_rule(status, body.to_string(), None, None, false);
    }

    /// Answer one request, then fall through to later rules.
    pub fn respond_once(&self, status: u16, body: Value) {
        self.push_rule(status, body.to_string(), None, None, true);
    }

    /// Answer only requests carrying this exact bearer token.
    pub fn respond_for_bearer(&self, bearer: &str, status: u16, body: Value) {
        self.push_rule(status, body.to_string(), Some(bearer.to_string()), None, false);
    }

    /// Answer after a pause, for overlapping in-flight requests.
    pub fn respond_delayed(&self, status: u16, body: Value, delay: Duration) {
        self.push_rule(status, body.to_string(), None, Some(delay), false);
    }

    /// Answer with a bare status and no body.
    pub fn respond_status(&self, status: u16) {
        self.push_rule(status, String::new(), None, None, false);
    }

    /// Answer with a non-JSON body (proxy error pages and the like).
    pub fn respond_raw(&self, status: u16, body: &str) {
        self.push_rule(status, body.to_string(), None, None, false);
    }

    fn push_rule(
        &self,
        status: u16,
        body: String,
        when_bearer: Option<String>,
        delay: Option<Duration>,
        once: bool,
    ) {
        let mut state = self.state.lock().unwrap();
        state.routes.entry(self.key.clone()).or_default().rules.push(Rule {
            when_bearer,
            once,
            used: false,
            status,
            body,
            delay,
        });
    }

    /// How many requests reached this route.
    pub fn hits(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.routes.get(&self.key).map(|r| r.hits).unwrap_or(0)
    }

    pub fn last_request(&self) -> RecordedRequest {
        let state = self.state.lock().unwrap();
        state
            .routes
            .get(&self.key)
            .and_then(|r| r.requests.last().cloned())
            .expect("no requests recorded for route")
    }
}

async fn handle_connection(mut stream: TcpStream, state: Arc<Mutex<ServerState>>) {
    let mut buf = Vec::new();
    let header_end = loop {
        let mut chunk = [0u8; 1024];
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.lines();
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.split_whitespace();
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();

    let mut headers = Vec::new();
    for line in lines {
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let content_length: usize = headers
        .iter()
        .find(|(n, _)| n == "content-length")
        .and_then(|(_, v)| v.parse().ok())
        .unwrap_or(0);

    let body_start = header_end + 4;
    while buf.len() < body_start + content_length {
        let mut chunk = [0u8; 1024];
        let n = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buf.extend_from_slice(&chunk[..n]);
    }
    let body = String::from_utf8_lossy(&buf[body_start..body_start + content_length]).to_string();

    let path = target.split('?').next().unwrap_or(&target).to_string();
    let recorded = RecordedRequest {
        method: method.clone(),
        target,
        headers,
        body,
    };

    // Pick a rule under the lock, release it before any delay.
    let (status, response_body, delay) = {
        let mut state = state.lock().unwrap();
        let route = state.routes.entry((method, path)).or_default();
        route.hits += 1;
        let bearer = recorded.bearer().map(str::to_string);
        route.requests.push(recorded);

        let mut matched = None;
        for rule in route.rules.iter_mut() {
            if rule.once && rule.used {
                continue;
            }
            if let Some(ref expected) = rule.when_bearer {
                if bearer.as_deref() != Some(expected.as_str()) {
                    continue;
                }
            }
            if rule.once {
                rule.used = true;
            }
            matched = Some((rule.status, rule.body.clone(), rule.delay));
            break;
        }
        matched.unwrap_or((404, r#"{"detail": "Not found"}"#.to_string(), None))
    };

    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }

    let mut response = format!("HTTP/1.1 {} {}\r\n", status, reason_phrase(status));
    if status != 204 {
        response.push_str("Content-Type: application/json\r\n");
        response.push_str(&format!("Content-Length: {}\r\n", response_body.len()));
    }
    response.push_str("Connection: close\r\n\r\n");
    if status != 204 {
        response.push_str(&response_body);
    }

    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.flush().await;
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}
