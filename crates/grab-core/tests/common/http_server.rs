//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves a fixed route table. Each route has a status, a body and optional
//! behaviour for exercising failure paths: a delay before responding, or a
//! stall after half of the body has been sent.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub body: Vec<u8>,
    /// Wait this long before writing the response.
    pub delay: Duration,
    /// Send headers and half the body, then hang.
    pub stall: bool,
}

impl Route {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
            stall: false,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            delay: Duration::ZERO,
            stall: false,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn stalled(mut self) -> Self {
        self.stall = true;
        self
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ServerOptions {
    /// If false, HEAD returns 405 (simulates servers that block HEAD).
    pub head_allowed: bool,
    /// Wait this long before answering any HEAD.
    pub head_delay: Duration,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            head_allowed: true,
            head_delay: Duration::ZERO,
        }
    }
}

/// Counters of GET requests, shared with the test.
#[derive(Debug, Default)]
pub struct ServerStats {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    gets: AtomicUsize,
}

impl ServerStats {
    /// Most GETs that were waiting on their response at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        self.gets.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Starts a server in a background thread. Returns the base URL without a
/// trailing slash (e.g. "http://127.0.0.1:12345"). Unknown paths get 404.
pub fn start(routes: Vec<(&str, Route)>) -> String {
    start_with_options(routes, ServerOptions::default())
}

pub fn start_with_options(routes: Vec<(&str, Route)>, opts: ServerOptions) -> String {
    start_tracked(routes, opts).0
}

/// Like `start_with_options`, also returning the GET counters.
pub fn start_tracked(
    routes: Vec<(&str, Route)>,
    opts: ServerOptions,
) -> (String, Arc<ServerStats>) {
    let stats = Arc::new(ServerStats::default());
    let server_stats = Arc::clone(&stats);
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Route>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, route)| (path.to_string(), route))
            .collect(),
    );
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let stats = Arc::clone(&server_stats);
            thread::spawn(move || handle(stream, &routes, opts, &stats));
        }
    });
    (format!("http://127.0.0.1:{}", port), stats)
}

fn handle(
    mut stream: TcpStream,
    routes: &HashMap<String, Route>,
    opts: ServerOptions,
    stats: &ServerStats,
) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = match std::str::from_utf8(&buf[..n]) {
        Ok(s) => s,
        Err(_) => return,
    };
    let (method, path) = parse_request_line(request);
    let missing = Route::status(404);
    let route = routes.get(path).unwrap_or(&missing);

    if method.eq_ignore_ascii_case("HEAD") {
        if !opts.head_delay.is_zero() {
            thread::sleep(opts.head_delay);
        }
        if !opts.head_allowed {
            let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
            return;
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            status_line(route.status),
            route.body.len()
        );
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if !method.eq_ignore_ascii_case("GET") {
        let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
        return;
    }

    stats.enter();
    if !route.delay.is_zero() {
        thread::sleep(route.delay);
    }
    stats.leave();
    let response = format!(
        "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status_line(route.status),
        route.body.len()
    );
    if stream.write_all(response.as_bytes()).is_err() {
        return;
    }
    if route.stall {
        let half = route.body.len() / 2;
        let _ = stream.write_all(&route.body[..half]);
        let _ = stream.flush();
        thread::sleep(Duration::from_secs(30));
        return;
    }
    let _ = stream.write_all(&route.body);
}

fn parse_request_line(request: &str) -> (&str, &str) {
    let mut parts = request.lines().next().unwrap_or("").split_whitespace();
    let method = parts.next().unwrap_or("");
    let path = parts.next().unwrap_or("/");
    (method, path)
}

fn status_line(status: u16) -> String {
    let reason = match status {
        200 => "OK",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    };
    format!("{} {}", status, reason)
}
