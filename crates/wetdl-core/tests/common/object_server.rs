//! Minimal HTTP/1.1 object server for integration tests.
//!
//! Serves a fixed set of paths, each with a scripted reply (full body, error
//! status, body without Content-Length, truncated body, paused body, stalled body). Unknown
//! paths get 404. Counts GET requests per path so tests can assert that a
//! skipped object was never requested.

use std::collections::HashMap;
use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub enum Reply {
    /// 200 with an accurate Content-Length.
    Body(Vec<u8>),
    /// Bare status with an empty body.
    Status(u16),
    /// 200 without Content-Length; the body ends when the connection closes.
    NoLength(Vec<u8>),
    /// 200 declaring `declared` bytes, then sending only `sent` and closing.
    Truncated { declared: u64, sent: Vec<u8> },
    /// 200 with an accurate Content-Length; sends `head`, waits `pause`, sends `tail`.
    Paused {
        head: Vec<u8>,
        pause: Duration,
        tail: Vec<u8>,
    },
    /// 200 declaring `declared` bytes, sending `head`, then going quiet for `stall`.
    Stall {
        declared: u64,
        head: Vec<u8>,
        stall: Duration,
    },
}

pub struct ObjectServer {
    base_url: String,
    hits: Arc<Mutex<HashMap<String, usize>>>,
}

impl ObjectServer {
    /// Base URL ending in `/` (e.g. "http://127.0.0.1:12345/").
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Number of requests received for `path` (with leading `/`).
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

/// Starts a server in a background thread serving `routes` (paths with leading `/`).
/// The server runs until the process exits.
pub fn start(routes: Vec<(&str, Reply)>) -> ObjectServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let routes: Arc<HashMap<String, Reply>> = Arc::new(
        routes
            .into_iter()
            .map(|(path, reply)| (path.to_string(), reply))
            .collect(),
    );
    let hits = Arc::new(Mutex::new(HashMap::new()));
    let server_hits = Arc::clone(&hits);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let routes = Arc::clone(&routes);
            let hits = Arc::clone(&server_hits);
            thread::spawn(move || handle(stream, &routes, &hits));
        }
    });
    ObjectServer {
        base_url: format!("http://127.0.0.1:{}/", port),
        hits,
    }
}

fn read_request_path(stream: &mut TcpStream) -> Option<String> {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(2)));
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = stream.read(&mut chunk).ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    let request = String::from_utf8_lossy(&buf);
    let mut parts = request.lines().next()?.split_whitespace();
    let _method = parts.next()?;
    parts.next().map(|p| p.to_string())
}

fn status_text(code: u16) -> &'static str {
    match code {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

fn handle(mut stream: TcpStream, routes: &HashMap<String, Reply>, hits: &Mutex<HashMap<String, usize>>) {
    let _ = stream.set_write_timeout(Some(Duration::from_secs(5)));
    let Some(path) = read_request_path(&mut stream) else {
        return;
    };
    *hits.lock().unwrap().entry(path.clone()).or_insert(0) += 1;

    let reply = routes.get(&path).cloned().unwrap_or(Reply::Status(404));
    match reply {
        Reply::Body(body) => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body);
        }
        Reply::Status(code) => {
            let head = format!(
                "HTTP/1.1 {} {}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
                code,
                status_text(code)
            );
            let _ = stream.write_all(head.as_bytes());
        }
        Reply::NoLength(body) => {
            let _ = stream.write_all(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
            let _ = stream.write_all(&body);
        }
        Reply::Truncated { declared, sent } => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&sent);
        }
        Reply::Paused { head: body_head, pause, tail } => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body_head.len() + tail.len()
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body_head);
            let _ = stream.flush();
            thread::sleep(pause);
            let _ = stream.write_all(&tail);
        }
        Reply::Stall {
            declared,
            head: body_head,
            stall,
        } => {
            let head = format!(
                "HTTP/1.1 200 OK\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                declared
            );
            let _ = stream.write_all(head.as_bytes());
            let _ = stream.write_all(&body_head);
            let _ = stream.flush();
            thread::sleep(stall);
        }
    }
    let _ = stream.flush();
    let _ = stream.shutdown(std::net::Shutdown::Write);
}
