//! Minimal HTTP responder bound to the loopback interface.
//!
//! Answers every request with the same status and body and records the
//! request paths, which is all the runner's connectivity probe needs.

use std::io::{BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

pub struct FakeServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<String>>>,
    shutdown: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl FakeServer {
    /// Start a server answering `200 OK` with a version string.
    pub fn start() -> Self {
        Self::with_status(200, "5.6")
    }

    /// Start a server answering every request with `status`.
    pub fn with_status(status: u16, body: &str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback port");
        let addr = listener.local_addr().expect("Failed to read local address");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let shutdown = Arc::new(AtomicBool::new(false));

        let response = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            reason_phrase(status),
            body.len(),
            body
        );

        let thread_requests = Arc::clone(&requests);
        let thread_shutdown = Arc::clone(&shutdown);
        let handle = std::thread::Builder::new()
            .name("fake-server".to_string())
            .spawn(move || {
                for stream in listener.incoming() {
                    if thread_shutdown.load(Ordering::SeqCst) {
                        break;
                    }
                    if let Ok(stream) = stream {
                        serve(stream, &response, &thread_requests);
                    }
                }
            })
            .expect("Failed to spawn fake server thread");

        Self {
            addr,
            requests,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Base URL of the server, without a trailing slash.
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Paths of the requests received so far.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }
}

impl Drop for FakeServer {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::SeqCst);
        // Wake the accept loop so it observes the flag.
        let _ = TcpStream::connect_timeout(&self.addr, Duration::from_millis(200));
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn serve(mut stream: TcpStream, response: &str, requests: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(Duration::from_secs(5)));
    let mut reader = match stream.try_clone() {
        Ok(clone) => BufReader::new(clone),
        Err(_) => return,
    };

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).unwrap_or(0) == 0 {
        return;
    }

    // Drain headers up to the blank line.
    let mut header = String::new();
    while reader.read_line(&mut header).unwrap_or(0) > 0 {
        if header == "\r\n" || header == "\n" {
            break;
        }
        header.clear();
    }

    if let Some(path) = request_line.split_whitespace().nth(1)
        && let Ok(mut requests) = requests.lock()
    {
        requests.push(path.to_string());
    }

    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        _ => "Unknown",
    }
}

/// A loopback URL nothing listens on.
pub fn unreachable_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind loopback port");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    format!("http://{}", addr)
}
