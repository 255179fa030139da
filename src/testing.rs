//! Scripted renderer, in-memory fetcher and a loopback HTTP server for the unit tests

use crate::download::ImageFetcher;
use crate::error::{HarvestError, Result};
use crate::renderers::PageRenderer;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use url::Url;

/// A page whose height follows a fixed script, advancing one step per scroll
pub struct ScriptedPage {
    heights: Vec<u64>,
    growth: Option<u64>,
    html: Option<String>,
    fail_load: bool,
    fail_close: bool,
    pub scrolls: usize,
    pub waits: Vec<Duration>,
    pub closed: Arc<AtomicBool>,
}

impl ScriptedPage {
    /// Heights after 0, 1, 2, ... scrolls; the last one repeats forever
    pub fn new(heights: Vec<u64>) -> Self {
        Self {
            heights,
            growth: None,
            html: None,
            fail_load: false,
            fail_close: false,
            scrolls: 0,
            waits: Vec::new(),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// A page that grows by `step` on every scroll
    pub fn endless(step: u64) -> Self {
        Self {
            growth: Some(step),
            ..Self::new(Vec::new())
        }
    }

    pub fn failing_load() -> Self {
        Self {
            fail_load: true,
            ..Self::new(vec![0])
        }
    }

    /// A page whose session cannot be shut down cleanly
    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Serve fixed HTML instead of the height marker
    pub fn with_html(mut self, html: &str) -> Self {
        self.html = Some(html.to_string());
        self
    }

    pub fn html_for(height: u64) -> String {
        format!("<html><body data-height=\"{}\"></body></html>", height)
    }

    fn height(&self) -> u64 {
        match self.growth {
            Some(step) => step * (self.scrolls as u64 + 1),
            None => {
                let index = self.scrolls.min(self.heights.len().saturating_sub(1));
                self.heights.get(index).copied().unwrap_or(0)
            }
        }
    }
}

impl PageRenderer for ScriptedPage {
    async fn load(&mut self, url: &Url) -> Result<()> {
        if self.fail_load {
            return Err(HarvestError::page_load(url.as_str(), "connection refused"));
        }
        Ok(())
    }

    async fn current_height(&mut self) -> Result<u64> {
        Ok(self.height())
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.scrolls += 1;
        Ok(())
    }

    async fn wait(&mut self, pause: Duration) -> Result<()> {
        self.waits.push(pause);
        Ok(())
    }

    async fn rendered_html(&mut self) -> Result<String> {
        Ok(self
            .html
            .clone()
            .unwrap_or_else(|| Self::html_for(self.height())))
    }

    async fn close(self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        if self.fail_close {
            return Err(HarvestError::page_load("<scripted>", "session already gone"));
        }
        Ok(())
    }
}

enum Response {
    Body(Vec<u8>),
    Truncated(Vec<u8>),
    Failure,
}

/// Serves image bodies from memory; unknown URLs fail like a 404
#[derive(Default)]
pub struct MemoryFetcher {
    responses: HashMap<String, Response>,
}

impl MemoryFetcher {
    pub fn with_body(mut self, url: &str, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), Response::Body(body.to_vec()));
        self
    }

    pub fn with_failure(mut self, url: &str) -> Self {
        self.responses.insert(url.to_string(), Response::Failure);
        self
    }

    /// Writes `body` and then fails, as a dropped connection would
    pub fn with_truncated(mut self, url: &str, body: &[u8]) -> Self {
        self.responses
            .insert(url.to_string(), Response::Truncated(body.to_vec()));
        self
    }
}

impl ImageFetcher for MemoryFetcher {
    async fn fetch<W: AsyncWrite + Unpin>(&self, url: &Url, sink: &mut W) -> Result<u64> {
        match self.responses.get(url.as_str()) {
            Some(Response::Body(body)) => {
                sink.write_all(body).await?;
                sink.flush().await?;
                Ok(body.len() as u64)
            }
            Some(Response::Truncated(body)) => {
                sink.write_all(body).await?;
                sink.flush().await?;
                Err(HarvestError::image_fetch(url.as_str(), "connection reset"))
            }
            Some(Response::Failure) => Err(HarvestError::image_fetch(
                url.as_str(),
                "500 Internal Server Error",
            )),
            None => Err(HarvestError::image_fetch(url.as_str(), "404 Not Found")),
        }
    }
}

struct Route {
    status: u16,
    body: Vec<u8>,
    byte_delay: Option<Duration>,
}

/// Minimal HTTP/1.1 server on a loopback port; unknown paths answer 404
#[derive(Default)]
pub struct TestServer {
    routes: HashMap<String, Route>,
}

impl TestServer {
    pub fn route(mut self, path: &str, status: u16, body: &[u8]) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status,
                body: body.to_vec(),
                byte_delay: None,
            },
        );
        self
    }

    /// Sends the body one byte at a time, pausing `delay` before each byte
    pub fn slow_route(mut self, path: &str, body: &[u8], delay: Duration) -> Self {
        self.routes.insert(
            path.to_string(),
            Route {
                status: 200,
                body: body.to_vec(),
                byte_delay: Some(delay),
            },
        );
        self
    }

    /// Start serving and return the base URL
    pub async fn start(self) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let routes = Arc::new(self.routes);

        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(respond(socket, Arc::clone(&routes)));
            }
        });

        Url::parse(&format!("http://{}/", addr)).unwrap()
    }
}

async fn respond(mut socket: TcpStream, routes: Arc<HashMap<String, Route>>) {
    let mut request = Vec::new();
    let mut buf = [0u8; 1024];
    while !request.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut buf).await {
            Ok(0) | Err(_) => return,
            Ok(n) => request.extend_from_slice(&buf[..n]),
        }
    }

    let request = String::from_utf8_lossy(&request);
    let path = request.split_whitespace().nth(1).unwrap_or("/");
    let (status, body, byte_delay) = match routes.get(path) {
        Some(route) => (route.status, route.body.as_slice(), route.byte_delay),
        None => (404, b"not found".as_slice(), None),
    };
    let reason = if status == 200 { "OK" } else { "Error" };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/octet-stream\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        status,
        reason,
        body.len()
    );
    if socket.write_all(head.as_bytes()).await.is_err() {
        return;
    }

    match byte_delay {
        Some(delay) => {
            for byte in body {
                tokio::time::sleep(delay).await;
                if socket.write_all(&[*byte]).await.is_err() || socket.flush().await.is_err() {
                    return;
                }
            }
        }
        None => {
            let _ = socket.write_all(body).await;
        }
    }
    let _ = socket.shutdown().await;
}
