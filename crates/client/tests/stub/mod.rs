//! Minimal HTTP server for pipeline tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Route {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
    pub delay: Duration,
}

#[allow(dead_code)]
impl Route {
    pub fn html(content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self { status: 200, content_type: Some(content_type.to_string()), body: body.into(), delay: Duration::ZERO }
    }

    pub fn json(body: &serde_json::Value) -> Self {
        Self::html("application/json", body.to_string())
    }

    pub fn status(status: u16) -> Self {
        Self { status, content_type: Some("text/plain".into()), body: b"error".to_vec(), delay: Duration::ZERO }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[derive(Debug, Default)]
struct Stats {
    hits: Mutex<HashMap<String, usize>>,
    requests: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

pub struct Stub {
    pub base_url: String,
    stats: Arc<Stats>,
    shutdown_tx: Option<mpsc::Sender<()>>,
    handle: Option<thread::JoinHandle<()>>,
}

#[allow(dead_code)]
impl Stub {
    /// Serve `routes`, keyed by path. Unknown paths answer 404.
    pub fn spawn(routes: Vec<(&str, Route)>) -> Self {
        let routes: Arc<HashMap<String, Route>> =
            Arc::new(routes.into_iter().map(|(path, route)| (path.to_string(), route)).collect());
        let server = tiny_http::Server::http("127.0.0.1:0").expect("start stub server");
        let base_url = format!("http://{}", server.server_addr());
        let stats = Arc::new(Stats::default());

        let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>();
        let server_stats = stats.clone();

        let handle = thread::spawn(move || {
            loop {
                if shutdown_rx.try_recv().is_ok() {
                    break;
                }

                let request = match server.recv_timeout(Duration::from_millis(20)) {
                    Ok(Some(req)) => req,
                    Ok(None) => continue,
                    Err(_) => break,
                };

                let routes = routes.clone();
                let stats = server_stats.clone();
                thread::spawn(move || {
                    let full = request.url().to_string();
                    let path = full.split('?').next().unwrap_or_default().to_string();

                    let current = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                    stats.max_in_flight.fetch_max(current, Ordering::SeqCst);
                    *stats.hits.lock().unwrap().entry(path.clone()).or_default() += 1;
                    stats.requests.lock().unwrap().push(full);

                    let route = routes.get(&path).cloned().unwrap_or_else(|| Route::status(404));
                    thread::sleep(route.delay);

                    let mut response = tiny_http::Response::from_data(route.body).with_status_code(route.status);
                    if let Some(content_type) = route.content_type {
                        let header = tiny_http::Header::from_bytes(&b"Content-Type"[..], content_type.as_bytes())
                            .expect("valid header");
                        response = response.with_header(header);
                    }

                    stats.in_flight.fetch_sub(1, Ordering::SeqCst);
                    // The client may have hung up already.
                    let _ = request.respond(response);
                });
            }
        });

        Self { base_url, stats, shutdown_tx: Some(shutdown_tx), handle: Some(handle) }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub fn hits(&self, path: &str) -> usize {
        self.stats.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_hits(&self) -> usize {
        self.stats.hits.lock().unwrap().values().sum()
    }

    /// Raw request targets (path and query) in arrival order.
    pub fn requests(&self) -> Vec<String> {
        self.stats.requests.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.stats.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Drop for Stub {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
