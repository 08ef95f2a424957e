//! Mock WebSocket push channel for integration tests.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio_tungstenite::tungstenite::Message;

/// What a connected client should be fed next.
#[derive(Debug, Clone)]
pub enum Directive {
    /// Send a text frame.
    Text(String),
    /// Send a proper close frame.
    Close,
    /// Drop the connection without a closing handshake.
    Abort,
}

/// A WebSocket server on an ephemeral port. Every accepted connection plays
/// the directives broadcast from the test body.
pub struct MockChannel {
    addr: SocketAddr,
    directives: broadcast::Sender<Directive>,
    /// Total connections accepted.
    pub connections: Arc<AtomicUsize>,
    /// Connections currently open.
    pub open: Arc<AtomicUsize>,
}

impl MockChannel {
    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (directives, _) = broadcast::channel::<Directive>(64);
        let connections = Arc::new(AtomicUsize::new(0));
        let open = Arc::new(AtomicUsize::new(0));

        let accept_directives = directives.clone();
        let accept_connections = Arc::clone(&connections);
        let accept_open = Arc::clone(&open);
        tokio::spawn(async move {
            loop {
                let (stream, _) = match listener.accept().await {
                    Ok(pair) => pair,
                    Err(_) => break,
                };

                let mut rx = accept_directives.subscribe();
                let connections = Arc::clone(&accept_connections);
                let open = Arc::clone(&accept_open);
                tokio::spawn(async move {
                    let ws = match tokio_tungstenite::accept_async(stream).await {
                        Ok(ws) => ws,
                        Err(_) => return,
                    };
                    connections.fetch_add(1, Ordering::SeqCst);
                    open.fetch_add(1, Ordering::SeqCst);

                    let (mut write, mut read) = ws.split();
                    loop {
                        tokio::select! {
                            directive = rx.recv() => match directive {
                                Ok(Directive::Text(text)) => {
                                    if write.send(Message::Text(text)).await.is_err() {
                                        break;
                                    }
                                }
                                Ok(Directive::Close) => {
                                    let _ = write.send(Message::Close(None)).await;
                                    break;
                                }
                                Ok(Directive::Abort) => {
                                    // Drop both halves with no close frame
                                    break;
                                }
                                Err(_) => break,
                            },
                            msg = read.next() => match msg {
                                Some(Ok(Message::Close(_))) | None => break,
                                Some(Ok(_)) => {}
                                Some(Err(_)) => break,
                            }
                        }
                    }

                    open.fetch_sub(1, Ordering::SeqCst);
                });
            }
        });

        Self {
            addr,
            directives,
            connections,
            open,
        }
    }

    /// Channel URL for a task, mirroring the backend's path layout.
    pub fn url(&self, task_id: &str) -> String {
        format!("ws://{}/categorization/ws/{}", self.addr, task_id)
    }

    /// Base URL for configs whose acceptance payloads carry relative paths.
    pub fn ws_base(&self) -> String {
        format!("ws://{}", self.addr)
    }

    pub fn send_text(&self, text: impl Into<String>) {
        let _ = self.directives.send(Directive::Text(text.into()));
    }

    pub fn send_json(&self, value: &Value) {
        self.send_text(value.to_string());
    }

    pub fn send_progress(&self, task_id: &str, status: &str, current: u32, total: u32) {
        self.send_json(&json!({
            "type": "progress",
            "task_id": task_id,
            "data": {
                "status": status,
                "current_batch": current,
                "total_batches": total,
                "processed": (current as u64) * 5,
                "total": (total as u64) * 5,
                "progress_percentage": (current as f64) * 100.0 / (total as f64),
                "throughput_per_minute": 100.0,
                "message": format!("Batch {}/{}", current, total)
            }
        }));
    }

    pub fn send_completion(&self, task_id: &str, data: Value) {
        self.send_json(&json!({
            "type": "completion",
            "task_id": task_id,
            "data": data
        }));
    }

    pub fn close_all(&self) {
        let _ = self.directives.send(Directive::Close);
    }

    pub fn abort_all(&self) {
        let _ = self.directives.send(Directive::Abort);
    }

    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    pub fn total_connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}
