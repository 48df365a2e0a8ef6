//! Parser delegate running on its own thread.
//!
//! Requests cross the boundary as `serde_json::Value` in both directions, so
//! nothing but plain data is shared with the delegate. Creation is serialized
//! by a mutex: concurrent callers never start two delegates. A delegate whose
//! thread has exited is replaced on the next request. The proxy never stops
//! a live delegate; it ends on its own once the proxy is dropped.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;
use titlefix_core::{Error, OffscreenResponse};
use tokio::sync::{Mutex, mpsc, oneshot};

use super::{HtmlParser, ParseRequest};
use crate::offscreen;

type Envelope = (Value, oneshot::Sender<Value>);

/// Parser that forwards every request to the delegate thread.
#[derive(Debug, Default)]
pub struct DelegateParser {
    context: Mutex<Option<mpsc::UnboundedSender<Envelope>>>,
    created: AtomicUsize,
}

impl DelegateParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many delegate contexts this proxy has started.
    pub fn contexts_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// Return a live delegate, starting one if needed.
    async fn ensure_context(&self) -> Result<mpsc::UnboundedSender<Envelope>, Error> {
        let mut slot = self.context.lock().await;
        if let Some(tx) = slot.as_ref().filter(|tx| !tx.is_closed()) {
            return Ok(tx.clone());
        }

        let tx = spawn_context()?;
        let generation = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(generation, "started parser delegate");
        *slot = Some(tx.clone());
        Ok(tx)
    }

    /// Send a serialized message to the delegate and decode its answer.
    pub async fn send(&self, message: Value) -> Result<OffscreenResponse, Error> {
        let tx = self.ensure_context().await?;
        let (reply_tx, reply_rx) = oneshot::channel();

        tx.send((message, reply_tx))
            .map_err(|_| Error::ParseFailed("parser delegate is not running".into()))?;

        let reply = reply_rx
            .await
            .map_err(|_| Error::ParseFailed("parser delegate dropped the request".into()))?;

        serde_json::from_value::<OffscreenResponse>(reply.clone())
            .map_err(|_| Error::ParseFailed(format!("response is not an OffscreenResponse: {reply}")))
    }
}

fn spawn_context() -> Result<mpsc::UnboundedSender<Envelope>, Error> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Envelope>();

    std::thread::Builder::new()
        .name("titlefix-parser".into())
        .spawn(move || {
            while let Some((message, reply)) = rx.blocking_recv() {
                let response = offscreen::on_message(&message);
                // The requester may have given up; nothing to do then.
                let _ = reply.send(Value::from(response));
            }
            tracing::debug!("parser delegate stopped");
        })
        .map_err(|e| Error::ParseFailed(format!("failed to start parser delegate: {e}")))?;

    Ok(tx)
}

#[async_trait]
impl HtmlParser for DelegateParser {
    async fn query(&self, request: ParseRequest) -> Result<OffscreenResponse, Error> {
        let kind = request.kind();
        let message =
            serde_json::to_value(&request).map_err(|e| Error::ParseFailed(format!("cannot encode {kind}: {e}")))?;
        self.send(message).await
    }

    fn name(&self) -> &'static str {
        "delegate"
    }
}
