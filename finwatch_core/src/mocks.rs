//! Scripted adapters for tests and dry runs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use finwatch_traits::{BoxError, Message, Notifier, Snapshot, SourceKind, StockSource};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Primary-source snapshot with the given quantity.
pub fn snapshot(quantity: u32) -> Snapshot {
    Snapshot {
        quantity,
        cost: 45_000,
        source: SourceKind::Primary,
        authoritative_restock: None,
    }
}

/// Primary-source snapshot carrying an authoritative restock time.
pub fn snapshot_with_restock(quantity: u32, restock: DateTime<Utc>) -> Snapshot {
    Snapshot {
        authoritative_restock: Some(restock),
        ..snapshot(quantity)
    }
}

/// Source that replays queued results. An empty queue reads as a failure.
/// Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    queue: Arc<Mutex<VecDeque<Result<Snapshot, String>>>>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, snap: Snapshot) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Ok(snap));
        }
    }

    pub fn push_failure(&self, reason: impl Into<String>) {
        if let Ok(mut q) = self.queue.lock() {
            q.push_back(Err(reason.into()));
        }
    }
}

#[async_trait]
impl StockSource for ScriptedSource {
    async fn fetch(&self) -> Result<Snapshot, BoxError> {
        let next = self.queue.lock().ok().and_then(|mut q| q.pop_front());
        match next {
            Some(Ok(s)) => Ok(s),
            Some(Err(reason)) => Err(reason.into()),
            None => Err("script exhausted".into()),
        }
    }
}

/// Notifier that keeps every accepted message and can be told to fail.
/// Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<Message>>>,
    failures_left: Arc<Mutex<usize>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject the next `n` sends.
    pub fn fail_next(&self, n: usize) {
        if let Ok(mut f) = self.failures_left.lock() {
            *f = n;
        }
    }

    pub fn messages(&self) -> Vec<Message> {
        self.sent.lock().map(|g| g.clone()).unwrap_or_default()
    }

    pub fn titles(&self) -> Vec<String> {
        self.messages().into_iter().map(|m| m.title).collect()
    }

    pub fn clear(&self) {
        if let Ok(mut g) = self.sent.lock() {
            g.clear();
        }
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        if let Ok(mut f) = self.failures_left.lock()
            && *f > 0
        {
            *f -= 1;
            return Err("transport rejected message".into());
        }
        if let Ok(mut g) = self.sent.lock() {
            g.push(message.clone());
        }
        Ok(())
    }
}
