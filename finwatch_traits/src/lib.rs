//! Seams between the monitor core and the outside world.
//!
//! The core only ever talks to a [`StockSource`] (where snapshots come from),
//! a [`Notifier`] (where rendered messages go) and a [`Clock`] (what time it is).
pub mod clock;
pub mod message;

pub use clock::{Clock, ManualClock, SystemClock};
pub use message::{Field, Message};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Error type returned across adapter boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Which upstream produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SourceKind {
    Primary,
    Secondary,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Primary => f.write_str("primary"),
            SourceKind::Secondary => f.write_str("secondary"),
        }
    }
}

/// One observation of the tracked item, produced once per tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Snapshot {
    pub quantity: u32,
    pub cost: i64,
    pub source: SourceKind,
    /// Restock time reported directly by the upstream, if it reports one.
    pub authoritative_restock: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait StockSource: Send + Sync {
    async fn fetch(&self) -> Result<Snapshot, BoxError>;
}

#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver one message to the recipient. `Ok` means the transport accepted it.
    async fn send(&self, message: &Message) -> Result<(), BoxError>;
}

#[async_trait]
impl<T: StockSource + ?Sized> StockSource for Box<T> {
    async fn fetch(&self) -> Result<Snapshot, BoxError> {
        (**self).fetch().await
    }
}

#[async_trait]
impl<T: Notifier + ?Sized> Notifier for Box<T> {
    async fn send(&self, message: &Message) -> Result<(), BoxError> {
        (**self).send(message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    #[async_trait]
    impl StockSource for Fixed {
        async fn fetch(&self) -> Result<Snapshot, BoxError> {
            Ok(Snapshot {
                quantity: 3,
                cost: 100,
                source: SourceKind::Secondary,
                authoritative_restock: None,
            })
        }
    }

    #[tokio::test]
    async fn boxed_source_delegates() {
        let src: Box<dyn StockSource> = Box::new(Fixed);
        let snap = src.fetch().await.unwrap();
        assert_eq!(snap.quantity, 3);
        assert_eq!(snap.source.to_string(), "secondary");
    }
}
