use finwatch_traits::{BoxError, SourceKind};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{kind} source timed out after {after:?}")]
    Timeout { kind: SourceKind, after: Duration },
    #[error("unexpected http status {0}")]
    Status(u16),
    #[error("malformed payload: {0}")]
    Payload(String),
    #[error("item {item_id} not listed in market '{market}'")]
    ItemMissing { market: String, item_id: u64 },
    #[error("all sources failed (primary: {primary}; secondary: {secondary})")]
    Exhausted {
        primary: String,
        secondary: String,
        data_shape: bool,
    },
    #[error("no candidate endpoint lists item {item_id} ({tried} tried)")]
    Discovery { item_id: u64, tried: usize },
}

impl SourceError {
    /// The upstream answered, but not with the data we track.
    pub fn is_data_shape(&self) -> bool {
        match self {
            SourceError::Payload(_)
            | SourceError::ItemMissing { .. }
            | SourceError::Discovery { .. } => true,
            SourceError::Exhausted { data_shape, .. } => *data_shape,
            _ => false,
        }
    }
}

/// `is_data_shape` for an error that crossed an adapter boundary.
pub fn is_data_shape(e: &BoxError) -> bool {
    e.downcast_ref::<SourceError>()
        .is_some_and(SourceError::is_data_shape)
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("http: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} returned {status}: {body}")]
    Status {
        endpoint: &'static str,
        status: u16,
        body: String,
    },
    #[error("dm channel response missing id")]
    MissingChannel,
}

pub type Result<T> = std::result::Result<T, SourceError>;
