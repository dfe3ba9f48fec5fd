use crate::error::{SourceError, is_data_shape};
use async_trait::async_trait;
use finwatch_traits::{BoxError, Snapshot, SourceKind, StockSource};
use std::time::Duration;
use tokio::time::timeout;

/// Primary first, secondary when the primary fails in any way.
///
/// Each attempt runs under its own timeout so a hung primary cannot eat the
/// secondary's budget.
pub struct FailoverSource<P, S> {
    primary: P,
    secondary: S,
    timeout: Duration,
}

impl<P, S> FailoverSource<P, S> {
    pub fn new(primary: P, secondary: S, timeout: Duration) -> Self {
        Self {
            primary,
            secondary,
            timeout,
        }
    }
}

async fn attempt<T: StockSource + ?Sized>(
    source: &T,
    kind: SourceKind,
    after: Duration,
) -> Result<Snapshot, BoxError> {
    match timeout(after, source.fetch()).await {
        Ok(res) => res,
        Err(_) => Err(Box::new(SourceError::Timeout { kind, after })),
    }
}

#[async_trait]
impl<P, S> StockSource for FailoverSource<P, S>
where
    P: StockSource,
    S: StockSource,
{
    async fn fetch(&self) -> Result<Snapshot, BoxError> {
        let primary_err = match attempt(&self.primary, SourceKind::Primary, self.timeout).await {
            Ok(snap) => return Ok(snap),
            Err(e) => e,
        };
        tracing::warn!(error = %primary_err, "primary unavailable; trying secondary");
        match attempt(&self.secondary, SourceKind::Secondary, self.timeout).await {
            Ok(snap) => Ok(snap),
            Err(secondary_err) => Err(Box::new(SourceError::Exhausted {
                data_shape: is_data_shape(&primary_err) && is_data_shape(&secondary_err),
                primary: primary_err.to_string(),
                secondary: secondary_err.to_string(),
            })),
        }
    }
}
