//! Primary source whose endpoint is found at runtime.
//!
//! The resolved endpoint is cached until a response from it no longer carries
//! the tracked item, then resolved again on the next fetch.

use crate::error::{Result, SourceError};
use crate::http::fetch_snapshot;
use crate::payload::ItemQuery;
use async_trait::async_trait;
use finwatch_traits::{BoxError, Snapshot, SourceKind, StockSource};
use reqwest::Client;
use std::sync::Mutex;

#[async_trait]
pub trait EndpointResolver: Send + Sync {
    async fn resolve(&self) -> Result<String>;
}

/// Probes candidates in order and keeps the first that lists the item.
pub struct CandidateResolver {
    client: Client,
    candidates: Vec<String>,
    query: ItemQuery,
}

impl CandidateResolver {
    pub fn new(client: Client, candidates: Vec<String>, query: ItemQuery) -> Self {
        Self {
            client,
            candidates,
            query,
        }
    }
}

#[async_trait]
impl EndpointResolver for CandidateResolver {
    async fn resolve(&self) -> Result<String> {
        for url in &self.candidates {
            match fetch_snapshot(&self.client, url, SourceKind::Primary, &self.query).await {
                Ok(_) => {
                    tracing::info!(endpoint = %url, "primary endpoint resolved");
                    return Ok(url.clone());
                }
                Err(e) => tracing::debug!(endpoint = %url, error = %e, "candidate rejected"),
            }
        }
        Err(SourceError::Discovery {
            item_id: self.query.item_id,
            tried: self.candidates.len(),
        })
    }
}

pub struct DiscoveringSource<R> {
    resolver: R,
    client: Client,
    query: ItemQuery,
    endpoint: Mutex<Option<String>>,
}

impl<R: EndpointResolver> DiscoveringSource<R> {
    pub fn new(resolver: R, client: Client, query: ItemQuery) -> Self {
        Self {
            resolver,
            client,
            query,
            endpoint: Mutex::new(None),
        }
    }

    /// Currently cached endpoint, if any.
    pub fn endpoint(&self) -> Option<String> {
        self.endpoint.lock().ok().and_then(|g| g.clone())
    }

    fn store(&self, value: Option<String>) {
        if let Ok(mut g) = self.endpoint.lock() {
            *g = value;
        }
    }

    async fn fetch_inner(&self) -> Result<Snapshot> {
        let url = match self.endpoint() {
            Some(u) => u,
            None => {
                let u = self.resolver.resolve().await?;
                self.store(Some(u.clone()));
                u
            }
        };
        let res = fetch_snapshot(&self.client, &url, SourceKind::Primary, &self.query).await;
        if let Err(e) = &res
            && e.is_data_shape()
        {
            tracing::warn!(endpoint = %url, error = %e, "endpoint no longer usable; will rediscover");
            self.store(None);
        }
        res
    }
}

#[async_trait]
impl<R: EndpointResolver> StockSource for DiscoveringSource<R> {
    async fn fetch(&self) -> std::result::Result<Snapshot, BoxError> {
        Ok(self.fetch_inner().await?)
    }
}
