use crate::error::{Result, SourceError};
use crate::payload::{ItemQuery, parse_item};
use async_trait::async_trait;
use finwatch_traits::{BoxError, Snapshot, SourceKind, StockSource};
use reqwest::Client;

/// Shared client for every upstream: JSON accept header, bounded request time.
pub fn build_client(timeout: std::time::Duration) -> Result<Client> {
    Ok(Client::builder()
        .timeout(timeout)
        .user_agent(concat!("finwatch/", env!("CARGO_PKG_VERSION")))
        .build()?)
}

/// GET `url` and extract the tracked item as a snapshot from `kind`.
///
/// Only the primary upstream's `nextRestock` is trusted.
pub async fn fetch_snapshot(
    client: &Client,
    url: &str,
    kind: SourceKind,
    query: &ItemQuery,
) -> Result<Snapshot> {
    let resp = client
        .get(url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(SourceError::Status(status.as_u16()));
    }
    let body = resp.bytes().await?;
    let item = parse_item(&body, query)?;
    Ok(Snapshot {
        quantity: item.quantity,
        cost: item.cost,
        source: kind,
        authoritative_restock: match kind {
            SourceKind::Primary => item.next_restock,
            SourceKind::Secondary => None,
        },
    })
}

/// One fixed upstream endpoint.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    url: String,
    kind: SourceKind,
    query: ItemQuery,
}

impl HttpSource {
    pub fn new(client: Client, url: impl Into<String>, kind: SourceKind, query: ItemQuery) -> Self {
        Self {
            client,
            url: url.into(),
            kind,
            query,
        }
    }

    pub fn primary(client: Client, url: impl Into<String>, query: ItemQuery) -> Self {
        Self::new(client, url, SourceKind::Primary, query)
    }

    pub fn secondary(client: Client, url: impl Into<String>, query: ItemQuery) -> Self {
        Self::new(client, url, SourceKind::Secondary, query)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> SourceKind {
        self.kind
    }
}

#[async_trait]
impl StockSource for HttpSource {
    async fn fetch(&self) -> std::result::Result<Snapshot, BoxError> {
        let snap = fetch_snapshot(&self.client, &self.url, self.kind, &self.query).await?;
        tracing::debug!(source = %self.kind, quantity = snap.quantity, "fetched");
        Ok(snap)
    }
}
