//! Stock payload parsing.
//!
//! Both upstreams answer with the same envelope:
//! `{"stocks": {"<market>": {"stocks": [{"id", "quantity", "cost", "nextRestock"?}]}}}`.
//! Only the tracked entry is decoded strictly; unrelated entries may be in any shape.

use crate::error::{Result, SourceError};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

/// Which entry to pull out of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemQuery {
    pub market: String,
    pub item_id: u64,
}

impl ItemQuery {
    pub fn new(market: impl Into<String>, item_id: u64) -> Self {
        Self {
            market: market.into(),
            item_id,
        }
    }
}

/// The tracked entry as reported upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRecord {
    pub quantity: u32,
    pub cost: i64,
    pub next_restock: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct RawItem {
    quantity: u32,
    #[serde(default)]
    cost: i64,
    #[serde(default, rename = "nextRestock")]
    next_restock: Option<String>,
}

pub fn parse_item(body: &[u8], query: &ItemQuery) -> Result<ItemRecord> {
    let root: Value =
        serde_json::from_slice(body).map_err(|e| SourceError::Payload(e.to_string()))?;
    let missing = || SourceError::ItemMissing {
        market: query.market.clone(),
        item_id: query.item_id,
    };
    let entries = root
        .get("stocks")
        .and_then(|s| s.get(&query.market))
        .and_then(|m| m.get("stocks"))
        .and_then(Value::as_array)
        .ok_or_else(missing)?;
    let entry = entries
        .iter()
        .find(|e| e.get("id").and_then(Value::as_u64) == Some(query.item_id))
        .ok_or_else(missing)?;
    let raw = RawItem::deserialize(entry)
        .map_err(|e| SourceError::Payload(format!("item {}: {e}", query.item_id)))?;

    let next_restock = raw.next_restock.as_deref().and_then(|s| {
        let parsed = parse_restock(s);
        if parsed.is_none() {
            tracing::debug!(value = s, "unparseable nextRestock ignored");
        }
        parsed
    });
    Ok(ItemRecord {
        quantity: raw.quantity,
        cost: raw.cost,
        next_restock,
    })
}

/// ISO-8601 instant. A trailing `Z` or an explicit offset is honoured; a
/// timestamp without either is taken as UTC.
pub fn parse_restock(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|n| n.and_utc())
}
