//! Keyed repository abstraction
//!
//! Every component reads and writes through `Repository`: a flat keyed store
//! of JSON documents addressed by (partition_key, sort_key) composite strings.
//! Keys are chosen (see `keys`) so that each aggregate the engine needs —
//! "all verified predictions for model X on sport Y", "odds history for game
//! Z" — is a single paginated range query.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod keys;
pub mod ledger;
pub mod memory;
pub mod postgres;

pub use ledger::Ledger;
pub use memory::MemoryRepository;
pub use postgres::PgRepository;

/// One stored document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub partition_key: String,
    pub sort_key: String,
    pub payload: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new<T: Serialize>(
        partition_key: impl Into<String>,
        sort_key: impl Into<String>,
        payload: &T,
    ) -> Result<Self> {
        Ok(Self {
            partition_key: partition_key.into(),
            sort_key: sort_key.into(),
            payload: serde_json::to_value(payload)?,
            updated_at: Utc::now(),
        })
    }

    pub fn decode<T: for<'de> Deserialize<'de>>(&self) -> Result<T> {
        Ok(serde_json::from_value(self.payload.clone())?)
    }
}

/// Sort-key restriction on a partition scan
#[derive(Debug, Clone)]
pub enum SortRange {
    All,
    Prefix(String),
    /// Inclusive bounds
    Between(String, String),
}

impl SortRange {
    pub fn contains(&self, sort_key: &str) -> bool {
        match self {
            Self::All => true,
            Self::Prefix(prefix) => sort_key.starts_with(prefix.as_str()),
            Self::Between(lo, hi) => sort_key >= lo.as_str() && sort_key <= hi.as_str(),
        }
    }
}

/// Pagination request. `token` is the last sort key of the previous page
/// (exclusive start); a run interrupted mid-scan resumes from its last token.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub limit: usize,
    pub token: Option<String>,
}

impl Page {
    pub fn first(limit: usize) -> Self {
        Self { limit, token: None }
    }

    pub fn after(limit: usize, token: impl Into<String>) -> Self {
        Self {
            limit,
            token: Some(token.into()),
        }
    }
}

/// One page of query results
#[derive(Debug, Clone)]
pub struct QueryPage {
    pub items: Vec<Record>,
    /// Present when more items remain; feed back as `Page::token`
    pub next_token: Option<String>,
}

/// The abstract keyed repository every component is constructed with.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Repository: Send + Sync {
    /// Fetch one record by exact key
    async fn get(&self, partition_key: &str, sort_key: &str) -> Result<Option<Record>>;

    /// Insert or overwrite one record (idempotent upsert)
    async fn put(&self, record: Record) -> Result<()>;

    /// Range-scan a partition in ascending sort-key order
    async fn query(&self, partition_key: &str, range: SortRange, page: Page) -> Result<QueryPage>;

    /// Delete one record by exact key
    async fn delete(&self, partition_key: &str, sort_key: &str) -> Result<()>;
}

/// Drain every page of a range query into memory.
/// Only for partitions known to be bounded (weights, model configs).
pub async fn query_all(
    repo: &dyn Repository,
    partition_key: &str,
    range: SortRange,
    page_size: usize,
) -> Result<Vec<Record>> {
    let mut items = Vec::new();
    let mut page = Page::first(page_size);
    loop {
        let result = repo.query(partition_key, range.clone(), page).await?;
        items.extend(result.items);
        match result.next_token {
            Some(token) => page = Page::after(page_size, token),
            None => break,
        }
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_range_contains() {
        assert!(SortRange::All.contains("anything"));

        let prefix = SortRange::Prefix("g1#".to_string());
        assert!(prefix.contains("g1#book"));
        assert!(!prefix.contains("g2#book"));

        let between = SortRange::Between("2025-01-01".to_string(), "2025-01-31".to_string());
        assert!(between.contains("2025-01-15#g1"));
        assert!(!between.contains("2025-02-01#g1"));
    }

    #[test]
    fn test_record_roundtrip() {
        #[derive(Serialize, Deserialize, PartialEq, Debug)]
        struct Payload {
            value: i32,
        }

        let record = Record::new("p", "s", &Payload { value: 7 }).unwrap();
        let decoded: Payload = record.decode().unwrap();
        assert_eq!(decoded, Payload { value: 7 });
    }
}
