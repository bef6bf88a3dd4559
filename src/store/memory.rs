//! In-memory repository
//!
//! BTreeMap-backed implementation used by tests and offline runs. Range scans
//! come back in ascending sort-key order, matching the Postgres adapter.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::Result;

use super::{Page, QueryPage, Record, Repository, SortRange};

type Key = (String, String);

/// BTreeMap-backed repository
#[derive(Clone, Default)]
pub struct MemoryRepository {
    records: Arc<RwLock<BTreeMap<Key, Record>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, across all partitions
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn get(&self, partition_key: &str, sort_key: &str) -> Result<Option<Record>> {
        let records = self.records.read().await;
        Ok(records
            .get(&(partition_key.to_string(), sort_key.to_string()))
            .cloned())
    }

    async fn put(&self, record: Record) -> Result<()> {
        let mut records = self.records.write().await;
        records.insert(
            (record.partition_key.clone(), record.sort_key.clone()),
            record,
        );
        Ok(())
    }

    async fn query(&self, partition_key: &str, range: SortRange, page: Page) -> Result<QueryPage> {
        let records = self.records.read().await;

        // Start of the partition, or just past the pagination token
        let lower = match &page.token {
            Some(token) => Bound::Excluded((partition_key.to_string(), token.clone())),
            None => Bound::Included((partition_key.to_string(), String::new())),
        };
        let upper = Bound::Excluded((format!("{partition_key}\u{10FFFF}"), String::new()));

        let limit = page.limit.max(1);
        let mut items = Vec::with_capacity(limit);
        let mut more = false;

        for ((partition, sort), record) in records.range((lower, upper)) {
            if partition != partition_key {
                break;
            }
            if !range.contains(sort) {
                continue;
            }
            if items.len() == limit {
                more = true;
                break;
            }
            items.push(record.clone());
        }

        let next_token = if more {
            items.last().map(|r: &Record| r.sort_key.clone())
        } else {
            None
        };

        Ok(QueryPage { items, next_token })
    }

    async fn delete(&self, partition_key: &str, sort_key: &str) -> Result<()> {
        let mut records = self.records.write().await;
        records.remove(&(partition_key.to_string(), sort_key.to_string()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::query_all;

    async fn seeded() -> MemoryRepository {
        let repo = MemoryRepository::new();
        for i in 0..5 {
            repo.put(Record::new("p1", format!("s{i}"), &i).unwrap())
                .await
                .unwrap();
        }
        repo.put(Record::new("p2", "other", &99).unwrap())
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn test_get_put_roundtrip() {
        let repo = MemoryRepository::new();
        repo.put(Record::new("p", "s", &42).unwrap())
            .await
            .unwrap();
        let record = repo.get("p", "s").await.unwrap().unwrap();
        let value: i32 = record.decode().unwrap();
        assert_eq!(value, 42);
        assert!(repo.get("p", "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_query_respects_partition_boundary() {
        let repo = seeded().await;
        let page = repo
            .query("p1", SortRange::All, Page::first(100))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 5);
        assert!(page.next_token.is_none());
    }

    #[tokio::test]
    async fn test_query_pagination_resumes_from_token() {
        let repo = seeded().await;
        let first = repo
            .query("p1", SortRange::All, Page::first(2))
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        let token = first.next_token.clone().expect("more pages");

        let second = repo
            .query("p1", SortRange::All, Page::after(2, token))
            .await
            .unwrap();
        assert_eq!(second.items[0].sort_key, "s2");
    }

    #[tokio::test]
    async fn test_query_all_drains_every_page() {
        let repo = seeded().await;
        let items = query_all(&repo, "p1", SortRange::All, 2).await.unwrap();
        assert_eq!(items.len(), 5);
        let keys: Vec<&str> = items.iter().map(|r| r.sort_key.as_str()).collect();
        assert_eq!(keys, vec!["s0", "s1", "s2", "s3", "s4"]);
    }

    #[tokio::test]
    async fn test_prefix_range() {
        let repo = MemoryRepository::new();
        for sort in ["g1#a", "g1#b", "g2#a"] {
            repo.put(Record::new("p", sort, &0).unwrap()).await.unwrap();
        }
        let page = repo
            .query("p", SortRange::Prefix("g1#".to_string()), Page::first(10))
            .await
            .unwrap();
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = seeded().await;
        repo.delete("p1", "s0").await.unwrap();
        assert!(repo.get("p1", "s0").await.unwrap().is_none());
        assert_eq!(repo.len().await, 5);
    }
}
