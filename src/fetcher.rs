//! Per-page list baselines.
//!
//! A baseline is the unfiltered collection a page last fetched. It is loaded
//! once when the page mounts or when the caller asks for a refresh, and every
//! filter change afterwards runs against it locally. A failed load is only
//! reported to the request that triggered it; the next read fetches again. Fetches are not
//! cancelled or sequenced: whichever response arrives last is stored, even if
//! it belongs to an older request.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::backend::ListPage;
use crate::error::AppError;

/// Upper bound on cached baselines per store; the oldest is evicted beyond it.
pub const MAX_BASELINES: usize = 512;

#[derive(Debug, Clone)]
pub struct Baseline<T> {
    pub items: Vec<T>,
    pub stats: Option<Value>,
    /// User-visible message when the last fetch failed; `items` is empty then.
    pub error: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

impl<T> Baseline<T> {
    pub fn loaded(page: ListPage<T>) -> Self {
        Self {
            items: page.items,
            stats: page.stats,
            error: None,
            fetched_at: Utc::now(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            items: Vec::new(),
            stats: None,
            error: Some(message.into()),
            fetched_at: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

pub struct BaselineStore<T> {
    name: &'static str,
    entries: RwLock<HashMap<String, Arc<Baseline<T>>>>,
}

impl<T> BaselineStore<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Baseline<T>>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Runs one fetch and stores its outcome as the baseline for `key`.
    ///
    /// The lock is not held across the fetch. A failure is stored as an empty
    /// baseline with `failure_message` (or the server's message) attached.
    pub async fn load<F, Fut>(&self, key: &str, failure_message: &str, fetch: F) -> Arc<Baseline<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ListPage<T>, AppError>>,
    {
        let baseline = match fetch().await {
            Ok(page) => {
                tracing::debug!("Loaded {} baseline with {} records", self.name, page.items.len());
                Baseline::loaded(page)
            }
            Err(e) => {
                tracing::error!("Fetching {} failed: {}", self.name, e);
                Baseline::failed(e.user_message(failure_message))
            }
        };
        let baseline = Arc::new(baseline);
        self.store(key, baseline.clone()).await;
        baseline
    }

    /// Returns the cached baseline, fetching on first use, after a failed load,
    /// or when `refresh` is set.
    pub async fn get_or_load<F, Fut>(
        &self,
        key: &str,
        refresh: bool,
        failure_message: &str,
        fetch: F,
    ) -> Arc<Baseline<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<ListPage<T>, AppError>>,
    {
        if !refresh {
            if let Some(existing) = self.get(key).await.filter(|b| !b.is_error()) {
                return existing;
            }
        }
        self.load(key, failure_message, fetch).await
    }

    /// Drops every baseline so the next read refetches; used after mutations.
    pub async fn invalidate_all(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn store(&self, key: &str, baseline: Arc<Baseline<T>>) {
        let mut entries = self.entries.write().await;
        if entries.len() >= MAX_BASELINES && !entries.contains_key(key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, b)| b.fetched_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(key.to_string(), baseline);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    fn page(items: Vec<u32>) -> ListPage<u32> {
        ListPage { items, stats: None }
    }

    #[tokio::test]
    async fn loads_once_until_refresh() {
        let store = BaselineStore::new("numbers");
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let fetch = move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(page(vec![1, 2, 3]))
        };

        let first = store.get_or_load("k", false, "failed", fetch).await;
        let second = store.get_or_load("k", false, "failed", fetch).await;
        assert_eq!(first.items, vec![1, 2, 3]);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        store.get_or_load("k", true, "failed", fetch).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn failure_leaves_empty_baseline_with_message() {
        let store = BaselineStore::<u32>::new("numbers");
        let failed = store
            .load("k", "Could not load donors", || async {
                Err(AppError::Business {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: None,
                })
            })
            .await;
        assert!(failed.items.is_empty());
        assert_eq!(failed.error.as_deref(), Some("Could not load donors"));
    }

    #[tokio::test]
    async fn empty_result_is_not_an_error() {
        let store = BaselineStore::<u32>::new("numbers");
        let empty = store.load("k", "failed", || async { Ok(page(vec![])) }).await;
        assert!(empty.items.is_empty());
        assert!(!empty.is_error());
    }

    #[tokio::test]
    async fn failed_refresh_replaces_good_baseline() {
        let store = BaselineStore::<u32>::new("numbers");
        store.load("k", "failed", || async { Ok(page(vec![7])) }).await;
        store
            .load("k", "Refresh failed", || async { Err(AppError::Decode("bad json".into())) })
            .await;
        let current = store.get("k").await.unwrap();
        assert!(current.items.is_empty());
        assert_eq!(current.error.as_deref(), Some("Refresh failed"));
    }

    /// Known race: a slow, older response that lands after a newer one overwrites it.
    #[tokio::test]
    async fn last_response_received_wins_even_when_stale() {
        let store = Arc::new(BaselineStore::<u32>::new("numbers"));
        let (old_tx, old_rx) = oneshot::channel::<Vec<u32>>();
        let (new_tx, new_rx) = oneshot::channel::<Vec<u32>>();

        let older = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .load("k", "failed", || async move { Ok(page(old_rx.await.unwrap())) })
                    .await
            })
        };
        let newer = {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .load("k", "failed", || async move { Ok(page(new_rx.await.unwrap())) })
                    .await
            })
        };

        new_tx.send(vec![2]).unwrap();
        newer.await.unwrap();
        assert_eq!(store.get("k").await.unwrap().items, vec![2]);

        old_tx.send(vec![1]).unwrap();
        older.await.unwrap();
        assert_eq!(store.get("k").await.unwrap().items, vec![1]);
    }

    #[tokio::test]
    async fn keys_are_isolated_and_invalidation_forces_refetch() {
        let store = BaselineStore::<u32>::new("numbers");
        store.load("a", "failed", || async { Ok(page(vec![1])) }).await;
        store.load("b", "failed", || async { Ok(page(vec![2])) }).await;
        assert_eq!(store.len().await, 2);

        assert_eq!(store.get("a").await.unwrap().items, vec![1]);
        assert_eq!(store.get("b").await.unwrap().items, vec![2]);

        store.invalidate_all().await;
        assert_eq!(store.len().await, 0);
        assert!(store.get("a").await.is_none());
    }

    #[tokio::test]
    async fn failed_baseline_is_refetched_without_refresh() {
        let store = BaselineStore::<u32>::new("numbers");
        let counter = AtomicUsize::new(0);
        let calls = &counter;
        let fetch = move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::Business {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: None,
                })
            } else {
                Ok(page(vec![4, 5]))
            }
        };

        let first = store.get_or_load("anonymous", false, "Failed to load", fetch).await;
        assert!(first.is_error());

        let second = store.get_or_load("anonymous", false, "Failed to load", fetch).await;
        assert!(!second.is_error());
        assert_eq!(second.items, vec![4, 5]);

        let third = store.get_or_load("anonymous", false, "Failed to load", fetch).await;
        assert!(Arc::ptr_eq(&second, &third));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn evicts_oldest_when_full() {
        let store = BaselineStore::<u32>::new("numbers");
        for i in 0..MAX_BASELINES {
            store
                .load(&format!("k{i}"), "failed", || async { Ok(page(vec![])) })
                .await;
        }
        store.load("extra", "failed", || async { Ok(page(vec![])) }).await;
        assert_eq!(store.len().await, MAX_BASELINES);
        assert!(store.get("extra").await.is_some());
    }
}
