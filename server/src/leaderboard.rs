use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use chrono::Utc;
use tokio::sync::Mutex;

use common::records::LeaderboardEntry;
use common::{UserId, log};

use crate::store_error::StoreError;

/// Best-score table, at most one row per user.
pub trait LeaderboardStore: Send + Sync + 'static {
    fn best_score(&self, user_id: &UserId) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send;

    /// Inserts or replaces the row for `entry.user_id`.
    fn upsert(&self, entry: LeaderboardEntry) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Highest scores first; equal scores keep store order.
    fn top(&self, limit: usize) -> impl Future<Output = Result<Vec<LeaderboardEntry>, StoreError>> + Send;
}

pub struct MemoryLeaderboardStore {
    entries: Mutex<Vec<LeaderboardEntry>>,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryLeaderboardStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLeaderboardStore {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            snapshot_path: None,
        }
    }

    /// Loads the snapshot at `path` if it exists; every later write is
    /// flushed back to it.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let entries = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        log!("Loaded {} leaderboard entries from {}", entries.len(), path.display());

        Ok(Self {
            entries: Mutex::new(entries),
            snapshot_path: Some(path.to_path_buf()),
        })
    }

    async fn save_snapshot(&self, entries: &[LeaderboardEntry]) -> Result<(), StoreError> {
        if let Some(path) = &self.snapshot_path {
            let json = serde_json::to_vec_pretty(entries)?;
            tokio::fs::write(path, json).await?;
        }
        Ok(())
    }
}

impl LeaderboardStore for MemoryLeaderboardStore {
    async fn best_score(&self, user_id: &UserId) -> Result<Option<u64>, StoreError> {
        let entries = self.entries.lock().await;
        Ok(entries.iter().find(|e| &e.user_id == user_id).map(|e| e.score))
    }

    /// The snapshot is written before the rows change, so a failed write
    /// leaves the table as it was.
    async fn upsert(&self, entry: LeaderboardEntry) -> Result<(), StoreError> {
        let mut entries = self.entries.lock().await;
        let mut updated = entries.clone();
        match updated.iter_mut().find(|e| e.user_id == entry.user_id) {
            Some(existing) => *existing = entry,
            None => updated.push(entry),
        }
        self.save_snapshot(&updated).await?;
        *entries = updated;
        Ok(())
    }

    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        let mut ranking = self.entries.lock().await.clone();
        ranking.sort_by(|a, b| b.score.cmp(&a.score));
        ranking.truncate(limit);
        Ok(ranking)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn Fn(&[LeaderboardEntry]) + Send + Sync>;

/// Applies score submissions and tells listeners about the refreshed
/// ranking after every committed change.
pub struct Leaderboard<S: LeaderboardStore> {
    store: S,
    limit: usize,
    write_lock: Mutex<()>,
    listeners: Mutex<HashMap<ListenerId, Listener>>,
    next_listener_id: AtomicU64,
}

impl<S: LeaderboardStore> Leaderboard<S> {
    pub fn new(store: S, limit: usize) -> Self {
        Self {
            store,
            limit,
            write_lock: Mutex::new(()),
            listeners: Mutex::new(HashMap::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, StoreError> {
        self.store.top(limit).await
    }

    /// Returns whether the submission replaced the user's best. Ties keep
    /// the existing row and its timestamp.
    pub async fn submit(&self, user_id: &UserId, username: &str, score: u64) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;

        if let Some(best) = self.store.best_score(user_id).await?
            && best >= score
        {
            return Ok(false);
        }

        self.store
            .upsert(LeaderboardEntry {
                user_id: user_id.clone(),
                username: username.to_string(),
                score,
                achieved_at: Utc::now().to_rfc3339(),
            })
            .await?;

        let ranking = self.store.top(self.limit).await?;
        self.notify(&ranking).await;
        Ok(true)
    }

    pub async fn register_listener<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&[LeaderboardEntry]) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_listener_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.lock().await.insert(id, Box::new(listener));
        id
    }

    pub async fn unregister_listener(&self, id: ListenerId) {
        self.listeners.lock().await.remove(&id);
    }

    async fn notify(&self, ranking: &[LeaderboardEntry]) {
        let listeners = self.listeners.lock().await;
        for listener in listeners.values() {
            listener(ranking);
        }
    }
}
