use std::collections::HashMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use common::{UserId, log, log_warn};
use common::records::{PlayerProfile, SessionRecord};

use crate::store_error::StoreError;

pub trait SessionRecorder: Send + Sync + 'static {
    fn record(&self, record: SessionRecord) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Keeps per-player totals in memory, optionally appending each finished
/// session as one JSON line to a file.
pub struct SessionLog {
    file_path: Option<PathBuf>,
    profiles: Mutex<HashMap<UserId, PlayerProfile>>,
}

impl SessionLog {
    pub fn in_memory() -> Self {
        Self {
            file_path: None,
            profiles: Mutex::new(HashMap::new()),
        }
    }

    /// Replays the sessions already in `path` into the profile totals; later
    /// records are appended to the same file. Unreadable lines are skipped.
    pub async fn load(path: &Path) -> Result<Self, StoreError> {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };

        let mut profiles: HashMap<UserId, PlayerProfile> = HashMap::new();
        let mut replayed = 0;
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SessionRecord>(line) {
                Ok(record) => {
                    profiles
                        .entry(record.user_id.clone())
                        .or_insert_with(|| PlayerProfile::new(record.user_id.clone()))
                        .apply(&record);
                    replayed += 1;
                }
                Err(e) => log_warn!("Skipping session line {} in {}: {}", index + 1, path.display(), e),
            }
        }
        log!("Replayed {} sessions for {} players from {}", replayed, profiles.len(), path.display());

        Ok(Self {
            file_path: Some(path.to_path_buf()),
            profiles: Mutex::new(profiles),
        })
    }

    pub async fn profile(&self, user_id: &UserId) -> Option<PlayerProfile> {
        self.profiles.lock().await.get(user_id).cloned()
    }

    async fn append_to_file(&self, record: &SessionRecord) -> Result<(), StoreError> {
        let Some(path) = &self.file_path else {
            return Ok(());
        };

        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        file.write_all(&line).await?;
        file.flush().await?;
        Ok(())
    }
}

impl SessionRecorder for SessionLog {
    async fn record(&self, record: SessionRecord) -> Result<(), StoreError> {
        self.append_to_file(&record).await?;

        self.profiles
            .lock()
            .await
            .entry(record.user_id.clone())
            .or_insert_with(|| PlayerProfile::new(record.user_id.clone()))
            .apply(&record);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::games::snake::GameMode;
    use common::records::DeviceType;

    fn record(user: &str, score: u64) -> SessionRecord {
        SessionRecord {
            user_id: UserId::new(user),
            score,
            level: 1,
            duration_secs: 42,
            max_length: 3 + (score / 10) as usize,
            food_eaten: score / 10,
            power_ups_collected: 0,
            game_mode: GameMode::Classic,
            device_type: DeviceType::Desktop,
            created_at: "2026-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn test_records_update_profiles() {
        let log = SessionLog::in_memory();
        log.record(record("alice", 30)).await.unwrap();
        log.record(record("alice", 50)).await.unwrap();
        log.record(record("bob", 10)).await.unwrap();

        let alice = log.profile(&UserId::new("alice")).await.unwrap();
        assert_eq!(alice.total_score, 80);
        assert_eq!(alice.games_played, 2);
        assert_eq!(log.profile(&UserId::new("bob")).await.unwrap().games_played, 1);
        assert!(log.profile(&UserId::new("carol")).await.is_none());
    }

    #[tokio::test]
    async fn test_file_log_appends_json_lines() {
        let path = std::env::temp_dir().join(format!(
            "snake_sessions_{}_{}.jsonl",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let log = SessionLog::load(&path).await.unwrap();
        log.record(record("alice", 20)).await.unwrap();
        log.record(record("bob", 40)).await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<SessionRecord> = content
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines, vec![record("alice", 20), record("bob", 40)]);

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_unwritable_file_fails_without_recording() {
        let path = std::env::temp_dir()
            .join("snake_missing_dir_for_sure")
            .join("nested")
            .join("sessions.jsonl");
        let log = SessionLog::load(&path).await.unwrap();

        let result = log.record(record("alice", 20)).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(log.profile(&UserId::new("alice")).await.is_none());
    }

    #[tokio::test]
    async fn test_profiles_survive_reload() {
        let path = std::env::temp_dir().join(format!(
            "snake_sessions_reload_{}_{}.jsonl",
            std::process::id(),
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ));
        let log = SessionLog::load(&path).await.unwrap();
        log.record(record("alice", 30)).await.unwrap();
        log.record(record("alice", 50)).await.unwrap();
        drop(log);

        let mut file = tokio::fs::OpenOptions::new().append(true).open(&path).await.unwrap();
        file.write_all(b"not a session\n\n").await.unwrap();
        drop(file);

        let reloaded = SessionLog::load(&path).await.unwrap();
        let alice = reloaded.profile(&UserId::new("alice")).await.unwrap();
        assert_eq!(alice.total_score, 80);
        assert_eq!(alice.games_played, 2);

        reloaded.record(record("alice", 10)).await.unwrap();
        let again = SessionLog::load(&path).await.unwrap();
        assert_eq!(again.profile(&UserId::new("alice")).await.unwrap().games_played, 3);

        let _ = tokio::fs::remove_file(&path).await;
    }
}
