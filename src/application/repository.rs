//! # Survey Repository
//!
//! Owns every server's survey set: the JSON file on disk (`<data_dir>/<server>.json`)
//! and the in-memory cache mirroring it. The cache is only replaced after a
//! successful read or write, never ahead of one.
//!
//! Also keeps the trigger index, the subset of trigger messages that were
//! actually found on the platform.

use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

use crate::domain::traits::ChatPlatform;
use crate::domain::types::{Survey, SurveySet};
use crate::strings::logs;

static UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9._-]").expect("static regex"));

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid survey data in {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("survey data for server {server} failed to load, reload it first")]
    Unavailable { server: String },
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("survey '{0}' already exists")]
    AlreadyExists(String),
    #[error("survey '{0}' does not exist")]
    NotFound(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

pub struct SurveyRepository {
    data_dir: PathBuf,
    cache: RwLock<HashMap<String, SurveySet>>,
    /// server -> (survey name, confirmed trigger message id), in survey name order
    triggers: RwLock<HashMap<String, Vec<(String, String)>>>,
    /// Servers whose last load failed. Their files are not written until a load succeeds.
    failed: RwLock<HashSet<String>>,
    /// Serialises read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl SurveyRepository {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            cache: RwLock::new(HashMap::new()),
            triggers: RwLock::new(HashMap::new()),
            failed: RwLock::new(HashSet::new()),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the data file for a server; ids are sanitised into file names.
    pub fn data_path(&self, server_id: &str) -> PathBuf {
        let file = UNSAFE_FILENAME_CHARS.replace_all(server_id, "_");
        self.data_dir.join(format!("{file}.json"))
    }

    /// Reads the durable record into the cache. A missing file is created as `{}`.
    pub async fn load(&self, server_id: &str) -> Result<SurveySet, StorageError> {
        let path = self.data_path(server_id);
        let set = match tokio::fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str::<SurveySet>(&content).map_err(|source| {
                StorageError::Parse {
                    path: display(&path),
                    source,
                }
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = SurveySet::new();
                if let Err(e) = self.write_file(&path, &empty).await {
                    tracing::error!("{}", logs::data_file_create_failed(server_id, &e.to_string()));
                }
                Ok(empty)
            }
            Err(source) => Err(StorageError::Read {
                path: display(&path),
                source,
            }),
        };

        match set {
            Ok(set) => {
                self.failed.write().await.remove(server_id);
                self.cache
                    .write()
                    .await
                    .insert(server_id.to_string(), set.clone());
                Ok(set)
            }
            Err(e) => {
                tracing::error!("{}", logs::data_file_read_failed(server_id, &e.to_string()));
                self.failed.write().await.insert(server_id.to_string());
                Err(e)
            }
        }
    }

    /// Loads the server and builds its trigger index unless it is already cached.
    /// A failed load is logged by `load` and retried on the next call.
    pub async fn ensure_loaded(&self, server_id: &str, platform: &dyn ChatPlatform) {
        if self.is_loaded(server_id).await {
            return;
        }
        if self.load(server_id).await.is_ok() {
            self.refresh_triggers(server_id, platform).await;
        }
    }

    pub async fn is_loaded(&self, server_id: &str) -> bool {
        self.cache.read().await.contains_key(server_id)
    }

    /// Writes the whole set, then makes it visible in the cache.
    pub async fn save(&self, server_id: &str, set: SurveySet) -> Result<(), StorageError> {
        if self.failed.read().await.contains(server_id) {
            tracing::warn!("{}", logs::data_file_unavailable(server_id));
            return Err(StorageError::Unavailable {
                server: server_id.to_string(),
            });
        }
        let path = self.data_path(server_id);
        if let Err(e) = self.write_file(&path, &set).await {
            tracing::error!("{}", logs::data_file_write_failed(server_id, &e.to_string()));
            return Err(e);
        }
        self.cache.write().await.insert(server_id.to_string(), set);
        Ok(())
    }

    pub async fn snapshot(&self, server_id: &str) -> SurveySet {
        self.cache
            .read()
            .await
            .get(server_id)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn get(&self, server_id: &str, name: &str) -> Option<Survey> {
        self.cache
            .read()
            .await
            .get(server_id)
            .and_then(|set| set.get(name))
            .cloned()
    }

    pub async fn exists(&self, server_id: &str, name: &str) -> bool {
        self.get(server_id, name).await.is_some()
    }

    /// Adds a survey with the given questions. Existing names are rejected.
    pub async fn create(
        &self,
        server_id: &str,
        name: &str,
        questions: Vec<String>,
    ) -> Result<(), RepositoryError> {
        let _guard = self.write_lock.lock().await;
        let mut set = self.snapshot(server_id).await;
        if set.contains_key(name) {
            return Err(RepositoryError::AlreadyExists(name.to_string()));
        }
        set.insert(name.to_string(), Survey::new(questions));
        self.save(server_id, set).await?;
        Ok(())
    }

    /// Applies `mutate` to one survey and persists the result.
    pub async fn update<F>(
        &self,
        server_id: &str,
        name: &str,
        mutate: F,
    ) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut Survey),
    {
        let _guard = self.write_lock.lock().await;
        let mut set = self.snapshot(server_id).await;
        let Some(survey) = set.get_mut(name) else {
            return Err(RepositoryError::NotFound(name.to_string()));
        };
        mutate(survey);
        self.save(server_id, set).await?;
        Ok(())
    }

    /// Rebuilds the trigger index from the cached set, keeping only messages the platform can find.
    pub async fn refresh_triggers(&self, server_id: &str, platform: &dyn ChatPlatform) {
        let set = self.snapshot(server_id).await;
        let mut confirmed = Vec::new();

        for (name, survey) in &set {
            if survey.message.is_empty() {
                continue;
            }
            match platform.locate_message(server_id, &survey.message).await {
                Some(_) => confirmed.push((name.clone(), survey.message.clone())),
                None => tracing::warn!(
                    "{}",
                    logs::trigger_not_found(server_id, name, &survey.message)
                ),
            }
        }

        tracing::debug!("{}", logs::triggers_indexed(server_id, confirmed.len()));
        self.triggers
            .write()
            .await
            .insert(server_id.to_string(), confirmed);
    }

    /// First survey (in name order) whose confirmed trigger is `message_id`.
    pub async fn find_trigger(&self, server_id: &str, message_id: &str) -> Option<String> {
        self.triggers
            .read()
            .await
            .get(server_id)?
            .iter()
            .find(|(_, id)| id == message_id)
            .map(|(name, _)| name.clone())
    }

    async fn write_file(&self, path: &Path, set: &SurveySet) -> Result<(), StorageError> {
        let write_err = |source| StorageError::Write {
            path: display(path),
            source,
        };
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }
        let json = serde_json::to_string_pretty(set).map_err(|source| StorageError::Parse {
            path: display(path),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(write_err)?;
        tokio::fs::rename(&tmp, path).await.map_err(write_err)?;
        Ok(())
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::FakePlatform;
    use tempfile::TempDir;

    fn questions() -> Vec<String> {
        vec!["Q1".into(), "Q2".into()]
    }

    #[tokio::test]
    async fn test_load_missing_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());

        let set = repo.load("!room:example.org").await.unwrap();
        assert!(set.is_empty());

        let path = repo.data_path("!room:example.org");
        assert_eq!(path.file_name().unwrap(), "_room_example.org.json");
        assert_eq!(std::fs::read_to_string(path).unwrap().trim(), "{}");
        assert!(repo.is_loaded("!room:example.org").await);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicates() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        repo.load("s").await.unwrap();

        repo.create("s", "poll", questions()).await.unwrap();
        repo.update("s", "poll", |s| s.response_channel = "!r".into())
            .await
            .unwrap();

        let err = repo.create("s", "poll", vec!["other".into()]).await.unwrap_err();
        assert!(matches!(err, RepositoryError::AlreadyExists(name) if name == "poll"));
        assert_eq!(repo.get("s", "poll").await.unwrap().response_channel, "!r");
    }

    #[tokio::test]
    async fn test_create_then_reload_round_trips() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        repo.load("s").await.unwrap();
        repo.create("s", "poll", questions()).await.unwrap();
        repo.create("s", "intro", vec!["Hi?".into()]).await.unwrap();

        let before = std::fs::read_to_string(repo.data_path("s")).unwrap();
        let reloaded = repo.load("s").await.unwrap();
        assert_eq!(reloaded, repo.snapshot("s").await);
        assert_eq!(serde_json::to_string_pretty(&reloaded).unwrap(), before);

        repo.save("s", reloaded).await.unwrap();
        assert_eq!(std::fs::read_to_string(repo.data_path("s")).unwrap(), before);
    }

    #[tokio::test]
    async fn test_update_unknown_survey_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        repo.load("s").await.unwrap();
        repo.create("s", "poll", questions()).await.unwrap();
        let before = repo.snapshot("s").await;

        let err = repo
            .update("s", "missing", |s| s.response_channel = "!r".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound(_)));
        assert_eq!(repo.snapshot("s").await, before);
    }

    #[tokio::test]
    async fn test_corrupt_file_surfaces_error_and_keeps_cache() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        repo.load("s").await.unwrap();
        repo.create("s", "poll", questions()).await.unwrap();

        std::fs::write(repo.data_path("s"), "{ not json").unwrap();
        assert!(matches!(repo.load("s").await, Err(StorageError::Parse { .. })));
        assert!(repo.exists("s", "poll").await);
    }

    #[tokio::test]
    async fn test_failed_write_leaves_cache_untouched() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "file, not a directory").unwrap();
        let repo = SurveyRepository::new(&blocker);

        let err = repo.create("s", "poll", questions()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(StorageError::Write { .. })));
        assert!(!repo.exists("s", "poll").await);
    }

    #[tokio::test]
    async fn test_trigger_index_only_keeps_reachable_messages() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        repo.load("s").await.unwrap();
        repo.create("s", "a", questions()).await.unwrap();
        repo.create("s", "b", questions()).await.unwrap();
        repo.create("s", "c", questions()).await.unwrap();
        repo.update("s", "a", |s| s.message = "$gone".into()).await.unwrap();
        repo.update("s", "b", |s| s.message = "$shared".into()).await.unwrap();
        repo.update("s", "c", |s| s.message = "$shared".into()).await.unwrap();

        let platform = FakePlatform::new();
        platform.add_message("s", "!room", "$shared");
        repo.refresh_triggers("s", &platform).await;

        assert_eq!(repo.find_trigger("s", "$gone").await, None);
        assert_eq!(repo.find_trigger("s", "$shared").await.as_deref(), Some("b"));
        assert_eq!(repo.find_trigger("other", "$shared").await, None);
    }

    #[tokio::test]
    async fn test_unreadable_file_is_never_overwritten() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        let path = repo.data_path("s");
        let edited = r#"{"poll":{"response_channel":"","message":"","questions":["Q"]},}"#;
        std::fs::write(&path, edited).unwrap();

        assert!(repo.load("s").await.is_err());
        let err = repo.create("s", "other", questions()).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(StorageError::Unavailable { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), edited);
        assert!(!repo.exists("s", "other").await);
    }

    #[tokio::test]
    async fn test_stale_cache_does_not_clobber_edits() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        repo.load("s").await.unwrap();
        repo.create("s", "poll", questions()).await.unwrap();

        let path = repo.data_path("s");
        std::fs::write(&path, "{ half edited").unwrap();
        assert!(repo.load("s").await.is_err());

        let err = repo
            .update("s", "poll", |s| s.response_channel = "!r".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Storage(StorageError::Unavailable { .. })));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ half edited");

        std::fs::write(&path, "{}").unwrap();
        repo.load("s").await.unwrap();
        repo.create("s", "fresh", questions()).await.unwrap();
        assert!(repo.exists("s", "fresh").await);
    }

    #[tokio::test]
    async fn test_lazy_load_builds_trigger_index() {
        let dir = TempDir::new().unwrap();
        let repo = SurveyRepository::new(dir.path());
        std::fs::write(
            repo.data_path("!late"),
            r#"{"poll":{"response_channel":"!r","message":"$entry","questions":["Q"]}}"#,
        )
        .unwrap();
        let platform = FakePlatform::new();
        platform.add_message("!late", "!late", "$entry");

        repo.ensure_loaded("!late", &platform).await;

        assert!(repo.is_loaded("!late").await);
        assert_eq!(repo.find_trigger("!late", "$entry").await.as_deref(), Some("poll"));
    }
}
