//! Append-only JSON Lines state store
//!
//! Each tracker gets its own file under the state directory, one JSON record
//! per line. Records are never rewritten; the current record is the one with
//! the latest `created_at`. Each file is read once and the current record is
//! kept in memory afterwards.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use shared::{component_debug, component_warn, Component, LastMirrorRecord, LastNewsRecord};

use crate::error::{CuratorError, CuratorResult};
use crate::traits::StateStore;

const NEWS_FILE: &str = "news.jsonl";
const MIRROR_FILE: &str = "mirrors.jsonl";

/// One record file plus its latest record
///
/// The file is scanned on the first read only. Later appends through this
/// log keep the cached record current, so a running agent never re-reads
/// the whole history. Writes by other processes are not picked up.
struct RecordLog<T> {
    path: PathBuf,
    /// `None` until the file has been scanned
    latest: Mutex<Option<Option<T>>>,
    created_at: fn(&T) -> DateTime<Utc>,
}

impl<T> RecordLog<T>
where
    T: Serialize + DeserializeOwned + Clone + Send,
{
    fn new(path: PathBuf, created_at: fn(&T) -> DateTime<Utc>) -> Self {
        Self {
            path,
            latest: Mutex::new(None),
            created_at,
        }
    }

    async fn latest(&self, operation: &str) -> CuratorResult<Option<T>> {
        let mut cached = self.latest.lock().await;
        if let Some(latest) = cached.as_ref() {
            return Ok(latest.clone());
        }

        let latest = self.scan(operation).await?;
        *cached = Some(latest.clone());
        Ok(latest)
    }

    /// Latest record of the file by creation time. Ties go to the later line.
    async fn scan(&self, operation: &str) -> CuratorResult<Option<T>> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CuratorError::persist(operation, format!("{}: {}", self.path.display(), e))),
        };

        let latest = content
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .filter_map(|(index, line)| match serde_json::from_str::<T>(line) {
                Ok(record) => Some(record),
                Err(e) => {
                    component_warn!(
                        Component::Store,
                        "Skipping unreadable line {} of {}: {}",
                        index + 1,
                        self.path.display(),
                        e
                    );
                    None
                }
            })
            .max_by_key(|record| (self.created_at)(record));

        component_debug!(Component::Store, "Loaded latest record from {}", self.path.display());
        Ok(latest)
    }

    async fn append(&self, operation: &str, record: T) -> CuratorResult<()> {
        let mut cached = self.latest.lock().await;

        let mut line = serde_json::to_string(&record)?;
        line.push('\n');

        let io_error =
            |e: std::io::Error| CuratorError::persist(operation, format!("{}: {}", self.path.display(), e));
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(io_error)?;
        file.write_all(line.as_bytes()).await.map_err(io_error)?;
        file.sync_data().await.map_err(io_error)?;

        // Same rule as the scan: the greatest created_at wins, ties go to the newer line
        if let Some(latest) = cached.as_mut() {
            let replaces = latest
                .as_ref()
                .map(|current| (self.created_at)(&record) >= (self.created_at)(current))
                .unwrap_or(true);
            if replaces {
                *latest = Some(record);
            }
        }
        Ok(())
    }
}

/// File-backed state store
pub struct RealStateStore {
    /// Directory holding both record files
    dir: PathBuf,
    news: RecordLog<LastNewsRecord>,
    mirrors: RecordLog<LastMirrorRecord>,
    closed: AtomicBool,
}

impl RealStateStore {
    /// Open the store, creating the state directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> CuratorResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| CuratorError::persist("open", format!("{}: {}", dir.display(), e)))?;
        component_debug!(Component::Store, "📁 State directory {}", dir.display());

        Ok(Self {
            news: RecordLog::new(dir.join(NEWS_FILE), |r: &LastNewsRecord| r.created_at),
            mirrors: RecordLog::new(dir.join(MIRROR_FILE), |r: &LastMirrorRecord| r.created_at),
            dir,
            closed: AtomicBool::new(false),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn ensure_open(&self, operation: &str) -> CuratorResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(CuratorError::persist(operation, "store is closed"));
        }
        Ok(())
    }
}

#[async_trait]
impl StateStore for RealStateStore {
    async fn latest_news(&self) -> CuratorResult<Option<LastNewsRecord>> {
        self.ensure_open("latest_news")?;
        self.news.latest("latest_news").await
    }

    async fn append_news(&self, record: LastNewsRecord) -> CuratorResult<()> {
        self.ensure_open("append_news")?;
        self.news.append("append_news", record).await
    }

    async fn latest_mirror(&self) -> CuratorResult<Option<LastMirrorRecord>> {
        self.ensure_open("latest_mirror")?;
        self.mirrors.latest("latest_mirror").await
    }

    async fn append_mirror(&self, record: LastMirrorRecord) -> CuratorResult<()> {
        self.ensure_open("append_mirror")?;
        self.mirrors.append("append_mirror", record).await
    }

    async fn close(&self) -> CuratorResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
