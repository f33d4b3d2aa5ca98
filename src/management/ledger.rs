use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::{errors::LedgerError, types::LedgerEntry};

/// Record of content ids that were downloaded completely.
///
/// Implementations must make `contains`/`insert` safe to call from several
/// workers at once.
#[async_trait]
pub trait DownloadLedger: Send + Sync {
    async fn contains(&self, id: &str) -> Result<bool, LedgerError>;
    async fn insert(&self, id: &str) -> Result<(), LedgerError>;
}

/// Ledger persisted as a JSON array of [`LedgerEntry`] values.
///
/// The whole file is rewritten on every insert, through a temporary file that
/// is renamed over the original so a crash never leaves a truncated ledger.
pub struct LedgerManager {
    path: PathBuf,
    entries: Mutex<HashMap<String, LedgerEntry>>,
}

impl LedgerManager {
    /// Opens the ledger at `path`, starting empty if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Fails if the file exists but cannot be read or is not a valid ledger,
    /// or if its parent directory cannot be created.
    pub async fn open(path: PathBuf) -> Result<Self, LedgerError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            async_fs::create_dir_all(parent).await?;
        }

        let entries = match async_fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => HashMap::new(),
            Ok(content) => {
                let list: Vec<LedgerEntry> = serde_json::from_str(&content)?;
                list.into_iter().map(|e| (e.id.clone(), e)).collect()
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => return Err(LedgerError::Io(e)),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    pub async fn count(&self) -> usize {
        self.entries.lock().await.len()
    }

    async fn persist(&self, entries: &HashMap<String, LedgerEntry>) -> Result<(), LedgerError> {
        let mut list: Vec<&LedgerEntry> = entries.values().collect();
        list.sort_by(|a, b| {
            a.downloaded_at
                .cmp(&b.downloaded_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let json = serde_json::to_string_pretty(&list)?;
        let tmp = self.path.with_extension("json.tmp");
        async_fs::write(&tmp, json).await?;
        async_fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl DownloadLedger for LedgerManager {
    async fn contains(&self, id: &str) -> Result<bool, LedgerError> {
        Ok(self.entries.lock().await.contains_key(id))
    }

    async fn insert(&self, id: &str) -> Result<(), LedgerError> {
        // hold the lock while persisting so concurrent inserts are serialized
        let mut entries = self.entries.lock().await;
        if entries.contains_key(id) {
            return Ok(());
        }

        entries.insert(
            id.to_string(),
            LedgerEntry {
                id: id.to_string(),
                downloaded_at: Utc::now().to_rfc3339(),
            },
        );

        // only ids that reached the disk stay recorded
        if let Err(e) = self.persist(&entries).await {
            entries.remove(id);
            return Err(e);
        }
        Ok(())
    }
}
