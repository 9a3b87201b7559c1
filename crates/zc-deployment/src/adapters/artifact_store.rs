//! Mastercopy artifact stores.
//!
//! Both stores keep the same shape, `{ "<ContractName>": { "<version>": record } }`,
//! and share the append-only rules below.

use crate::config::DeployerConfig;
use crate::domain::entities::MastercopyRecord;
use crate::domain::invariants::compare_versions;
use crate::errors::ArtifactError;
use crate::ports::outbound::ArtifactStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Records by contract name, then version.
pub type ArtifactBook = BTreeMap<String, BTreeMap<String, MastercopyRecord>>;

fn select(
    book: &ArtifactBook,
    contract_name: &str,
    version: Option<&str>,
) -> Result<MastercopyRecord, ArtifactError> {
    let not_found = || ArtifactError::NotFound {
        contract_name: contract_name.to_string(),
        version: version.map(str::to_string),
    };
    let versions = book.get(contract_name).ok_or_else(not_found)?;
    let record = match version {
        Some(v) => versions.get(v),
        None => versions
            .iter()
            .max_by(|(a, _), (b, _)| compare_versions(a, b))
            .map(|(_, record)| record),
    };
    record.cloned().ok_or_else(not_found)
}

/// Inserts `record`; returns false when an identical entry already existed.
fn insert(book: &mut ArtifactBook, record: MastercopyRecord) -> Result<bool, ArtifactError> {
    let versions = book.entry(record.contract_name.clone()).or_default();
    if let Some(existing) = versions.get(&record.version) {
        if existing.address != record.address {
            return Err(ArtifactError::DuplicateVersion {
                contract_name: record.contract_name,
                version: record.version,
                recorded: existing.address,
                attempted: record.address,
            });
        }
        return Ok(false);
    }
    versions.insert(record.version.clone(), record);
    Ok(true)
}

fn flatten(book: &ArtifactBook) -> Vec<MastercopyRecord> {
    book.values()
        .flat_map(|versions| {
            let mut records: Vec<_> = versions.values().cloned().collect();
            records.sort_by(|a, b| compare_versions(&a.version, &b.version));
            records
        })
        .collect()
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Artifact store held in memory.
#[derive(Default)]
pub struct InMemoryArtifactStore {
    book: RwLock<ArtifactBook>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn read(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<MastercopyRecord, ArtifactError> {
        select(&self.book.read(), contract_name, version)
    }

    async fn write(&self, record: MastercopyRecord) -> Result<(), ArtifactError> {
        insert(&mut self.book.write(), record).map(|_| ())
    }

    async fn list(&self) -> Result<Vec<MastercopyRecord>, ArtifactError> {
        Ok(flatten(&self.book.read()))
    }
}

// =============================================================================
// JSON FILE STORE
// =============================================================================

/// Artifact store backed by a single pretty-printed JSON file.
pub struct JsonArtifactStore {
    path: PathBuf,
    // serializes read-modify-write cycles on the file
    lock: tokio::sync::Mutex<()>,
}

impl JsonArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Store at the configured `artifacts_path`.
    #[must_use]
    pub fn from_config(config: &DeployerConfig) -> Self {
        Self::new(config.artifacts_path.clone())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<ArtifactBook, ArtifactError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) if content.trim().is_empty() => Ok(ArtifactBook::new()),
            Ok(content) => serde_json::from_str(&content)
                .map_err(|e| ArtifactError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(ArtifactBook::new()),
            Err(e) => Err(ArtifactError::Io(e.to_string())),
        }
    }

    async fn save(&self, book: &ArtifactBook) -> Result<(), ArtifactError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ArtifactError::Io(e.to_string()))?;
        }
        let json = serde_json::to_string_pretty(book)
            .map_err(|e| ArtifactError::Serialization(e.to_string()))?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| ArtifactError::Io(e.to_string()))
    }
}

#[async_trait]
impl ArtifactStore for JsonArtifactStore {
    async fn read(
        &self,
        contract_name: &str,
        version: Option<&str>,
    ) -> Result<MastercopyRecord, ArtifactError> {
        let _guard = self.lock.lock().await;
        select(&self.load().await?, contract_name, version)
    }

    async fn write(&self, record: MastercopyRecord) -> Result<(), ArtifactError> {
        let _guard = self.lock.lock().await;
        let mut book = self.load().await?;
        let name = record.contract_name.clone();
        let version = record.version.clone();

        if insert(&mut book, record)? {
            self.save(&book).await?;
            info!(contract = %name, %version, path = %self.path.display(), "mastercopy recorded");
        } else {
            debug!(contract = %name, %version, "mastercopy already recorded");
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<MastercopyRecord>, ArtifactError> {
        let _guard = self.lock.lock().await;
        Ok(flatten(&self.load().await?))
    }
}

// =============================================================================
// TESTS
// =============================================================================
