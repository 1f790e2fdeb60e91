//! Score artifact store
//!
//! One JSON artifact per completed round, named `round{N}_{YYYYMMDD_HHMMSS}.json`.
//! Artifacts are created with `create_new` and never modified afterwards, so
//! the store can be scanned while a round is being written: a half-written
//! artifact fails to parse and is skipped for that scan only.

use chrono::{DateTime, Utc};
use emo_common::config::StoreConfig;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// Highest numeric suffix tried before giving up on a same-second name clash
const MAX_NAME_SUFFIX: u32 = 1000;

/// Raw (expected, chosen) label pair as submitted by the game client
pub type RawPair = (String, String);

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// Storage location missing or not writable
    #[error("Write failed for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Batch could not be encoded
    #[error("Encode failed: {0}")]
    Encode(String),

    /// Artifact could not be opened or read
    #[error("Read failed for {}: {reason}", .path.display())]
    Read { path: PathBuf, reason: String },

    /// Artifact exceeds the configured size limit
    #[error("Artifact {} is {size} bytes (limit {limit})", .path.display())]
    TooLarge { path: PathBuf, size: u64, limit: u64 },

    /// Artifact content is not a score batch
    #[error("Deserialize failed for {}: {reason}", .path.display())]
    Deserialize { path: PathBuf, reason: String },
}

/// One question of a round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Emotion shown to the player
    #[serde(alias = "correct")]
    pub expected: String,
    /// Emotion the player picked
    #[serde(alias = "selected")]
    pub chosen: String,
}

impl ResultRecord {
    pub fn new(expected: impl Into<String>, chosen: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            chosen: chosen.into(),
        }
    }
}

/// All results of one completed round; the unit of persistence
#[derive(Debug, Clone, PartialEq)]
pub struct RoundBatch {
    pub round: i64,
    pub created_at: DateTime<Utc>,
    pub records: Vec<ResultRecord>,
}

impl RoundBatch {
    /// New batch stamped with the current time
    pub fn new(round: i64, records: Vec<ResultRecord>) -> Self {
        Self {
            round,
            created_at: emo_common::time::now(),
            records,
        }
    }
}

/// Where an appended batch landed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredLocation {
    pub path: PathBuf,
    pub file_name: String,
}

/// On-disk layout of an artifact
#[derive(Debug, Serialize, Deserialize)]
struct StoredBatch {
    round: i64,
    created_at: DateTime<Utc>,
    results: Vec<[String; 2]>,
}

/// Accepted artifact layouts
///
/// Besides the current object layout, a bare `[[expected, chosen], ...]`
/// array is accepted, as written by older game clients.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactBody {
    Batch(StoredBatch),
    Pairs(Vec<[String; 2]>),
}

impl ArtifactBody {
    fn into_pairs(self) -> Vec<RawPair> {
        let results = match self {
            ArtifactBody::Batch(batch) => batch.results,
            ArtifactBody::Pairs(pairs) => pairs,
        };
        results
            .into_iter()
            .map(|[expected, chosen]| (expected, chosen))
            .collect()
    }
}

/// Append-only store of round batches in a single directory
#[derive(Debug, Clone)]
pub struct RecordStore {
    dir: PathBuf,
    max_artifact_bytes: u64,
}

impl RecordStore {
    pub fn new(dir: PathBuf, config: &StoreConfig) -> Self {
        Self {
            dir,
            max_artifact_bytes: config.max_artifact_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist a batch as a new artifact
    ///
    /// If another artifact already holds the round/second name, `_1`, `_2`, ...
    /// is appended so no submission overwrites another.
    pub fn append(&self, batch: &RoundBatch) -> Result<StoredLocation, StoreError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Write {
            path: self.dir.clone(),
            source,
        })?;

        let stored = StoredBatch {
            round: batch.round,
            created_at: batch.created_at,
            results: batch
                .records
                .iter()
                .map(|r| [r.expected.clone(), r.chosen.clone()])
                .collect(),
        };
        let body = serde_json::to_vec_pretty(&stored).map_err(|e| StoreError::Encode(e.to_string()))?;

        let base = format!(
            "round{}_{}",
            batch.round,
            emo_common::time::file_stamp(&batch.created_at)
        );
        let (path, file_name, mut file) = self.create_unique(&base)?;

        let written = file.write_all(&body).and_then(|_| file.sync_all());
        if let Err(source) = written {
            drop(file);
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Failed to remove partial artifact {}: {}", path.display(), e);
            }
            return Err(StoreError::Write { path, source });
        }

        debug!(
            round = batch.round,
            records = batch.records.len(),
            file = %file_name,
            "Stored round batch"
        );

        Ok(StoredLocation { path, file_name })
    }

    fn create_unique(&self, base: &str) -> Result<(PathBuf, String, File), StoreError> {
        for suffix in 0..=MAX_NAME_SUFFIX {
            let file_name = if suffix == 0 {
                format!("{}.json", base)
            } else {
                format!("{}_{}.json", base, suffix)
            };
            let path = self.dir.join(&file_name);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file_name, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(StoreError::Write { path, source }),
            }
        }

        Err(StoreError::Write {
            path: self.dir.join(format!("{}.json", base)),
            source: std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "no free artifact name for this round and second",
            ),
        })
    }

    /// Lazily yield every stored pair
    ///
    /// Artifacts are visited in file-name order; pairs keep their order within
    /// an artifact. A missing directory yields nothing.
    pub fn load_all(&self) -> ScoreScan {
        let entries = if self.dir.is_dir() {
            Some(
                WalkDir::new(&self.dir)
                    .min_depth(1)
                    .max_depth(1)
                    .sort_by_file_name()
                    .into_iter(),
            )
        } else {
            debug!("Score directory {} does not exist yet", self.dir.display());
            None
        };

        ScoreScan {
            entries,
            current: Vec::new().into_iter(),
            max_artifact_bytes: self.max_artifact_bytes,
            loaded: 0,
            skipped: 0,
        }
    }
}

/// Iterator over all stored pairs, one artifact at a time
///
/// Artifacts that cannot be read or parsed are logged, counted and skipped.
pub struct ScoreScan {
    entries: Option<walkdir::IntoIter>,
    current: std::vec::IntoIter<RawPair>,
    max_artifact_bytes: u64,
    loaded: usize,
    skipped: usize,
}

impl ScoreScan {
    /// Artifacts successfully read so far
    pub fn artifacts_loaded(&self) -> usize {
        self.loaded
    }

    /// Artifacts skipped so far
    pub fn artifacts_skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for ScoreScan {
    type Item = RawPair;

    fn next(&mut self) -> Option<RawPair> {
        loop {
            if let Some(pair) = self.current.next() {
                return Some(pair);
            }

            let entry = match self.entries.as_mut()?.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Error accessing score directory entry: {}", e);
                    continue;
                }
            };

            if !is_artifact(&entry) {
                continue;
            }

            match read_artifact(entry.path(), self.max_artifact_bytes) {
                Ok(pairs) => {
                    self.loaded += 1;
                    self.current = pairs.into_iter();
                }
                Err(e) => {
                    self.skipped += 1;
                    warn!("Skipping score artifact: {}", e);
                }
            }
        }
    }
}

fn is_artifact(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    entry.file_type().is_file()
        && !name.starts_with('.')
        && entry
            .path()
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
}

fn read_artifact(path: &Path, limit: u64) -> Result<Vec<RawPair>, StoreError> {
    let read_err = |e: std::io::Error| StoreError::Read {
        path: path.to_path_buf(),
        reason: e.to_string(),
    };

    let file = File::open(path).map_err(read_err)?;
    let size = file.metadata().map_err(read_err)?.len();
    if size > limit {
        return Err(StoreError::TooLarge {
            path: path.to_path_buf(),
            size,
            limit,
        });
    }

    // The file may still be growing; never read past the limit
    let mut buf = Vec::with_capacity(size as usize);
    file.take(limit.saturating_add(1)).read_to_end(&mut buf).map_err(read_err)?;
    if buf.len() as u64 > limit {
        return Err(StoreError::TooLarge {
            path: path.to_path_buf(),
            size: buf.len() as u64,
            limit,
        });
    }

    let body: ArtifactBody = serde_json::from_slice(&buf).map_err(|e| StoreError::Deserialize {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    Ok(body.into_pairs())
}
