//! Snapshot storage API.
//!
//! One directory per job under the store root:
//!
//! ```text
//! <root>/<job_id>/
//!   config.yaml       # single document, atomically replaced on update
//!   snapshots.jsonl   # append-only, one JSON frame per line
//! ```
//!
//! The data file is never rewritten in place; recovery after a crash is
//! "decode until a frame fails, keep the prefix".

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use lf_core::{JobId, SimulationConfig, SnapshotRecord};

use crate::{StoreError, StoreResult};

const CONFIG_FILE: &str = "config.yaml";
const CONFIG_TMP_FILE: &str = "config.yaml.tmp";
const SNAPSHOTS_FILE: &str = "snapshots.jsonl";

/// Positional context for a frame that failed to decode.
#[derive(Debug, Clone, PartialEq)]
pub struct Corruption {
    /// 1-based line number of the first undecodable frame
    pub line: usize,
    pub detail: String,
}

/// Result of reading a job's snapshot sequence.
///
/// `records` always holds the valid prefix; whether a trailing corruption is
/// fatal is the caller's decision.
#[derive(Debug, Clone)]
pub struct SnapshotLoad {
    pub records: Vec<SnapshotRecord>,
    pub corruption: Option<Corruption>,
}

#[derive(Clone)]
pub struct SnapshotStore {
    root_dir: PathBuf,
}

impl SnapshotStore {
    pub fn new(root_dir: PathBuf) -> StoreResult<Self> {
        if !root_dir.exists() {
            fs::create_dir_all(&root_dir).map_err(|source| StoreError::DirectoryCreation {
                path: root_dir.clone(),
                source,
            })?;
        }
        Ok(Self { root_dir })
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn job_dir(&self, job_id: &str) -> PathBuf {
        self.root_dir.join(job_id)
    }

    fn snapshots_path(&self, job_id: &str) -> PathBuf {
        self.job_dir(job_id).join(SNAPSHOTS_FILE)
    }

    /// Idempotently create the job's storage directory.
    pub fn ensure_job_dir(&self, job_id: &str) -> StoreResult<PathBuf> {
        let dir = self.job_dir(job_id);
        if !dir.exists() {
            fs::create_dir_all(&dir).map_err(|source| StoreError::DirectoryCreation {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(dir)
    }

    pub fn has_job(&self, job_id: &str) -> bool {
        self.job_dir(job_id).join(CONFIG_FILE).exists()
    }

    /// Write the configuration document, replacing any previous one
    /// atomically (write to a temp file, then rename over the target).
    pub fn save_config(&self, job_id: &str, config: &SimulationConfig) -> StoreResult<()> {
        let dir = self.ensure_job_dir(job_id)?;
        let tmp_path = dir.join(CONFIG_TMP_FILE);
        let config_path = dir.join(CONFIG_FILE);

        let content = serde_yaml::to_string(config)?;
        fs::write(&tmp_path, content).map_err(|source| StoreError::Write {
            path: tmp_path.clone(),
            source,
        })?;
        fs::rename(&tmp_path, &config_path).map_err(|source| StoreError::Write {
            path: config_path,
            source,
        })?;
        Ok(())
    }

    pub fn load_config(&self, job_id: &str) -> StoreResult<SimulationConfig> {
        let config_path = self.job_dir(job_id).join(CONFIG_FILE);
        if !config_path.exists() {
            return Err(StoreError::SimulationNotFound {
                job_id: job_id.to_string(),
            });
        }
        let content = fs::read_to_string(&config_path).map_err(|source| StoreError::Read {
            path: config_path,
            source,
        })?;
        Ok(serde_yaml::from_str(&content)?)
    }

    /// Append one snapshot frame to the job's data file, creating it on the
    /// first call.
    ///
    /// The frame is serialized into a single buffer (record plus trailing
    /// newline) and written with one call, so a crash mid-write can only
    /// truncate the final frame, never touch previously written ones.
    pub fn append_snapshot(&self, job_id: &str, record: &SnapshotRecord) -> StoreResult<()> {
        self.ensure_job_dir(job_id)?;
        let path = self.snapshots_path(job_id);

        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        file.write_all(line.as_bytes())
            .map_err(|source| StoreError::Write {
                path: path.clone(),
                source,
            })?;
        file.flush()
            .map_err(|source| StoreError::Write { path, source })?;
        Ok(())
    }

    /// Read the snapshot sequence from start to end.
    ///
    /// Decoding stops at the first bad frame; everything before it is
    /// returned along with the corruption's positional context. A job
    /// directory with no data file yet yields an empty sequence.
    pub fn load_snapshots(&self, job_id: &str) -> StoreResult<SnapshotLoad> {
        let dir = self.job_dir(job_id);
        if !dir.exists() {
            return Err(StoreError::SimulationNotFound {
                job_id: job_id.to_string(),
            });
        }

        let path = self.snapshots_path(job_id);
        if !path.exists() {
            return Ok(SnapshotLoad {
                records: Vec::new(),
                corruption: None,
            });
        }

        let content = fs::read_to_string(&path).map_err(|source| StoreError::Read {
            path: path.clone(),
            source,
        })?;

        let mut records = Vec::new();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<SnapshotRecord>(line) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        job_id,
                        line = idx + 1,
                        "snapshot frame failed to decode, keeping valid prefix"
                    );
                    return Ok(SnapshotLoad {
                        records,
                        corruption: Some(Corruption {
                            line: idx + 1,
                            detail: err.to_string(),
                        }),
                    });
                }
            }
        }

        Ok(SnapshotLoad {
            records,
            corruption: None,
        })
    }

    /// Like [`load_snapshots`](Self::load_snapshots), but treats any
    /// undecodable frame as fatal.
    pub fn load_snapshots_strict(&self, job_id: &str) -> StoreResult<Vec<SnapshotRecord>> {
        let load = self.load_snapshots(job_id)?;
        if let Some(corruption) = load.corruption {
            return Err(StoreError::Corrupted {
                path: self.snapshots_path(job_id),
                line: corruption.line,
                detail: corruption.detail,
            });
        }
        Ok(load.records)
    }

    /// Wholesale-remove the job's data file ahead of a re-run.
    pub fn reset_snapshots(&self, job_id: &str) -> StoreResult<()> {
        let path = self.snapshots_path(job_id);
        if path.exists() {
            fs::remove_file(&path).map_err(|source| StoreError::Write { path, source })?;
        }
        Ok(())
    }

    /// Remove the entire job directory; absent is a no-op.
    pub fn delete_job(&self, job_id: &str) -> StoreResult<()> {
        let dir = self.job_dir(job_id);
        if dir.exists() {
            fs::remove_dir_all(&dir).map_err(|source| StoreError::Write { path: dir, source })?;
        }
        Ok(())
    }

    /// Total bytes stored under the job directory; 0 if absent.
    pub fn storage_size(&self, job_id: &str) -> StoreResult<u64> {
        let dir = self.job_dir(job_id);
        if !dir.exists() {
            return Ok(0);
        }

        let mut total = 0;
        for entry in fs::read_dir(&dir).map_err(|source| StoreError::Read {
            path: dir.clone(),
            source,
        })? {
            let entry = entry.map_err(|source| StoreError::Read {
                path: dir.clone(),
                source,
            })?;
            let meta = entry.metadata().map_err(|source| StoreError::Read {
                path: entry.path(),
                source,
            })?;
            if meta.is_file() {
                total += meta.len();
            }
        }
        Ok(total)
    }

    /// Job ids with a stored configuration, sorted for stable listings.
    pub fn list_jobs(&self) -> StoreResult<Vec<JobId>> {
        let mut jobs = Vec::new();

        for entry in fs::read_dir(&self.root_dir).map_err(|source| StoreError::Read {
            path: self.root_dir.clone(),
            source,
        })? {
            let entry = entry.map_err(|source| StoreError::Read {
                path: self.root_dir.clone(),
                source,
            })?;
            if entry.path().is_dir() {
                let job_id = entry.file_name().to_string_lossy().to_string();
                if self.has_job(&job_id) {
                    jobs.push(job_id);
                }
            }
        }

        jobs.sort();
        Ok(jobs)
    }
}
