use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

/// Directory name used under the system temp dir when no override is given.
const DEFAULT_DIR_NAME: &str = "claude_autoskill_state";

/// Per-session checkpoint: how many user messages have already been scanned.
/// Stored as `<state dir>/<session id>.json`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub processed_count: usize,
}

/// Key-value store for per-session checkpoints.
///
/// Neither operation can fail from the caller's point of view: a record that
/// cannot be read loads as `0`, and a record that cannot be written is
/// dropped. Losing a checkpoint only means some messages get scanned again.
pub trait CheckpointStore {
    fn load(&self, session_id: &str) -> usize;
    fn save(&self, session_id: &str, count: usize);
}

/// Checkpoints as small JSON files in a scratch directory.
///
/// No locking is taken around the file; concurrent stops for the same
/// session may overwrite each other's checkpoint.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The process-wide scratch directory used when nothing overrides it.
    pub fn default_dir() -> PathBuf {
        std::env::temp_dir().join(DEFAULT_DIR_NAME)
    }

    fn checkpoint_path(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.json"))
    }

    /// Read the checkpoint for a session, returning `None` if it doesn't exist.
    pub fn read_checkpoint(&self, session_id: &str) -> Result<Option<Checkpoint>> {
        let path = self.checkpoint_path(session_id);
        match fs::read_to_string(&path) {
            Ok(s) => {
                let checkpoint = serde_json::from_str(&s)
                    .with_context(|| format!("parsing {}", path.display()))?;
                Ok(Some(checkpoint))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("reading {}", path.display())),
        }
    }

    /// Overwrite the checkpoint for a session, creating the directory if needed.
    pub fn write_checkpoint(&self, session_id: &str, checkpoint: &Checkpoint) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.checkpoint_path(session_id);
        let json = serde_json::to_string(checkpoint).context("serializing checkpoint")?;
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}

impl CheckpointStore for FileStore {
    fn load(&self, session_id: &str) -> usize {
        match self.read_checkpoint(session_id) {
            Ok(Some(checkpoint)) => checkpoint.processed_count,
            Ok(None) => 0,
            Err(err) => {
                tracing::warn!(session_id, "ignoring unreadable checkpoint: {err:#}");
                0
            }
        }
    }

    fn save(&self, session_id: &str, count: usize) {
        let checkpoint = Checkpoint {
            processed_count: count,
        };
        if let Err(err) = self.write_checkpoint(session_id, &checkpoint) {
            tracing::warn!(session_id, count, "checkpoint not saved: {err:#}");
        }
    }
}

/// In-memory store for exercising the controller without touching disk.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryStore {
    counts: std::cell::RefCell<std::collections::HashMap<String, usize>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn with(session_id: &str, count: usize) -> Self {
        let store = Self::default();
        store.save(session_id, count);
        store
    }

    pub fn get(&self, session_id: &str) -> Option<usize> {
        self.counts.borrow().get(session_id).copied()
    }
}

#[cfg(test)]
impl CheckpointStore for MemoryStore {
    fn load(&self, session_id: &str) -> usize {
        self.get(session_id).unwrap_or(0)
    }

    fn save(&self, session_id: &str, count: usize) {
        self.counts.borrow_mut().insert(session_id.to_string(), count);
    }
}
