// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! History ledger persistence.
//!
//! The ledger is an append-ordered JSON array of media runs and the source
//! of truth for report generation. Reads never fail: a missing or corrupt
//! ledger file deserializes to an empty history so new uploads are never
//! blocked by old damage.

use crate::error::StorageError;
use crate::models::run::MediaRun;
use log::warn;
use std::path::{Path, PathBuf};

pub struct HistoryLedger {
    path: PathBuf,
}

impl HistoryLedger {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full history, oldest first. Missing or malformed files
    /// load as an empty history.
    pub fn load(&self) -> Vec<MediaRun> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return Vec::new(),
        };
        match serde_json::from_str(&text) {
            Ok(runs) => runs,
            Err(e) => {
                warn!(
                    "ledger {} is malformed ({}), starting from empty history",
                    self.path.display(),
                    e
                );
                Vec::new()
            }
        }
    }

    /// Append one run record and persist the full sequence.
    pub fn append(&self, run: MediaRun) -> Result<(), StorageError> {
        let mut runs = self.load();
        runs.push(run);
        self.persist(&runs)
    }

    /// Reset the ledger to an empty sequence.
    pub fn reset(&self) -> Result<(), StorageError> {
        self.persist(&[])
    }

    /// Write via a temp file and rename so a reader never observes a
    /// partially written ledger.
    fn persist(&self, runs: &[MediaRun]) -> Result<(), StorageError> {
        let json = serde_json::to_string_pretty(runs)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).map_err(|source| StorageError::Write {
            path: tmp.clone(),
            source,
        })?;
        std::fs::rename(&tmp, &self.path).map_err(|source| StorageError::Write {
            path: self.path.clone(),
            source,
        })
    }
}

/// Delete every file directly inside `dir`, best effort. Individual
/// failures are logged and skipped so one stubborn file cannot stop the
/// rest of the cleanup.
pub fn clear_directory(dir: &Path) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("cannot list {}: {}", dir.display(), e);
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_file() {
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("cannot delete {}: {}", path.display(), e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::detection::MediaKind;

    fn run(file: &str, count: u32) -> MediaRun {
        MediaRun::success(file.into(), MediaKind::Image, count)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HistoryLedger::new(dir.path().join("history.json"));
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn test_load_corrupt_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();
        let ledger = HistoryLedger::new(path);
        assert!(ledger.load().is_empty());
    }

    #[test]
    fn test_append_then_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HistoryLedger::new(dir.path().join("history.json"));

        let first = run("a.png", 1);
        let second = run("b.png", 2);
        ledger.append(first.clone()).unwrap();
        ledger.append(second.clone()).unwrap();

        let history = ledger.load();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0], first);
        assert_eq!(history.last(), Some(&second));
    }

    #[test]
    fn test_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HistoryLedger::new(dir.path().join("history.json"));
        ledger.append(run("a.png", 1)).unwrap();
        assert_eq!(ledger.load(), ledger.load());
    }

    #[test]
    fn test_insertion_order_preserved_with_failures() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HistoryLedger::new(dir.path().join("history.json"));
        ledger.append(run("a.png", 1)).unwrap();
        ledger
            .append(MediaRun::failure("b.mp4".into(), MediaKind::Video, "codec".into()))
            .unwrap();
        ledger.append(run("c.png", 3)).unwrap();

        let history = ledger.load();
        assert_eq!(history[1].error.as_deref(), Some("codec"));
        assert_eq!(history[2].file, "c.png");
    }

    #[test]
    fn test_reset_leaves_empty_sequence() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = HistoryLedger::new(dir.path().join("history.json"));
        ledger.append(run("a.png", 1)).unwrap();
        ledger.reset().unwrap();
        assert!(ledger.load().is_empty());
        // The file itself holds a valid empty sequence.
        let text = std::fs::read_to_string(ledger.path()).unwrap();
        let parsed: Vec<MediaRun> = serde_json::from_str(&text).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn test_clear_directory_removes_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("one.png"), b"x").unwrap();
        std::fs::write(dir.path().join("two.mp4"), b"y").unwrap();
        std::fs::create_dir(dir.path().join("keepdir")).unwrap();

        clear_directory(dir.path());

        let remaining: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .flatten()
            .filter(|e| e.path().is_file())
            .collect();
        assert!(remaining.is_empty());
        assert!(dir.path().join("keepdir").is_dir());
    }

    #[test]
    fn test_clear_missing_directory_does_not_panic() {
        clear_directory(Path::new("/nonexistent/sdis-uploads"));
    }

    #[cfg(unix)]
    #[test]
    fn test_clear_continues_past_undeletable_files() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let stuck = dir.path().join("stuck.png");
        std::fs::write(&stuck, b"x").unwrap();

        // A read-only directory makes every unlink inside it fail.
        let mut locked = std::fs::metadata(dir.path()).unwrap().permissions();
        locked.set_mode(0o555);
        std::fs::set_permissions(dir.path(), locked).unwrap();

        clear_directory(dir.path());

        let mut restore = std::fs::metadata(dir.path()).unwrap().permissions();
        restore.set_mode(0o755);
        std::fs::set_permissions(dir.path(), restore).unwrap();

        // Root ignores the permission bits and deletes anyway; either way
        // the failed unlink must not have panicked or aborted the sweep.
        if stuck.exists() {
            std::fs::remove_file(&stuck).unwrap();
        }
    }
}
