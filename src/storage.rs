// Manages the schedule file on disk and its single backup generation.
//
// Layout: `<data dir>/schedules.json`, with the previous generation kept in
// `<data dir>/schedules.json.bak`. Every save rewrites the whole file.
use crate::context::AppContext;
use crate::error::StorageError;
use crate::model::{Schedule, ScheduleRecord};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Appended to the file's extension for the backup slot (`schedules.json.bak`).
pub const BACKUP_SUFFIX: &str = "bak";

/// Top-level document. Only `schedules` is read; other keys are ignored.
#[derive(Serialize, Deserialize, Default)]
struct ScheduleFile {
    #[serde(default)]
    schedules: Vec<ScheduleRecord>,
}

/// What happened to the previous generation during a save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupStatus {
    /// The previous file was copied to this path.
    Created(PathBuf),
    /// There was no previous file to back up.
    Skipped,
    /// The copy failed; the save itself still went through.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    pub path: PathBuf,
    pub backup: BackupStatus,
}

impl SaveOutcome {
    pub fn backup_failed(&self) -> bool {
        matches!(self.backup, BackupStatus::Failed(_))
    }
}

pub struct LocalStorage;

impl LocalStorage {
    /// `schedules.json` -> `schedules.json.bak`
    pub fn backup_path(file_path: &Path) -> PathBuf {
        Self::with_appended_extension(file_path, BACKUP_SUFFIX)
    }

    fn with_appended_extension(file_path: &Path, suffix: &str) -> PathBuf {
        let mut path = file_path.to_path_buf();
        if let Some(ext) = path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".");
            new_ext.push(suffix);
            path.set_extension(new_ext);
        } else {
            path.set_extension(suffix);
        }
        path
    }

    /// Atomic write: write a sibling `.tmp` file then rename it over `path`.
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(
        path: P,
        contents: C,
    ) -> Result<(), StorageError> {
        let path = path.as_ref();
        let tmp_path = Self::with_appended_extension(path, "tmp");
        fs::write(&tmp_path, contents).map_err(|e| StorageError::io(&tmp_path, e))?;
        fs::rename(&tmp_path, path).map_err(|e| StorageError::io(path, e))?;
        Ok(())
    }

    /// Copies the current bytes of `file_path` to its backup slot, replacing
    /// any older backup. Returns `None` when there is nothing to copy.
    pub fn create_backup(file_path: &Path) -> Result<Option<PathBuf>, StorageError> {
        if !file_path.exists() {
            return Ok(None);
        }
        let bak = Self::backup_path(file_path);
        fs::copy(file_path, &bak).map_err(|e| StorageError::io(&bak, e))?;
        Ok(Some(bak))
    }

    /// Reads a schedule file.
    ///
    /// A missing file is an empty collection. A file that exists but cannot be
    /// decoded, including one holding an unparseable token, is
    /// `StorageError::Corrupt`; it is never replaced by an empty list.
    pub fn load_from_path(path: &Path) -> Result<Vec<Schedule>, StorageError> {
        if !path.exists() {
            log::debug!("No schedule file at {}, starting empty", path.display());
            return Ok(vec![]);
        }
        let bytes = fs::read(path).map_err(|e| StorageError::io(path, e))?;
        let file: ScheduleFile =
            serde_json::from_slice(&bytes).map_err(|e| StorageError::corrupt(path, e))?;

        let mut seen = HashSet::new();
        let mut schedules = Vec::with_capacity(file.schedules.len());
        for record in file.schedules {
            let id = record.id.clone();
            let schedule = Schedule::try_from(record)
                .map_err(|e| StorageError::corrupt(path, format!("entry '{}': {}", id, e)))?;
            if !seen.insert(id.clone()) {
                log::warn!("Duplicate schedule id '{}' in {}", id, path.display());
            }
            schedules.push(schedule);
        }

        log::info!("Loaded {} schedule(s) from {}", schedules.len(), path.display());
        Ok(schedules)
    }

    /// Writes `schedules` to `path`, backing up the previous generation first.
    ///
    /// A failed backup is logged and reported through `SaveOutcome::backup`
    /// but does not stop the write.
    pub fn save_to_path(path: &Path, schedules: &[Schedule]) -> Result<SaveOutcome, StorageError> {
        let backup = match Self::create_backup(path) {
            Ok(Some(bak)) => BackupStatus::Created(bak),
            Ok(None) => BackupStatus::Skipped,
            Err(e) => {
                log::warn!("Backup before save failed: {}", e);
                BackupStatus::Failed(e.to_string())
            }
        };

        let json = Self::to_json_string(schedules)?;
        Self::atomic_write(path, json)?;
        log::info!("Saved {} schedule(s) to {}", schedules.len(), path.display());

        Ok(SaveOutcome {
            path: path.to_path_buf(),
            backup,
        })
    }

    /// Pretty JSON in the canonical field order, non-ASCII text left unescaped.
    pub fn to_json_string(schedules: &[Schedule]) -> Result<String, StorageError> {
        let file = ScheduleFile {
            schedules: schedules.iter().map(ScheduleRecord::from).collect(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    /// Load the live schedule collection.
    ///
    /// # Errors
    /// Never silently ignore a failure here: saving an empty list over a file
    /// that failed to load destroys it. Use
    /// `err.downcast_ref::<StorageError>()` to tell corruption from I/O.
    pub fn load(ctx: &dyn AppContext) -> Result<Vec<Schedule>> {
        let path = ctx.get_schedule_path()?;
        Ok(Self::load_from_path(&path)?)
    }

    /// Save the full collection, replacing the live file.
    pub fn save(ctx: &dyn AppContext, schedules: &[Schedule]) -> Result<SaveOutcome> {
        let path = ctx.get_schedule_path()?;
        Ok(Self::save_to_path(&path, schedules)?)
    }

    /// Load the previous generation from the backup slot.
    pub fn load_backup(ctx: &dyn AppContext) -> Result<Vec<Schedule>> {
        let path = Self::backup_path(&ctx.get_schedule_path()?);
        Ok(Self::load_from_path(&path)?)
    }

    /// Makes the backup generation live again. The generation being replaced
    /// moves into the backup slot, so a second restore undoes the first.
    pub fn restore_backup(ctx: &dyn AppContext) -> Result<SaveOutcome> {
        let path = ctx.get_schedule_path()?;
        let bak = Self::backup_path(&path);
        if !bak.exists() {
            anyhow::bail!("No backup found at {}", bak.display());
        }
        let previous = Self::load_from_path(&bak)?;
        Ok(Self::save_to_path(&path, &previous)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;

    #[test]
    fn test_backup_path_appends_suffix() {
        assert_eq!(
            LocalStorage::backup_path(Path::new("/tmp/data/schedules.json")),
            PathBuf::from("/tmp/data/schedules.json.bak")
        );
        assert_eq!(
            LocalStorage::backup_path(Path::new("/tmp/data/schedules")),
            PathBuf::from("/tmp/data/schedules.bak")
        );
    }

    #[test]
    fn test_create_backup_missing_file() {
        let ctx = TestContext::new();
        let path = ctx.get_schedule_path().unwrap();
        assert_eq!(LocalStorage::create_backup(&path).unwrap(), None);
    }

    #[test]
    fn test_create_backup_copies_and_overwrites() {
        let ctx = TestContext::new();
        let path = ctx.get_data_dir().unwrap().join("test.json");

        fs::write(&path, "version1").unwrap();
        let bak = LocalStorage::create_backup(&path).unwrap().unwrap();
        assert_eq!(bak.file_name().unwrap(), "test.json.bak");
        assert_eq!(fs::read_to_string(&bak).unwrap(), "version1");
        // Original untouched
        assert_eq!(fs::read_to_string(&path).unwrap(), "version1");

        fs::write(&path, "version2").unwrap();
        LocalStorage::create_backup(&path).unwrap();
        assert_eq!(fs::read_to_string(&bak).unwrap(), "version2");
    }

    #[test]
    fn test_atomic_write_leaves_no_tmp() {
        let ctx = TestContext::new();
        let path = ctx.get_schedule_path().unwrap();
        LocalStorage::atomic_write(&path, "{}").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_empty_document_loads_empty() {
        let ctx = TestContext::new();
        let path = ctx.get_schedule_path().unwrap();
        fs::write(&path, "{}").unwrap();
        assert!(LocalStorage::load_from_path(&path).unwrap().is_empty());
    }

    #[test]
    fn test_backup_failure_does_not_block_save() {
        let ctx = TestContext::new();
        let path = ctx.get_schedule_path().unwrap();
        fs::write(&path, r#"{"schedules": []}"#).unwrap();
        // A directory in the backup slot makes the copy fail.
        fs::create_dir_all(LocalStorage::backup_path(&path)).unwrap();

        let outcome = LocalStorage::save_to_path(&path, &[]).unwrap();
        assert!(outcome.backup_failed());
        assert!(LocalStorage::load_from_path(&path).unwrap().is_empty());
    }
}
