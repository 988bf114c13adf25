// File: ./src/context.rs
/*! Filesystem context for the schedule and configuration files.

`AppContext` decides where the data directory lives. Two implementations:

- `StandardContext`: the OS data directory from `directories::ProjectDirs`,
  or `<root>/data` when an override root is given (`--root`).
- `TestContext`: a throwaway directory under the OS temp dir, removed on drop.

Every storage function takes a `&dyn AppContext`; there is no global path state.
*/

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

pub const SCHEDULE_FILENAME: &str = "schedules.json";
pub const CONFIG_FILENAME: &str = "config.json";

/// Resolves the directory holding `schedules.json`, its backup and `config.json`.
///
/// `get_data_dir` must create the directory (parents included) when missing,
/// so every path returned here is ready for reading or writing.
pub trait AppContext: Send + Sync + std::fmt::Debug {
    fn get_data_dir(&self) -> Result<PathBuf>;

    fn get_schedule_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join(SCHEDULE_FILENAME))
    }

    fn get_config_path(&self) -> Result<PathBuf> {
        Ok(self.get_data_dir()?.join(CONFIG_FILENAME))
    }
}

fn ensure_exists(path: PathBuf) -> Result<PathBuf> {
    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory: {:?}", path))?;
    Ok(path)
}

// --- Production Implementation ---

#[derive(Clone, Debug, Default)]
pub struct StandardContext {
    override_root: Option<PathBuf>,
}

impl StandardContext {
    pub fn new(override_root: Option<PathBuf>) -> Self {
        Self { override_root }
    }

    fn get_proj_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("com", "daymark", "daymark")
    }
}

impl AppContext for StandardContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        if let Some(root) = &self.override_root {
            return ensure_exists(root.join("data"));
        }
        let proj = Self::get_proj_dirs().ok_or_else(|| anyhow::anyhow!("No home directory"))?;
        ensure_exists(proj.data_dir().to_path_buf())
    }
}

// --- Test Implementation ---

#[derive(Clone, Debug)]
pub struct TestContext {
    pub root: PathBuf,
}

impl TestContext {
    /// Creates a context backed by a unique temporary directory.
    pub fn new() -> Self {
        let root = std::env::temp_dir().join(format!("daymark_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&root).expect("failed to create TestContext temp dir");
        Self { root }
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AppContext for TestContext {
    fn get_data_dir(&self) -> Result<PathBuf> {
        ensure_exists(self.root.join("data"))
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.root);
    }
}
