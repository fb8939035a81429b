//! Where depscreen keeps its own files.
//!
//! Everything lives in one `.depscreen` folder under the OS config directory.
//! `DEPSCREEN_CONFIG_HOME` replaces the OS config directory, which keeps
//! portable installs and integration tests self-contained. The trained
//! bundle and the dataset are not stored here; their paths come from
//! settings.

use std::path::{Path, PathBuf};

use directories::BaseDirs;
use thiserror::Error;

/// Name of the application folder inside the config base.
pub const APP_DIR_NAME: &str = ".depscreen";
/// Environment variable that replaces the OS config base.
pub const CONFIG_HOME_ENV: &str = "DEPSCREEN_CONFIG_HOME";
const LOGS_DIR_NAME: &str = "logs";

#[derive(Debug, Error)]
pub enum AppDirError {
    #[error("No suitable base config directory available for application files")]
    NoBaseDir,
    #[error("Failed to create application directory at {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Resolved application folder; creating one makes sure it exists on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    root: PathBuf,
}

impl AppDirs {
    pub fn resolve() -> Result<Self, AppDirError> {
        let base = config_base().ok_or(AppDirError::NoBaseDir)?;
        Self::under(&base)
    }

    /// Application folder below an explicit base directory.
    pub fn under(base: &Path) -> Result<Self, AppDirError> {
        let root = create(base.join(APP_DIR_NAME))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Log folder, created on demand.
    pub fn logs(&self) -> Result<PathBuf, AppDirError> {
        create(self.root.join(LOGS_DIR_NAME))
    }
}

/// Return the `.depscreen` folder, creating it if needed.
pub fn app_root_dir() -> Result<PathBuf, AppDirError> {
    AppDirs::resolve().map(|dirs| dirs.root)
}

/// Return the log folder inside `.depscreen`, creating it if needed.
pub fn logs_dir() -> Result<PathBuf, AppDirError> {
    AppDirs::resolve()?.logs()
}

fn create(path: PathBuf) -> Result<PathBuf, AppDirError> {
    match std::fs::create_dir_all(&path) {
        Ok(()) => Ok(path),
        Err(source) => Err(AppDirError::CreateDir { path, source }),
    }
}

fn config_base() -> Option<PathBuf> {
    if let Some(path) = overridden_base() {
        return Some(path);
    }
    match std::env::var_os(CONFIG_HOME_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => BaseDirs::new().map(|dirs| dirs.config_dir().to_path_buf()),
    }
}

#[cfg(test)]
fn overridden_base() -> Option<PathBuf> {
    test_override::current()
}

#[cfg(not(test))]
fn overridden_base() -> Option<PathBuf> {
    None
}


/// Points the config base at a scratch directory for the current test thread.
#[cfg(test)]
pub(crate) struct OverrideGuard {
    previous: Option<PathBuf>,
}

#[cfg(test)]
impl OverrideGuard {
    pub(crate) fn set(path: PathBuf) -> Self {
        let previous = test_override::replace(Some(path));
        Self { previous }
    }
}

#[cfg(test)]
impl Drop for OverrideGuard {
    fn drop(&mut self) {
        test_override::replace(self.previous.take());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn override_redirects_root_and_creates_it() {
        let base = tempdir().unwrap();
        let _guard = OverrideGuard::set(base.path().to_path_buf());
        let root = app_root_dir().unwrap();
        assert_eq!(root, base.path().join(APP_DIR_NAME));
        assert!(root.is_dir());
    }

    #[test]
    fn logs_live_inside_root() {
        let base = tempdir().unwrap();
        let dirs = AppDirs::under(base.path()).unwrap();
        let logs = dirs.logs().unwrap();
        assert_eq!(logs, dirs.root().join("logs"));
        assert!(logs.is_dir());
    }

    #[test]
    fn guard_restores_previous_override() {
        let outer = tempdir().unwrap();
        let inner = tempdir().unwrap();
        let _outer = OverrideGuard::set(outer.path().to_path_buf());
        {
            let _inner = OverrideGuard::set(inner.path().to_path_buf());
            assert_eq!(app_root_dir().unwrap(), inner.path().join(APP_DIR_NAME));
        }
        assert_eq!(app_root_dir().unwrap(), outer.path().join(APP_DIR_NAME));
    }

    #[test]
    fn file_in_place_of_root_is_reported() {
        let base = tempdir().unwrap();
        std::fs::write(base.path().join(APP_DIR_NAME), b"not a dir").unwrap();
        assert!(matches!(
            AppDirs::under(base.path()),
            Err(AppDirError::CreateDir { .. })
        ));
    }
}
