//! # File I/O Module
//!
//! Handles scenario files with safety features:
//! - **Atomic writes**: Write to .tmp, fsync, rename to prevent corruption
//! - **File locking**: Prevent two processes from writing the same store
//! - **Version validation**: Ensure schema compatibility on import
//!
//! ## File Format
//!
//! Scenarios are exported as `.simlab` files containing pretty JSON.
//! Lock files use a `.lock` suffix and hold metadata about who holds the lock.
//!
//! ## Example
//!
//! ```rust,no_run
//! use simlab_core::file_io::{export_scenario, import_scenario, FileLock};
//! use simlab_core::scenario::Scenario;
//! use std::path::Path;
//!
//! let scenario = Scenario::new("Author");
//! let path = Path::new("pcr-aesp.simlab");
//!
//! let lock = FileLock::acquire(path, "author@simlab.com").unwrap();
//! export_scenario(&scenario, path).unwrap();
//! drop(lock);
//!
//! let back = import_scenario(path).unwrap();
//! assert_eq!(back.id(), scenario.id());
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{SimError, SimResult};
use crate::scenario::{Scenario, SCHEMA_VERSION};

/// Extension of exported scenario files
pub const SCENARIO_EXTENSION: &str = "simlab";

/// Lock file metadata stored in `.lock` files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    /// User identifier (email or username)
    pub user_id: String,
    /// Machine name where lock was acquired
    pub machine: String,
    /// Process ID that holds the lock
    pub pid: u32,
    /// When the lock was acquired
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Create new lock info for the current process
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }
}

/// Get the hostname of the current machine
fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME")
            .ok()
            .or_else(|| std::env::var("HOST").ok())
    }
}

/// File lock guard that releases the lock when dropped.
///
/// Uses both:
/// 1. OS-level file locking (via fs2) for process safety
/// 2. .lock file with metadata for user visibility
pub struct FileLock {
    /// Path that is protected by the lock
    target: PathBuf,
    lock_path: PathBuf,
    /// Keeps the OS lock alive
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on a file or directory.
    ///
    /// # Returns
    ///
    /// * `Ok(FileLock)` - Lock acquired successfully
    /// * `Err(SimError::FileLocked)` - Another live process holds the lock
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> SimResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if lock_path.exists() {
            if let Ok(existing) = read_lock_info(&lock_path) {
                if !is_lock_stale(&existing) {
                    return Err(SimError::file_locked(
                        path.display().to_string(),
                        format!("{} ({})", existing.user_id, existing.machine),
                        existing.locked_at.to_rfc3339(),
                    ));
                }
                warn!(path = %path.display(), holder = %existing.user_id, "taking over stale lock");
            }
        }

        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| SimError::file_error("create lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            SimError::file_locked(
                path.display().to_string(),
                "another process".to_string(),
                "unknown".to_string(),
            )
        })?;

        lock_file
            .set_len(0)
            .map_err(|e| SimError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(SimError::serialization)?;

        lock_file
            .write_all(lock_json.as_bytes())
            .map_err(|e| SimError::file_error("write lock", lock_path.display().to_string(), e.to_string()))?;

        lock_file
            .sync_all()
            .map_err(|e| SimError::file_error("sync lock", lock_path.display().to_string(), e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "lock acquired");
        Ok(FileLock {
            target: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Check if a path is locked without acquiring the lock.
    pub fn check(path: &Path) -> Option<LockInfo> {
        let lock_path = lock_path_for(path);
        if lock_path.exists() {
            if let Ok(info) = read_lock_info(&lock_path) {
                if !is_lock_stale(&info) {
                    return Some(info);
                }
            }
        }
        None
    }

    /// Path protected by this lock
    pub fn target(&self) -> &Path {
        &self.target
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// Lock file path: `name.ext` -> `name.ext.lock`, `dir` -> `dir.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    let mut lock_path = path.to_path_buf();
    let extension = lock_path
        .extension()
        .map(|e| format!("{}.lock", e.to_string_lossy()))
        .unwrap_or_else(|| "lock".to_string());
    lock_path.set_extension(extension);
    lock_path
}

fn read_lock_info(lock_path: &Path) -> SimResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(SimError::serialization)
}

/// Locks older than this are considered abandoned
const STALE_LOCK_HOURS: i64 = 24;

/// A lock is stale when its holder's process is gone (same machine, unix
/// only) or it is older than [`STALE_LOCK_HOURS`].
fn is_lock_stale(info: &LockInfo) -> bool {
    let same_machine = hostname().is_some_and(|ours| ours == info.machine);
    if same_machine && cfg!(unix) && !Path::new(&format!("/proc/{}", info.pid)).exists() {
        return true;
    }
    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

fn read_to_string(path: &Path, operation: &str) -> SimResult<String> {
    let mut file =
        File::open(path).map_err(|e| SimError::file_error(operation, path.display().to_string(), e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| SimError::file_error(operation, path.display().to_string(), e.to_string()))?;
    Ok(contents)
}

/// Write `contents` to `path` atomically.
///
/// 1. Write to a sibling `.tmp` file
/// 2. Sync to disk (fsync)
/// 3. Rename over the destination (atomic on most filesystems)
pub fn write_atomic(path: &Path, contents: &[u8]) -> SimResult<()> {
    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = PathBuf::from(tmp_name);

    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| SimError::file_error("create temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .write_all(contents)
        .map_err(|e| SimError::file_error("write temp file", tmp_path.display().to_string(), e.to_string()))?;

    tmp_file
        .sync_all()
        .map_err(|e| SimError::file_error("sync temp file", tmp_path.display().to_string(), e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        SimError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    Ok(())
}

/// Export a scenario to a `.simlab` file.
pub fn export_scenario(scenario: &Scenario, path: &Path) -> SimResult<()> {
    let json = serde_json::to_string_pretty(scenario).map_err(SimError::serialization)?;
    write_atomic(path, json.as_bytes())?;
    debug!(path = %path.display(), id = %scenario.id(), "scenario exported");
    Ok(())
}

/// Import a scenario from a `.simlab` file.
///
/// # Returns
///
/// * `Err(SimError::VersionMismatch)` - File version is incompatible
/// * `Err(SimError::SerializationError)` - Invalid JSON
/// * `Err(SimError::FileError)` - I/O error
pub fn import_scenario(path: &Path) -> SimResult<Scenario> {
    let contents = read_to_string(path, "read")?;
    parse_scenario(&contents, &path.display().to_string())
}

/// Parse a stored scenario document, check its schema version and its
/// frame ids.
///
/// `origin` names where the document came from, for error messages.
pub fn parse_scenario(contents: &str, origin: &str) -> SimResult<Scenario> {
    let scenario: Scenario = serde_json::from_str(contents)
        .map_err(|e| SimError::serialization(format!("Invalid JSON in {}: {}", origin, e)))?;
    validate_version(&scenario.meta.version)?;
    scenario.frames.check_ids()?;
    Ok(scenario)
}

/// Validate that a stored version is compatible with the current schema.
pub fn validate_version(file_version: &str) -> SimResult<()> {
    let mismatch = || SimError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };

    let file_parts: Vec<u32> = file_version.split('.').filter_map(|p| p.parse().ok()).collect();
    let current_parts: Vec<u32> = SCHEMA_VERSION.split('.').filter_map(|p| p.parse().ok()).collect();

    if file_parts.is_empty() || current_parts.is_empty() {
        return Err(mismatch());
    }

    // Major version must match
    if file_parts[0] != current_parts[0] {
        return Err(mismatch());
    }

    // For 0.x versions, a newer minor than ours is a breaking change
    if current_parts[0] == 0 && file_parts.len() > 1 && current_parts.len() > 1 && file_parts[1] > current_parts[1] {
        return Err(mismatch());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::Field;
    use std::env::temp_dir;

    fn temp_path(name: &str) -> PathBuf {
        temp_dir().join(format!("simlab_test_{}_{}.{}", name, std::process::id(), SCENARIO_EXTENSION))
    }

    #[test]
    fn test_lock_path_generation() {
        assert_eq!(
            lock_path_for(Path::new("/data/pcr.simlab")),
            Path::new("/data/pcr.simlab.lock")
        );
        assert_eq!(lock_path_for(Path::new("/data/store")), Path::new("/data/store.lock"));
    }

    #[test]
    fn test_lock_info_creation() {
        let info = LockInfo::new("test@simlab.com");
        assert_eq!(info.user_id, "test@simlab.com");
        assert!(info.pid > 0);
    }

    #[test]
    fn test_export_and_import_roundtrip() {
        let path = temp_path("roundtrip");
        let mut scenario = Scenario::new("Author");
        scenario.set_field(Field::Title, "IAM com supra");

        export_scenario(&scenario, &path).unwrap();
        let loaded = import_scenario(&path).unwrap();
        assert_eq!(loaded, scenario);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_atomic_write_leaves_no_tmp_file() {
        let path = temp_path("atomic");
        write_atomic(&path, b"{}").unwrap();

        let mut tmp_name = path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        assert!(!PathBuf::from(tmp_name).exists());
        assert!(path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let path = temp_path("lock");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "test@simlab.com").unwrap();
        assert_eq!(lock.info.user_id, "test@simlab.com");
        assert_eq!(lock.target(), path.as_path());

        let lock_path = lock_path_for(&path);
        assert!(lock_path.exists());

        drop(lock);
        assert!(!lock_path.exists());

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_contended_lock_keeps_holder_metadata() {
        let path = temp_path("contended");
        let lock_path = lock_path_for(&path);
        let mut holder = LockInfo::new("other@simlab.com");
        holder.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        let original = serde_json::to_string_pretty(&holder).unwrap();
        fs::write(&lock_path, &original).unwrap();

        let held = File::open(&lock_path).unwrap();
        held.lock_exclusive().unwrap();

        let err = FileLock::acquire(&path, "test@simlab.com").err().unwrap();
        assert_eq!(err.error_code(), "FILE_LOCKED");
        assert_eq!(fs::read_to_string(&lock_path).unwrap(), original);

        drop(held);
        let _ = fs::remove_file(&lock_path);
    }

    #[test]
    fn test_version_validation() {
        assert!(validate_version(SCHEMA_VERSION).is_ok());
        assert!(validate_version("0.1.7").is_ok());
        assert!(validate_version("0.0.9").is_ok());
        assert!(validate_version("1.0.0").is_err());
        assert!(validate_version("0.2.0").is_err());
        assert!(validate_version("garbage").is_err());
    }

    #[test]
    fn test_import_rejects_newer_schema() {
        let mut scenario = Scenario::new("Author");
        scenario.meta.version = "0.9.0".to_string();
        let json = serde_json::to_string(&scenario).unwrap();
        let err = parse_scenario(&json, "memory").unwrap_err();
        assert_eq!(err.error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_parse_rejects_frames_without_ids() {
        let mut scenario = Scenario::new("Author");
        scenario.frames = serde_json::from_str(r#"[{"title": "A"}, {"title": "B", "transitions": [{"target": 0}]}]"#)
            .unwrap();
        let json = serde_json::to_string(&scenario).unwrap();
        let err = parse_scenario(&json, "memory").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_import_missing_file() {
        let err = import_scenario(Path::new("/nonexistent/dir/x.simlab")).unwrap_err();
        assert_eq!(err.error_code(), "FILE_ERROR");
    }
}
