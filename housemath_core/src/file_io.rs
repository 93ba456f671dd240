//! # File I/O Module
//!
//! Every file the application writes goes through here:
//! - **Atomic saves**: write to `.tmp`, fsync, rename over the target
//! - **File locking**: advisory lock on `.hmr` reports so two sessions don't
//!   clobber each other's scenarios
//! - **Version validation**: reject reports written by a newer schema
//!
//! ## Files
//!
//! - Reports: `.hmr` JSON, lock metadata in `.hmr.lock`
//! - Preferences: `preferences.json` (see [`crate::preferences`])
//!
//! ## Example
//!
//! ```rust,no_run
//! use housemath_core::file_io::{save_report, load_report, FileLock};
//! use housemath_core::report::Report;
//! use std::path::Path;
//!
//! let report = Report::new("Pat Agent", "The Smiths", "12 Elm St");
//! let path = Path::new("smiths.hmr");
//!
//! let lock = FileLock::acquire(path, "pat")?;
//! save_report(&report, path)?;
//! drop(lock);
//!
//! let loaded = load_report(path)?;
//! assert_eq!(loaded.meta.client, "The Smiths");
//! # Ok::<(), housemath_core::errors::CalcError>(())
//! ```

use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::{CalcError, CalcResult};
use crate::report::{Report, SCHEMA_VERSION};

/// Hours after which an abandoned lock is ignored.
const STALE_LOCK_HOURS: i64 = 24;

/// Metadata stored in `.lock` files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LockInfo {
    /// Who holds the lock (user name or email)
    pub user_id: String,
    pub machine: String,
    pub pid: u32,
    pub locked_at: DateTime<Utc>,
}

impl LockInfo {
    /// Lock info for the current process.
    pub fn new(user_id: impl Into<String>) -> Self {
        LockInfo {
            user_id: user_id.into(),
            machine: hostname().unwrap_or_else(|| "unknown".to_string()),
            pid: std::process::id(),
            locked_at: Utc::now(),
        }
    }

    /// `user (machine)`, as shown in lock errors.
    pub fn holder(&self) -> String {
        format!("{} ({})", self.user_id, self.machine)
    }
}

fn hostname() -> Option<String> {
    #[cfg(windows)]
    {
        std::env::var("COMPUTERNAME").ok()
    }
    #[cfg(not(windows))]
    {
        std::env::var("HOSTNAME").ok().or_else(|| std::env::var("HOST").ok())
    }
}

/// Exclusive lock on a report, released on drop.
///
/// Holds an OS-level lock (fs2) on the `.lock` file and writes [`LockInfo`]
/// into it so other sessions can say who has the report open.
#[derive(Debug)]
pub struct FileLock {
    target_path: PathBuf,
    lock_path: PathBuf,
    _lock_file: File,
    pub info: LockInfo,
}

impl FileLock {
    /// Acquire an exclusive lock on `path`.
    ///
    /// Fails with [`CalcError::FileLocked`] when another live session holds
    /// it. Stale locks (dead process on this machine, or older than a day)
    /// are taken over.
    pub fn acquire(path: &Path, user_id: impl Into<String>) -> CalcResult<Self> {
        let lock_path = lock_path_for(path);
        let info = LockInfo::new(user_id);

        if let Some(existing) = read_lock_info(&lock_path).ok().filter(|i| !is_lock_stale(i)) {
            return Err(CalcError::file_locked(
                path.display().to_string(),
                existing.holder(),
                existing.locked_at.to_rfc3339(),
            ));
        }

        let lock_display = lock_path.display().to_string();
        // Existing metadata is only cleared once the OS lock is ours
        let mut lock_file = OpenOptions::new()
            .write(true)
            .read(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| CalcError::file_error("create lock", &lock_display, e.to_string()))?;

        lock_file.try_lock_exclusive().map_err(|_| {
            CalcError::file_locked(path.display().to_string(), "another process", "unknown")
        })?;

        let lock_json = serde_json::to_string_pretty(&info).map_err(CalcError::serialization)?;
        lock_file
            .set_len(0)
            .and_then(|_| lock_file.write_all(lock_json.as_bytes()))
            .and_then(|_| lock_file.sync_all())
            .map_err(|e| CalcError::file_error("write lock", &lock_display, e.to_string()))?;

        debug!(path = %path.display(), user = %info.user_id, "lock acquired");
        Ok(FileLock {
            target_path: path.to_path_buf(),
            lock_path,
            _lock_file: lock_file,
            info,
        })
    }

    /// Who holds the lock on `path`, if anyone.
    pub fn check(path: &Path) -> Option<LockInfo> {
        read_lock_info(&lock_path_for(path)).ok().filter(|info| !is_lock_stale(info))
    }

    pub fn target_path(&self) -> &Path {
        &self.target_path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.lock_path);
    }
}

/// `report.hmr` -> `report.hmr.lock`
fn lock_path_for(path: &Path) -> PathBuf {
    with_suffix(path, "lock")
}

/// `report.hmr` -> `report.hmr.tmp`
fn tmp_path_for(path: &Path) -> PathBuf {
    with_suffix(path, "tmp")
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut out = path.to_path_buf();
    let extension = path
        .extension()
        .map(|e| format!("{}.{}", e.to_string_lossy(), suffix))
        .unwrap_or_else(|| suffix.to_string());
    out.set_extension(extension);
    out
}

fn read_lock_info(lock_path: &Path) -> CalcResult<LockInfo> {
    let contents = read_to_string(lock_path, "read lock")?;
    serde_json::from_str(&contents).map_err(CalcError::serialization)
}

fn is_lock_stale(info: &LockInfo) -> bool {
    if hostname().as_deref() == Some(info.machine.as_str()) {
        #[cfg(unix)]
        {
            if fs::metadata(format!("/proc/{}", info.pid)).is_err() {
                return true;
            }
        }
    }
    (Utc::now() - info.locked_at).num_hours() > STALE_LOCK_HOURS
}

fn read_to_string(path: &Path, operation: &str) -> CalcResult<String> {
    let path_display = path.display().to_string();
    let mut file = File::open(path)
        .map_err(|e| CalcError::file_error(operation, &path_display, e.to_string()))?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)
        .map_err(|e| CalcError::file_error(operation, &path_display, e.to_string()))?;
    Ok(contents)
}

/// Serialize `value` as pretty JSON and write it atomically.
///
/// 1. Serialize
/// 2. Write to `<path>.tmp` and fsync
/// 3. Rename over `path`
///
/// Missing parent directories are created.
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> CalcResult<()> {
    let json = serde_json::to_string_pretty(value).map_err(CalcError::serialization)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| {
            CalcError::file_error("create directory", parent.display().to_string(), e.to_string())
        })?;
    }

    let tmp_path = tmp_path_for(path);
    let tmp_display = tmp_path.display().to_string();
    let mut tmp_file = File::create(&tmp_path)
        .map_err(|e| CalcError::file_error("create temp file", &tmp_display, e.to_string()))?;
    tmp_file
        .write_all(json.as_bytes())
        .and_then(|_| tmp_file.sync_all())
        .map_err(|e| CalcError::file_error("write temp file", &tmp_display, e.to_string()))?;

    fs::rename(&tmp_path, path).map_err(|e| {
        let _ = fs::remove_file(&tmp_path);
        CalcError::file_error("rename to final", path.display().to_string(), e.to_string())
    })?;

    debug!(path = %path.display(), bytes = json.len(), "saved");
    Ok(())
}

/// Read and deserialize a JSON file.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> CalcResult<T> {
    let contents = read_to_string(path, "read")?;
    serde_json::from_str(&contents)
        .map_err(|e| CalcError::serialization(format!("Invalid JSON in {}: {}", path.display(), e)))
}

/// Save a report atomically.
pub fn save_report(report: &Report, path: &Path) -> CalcResult<()> {
    save_json(report, path)
}

/// Load a report and check its schema version.
///
/// # Errors
///
/// * `FileError` - I/O failure
/// * `SerializationError` - not valid report JSON
/// * `VersionMismatch` - written by an incompatible schema
pub fn load_report(path: &Path) -> CalcResult<Report> {
    let report: Report = load_json(path)?;
    validate_version(&report.meta.version)?;
    Ok(report)
}

/// Load a report along with whoever currently holds its lock.
pub fn load_report_with_lock_check(path: &Path) -> CalcResult<(Report, Option<LockInfo>)> {
    let report = load_report(path)?;
    Ok((report, FileLock::check(path)))
}

/// Check a file's schema version against [`SCHEMA_VERSION`].
///
/// Major versions must match; while in 0.x, a newer minor is also rejected.
pub fn validate_version(file_version: &str) -> CalcResult<()> {
    let mismatch = || CalcError::VersionMismatch {
        file_version: file_version.to_string(),
        expected_version: SCHEMA_VERSION.to_string(),
    };
    let parse = |v: &str| -> Vec<u32> { v.split('.').filter_map(|p| p.parse().ok()).collect() };

    let file_parts = parse(file_version);
    let current_parts = parse(SCHEMA_VERSION);
    let (Some(&file_major), Some(&current_major)) = (file_parts.first(), current_parts.first())
    else {
        return Err(mismatch());
    };

    if file_major != current_major {
        return Err(mismatch());
    }
    if current_major == 0 {
        if let (Some(&file_minor), Some(&current_minor)) =
            (file_parts.get(1), current_parts.get(1))
        {
            if file_minor > current_minor {
                return Err(mismatch());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::CalculatorId;
    use crate::inputs::InputValues;
    use crate::report::SavedScenario;
    use tempfile::tempdir;

    #[test]
    fn test_sidecar_paths() {
        let path = Path::new("/path/to/smiths.hmr");
        assert_eq!(lock_path_for(path), Path::new("/path/to/smiths.hmr.lock"));
        assert_eq!(tmp_path_for(path), Path::new("/path/to/smiths.hmr.tmp"));
        assert_eq!(lock_path_for(Path::new("noext")), Path::new("noext.lock"));
    }

    #[test]
    fn test_save_and_load_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("roundtrip.hmr");

        let mut report = Report::new("Pat", "The Smiths", "12 Elm St");
        report.add_scenario(SavedScenario::new("Base", CalculatorId::Mortgage, InputValues::new()));
        save_report(&report, &path).unwrap();

        let loaded = load_report(&path).unwrap();
        assert_eq!(loaded, report);
        assert!(!tmp_path_for(&path).exists());
    }

    #[test]
    fn test_save_json_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("prefs.json");
        save_json(&serde_json::json!({"theme": "dark"}), &path).unwrap();
        let value: serde_json::Value = load_json(&path).unwrap();
        assert_eq!(value["theme"], "dark");
    }

    #[test]
    fn test_load_missing_and_invalid() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.hmr");
        assert_eq!(load_report(&missing).unwrap_err().error_code(), "FILE_ERROR");

        let garbage = dir.path().join("garbage.hmr");
        fs::write(&garbage, "not json").unwrap();
        assert_eq!(load_report(&garbage).unwrap_err().error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_load_rejects_newer_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("future.hmr");
        let mut report = Report::default();
        report.meta.version = "0.9.0".to_string();
        save_report(&report, &path).unwrap();
        assert_eq!(load_report(&path).unwrap_err().error_code(), "VERSION_MISMATCH");
    }

    #[test]
    fn test_file_lock_acquire_and_release() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("locked.hmr");
        File::create(&path).unwrap();

        let lock = FileLock::acquire(&path, "pat").unwrap();
        assert_eq!(lock.info.user_id, "pat");
        assert_eq!(lock.target_path(), path.as_path());
        assert!(lock_path_for(&path).exists());

        drop(lock);
        assert!(!lock_path_for(&path).exists());
        assert!(FileLock::check(&path).is_none());
    }

    #[test]
    fn test_stale_lock_is_ignored() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("stale.hmr");
        let mut info = LockInfo::new("someone");
        info.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        fs::write(lock_path_for(&path), serde_json::to_string(&info).unwrap()).unwrap();

        assert!(FileLock::check(&path).is_none());
        assert!(FileLock::acquire(&path, "pat").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_failed_acquire_keeps_holder_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("smiths.hmr");
        let held = FileLock::acquire(&path, "pat").unwrap();

        // Metadata looks abandoned but the OS lock is still held
        let mut aged = held.info.clone();
        aged.locked_at = Utc::now() - chrono::Duration::hours(STALE_LOCK_HOURS + 1);
        fs::write(lock_path_for(&path), serde_json::to_string_pretty(&aged).unwrap()).unwrap();

        let err = FileLock::acquire(&path, "sam").unwrap_err();
        assert_eq!(err.error_code(), "FILE_LOCKED");

        let on_disk = read_lock_info(&lock_path_for(&path)).unwrap();
        assert_eq!(on_disk.user_id, "pat");
        assert_eq!(on_disk.locked_at, aged.locked_at);
        drop(held);
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
    fn test_load_with_lock_check() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("check.hmr");
        save_report(&Report::new("Pat", "C", "A"), &path).unwrap();

        let (report, lock) = load_report_with_lock_check(&path).unwrap();
        assert_eq!(report.meta.preparer, "Pat");
        assert!(lock.is_none());
    }
}
