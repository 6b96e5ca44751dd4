//! On-disk record file holding every vault of one installation.
//!
//! The file is a single JSON object keyed by vault name:
//!
//! ```text
//! {
//!   "teamsecrets": {
//!     "name": "teamsecrets",
//!     "ciphertext": "<base64 salt|nonce|tag|ciphertext>",
//!     "isUnlocked": true,
//!     "credentials": [ { "key": "api", "value": "xyz" } ]
//!   }
//! }
//! ```
//!
//! `credentials` is a plaintext snapshot and is only present while the
//! vault is unlocked.  Older files name the ciphertext field
//! `encryptedData` and carry a plaintext `password`; the former is read
//! as an alias and the latter is ignored.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::credential::Credential;
use crate::errors::{CredVaultError, Result};

/// Serialized form of one vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultRecord {
    pub name: String,

    /// Codec output for the last committed credential set.
    #[serde(alias = "encryptedData")]
    pub ciphertext: String,

    #[serde(default)]
    pub is_unlocked: bool,

    /// Plaintext snapshot, written only when `is_unlocked` is true.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<Vec<Credential>>,
}

/// The whole record file: vault name -> record, sorted by name.
pub type RecordFile = BTreeMap<String, VaultRecord>;

/// Read the record file at `path`.
///
/// A missing file is an empty collection, not an error.
pub fn read_records(path: &Path) -> Result<RecordFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no record file yet");
        return Ok(RecordFile::new());
    }

    let data = fs::read(path)?;
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecordFile::new());
    }

    let records: RecordFile =
        serde_json::from_slice(&data).map_err(|e| CredVaultError::InvalidRecordFile {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::debug!(path = %path.display(), vaults = records.len(), "loaded record file");
    Ok(records)
}

/// Write the record file to disk **atomically**.
///
/// 1. Serialize every record to pretty JSON.
/// 2. Write to a temp file in the same directory.
/// 3. Rename the temp file over the target path.
///
/// The rename ensures readers never see a half-written file.  It does
/// not protect against two processes writing concurrently: the last
/// rename wins.
pub fn write_records(path: &Path, records: &RecordFile) -> Result<()> {
    let mut buf = serde_json::to_vec_pretty(records)
        .map_err(|e| CredVaultError::SerializationError(format!("record file: {e}")))?;
    buf.push(b'\n');

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let tmp_path = parent.join(format!(
        ".{}.tmp",
        path.file_name().unwrap_or_default().to_string_lossy()
    ));

    if let Err(e) = write_private(&tmp_path, &buf) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    tracing::debug!(path = %path.display(), vaults = records.len(), "wrote record file");
    Ok(())
}

/// Write `buf` to `path`, readable by the owner only from the moment the
/// file exists (the file may hold plaintext snapshots).
fn write_private(path: &Path, buf: &[u8]) -> io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;

    // `mode` only applies on creation; a stale temp file keeps its own.
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))?;
    }

    file.write_all(buf)?;
    file.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn locked(name: &str) -> VaultRecord {
        VaultRecord {
            name: name.to_string(),
            ciphertext: "AAAA".to_string(),
            is_unlocked: false,
            credentials: None,
        }
    }

    #[test]
    fn missing_file_is_empty_collection() {
        let tmp = TempDir::new().unwrap();
        let records = read_records(&tmp.path().join("vaults.json")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn write_then_read_preserves_records() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("vaults.json");

        let mut records = RecordFile::new();
        records.insert("lockedone".into(), locked("lockedone"));
        records.insert(
            "openvault".into(),
            VaultRecord {
                name: "openvault".into(),
                ciphertext: "BBBB".into(),
                is_unlocked: true,
                credentials: Some(vec![Credential::new("api", "xyz")]),
            },
        );

        write_records(&path, &records).unwrap();
        let loaded = read_records(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn locked_records_omit_credentials_field() {
        let json = serde_json::to_string(&locked("lockedone")).unwrap();
        assert!(json.contains("\"isUnlocked\":false"));
        assert!(!json.contains("credentials"));
    }

    #[test]
    fn reads_legacy_field_names_and_ignores_password() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vaults.json");
        fs::write(
            &path,
            r#"{"legacy1": {"name": "legacy1", "password": "hunter2", "encryptedData": "CCCC", "isUnlocked": false}}"#,
        )
        .unwrap();

        let loaded = read_records(&path).unwrap();
        assert_eq!(loaded["legacy1"].ciphertext, "CCCC");

        write_records(&path, &loaded).unwrap();
        let rewritten = fs::read_to_string(&path).unwrap();
        assert!(!rewritten.contains("hunter2"));
        assert!(!rewritten.contains("password"));
    }

    #[test]
    fn corrupt_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vaults.json");
        fs::write(&path, "{not json").unwrap();

        let err = read_records(&path).unwrap_err();
        assert!(matches!(err, CredVaultError::InvalidRecordFile { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn record_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vaults.json");
        write_records(&path, &RecordFile::new()).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn stale_world_readable_temp_file_is_tightened() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vaults.json");
        let stale = tmp.path().join(".vaults.json.tmp");
        fs::write(&stale, "left over").unwrap();
        fs::set_permissions(&stale, fs::Permissions::from_mode(0o644)).unwrap();

        let mut records = RecordFile::new();
        records.insert("lockedone".into(), locked("lockedone"));
        write_records(&path, &records).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(read_records(&path).unwrap(), records);
    }

    #[test]
    fn no_temp_file_is_left_behind() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("vaults.json");
        write_records(&path, &RecordFile::new()).unwrap();
        assert!(!tmp.path().join(".vaults.json.tmp").exists());

        // The rename onto a directory fails; the temp file is cleaned up.
        fs::remove_file(&path).unwrap();
        fs::create_dir(&path).unwrap();
        assert!(write_records(&path, &RecordFile::new()).is_err());
        assert!(!tmp.path().join(".vaults.json.tmp").exists());
    }
}
