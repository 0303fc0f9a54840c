//! Vault Storage Module
//! Local account list kept as an obfuscated blob on disk.
//!
//! The blob is base64-encoded JSON. This hides the content from a casual
//! glance at the file and nothing more; it is not encryption.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

/// File name of the vault blob inside the storage directory.
pub const STORAGE_KEY: &str = "varies_back_structure";

pub const VAULT_KEY_LEN: usize = 6;
pub const RECOVERY_PIN_LEN: usize = 4;

const DUPLICATE_USER: &str = "Username already exists. Vault Key cannot be regenerated.";
const ACCESS_DENIED: &str = "Username and Vault Key do not match. Access denied.";

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("{}", DUPLICATE_USER)]
    DuplicateUser,
    #[error("{}", ACCESS_DENIED)]
    AccessDenied,
    #[error("Vault storage error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to encode vault: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VaultEntry {
    pub username: String,
    pub vault_key: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    pub recovery_pin: String,
    pub created_at: DateTime<Utc>,
}

impl VaultEntry {
    pub fn new(
        username: impl Into<String>,
        vault_key: impl Into<String>,
        email: impl Into<String>,
        institution: Option<String>,
        recovery_pin: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            vault_key: vault_key.into(),
            email: email.into(),
            institution,
            recovery_pin: recovery_pin.into(),
            created_at: Utc::now(),
        }
    }

    fn matches_username(&self, username: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct VaultData {
    #[serde(default)]
    entries: Vec<VaultEntry>,
}

/// Vault blob stored under a directory.
#[derive(Debug, Clone)]
pub struct VaultStorage {
    dir: PathBuf,
}

impl VaultStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.join(STORAGE_KEY)
    }

    /// All registered entries. A missing or undecodable blob yields none.
    pub fn entries(&self) -> Result<Vec<VaultEntry>, VaultError> {
        Ok(self.load()?.entries)
    }

    /// Read the blob; only a missing file counts as an empty vault.
    fn load(&self) -> Result<VaultData, VaultError> {
        let path = self.path();
        let raw = match fs::read_to_string(&path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(VaultData::default()),
            Err(e) => {
                error!(path = %path.display(), error = %e, "vault blob could not be read");
                return Err(VaultError::Io(e));
            }
        };
        match decode(&raw) {
            Some(data) => Ok(data),
            None => {
                warn!(path = %path.display(), "vault blob undecodable, starting empty");
                Ok(VaultData::default())
            }
        }
    }

    fn save(&self, data: &VaultData) -> Result<(), VaultError> {
        fs::create_dir_all(&self.dir)?;
        let json = serde_json::to_string(data)?;
        fs::write(self.path(), STANDARD.encode(json))?;
        Ok(())
    }

    /// Add an account; usernames are unique ignoring case.
    pub fn register_user(&self, entry: VaultEntry) -> Result<(), VaultError> {
        let mut data = self.load()?;
        if data.entries.iter().any(|e| e.matches_username(&entry.username)) {
            return Err(VaultError::DuplicateUser);
        }
        info!(username = %entry.username, "vault entry registered");
        data.entries.push(entry);
        self.save(&data)
    }

    /// Check a username and vault key pair.
    ///
    /// Unknown users and wrong keys give the same error.
    pub fn validate_login(&self, username: &str, vault_key: &str) -> Result<VaultEntry, VaultError> {
        let entry = self
            .load()?
            .entries
            .into_iter()
            .find(|e| e.matches_username(username))
            .filter(|e| e.vault_key == vault_key);
        match entry {
            Some(entry) => {
                info!(username = %entry.username, "vault login");
                Ok(entry)
            }
            None => {
                warn!(username, "vault login rejected");
                Err(VaultError::AccessDenied)
            }
        }
    }
}

fn decode(raw: &str) -> Option<VaultData> {
    let bytes = STANDARD.decode(raw.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}

/// Random six digit vault key.
pub fn generate_vault_key() -> String {
    rand::thread_rng().gen_range(100_000..=999_999).to_string()
}

fn digits_only(input: &str, max: usize) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).take(max).collect()
}

pub fn sanitize_vault_key(input: &str) -> String {
    digits_only(input, VAULT_KEY_LEN)
}

pub fn sanitize_pin(input: &str) -> String {
    digits_only(input, RECOVERY_PIN_LEN)
}

/// Whether `input` is a complete recovery PIN.
pub fn is_valid_pin(input: &str) -> bool {
    input.len() == RECOVERY_PIN_LEN && input.chars().all(|c| c.is_ascii_digit())
}

/// Storage directory used when none is configured.
pub fn default_storage_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| Path::new(".").to_path_buf())
        .join("varies_vault")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(username: &str, key: &str) -> VaultEntry {
        VaultEntry::new(username, key, "a@b.c", None, "1234")
    }

    #[test]
    fn test_register_and_login() {
        let dir = tempfile::tempdir().unwrap();
        let vault = VaultStorage::new(dir.path());
        vault.register_user(entry("Ada", "123456")).unwrap();

        let found = vault.validate_login("ada", "123456").unwrap();
        assert_eq!(found.username, "Ada");
    }

    #[test]
    fn test_duplicate_username_ignores_case() {
        let dir = tempfile::tempdir().unwrap();
        let vault = VaultStorage::new(dir.path());
        vault.register_user(entry("Ada", "123456")).unwrap();

        let err = vault.register_user(entry("ADA", "654321")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Username already exists. Vault Key cannot be regenerated."
        );
        assert_eq!(vault.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_login_rejections_share_message() {
        let dir = tempfile::tempdir().unwrap();
        let vault = VaultStorage::new(dir.path());
        vault.register_user(entry("Ada", "123456")).unwrap();

        let wrong_key = vault.validate_login("Ada", "000000").unwrap_err();
        let unknown = vault.validate_login("Grace", "123456").unwrap_err();
        assert_eq!(wrong_key.to_string(), unknown.to_string());
        assert_eq!(
            unknown.to_string(),
            "Username and Vault Key do not match. Access denied."
        );
    }

    #[test]
    fn test_blob_is_base64_json() {
        let dir = tempfile::tempdir().unwrap();
        let vault = VaultStorage::new(dir.path());
        vault
            .register_user(VaultEntry::new("Inst", "111111", "x@y.z", Some("Acme".into()), "9999"))
            .unwrap();

        let raw = fs::read_to_string(dir.path().join(STORAGE_KEY)).unwrap();
        assert!(!raw.contains("Inst"));
        let json = String::from_utf8(STANDARD.decode(raw).unwrap()).unwrap();
        assert!(json.contains("\"entries\""));
        assert!(json.contains("\"vaultKey\":\"111111\""));
        assert!(json.contains("\"institution\":\"Acme\""));
    }

    #[test]
    fn test_corrupt_blob_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORAGE_KEY), "not base64 !!").unwrap();
        let vault = VaultStorage::new(dir.path());
        assert!(vault.entries().unwrap().is_empty());
        vault.register_user(entry("Ada", "123456")).unwrap();
        assert_eq!(vault.entries().unwrap().len(), 1);
    }

    #[test]
    fn test_unreadable_blob_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_KEY);
        fs::write(&path, [0xff, 0xfe, 0x00, 0xc3]).unwrap();
        let vault = VaultStorage::new(dir.path());

        assert!(matches!(vault.entries(), Err(VaultError::Io(_))));
        assert!(matches!(
            vault.register_user(entry("Ada", "123456")),
            Err(VaultError::Io(_))
        ));
        assert!(matches!(
            vault.validate_login("Ada", "123456"),
            Err(VaultError::Io(_))
        ));
        assert_eq!(fs::read(&path).unwrap(), vec![0xff, 0xfe, 0x00, 0xc3]);
    }

    #[test]
    fn test_generate_vault_key_is_six_digits() {
        for _ in 0..50 {
            let key = generate_vault_key();
            assert_eq!(key.len(), 6);
            assert!(key.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(key.chars().next(), Some('0'));
        }
    }

    #[test]
    fn test_sanitizers() {
        assert_eq!(sanitize_vault_key("12a3-4567 89"), "123456");
        assert_eq!(sanitize_pin("9x8y7z6w5"), "9876");
        assert!(is_valid_pin("0042"));
        assert!(!is_valid_pin("42"));
    }
}
