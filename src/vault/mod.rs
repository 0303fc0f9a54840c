//! Vault module - local account registration and login

pub mod storage;

pub use storage::{
    default_storage_dir, generate_vault_key, is_valid_pin, sanitize_pin, sanitize_vault_key,
    VaultEntry, VaultError, VaultStorage, RECOVERY_PIN_LEN, STORAGE_KEY, VAULT_KEY_LEN,
};
