// tests/support.rs
//! Test utilities — temp-directory vault fixtures

use std::path::PathBuf;

use tempfile::TempDir;
use totp_vault::profile::Profile;
use totp_vault::vault::VaultStore;

pub const TEST_PASSWORD: &str = "test-master-password-2026";
pub const TEST_ITERATIONS: u32 = 100_000;

/// A vault store backed by a throwaway directory. The directory lives
/// as long as the fixture; dropping it deletes everything.
pub struct TestVault {
    pub store: VaultStore,
    dir: TempDir,
}

impl TestVault {
    /// Fresh vault, created and left unlocked.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create tempdir");
        let store = VaultStore::open(dir.path().join("vault.json"));
        store
            .create(TEST_PASSWORD, TEST_ITERATIONS)
            .expect("create vault");
        Self { store, dir }
    }

    /// A second store handle on the same file, for reload scenarios.
    pub fn reopen(&self) -> VaultStore {
        VaultStore::open(self.vault_path())
    }

    pub fn vault_path(&self) -> PathBuf {
        self.dir.path().join("vault.json")
    }
}

#[allow(dead_code)]
pub fn totp_profile(label: &str) -> Profile {
    Profile::new(label, b"12345678901234567890".to_vec()).with_issuer("Example")
}

#[allow(dead_code)]
pub fn hotp_profile(label: &str) -> Profile {
    Profile::new(label, b"12345678901234567890".to_vec())
        .with_issuer("Example")
        .as_hotp(0)
}
