// src/vault.rs
//! VaultStore — the owned, encrypted profile collection
//!
//! A store is either locked (no key material in memory) or holds one
//! unlocked [`Session`]. Every state-touching operation takes the single
//! internal mutex, so `persist`, `lock`, and `rotate_password` serialize
//! against each other: an idle-timer `lock` can never discard the key
//! while a write is mid-flight.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use log::{info, warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

use crate::aliases::VaultPlaintext;
use crate::consts::{DEFAULT_HOTP_LOOKAHEAD, SALT_LEN, VAULT_FORMAT_VERSION};
use crate::crypto::EncryptedBlob;
use crate::error::VaultError;
use crate::kdf::MasterCredential;
use crate::otp;
use crate::profile::{OtpKind, Profile};

pub type Result<T> = std::result::Result<T, VaultError>;

/// On-disk framing: the encrypted blob plus the password verifier.
/// Self-describing by `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct VaultFile {
    version: u32,
    salt: String,
    iterations: u32,
    /// Hex BLAKE3 keyed hash; lets unlock reject a wrong password
    /// without attempting decryption.
    verifier: String,
    nonce: String,
    ciphertext: String,
}

impl VaultFile {
    fn blob(&self) -> EncryptedBlob {
        EncryptedBlob {
            version: self.version,
            salt: self.salt.clone(),
            iterations: self.iterations,
            nonce: self.nonce.clone(),
            ciphertext: self.ciphertext.clone(),
        }
    }

    fn from_parts(verifier: &[u8; 32], blob: EncryptedBlob) -> Self {
        Self {
            version: blob.version,
            salt: blob.salt,
            iterations: blob.iterations,
            verifier: hex::encode(verifier),
            nonce: blob.nonce,
            ciphertext: blob.ciphertext,
        }
    }

    fn verifier_bytes(&self) -> Result<[u8; 32]> {
        hex::decode(&self.verifier)
            .ok()
            .and_then(|v| v.try_into().ok())
            .ok_or(VaultError::CorruptedVault)
    }

    fn salt_bytes(&self) -> Result<[u8; SALT_LEN]> {
        hex::decode(&self.salt)
            .ok()
            .and_then(|s| s.try_into().ok())
            .ok_or(VaultError::CorruptedVault)
    }
}

/// A live OTP code snapshot for display.
#[derive(Debug, Clone, Serialize)]
pub struct CodeSnapshot {
    pub profile_id: String,
    pub code: String,
    /// Seconds until expiry; zero for HOTP entries.
    pub seconds_remaining: u64,
}

/// Explicit confirmation token for [`VaultStore::reset_vault`].
///
/// Destroying the vault is the one irreversible operation in this crate;
/// constructing this value is the caller's acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetConfirm {
    EraseAllProfiles,
}

struct Session {
    credential: MasterCredential,
    profiles: Vec<Profile>,
}

/// Owned, explicitly-passed vault handle — there is no global instance.
/// Collaborators (idle timer, UI) hold a shared reference.
pub struct VaultStore {
    path: PathBuf,
    state: Mutex<Option<Session>>,
}

impl VaultStore {
    /// Attach to a vault file path. No I/O happens until `create` or
    /// `unlock`.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: Mutex::new(None),
        }
    }

    /// Attach to the configured vault path.
    pub fn from_config() -> Self {
        Self::open(&crate::config::load().paths.vault_file)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// First-run setup: fresh salt/verifier and an empty encrypted
    /// profile set on disk. Refuses to clobber an existing vault.
    pub fn create(&self, password: &str, iterations: u32) -> Result<()> {
        if self.exists() {
            return Err(VaultError::Io(std::io::Error::new(
                std::io::ErrorKind::AlreadyExists,
                "vault file already exists",
            )));
        }
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let session = Session {
            credential: MasterCredential::create(password, iterations)?,
            profiles: Vec::new(),
        };
        self.persist_locked(&session)?;
        *state = Some(session);
        info!("created new vault at {}", self.path.display());
        Ok(())
    }

    /// Unlock: verifier check first, then AEAD open.
    ///
    /// A wrong password ([`VaultError::Authentication`]) and a tampered
    /// blob ([`VaultError::CorruptedVault`]) render the same message, so
    /// the caller's UI cannot leak which check failed.
    pub fn unlock(&self, password: &str) -> Result<()> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let file = self.read_file()?;
        let credential = MasterCredential::unlock(
            password,
            file.salt_bytes()?,
            file.iterations,
            file.verifier_bytes()?,
        )?;
        let plaintext = file.blob().open(&credential.key)?;
        let profiles: Vec<Profile> = serde_json::from_slice(&plaintext).map_err(|e| {
            warn!("vault blob decrypted but did not deserialize: {e}");
            VaultError::CorruptedVault
        })?;
        info!("vault unlocked: {} profile(s)", profiles.len());
        *state = Some(Session {
            credential,
            profiles,
        });
        Ok(())
    }

    /// Discard all in-memory key material and profiles. The derived key
    /// and profile secrets zeroize as they drop.
    pub fn lock(&self) {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        if state.take().is_some() {
            info!("vault locked");
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.state.lock().expect("vault mutex poisoned").is_some()
    }

    /// Snapshot of the current profiles, for display.
    pub fn profiles(&self) -> Result<Vec<Profile>> {
        let state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_ref().ok_or(VaultError::Locked)?;
        Ok(session.profiles.clone())
    }

    pub fn profile(&self, id: &str) -> Result<Profile> {
        let state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_ref().ok_or(VaultError::Locked)?;
        session
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| VaultError::validation("id", format!("no profile with id {id}")))
    }

    /// Add a profile in memory. Not durable until [`persist`].
    ///
    /// [`persist`]: VaultStore::persist
    pub fn add_profile(&self, profile: Profile) -> Result<String> {
        profile.validate()?;
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_mut().ok_or(VaultError::Locked)?;
        let id = profile.id.clone();
        session.profiles.push(profile);
        Ok(id)
    }

    /// Replace the profile with the same `id`. Not durable until
    /// [`persist`](VaultStore::persist).
    pub fn update_profile(&self, profile: Profile) -> Result<()> {
        profile.validate()?;
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_mut().ok_or(VaultError::Locked)?;
        let slot = session
            .profiles
            .iter_mut()
            .find(|p| p.id == profile.id)
            .ok_or_else(|| VaultError::validation("id", "no profile with that id"))?;
        let mut profile = profile;
        profile.updated_at = chrono::Utc::now();
        *slot = profile;
        Ok(())
    }

    /// Remove a profile by id; returns it if present.
    pub fn delete_profile(&self, id: &str) -> Result<Option<Profile>> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_mut().ok_or(VaultError::Locked)?;
        let pos = session.profiles.iter().position(|p| p.id == id);
        Ok(pos.map(|i| session.profiles.remove(i)))
    }

    /// Serialize, seal with a fresh nonce, and atomically replace the
    /// on-disk blob (temp file + rename). An I/O failure leaves both the
    /// previous file and the in-memory vault intact.
    pub fn persist(&self) -> Result<()> {
        let state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_ref().ok_or(VaultError::Locked)?;
        self.persist_locked(session)
    }

    fn persist_locked(&self, session: &Session) -> Result<()> {
        let plaintext = VaultPlaintext::new(serde_json::to_vec(&session.profiles)?);
        let blob = EncryptedBlob::seal(
            &session.credential.key,
            &session.credential.salt,
            session.credential.iterations,
            plaintext.expose_secret(),
        )?;
        let file = VaultFile::from_parts(&session.credential.verifier, blob);
        self.write_file(&file)?;
        info!("persisted {} profile(s)", session.profiles.len());
        Ok(())
    }

    /// Verify the old password, derive a fresh credential for the new
    /// one, and re-encrypt everything. The old blob stays valid until
    /// the replacement rename lands.
    pub fn rotate_password(&self, old_password: &str, new_password: &str) -> Result<()> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_mut().ok_or(VaultError::Locked)?;
        let cred = &session.credential;
        if !crate::kdf::check_password(old_password, &cred.salt, cred.iterations, &cred.verifier)? {
            return Err(VaultError::Authentication);
        }
        let new_credential = MasterCredential::create(new_password, cred.iterations)?;
        session.credential = new_credential;
        self.persist_locked(session)?;
        info!("master password rotated, vault re-encrypted");
        Ok(())
    }

    /// Irreversibly delete the vault file and all in-memory state.
    /// There is no recovery path.
    pub fn reset_vault(&self, _confirm: ResetConfirm) -> Result<()> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        *state = None;
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        warn!("vault reset: all profiles and the master credential erased");
        Ok(())
    }

    /// Live code for a profile at an explicit timestamp. For HOTP
    /// entries this reads the stored counter without advancing it — use
    /// [`hotp_advance`](VaultStore::hotp_advance) to consume a code.
    pub fn generate_code(&self, id: &str, at_time: u64) -> Result<CodeSnapshot> {
        let state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_ref().ok_or(VaultError::Locked)?;
        let profile = session
            .profiles
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| VaultError::validation("id", "no profile with that id"))?;
        match profile.kind {
            OtpKind::Totp => Ok(CodeSnapshot {
                profile_id: profile.id.clone(),
                code: otp::generate_totp(
                    &profile.secret,
                    profile.algorithm,
                    profile.digits,
                    profile.period,
                    at_time,
                )?,
                seconds_remaining: otp::seconds_remaining(profile.period, at_time)?,
            }),
            OtpKind::Hotp => Ok(CodeSnapshot {
                profile_id: profile.id.clone(),
                code: otp::generate_hotp(
                    &profile.secret,
                    profile.algorithm,
                    profile.digits,
                    profile.counter,
                )?,
                seconds_remaining: 0,
            }),
        }
    }

    /// Consume one HOTP code: generate at the stored counter, then
    /// commit `counter + 1`. The counter advance is an explicit state
    /// transition here, not a hidden side effect of generation.
    pub fn hotp_advance(&self, id: &str) -> Result<String> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_mut().ok_or(VaultError::Locked)?;
        let profile = session
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| VaultError::validation("id", "no profile with that id"))?;
        if profile.kind != OtpKind::Hotp {
            return Err(VaultError::validation("kind", "not an HOTP profile"));
        }
        let code = otp::generate_hotp(
            &profile.secret,
            profile.algorithm,
            profile.digits,
            profile.counter,
        )?;
        profile.counter += 1;
        profile.updated_at = chrono::Utc::now();
        Ok(code)
    }

    /// Resynchronize an HOTP profile against a candidate code within the
    /// look-ahead window; on a match the stored counter moves to
    /// `matched + 1`. Returns the matched counter, or `None`.
    pub fn resync_hotp(
        &self,
        id: &str,
        candidate: &str,
        look_ahead: Option<u64>,
    ) -> Result<Option<u64>> {
        let mut state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_mut().ok_or(VaultError::Locked)?;
        let profile = session
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| VaultError::validation("id", "no profile with that id"))?;
        if profile.kind != OtpKind::Hotp {
            return Err(VaultError::validation("kind", "not an HOTP profile"));
        }
        let window = look_ahead.unwrap_or(DEFAULT_HOTP_LOOKAHEAD);
        let matched = otp::verify_hotp(
            &profile.secret,
            profile.algorithm,
            profile.digits,
            profile.counter,
            candidate,
            window,
        )?;
        if let Some(counter) = matched {
            profile.counter = counter + 1;
            profile.updated_at = chrono::Utc::now();
        }
        Ok(matched)
    }

    /// Fresh encrypted blob of the current profile set, for backup
    /// export through [`crate::qr`].
    pub fn export_backup(&self) -> Result<EncryptedBlob> {
        let state = self.state.lock().expect("vault mutex poisoned");
        let session = state.as_ref().ok_or(VaultError::Locked)?;
        let plaintext = VaultPlaintext::new(serde_json::to_vec(&session.profiles)?);
        EncryptedBlob::seal(
            &session.credential.key,
            &session.credential.salt,
            session.credential.iterations,
            plaintext.expose_secret(),
        )
    }

    fn read_file(&self) -> Result<VaultFile> {
        let bytes = fs::read(&self.path)?;
        let file: VaultFile = serde_json::from_slice(&bytes).map_err(|e| {
            warn!("vault file is not valid JSON framing: {e}");
            VaultError::CorruptedVault
        })?;
        if file.version != VAULT_FORMAT_VERSION {
            warn!("unknown vault format version {}", file.version);
            return Err(VaultError::CorruptedVault);
        }
        Ok(file)
    }

    fn write_file(&self, file: &VaultFile) -> Result<()> {
        let parent = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        fs::create_dir_all(&parent)?;
        let json = serde_json::to_vec_pretty(file)?;
        let mut tmp = NamedTempFile::new_in(&parent)?;
        tmp.write_all(&json)?;
        tmp.flush()?;
        tmp.persist(&self.path).map_err(|e| VaultError::Io(e.error))?;
        Ok(())
    }
}
