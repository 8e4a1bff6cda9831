// src/config/app.rs
use super::defaults::*;
use serde::Deserialize;
use std::sync::OnceLock;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_paths")]
    pub paths: Paths,
    #[serde(default = "default_security")]
    pub security: Security,
    #[serde(default = "default_session")]
    pub session: Session,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Paths {
    pub vault_file: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Security {
    pub kdf_iterations: u32,
    pub hotp_lookahead: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Session {
    /// Seconds of inactivity before the UI layer should call
    /// `VaultStore::lock`. Zero disables auto-lock.
    pub idle_lock_secs: u64,
    /// Seconds a copied code stays on the clipboard before clearing.
    pub clipboard_clear_secs: u64,
}

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn load() -> &'static Config {
    CONFIG.get_or_init(|| {
        let config_path = std::env::var("TOTP_VAULT_CONFIG")
            .unwrap_or_else(|_| "totp-vault.toml".to_string());

        if std::path::Path::new(&config_path).exists() {
            let content = std::fs::read_to_string(&config_path)
                .expect("Failed to read config file");
            toml::from_str(&content).expect("Invalid TOML in config file")
        } else {
            Config {
                paths: default_paths(),
                security: default_security(),
                session: default_session(),
            }
        }
    })
}
