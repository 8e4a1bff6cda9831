// src/config/defaults.rs
use crate::config::app::{Paths, Security, Session};
use crate::consts::{DEFAULT_HOTP_LOOKAHEAD, DEFAULT_KDF_ITERATIONS};

pub fn default_paths() -> Paths {
    let base = dirs::data_dir().unwrap_or_else(|| std::path::PathBuf::from("."));
    Paths {
        vault_file: base
            .join("totp-vault")
            .join("vault.json")
            .to_string_lossy()
            .into_owned(),
    }
}

pub fn default_security() -> Security {
    Security {
        kdf_iterations: DEFAULT_KDF_ITERATIONS,
        hotp_lookahead: DEFAULT_HOTP_LOOKAHEAD,
    }
}

pub fn default_session() -> Session {
    Session {
        idle_lock_secs: 300,
        clipboard_clear_secs: 30,
    }
}
