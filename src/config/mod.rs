// src/config/mod.rs
//! Configuration system for totp-vault
//!
//! Central, lazy-loaded global config with TOML + env overrides.

pub use app::{load, Config, Paths, Security, Session};

mod app;
mod defaults;
