//! Process configuration.
//!
//! All knobs are environment variables with defaults that match a plain `cargo run` from the
//! repository root; see the crate docs for the full list.

use std::path::PathBuf;

use anyhow::Context;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_BODY_LIMIT: usize = 10 * 1024 * 1024;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Port the HTTP listener binds on.
    pub port: u16,
    /// Directory containing the three model weight files.
    pub models_dir: PathBuf,
    /// Directory uploads and processed outputs are written to.
    pub uploads_dir: PathBuf,
    /// Directory the upload form page is served from.
    pub assets_dir: PathBuf,
    /// Maximum accepted multipart body size, in bytes.
    pub body_limit: usize,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        let port = match std::env::var("NARIGUDO_PORT") {
            Ok(value) => value
                .parse()
                .with_context(|| format!("NARIGUDO_PORT must be a port number, got `{value}`"))?,
            Err(_) => DEFAULT_PORT,
        };
        let body_limit = match std::env::var("NARIGUDO_BODY_LIMIT") {
            Ok(value) => value.parse().with_context(|| {
                format!("NARIGUDO_BODY_LIMIT must be a byte count, got `{value}`")
            })?,
            Err(_) => DEFAULT_BODY_LIMIT,
        };

        let dir = |var: &str, default: &str| {
            std::env::var_os(var)
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(default))
        };

        Ok(Self {
            port,
            models_dir: dir("NARIGUDO_MODELS_DIR", "./models"),
            uploads_dir: dir("NARIGUDO_UPLOADS_DIR", "./uploads"),
            assets_dir: dir("NARIGUDO_ASSETS_DIR", "./public"),
            body_limit,
        })
    }
}
