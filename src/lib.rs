//! Narigudo, a novelty photo filter service.
//!
//! Upload a photo, get it back with an enlarged nose and a shower of hearts and roses. Face
//! detection, landmark extraction and expression classification run locally on pretrained ONNX
//! models; drawing happens on a plain RGBA canvas; the result comes back as PNG.
//!
//! # Environment Variables
//!
//! The server is configured through environment variables, all optional:
//!
//! * `NARIGUDO_PORT`: Port the HTTP listener binds on. Defaults to `3000`.
//! * `NARIGUDO_MODELS_DIR`: Directory containing the three model weight files (see
//!   `models/README.md`). Defaults to `./models`.
//! * `NARIGUDO_UPLOADS_DIR`: Directory uploaded originals and processed outputs are written to,
//!   created on startup if missing. Defaults to `./uploads`.
//! * `NARIGUDO_ASSETS_DIR`: Directory the upload form page is served from. Defaults to
//!   `./public`.
//! * `NARIGUDO_BODY_LIMIT`: Maximum accepted upload size in bytes. Defaults to 10 MiB.

use log::LevelFilter;

pub mod caricature;
pub mod config;
pub mod decorate;
pub mod detection;
pub mod face;
pub mod image;
pub mod landmark;
pub mod nn;
pub mod num;
pub mod pipeline;
pub mod server;
pub mod storage;

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .filter(Some("tract_onnx"), LevelFilter::Warn)
        .filter(Some("tract_core"), LevelFilter::Warn)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// If `cfg!(debug_assertions)` is enabled, the calling crate and narigudo will log at *debug*
/// level, otherwise at *info* level. The inference library always logs at *warn* level.
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
