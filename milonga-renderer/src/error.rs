//! Error types for milonga-renderer.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Template failed to parse or render.
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// A warning's message template failed; `key` names the message.
    #[error("cannot render message '{key}': {source}")]
    Message {
        key: &'static str,
        #[source]
        source: tera::Error,
    },

    /// Filesystem error while loading user template overrides.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}
