//! Rendering Service
//!
//! The dispatcher treats diagram rendering as an opaque async service: it
//! hands over an identifier and diagram source, and gets markup or an error
//! back.

pub mod id;
pub mod mermaid_cli;
pub mod options;

pub use id::RenderId;
pub use mermaid_cli::MermaidCli;
pub use options::{RenderOptions, SecurityLevel, Theme};

use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("renderer has not been initialized")]
    NotInitialized,

    #[error("failed to start renderer {program:?}: {source}")]
    Spawn {
        program: PathBuf,
        source: std::io::Error,
    },

    #[error("renderer exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid renderer configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// An external diagram renderer
#[async_trait::async_trait]
pub trait RenderService: Send + Sync {
    /// Apply startup options; called once before the first render
    async fn initialize(&self, options: &RenderOptions) -> Result<(), RenderError>;

    /// Render `source` into markup, using `id` as the diagram's identifier
    async fn render(&self, id: &RenderId, source: &str) -> Result<String, RenderError>;
}
