//! Diagram Stepper
//!
//! Drives a step-by-step diagram tutorial: clicking a step renders the
//! diagram for that step's state into a single container on the page.
//!
//! This library provides:
//! - State maps and tutorial files
//! - The state dispatcher (page-ready and click triggers, render dispatch)
//! - A host page abstraction with a headless in-memory document
//! - An async rendering service seam with a Mermaid CLI backend
//! - Configuration management

pub mod app;
pub mod config;
pub mod dispatch;
pub mod host;
pub mod render;
pub mod state;

// Re-exports for clean public API
pub use config::Config;
pub use dispatch::{initialize_app, DispatchOptions, Dispatcher, PageEvent, RenderOutcome};
pub use host::{Content, Document, Host, StepLocator};
pub use render::{MermaidCli, RenderError, RenderId, RenderOptions, RenderService};
pub use state::{StateMap, Tutorial};
