//! State Dispatch
//!
//! Turns page events into state-keyed renders and owns everything written to
//! the diagram container.

pub mod dispatcher;
pub mod events;

pub use dispatcher::{initialize_app, DispatchOptions, Dispatcher, RenderOutcome};
pub use events::PageEvent;
