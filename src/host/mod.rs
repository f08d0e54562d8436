//! Host Page
//!
//! The page the dispatcher drives: one container it owns, and any number of
//! step elements it highlights. The dispatcher only talks to the page through
//! [`Host`], so any document model can embed it.

pub mod document;

pub use document::{Document, NodeId};

use std::fmt;

use crate::render::RenderId;

/// Class carried by every selectable step
pub const STEP_MARKER: &str = "step";
/// Class carried by the currently selected step
pub const ACTIVE_MARKER: &str = "active";
/// Data attribute holding a step's state key (`data-state`)
pub const STATE_ATTRIBUTE: &str = "state";
/// Id of the element that receives rendered diagrams
pub const CONTAINER_ID: &str = "diagram-container";

/// What the dispatcher writes into the container. Every write replaces all
/// previous contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    /// Raw diagram source awaiting rendering
    Placeholder { id: RenderId, source: String },
    /// Markup returned by the renderer, inserted verbatim
    Markup(String),
    /// User-visible error text
    Error(String),
}

pub trait Host: Send + Sync {
    type Node: Clone + Send + Sync + fmt::Debug + 'static;

    /// Nearest node at or above `target` carrying `marker`
    fn closest(&self, target: &Self::Node, marker: &str) -> Option<Self::Node>;

    /// Value of the `data-<name>` attribute on `node`
    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    /// All nodes currently carrying `marker`
    fn marked(&self, marker: &str) -> Vec<Self::Node>;

    fn add_marker(&self, node: &Self::Node, marker: &str);

    fn remove_marker(&self, node: &Self::Node, marker: &str);

    fn has_container(&self, id: &str) -> bool;

    /// Replace everything inside the container with `content`. Returns
    /// `false` when the page has no such container.
    fn replace_container(&self, id: &str, content: Content) -> bool;
}

/// Finds the step element a click landed in.
///
/// Split out from [`Host`] so click handling can be exercised with a plain
/// closure instead of a document tree.
pub trait StepLocator<N>: Send + Sync {
    fn closest_step(&self, target: &N, marker: &str) -> Option<N>;
}

impl<N, F> StepLocator<N> for F
where
    F: Fn(&N, &str) -> Option<N> + Send + Sync,
{
    fn closest_step(&self, target: &N, marker: &str) -> Option<N> {
        self(target, marker)
    }
}

/// Locator that walks the host's own tree
pub struct HostLocator<H>(pub std::sync::Arc<H>);

impl<H: Host> StepLocator<H::Node> for HostLocator<H> {
    fn closest_step(&self, target: &H::Node, marker: &str) -> Option<H::Node> {
        self.0.closest(target, marker)
    }
}
