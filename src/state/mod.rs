//! State Maps
//!
//! The read-only key to diagram-source mapping and the tutorial file that
//! carries it.

pub mod map;
pub mod tutorial;

pub use map::{StateMap, INITIAL_STATE};
pub use tutorial::{Step, Tutorial, TutorialError};
