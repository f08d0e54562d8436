//! Tutorial Files
//!
//! A tutorial is a TOML file holding the state map and the ordered steps
//! that select from it:
//!
//! ```toml
//! title = "Flowcharts"
//!
//! [states]
//! initial = "graph TD; A-->B"
//! other = "graph TD; X-->Y"
//!
//! [[steps]]
//! label = "Start"
//! state = "initial"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use super::map::StateMap;

#[derive(Debug, Error)]
pub enum TutorialError {
    #[error("failed to read tutorial {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse tutorial: {0}")]
    Parse(#[from] toml::de::Error),
}

/// One selectable step in the tutorial
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Step {
    pub label: String,
    /// Steps without a state key are shown but ignore clicks
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Tutorial {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub states: StateMap,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Tutorial {
    /// Parse a tutorial from TOML text
    pub fn from_toml(content: &str) -> Result<Self, TutorialError> {
        Ok(toml::from_str(content)?)
    }

    /// Read and parse a tutorial file, warning about steps that name
    /// unknown states
    pub async fn load(path: &Path) -> Result<Self, TutorialError> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TutorialError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        let tutorial = Self::from_toml(&content)?;

        for step in &tutorial.steps {
            if let Some(state) = &step.state {
                if !tutorial.states.contains(state) {
                    log::warn!(
                        "Step {:?} in {:?} refers to unknown state {:?}",
                        step.label,
                        path,
                        state
                    );
                }
            }
        }

        Ok(tutorial)
    }
}
