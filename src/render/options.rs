//! Renderer startup options, serialized as a Mermaid config object.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Default,
    Base,
    Dark,
    Forest,
    Neutral,
}

impl Theme {
    /// Name as Mermaid spells it
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Base => "base",
            Theme::Dark => "dark",
            Theme::Forest => "forest",
            Theme::Neutral => "neutral",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    Strict,
    #[default]
    Loose,
    Antiscript,
    Sandbox,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderOptions {
    pub theme: Theme,
    pub security_level: SecurityLevel,
    /// Always off: the dispatcher decides when to render
    pub start_on_load: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            theme: Theme::Default,
            security_level: SecurityLevel::Loose,
            start_on_load: false,
        }
    }
}
