//! Configuration management for the diagram stepper.
//!
//! Handles:
//! - Command-line argument parsing
//! - Project (`.stepper.toml`) and user config files
//! - Renderer and page options

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::dispatch::DispatchOptions;
use crate::render::{RenderOptions, SecurityLevel, Theme};

/// Name of the project config file looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".stepper.toml";

/// Command-line arguments for the diagram stepper
#[derive(Debug, Parser)]
#[command(name = "stepper")]
#[command(about = "Render the diagrams of a step-by-step tutorial")]
#[command(version)]
pub struct Args {
    /// Tutorial file holding the states and steps
    pub tutorial: PathBuf,

    /// Click the step at this position (0-based), may be repeated
    #[arg(long = "click", value_name = "INDEX")]
    pub clicks: Vec<usize>,

    #[arg(long, value_enum, help = "Diagram theme")]
    pub theme: Option<Theme>,

    #[arg(long, value_enum, help = "Renderer security level")]
    pub security_level: Option<SecurityLevel>,

    #[arg(long, help = "Path to the mermaid CLI (mmdc)")]
    pub mmdc: Option<PathBuf>,

    #[arg(long, help = "Directory for renderer scratch files")]
    pub work_dir: Option<PathBuf>,

    #[arg(long, help = "Id of the element receiving diagrams")]
    pub container_id: Option<String>,

    /// Print the whole page instead of the container contents
    #[arg(long)]
    pub page: bool,

    /// Log level for the stepper
    #[arg(
        long,
        default_value = "info",
        help = "Log level (trace, debug, info, warn, error)"
    )]
    pub log_level: String,
}

/// Contents of a `.stepper.toml` or user config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub renderer: RendererSection,
    pub page: PageSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RendererSection {
    pub theme: Option<Theme>,
    pub security_level: Option<SecurityLevel>,
    pub mmdc: Option<PathBuf>,
    pub work_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PageSection {
    pub container_id: Option<String>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))
    }

    /// Fill every unset value from `fallback`
    fn or(self, fallback: ConfigFile) -> ConfigFile {
        ConfigFile {
            renderer: RendererSection {
                theme: self.renderer.theme.or(fallback.renderer.theme),
                security_level: self
                    .renderer
                    .security_level
                    .or(fallback.renderer.security_level),
                mmdc: self.renderer.mmdc.or(fallback.renderer.mmdc),
                work_dir: self.renderer.work_dir.or(fallback.renderer.work_dir),
            },
            page: PageSection {
                container_id: self.page.container_id.or(fallback.page.container_id),
            },
        }
    }
}

/// Combined configuration from all sources
#[derive(Debug, Clone)]
pub struct Config {
    pub tutorial: PathBuf,
    pub clicks: Vec<usize>,
    pub render: RenderOptions,
    pub dispatch: DispatchOptions,
    /// Mermaid CLI executable
    pub mmdc: PathBuf,
    pub work_dir: PathBuf,
    pub print_page: bool,
    pub log_level: String,
    /// Project config that was found, if any
    pub project_config_path: Option<PathBuf>,
}

impl Config {
    /// Create configuration from command-line arguments and config files
    pub fn from_args_and_env() -> Result<Self> {
        let args = Args::parse();
        let project = Path::new(PROJECT_CONFIG_FILE);
        let project = project.exists().then(|| project.to_path_buf());
        Self::from_args(args, project.as_deref(), user_config_path().as_deref())
    }

    /// Create configuration from explicit arguments and config file paths
    /// (useful for testing). Missing files are skipped.
    pub fn from_args(
        args: Args,
        project_config: Option<&Path>,
        user_config: Option<&Path>,
    ) -> Result<Self> {
        let project_file = match project_config {
            Some(path) if path.exists() => Some(ConfigFile::load(path)?),
            _ => None,
        };
        let user_file = match user_config {
            Some(path) if path.exists() => Some(ConfigFile::load(path)?),
            _ => None,
        };

        let project_config_path = project_file
            .as_ref()
            .and(project_config)
            .map(Path::to_path_buf);
        if let Some(path) = &project_config_path {
            log::debug!("Using project config {:?}", path);
        }

        let cli = ConfigFile {
            renderer: RendererSection {
                theme: args.theme,
                security_level: args.security_level,
                mmdc: args.mmdc,
                work_dir: args.work_dir,
            },
            page: PageSection {
                container_id: args.container_id,
            },
        };
        let merged = cli
            .or(project_file.unwrap_or_default())
            .or(user_file.unwrap_or_default());

        let defaults = RenderOptions::default();
        let render = RenderOptions {
            theme: merged.renderer.theme.unwrap_or(defaults.theme),
            security_level: merged
                .renderer
                .security_level
                .unwrap_or(defaults.security_level),
            start_on_load: false,
        };

        let mut dispatch = DispatchOptions::default();
        if let Some(container_id) = merged.page.container_id {
            dispatch.container_id = container_id;
        }

        Ok(Config {
            tutorial: args.tutorial,
            clicks: args.clicks,
            render,
            dispatch,
            mmdc: merged.renderer.mmdc.unwrap_or_else(|| PathBuf::from("mmdc")),
            work_dir: merged
                .renderer
                .work_dir
                .unwrap_or_else(|| std::env::temp_dir().join("diagram-stepper")),
            print_page: args.page,
            log_level: args.log_level,
            project_config_path,
        })
    }

    /// Whether a project config file was found and read
    pub fn has_project_config(&self) -> bool {
        self.project_config_path.is_some()
    }
}

/// `<config dir>/diagram-stepper/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("diagram-stepper").join("config.toml"))
}
