//! Mermaid CLI Renderer
//!
//! Renders diagrams by running `mmdc` once per request. Each render gets its
//! own input and output files named after the render id, so overlapping
//! renders never touch each other's files.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::process::Command;

use super::{RenderError, RenderId, RenderOptions, RenderService};

const CONFIG_FILE_NAME: &str = "mermaid-config.json";

#[derive(Debug)]
pub struct MermaidCli {
    program: PathBuf,
    work_dir: PathBuf,
    /// Set by `initialize`
    setup: Mutex<Option<Setup>>,
}

#[derive(Debug, Clone)]
struct Setup {
    config_path: PathBuf,
    options: RenderOptions,
}

impl MermaidCli {
    /// Renderer running `program`, with scratch files under `work_dir`
    pub fn new(program: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
            setup: Mutex::new(None),
        }
    }
}

#[async_trait::async_trait]
impl RenderService for MermaidCli {
    async fn initialize(&self, options: &RenderOptions) -> Result<(), RenderError> {
        tokio::fs::create_dir_all(&self.work_dir).await?;

        let config_path = self.work_dir.join(CONFIG_FILE_NAME);
        let config = serde_json::to_vec_pretty(options)?;
        tokio::fs::write(&config_path, config).await?;
        log::debug!("Wrote mermaid config to {:?}", config_path);

        *self.setup.lock() = Some(Setup {
            config_path,
            options: options.clone(),
        });
        Ok(())
    }

    async fn render(&self, id: &RenderId, source: &str) -> Result<String, RenderError> {
        let setup = self.setup.lock().clone().ok_or(RenderError::NotInitialized)?;

        let input = self.work_dir.join(format!("{id}.mmd"));
        let output = self.work_dir.join(format!("{id}.svg"));
        tokio::fs::write(&input, source).await?;

        let result = run_mmdc(&self.program, &setup, id, &input, &output).await;

        for path in [&input, &output] {
            if let Err(e) = tokio::fs::remove_file(path).await {
                log::trace!("Could not remove {:?}: {}", path, e);
            }
        }

        result
    }
}

async fn run_mmdc(
    program: &Path,
    setup: &Setup,
    id: &RenderId,
    input: &Path,
    output: &Path,
) -> Result<String, RenderError> {
    log::debug!("Rendering {} with {:?}", id, program);

    let result = Command::new(program)
        .arg("-i")
        .arg(input)
        .arg("-o")
        .arg(output)
        .arg("-c")
        .arg(&setup.config_path)
        .arg("-t")
        .arg(setup.options.theme.as_str())
        .arg("-I")
        .arg(id.as_str())
        .arg("-q")
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| RenderError::Spawn {
            program: program.to_path_buf(),
            source,
        })?;

    if !result.status.success() {
        return Err(RenderError::Failed {
            status: result.status,
            stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
        });
    }

    Ok(tokio::fs::read_to_string(output).await?)
}
