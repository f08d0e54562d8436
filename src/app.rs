//! Headless runner: builds a page from a tutorial file, replays page-ready
//! and step clicks through the dispatcher and returns the resulting HTML.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use crate::dispatch::{Dispatcher, PageEvent, RenderOutcome};
use crate::host::Document;
use crate::render::MermaidCli;
use crate::state::Tutorial;
use crate::Config;

/// Start the stepper from command-line arguments and print the result
pub async fn run() -> Result<()> {
    let config = Config::from_args_and_env()?;

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(config.log_level.as_str()),
    )
    .init();

    let html = render_tutorial(&config).await?;
    println!("{html}");

    Ok(())
}

/// Load the tutorial, replay the configured clicks and return either the
/// container contents or the whole page.
pub async fn render_tutorial(config: &Config) -> Result<String> {
    let tutorial = Tutorial::load(&config.tutorial).await?;
    let document = Arc::new(Document::from_tutorial(
        &tutorial,
        &config.dispatch.container_id,
    ));
    let renderer = Arc::new(MermaidCli::new(&config.mmdc, &config.work_dir));

    let dispatcher = Dispatcher::new(tutorial.states.clone(), Arc::clone(&document), renderer)
        .with_options(config.dispatch.clone())
        .initialize(&config.render)
        .await;

    let steps = document.steps();
    let (events, receiver) = mpsc::unbounded_channel();
    events.send(PageEvent::Ready)?;
    for &index in &config.clicks {
        let Some(&step) = steps.get(index) else {
            log::warn!("No step at position {} ({} steps)", index, steps.len());
            continue;
        };
        // Click the label inside the step, like a user would
        let target = document.children(step).first().copied().unwrap_or(step);
        events.send(PageEvent::Click(target))?;
    }
    drop(events);

    for outcome in dispatcher.clone().run(receiver).await {
        match outcome {
            RenderOutcome::Failed(failure) => log::warn!("Render failed: {}", failure),
            other => log::debug!("Render finished: {:?}", other),
        }
    }

    if let Some(selected) = dispatcher.selected() {
        log::info!("Selected state {:?}", selected);
    }

    Ok(if config.print_page {
        document.to_html()
    } else {
        document
            .html_of(&config.dispatch.container_id)
            .unwrap_or_default()
    })
}
