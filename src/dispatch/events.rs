//! Page event loop.
//!
//! Events are handled one at a time in the order the host sends them. The
//! synchronous part of each (step lookup, highlighting, ticket, placeholder)
//! runs inline; the renderer call is spawned so renders overlap.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use super::dispatcher::{Dispatcher, RenderOutcome};
use crate::host::Host;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent<N> {
    /// The page finished loading
    Ready,
    /// A click landed on `N`
    Click(N),
}

impl<H: Host + 'static> Dispatcher<H> {
    /// Handle page events until the sender is dropped, then wait for every
    /// render still in flight. Outcomes are returned in completion order.
    pub async fn run(
        self: Arc<Self>,
        mut events: mpsc::UnboundedReceiver<PageEvent<H::Node>>,
    ) -> Vec<RenderOutcome> {
        let mut outcomes = Vec::new();
        let mut renders = JoinSet::new();

        while let Some(event) = events.recv().await {
            let key = match &event {
                PageEvent::Ready => self.ready_key(),
                PageEvent::Click(target) => self.select_step(target),
            };
            let Some(key) = key else {
                continue;
            };

            match self.start(&key) {
                Ok(pending) => {
                    let dispatcher = Arc::clone(&self);
                    renders.spawn(async move { dispatcher.complete(pending).await });
                }
                Err(outcome) => outcomes.push(outcome),
            }
        }

        while let Some(result) = renders.join_next().await {
            match result {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => log::error!("Render task failed: {}", e),
            }
        }

        outcomes
    }
}
