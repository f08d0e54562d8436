//! State Dispatcher
//!
//! Maps a state key to its diagram source, asks the renderer for markup and
//! writes the result (or an error) into the container.
//!
//! Renders are not cancelled when a newer one starts. Instead every render
//! takes a ticket from a monotonically increasing counter, and a write to the
//! container only lands while its ticket is still the latest one issued. A
//! slow render that finishes after a newer request is dropped, so the
//! container always ends up showing the most recently requested state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::host::{
    Content, Host, HostLocator, StepLocator, ACTIVE_MARKER, CONTAINER_ID, STATE_ATTRIBUTE,
    STEP_MARKER,
};
use crate::render::{RenderId, RenderOptions, RenderService};
use crate::state::StateMap;

/// Names the dispatcher looks for on the host page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchOptions {
    pub container_id: String,
    pub step_marker: String,
    pub active_marker: String,
    pub state_attribute: String,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        Self {
            container_id: CONTAINER_ID.to_string(),
            step_marker: STEP_MARKER.to_string(),
            active_marker: ACTIVE_MARKER.to_string(),
            state_attribute: STATE_ATTRIBUTE.to_string(),
        }
    }
}

/// How a single render request ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Container holds the renderer's markup
    Rendered,
    /// Container holds an error embedding the renderer's failure
    Failed(String),
    /// Key missing from the state map; container holds an error naming it
    UnknownState,
    /// Page has no container; nothing was written
    NoContainer,
    /// A newer render was requested before this one completed
    Superseded,
}

/// A render that has claimed its ticket and is waiting on the renderer
#[derive(Debug)]
pub(crate) struct PendingRender {
    ticket: u64,
    id: RenderId,
    key: String,
    source: String,
}

enum Write {
    Applied,
    Stale,
    NoContainer,
}

pub struct Dispatcher<H: Host> {
    states: StateMap,
    host: Arc<H>,
    renderer: Arc<dyn RenderService>,
    locator: Arc<dyn StepLocator<H::Node>>,
    options: DispatchOptions,
    /// Ticket of the most recently issued render
    latest: Mutex<u64>,
    selected: Mutex<Option<String>>,
}

/// Initialize the renderer and return a dispatcher for `host` with default
/// page names. The host forwards its page-ready and click events to the
/// returned handle.
pub async fn initialize_app<H>(
    states: StateMap,
    host: Arc<H>,
    renderer: Arc<dyn RenderService>,
    render_options: &RenderOptions,
) -> Arc<Dispatcher<H>>
where
    H: Host + 'static,
{
    Dispatcher::new(states, host, renderer)
        .initialize(render_options)
        .await
}

impl<H: Host + 'static> Dispatcher<H> {
    /// Dispatcher with default page names, locating steps through `host`
    pub fn new(states: StateMap, host: Arc<H>, renderer: Arc<dyn RenderService>) -> Self {
        let locator = Arc::new(HostLocator(Arc::clone(&host)));
        Self {
            states,
            host,
            renderer,
            locator,
            options: DispatchOptions::default(),
            latest: Mutex::new(0),
            selected: Mutex::new(None),
        }
    }

    /// Use different container, marker and attribute names
    pub fn with_options(mut self, options: DispatchOptions) -> Self {
        self.options = options;
        self
    }

    /// Replace the host tree walk used to find the clicked step
    pub fn with_locator(mut self, locator: impl StepLocator<H::Node> + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    /// Configure the renderer once. A failure is logged and left for each
    /// render to surface.
    pub async fn initialize(self, render_options: &RenderOptions) -> Arc<Self> {
        match self.renderer.initialize(render_options).await {
            Ok(()) => log::debug!("Renderer initialized with {:?}", render_options),
            Err(e) => log::error!("Failed to initialize renderer: {}", e),
        }
        Arc::new(self)
    }

    /// Currently selected state key
    pub fn selected(&self) -> Option<String> {
        self.selected.lock().clone()
    }

    /// Page-ready trigger: render `"initial"`, else the first state. An
    /// empty state map renders nothing.
    pub async fn page_ready(&self) -> Option<RenderOutcome> {
        let key = self.ready_key()?;
        Some(self.render(&key).await)
    }

    /// Click trigger. Clicks outside a step, or on a step without a state
    /// key, are ignored and return `None`.
    pub async fn click(&self, target: &H::Node) -> Option<RenderOutcome> {
        let key = self.select_step(target)?;
        Some(self.render(&key).await)
    }

    /// Render `key` into the container and wait for the result to land
    pub async fn render(&self, key: &str) -> RenderOutcome {
        match self.start(key) {
            Ok(pending) => self.complete(pending).await,
            Err(outcome) => outcome,
        }
    }

    pub(crate) fn ready_key(&self) -> Option<String> {
        let key = self.states.initial_key()?.to_string();
        log::debug!("Page ready, selecting {:?}", key);
        *self.selected.lock() = Some(key.clone());
        Some(key)
    }

    /// Locate the clicked step, move the active marker to it and return its
    /// state key.
    pub(crate) fn select_step(&self, target: &H::Node) -> Option<String> {
        let step = self
            .locator
            .closest_step(target, &self.options.step_marker)?;
        let key = self
            .host
            .attribute(&step, &self.options.state_attribute)
            .filter(|key| !key.is_empty())?;

        for node in self.host.marked(&self.options.step_marker) {
            self.host.remove_marker(&node, &self.options.active_marker);
        }
        self.host.add_marker(&step, &self.options.active_marker);

        log::debug!("Step {:?} selected state {:?}", step, key);
        *self.selected.lock() = Some(key.clone());
        Some(key)
    }

    /// Synchronous half of a render: claim a ticket and put either the
    /// placeholder or the unknown-state error into the container.
    pub(crate) fn start(&self, key: &str) -> Result<PendingRender, RenderOutcome> {
        if !self.host.has_container(&self.options.container_id) {
            log::trace!(
                "No #{} on the page, skipping {:?}",
                self.options.container_id,
                key
            );
            return Err(RenderOutcome::NoContainer);
        }

        let ticket = self.next_ticket();

        let Some(source) = self.states.source(key) else {
            let message = format!("Error: state \"{key}\" not found");
            return Err(match self.write(ticket, Content::Error(message)) {
                Write::Applied => RenderOutcome::UnknownState,
                Write::Stale => RenderOutcome::Superseded,
                Write::NoContainer => RenderOutcome::NoContainer,
            });
        };

        let pending = PendingRender {
            ticket,
            id: RenderId::generate(),
            key: key.to_string(),
            source: source.to_string(),
        };
        let placeholder = Content::Placeholder {
            id: pending.id.clone(),
            source: pending.source.clone(),
        };
        match self.write(ticket, placeholder) {
            Write::Applied => Ok(pending),
            Write::Stale => Err(RenderOutcome::Superseded),
            Write::NoContainer => Err(RenderOutcome::NoContainer),
        }
    }

    /// Asynchronous half of a render: wait for the renderer and write its
    /// result if no newer render was requested meanwhile.
    pub(crate) async fn complete(&self, pending: PendingRender) -> RenderOutcome {
        let PendingRender {
            ticket,
            id,
            key,
            source,
        } = pending;

        let (content, outcome) = match self.renderer.render(&id, &source).await {
            Ok(markup) => (Content::Markup(markup), RenderOutcome::Rendered),
            Err(e) => {
                log::error!("Failed to render state {:?} ({}): {}", key, id, e);
                let failure = e.to_string();
                (
                    Content::Error(format!("Error rendering diagram: {failure}")),
                    RenderOutcome::Failed(failure),
                )
            }
        };

        match self.write(ticket, content) {
            Write::Applied => outcome,
            Write::Stale => {
                log::debug!("Discarding stale render of {:?} ({})", key, id);
                RenderOutcome::Superseded
            }
            Write::NoContainer => RenderOutcome::NoContainer,
        }
    }

    fn next_ticket(&self) -> u64 {
        let mut latest = self.latest.lock();
        *latest += 1;
        *latest
    }

    fn write(&self, ticket: u64, content: Content) -> Write {
        let latest = self.latest.lock();
        if *latest != ticket {
            return Write::Stale;
        }
        if self
            .host
            .replace_container(&self.options.container_id, content)
        {
            Write::Applied
        } else {
            Write::NoContainer
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::Document;
    use crate::render::RenderError;

    /// Wraps the source in an svg element
    struct EchoRenderer;

    #[async_trait::async_trait]
    impl RenderService for EchoRenderer {
        async fn initialize(&self, _: &RenderOptions) -> Result<(), RenderError> {
            Ok(())
        }

        async fn render(&self, _: &RenderId, source: &str) -> Result<String, RenderError> {
            Ok(format!("<svg>{source}</svg>"))
        }
    }

    fn page() -> Arc<Document> {
        let document = Document::new();
        let container = document.append_element(document.root(), "div");
        document.set_id(container, CONTAINER_ID);
        Arc::new(document)
    }

    fn states() -> StateMap {
        [("initial", "graph TD; A-->B"), ("other", "graph TD; X-->Y")]
            .into_iter()
            .collect()
    }

    #[tokio::test]
    async fn test_render_known_state() {
        let document = page();
        let dispatcher = Dispatcher::new(states(), document.clone(), Arc::new(EchoRenderer));

        assert_eq!(dispatcher.render("other").await, RenderOutcome::Rendered);
        assert_eq!(
            document.html_of(CONTAINER_ID).as_deref(),
            Some("<svg>graph TD; X-->Y</svg>")
        );
    }

    #[tokio::test]
    async fn test_unknown_state_writes_error() {
        let document = page();
        let dispatcher = Dispatcher::new(states(), document.clone(), Arc::new(EchoRenderer));

        assert_eq!(dispatcher.render("missing").await, RenderOutcome::UnknownState);
        let html = document.html_of(CONTAINER_ID).unwrap();
        assert!(html.contains("missing"));
        assert!(html.starts_with("<p class=\"render-error\">"));
    }

    #[tokio::test]
    async fn test_missing_container_is_noop() {
        let document = Arc::new(Document::new());
        let dispatcher = Dispatcher::new(states(), document.clone(), Arc::new(EchoRenderer));

        assert_eq!(dispatcher.render("initial").await, RenderOutcome::NoContainer);
        assert_eq!(document.to_html(), "<body></body>");
    }

    #[tokio::test]
    async fn test_stale_ticket_is_not_written() {
        let document = page();
        let dispatcher = Dispatcher::new(states(), document.clone(), Arc::new(EchoRenderer));

        let first = dispatcher.start("initial").expect("start first render");
        let second = dispatcher.start("other").expect("start second render");

        assert_eq!(dispatcher.complete(second).await, RenderOutcome::Rendered);
        assert_eq!(dispatcher.complete(first).await, RenderOutcome::Superseded);
        assert_eq!(
            document.html_of(CONTAINER_ID).as_deref(),
            Some("<svg>graph TD; X-->Y</svg>")
        );
    }

    #[tokio::test]
    async fn test_page_ready_sets_selection() {
        let document = page();
        let dispatcher = Dispatcher::new(states(), document, Arc::new(EchoRenderer));

        assert_eq!(dispatcher.selected(), None);
        assert_eq!(dispatcher.page_ready().await, Some(RenderOutcome::Rendered));
        assert_eq!(dispatcher.selected().as_deref(), Some("initial"));
    }
}
