//! In-memory Document
//!
//! A small headless page model: an arena of element, text and raw-markup
//! nodes that implements [`Host`] and serializes back to HTML.

use parking_lot::RwLock;

use super::{Content, Host, ACTIVE_MARKER, STATE_ATTRIBUTE, STEP_MARKER};
use crate::state::Tutorial;

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Element(Element),
    Text(String),
    /// Markup inserted verbatim when serializing
    Raw(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    data: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.node(id)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(id.0)?.kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        if let Some(parent) = self.nodes.get_mut(parent.0) {
            parent.children.push(id);
        }
        id
    }

    /// Detach all children of `id`. Detached nodes stay in the arena but are
    /// no longer reachable from the root.
    fn clear_children(&mut self, id: NodeId) {
        let Some(node) = self.nodes.get_mut(id.0) else {
            return;
        };
        let children = std::mem::take(&mut node.children);
        for child in children {
            if let Some(child) = self.nodes.get_mut(child.0) {
                child.parent = None;
            }
        }
    }

    /// Attached nodes in document order, starting at the root
    fn attached(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![NodeId(0)];
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    fn find(&self, predicate: impl Fn(&Element) -> bool) -> Vec<NodeId> {
        self.attached()
            .into_iter()
            .filter(|id| self.element(*id).is_some_and(&predicate))
            .collect()
    }

    fn write_html(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(&htmlize::escape_text(text.as_str())),
            NodeKind::Raw(markup) => out.push_str(markup),
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag);
                if let Some(element_id) = &element.id {
                    write_attribute(out, "id", element_id);
                }
                if !element.classes.is_empty() {
                    write_attribute(out, "class", &element.classes.join(" "));
                }
                for (name, value) in &element.data {
                    write_attribute(out, &format!("data-{name}"), value);
                }
                out.push('>');
                for child in &node.children {
                    self.write_html(*child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag);
                out.push('>');
            }
        }
    }

    fn write_text(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };
        match &node.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Raw(_) => {}
            NodeKind::Element(_) => {
                for child in &node.children {
                    self.write_text(*child, out);
                }
            }
        }
    }
}

fn write_attribute(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&htmlize::escape_attribute(value));
    out.push('"');
}

#[derive(Debug)]
pub struct Document {
    tree: RwLock<Tree>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// An empty document whose root is a `body` element
    pub fn new() -> Self {
        let root = Node {
            kind: NodeKind::Element(Element {
                tag: "body".to_string(),
                id: None,
                classes: Vec::new(),
                data: Vec::new(),
            }),
            parent: None,
            children: Vec::new(),
        };
        Self {
            tree: RwLock::new(Tree { nodes: vec![root] }),
        }
    }

    /// Build the page for a tutorial: a title, the list of steps and the
    /// diagram container.
    pub fn from_tutorial(tutorial: &Tutorial, container_id: &str) -> Self {
        let document = Self::new();
        let root = document.root();

        if let Some(title) = &tutorial.title {
            let heading = document.append_element(root, "h1");
            document.append_text(heading, title);
        }

        let list = document.append_element(root, "ol");
        document.add_class(list, "steps");
        for step in &tutorial.steps {
            let item = document.append_element(list, "li");
            document.add_class(item, STEP_MARKER);
            if let Some(state) = &step.state {
                document.set_data(item, STATE_ATTRIBUTE, state);
            }
            let label = document.append_element(item, "span");
            document.append_text(label, &step.label);
        }

        let container = document.append_element(root, "div");
        document.set_id(container, container_id);

        document
    }

    /// The `body` element
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Append an empty element under `parent`
    pub fn append_element(&self, parent: NodeId, tag: &str) -> NodeId {
        self.tree.write().push(
            parent,
            NodeKind::Element(Element {
                tag: tag.to_string(),
                id: None,
                classes: Vec::new(),
                data: Vec::new(),
            }),
        )
    }

    /// Append a text node under `parent`
    pub fn append_text(&self, parent: NodeId, text: &str) -> NodeId {
        self.tree
            .write()
            .push(parent, NodeKind::Text(text.to_string()))
    }

    /// Set the element's `id` attribute
    pub fn set_id(&self, node: NodeId, id: &str) {
        if let Some(element) = self.tree.write().element_mut(node) {
            element.id = Some(id.to_string());
        }
    }

    /// Add `class` unless the element already has it
    pub fn add_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.tree.write().element_mut(node) {
            if !element.classes.iter().any(|c| c == class) {
                element.classes.push(class.to_string());
            }
        }
    }

    /// Remove `class` from the element
    pub fn remove_class(&self, node: NodeId, class: &str) {
        if let Some(element) = self.tree.write().element_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }

    /// Whether `node` carries `class`
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.tree
            .read()
            .element(node)
            .is_some_and(|element| element.classes.iter().any(|c| c == class))
    }

    /// Set `data-<name>` on an element
    pub fn set_data(&self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.tree.write().element_mut(node) {
            match element.data.iter_mut().find(|(key, _)| key == name) {
                Some(entry) => entry.1 = value.to_string(),
                None => element.data.push((name.to_string(), value.to_string())),
            }
        }
    }

    /// Value of `data-<name>` on an element
    pub fn data(&self, node: NodeId, name: &str) -> Option<String> {
        let tree = self.tree.read();
        let element = tree.element(node)?;
        element
            .data
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    /// Child nodes in order
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree
            .read()
            .node(node)
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// First attached element with the given id
    pub fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.tree
            .read()
            .find(|element| element.id.as_deref() == Some(id))
            .into_iter()
            .next()
    }

    /// Attached elements carrying `class`, in document order
    pub fn elements_with_class(&self, class: &str) -> Vec<NodeId> {
        self.tree
            .read()
            .find(|element| element.classes.iter().any(|c| c == class))
    }

    /// Step elements in document order
    pub fn steps(&self) -> Vec<NodeId> {
        self.elements_with_class(STEP_MARKER)
    }

    /// The step currently carrying the active marker, if exactly one does
    pub fn active_step(&self) -> Option<NodeId> {
        let active: Vec<NodeId> = self
            .steps()
            .into_iter()
            .filter(|step| self.has_class(*step, ACTIVE_MARKER))
            .collect();
        match active.as_slice() {
            [step] => Some(*step),
            _ => None,
        }
    }

    /// Serialized children of `node`
    pub fn inner_html(&self, node: NodeId) -> String {
        let tree = self.tree.read();
        let mut out = String::new();
        if let Some(n) = tree.node(node) {
            for child in &n.children {
                tree.write_html(*child, &mut out);
            }
        }
        out
    }

    /// Concatenated text below `node`, markup excluded
    pub fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.tree.read().write_text(node, &mut out);
        out
    }

    /// Inner HTML of the element with the given id
    pub fn html_of(&self, id: &str) -> Option<String> {
        self.element_by_id(id).map(|node| self.inner_html(node))
    }

    /// The whole page, root element included
    pub fn to_html(&self) -> String {
        let tree = self.tree.read();
        let mut out = String::new();
        tree.write_html(NodeId(0), &mut out);
        out
    }
}

impl Host for Document {
    type Node = NodeId;

    fn closest(&self, target: &NodeId, marker: &str) -> Option<NodeId> {
        let tree = self.tree.read();
        let mut current = Some(*target);
        while let Some(id) = current {
            if tree
                .element(id)
                .is_some_and(|element| element.classes.iter().any(|c| c == marker))
            {
                return Some(id);
            }
            current = tree.node(id)?.parent;
        }
        None
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.data(*node, name)
    }

    fn marked(&self, marker: &str) -> Vec<NodeId> {
        self.elements_with_class(marker)
    }

    fn add_marker(&self, node: &NodeId, marker: &str) {
        self.add_class(*node, marker);
    }

    fn remove_marker(&self, node: &NodeId, marker: &str) {
        self.remove_class(*node, marker);
    }

    fn has_container(&self, id: &str) -> bool {
        self.element_by_id(id).is_some()
    }

    fn replace_container(&self, id: &str, content: Content) -> bool {
        let Some(container) = self.element_by_id(id) else {
            return false;
        };

        let mut tree = self.tree.write();
        tree.clear_children(container);
        match content {
            Content::Placeholder { id, source } => {
                let placeholder = tree.push(
                    container,
                    NodeKind::Element(Element {
                        tag: "div".to_string(),
                        id: Some(id.to_string()),
                        classes: vec!["mermaid".to_string()],
                        data: Vec::new(),
                    }),
                );
                tree.push(placeholder, NodeKind::Text(source));
            }
            Content::Markup(markup) => {
                tree.push(container, NodeKind::Raw(markup));
            }
            Content::Error(message) => {
                let paragraph = tree.push(
                    container,
                    NodeKind::Element(Element {
                        tag: "p".to_string(),
                        id: None,
                        classes: vec!["render-error".to_string()],
                        data: Vec::new(),
                    }),
                );
                tree.push(paragraph, NodeKind::Text(message));
            }
        }
        true
    }
}
