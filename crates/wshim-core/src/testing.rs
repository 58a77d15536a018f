#![forbid(unsafe_code)]

//! In-memory host for tests and native embedders.
//!
//! [`MemoryDocument`] is a small element arena with tags, attributes, live
//! properties, and children. Like a browser, `get_element_by_id` only finds
//! elements connected to the document root. [`MemoryHost`] wraps it with a
//! configurable readiness delay and a table of installed global handlers.
//! [`ManualClock`] advances time only when the runtime sleeps.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::host::{Host, HostDocument, HostHandler, HostValue};
use crate::runtime::Clock;

/// Handle to a node in a [`MemoryDocument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Default)]
struct MemoryNode {
    tag: String,
    text: Option<String>,
    attributes: Vec<(String, String)>,
    properties: HashMap<String, HostValue>,
    children: Vec<NodeId>,
    parent: Option<NodeId>,
}

#[derive(Debug)]
struct Arena {
    nodes: Vec<MemoryNode>,
}

/// Shared handle to an in-memory document. Node 0 is the `body` root.
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    arena: Rc<RefCell<Arena>>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        let root = MemoryNode {
            tag: "body".to_owned(),
            ..MemoryNode::default()
        };
        Self {
            arena: Rc::new(RefCell::new(Arena { nodes: vec![root] })),
        }
    }

    /// Document with a connected `<div id=panel_id>`.
    #[must_use]
    pub fn with_panel(panel_id: &str) -> Self {
        let doc = Self::new();
        let panel = doc.create_element("div");
        doc.set_attribute(&panel, "id", panel_id);
        doc.append_child(&doc.root(), &panel);
        doc
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.arena.borrow().nodes.len()
    }

    #[must_use]
    pub fn tag(&self, node: NodeId) -> String {
        self.arena.borrow().nodes[node.0].tag.clone()
    }

    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.arena.borrow().nodes[node.0]
            .attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.clone())
    }

    #[must_use]
    pub fn property(&self, node: NodeId, name: &str) -> Option<HostValue> {
        self.arena.borrow().nodes[node.0].properties.get(name).cloned()
    }

    #[must_use]
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.arena.borrow().nodes[node.0].children.clone()
    }

    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.arena.borrow().nodes[node.0].parent
    }

    /// Concatenated text of `node` and its descendants.
    #[must_use]
    pub fn text_content(&self, node: NodeId) -> String {
        let arena = self.arena.borrow();
        let mut out = String::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            let current = &arena.nodes[id.0];
            if let Some(text) = &current.text {
                out.push_str(text);
            }
            stack.extend(current.children.iter().rev().copied());
        }
        out
    }

    fn alloc(&self, node: MemoryNode) -> NodeId {
        let mut arena = self.arena.borrow_mut();
        arena.nodes.push(node);
        NodeId(arena.nodes.len() - 1)
    }
}

impl HostDocument for MemoryDocument {
    type Node = NodeId;

    fn create_element(&self, tag: &str) -> NodeId {
        self.alloc(MemoryNode {
            tag: tag.to_owned(),
            ..MemoryNode::default()
        })
    }

    fn create_text_node(&self, text: &str) -> NodeId {
        self.alloc(MemoryNode {
            tag: "#text".to_owned(),
            text: Some(text.to_owned()),
            ..MemoryNode::default()
        })
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let mut arena = self.arena.borrow_mut();
        let attributes = &mut arena.nodes[node.0].attributes;
        match attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value.to_owned(),
            None => attributes.push((name.to_owned(), value.to_owned())),
        }
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        let mut arena = self.arena.borrow_mut();
        if let Some(old_parent) = arena.nodes[child.0].parent.take() {
            arena.nodes[old_parent.0].children.retain(|c| c != child);
        }
        arena.nodes[parent.0].children.push(*child);
        arena.nodes[child.0].parent = Some(*parent);
    }

    fn get_element_by_id(&self, id: &str) -> Option<NodeId> {
        let arena = self.arena.borrow();
        let mut stack = vec![NodeId(0)];
        while let Some(node) = stack.pop() {
            let current = &arena.nodes[node.0];
            if current.attributes.iter().any(|(k, v)| k == "id" && v == id) {
                return Some(node);
            }
            stack.extend(current.children.iter().rev().copied());
        }
        None
    }

    fn set_property(&self, node: &NodeId, name: &str, value: &HostValue) {
        self.arena.borrow_mut().nodes[node.0]
            .properties
            .insert(name.to_owned(), value.clone());
    }
}

#[derive(Default)]
struct HostState {
    /// Probes that return `None` before the document appears; `None` = never.
    pending_probes: Option<u32>,
    probes: u32,
    handlers: HashMap<String, HostHandler>,
    installs: HashMap<String, u32>,
}

/// Shared handle to an in-memory host environment.
#[derive(Clone)]
pub struct MemoryHost {
    document: MemoryDocument,
    state: Rc<RefCell<HostState>>,
}

impl std::fmt::Debug for MemoryHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("MemoryHost")
            .field("probes", &state.probes)
            .field("installs", &state.installs)
            .finish_non_exhaustive()
    }
}

impl MemoryHost {
    /// Host whose document is available on the first probe.
    #[must_use]
    pub fn ready(document: MemoryDocument) -> Self {
        Self::ready_after(document, 0)
    }

    /// Host whose document appears after `failed_probes` unsuccessful probes.
    #[must_use]
    pub fn ready_after(document: MemoryDocument, failed_probes: u32) -> Self {
        Self {
            document,
            state: Rc::new(RefCell::new(HostState {
                pending_probes: Some(failed_probes),
                ..HostState::default()
            })),
        }
    }

    /// Host whose document never becomes available.
    #[must_use]
    pub fn never_ready() -> Self {
        Self {
            document: MemoryDocument::new(),
            state: Rc::new(RefCell::new(HostState::default())),
        }
    }

    #[must_use]
    pub fn document(&self) -> &MemoryDocument {
        &self.document
    }

    #[must_use]
    pub fn probe_count(&self) -> u32 {
        self.state.borrow().probes
    }

    /// How many times a handler was installed under `name`.
    #[must_use]
    pub fn install_count(&self, name: &str) -> u32 {
        self.state.borrow().installs.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn handler_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.state.borrow().handlers.keys().cloned().collect();
        names.sort();
        names
    }

    /// Invoke the global handler `name` the way host markup would.
    ///
    /// Returns `false` if no handler is installed under `name`.
    pub fn fire(&self, name: &str, args: &[HostValue]) -> bool {
        let handler = self.state.borrow().handlers.get(name).cloned();
        match handler {
            Some(handler) => {
                handler(args);
                true
            }
            None => false,
        }
    }
}

impl Host for MemoryHost {
    type Document = MemoryDocument;

    fn probe_document(&mut self) -> Option<MemoryDocument> {
        let mut state = self.state.borrow_mut();
        state.probes += 1;
        match state.pending_probes.as_mut() {
            Some(0) => Some(self.document.clone()),
            Some(remaining) => {
                *remaining -= 1;
                None
            }
            None => None,
        }
    }

    fn install_handler(&mut self, name: &str, handler: HostHandler) {
        let mut state = self.state.borrow_mut();
        *state.installs.entry(name.to_owned()).or_insert(0) += 1;
        state.handlers.insert(name.to_owned(), handler);
    }
}

/// Deterministic clock: time moves only through `sleep_ms`.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: Cell<u64>,
    sleeps: Cell<u32>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn sleeps(&self) -> u32 {
        self.sleeps.get()
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn sleep_ms(&self, ms: u64) {
        self.sleeps.set(self.sleeps.get() + 1);
        self.now_ms.set(self.now_ms.get().saturating_add(ms));
    }
}
