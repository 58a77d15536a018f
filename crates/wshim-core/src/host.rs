#![forbid(unsafe_code)]

//! Host capability seam.
//!
//! The core never owns a document. Everything it needs from the embedding
//! page goes through two traits:
//!
//! - [`HostDocument`]: element creation, attributes, children, lookups, and
//!   direct property writes.
//! - [`Host`]: the environment around the document. It answers whether the
//!   document is ready yet and makes kind-level update handlers globally
//!   addressable by name.
//!
//! Values crossing the seam in either direction are [`HostValue`]s.

use std::fmt;
use std::rc::Rc;

/// Dynamically typed payload delivered by, or written to, the host.
#[derive(Debug, Clone, PartialEq)]
pub enum HostValue {
    Bool(bool),
    Number(f64),
    Text(String),
    Null,
}

impl HostValue {
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integer view of a number. Non-integral, non-finite, or out-of-range
    /// numbers yield `None`.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        let n = self.as_f64()?;
        if !n.is_finite() || n.fract() != 0.0 {
            return None;
        }
        if n < i64::MIN as f64 || n >= i64::MAX as f64 {
            return None;
        }
        Some(n as i64)
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Short type name used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Text(_) => "text",
            Self::Null => "null",
        }
    }
}

impl fmt::Display for HostValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Null => f.write_str("null"),
        }
    }
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i64> for HostValue {
    fn from(value: i64) -> Self {
        Self::Number(value as f64)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Kind-level update handler made globally addressable by the host.
///
/// The host calls it with the raw arguments of the markup-level event
/// wiring, conventionally `(identifier, newValue)`.
pub type HostHandler = Rc<dyn Fn(&[HostValue])>;

/// Document primitives consumed by control construction and update sync.
///
/// Implementations are handles: cloning must yield another handle to the same
/// document.
pub trait HostDocument: Clone + 'static {
    type Node: Clone + 'static;

    fn create_element(&self, tag: &str) -> Self::Node;
    fn create_text_node(&self, text: &str) -> Self::Node;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    fn get_element_by_id(&self, id: &str) -> Option<Self::Node>;
    /// Write a live property (e.g. `value`) rather than a markup attribute.
    fn set_property(&self, node: &Self::Node, name: &str, value: &HostValue);
}

/// The injected environment hosting the document.
pub trait Host {
    type Document: HostDocument;

    /// Availability probe. `None` while the host document is not ready.
    fn probe_document(&mut self) -> Option<Self::Document>;

    /// Install `handler` under the global `name` (e.g. `"ToggleUpdate"`).
    fn install_handler(&mut self, name: &str, handler: HostHandler);
}
