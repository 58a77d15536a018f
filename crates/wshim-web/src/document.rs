#![forbid(unsafe_code)]

use js_sys::Reflect;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, Node};
use wshim_core::{HostDocument, HostValue};

use crate::convert::to_js;

/// [`HostDocument`] over a live `web_sys::Document`.
///
/// Nodes belong to the embedding page's realm, where `instanceof` checks
/// against this module's constructors fail; element casts are unchecked.
#[derive(Debug, Clone)]
pub struct WebDocument {
    document: Document,
}

impl WebDocument {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document }
    }

    #[must_use]
    pub fn inner(&self) -> &Document {
        &self.document
    }
}

fn describe(err: &JsValue) -> String {
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}

impl HostDocument for WebDocument {
    type Node = Node;

    fn create_element(&self, tag: &str) -> Node {
        match self.document.create_element(tag) {
            Ok(element) => element.into(),
            Err(err) => {
                tracing::warn!(tag, error = %describe(&err), "create_element failed");
                self.document.create_document_fragment().into()
            }
        }
    }

    fn create_text_node(&self, text: &str) -> Node {
        self.document.create_text_node(text).into()
    }

    fn set_attribute(&self, node: &Node, name: &str, value: &str) {
        let element: &Element = node.unchecked_ref();
        if let Err(err) = element.set_attribute(name, value) {
            tracing::warn!(name, error = %describe(&err), "set_attribute failed");
        }
    }

    fn append_child(&self, parent: &Node, child: &Node) {
        if let Err(err) = parent.append_child(child) {
            tracing::warn!(error = %describe(&err), "append_child failed");
        }
    }

    fn get_element_by_id(&self, id: &str) -> Option<Node> {
        self.document.get_element_by_id(id).map(Into::into)
    }

    fn set_property(&self, node: &Node, name: &str, value: &HostValue) {
        if let Err(err) = Reflect::set(node, &JsValue::from_str(name), &to_js(value)) {
            tracing::warn!(name, error = %describe(&err), "property write failed");
        }
    }
}
