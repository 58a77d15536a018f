#![forbid(unsafe_code)]

use js_sys::Reflect;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::Closure;
use web_sys::Window;
use wshim_core::{Host, HostHandler};

use crate::HostTarget;
use crate::convert::to_host;
use crate::document::WebDocument;

/// Browser host: probes the target window's document and installs global
/// update functions on that same window.
#[derive(Debug, Default)]
pub struct WebHost {
    target: HostTarget,
    window: Option<Window>,
}

impl WebHost {
    #[must_use]
    pub fn new(target: HostTarget) -> Self {
        Self {
            target,
            window: None,
        }
    }

    #[must_use]
    pub const fn target(&self) -> HostTarget {
        self.target
    }

    fn target_window(&self) -> Option<Window> {
        let own = web_sys::window()?;
        match self.target {
            HostTarget::Window => Some(own),
            HostTarget::Parent => own.parent().ok().flatten(),
        }
    }
}

impl Host for WebHost {
    type Document = WebDocument;

    fn probe_document(&mut self) -> Option<WebDocument> {
        let window = self.target_window()?;
        let document = window.document()?;
        self.window = Some(window);
        Some(WebDocument::new(document))
    }

    fn install_handler(&mut self, name: &str, handler: HostHandler) {
        let Some(window) = self.window.as_ref() else {
            tracing::warn!(handler = name, "no host window; handler not installed");
            return;
        };
        let closure = Closure::wrap(Box::new(move |id: JsValue, value: JsValue| {
            handler(&[to_host(&id), to_host(&value)]);
        }) as Box<dyn Fn(JsValue, JsValue)>);
        match Reflect::set(window, &JsValue::from_str(name), closure.as_ref()) {
            Ok(_) => {
                tracing::debug!(handler = name, target = self.target.as_str(), "handler installed");
                // Host markup calls it for the rest of the page's lifetime.
                closure.forget();
            }
            Err(err) => tracing::warn!(handler = name, error = ?err, "handler install failed"),
        }
    }
}
