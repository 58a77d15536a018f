#![forbid(unsafe_code)]

//! Browser backend for `wshim-core`.
//!
//! The embedded module runs inside a frame; its option panel lives in the
//! embedding page. [`WebHost`] probes `window.parent.document`, installs the
//! `"<Kind>Update"` functions on that window, and [`launch`] drives the core
//! orchestrator from `setTimeout` instead of blocking the event loop.
//!
//! Host-frame selection and poll scheduling are platform independent and
//! test natively; everything touching `web-sys` is `wasm32`-only.

mod schedule;
mod target;

pub use schedule::next_delay_ms;
pub use target::HostTarget;

#[cfg(target_arch = "wasm32")]
mod convert;
#[cfg(target_arch = "wasm32")]
mod document;
#[cfg(target_arch = "wasm32")]
mod driver;
#[cfg(target_arch = "wasm32")]
mod host;

#[cfg(target_arch = "wasm32")]
pub use document::WebDocument;
#[cfg(target_arch = "wasm32")]
pub use driver::{launch, launch_with};
#[cfg(target_arch = "wasm32")]
pub use host::WebHost;
