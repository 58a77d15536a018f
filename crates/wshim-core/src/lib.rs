#![forbid(unsafe_code)]

//! Core: control binding, identifier allocation, and update dispatch.
//!
//! # Role in wshim
//! `wshim-core` lets an embedded program describe a flat panel of option
//! controls (toggles, radio groups, numeric sliders), materializes them into
//! a host document, and keeps the bound values in sync with user input. It
//! never touches a real DOM: the host is injected through the [`host::Host`]
//! and [`host::HostDocument`] traits, which `wshim-web` implements on top of
//! `web-sys`.
//!
//! # Primary responsibilities
//! - **IdAllocator**: collision-free identifiers keyed by kind and label.
//! - **UpdateRegistry**: identifier → setter routing for host events.
//! - **Control**: the build / handle-update contract and its four variants.
//! - **Orchestrator**: readiness polling, panel assembly, degraded mode.
//!
//! # Data flow
//! ```text
//! Runtime::start
//!   → Orchestrator::tick          // AwaitingHost → AwaitingPanel → Building
//!   → Control::build              // registers a setter, returns nodes
//!   → Host::install_handler       // once per control kind
//!   → entry()                     // embedding program starts
//! host event "<Kind>Update(id, value)"
//!   → Control::handle_update      // decode, resolve id, resync siblings
//!   → UpdateRegistry::dispatch    // on_change(old, new), then write
//! ```

pub mod binding;
pub mod config;
pub mod context;
pub mod control;
pub mod diagnostics;
pub mod host;
pub mod ids;
pub mod registry;
pub mod runtime;

#[cfg(any(test, feature = "test-helpers"))]
pub mod testing;

pub use binding::Bound;
pub use config::{ConfigError, RetryPolicy, RuntimeConfig};
pub use context::RuntimeContext;
pub use control::{Built, Control, ControlKind, FloatSlider, IntSlider, RadioGroup, Toggle};
pub use diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};
pub use host::{Host, HostDocument, HostHandler, HostValue};
pub use ids::IdAllocator;
pub use registry::{DispatchError, UpdateRegistry};
pub use runtime::{
    Clock, Controls, Orchestrator, Runtime, RuntimeState, RuntimeTransition, Session, Step,
    SystemClock,
};
