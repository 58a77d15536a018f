#![forbid(unsafe_code)]

//! The per-process runtime object.
//!
//! [`RuntimeContext`] bundles the identifier allocator, the update registry,
//! and the diagnostic log. It is created once by [`crate::Runtime::new`],
//! shared as `Rc<RuntimeContext>`, and passed by reference into every
//! control operation. All access happens on the host's single event thread,
//! so interior mutability is `RefCell` and borrows never outlive a call.

use std::cell::RefCell;

use crate::diagnostics::{Diagnostic, DiagnosticKind, DiagnosticLog};
use crate::host::HostValue;
use crate::ids::IdAllocator;
use crate::registry::{self, DispatchError, Setter, UpdateRegistry};

#[derive(Debug, Default)]
pub struct RuntimeContext {
    ids: RefCell<IdAllocator>,
    registry: RefCell<UpdateRegistry>,
    diagnostics: RefCell<DiagnosticLog>,
}

impl RuntimeContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&self, name: &str, kind: &str) -> String {
        self.ids.borrow_mut().allocate(name, kind)
    }

    #[must_use]
    pub fn is_issued(&self, id: &str) -> bool {
        self.ids.borrow().is_issued(id)
    }

    pub fn register(&self, id: &str, setter: Setter) {
        tracing::trace!(id, "setter registered");
        self.registry.borrow_mut().register(id, setter);
    }

    #[must_use]
    pub fn is_registered(&self, id: &str) -> bool {
        self.registry.borrow().contains(id)
    }

    /// Route `value` to the setter registered under `id`.
    ///
    /// Failures are recorded as diagnostics and returned; they never panic.
    /// The registry borrow is released before the setter runs.
    pub fn dispatch(&self, id: &str, value: &HostValue) -> Result<(), DispatchError> {
        let setter = self.registry.borrow().setter(id);
        let result = match setter {
            Some(setter) => registry::invoke(id, &setter, value),
            None => Err(DispatchError::UnknownIdentifier(id.to_owned())),
        };
        if let Err(err) = &result {
            let kind = match err {
                DispatchError::UnknownIdentifier(_) => DiagnosticKind::UnknownIdentifier,
                DispatchError::PayloadMismatch { .. } => DiagnosticKind::PayloadMismatch,
            };
            self.diagnose(kind, id, err.to_string());
        }
        result
    }

    pub fn diagnose(&self, kind: DiagnosticKind, subject: &str, message: impl Into<String>) {
        self.diagnostics.borrow_mut().push(kind, subject, message);
    }

    #[must_use]
    pub fn take_diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow_mut().drain()
    }

    /// Whether any retained diagnostic has `kind`.
    #[must_use]
    pub fn has_diagnostic(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.borrow().iter().any(|d| d.kind == kind)
    }
}
