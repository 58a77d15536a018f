#![forbid(unsafe_code)]

//! Identifier → setter routing for host-originated change events.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::host::HostValue;

/// Payload type rejected by a setter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadError {
    pub expected: &'static str,
    pub got: &'static str,
}

impl PayloadError {
    #[must_use]
    pub fn new(expected: &'static str, value: &HostValue) -> Self {
        Self {
            expected,
            got: value.type_name(),
        }
    }
}

/// Writes an incoming host value into a bound variable.
pub type Setter = Rc<dyn Fn(&HostValue) -> Result<(), PayloadError>>;

/// Errors from [`UpdateRegistry::dispatch`]. Neither is fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// No setter was registered under the identifier.
    UnknownIdentifier(String),
    /// The setter rejected the payload type.
    PayloadMismatch {
        id: String,
        expected: &'static str,
        got: &'static str,
    },
}

impl DispatchError {
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::UnknownIdentifier(id) | Self::PayloadMismatch { id, .. } => id,
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownIdentifier(id) => write!(f, "no control registered as {id:?}"),
            Self::PayloadMismatch { id, expected, got } => {
                write!(f, "control {id:?} expected {expected} payload, got {got}")
            }
        }
    }
}

impl std::error::Error for DispatchError {}

#[derive(Default)]
pub struct UpdateRegistry {
    setters: HashMap<String, Setter>,
}

impl fmt::Debug for UpdateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut ids: Vec<&str> = self.setters.keys().map(String::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("UpdateRegistry").field("ids", &ids).finish()
    }
}

impl UpdateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `setter` under `id`, replacing any previous entry.
    pub fn register(&mut self, id: impl Into<String>, setter: Setter) {
        self.setters.insert(id.into(), setter);
    }

    /// Setter registered under `id`, if any.
    ///
    /// Returned by clone so callers can release their borrow of the registry
    /// before invoking it.
    #[must_use]
    pub fn setter(&self, id: &str) -> Option<Setter> {
        self.setters.get(id).cloned()
    }

    pub fn dispatch(&self, id: &str, value: &HostValue) -> Result<(), DispatchError> {
        let setter = self
            .setter(id)
            .ok_or_else(|| DispatchError::UnknownIdentifier(id.to_owned()))?;
        invoke(id, &setter, value)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.setters.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.setters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.setters.is_empty()
    }
}

pub(crate) fn invoke(id: &str, setter: &Setter, value: &HostValue) -> Result<(), DispatchError> {
    setter(value).map_err(|err| DispatchError::PayloadMismatch {
        id: id.to_owned(),
        expected: err.expected,
        got: err.got,
    })
}
