#![forbid(unsafe_code)]

//! Bound application values.
//!
//! [`Bound<T>`] is the "owned reference" a control writes through. The
//! embedding program keeps one handle and reads it; the control keeps
//! another and is the only writer, via the setter it registers at build
//! time. There is no public setter.
//!
//! # Invariants
//!
//! 1. `version` increments by exactly 1 on each value-changing write.
//! 2. Writing a value equal to the current one leaves the version unchanged.
//! 3. Clones share state: every handle observes every write.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

struct BoundInner<T> {
    value: T,
    version: u64,
}

/// A shared, version-tracked value written only by its control.
pub struct Bound<T> {
    inner: Rc<RefCell<BoundInner<T>>>,
}

impl<T> Clone for Bound<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Bound<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Bound")
            .field("value", &inner.value)
            .field("version", &inner.version)
            .finish()
    }
}

impl<T: Clone + PartialEq> Bound<T> {
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            inner: Rc::new(RefCell::new(BoundInner { value, version: 0 })),
        }
    }

    /// Clone of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.borrow().value.clone()
    }

    /// Borrow the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.borrow().value)
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    /// Store `value`, returning the previous one.
    pub(crate) fn replace(&self, value: T) -> T {
        let mut inner = self.inner.borrow_mut();
        if inner.value != value {
            inner.version += 1;
        }
        std::mem::replace(&mut inner.value, value)
    }
}

/// Change callback invoked with `(old, new)` before the bound value changes.
pub type ChangeCallback<T> = Rc<dyn Fn(&T, &T)>;
