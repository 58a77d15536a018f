#![forbid(unsafe_code)]

//! Collision-free control identifiers.
//!
//! Identifiers have the form `<kind>-<kebab(name)>-<n>`, where `n` is the
//! smallest non-negative counter whose identifier has not been issued yet.
//! Issued identifiers are never released, so two controls sharing a label
//! (and a kind) always receive distinct identifiers.

use std::collections::HashSet;

/// Convert a display label to kebab case.
///
/// Whitespace and underscores separate words; ASCII letters are lowered.
/// A label with no words maps to `unnamed`.
#[must_use]
pub fn kebab_case(name: &str) -> String {
    let words: Vec<String> = name
        .split(|c: char| c.is_whitespace() || c == '_')
        .filter(|word| !word.is_empty())
        .map(str::to_ascii_lowercase)
        .collect();
    if words.is_empty() {
        "unnamed".to_owned()
    } else {
        words.join("-")
    }
}

/// Issues identifiers and remembers every one it has issued.
#[derive(Debug, Default)]
pub struct IdAllocator {
    issued: HashSet<String>,
}

impl IdAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identifier for a control of `kind` labelled `name`.
    pub fn allocate(&mut self, name: &str, kind: &str) -> String {
        let stem = format!("{kind}-{}", kebab_case(name));
        let mut count: u64 = 0;
        loop {
            let candidate = format!("{stem}-{count}");
            if !self.issued.contains(&candidate) {
                self.issued.insert(candidate.clone());
                return candidate;
            }
            count += 1;
        }
    }

    #[must_use]
    pub fn is_issued(&self, id: &str) -> bool {
        self.issued.contains(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.issued.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.issued.is_empty()
    }
}
