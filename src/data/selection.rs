//! One selector's option list and current choice.

use std::collections::BTreeSet;

/// Options for one selector level plus the chosen value.
///
/// Options are rehydrated wholesale from each List result. The current
/// choice is kept if it is still offered, otherwise the first option is
/// chosen, so it never names a value missing from the latest options.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    options: Vec<String>,
    current: Option<String>,
}

impl Selection {
    /// A selection with a preferred value and no options yet.
    pub fn preferring(value: Option<String>) -> Self {
        Self {
            options: Vec::new(),
            current: value,
        }
    }

    pub fn options(&self) -> &[String] {
        &self.options
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Replace all options, keeping the current choice if still present.
    pub fn replace(&mut self, options: BTreeSet<String>) {
        self.options = options.into_iter().collect();
        let keep = self
            .current
            .as_ref()
            .is_some_and(|c| self.options.contains(c));
        if !keep {
            self.current = self.options.first().cloned();
        }
    }

    /// Drop every option and the current choice.
    pub fn clear(&mut self) {
        self.options.clear();
        self.current = None;
    }

    /// Choose an offered value. Returns false if it is not offered.
    pub fn choose(&mut self, value: &str) -> bool {
        if !self.options.iter().any(|o| o == value) {
            return false;
        }
        self.current = Some(value.to_string());
        true
    }

    /// The option `delta` places away from the current one, wrapping.
    pub fn neighbour(&self, delta: isize) -> Option<&str> {
        if self.options.is_empty() {
            return None;
        }
        let len = self.options.len() as isize;
        let index = self
            .current
            .as_ref()
            .and_then(|c| self.options.iter().position(|o| o == c))
            .unwrap_or(0) as isize;
        let next = (index + delta).rem_euclid(len) as usize;
        self.options.get(next).map(String::as_str)
    }
}
