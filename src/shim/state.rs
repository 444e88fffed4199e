//! Mutable state of one load cycle of the target runtime.

use std::collections::HashMap;

use crate::{interface::InterfaceFamily, runtime::InstanceHandle};

/// Everything the shim learns between installing the factory intercept and the runtime's
/// cleanup call.
///
/// Owned by a [`crate::Shim`] behind its state mutex; every registrar and lifecycle
/// transition reads and writes it under that one lock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessWideState {
    /// `true` once the factory export of the target module is intercepted.
    pub module_intercept_installed: bool,
    /// First revision seen per family in this cycle. Never overwritten until reset.
    pub resolved: HashMap<InterfaceFamily, u32>,
    /// The retained core-client instance, used to re-enter the runtime.
    pub core_client: Option<InstanceHandle>,
}

impl ProcessWideState {
    /// Creates an empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the revision recorded for `family` in this cycle.
    #[must_use]
    pub fn revision(&self, family: InterfaceFamily) -> Option<u32> {
        self.resolved.get(&family).copied()
    }

    /// Returns `true` if a revision was recorded for `family` in this cycle.
    #[must_use]
    pub fn is_resolved(&self, family: InterfaceFamily) -> bool {
        self.resolved.contains_key(&family)
    }

    /// Clears everything, back to the state of a freshly started process.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Returns `true` if nothing has been learned or installed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.module_intercept_installed && self.resolved.is_empty() && self.core_client.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_empties_state() {
        let mut object = 0u8;
        let mut state = ProcessWideState::new();
        assert!(state.is_empty());

        state.module_intercept_installed = true;
        state.resolved.insert(InterfaceFamily::Compositor, 27);
        state.core_client = InstanceHandle::new((&mut object as *mut u8).cast());
        assert!(!state.is_empty());
        assert_eq!(state.revision(InterfaceFamily::Compositor), Some(27));
        assert!(!state.is_resolved(InterfaceFamily::System));

        state.reset();
        assert!(state.is_empty());
        assert_eq!(state, ProcessWideState::default());
    }
}
