//! Activation state: which package versions are bound, which are pending.
//!
//! The [`ActivationRegistry`] maps a package name to its single active
//! specification; the [`UnresolvedTracker`] maps a package name to a
//! requirement that is known to be needed but not yet bound. Both live
//! inside one [`ActivationState`] so their domains stay disjoint: a name
//! leaves the tracker exactly when it enters the registry.
//!
//! Mutation is crate-private; only the resolver changes this state.

mod registry;
mod unresolved;

pub use registry::ActivationRegistry;
pub use unresolved::UnresolvedTracker;

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::specification::Specification;
use crate::version::Requirement;

#[derive(Debug, Clone, Default)]
pub struct ActivationState {
    registry: ActivationRegistry,
    unresolved: UnresolvedTracker,
}

impl ActivationState {
    pub fn registry(&self) -> &ActivationRegistry {
        &self.registry
    }

    pub fn unresolved(&self) -> &UnresolvedTracker {
        &self.unresolved
    }

    pub fn active(&self, name: &str) -> Option<&Arc<Specification>> {
        self.registry.get(name)
    }

    pub fn pending(&self, name: &str) -> Option<&Requirement> {
        self.unresolved.get(name)
    }

    /// Bind `spec` as the active version of its name and drop any pending
    /// requirement for that name.
    pub(crate) fn bind(&mut self, spec: Arc<Specification>) {
        self.unresolved.remove(spec.name());
        self.registry.insert(spec);
    }

    /// Record a pending requirement for a name that is not active.
    pub(crate) fn defer(&mut self, name: &str, requirement: Requirement) {
        debug_assert!(
            !self.registry.contains(name),
            "{} is already active and cannot be deferred",
            name
        );
        self.unresolved.insert(name, requirement);
    }

    /// Active specifications, ordered by name.
    pub fn active_specifications(&self) -> Vec<Arc<Specification>> {
        self.registry.iter().cloned().collect()
    }

    /// Pending requirements, ordered by name.
    pub fn pending_requirements(&self) -> BTreeMap<String, Requirement> {
        self.unresolved
            .iter()
            .map(|(name, req)| (name.to_string(), req.clone()))
            .collect()
    }
}
