use std::collections::BTreeMap;
use std::sync::Arc;

use crate::specification::Specification;

/// Package name -> the one specification active for it.
#[derive(Debug, Clone, Default)]
pub struct ActivationRegistry {
    active: BTreeMap<String, Arc<Specification>>,
}

impl ActivationRegistry {
    pub fn get(&self, name: &str) -> Option<&Arc<Specification>> {
        self.active.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.active.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Specification>> {
        self.active.values()
    }

    /// Entries are never replaced; callers check for conflicts first.
    pub(crate) fn insert(&mut self, spec: Arc<Specification>) {
        debug_assert!(
            self.active
                .get(spec.name())
                .is_none_or(|existing| existing.version() == spec.version()),
            "{} would replace an active version",
            spec.full_name()
        );
        self.active.insert(spec.name().to_string(), spec);
    }
}
