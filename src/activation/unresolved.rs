use std::collections::BTreeMap;

use crate::version::Requirement;

/// Package name -> requirement that is needed but not yet bound to a version.
#[derive(Debug, Clone, Default)]
pub struct UnresolvedTracker {
    pending: BTreeMap<String, Requirement>,
}

impl UnresolvedTracker {
    pub fn get(&self, name: &str) -> Option<&Requirement> {
        self.pending.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pending.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Requirement)> {
        self.pending.iter().map(|(name, req)| (name.as_str(), req))
    }

    /// Pending entries rendered as `name (requirement)`, sorted.
    pub fn describe(&self) -> Vec<String> {
        self.iter()
            .map(|(name, req)| format!("{} ({})", name, req))
            .collect()
    }

    /// Record the requirement for `name`. Callers pass the already
    /// intersected requirement, so this replaces any previous entry.
    pub(crate) fn insert(&mut self, name: &str, requirement: Requirement) {
        self.pending.insert(name.to_string(), requirement);
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Requirement> {
        self.pending.remove(name)
    }
}
