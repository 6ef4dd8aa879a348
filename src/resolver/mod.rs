//! Activation and demand-driven resolution.
//!
//! [`Resolver::activate`] binds a specification and cascades into its
//! dependencies: a dependency with exactly one installed candidate is
//! activated at once, anything else is left pending. [`Resolver::reconcile`]
//! runs on every load request and settles a pending package once one of its
//! paths is actually demanded.
//!
//! The registry and the pending tracker sit behind one mutex; every entry
//! point holds it for its whole run.

mod error;

pub use error::{ActivationError, ConflictError};

use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::activation::ActivationState;
use crate::catalog::Catalog;
use crate::specification::{Specification, normalize_feature};
use crate::version::Requirement;

/// One activation session over an immutable catalog.
pub struct Resolver {
    catalog: Arc<Catalog>,
    state: Mutex<ActivationState>,
}

impl Resolver {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self {
            catalog,
            state: Mutex::new(ActivationState::default()),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    // Mutations apply one map entry at a time, so a poisoned state is still consistent.
    fn lock(&self) -> MutexGuard<'_, ActivationState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make `spec` the active version of its name, cascading into its dependencies.
    ///
    /// Activating the version that is already active is a no-op. Steps that
    /// completed before an error are kept.
    #[tracing::instrument(skip(self, spec), fields(spec = %spec))]
    pub fn activate(&self, spec: &Arc<Specification>) -> Result<(), ActivationError> {
        let mut state = self.lock();
        activate_into(&self.catalog, &mut state, spec)
    }

    /// Activate the best installed version of `name` meeting `requirement`.
    ///
    /// When `name` is already active its version must satisfy the
    /// requirement. Otherwise the highest candidate that satisfies the
    /// requirement (and any pending one) and fits the active set wins.
    #[tracing::instrument(skip(self))]
    pub fn activate_requirement(
        &self,
        name: &str,
        requirement: &Requirement,
    ) -> Result<Arc<Specification>, ActivationError> {
        let mut state = self.lock();

        if let Some(active) = state.active(name) {
            if requirement.satisfied_by(active.version()) {
                return Ok(Arc::clone(active));
            }
            return Err(ConflictError::Requirement {
                name: name.to_string(),
                requirement: requirement.clone(),
                active: active.full_name(),
            }
            .into());
        }

        let effective = match state.pending(name) {
            Some(pending) => pending.intersect(requirement),
            None => requirement.clone(),
        };
        let selected = self
            .catalog
            .find_by_name(name)
            .iter()
            .filter(|c| effective.satisfied_by(c.version()) && fits_active_set(&state, c))
            .max_by(|a, b| a.version().cmp(b.version()))
            .cloned()
            .ok_or_else(|| ActivationError::Unsatisfiable {
                name: name.to_string(),
            })?;

        activate_into(&self.catalog, &mut state, &selected)?;
        Ok(selected)
    }

    /// Settle pending state for a load request of `path`.
    ///
    /// Returns the specification activated on behalf of the request, if any.
    /// Nothing happens unless some installed version of a pending package
    /// provides `path`. A pending package claims the path when one of those
    /// versions meets its pending requirement; two distinct names claiming it
    /// (pending, or active and providing it) is an error raised before
    /// anything is activated. The claimed package then gets its highest
    /// version that meets the pending requirement and fits the active set, or
    /// the request fails as unsatisfiable.
    #[tracing::instrument(skip(self))]
    pub fn reconcile(&self, path: &str) -> Result<Option<Arc<Specification>>, ActivationError> {
        let feature = normalize_feature(path);
        let matches = self.catalog.find_by_provided_path(&feature);
        if matches.is_empty() {
            return Ok(None);
        }

        let mut state = self.lock();

        // Providers of the path per pending name, narrowed to its pending requirement.
        let mut pending: BTreeMap<&str, Vec<&Arc<Specification>>> = BTreeMap::new();
        for spec in matches {
            if let Some(requirement) = state.pending(spec.name()) {
                let providers = pending.entry(spec.name()).or_default();
                if requirement.satisfied_by(spec.version()) {
                    providers.push(spec);
                }
            }
        }
        if pending.is_empty() {
            return Ok(None);
        }

        let mut claimants: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, providers)| !providers.is_empty())
            .map(|(name, _)| *name)
            .collect();
        let mut active_claim = false;
        for spec in matches {
            if state
                .active(spec.name())
                .is_some_and(|active| active.provides(&feature))
            {
                active_claim = true;
                claimants.insert(spec.name());
            }
        }
        if claimants.len() > 1 {
            return Err(ActivationError::AmbiguousProvider {
                path: path.to_string(),
                names: claimants.into_iter().map(String::from).collect(),
            });
        }
        if active_claim {
            return Ok(None);
        }

        // No provider meeting any pending requirement falls through to the
        // first pending name, which has nothing to select.
        let Some((name, candidates)) = pending
            .iter()
            .find(|(_, providers)| !providers.is_empty())
            .or_else(|| pending.iter().next())
        else {
            return Ok(None);
        };
        let selected = candidates
            .iter()
            .filter(|c| fits_active_set(&state, c))
            .max_by(|a, b| a.version().cmp(b.version()))
            .map(|c| Arc::clone(*c))
            .ok_or_else(|| ActivationError::Unsatisfiable {
                name: name.to_string(),
            })?;

        info!("Resolved {} for {:?}", selected.full_name(), path);
        activate_into(&self.catalog, &mut state, &selected)?;
        Ok(Some(selected))
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.lock().active(name).is_some()
    }

    /// Active specifications, ordered by name.
    pub fn active_specifications(&self) -> Vec<Arc<Specification>> {
        self.lock().active_specifications()
    }

    /// Pending requirements, ordered by name.
    pub fn pending_requirements(&self) -> BTreeMap<String, Requirement> {
        self.lock().pending_requirements()
    }

    /// A copy of the current registry and pending tracker.
    pub fn snapshot(&self) -> ActivationState {
        self.lock().clone()
    }

    /// Require directories contributed by active specifications.
    pub fn load_path(&self) -> Vec<PathBuf> {
        self.lock()
            .registry()
            .iter()
            .flat_map(|spec| spec.full_require_paths())
            .collect()
    }
}

/// Every dependency on an active package is satisfied by the active version.
fn fits_active_set(state: &ActivationState, spec: &Specification) -> bool {
    spec.dependencies().iter().all(|(name, requirement)| {
        state
            .active(name)
            .is_none_or(|active| requirement.satisfied_by(active.version()))
    })
}

fn activate_into(
    catalog: &Catalog,
    state: &mut ActivationState,
    spec: &Arc<Specification>,
) -> Result<(), ActivationError> {
    if let Some(active) = state.active(spec.name()) {
        if active.version() == spec.version() {
            return Ok(());
        }
        return Err(ConflictError::AlreadyActivated {
            requested: spec.full_name(),
            active: active.full_name(),
        }
        .into());
    }

    debug!("Activating {}", spec.full_name());
    state.bind(Arc::clone(spec));

    for (dep_name, requirement) in spec.dependencies() {
        if let Some(active) = state.active(dep_name) {
            if !requirement.satisfied_by(active.version()) {
                return Err(ConflictError::Dependency {
                    dependent: spec.full_name(),
                    active: active.full_name(),
                    name: dep_name.clone(),
                    requirement: requirement.clone(),
                }
                .into());
            }
            continue;
        }

        let effective = match state.pending(dep_name) {
            Some(pending) => pending.intersect(requirement),
            None => requirement.clone(),
        };
        let candidates: Vec<&Arc<Specification>> = catalog
            .find_by_name(dep_name)
            .iter()
            .filter(|c| effective.satisfied_by(c.version()))
            .collect();

        match candidates.as_slice() {
            [only] => {
                debug!("{} ({}) has a single candidate", dep_name, effective);
                activate_into(catalog, state, only)?;
            }
            _ => {
                debug!(
                    "Deferring {} ({}) with {} candidate(s)",
                    dep_name,
                    effective,
                    candidates.len()
                );
                state.defer(dep_name, effective);
            }
        }
    }

    Ok(())
}
