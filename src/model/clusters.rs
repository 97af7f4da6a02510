//! Cluster analysis: grouping terms by structural key and removing whole
//! clusters from a candidate set.
//!
//! A cluster collects every term with the same (output-factor, input-factor)
//! counts. Clusters are the unit of the static objective: in steady state all
//! members of a cluster multiply the same power of `(ȳ, ū)`, so their
//! coefficients act as one aggregated static coefficient.

use std::collections::BTreeMap;

use crate::domain::{ClusterKey, Model};

/// Read-only grouping of a model's term indices by cluster key.
///
/// Backed by a `BTreeMap` so iteration order (and therefore static-matrix
/// column order) is deterministic.
#[derive(Debug, Clone)]
pub struct ClusterSet {
    members: BTreeMap<ClusterKey, Vec<usize>>,
}

impl ClusterSet {
    pub fn from_model(model: &Model) -> Self {
        let mut members: BTreeMap<ClusterKey, Vec<usize>> = BTreeMap::new();
        for (i, term) in model.terms.iter().enumerate() {
            members.entry(term.cluster_key()).or_default().push(i);
        }
        Self { members }
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Cluster keys in deterministic (sorted) order.
    pub fn keys(&self) -> impl Iterator<Item = ClusterKey> + '_ {
        self.members.keys().copied()
    }

    /// Term indices belonging to `key`, in model order.
    pub fn member_indices(&self, key: ClusterKey) -> &[usize] {
        self.members.get(&key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, key: ClusterKey) -> bool {
        self.members.contains_key(&key)
    }
}

/// Remove every term whose cluster key matches, compacting the model while
/// preserving the relative order of the remaining terms.
///
/// Removing a cluster that does not exist is a no-op, not an error.
pub fn remove_clusters(model: &Model, key: ClusterKey) -> Model {
    Model {
        terms: model
            .terms
            .iter()
            .filter(|t| t.cluster_key() != key)
            .cloned()
            .collect(),
        output_lag: model.output_lag,
        input_lag: model.input_lag,
    }
}
