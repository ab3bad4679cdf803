use crate::region::RegionId;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, VecDeque};

/// Neighbour relation over a fixed set of regions.
///
/// Every region has an entry, even when its set is empty. Edges are always
/// stored in both directions and never from a region to itself, so the
/// relation is symmetric and irreflexive by construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NeighborSet {
    sets: BTreeMap<RegionId, BTreeSet<RegionId>>,
}

impl NeighborSet {
    /// A relation with no edges over the given regions.
    pub fn empty<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = RegionId>,
    {
        Self {
            sets: ids.into_iter().map(|id| (id, BTreeSet::new())).collect(),
        }
    }

    /// Returns the relation with the undirected edge `a`–`b` added.
    ///
    /// Adding an existing edge or a self-loop leaves the value unchanged.
    /// Endpoints must already be present; use [`NeighborSet::contains`]
    /// to check beforehand.
    pub fn with_edge(mut self, a: &RegionId, b: &RegionId) -> Self {
        if a == b || !self.sets.contains_key(a) || !self.sets.contains_key(b) {
            return self;
        }
        if let Some(set) = self.sets.get_mut(a) {
            set.insert(b.clone());
        }
        if let Some(set) = self.sets.get_mut(b) {
            set.insert(a.clone());
        }
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.sets.contains_key(id)
    }

    pub fn neighbors_of(&self, id: &str) -> Option<&BTreeSet<RegionId>> {
        self.sets.get(id)
    }

    pub fn are_neighbors(&self, a: &str, b: &str) -> bool {
        self.sets.get(a).is_some_and(|set| set.contains(b))
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &RegionId> {
        self.sets.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&RegionId, &BTreeSet<RegionId>)> {
        self.sets.iter()
    }

    /// Number of undirected edges.
    pub fn edge_count(&self) -> usize {
        self.sets.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Undirected edges as `(a, b)` pairs with `a < b`, in sorted order.
    pub fn edges(&self) -> impl Iterator<Item = (&RegionId, &RegionId)> {
        self.sets
            .iter()
            .flat_map(|(a, set)| set.iter().filter(move |b| a < *b).map(move |b| (a, b)))
    }

    /// Regions with no neighbours, sorted.
    pub fn isolated(&self) -> Vec<RegionId> {
        self.sets
            .iter()
            .filter(|(_, set)| set.is_empty())
            .map(|(id, _)| id.clone())
            .collect()
    }

    pub fn is_symmetric(&self) -> bool {
        self.sets.iter().all(|(a, set)| {
            set.iter()
                .all(|b| a != b && self.sets.get(b).is_some_and(|back| back.contains(a)))
        })
    }

    /// Connected components, each sorted, ordered by their smallest member.
    pub fn components(&self) -> Vec<Vec<RegionId>> {
        let mut seen: BTreeSet<&RegionId> = BTreeSet::new();
        let mut components = Vec::new();

        for start in self.sets.keys() {
            if !seen.insert(start) {
                continue;
            }

            let mut component = vec![start.clone()];
            let mut queue = VecDeque::from([start]);

            while let Some(current) = queue.pop_front() {
                for next in &self.sets[current] {
                    if seen.insert(next) {
                        component.push(next.clone());
                        queue.push_back(next);
                    }
                }
            }

            component.sort();
            components.push(component);
        }

        components
    }
}
