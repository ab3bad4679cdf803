use ahash::AHashMap;
use crate::error::AdjacencyError;
use crate::region::RegionId;
use serde::Serialize;
use std::collections::BTreeSet;

/// Bidirectional mapping between region identifiers and matrix indices.
///
/// Indices are 1-based (`1..=N`) and follow the sorted order of the
/// identifiers, so the same identifier set always yields the same mapping.
/// The index travels with the matrix; covariate tables should be ordered
/// through [`IdIndex::align`] rather than by position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdIndex {
    ids: Vec<RegionId>,
    #[serde(skip)]
    positions: AHashMap<RegionId, usize>,
}

impl IdIndex {
    pub fn from_ids<I>(ids: I) -> Result<Self, AdjacencyError>
    where
        I: IntoIterator<Item = RegionId>,
    {
        let mut sorted = BTreeSet::new();
        for id in ids {
            if !sorted.insert(id.clone()) {
                return Err(AdjacencyError::DuplicateIdentifier(id));
            }
        }

        let ids: Vec<RegionId> = sorted.into_iter().collect();
        let positions = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i + 1))
            .collect();

        Ok(Self { ids, positions })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// 1-based index of `id`.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    /// Identifier at 1-based `index`.
    pub fn id_at(&self, index: usize) -> Option<&RegionId> {
        index.checked_sub(1).and_then(|i| self.ids.get(i))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.positions.contains_key(id)
    }

    /// `(index, id)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &RegionId)> {
        self.ids.iter().enumerate().map(|(i, id)| (i + 1, id))
    }

    pub fn ids(&self) -> &[RegionId] {
        &self.ids
    }

    /// Orders a region-keyed table by matrix index.
    ///
    /// Fails if a region has no value, or if the table names a region the
    /// index does not know.
    pub fn align<T: Clone>(
        &self,
        values: &AHashMap<RegionId, T>,
    ) -> Result<Vec<T>, AdjacencyError> {
        if let Some(stray) = values
            .keys()
            .filter(|id| !self.contains(id.as_str()))
            .min()
        {
            return Err(AdjacencyError::unknown(stray.as_str(), "covariate table"));
        }

        self.ids
            .iter()
            .map(|id| {
                values
                    .get(id)
                    .cloned()
                    .ok_or_else(|| AdjacencyError::MissingCovariate(id.clone()))
            })
            .collect()
    }
}
