use crate::error::AdjacencyError;
use crate::index::IdIndex;
use crate::neighbors::NeighborSet;
use crate::region::RegionId;
use serde::{Deserialize, Serialize};

/// A non-geometric adjacency, such as a bridge or tunnel joining two
/// regions whose boundaries never touch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ManualLink {
    pub label: String,
    pub from: RegionId,
    pub to: RegionId,
}

impl ManualLink {
    pub fn new(
        label: impl Into<String>,
        from: impl Into<RegionId>,
        to: impl Into<RegionId>,
    ) -> Self {
        Self {
            label: label.into(),
            from: from.into(),
            to: to.into(),
        }
    }

    fn validate(&self, index: &IdIndex) -> Result<(), AdjacencyError> {
        for endpoint in [&self.from, &self.to] {
            if !index.contains(endpoint.as_str()) {
                return Err(AdjacencyError::unknown(
                    endpoint.as_str(),
                    format!("manual link '{}'", self.label),
                ));
            }
        }
        if self.from == self.to {
            return Err(AdjacencyError::SelfLink {
                label: self.label.clone(),
                identifier: self.from.clone(),
            });
        }
        Ok(())
    }
}

/// Adds every manual link to `neighbors`.
///
/// All links are validated before any is applied, so a bad configuration
/// never yields a partially augmented relation. Application is a fold over
/// set insertions and is therefore idempotent and independent of link order.
#[tracing::instrument(name = "augment", skip_all, fields(links = links.len()))]
pub fn augment(
    neighbors: NeighborSet,
    links: &[ManualLink],
    index: &IdIndex,
) -> Result<NeighborSet, AdjacencyError> {
    for link in links {
        link.validate(index)?;
    }

    let augmented = links.iter().fold(neighbors, |acc, link| {
        if acc.are_neighbors(link.from.as_str(), link.to.as_str()) {
            tracing::debug!(
                "Manual link '{}' ({} - {}) is already an edge",
                link.label,
                link.from,
                link.to
            );
        }
        acc.with_edge(&link.from, &link.to)
    });

    Ok(augmented)
}
