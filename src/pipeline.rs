use ahash::AHashMap;
use crate::config::AdjacencyConfig;
use crate::error::AdjacencyError;
use crate::extract::extract_neighbors;
use crate::index::IdIndex;
use crate::links::augment;
use crate::matrix::AdjacencyMatrix;
use crate::neighbors::NeighborSet;
use crate::region::{Region, RegionId};
use serde::Serialize;

/// Non-fatal findings returned alongside a successful build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum AdjacencyWarning {
    /// Regions with no neighbours after augmentation. Their matrix rows and
    /// columns are all zero, so a spatial smoother gets nothing to borrow
    /// strength from for them.
    EmptyNeighborSet { ids: Vec<RegionId> },
    /// The graph splits into several connected components (isolated regions
    /// included as singletons).
    Disconnected { components: Vec<Vec<RegionId>> },
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct AdjacencySummary {
    pub regions: usize,
    pub geometric_edges: usize,
    pub manual_edges_added: usize,
    pub edges: usize,
    pub isolated: usize,
    pub components: usize,
    /// Edges joining regions with different group labels.
    pub cross_group_edges: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct AdjacencyOutput {
    pub index: IdIndex,
    pub neighbors: NeighborSet,
    pub matrix: AdjacencyMatrix,
    pub warnings: Vec<AdjacencyWarning>,
    pub summary: AdjacencySummary,
}

impl AdjacencyOutput {
    pub fn isolated(&self) -> &[RegionId] {
        self.warnings
            .iter()
            .find_map(|w| match w {
                AdjacencyWarning::EmptyNeighborSet { ids } => Some(ids.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    /// Index, neighbour sets, matrix, warnings and summary as one JSON
    /// document for the downstream model script.
    pub fn to_json(&self) -> Result<String, AdjacencyError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Builds the neighbour structure for `regions`: geometric extraction,
/// manual link augmentation, then matrix encoding.
#[tracing::instrument(name = "build_adjacency", skip_all, fields(regions = regions.len()))]
pub fn build_adjacency(
    regions: &[Region],
    config: &AdjacencyConfig,
) -> Result<AdjacencyOutput, AdjacencyError> {
    let index = IdIndex::from_ids(regions.iter().map(|r| r.id.clone()))?;

    let geometric = extract_neighbors(regions, &config.extract_options());
    let geometric_edges = geometric.edge_count();

    let neighbors = augment(geometric, &config.manual_links, &index)?;
    let edges = neighbors.edge_count();

    let matrix = AdjacencyMatrix::encode(&neighbors, &index)?;

    let isolated = neighbors.isolated();
    if config.reject_isolated && !isolated.is_empty() {
        return Err(AdjacencyError::IsolatedRegions(isolated));
    }

    let components = neighbors.components();

    let summary = AdjacencySummary {
        regions: index.len(),
        geometric_edges,
        manual_edges_added: edges - geometric_edges,
        edges,
        isolated: isolated.len(),
        components: components.len(),
        cross_group_edges: count_cross_group_edges(regions, &neighbors),
    };

    let mut warnings = Vec::new();
    if !isolated.is_empty() {
        tracing::warn!(
            "{} region(s) have no neighbours: {:?}",
            isolated.len(),
            isolated
        );
        warnings.push(AdjacencyWarning::EmptyNeighborSet { ids: isolated });
    }
    if components.len() > 1 {
        tracing::warn!(
            "Adjacency graph has {} connected components",
            components.len()
        );
        warnings.push(AdjacencyWarning::Disconnected { components });
    }

    tracing::info!(
        "Adjacency built: {} regions, {} edges ({} geometric, {} from manual links), {} cross-group",
        summary.regions,
        summary.edges,
        summary.geometric_edges,
        summary.manual_edges_added,
        summary.cross_group_edges
    );

    Ok(AdjacencyOutput {
        index,
        neighbors,
        matrix,
        warnings,
        summary,
    })
}

fn count_cross_group_edges(regions: &[Region], neighbors: &NeighborSet) -> usize {
    let groups: AHashMap<&RegionId, Option<&str>> = regions
        .iter()
        .map(|r| (&r.id, r.group.as_deref()))
        .collect();

    neighbors
        .edges()
        .filter(|(a, b)| match (groups.get(a), groups.get(b)) {
            (Some(Some(ga)), Some(Some(gb))) => ga != gb,
            _ => false,
        })
        .count()
}
