//! Geometric neighbour extraction.
//!
//! Candidate pairs come from an R-tree over region bounding boxes and are
//! then confirmed with exact predicates, optionally relaxed by a snap
//! distance between boundary vertices.

use crate::neighbors::NeighborSet;
use crate::region::Region;
use geo::{BoundingRect, CoordsIter, Intersects, Relate};
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, RTreeObject};
use serde::{Deserialize, Serialize};

/// Which shared boundary makes two regions neighbours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Contiguity {
    /// A single shared point is enough.
    #[default]
    Queen,
    /// A shared boundary segment (or overlapping interiors) is required.
    Rook,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExtractOptions {
    pub contiguity: Contiguity,
    /// Boundary vertices closer than this count as shared. Coordinate units.
    pub snap: f64,
}

type BoxEntry = GeomWithData<Rectangle<[f64; 2]>, usize>;

#[tracing::instrument(name = "extract_neighbors", skip_all, fields(regions = regions.len()))]
pub fn extract_neighbors(regions: &[Region], options: &ExtractOptions) -> NeighborSet {
    let snap = options.snap.max(0.0);

    let entries: Vec<BoxEntry> = regions
        .iter()
        .enumerate()
        .filter_map(|(i, region)| {
            region.geometry.bounding_rect().map(|rect| {
                GeomWithData::new(
                    Rectangle::from_corners(
                        [rect.min().x - snap, rect.min().y - snap],
                        [rect.max().x + snap, rect.max().y + snap],
                    ),
                    i,
                )
            })
        })
        .collect();
    let tree = RTree::bulk_load(entries);

    let vertex_trees: Vec<RTree<[f64; 2]>> = if snap > 0.0 {
        regions
            .iter()
            .map(|region| {
                RTree::bulk_load(
                    region
                        .geometry
                        .coords_iter()
                        .map(|c| [c.x, c.y])
                        .collect(),
                )
            })
            .collect()
    } else {
        Vec::new()
    };

    let mut neighbors = NeighborSet::empty(regions.iter().map(|r| r.id.clone()));
    let mut candidates = 0usize;

    for entry in tree.iter() {
        let i = entry.data;
        let envelope = entry.envelope();

        for other in tree.locate_in_envelope_intersecting(&envelope) {
            let j = other.data;
            // each unordered pair once
            if j <= i {
                continue;
            }
            candidates += 1;

            let a = &regions[i];
            let b = &regions[j];

            let touching = exact_contiguity(a, b, options.contiguity)
                || (snap > 0.0
                    && snapped_contiguity(a, &vertex_trees[j], snap, options.contiguity)
                    && snapped_contiguity(b, &vertex_trees[i], snap, options.contiguity));

            if touching {
                neighbors = neighbors.with_edge(&a.id, &b.id);
            }
        }
    }

    tracing::info!(
        "Checked {} candidate pairs, found {} neighbour pairs",
        candidates,
        neighbors.edge_count()
    );

    neighbors
}

fn exact_contiguity(a: &Region, b: &Region, contiguity: Contiguity) -> bool {
    match contiguity {
        Contiguity::Queen => a.geometry.intersects(&b.geometry),
        Contiguity::Rook => {
            let matrix = a.geometry.relate(&b.geometry);
            // interiors overlap, or boundaries share a line
            matrix.is_intersects()
                && (matrix.matches("T********").unwrap_or(false)
                    || matrix.matches("****1****").unwrap_or(false))
        }
    }
}

/// Counts vertices of `a` lying within `snap` of some vertex of the other
/// region. Queen needs one, Rook needs two distinct ones. Callers check both
/// directions so the relation does not depend on region order.
fn snapped_contiguity(
    a: &Region,
    other: &RTree<[f64; 2]>,
    snap: f64,
    contiguity: Contiguity,
) -> bool {
    let required = match contiguity {
        Contiguity::Queen => 1,
        Contiguity::Rook => 2,
    };
    let max_sq = snap * snap;

    let mut shared: Vec<[f64; 2]> = Vec::new();
    for coord in a.geometry.coords_iter() {
        let point = [coord.x, coord.y];
        if shared.contains(&point) {
            continue;
        }
        if other.locate_within_distance(point, max_sq).next().is_some() {
            shared.push(point);
            if shared.len() >= required {
                return true;
            }
        }
    }
    false
}
