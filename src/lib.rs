// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

//! Neighbour structures for areal spatial models.
//!
//! Regions (ZIP codes, tracts) are loaded from GeoJSON, neighbours are
//! derived from shared boundaries, domain-knowledge links such as bridges
//! are folded in, and the result is encoded as a binary adjacency matrix
//! together with the identifier ↔ index mapping a BYM-style smoother needs.

pub mod config;
pub mod error;
pub mod extract;
pub mod index;
pub mod links;
pub mod matrix;
pub mod neighbors;
pub mod pipeline;
pub mod region;

#[cfg(test)]
mod pipeline_tests;

pub use config::AdjacencyConfig;
pub use error::AdjacencyError;
pub use extract::{Contiguity, ExtractOptions, extract_neighbors};
pub use index::IdIndex;
pub use links::{ManualLink, augment};
pub use matrix::{AdjacencyMatrix, EdgeList};
pub use neighbors::NeighborSet;
pub use pipeline::{AdjacencyOutput, AdjacencySummary, AdjacencyWarning, build_adjacency};
pub use region::{
    DuplicatePolicy, LoadOptions, Region, RegionId, load_regions, load_regions_from_path,
};
