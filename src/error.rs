use crate::region::RegionId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal failures of an adjacency build. Any of these aborts the batch;
/// non-fatal findings are reported as [`crate::pipeline::AdjacencyWarning`] instead.
#[derive(Error, Debug)]
pub enum AdjacencyError {
    #[error("Invalid geometry for region '{region}': {reason}")]
    Geometry { region: String, reason: String },
    #[error("Unknown region identifier '{identifier}' referenced by {context}")]
    UnknownIdentifier { identifier: String, context: String },
    #[error("Manual link '{label}' connects region '{identifier}' to itself")]
    SelfLink { label: String, identifier: RegionId },
    #[error("Region identifier '{0}' appears more than once")]
    DuplicateIdentifier(RegionId),
    #[error("No covariate value for region '{0}'")]
    MissingCovariate(RegionId),
    #[error("{} region(s) have no neighbours: {}", .0.len(), join_ids(.0))]
    IsolatedRegions(Vec<RegionId>),
    #[error("Failed to parse GeoJSON: {0}")]
    GeoJson(#[from] geojson::Error),
    #[error("Failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to parse config: {0}")]
    Config(#[from] ron::error::SpannedError),
    #[error("I/O error accessing path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl AdjacencyError {
    pub(crate) fn geometry(region: impl Into<String>, reason: impl Into<String>) -> Self {
        AdjacencyError::Geometry {
            region: region.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown(identifier: impl Into<String>, context: impl Into<String>) -> Self {
        AdjacencyError::UnknownIdentifier {
            identifier: identifier.into(),
            context: context.into(),
        }
    }
}

fn join_ids(ids: &[RegionId]) -> String {
    itertools::Itertools::join(&mut ids.iter(), ", ")
}
