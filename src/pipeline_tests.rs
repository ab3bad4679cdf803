use crate::config::AdjacencyConfig;
use crate::error::AdjacencyError;
use crate::links::ManualLink;
use crate::pipeline::{AdjacencyWarning, build_adjacency};
use crate::region::{LoadOptions, Region, RegionId, load_regions};
use geo::polygon;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn square(id: &str, x: f64, y: f64, group: &str) -> Region {
    Region::new(
        id,
        polygon![
            (x: x, y: y),
            (x: x + 1.0, y: y),
            (x: x + 1.0, y: y + 1.0),
            (x: x, y: y + 1.0),
            (x: x, y: y),
        ],
    )
    .with_group(group)
}

/// r1-r2 and r3-r4 touch, r5 is far from everything.
fn five_regions() -> Vec<Region> {
    vec![
        square("r1", 0.0, 0.0, "west"),
        square("r2", 1.0, 0.0, "west"),
        square("r3", 5.0, 0.0, "east"),
        square("r4", 6.0, 0.0, "east"),
        square("r5", 20.0, 20.0, "island"),
    ]
}

fn bridge_config() -> AdjacencyConfig {
    AdjacencyConfig {
        manual_links: vec![ManualLink::new("bridge", "r2", "r3")],
        ..AdjacencyConfig::default()
    }
}

fn ids(names: &[&str]) -> Vec<RegionId> {
    names.iter().map(|n| RegionId::from(*n)).collect()
}

#[test]
fn test_five_region_scenario() {
    init_tracing();
    let output = build_adjacency(&five_regions(), &bridge_config()).unwrap();

    let r2: Vec<RegionId> = output
        .neighbors
        .neighbors_of("r2")
        .unwrap()
        .iter()
        .cloned()
        .collect();
    assert_eq!(r2, ids(&["r1", "r3"]));
    assert!(output.neighbors.neighbors_of("r5").unwrap().is_empty());

    let r5 = output.index.index_of("r5").unwrap();
    assert_eq!(r5, 5);
    assert_eq!(output.matrix.row(r5), Some(&[0u8; 5][..]));
    assert!((1..=5).all(|i| !output.matrix.is_adjacent(i, r5)));

    assert!(output
        .warnings
        .contains(&AdjacencyWarning::EmptyNeighborSet { ids: ids(&["r5"]) }));
    assert_eq!(output.isolated(), ids(&["r5"]).as_slice());

    assert_eq!(output.summary.geometric_edges, 2);
    assert_eq!(output.summary.manual_edges_added, 1);
    assert_eq!(output.summary.edges, 3);
    assert_eq!(output.summary.components, 2);
    assert_eq!(output.summary.cross_group_edges, 1);
}

#[test]
fn test_disconnected_warning_lists_components() {
    let output = build_adjacency(&five_regions(), &AdjacencyConfig::default()).unwrap();

    let components = output.warnings.iter().find_map(|w| match w {
        AdjacencyWarning::Disconnected { components } => Some(components.clone()),
        _ => None,
    });
    assert_eq!(
        components,
        Some(vec![ids(&["r1", "r2"]), ids(&["r3", "r4"]), ids(&["r5"])])
    );
}

#[test]
fn test_unknown_link_aborts_before_matrix() {
    let mut config = bridge_config();
    config
        .manual_links
        .push(ManualLink::new("phantom tunnel", "r1", "ZZZZZ"));

    let err = build_adjacency(&five_regions(), &config).unwrap_err();
    assert!(matches!(
        err,
        AdjacencyError::UnknownIdentifier { ref identifier, .. } if identifier == "ZZZZZ"
    ));
}

#[test]
fn test_matrix_invariants() {
    let output = build_adjacency(&five_regions(), &bridge_config()).unwrap();

    assert!(output.neighbors.is_symmetric());
    assert!(output.matrix.is_symmetric());
    assert!(output.matrix.has_zero_diagonal());
    assert_eq!(output.matrix.size(), 5);
    assert_eq!(output.matrix.isolated_rows(), vec![5]);

    // matrix and neighbour set describe the same relation
    for (i, a) in output.index.iter() {
        for (j, b) in output.index.iter() {
            assert_eq!(
                output.matrix.is_adjacent(i, j),
                output.neighbors.are_neighbors(a.as_str(), b.as_str())
            );
        }
    }
}

#[test]
fn test_links_applied_twice_or_permuted() {
    let links = vec![
        ManualLink::new("bridge", "r2", "r3"),
        ManualLink::new("ferry", "r4", "r5"),
        ManualLink::new("tunnel", "r1", "r4"),
    ];

    let base = AdjacencyConfig {
        manual_links: links.clone(),
        ..AdjacencyConfig::default()
    };
    let doubled = AdjacencyConfig {
        manual_links: links.iter().chain(links.iter()).cloned().collect(),
        ..AdjacencyConfig::default()
    };
    let mut reversed_links = links.clone();
    reversed_links.reverse();
    let reversed = AdjacencyConfig {
        manual_links: reversed_links,
        ..AdjacencyConfig::default()
    };

    let a = build_adjacency(&five_regions(), &base).unwrap();
    let b = build_adjacency(&five_regions(), &doubled).unwrap();
    let c = build_adjacency(&five_regions(), &reversed).unwrap();

    assert_eq!(a.neighbors, b.neighbors);
    assert_eq!(a.neighbors, c.neighbors);
    assert_eq!(a.matrix, c.matrix);
    assert!(a.warnings.is_empty());
}

#[test]
fn test_reject_isolated() {
    let config = AdjacencyConfig {
        reject_isolated: true,
        ..bridge_config()
    };

    match build_adjacency(&five_regions(), &config) {
        Err(AdjacencyError::IsolatedRegions(isolated)) => assert_eq!(isolated, ids(&["r5"])),
        other => panic!("expected isolated regions error, got {:?}", other.map(|o| o.summary)),
    }
}

#[test]
fn test_duplicate_region_ids_rejected() {
    let mut regions = five_regions();
    regions.push(square("r1", 40.0, 40.0, "west"));

    assert!(matches!(
        build_adjacency(&regions, &AdjacencyConfig::default()),
        Err(AdjacencyError::DuplicateIdentifier(_))
    ));
}

#[test]
fn test_empty_input() {
    let output = build_adjacency(&[], &AdjacencyConfig::default()).unwrap();
    assert_eq!(output.matrix.size(), 0);
    assert!(output.matrix.to_bytes().is_empty());
    assert!(output.warnings.is_empty());
}

fn feature(zip: &str, county: &str, x: f64, y: f64) -> String {
    format!(
        r#"{{"type":"Feature","properties":{{"ZIPCODE":"{zip}","COUNTY":"{county}"}},"geometry":{{"type":"Polygon","coordinates":[[[{x},{y}],[{x1},{y}],[{x1},{y1}],[{x},{y1}],[{x},{y}]]]}}}}"#,
        x1 = x + 1.0,
        y1 = y + 1.0
    )
}

#[test]
fn test_determinism_from_geojson() {
    init_tracing();
    let features = vec![
        feature("10301", "Richmond", 0.0, 0.0),
        feature("10305", "Richmond", 1.0, 0.0),
        feature("11209", "Kings", 3.0, 0.0),
        feature("11220", "Kings", 4.0, 0.0),
        feature("11101", "Queens", 5.0, 0.0),
    ];
    let mut shuffled = features.clone();
    shuffled.rotate_left(2);
    shuffled.swap(0, 3);

    let config = AdjacencyConfig::from_ron_str(
        r#"(manual_links: [(label: "Verrazzano-Narrows Bridge", from: "10305", to: "11209")])"#,
    )
    .unwrap();

    let run = |features: &[String]| {
        let input = format!(
            r#"{{"type":"FeatureCollection","features":[{}]}}"#,
            features.join(",")
        );
        let regions = load_regions(&input, &LoadOptions::default()).unwrap();
        build_adjacency(&regions, &config).unwrap()
    };

    let first = run(&features);
    let second = run(&features);
    let third = run(&shuffled);

    assert_eq!(first.matrix.to_bytes(), second.matrix.to_bytes());
    assert_eq!(first.matrix.to_bytes(), third.matrix.to_bytes());
    assert_eq!(first.index, third.index);
    assert_eq!(first.matrix.to_inla_graph(), third.matrix.to_inla_graph());

    assert!(first.neighbors.are_neighbors("10305", "11209"));
    assert!(first.neighbors.are_neighbors("11220", "11101"));
    assert_eq!(first.summary.components, 1);
    // bridge plus the Kings/Queens border
    assert_eq!(first.summary.cross_group_edges, 2);
}

#[test]
fn test_json_artifact() {
    let output = build_adjacency(&five_regions(), &bridge_config()).unwrap();
    let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();

    assert_eq!(json["index"]["ids"][0], "r1");
    assert_eq!(json["matrix"]["size"], 5);
    assert_eq!(json["neighbors"]["r2"], serde_json::json!(["r1", "r3"]));
    assert_eq!(json["summary"]["isolated"], 1);
    assert_eq!(
        json["warnings"][0]["EmptyNeighborSet"]["ids"],
        serde_json::json!(["r5"])
    );
}
