use super::types::{Constraint, ConstraintGraph, ConstraintType, GeometricElement, GeometricKind};
use crate::id::ElementId;

fn point(label: &str) -> GeometricElement {
    GeometricElement::labeled(GeometricKind::Point, label)
}

fn distance(label: &str) -> Constraint {
    Constraint::labeled(ConstraintType::Distance, label)
}

fn path_test_graph() -> (ConstraintGraph, Vec<ElementId>) {
    let mut g = ConstraintGraph::new();
    let ids: Vec<ElementId> = (0..6)
        .map(|i| g.add_vertex(point(&format!("e{i}"))))
        .collect();
    g.connect(ids[2], ids[1], distance("c12"));
    g.connect(ids[0], ids[1], distance("c01"));
    g.connect(ids[0], ids[3], distance("c03"));
    g.connect(ids[0], ids[4], distance("c04"));
    g.connect(ids[3], ids[5], distance("c35"));
    g.connect(ids[4], ids[5], distance("c45"));
    (g, ids)
}

/// Complete graph on four points, every pair held at distance.
fn k4() -> (ConstraintGraph, Vec<ElementId>) {
    let mut g = ConstraintGraph::new();
    let ids: Vec<ElementId> = (0..4)
        .map(|i| g.add_vertex(point(&format!("e{i}"))))
        .collect();
    g.connect(ids[0], ids[1], distance("c01"));
    g.connect(ids[1], ids[2], distance("c12"));
    g.connect(ids[2], ids[3], distance("c23"));
    g.connect(ids[3], ids[0], distance("c30"));
    g.connect(ids[0], ids[2], distance("c02"));
    g.connect(ids[1], ids[3], distance("c13"));
    (g, ids)
}

/// Eight points and thirteen distances; decomposes into a 7-vertex and a
/// 3-vertex cluster.
fn decomposable_graph() -> (ConstraintGraph, Vec<ElementId>) {
    let mut g = ConstraintGraph::new();
    let labels = ["a", "b", "c", "d", "e", "f", "g", "h"];
    let ids: Vec<ElementId> = labels.iter().map(|l| g.add_vertex(point(l))).collect();
    let pairs = [
        (0, 1, "ab"),
        (1, 2, "bc"),
        (2, 4, "ce"),
        (4, 0, "ea"),
        (2, 3, "cd"),
        (4, 3, "ed"),
        (0, 6, "ag"),
        (0, 5, "af"),
        (5, 6, "fg"),
        (5, 7, "fh"),
        (6, 7, "gh"),
        (3, 5, "df"),
        (3, 7, "dh"),
    ];
    for (i, j, label) in pairs {
        g.connect(ids[i], ids[j], distance(label));
    }
    (g, ids)
}

#[test]
fn max_flow_counts_edge_disjoint_paths() {
    let (mut g, ids) = path_test_graph();
    assert_eq!(g.max_flow(ids[2], ids[0]), 1);
    assert_eq!(g.max_flow(ids[0], ids[5]), 2);
    assert_eq!(g.max_flow(ids[5], ids[0]), 2);
    assert_eq!(g.max_flow(ids[2], ids[5]), 1);
}

#[test]
fn max_flow_is_symmetric_and_resets_flows() {
    let (mut g, ids) = decomposable_graph();
    for i in 0..ids.len() {
        for j in (i + 1)..ids.len() {
            let forward = g.max_flow(ids[i], ids[j]);
            let backward = g.max_flow(ids[j], ids[i]);
            assert_eq!(forward, backward, "flow between {i} and {j}");
            assert!(g.edges.iter().all(|e| e.flow() == 0));
        }
    }
}

#[test]
fn triconnectivity_of_the_complete_quad() {
    let (mut g, _) = k4();
    assert!(g.connected());
    assert!(g.triconnected());

    // Any single missing edge breaks it.
    let last = g.edges.last().map(|e| e.id).unwrap();
    g.edges.retain(|e| e.id != last);
    for v in &mut g.vertices {
        v.adjacency.retain(|(c, _)| *c != last);
    }
    assert!(!g.triconnected());
}

#[test]
fn pendant_vertex_breaks_triconnectivity() {
    let (mut g, ids) = k4();
    let pendant = g.add_vertex(point("e4"));
    g.connect(ids[1], pendant, distance("c14"));
    assert!(!g.triconnected());
}

#[test]
fn partial_quad_is_connected_but_not_triconnected() {
    let mut g = ConstraintGraph::new();
    let ids: Vec<ElementId> = (0..4)
        .map(|i| g.add_vertex(point(&format!("e{i}"))))
        .collect();
    g.connect(ids[0], ids[1], distance("c01"));
    g.connect(ids[1], ids[2], distance("c12"));
    assert!(!g.connected());
    g.connect(ids[2], ids[3], distance("c23"));
    g.connect(ids[3], ids[0], distance("c30"));
    g.connect(ids[0], ids[2], distance("c02"));
    assert!(g.connected());
    assert!(!g.triconnected());
    g.connect(ids[1], ids[3], distance("c13"));
    assert!(g.triconnected());
}

#[test]
fn separating_pair_disconnects_the_graph() {
    let (mut g, _) = decomposable_graph();
    assert!(!g.triconnected());

    let (a, b) = g
        .separating_vertices()
        .expect("the graph should have a separating pair");

    g.delete_vertex(a);
    g.delete_vertex(b);
    assert!(!g.connected());
}

#[test]
fn triconnected_graph_has_no_separating_pair() {
    let (mut g, _) = k4();
    assert_eq!(g.separating_vertices(), None);
}

#[test]
fn split_produces_connected_components_of_expected_size() {
    let (mut g, _) = decomposable_graph();
    let (a, b) = g
        .separating_vertices()
        .expect("the graph should have a separating pair");
    let (mut g1, mut g2) = g.split_graphs(a, b);

    assert!(g1.connected());
    assert!(g2.connected());
    assert_eq!(g1.vertices.len(), 7);
    assert_eq!(g2.vertices.len(), 3);

    // The separating pair is duplicated; everything else appears once.
    assert_eq!(
        (g1.vertices.len() - 2) + (g2.vertices.len() - 2),
        g.vertices.len() - 2
    );
    // Every original edge lands in exactly one side.
    assert_eq!(g1.edges.len() + g2.edges.len(), g.edges.len());
}

#[test]
fn split_plus_virtual_edge_preserves_the_deficit() {
    let (mut g, _) = decomposable_graph();
    let (a, b) = g
        .separating_vertices()
        .expect("the graph should have a separating pair");
    let (mut g1, mut g2) = g.split_graphs(a, b);

    if g1.deficit() > g2.deficit() {
        g1.add_virtual_edge(a, b);
    } else {
        g2.add_virtual_edge(a, b);
    }
    assert_eq!(g1.deficit() + g2.deficit(), g.deficit());
}

#[test]
fn split_reinserts_the_pair_with_surviving_edges_only() {
    let (mut g, _) = decomposable_graph();
    let (a, b) = g
        .separating_vertices()
        .expect("the graph should have a separating pair");
    let (g1, g2) = g.split_graphs(a, b);

    for side in [&g1, &g2] {
        assert!(side.contains(a));
        assert!(side.contains(b));
        for v in &side.vertices {
            for (cid, other) in &v.adjacency {
                assert!(side.contains(*other), "dangling endpoint after split");
                assert!(side.find_edge(*cid).is_some(), "dangling edge after split");
            }
        }
    }
}
