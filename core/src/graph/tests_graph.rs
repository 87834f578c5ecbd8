use super::types::{Constraint, ConstraintGraph, ConstraintType, GeometricElement, GeometricKind};
use crate::id::ElementId;

fn point(label: &str) -> GeometricElement {
    GeometricElement::labeled(GeometricKind::Point, label)
}

fn distance(label: &str) -> Constraint {
    Constraint::labeled(ConstraintType::Distance, label)
}

/// Six points in the diamond-with-a-tail shape used by the path and flow
/// tests: e2 - e1 - e0 - {e3, e4} - e5.
fn path_test_graph() -> (ConstraintGraph, Vec<ElementId>, Vec<crate::id::ConstraintId>) {
    let mut g = ConstraintGraph::new();
    let ids: Vec<ElementId> = (0..6)
        .map(|i| g.add_vertex(point(&format!("e{i}"))))
        .collect();

    let c12 = g.connect(ids[2], ids[1], distance("c12"));
    let c01 = g.connect(ids[0], ids[1], distance("c01"));
    let c03 = g.connect(ids[0], ids[3], distance("c03"));
    let c04 = g.connect(ids[0], ids[4], distance("c04"));
    let c35 = g.connect(ids[3], ids[5], distance("c35"));
    let c45 = g.connect(ids[4], ids[5], distance("c45"));

    (g, ids, vec![c12, c01, c03, c04, c35, c45])
}

#[test]
fn connect_updates_both_adjacencies_and_edge_list() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let b = g.add_vertex(point("b"));
    let c = g.connect(a, b, distance("ab"));

    assert_eq!(g.edges.len(), 1);
    assert!(g.adjacent(a, b));
    assert!(g.adjacent(b, a));
    assert_eq!(g.find_vertex(a).unwrap().connection_to(b), Some(c));
    assert_eq!(g.find_vertex(b).unwrap().connection_to(a), Some(c));
}

#[test]
fn multi_edges_between_the_same_pair_are_kept() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let b = g.add_vertex(point("b"));
    g.connect(a, b, Constraint::new(ConstraintType::Vertical));
    g.connect(a, b, Constraint::with_value(ConstraintType::Distance, 3.0));

    assert_eq!(g.edges.len(), 2);
    assert_eq!(g.find_vertex(a).unwrap().adjacency.len(), 2);
    assert_eq!(g.find_vertex(b).unwrap().adjacency.len(), 2);
}

#[test]
fn delete_vertex_leaves_no_dangling_references() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let b = g.add_vertex(point("b"));
    let c = g.add_vertex(point("c"));
    g.connect(a, b, distance("ab"));
    g.connect(b, c, distance("bc"));
    g.connect(a, c, distance("ac"));
    // A second edge to the doomed vertex checks the multi-edge purge.
    g.connect(a, b, Constraint::new(ConstraintType::Vertical));

    g.delete_vertex(b);

    assert!(!g.contains(b));
    assert_eq!(g.vertices.len(), 2);
    assert_eq!(g.edges.len(), 1);
    for v in &g.vertices {
        assert!(
            v.adjacency.iter().all(|(_, other)| *other != b),
            "{} still references the deleted vertex",
            v.label
        );
    }
    assert!(g.adjacent(a, c));
}

#[test]
fn delete_vertex_of_unknown_id_is_a_no_op() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let ghost = ElementId::next();
    g.delete_vertex(ghost);
    assert!(g.contains(a));
}

#[test]
fn deep_copy_is_identical_but_independent() {
    let (g, ids, _) = path_test_graph();
    let mut copy = g.deep_copy();

    assert_eq!(g.vertices.len(), copy.vertices.len());
    assert_eq!(g.edges.len(), copy.edges.len());
    for (v, w) in g.vertices.iter().zip(copy.vertices.iter()) {
        assert_eq!(v.id, w.id);
        assert_eq!(v.label, w.label);
        assert_eq!(v.adjacency.len(), w.adjacency.len());
        for pair in &v.adjacency {
            assert!(w.adjacency.contains(pair));
        }
    }
    for (e, f) in g.edges.iter().zip(copy.edges.iter()) {
        assert_eq!(e.id, f.id);
        assert_eq!(e.ty, f.ty);
    }

    // Mutating the copy must not leak back into the original.
    copy.delete_vertex(ids[0]);
    assert!(g.contains(ids[0]));
    assert_eq!(g.edges.len(), 6);
}

#[test]
fn connectivity_follows_the_edge_set() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let b = g.add_vertex(point("b"));
    let c = g.add_vertex(point("c"));
    g.connect(a, b, distance("ab"));
    assert!(!g.connected());
    g.connect(b, c, distance("bc"));
    assert!(g.connected());
    // The test itself must leave no exploration state behind.
    assert!(g.vertices.iter().all(|v| !v.explored));
}

#[test]
fn bfs_returns_the_shortest_constraint_path() {
    let (mut g, ids, cs) = path_test_graph();

    let path = g.bfs(ids[2], ids[5]).expect("there should be a path");
    assert_eq!(path.len(), 4);
    assert_eq!(path, vec![cs[0], cs[1], cs[2], cs[4]]);

    let path = g.bfs(ids[4], ids[1]).expect("there should be a path");
    assert_eq!(path, vec![cs[3], cs[1]]);
}

#[test]
fn bfs_between_disconnected_vertices_finds_nothing() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let b = g.add_vertex(point("b"));
    assert_eq!(g.bfs(a, b), None);
}

#[test]
fn bfs_path_is_no_longer_than_any_alternative() {
    let (mut g, ids, _) = path_test_graph();
    // Both e0 -> e3 -> e5 and e0 -> e4 -> e5 exist; either is fine but the
    // result must have the minimal length.
    let path = g.bfs(ids[0], ids[5]).expect("there should be a path");
    assert_eq!(path.len(), 2);
}

#[test]
fn deficit_counts_vertices_against_equations() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let b = g.add_vertex(point("b"));
    // Two loose points: 4 dof, 3 fixed by the global frame.
    assert_eq!(g.deficit(), 1);
    g.connect(a, b, distance("ab"));
    assert_eq!(g.deficit(), 0);
    // A coincidence removes two degrees of freedom.
    g.connect(a, b, Constraint::new(ConstraintType::Coincident));
    assert_eq!(g.deficit(), -2);
}

#[test]
fn constraint_weights_match_their_equation_count() {
    assert_eq!(ConstraintType::Coincident.weight(), 2);
    assert_eq!(ConstraintType::Virtual.weight(), 0);
    for ty in [
        ConstraintType::Angle,
        ConstraintType::Colinear,
        ConstraintType::Distance,
        ConstraintType::Equal,
        ConstraintType::Horizontal,
        ConstraintType::Midpoint,
        ConstraintType::Parallel,
        ConstraintType::Perpendicular,
        ConstraintType::Vertical,
    ] {
        assert_eq!(ty.weight(), 1);
    }
}

#[test]
fn element_dof_is_two_for_points_and_lines() {
    assert_eq!(GeometricKind::Point.dof(), 2);
    assert_eq!(GeometricKind::Line.dof(), 2);
}

#[test]
fn virtual_edges_participate_in_connectivity() {
    let mut g = ConstraintGraph::new();
    let a = g.add_vertex(point("a"));
    let b = g.add_vertex(point("b"));
    g.add_virtual_edge(a, b);
    assert!(g.adjacent(a, b));
    assert!(g.connected());
}
