//! Structural analysis of the constraint graph: max-flow, 3-connectivity,
//! separating pairs and graph bisection.
//!
//! Edges carry unit capacity, so by Menger's theorem the max-flow between a
//! vertex pair equals the number of edge-disjoint constraint paths joining
//! them. Three such paths between every pair is the property required for a
//! cluster to be rigid up to congruence.

use super::types::ConstraintGraph;
use crate::id::ElementId;
use std::collections::HashSet;

impl ConstraintGraph {
    /// Ford-Fulkerson over the flow-masked breadth-first search. Every edge's
    /// flow is reset to zero before returning.
    pub fn max_flow(&mut self, source: ElementId, sink: ElementId) -> u32 {
        let mut flow = 0;
        while let Some(path) = self.bfs(source, sink) {
            for cid in &path {
                if let Some(edge) = self.find_edge_mut(*cid) {
                    let f = edge.flow();
                    edge.set_flow(f + 1);
                }
            }
            flow += 1;
        }
        self.reset_flows();
        flow
    }

    /// True iff every pair of distinct vertices is joined by at least three
    /// edge-disjoint constraint paths.
    pub fn triconnected(&mut self) -> bool {
        let ids: Vec<ElementId> = self.vertices.iter().map(|v| v.id).collect();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if self.max_flow(ids[i], ids[j]) < 3 {
                    return false;
                }
            }
        }
        true
    }

    /// First vertex pair whose removal disconnects the graph, scanning pairs
    /// in insertion order. `None` means the graph is triconnected.
    pub fn separating_vertices(&mut self) -> Option<(ElementId, ElementId)> {
        let ids: Vec<ElementId> = self.vertices.iter().map(|v| v.id).collect();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                // Marking the pair explored masks it out of the flood fill.
                if let Some(v) = self.find_vertex_mut(ids[i]) {
                    v.explored = true;
                }
                if let Some(v) = self.find_vertex_mut(ids[j]) {
                    v.explored = true;
                }
                let connected = self.connected();
                if !connected {
                    return Some((ids[i], ids[j]));
                }
            }
        }
        None
    }

    /// Split the graph at a separating pair into the two sub-graphs it
    /// separates.
    ///
    /// Each sub-graph keeps one side of the partition plus fresh copies of
    /// `a` and `b`, re-connected to exactly those incident edges whose far
    /// endpoint survives on that side. An edge joining `a` and `b` directly
    /// ends up in the first sub-graph only.
    pub fn split_graphs(&self, a: ElementId, b: ElementId) -> (ConstraintGraph, ConstraintGraph) {
        let mut g1 = self.deep_copy();
        g1.delete_vertex(a);
        g1.delete_vertex(b);
        let start = g1.vertices.first().map(|v| v.id);
        if let Some(start) = start {
            g1.flood_fill(start);
        }
        let explored: HashSet<ElementId> = g1
            .vertices
            .iter()
            .filter(|v| v.explored)
            .map(|v| v.id)
            .collect();
        let mut g2 = g1.deep_copy();

        let reached: Vec<ElementId> = explored.iter().copied().collect();
        for id in &reached {
            g1.delete_vertex(*id);
        }
        let unreached: Vec<ElementId> = g2
            .vertices
            .iter()
            .map(|v| v.id)
            .filter(|id| !explored.contains(id))
            .collect();
        for id in &unreached {
            g2.delete_vertex(*id);
        }

        let (Some(va), Some(vb)) = (self.find_vertex(a), self.find_vertex(b)) else {
            return (g1, g2);
        };

        g1.add_vertex(va.detached());
        g1.add_vertex(vb.detached());
        for (cid, other) in &va.adjacency {
            if g1.contains(*other) {
                if let Some(edge) = self.find_edge(*cid) {
                    g1.connect(a, *other, edge.detached());
                }
            }
        }
        for (cid, other) in &vb.adjacency {
            if *other != a && g1.contains(*other) {
                if let Some(edge) = self.find_edge(*cid) {
                    g1.connect(b, *other, edge.detached());
                }
            }
        }

        g2.add_vertex(va.detached());
        g2.add_vertex(vb.detached());
        for (cid, other) in &va.adjacency {
            if *other != b && g2.contains(*other) {
                if let Some(edge) = self.find_edge(*cid) {
                    g2.connect(a, *other, edge.detached());
                }
            }
        }
        for (cid, other) in &vb.adjacency {
            if *other != a && g2.contains(*other) {
                if let Some(edge) = self.find_edge(*cid) {
                    g2.connect(b, *other, edge.detached());
                }
            }
        }

        g1.reset_exploration();
        g2.reset_exploration();
        (g1, g2)
    }
}
