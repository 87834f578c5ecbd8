//! Recursive decomposition of a constraint graph into a tree of maximally
//! rigid sub-clusters, after Joan-Arinyo, Soto-Riera, Vila-Marta &
//! Vilaplana-Pasto.

use super::types::ConstraintGraph;
use thiserror::Error;
use tracing::debug;

/// Binary decomposition tree. Every node owns the cluster it was split from;
/// leaves are clusters the analyser treats as atomically solvable.
#[derive(Debug, Default)]
pub struct STree {
    pub graph: ConstraintGraph,
    pub left: Option<Box<STree>>,
    pub right: Option<Box<STree>>,
}

impl STree {
    pub fn leaf(graph: ConstraintGraph) -> Self {
        Self {
            graph,
            left: None,
            right: None,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }

    /// 1 + the maximum child depth; absent children contribute 0.
    pub fn depth(&self) -> usize {
        let left = self.left.as_ref().map(|t| t.depth()).unwrap_or(0);
        let right = self.right.as_ref().map(|t| t.depth()).unwrap_or(0);
        left.max(right) + 1
    }

    /// Total number of nodes in the tree.
    pub fn size(&self) -> usize {
        let left = self.left.as_ref().map(|t| t.size()).unwrap_or(0);
        let right = self.right.as_ref().map(|t| t.size()).unwrap_or(0);
        left + right + 1
    }

    /// Leaves in left-to-right order.
    pub fn leaves(&self) -> Vec<&STree> {
        let mut out = Vec::new();
        self.collect_leaves(&mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, out: &mut Vec<&'a STree>) {
        if self.is_leaf() {
            out.push(self);
            return;
        }
        if let Some(left) = &self.left {
            left.collect_leaves(out);
        }
        if let Some(right) = &self.right {
            right.collect_leaves(out);
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StructureError {
    /// The graph is not triconnected yet no vertex pair disconnects it; the
    /// connectivity bookkeeping must be corrupt.
    #[error("no separating pair found in a non-triconnected graph of {vertices} vertices")]
    NoSeparatingPair { vertices: usize },
    /// The deficits of a split do not add up to the parent's, meaning the
    /// edge bookkeeping was corrupted somewhere along the way.
    #[error("deficit mismatch after split: {left} + {right} != {parent}")]
    DeficitMismatch {
        left: i64,
        right: i64,
        parent: i64,
    },
}

/// Decompose `graph` into an S-tree.
///
/// A cluster that is triconnected, or small enough to be trivially rigid,
/// becomes a leaf. Anything else is split at a separating pair; the side
/// that is currently more under-constrained receives a virtual edge standing
/// in for the rigidity its sibling will provide.
pub fn analyze(graph: ConstraintGraph) -> Result<STree, StructureError> {
    let mut graph = graph;
    if graph.vertices.len() <= 3 || graph.triconnected() {
        return Ok(STree::leaf(graph));
    }

    let (a, b) = graph
        .separating_vertices()
        .ok_or(StructureError::NoSeparatingPair {
            vertices: graph.vertices.len(),
        })?;
    let (mut g1, mut g2) = graph.split_graphs(a, b);
    if g1.deficit() > g2.deficit() {
        g1.add_virtual_edge(a, b);
    } else {
        g2.add_virtual_edge(a, b);
    }

    let (left, right, parent) = (g1.deficit(), g2.deficit(), graph.deficit());
    debug_assert_eq!(
        left + right,
        parent,
        "deficit mismatch splitting at ({a}, {b})"
    );
    if left + right != parent {
        return Err(StructureError::DeficitMismatch {
            left,
            right,
            parent,
        });
    }
    debug!(
        pair_a = %a,
        pair_b = %b,
        left_vertices = g1.vertices.len(),
        right_vertices = g2.vertices.len(),
        "split cluster"
    );

    Ok(STree {
        graph,
        left: Some(Box::new(analyze(g1)?)),
        right: Some(Box::new(analyze(g2)?)),
    })
}
