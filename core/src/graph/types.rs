use crate::id::{ConstraintId, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// The relations a sketch can impose between two geometric elements.
///
/// `Virtual` edges are inserted by the decomposer to record a structural
/// rigidity assumption; they never correspond to user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConstraintType {
    Angle,
    Coincident,
    Colinear,
    Distance,
    Equal,
    Horizontal,
    Midpoint,
    Parallel,
    Perpendicular,
    Vertical,
    Virtual,
}

impl ConstraintType {
    /// Number of scalar equations this constraint contributes to a cluster.
    pub fn weight(self) -> u32 {
        match self {
            ConstraintType::Coincident => 2,
            ConstraintType::Virtual => 0,
            _ => 1,
        }
    }

    /// Weight used by the deficit bookkeeping of the decomposer.
    ///
    /// A virtual edge stands for the one distance the sibling cluster will
    /// pin down between the separating pair, so structurally it counts as a
    /// single equation even though it contributes nothing to the solver.
    pub(crate) fn structural_weight(self) -> i64 {
        match self {
            ConstraintType::Virtual => 1,
            other => i64::from(other.weight()),
        }
    }
}

/// A constraint edge of the graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraint {
    pub id: ConstraintId,
    pub ty: ConstraintType,
    pub label: String,
    /// Target value. Only meaningful for distance, angle and equal parameters.
    pub value: f64,
    /// Transient integer used by the max-flow search. Always reset to zero
    /// once the search finishes.
    #[serde(skip)]
    flow: i32,
}

impl Constraint {
    pub fn new(ty: ConstraintType) -> Self {
        Self {
            id: ConstraintId::next(),
            ty,
            label: String::new(),
            value: 0.0,
            flow: 0,
        }
    }

    pub fn labeled(ty: ConstraintType, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::new(ty)
        }
    }

    pub fn with_value(ty: ConstraintType, value: f64) -> Self {
        Self {
            value,
            ..Self::new(ty)
        }
    }

    pub fn weight(&self) -> u32 {
        self.ty.weight()
    }

    pub fn flow(&self) -> i32 {
        self.flow
    }

    pub(crate) fn set_flow(&mut self, flow: i32) {
        self.flow = flow;
    }

    /// A copy carrying the same id with the transient flow cleared.
    pub(crate) fn detached(&self) -> Self {
        Self {
            id: self.id,
            ty: self.ty,
            label: self.label.clone(),
            value: self.value,
            flow: 0,
        }
    }
}

/// What kind of geometry a vertex stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GeometricKind {
    Point,
    Line,
}

impl GeometricKind {
    /// Degrees of freedom: (x, y) for a point, (k, m) for a line y = kx + m.
    pub fn dof(self) -> u32 {
        2
    }
}

/// A vertex of the constraint graph.
///
/// Adjacency pairs every incident constraint with the id of the far
/// endpoint. Entries reference edges and vertices by id rather than by
/// pointer, which keeps the naturally cyclic graph free of ownership cycles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometricElement {
    pub id: ElementId,
    pub kind: GeometricKind,
    pub label: String,
    pub adjacency: Vec<(ConstraintId, ElementId)>,
    #[serde(skip)]
    pub(crate) explored: bool,
    #[serde(skip)]
    pub(crate) parent: Option<ElementId>,
    #[serde(skip)]
    pub(crate) parent_edge: Option<ConstraintId>,
}

impl GeometricElement {
    pub fn new(kind: GeometricKind) -> Self {
        Self {
            id: ElementId::next(),
            kind,
            label: String::new(),
            adjacency: Vec::new(),
            explored: false,
            parent: None,
            parent_edge: None,
        }
    }

    pub fn labeled(kind: GeometricKind, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::new(kind)
        }
    }

    /// Degrees of freedom contributed by this element.
    pub fn dof(&self) -> u32 {
        self.kind.dof()
    }

    pub fn is_connected_to(&self, other: ElementId) -> bool {
        self.adjacency.iter().any(|(_, v)| *v == other)
    }

    /// First constraint joining this element to `other`, if any.
    pub fn connection_to(&self, other: ElementId) -> Option<ConstraintId> {
        self.adjacency
            .iter()
            .find(|(_, v)| *v == other)
            .map(|(c, _)| *c)
    }

    fn delete_edges_to(&mut self, other: ElementId) {
        self.adjacency.retain(|(_, v)| *v != other);
    }

    /// A copy with the same id and kind but no connectivity or traversal
    /// state. Used when vertices are re-inserted into split sub-graphs.
    pub(crate) fn detached(&self) -> Self {
        Self {
            id: self.id,
            kind: self.kind,
            label: self.label.clone(),
            adjacency: Vec::new(),
            explored: false,
            parent: None,
            parent_edge: None,
        }
    }
}

/// Labelled undirected multigraph of geometric elements and constraints.
///
/// Invariant: a constraint with endpoints (u, v) appears exactly once in
/// `edges`, once in u's adjacency as `(c, v)` and once in v's adjacency as
/// `(c, u)`.
#[derive(Debug, Default)]
pub struct ConstraintGraph {
    pub vertices: Vec<GeometricElement>,
    pub edges: Vec<Constraint>,
}

impl ConstraintGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a vertex and return its id.
    pub fn add_vertex(&mut self, element: GeometricElement) -> ElementId {
        let id = element.id;
        self.vertices.push(element);
        id
    }

    /// Connect `a` and `b` with `c`. Both vertices must already be in the
    /// graph; multi-edges between the same pair are allowed.
    pub fn connect(&mut self, a: ElementId, b: ElementId, c: Constraint) -> ConstraintId {
        debug_assert!(self.contains(a), "connect: {a} is not in the graph");
        debug_assert!(self.contains(b), "connect: {b} is not in the graph");
        let cid = c.id;
        if let Some(v) = self.find_vertex_mut(a) {
            v.adjacency.push((cid, b));
        }
        if let Some(v) = self.find_vertex_mut(b) {
            v.adjacency.push((cid, a));
        }
        self.edges.push(c);
        cid
    }

    /// Insert a virtual edge between `a` and `b`.
    pub fn add_virtual_edge(&mut self, a: ElementId, b: ElementId) -> ConstraintId {
        self.connect(a, b, Constraint::new(ConstraintType::Virtual))
    }

    /// Remove a vertex together with every incident constraint. Afterwards no
    /// surviving vertex or edge references the deleted one.
    pub fn delete_vertex(&mut self, id: ElementId) {
        let Some(index) = self.index_of(id) else {
            return;
        };
        let removed = self.vertices.remove(index);
        for (cid, other) in &removed.adjacency {
            self.edges.retain(|e| e.id != *cid);
            if let Some(far) = self.find_vertex_mut(*other) {
                far.delete_edges_to(id);
            }
        }
    }

    /// Remaining degrees of freedom: 2|V| - 3 - sum of edge weights, with
    /// virtual edges counted by the rigidity they stand for.
    pub fn deficit(&self) -> i64 {
        2 * self.vertices.len() as i64
            - 3
            - self
                .edges
                .iter()
                .map(|e| e.ty.structural_weight())
                .sum::<i64>()
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.index_of(id).is_some()
    }

    pub fn adjacent(&self, a: ElementId, b: ElementId) -> bool {
        self.find_vertex(a)
            .map(|v| v.is_connected_to(b))
            .unwrap_or(false)
    }

    pub fn find_vertex(&self, id: ElementId) -> Option<&GeometricElement> {
        self.vertices.iter().find(|v| v.id == id)
    }

    pub fn find_vertex_mut(&mut self, id: ElementId) -> Option<&mut GeometricElement> {
        self.vertices.iter_mut().find(|v| v.id == id)
    }

    pub fn find_edge(&self, id: ConstraintId) -> Option<&Constraint> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn find_edge_mut(&mut self, id: ConstraintId) -> Option<&mut Constraint> {
        self.edges.iter_mut().find(|e| e.id == id)
    }

    fn index_of(&self, id: ElementId) -> Option<usize> {
        self.vertices.iter().position(|v| v.id == id)
    }

    /// A structurally identical graph whose vertices and constraints are
    /// fresh values carrying the original ids. Exploration flags, parent
    /// pointers and flows are reset.
    pub fn deep_copy(&self) -> ConstraintGraph {
        let mut out = ConstraintGraph::new();
        for v in &self.vertices {
            out.add_vertex(v.detached());
        }
        for v in &self.vertices {
            for (cid, other) in &v.adjacency {
                if out.find_edge(*cid).is_none() {
                    if let Some(edge) = self.find_edge(*cid) {
                        out.connect(v.id, *other, edge.detached());
                    }
                }
            }
        }
        out
    }

    /// Breadth-first flood from `start`, marking `explored` and recording
    /// `parent`/`parent_edge` on every reached vertex.
    pub(crate) fn flood_fill(&mut self, start: ElementId) {
        let mut queue = VecDeque::new();
        if let Some(v) = self.find_vertex_mut(start) {
            v.explored = true;
            queue.push_back(start);
        }
        while let Some(id) = queue.pop_front() {
            let adjacency = match self.find_vertex(id) {
                Some(v) => v.adjacency.clone(),
                None => continue,
            };
            for (cid, other) in adjacency {
                if let Some(far) = self.find_vertex_mut(other) {
                    if !far.explored {
                        far.explored = true;
                        far.parent = Some(id);
                        far.parent_edge = Some(cid);
                        queue.push_back(other);
                    }
                }
            }
        }
    }

    /// Whether one flood fill reaches every vertex. Vertices already marked
    /// `explored` act as a mask: they count as reached and block traversal,
    /// which is what the separating-pair search exploits. All exploration
    /// flags are cleared before returning.
    pub fn connected(&mut self) -> bool {
        let start = self.vertices.iter().find(|v| !v.explored).map(|v| v.id);
        if let Some(start) = start {
            self.flood_fill(start);
        }
        let all_explored = self.vertices.iter().all(|v| v.explored);
        self.reset_exploration();
        all_explored
    }

    /// Shortest path of constraints from `start` to `end`, skipping edges
    /// whose transient flow is non-zero. Exploration flags are cleared before
    /// returning.
    pub fn bfs(&mut self, start: ElementId, end: ElementId) -> Option<Vec<ConstraintId>> {
        let mut queue = VecDeque::new();
        if let Some(v) = self.find_vertex_mut(start) {
            v.explored = true;
            v.parent = None;
            v.parent_edge = None;
            queue.push_back(start);
        }
        let mut reached = false;
        while let Some(id) = queue.pop_front() {
            if id == end {
                reached = true;
                break;
            }
            let adjacency = match self.find_vertex(id) {
                Some(v) => v.adjacency.clone(),
                None => continue,
            };
            for (cid, other) in adjacency {
                let saturated = self.find_edge(cid).map(|e| e.flow() != 0).unwrap_or(true);
                if saturated {
                    continue;
                }
                if let Some(far) = self.find_vertex_mut(other) {
                    if !far.explored {
                        far.explored = true;
                        far.parent = Some(id);
                        far.parent_edge = Some(cid);
                        queue.push_back(other);
                    }
                }
            }
        }

        let mut path = None;
        if reached {
            let mut out = Vec::new();
            let mut current = end;
            let mut intact = true;
            while current != start {
                match self
                    .find_vertex(current)
                    .and_then(|v| v.parent_edge.zip(v.parent))
                {
                    Some((edge, parent)) => {
                        out.push(edge);
                        current = parent;
                    }
                    None => {
                        intact = false;
                        break;
                    }
                }
            }
            if intact {
                out.reverse();
                path = Some(out);
            }
        }
        self.reset_exploration();
        path
    }

    pub(crate) fn reset_exploration(&mut self) {
        for v in &mut self.vertices {
            v.explored = false;
        }
    }

    pub(crate) fn reset_flows(&mut self) {
        for e in &mut self.edges {
            e.set_flow(0);
        }
    }
}
