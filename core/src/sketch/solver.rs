//! Numeric realisation of a rigid cluster.
//!
//! Every vertex of a cluster owns two scalar coordinates: a point's are its
//! (x, y) position, a line's are its (k, m) slope and intercept. The solver
//! runs plain stochastic gradient descent on the sum of squared constraint
//! residuals over those coordinates.

use super::Sketch;
use crate::graph::{Constraint, ConstraintGraph, ConstraintType, GeometricKind};
use crate::id::ElementId;
use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::Rng;
use thiserror::Error;

use crate::graph::StructureError;

pub const DEFAULT_STEP_SIZE: f64 = 0.02;
pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_TOLERANCE: f64 = 1e-4;
/// Mini-batch divisor for the gradient accumulation.
pub const BATCH_SIZE: usize = 1;

/// Seed for the process-deterministic placement of fresh points.
pub const DEFAULT_SEED: u64 = 1337;

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("constraint graph could not be decomposed: {0}")]
    Structure(#[from] StructureError),
    #[error("no realisation: mean residual {residual} stayed above {tolerance}")]
    NotConverged { residual: f64, tolerance: f64 },
}

/// One cluster vertex paired with its two solved coordinates.
#[derive(Debug, Clone)]
pub struct RealisedPoint {
    pub element: ElementId,
    pub kind: GeometricKind,
    /// (x, y) for a point, (k, m) for a line.
    pub coords: Vector2<f64>,
    pub fixed: bool,
}

/// A transient numeric snapshot of one cluster: the cluster graph plus a
/// coordinate pair per vertex. Mutated only by gradient steps.
#[derive(Debug)]
pub struct Realisation {
    graph: ConstraintGraph,
    pub points: Vec<RealisedPoint>,
    step_size: f64,
}

impl Realisation {
    /// Build a realisation over `graph`, placing every vertex uniformly at
    /// random in the unit square.
    pub fn new(graph: ConstraintGraph, rng: &mut StdRng) -> Self {
        let points = graph
            .vertices
            .iter()
            .map(|v| RealisedPoint {
                element: v.id,
                kind: v.kind,
                coords: Vector2::new(rng.gen::<f64>(), rng.gen::<f64>()),
                fixed: false,
            })
            .collect();
        Self {
            graph,
            points,
            step_size: DEFAULT_STEP_SIZE,
        }
    }

    /// Overwrite initial conditions from the sketch's current geometry.
    pub fn seed_from_sketch(&mut self, sketch: &Sketch) {
        for p in &mut self.points {
            match sketch.find_entity(p.element) {
                Some(super::types::SketchEntity::Point(sp)) => {
                    p.coords = Vector2::new(sp.pos.x, sp.pos.y);
                    p.fixed = sp.fixed;
                }
                Some(super::types::SketchEntity::Line(sl)) => {
                    p.coords = Vector2::new(sl.k, sl.m);
                }
                None => {}
            }
        }
    }

    pub fn find_point(&self, id: ElementId) -> Option<&RealisedPoint> {
        self.points.iter().find(|p| p.element == id)
    }

    /// Current coordinates, in vertex order.
    pub fn positions(&self) -> Vec<(ElementId, Vector2<f64>)> {
        self.points.iter().map(|p| (p.element, p.coords)).collect()
    }

    /// Copy coordinates for matching vertices; unknown ids are ignored. Used
    /// to seed a parent cluster from its solved children.
    pub fn adopt(&mut self, positions: &[(ElementId, Vector2<f64>)]) {
        for (id, coords) in positions {
            if let Some(p) = self.points.iter_mut().find(|p| p.element == *id) {
                p.coords = *coords;
            }
        }
    }

    /// One gradient step over every constraint. Returns the mean residual
    /// across all constraint evaluations for convergence monitoring.
    ///
    /// Each edge is visited once from each endpoint and applies only the
    /// gradient belonging to that endpoint, so multi-edges accumulate once
    /// per constraint and fixed endpoints are never double-counted.
    pub fn sgd_step(&mut self) -> f64 {
        let mut step = vec![Vector2::zeros(); self.points.len()];
        let mut err = 0.0;
        let mut evaluated = 0usize;

        for _ in 0..BATCH_SIZE {
            for (i, p) in self.points.iter().enumerate() {
                let Some(vertex) = self.graph.find_vertex(p.element) else {
                    continue;
                };
                for (cid, other_id) in &vertex.adjacency {
                    let Some(edge) = self.graph.find_edge(*cid) else {
                        continue;
                    };
                    let Some(other) = self.find_point(*other_id) else {
                        continue;
                    };
                    err += residual(p, other, edge);
                    let (own, _) = gradient(p, other, edge);
                    step[i] -= own / BATCH_SIZE as f64;
                    evaluated += 1;
                }
            }
        }
        if evaluated > 0 {
            err /= evaluated as f64;
        }

        for (i, p) in self.points.iter_mut().enumerate() {
            if p.fixed {
                continue;
            }
            p.coords += step[i] * self.step_size;
        }

        err
    }

    /// Iterate gradient steps; returns the final mean residual.
    pub fn solve(&mut self, iterations: usize) -> f64 {
        let mut err = 0.0;
        for _ in 0..iterations {
            err = self.sgd_step();
        }
        err
    }

    /// Sum of residuals over every constraint, each evaluated once.
    pub fn total_error(&self) -> f64 {
        let mut err = 0.0;
        for v in &self.graph.vertices {
            for (cid, other_id) in &v.adjacency {
                // Visit each edge from its lexically first endpoint only.
                if *other_id < v.id {
                    continue;
                }
                let (Some(edge), Some(p), Some(q)) = (
                    self.graph.find_edge(*cid),
                    self.find_point(v.id),
                    self.find_point(*other_id),
                ) else {
                    continue;
                };
                err += residual(p, q, edge);
            }
        }
        err
    }
}

/// Residual of a single constraint evaluated between two realised vertices.
///
/// Relations with no numeric interpretation for the given pairing contribute
/// nothing; virtual edges always contribute nothing.
pub fn residual(a: &RealisedPoint, b: &RealisedPoint, c: &Constraint) -> f64 {
    match (a.kind, b.kind) {
        (GeometricKind::Point, GeometricKind::Point) => match c.ty {
            ConstraintType::Distance => {
                let d = (a.coords - b.coords).norm();
                (d - c.value).powi(2)
            }
            ConstraintType::Vertical => (a.coords.x - b.coords.x).powi(2),
            ConstraintType::Horizontal => (a.coords.y - b.coords.y).powi(2),
            ConstraintType::Coincident => (a.coords - b.coords).norm_squared(),
            _ => 0.0,
        },
        (GeometricKind::Point, GeometricKind::Line) => point_line_residual(a, b, c),
        (GeometricKind::Line, GeometricKind::Point) => point_line_residual(b, a, c),
        (GeometricKind::Line, GeometricKind::Line) => match c.ty {
            ConstraintType::Parallel => (a.coords.x - b.coords.x).powi(2),
            ConstraintType::Perpendicular => (a.coords.x * b.coords.x + 1.0).powi(2),
            _ => 0.0,
        },
    }
}

/// Gradient of [`residual`] with respect to each endpoint's coordinate pair.
/// Symmetric constraints produce equal-and-opposite contributions.
pub fn gradient(
    a: &RealisedPoint,
    b: &RealisedPoint,
    c: &Constraint,
) -> (Vector2<f64>, Vector2<f64>) {
    match (a.kind, b.kind) {
        (GeometricKind::Point, GeometricKind::Point) => match c.ty {
            ConstraintType::Distance => {
                let diff = a.coords - b.coords;
                let dist = diff.norm();
                if dist <= f64::EPSILON {
                    return (Vector2::zeros(), Vector2::zeros());
                }
                let g = diff * (2.0 * (dist - c.value) / dist);
                (g, -g)
            }
            ConstraintType::Vertical => {
                let g = Vector2::new(2.0 * (a.coords.x - b.coords.x), 0.0);
                (g, -g)
            }
            ConstraintType::Horizontal => {
                let g = Vector2::new(0.0, 2.0 * (a.coords.y - b.coords.y));
                (g, -g)
            }
            ConstraintType::Coincident => {
                let g = (a.coords - b.coords) * 2.0;
                (g, -g)
            }
            _ => (Vector2::zeros(), Vector2::zeros()),
        },
        (GeometricKind::Point, GeometricKind::Line) => point_line_gradient(a, b, c),
        (GeometricKind::Line, GeometricKind::Point) => {
            let (point, line) = point_line_gradient(b, a, c);
            (line, point)
        }
        (GeometricKind::Line, GeometricKind::Line) => match c.ty {
            ConstraintType::Parallel => {
                let g = Vector2::new(2.0 * (a.coords.x - b.coords.x), 0.0);
                (g, -g)
            }
            ConstraintType::Perpendicular => {
                let e = a.coords.x * b.coords.x + 1.0;
                (
                    Vector2::new(2.0 * e * b.coords.x, 0.0),
                    Vector2::new(2.0 * e * a.coords.x, 0.0),
                )
            }
            _ => (Vector2::zeros(), Vector2::zeros()),
        },
    }
}

fn point_line_residual(point: &RealisedPoint, line: &RealisedPoint, c: &Constraint) -> f64 {
    let (x, y) = (point.coords.x, point.coords.y);
    let (k, m) = (line.coords.x, line.coords.y);
    match c.ty {
        ConstraintType::Coincident => (k * x + m - y).powi(2),
        ConstraintType::Distance => {
            let q = (k * k + 1.0).sqrt();
            let d = (k * x - y + m).abs() / q;
            (d - c.value).powi(2)
        }
        _ => 0.0,
    }
}

/// Returns (gradient for the point's (x, y), gradient for the line's (k, m)).
fn point_line_gradient(
    point: &RealisedPoint,
    line: &RealisedPoint,
    c: &Constraint,
) -> (Vector2<f64>, Vector2<f64>) {
    let (x, y) = (point.coords.x, point.coords.y);
    let (k, m) = (line.coords.x, line.coords.y);
    match c.ty {
        ConstraintType::Coincident => {
            let e = k * x + m - y;
            (
                Vector2::new(2.0 * e * k, -2.0 * e),
                Vector2::new(2.0 * e * x, 2.0 * e),
            )
        }
        ConstraintType::Distance => {
            let u = k * x - y + m;
            let q = (k * k + 1.0).sqrt();
            let s = if u < 0.0 { -1.0 } else { 1.0 };
            let d = u.abs() / q;
            let e = 2.0 * (d - c.value);
            (
                Vector2::new(e * s * k / q, -e * s / q),
                Vector2::new(e * s * (x / q - u * k / (q * q * q)), e * s / q),
            )
        }
        _ => (Vector2::zeros(), Vector2::zeros()),
    }
}
