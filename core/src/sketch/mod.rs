pub mod solver;
pub mod types;


use crate::graph::{analyze, Constraint, ConstraintGraph, GeometricElement, GeometricKind, STree};
use crate::id::{ConstraintId, ElementId};
use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{info, warn};

use solver::{Realisation, SolveError, DEFAULT_ITERATIONS, DEFAULT_SEED, DEFAULT_TOLERANCE};
pub use types::{GuidedEntity, SketchEntity, SketchLine, SketchPoint, TrimmedLine};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SketchError {
    #[error("unknown entity {0}")]
    MissingEntity(ElementId),
    #[error("entity {0} has the wrong kind for this operation")]
    WrongKind(ElementId),
}

/// The parametric sketch: entities, derived geometry and the constraint
/// graph that ties them together.
#[derive(Debug)]
pub struct Sketch {
    pub entities: Vec<SketchEntity>,
    pub guided: Vec<GuidedEntity>,
    graph: ConstraintGraph,
    rng: StdRng,
    pub iterations: usize,
    pub tolerance: f64,
}

impl Default for Sketch {
    fn default() -> Self {
        Self::new()
    }
}

impl Sketch {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            entities: Vec::new(),
            guided: Vec::new(),
            graph: ConstraintGraph::new(),
            rng: StdRng::seed_from_u64(seed),
            iterations: DEFAULT_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Add a point at a uniformly random position in the unit square.
    pub fn add_point(&mut self) -> ElementId {
        let pos = Point2::new(self.rng.gen::<f64>(), self.rng.gen::<f64>());
        self.add_point_at(pos)
    }

    pub fn add_point_at(&mut self, pos: Point2<f64>) -> ElementId {
        let element = GeometricElement::new(GeometricKind::Point);
        let id = self.graph.add_vertex(element);
        self.entities.push(SketchEntity::Point(SketchPoint {
            element: id,
            pos,
            fixed: false,
            draw: true,
        }));
        id
    }

    pub fn add_line(&mut self, k: f64, m: f64) -> ElementId {
        let element = GeometricElement::new(GeometricKind::Line);
        let id = self.graph.add_vertex(element);
        self.entities.push(SketchEntity::Line(SketchLine {
            element: id,
            k,
            m,
            draw: true,
        }));
        id
    }

    /// Register a trimmed line over two existing points and an existing line.
    pub fn add_trimmed_line(
        &mut self,
        start: ElementId,
        end: ElementId,
        line: ElementId,
    ) -> Result<(), SketchError> {
        for id in [start, end] {
            match self.find_entity(id) {
                None => return Err(SketchError::MissingEntity(id)),
                Some(SketchEntity::Line(_)) => return Err(SketchError::WrongKind(id)),
                Some(SketchEntity::Point(_)) => {}
            }
        }
        match self.find_entity(line) {
            None => return Err(SketchError::MissingEntity(line)),
            Some(SketchEntity::Point(_)) => return Err(SketchError::WrongKind(line)),
            Some(SketchEntity::Line(_)) => {}
        }
        self.guided
            .push(GuidedEntity::TrimmedLine(TrimmedLine { start, end, line }));
        Ok(())
    }

    /// Constrain two entities. Both must be present in the sketch.
    pub fn connect(
        &mut self,
        a: ElementId,
        b: ElementId,
        c: Constraint,
    ) -> Result<ConstraintId, SketchError> {
        if self.find_entity(a).is_none() {
            return Err(SketchError::MissingEntity(a));
        }
        if self.find_entity(b).is_none() {
            return Err(SketchError::MissingEntity(b));
        }
        Ok(self.graph.connect(a, b, c))
    }

    /// Remove an entity, every constraint touching it, and any guided
    /// geometry that referenced it.
    pub fn delete_entity(&mut self, id: ElementId) -> Result<(), SketchError> {
        if self.find_entity(id).is_none() {
            return Err(SketchError::MissingEntity(id));
        }
        self.entities.retain(|e| e.element() != id);
        self.guided.retain(|g| !g.references().contains(&id));
        self.graph.delete_vertex(id);
        Ok(())
    }

    pub fn set_fixed(&mut self, id: ElementId, fixed: bool) -> Result<(), SketchError> {
        match self.find_entity_mut(id) {
            Some(SketchEntity::Point(p)) => {
                p.fixed = fixed;
                Ok(())
            }
            Some(SketchEntity::Line(_)) => Err(SketchError::WrongKind(id)),
            None => Err(SketchError::MissingEntity(id)),
        }
    }

    /// Show or hide an entity. Hidden entities still take part in solving.
    pub fn set_draw(&mut self, id: ElementId, draw: bool) {
        match self.find_entity_mut(id) {
            Some(SketchEntity::Point(p)) => p.draw = draw,
            Some(SketchEntity::Line(l)) => l.draw = draw,
            None => {}
        }
    }

    pub fn find_entity(&self, id: ElementId) -> Option<&SketchEntity> {
        self.entities.iter().find(|e| e.element() == id)
    }

    pub fn find_entity_mut(&mut self, id: ElementId) -> Option<&mut SketchEntity> {
        self.entities.iter_mut().find(|e| e.element() == id)
    }

    /// The entity with the highest selection priority within the squared
    /// threshold distance of `pos`. Ties go to the earliest insertion.
    pub fn find_entity_by_position(
        &self,
        pos: Point2<f64>,
        threshold_sq: f64,
    ) -> Option<&SketchEntity> {
        let mut best: Option<&SketchEntity> = None;
        for entity in &self.entities {
            if entity.distance_sq(pos) >= threshold_sq {
                continue;
            }
            let better = match best {
                None => true,
                Some(current) => entity.selection_priority() > current.selection_priority(),
            };
            if better {
                best = Some(entity);
            }
        }
        best
    }

    /// Constraints currently attached to the sketch.
    pub fn constraints(&self) -> &[Constraint] {
        &self.graph.edges
    }

    /// A fresh constraint graph mirroring the sketch's connectivity.
    pub fn as_graph(&self) -> ConstraintGraph {
        self.graph.deep_copy()
    }

    /// Solve the sketch: decompose the constraint graph into an S-tree, run
    /// the realiser leaves-first with converged child coordinates seeding
    /// each parent, and copy the root realisation back into the entities if
    /// it converged. On failure the sketch geometry is left untouched.
    pub fn solve(&mut self) -> Result<f64, SolveError> {
        let tree = analyze(self.graph.deep_copy())?;

        // Breadth-first schedule; children remember their parent's slot.
        let mut schedule: Vec<(&STree, Option<usize>)> = Vec::new();
        let mut queue: VecDeque<(&STree, Option<usize>)> = VecDeque::new();
        queue.push_back((&tree, None));
        while let Some((node, parent)) = queue.pop_front() {
            let index = schedule.len();
            schedule.push((node, parent));
            if let Some(left) = &node.left {
                queue.push_back((left.as_ref(), Some(index)));
            }
            if let Some(right) = &node.right {
                queue.push_back((right.as_ref(), Some(index)));
            }
        }

        let mut realisations: Vec<Realisation> = Vec::with_capacity(schedule.len());
        for (node, _) in &schedule {
            let mut realisation = Realisation::new(node.graph.deep_copy(), &mut self.rng);
            realisation.seed_from_sketch(self);
            realisations.push(realisation);
        }

        let mut root_residual = 0.0;
        for i in (0..realisations.len()).rev() {
            let err = realisations[i].solve(self.iterations);
            if i == 0 {
                root_residual = err;
            }
            if let Some(parent) = schedule[i].1 {
                let positions = realisations[i].positions();
                realisations[parent].adopt(&positions);
            }
        }

        if root_residual < self.tolerance {
            for (id, coords) in realisations[0].positions() {
                match self.find_entity_mut(id) {
                    Some(SketchEntity::Point(p)) => {
                        p.pos = Point2::new(coords.x, coords.y);
                    }
                    Some(SketchEntity::Line(l)) => {
                        l.k = coords.x;
                        l.m = coords.y;
                    }
                    None => {}
                }
            }
            info!(residual = root_residual, clusters = schedule.len(), "sketch solved");
            Ok(root_residual)
        } else {
            warn!(
                residual = root_residual,
                tolerance = self.tolerance,
                "sketch failed to converge"
            );
            Err(SolveError::NotConverged {
                residual: root_residual,
                tolerance: self.tolerance,
            })
        }
    }
}
