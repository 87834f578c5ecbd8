use crate::graph::GeometricKind;
use crate::id::ElementId;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A sketch point with concrete coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchPoint {
    pub element: ElementId,
    pub pos: Point2<f64>,
    /// Fixed points anchor the sketch; the solver never moves them.
    #[serde(default)]
    pub fixed: bool,
    /// Hidden helper geometry (e.g. the carriers of a trimmed line) is kept
    /// in the model but not drawn.
    #[serde(default = "default_draw")]
    pub draw: bool,
}

/// An infinite sketch line y = kx + m.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchLine {
    pub element: ElementId,
    pub k: f64,
    pub m: f64,
    #[serde(default = "default_draw")]
    pub draw: bool,
}

fn default_draw() -> bool {
    true
}

/// Directly solvable sketch geometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SketchEntity {
    Point(SketchPoint),
    Line(SketchLine),
}

impl SketchEntity {
    pub fn element(&self) -> ElementId {
        match self {
            SketchEntity::Point(p) => p.element,
            SketchEntity::Line(l) => l.element,
        }
    }

    pub fn kind(&self) -> GeometricKind {
        match self {
            SketchEntity::Point(_) => GeometricKind::Point,
            SketchEntity::Line(_) => GeometricKind::Line,
        }
    }

    /// Points win over lines when a click could hit both.
    pub fn selection_priority(&self) -> u8 {
        match self {
            SketchEntity::Point(_) => 2,
            SketchEntity::Line(_) => 1,
        }
    }

    /// Squared distance from `pos` to the entity.
    pub fn distance_sq(&self, pos: Point2<f64>) -> f64 {
        match self {
            SketchEntity::Point(p) => (pos - p.pos).norm_squared(),
            SketchEntity::Line(l) => {
                let d = (l.k * pos.x - pos.y + l.m) / (l.k * l.k + 1.0).sqrt();
                d * d
            }
        }
    }
}

/// A finite segment carried by two points and an underlying infinite line.
///
/// Guided geometry is drawn but never solved for directly; it follows the
/// entities it references, all of which must live in the same sketch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrimmedLine {
    pub start: ElementId,
    pub end: ElementId,
    pub line: ElementId,
}

/// Derived geometry driven by underlying entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuidedEntity {
    TrimmedLine(TrimmedLine),
}

impl GuidedEntity {
    /// Ids of the underlying entities this geometry is guided by.
    pub fn references(&self) -> Vec<ElementId> {
        match self {
            GuidedEntity::TrimmedLine(t) => vec![t.start, t.end, t.line],
        }
    }
}
