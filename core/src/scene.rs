//! The 3-D scene the renderer consumes: plain ordered stores of points and
//! line segments produced by sketch-plane interactions. The core publishes
//! snapshots on demand; how they are drawn is the renderer's business.

use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenePoint {
    pub id: u64,
    /// Which sketch the point was created in.
    pub sketch_id: i32,
    pub pos: Point3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneLine {
    pub id: u64,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

/// Snapshot forms handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterPoint {
    pub id: u64,
    pub pos: Point3<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterLine {
    pub id: u64,
    pub start: Point3<f64>,
    pub end: Point3<f64>,
}

#[derive(Debug, Default)]
pub struct ParametricScene {
    points: Vec<ScenePoint>,
    lines: Vec<SceneLine>,
    next_id: u64,
}

impl ParametricScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_point(&mut self, sketch_id: i32, pos: Point3<f64>) -> u64 {
        let id = self.bump_id();
        self.points.push(ScenePoint { id, sketch_id, pos });
        id
    }

    pub fn create_line(&mut self, start: Point3<f64>, end: Point3<f64>) -> u64 {
        let id = self.bump_id();
        self.lines.push(SceneLine { id, start, end });
        id
    }

    pub fn points(&self) -> &[ScenePoint] {
        &self.points
    }

    pub fn lines(&self) -> &[SceneLine] {
        &self.lines
    }

    pub fn rasterize_points(&self) -> Vec<RasterPoint> {
        self.points
            .iter()
            .map(|p| RasterPoint { id: p.id, pos: p.pos })
            .collect()
    }

    pub fn rasterize_shapes(&self) -> Vec<RasterLine> {
        self.lines
            .iter()
            .map(|l| RasterLine {
                id: l.id,
                start: l.start,
                end: l.end,
            })
            .collect()
    }

    pub fn dump_shapes(&self) {
        for p in &self.points {
            debug!(id = p.id, sketch = p.sketch_id, pos = ?p.pos, "scene point");
        }
        for l in &self.lines {
            debug!(id = l.id, start = ?l.start, end = ?l.end, "scene line");
        }
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.lines.clear();
    }

    fn bump_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}
