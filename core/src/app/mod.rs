//! The application: one process-wide instance owning the sketch, the scene,
//! the event queue and the mode stack, constructed at startup and handed by
//! `&mut` into every handler that needs it.

#[cfg(test)]
mod tests_replay;

use crate::adapters::{
    CadKernel, InputSource, KernelResult, NullKernel, NullRenderer, Renderer, TriangleMesh,
};
use crate::event::{AppEvent, EventQueue, HistoryError, ReplayReport};
use crate::id::ElementId;
use crate::mode::{handler, ModeContext, ModeId, ModeStack};
use crate::scene::ParametricScene;
use crate::sketch::Sketch;
use nalgebra::{Point2, Point3};
use serde_json::Value;
use tracing::{info, warn};

/// Mutable state shared by the event and input handlers.
#[derive(Debug)]
pub struct ApplicationState {
    pub sketch: Sketch,
    pub scene: ParametricScene,

    pub holding_rotate: bool,
    pub sketch_mode_active: bool,
    pub zoom: f64,
    pub selection_threshold: f64,

    /// Plane hits gathered by actions that need several, e.g. drawing a
    /// scene line.
    pub active_points: Vec<Point3<f64>>,
    /// Sketch-plane clicks gathered while drawing a trimmed line.
    pub active_coordinates: Vec<Point2<f64>>,
    /// Currently selected sketch entities, in click order.
    pub active_entities: Vec<ElementId>,

    /// Dimension value being typed, with its cursor position.
    pub pending_dimension: String,
    pub pending_dim_cursor: usize,

    pub editing_sketch_id: i32,
    pub should_exit: bool,
}

impl Default for ApplicationState {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationState {
    pub fn new() -> Self {
        Self {
            sketch: Sketch::new(),
            scene: ParametricScene::new(),
            holding_rotate: false,
            sketch_mode_active: false,
            zoom: 1.0,
            selection_threshold: 0.6,
            active_points: Vec::new(),
            active_coordinates: Vec::new(),
            active_entities: Vec::new(),
            pending_dimension: String::new(),
            pending_dim_cursor: 0,
            editing_sketch_id: 0,
            should_exit: false,
        }
    }

    /// Replace the selection with a single entity.
    pub fn set_active(&mut self, id: ElementId) {
        self.active_entities.clear();
        self.active_entities.push(id);
    }

    /// Extend the selection (shift-click).
    pub fn add_active(&mut self, id: ElementId) {
        if !self.active_entities.contains(&id) {
            self.active_entities.push(id);
        }
    }

    pub fn clear_active(&mut self) {
        self.active_entities.clear();
    }
}

/// Owns the state, the queue, the mode stack and the external adapters, and
/// drives them through the cooperative main loop: poll input, drain events,
/// present a frame.
pub struct Application {
    pub state: ApplicationState,
    pub queue: EventQueue,
    pub mode_stack: ModeStack,
    renderer: Box<dyn Renderer>,
    kernel: Box<dyn CadKernel>,
    last_mouse: [f64; 2],
    last_shift: bool,
}

impl Application {
    pub fn new(renderer: Box<dyn Renderer>, kernel: Box<dyn CadKernel>) -> Self {
        let mut mode_stack = ModeStack::new();
        mode_stack.push(ModeId::Global);
        Self {
            state: ApplicationState::new(),
            queue: EventQueue::new(),
            mode_stack,
            renderer,
            kernel,
            last_mouse: [0.0, 0.0],
            last_shift: false,
        }
    }

    /// An application wired to inert adapters, for tests and the headless
    /// shell.
    pub fn headless() -> Self {
        Self::new(Box::new(NullRenderer), Box::new(NullKernel::default()))
    }

    pub fn post_event(&mut self, event: AppEvent) {
        self.queue.post_event(event);
    }

    /// Offer an event to the modes, innermost first; the first consumer
    /// wins. The global mode at the bottom handles whatever is left over.
    pub fn process_event(&mut self, event: &AppEvent) {
        for id in self.mode_stack.snapshot() {
            let mut ctx = ModeContext {
                state: &mut self.state,
                queue: &mut self.queue,
                stack: &mut self.mode_stack,
                mouse: self.last_mouse,
                shift_down: self.last_shift,
            };
            if handler(id).process_event(event, &mut ctx) {
                break;
            }
        }
    }

    /// One frame: poll input through the mode stack, drain the event queue
    /// (events posted while draining are handled in the same frame), then
    /// hand the scene to the renderer.
    pub fn update(&mut self, input: &mut dyn InputSource) {
        let frame = self
            .mode_stack
            .update(input, &mut self.state, &mut self.queue);
        self.last_mouse = frame.mouse_pos;
        self.last_shift = frame.shift_down;

        while !self.queue.empty() {
            let event = self.queue.pop();
            self.process_event(&event);
        }

        let points = self.state.scene.rasterize_points();
        let lines = self.state.scene.rasterize_shapes();
        self.renderer.present(&points, &lines);
    }

    /// Run frames until an exit is requested or `max_frames` have elapsed.
    pub fn run(&mut self, input: &mut dyn InputSource, max_frames: usize) {
        for _ in 0..max_frames {
            if self.state.should_exit {
                break;
            }
            self.update(input);
        }
    }

    /// Load a persisted history payload and replay it into the current
    /// state. Malformed entries are skipped and summarised in the report.
    pub fn load_history(&mut self, payload: &Value) -> Result<ReplayReport, HistoryError> {
        let report = self.queue.deserialize_history(payload)?;
        if !report.skipped.is_empty() {
            warn!(
                loaded = report.loaded,
                skipped = report.skipped.len(),
                "history loaded with skipped entries"
            );
        }
        self.replay_history();
        Ok(report)
    }

    /// Re-process every recorded event in order. Events posted as side
    /// effects of the replay are dropped afterwards; their causes are
    /// already part of the history.
    pub fn replay_history(&mut self) -> usize {
        self.queue.begin_replay();
        self.queue.reset_history_index();
        let mut replayed = 0;
        while let Some(event) = self.queue.next_history_event() {
            self.process_event(&event);
            replayed += 1;
        }
        self.queue.end_replay();
        info!(replayed, "history replayed");
        replayed
    }

    /// Snapshot of the replayable history.
    pub fn save_history(&self) -> Value {
        self.queue.serialize_history()
    }

    /// Push the scene's line segments through the kernel: wire, extrusion,
    /// triangulation.
    pub fn extrude_scene(&mut self, height: f64) -> KernelResult<TriangleMesh> {
        let mut points = Vec::new();
        let mut segments = Vec::new();
        for line in self.state.scene.lines() {
            points.push(line.start);
            points.push(line.end);
            segments.push((points.len() - 2, points.len() - 1));
        }
        let wire = self.kernel.realise_wire(&points, &segments)?;
        let solid = self.kernel.extrude(wire, height)?;
        self.kernel.triangulate(solid)
    }
}
