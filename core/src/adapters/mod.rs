//! Interfaces to the world outside the core: the CAD kernel, the renderer
//! and the input device. The core only ever talks to these traits; the
//! defaults below are inert stand-ins used by tests and the headless shell.

use crate::mode::{KeyPress, MouseKeyPress};
use crate::scene::{RasterLine, RasterPoint};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum KernelError {
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),
    #[error("operation failed: {0}")]
    OperationFailed(String),
}

pub type KernelResult<T> = Result<T, KernelError>;

/// Opaque handles into the kernel's own object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WireHandle(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolidHandle(pub u64);

/// A triangulated shape ready for display.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<[u32; 3]>,
}

/// The solid-modelling kernel the core delegates to. Calls are synchronous
/// and never touch the constraint solver.
pub trait CadKernel {
    /// Assemble a closed 2-D wire from realised points and the segments
    /// joining them (as index pairs into `points`).
    fn realise_wire(
        &mut self,
        points: &[Point3<f64>],
        segments: &[(usize, usize)],
    ) -> KernelResult<WireHandle>;

    /// Extrude a planar face bounded by `wire` into a solid.
    fn extrude(&mut self, wire: WireHandle, height: f64) -> KernelResult<SolidHandle>;

    /// Triangulate a solid for display.
    fn triangulate(&mut self, solid: SolidHandle) -> KernelResult<TriangleMesh>;
}

/// Kernel that accepts everything and produces nothing.
#[derive(Debug, Default)]
pub struct NullKernel {
    next_handle: u64,
}

impl CadKernel for NullKernel {
    fn realise_wire(
        &mut self,
        _points: &[Point3<f64>],
        _segments: &[(usize, usize)],
    ) -> KernelResult<WireHandle> {
        self.next_handle += 1;
        Ok(WireHandle(self.next_handle))
    }

    fn extrude(&mut self, _wire: WireHandle, _height: f64) -> KernelResult<SolidHandle> {
        self.next_handle += 1;
        Ok(SolidHandle(self.next_handle))
    }

    fn triangulate(&mut self, _solid: SolidHandle) -> KernelResult<TriangleMesh> {
        Ok(TriangleMesh::default())
    }
}

/// Passive consumer of geometry snapshots.
pub trait Renderer {
    fn present(&mut self, points: &[RasterPoint], lines: &[RasterLine]);
}

/// Renderer that discards every frame.
#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn present(&mut self, _points: &[RasterPoint], _lines: &[RasterLine]) {}
}

/// Renderer that keeps the last frame, for assertions in tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub frames: usize,
    pub last_points: Vec<RasterPoint>,
    pub last_lines: Vec<RasterLine>,
}

impl Renderer for RecordingRenderer {
    fn present(&mut self, points: &[RasterPoint], lines: &[RasterLine]) {
        self.frames += 1;
        self.last_points = points.to_vec();
        self.last_lines = lines.to_vec();
    }
}

/// Everything that happened on the input device since the last poll.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    pub key_presses: Vec<KeyPress>,
    pub key_releases: Vec<KeyPress>,
    pub mouse_presses: Vec<MouseKeyPress>,
    pub mouse_releases: Vec<MouseKeyPress>,
    pub mouse_pos: [f64; 2],
    pub shift_down: bool,
}

/// Input device polled once per frame by the mode stack.
pub trait InputSource {
    fn poll(&mut self) -> InputFrame;
}

/// Input that replays a prepared list of frames, then goes quiet.
#[derive(Debug, Default)]
pub struct ScriptedInput {
    frames: std::collections::VecDeque<InputFrame>,
}

impl ScriptedInput {
    pub fn new(frames: Vec<InputFrame>) -> Self {
        Self {
            frames: frames.into(),
        }
    }

    pub fn push(&mut self, frame: InputFrame) {
        self.frames.push_back(frame);
    }

    pub fn exhausted(&self) -> bool {
        self.frames.is_empty()
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> InputFrame {
        self.frames.pop_front().unwrap_or_default()
    }
}
