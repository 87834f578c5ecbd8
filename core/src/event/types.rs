use crate::graph::ConstraintType;
use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A picking ray reported by the viewport along with a plane hit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Point3<f64>,
    pub dir: Vector3<f64>,
}

/// Everything the application can be asked to do, as one closed sum.
///
/// Events serialise as `{"tag": <variant>, "data": <payload>}`. Variants
/// that only touch transient view state (camera, zoom, pane layout, debug
/// dumps, program exit) are excluded from the persisted history; see
/// [`AppEvent::is_serialisable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", content = "data", rename_all = "camelCase")]
pub enum AppEvent {
    EnableSketchMode,
    DisableSketchMode,
    ToggleSketchMode,
    PopMode,
    TogglePointMode,
    ToggleLineMode,
    ToggleTLineMode,
    ToggleExtrudeMode,
    ToggleDimensionMode,
    StartRotate,
    StopRotate,
    IncreaseZoom,
    DecreaseZoom,
    SplitPaneHorizontally {
        pos: [f64; 2],
    },
    SplitPaneVertically {
        pos: [f64; 2],
    },
    CollapseBoundary {
        pos: [f64; 2],
    },
    SketchPlaneHit {
        x: f64,
        y: f64,
        z: f64,
        ray: Ray,
    },
    #[serde(rename_all = "camelCase")]
    SketchClick {
        x: f64,
        y: f64,
        zoom_scale: f64,
    },
    SketchConstrain {
        #[serde(rename = "type")]
        ty: ConstraintType,
    },
    ConfirmDimension,
    DumpShapes,
    ExitProgram,
}

impl AppEvent {
    /// Whether this event belongs in the replayable history. The partition
    /// is static and complete: everything that only affects transient view
    /// state stays out.
    pub fn is_serialisable(&self) -> bool {
        !matches!(
            self,
            AppEvent::StartRotate
                | AppEvent::StopRotate
                | AppEvent::IncreaseZoom
                | AppEvent::DecreaseZoom
                | AppEvent::SplitPaneHorizontally { .. }
                | AppEvent::SplitPaneVertically { .. }
                | AppEvent::CollapseBoundary { .. }
                | AppEvent::DumpShapes
                | AppEvent::ExitProgram
        )
    }
}
