//! The concrete input modes. Key handlers translate bindings into events;
//! `process_event` handlers apply queued events to the application state.
//! Modes never observe each other's state.

use super::{Key, KeyPress, Mode, ModeContext, ModeId, MouseButton, MouseKeyPress};
use crate::event::AppEvent;
use crate::graph::{Constraint, ConstraintType};
use crate::sketch::SketchEntity;
use nalgebra::{Point2, Point3};
use tracing::warn;

/// Always at the bottom of the stack: global bindings and the application
/// level effects of mode toggles, camera, zoom and shutdown.
pub struct GlobalMode;

impl Mode for GlobalMode {
    fn id(&self) -> ModeId {
        ModeId::Global
    }

    fn process_event(&self, event: &AppEvent, ctx: &mut ModeContext<'_>) -> bool {
        match event {
            AppEvent::ToggleSketchMode => {
                ctx.stack.push(ModeId::Sketch);
                ctx.state.sketch_mode_active = true;
                return true;
            }
            AppEvent::EnableSketchMode => {
                ctx.stack.push(ModeId::Sketch);
                ctx.state.sketch_mode_active = true;
            }
            AppEvent::DisableSketchMode => {
                ctx.stack.exit(ModeId::Sketch);
                ctx.state.sketch_mode_active = false;
            }
            AppEvent::PopMode => {
                if ctx.stack.size() > 1 {
                    ctx.stack.pop();
                }
                ctx.state.sketch_mode_active = ctx.stack.is_active(ModeId::Sketch);
            }
            AppEvent::StartRotate => ctx.state.holding_rotate = true,
            AppEvent::StopRotate => ctx.state.holding_rotate = false,
            AppEvent::IncreaseZoom => ctx.state.zoom *= 1.25,
            AppEvent::DecreaseZoom => ctx.state.zoom /= 1.25,
            AppEvent::DumpShapes => ctx.state.scene.dump_shapes(),
            AppEvent::ExitProgram => ctx.state.should_exit = true,
            // Pane layout is the renderer's concern.
            AppEvent::SplitPaneHorizontally { .. }
            | AppEvent::SplitPaneVertically { .. }
            | AppEvent::CollapseBoundary { .. } => {}
            _ => {}
        }
        false
    }

    fn key_press(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        let mut consumed = true;
        match key.key {
            Key::H => ctx.queue.post_event(AppEvent::SplitPaneHorizontally {
                pos: ctx.mouse,
            }),
            Key::V => ctx.queue.post_event(AppEvent::SplitPaneVertically {
                pos: ctx.mouse,
            }),
            Key::D => ctx.queue.post_event(AppEvent::CollapseBoundary { pos: ctx.mouse }),
            Key::Space => ctx.queue.post_event(AppEvent::StartRotate),
            Key::S => ctx.queue.post_event(AppEvent::DumpShapes),
            Key::Q => ctx.queue.post_event(AppEvent::ExitProgram),
            Key::X => ctx.queue.post_event(AppEvent::IncreaseZoom),
            Key::Z => ctx.queue.post_event(AppEvent::DecreaseZoom),
            _ => consumed = false,
        }
        consumed
    }

    fn key_release(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match key.key {
            Key::Space => {
                ctx.queue.post_event(AppEvent::StopRotate);
                true
            }
            _ => false,
        }
    }
}

/// Sketch editing: child mode toggles, entity selection and constraint
/// application.
pub struct SketchMode;

impl Mode for SketchMode {
    fn id(&self) -> ModeId {
        ModeId::Sketch
    }

    fn process_event(&self, event: &AppEvent, ctx: &mut ModeContext<'_>) -> bool {
        match event {
            AppEvent::ToggleSketchMode => {
                ctx.stack.exit(ModeId::Sketch);
                ctx.state.sketch_mode_active = false;
                return true;
            }
            AppEvent::TogglePointMode => {
                ctx.stack.push(ModeId::Point);
                return true;
            }
            AppEvent::ToggleLineMode => {
                ctx.stack.push(ModeId::Line);
                return true;
            }
            AppEvent::ToggleTLineMode => {
                ctx.stack.push(ModeId::TLine);
                return true;
            }
            AppEvent::ToggleExtrudeMode => {
                ctx.stack.push(ModeId::Extrude);
                return true;
            }
            AppEvent::ToggleDimensionMode => {
                ctx.stack.push(ModeId::Dimension);
                return true;
            }
            AppEvent::SketchClick { x, y, zoom_scale } => {
                let pos = Point2::new(*x, *y);
                let threshold_sq = (20.0 / zoom_scale).powi(2);
                let clicked = ctx
                    .state
                    .sketch
                    .find_entity_by_position(pos, threshold_sq)
                    .map(SketchEntity::element);
                match clicked {
                    Some(id) if ctx.shift_down => ctx.state.add_active(id),
                    Some(id) => ctx.state.set_active(id),
                    None => ctx.state.clear_active(),
                }
                return true;
            }
            AppEvent::SketchConstrain { ty } => {
                self.apply_constraint(*ty, ctx);
            }
            AppEvent::ConfirmDimension => {
                if ctx.state.active_entities.len() == 2 {
                    let value = ctx.state.pending_dimension.parse::<f64>().unwrap_or(1.0);
                    let (a, b) = (ctx.state.active_entities[0], ctx.state.active_entities[1]);
                    let c = Constraint::with_value(ConstraintType::Distance, value);
                    match ctx.state.sketch.connect(a, b, c) {
                        Ok(_) => {
                            if let Err(err) = ctx.state.sketch.solve() {
                                warn!(%err, "sketch did not converge after dimensioning");
                            }
                        }
                        Err(err) => warn!(%err, "dimension references a missing entity"),
                    }
                    ctx.state.clear_active();
                    ctx.state.pending_dimension.clear();
                    ctx.state.pending_dim_cursor = 0;
                    ctx.stack.pop();
                }
            }
            _ => {}
        }
        false
    }

    fn key_press(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        let mut consumed = true;
        match key.key {
            Key::Escape => ctx.queue.post_event(AppEvent::PopMode),
            Key::L => ctx.queue.post_event(AppEvent::ToggleLineMode),
            Key::P => ctx.queue.post_event(AppEvent::TogglePointMode),
            Key::T => ctx.queue.post_event(AppEvent::ToggleTLineMode),
            Key::E => ctx.queue.post_event(AppEvent::ToggleExtrudeMode),
            Key::D => ctx.queue.post_event(AppEvent::ToggleDimensionMode),
            _ => consumed = false,
        }
        consumed
    }
}

impl SketchMode {
    fn apply_constraint(&self, ty: ConstraintType, ctx: &mut ModeContext<'_>) {
        match ty {
            ConstraintType::Horizontal | ConstraintType::Vertical | ConstraintType::Coincident => {
                if ctx.state.active_entities.len() == 2 {
                    let (a, b) = (ctx.state.active_entities[0], ctx.state.active_entities[1]);
                    match ctx.state.sketch.connect(a, b, Constraint::new(ty)) {
                        Ok(_) => {
                            if let Err(err) = ctx.state.sketch.solve() {
                                warn!(%err, "sketch did not converge after constraining");
                            }
                        }
                        Err(err) => warn!(%err, "constraint references a missing entity"),
                    }
                    ctx.state.clear_active();
                }
            }
            ConstraintType::Distance => {
                if ctx.state.active_entities.len() == 2 {
                    ctx.stack.push(ModeId::Dimension);
                }
            }
            // Angle, colinear, equal, midpoint, parallel and perpendicular
            // still need residual support before they can be applied here.
            _ => {}
        }
    }
}

/// Creates points: in the 3-D scene from plane hits, in the sketch from
/// clicks.
pub struct PointMode;

impl Mode for PointMode {
    fn id(&self) -> ModeId {
        ModeId::Point
    }

    fn process_event(&self, event: &AppEvent, ctx: &mut ModeContext<'_>) -> bool {
        match event {
            AppEvent::TogglePointMode => {
                ctx.stack.exit(ModeId::Point);
                return true;
            }
            AppEvent::SketchPlaneHit { x, y, z, .. } => {
                let sketch_id = ctx.state.editing_sketch_id;
                ctx.state.scene.create_point(sketch_id, Point3::new(*x, *y, *z));
                return true;
            }
            AppEvent::SketchClick { x, y, .. } => {
                ctx.state.sketch.add_point_at(Point2::new(*x, *y));
            }
            _ => {}
        }
        false
    }

    fn key_press(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match key.key {
            Key::Escape => {
                ctx.queue.post_event(AppEvent::PopMode);
                true
            }
            Key::P => true,
            _ => false,
        }
    }

    fn mouse_release(&self, button: MouseKeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match button.button {
            MouseButton::Left => {
                ctx.queue.post_event(AppEvent::TogglePointMode);
                true
            }
            _ => false,
        }
    }
}

/// Collects two plane hits into a scene line segment.
pub struct LineMode;

impl Mode for LineMode {
    fn id(&self) -> ModeId {
        ModeId::Line
    }

    fn process_event(&self, event: &AppEvent, ctx: &mut ModeContext<'_>) -> bool {
        match event {
            AppEvent::ToggleLineMode => {
                ctx.stack.exit(ModeId::Line);
                return true;
            }
            AppEvent::SketchPlaneHit { x, y, z, .. } => {
                // Snap to an existing scene point when the hit lands close
                // enough to one.
                let mut hit = Point3::new(*x, *y, *z);
                let threshold = ctx.state.selection_threshold;
                if let Some(snapped) = ctx
                    .state
                    .scene
                    .points()
                    .iter()
                    .find(|p| (p.pos - hit).norm() < threshold)
                {
                    hit = snapped.pos;
                }
                ctx.state.active_points.push(hit);
                if ctx.state.active_points.len() == 2 {
                    let start = ctx.state.active_points[0];
                    let end = ctx.state.active_points[1];
                    ctx.state.scene.create_line(start, end);
                    ctx.state.active_points.clear();
                    ctx.queue.post_event(AppEvent::ToggleLineMode);
                }
                return true;
            }
            _ => {}
        }
        false
    }

    fn key_press(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match key.key {
            Key::Escape => {
                ctx.queue.post_event(AppEvent::PopMode);
                true
            }
            Key::L => true,
            _ => false,
        }
    }
}

/// Collects two sketch clicks into a trimmed line: two hidden carrier points,
/// a hidden infinite line and the guided segment over them.
pub struct TLineMode;

impl Mode for TLineMode {
    fn id(&self) -> ModeId {
        ModeId::TLine
    }

    fn process_event(&self, event: &AppEvent, ctx: &mut ModeContext<'_>) -> bool {
        match event {
            AppEvent::ToggleTLineMode => {
                ctx.stack.exit(ModeId::TLine);
                return true;
            }
            AppEvent::SketchClick { x, y, .. } => {
                ctx.state.active_coordinates.push(Point2::new(*x, *y));
                if ctx.state.active_coordinates.len() == 2 {
                    let c0 = ctx.state.active_coordinates[0];
                    let c1 = ctx.state.active_coordinates[1];
                    let k = (c1.y - c0.y) / (c1.x - c0.x);
                    let m = -c0.x * k + c0.y;

                    let start = ctx.state.sketch.add_point_at(c0);
                    let end = ctx.state.sketch.add_point_at(c1);
                    let line = ctx.state.sketch.add_line(k, m);
                    ctx.state.sketch.set_draw(start, false);
                    ctx.state.sketch.set_draw(end, false);
                    ctx.state.sketch.set_draw(line, false);
                    if let Err(err) = ctx.state.sketch.add_trimmed_line(start, end, line) {
                        warn!(%err, "trimmed line references a missing entity");
                    }
                    ctx.state.active_coordinates.clear();
                    ctx.queue.post_event(AppEvent::PopMode);
                    return true;
                }
            }
            _ => {}
        }
        false
    }

    fn key_press(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match key.key {
            Key::Escape => {
                ctx.queue.post_event(AppEvent::PopMode);
                true
            }
            Key::T => true,
            _ => false,
        }
    }
}

/// Placeholder for face extrusion; the kernel call lives behind the
/// application's adapter.
pub struct ExtrudeMode;

impl Mode for ExtrudeMode {
    fn id(&self) -> ModeId {
        ModeId::Extrude
    }

    fn process_event(&self, event: &AppEvent, ctx: &mut ModeContext<'_>) -> bool {
        match event {
            AppEvent::ToggleExtrudeMode => {
                ctx.stack.exit(ModeId::Extrude);
                true
            }
            _ => false,
        }
    }

    fn key_press(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match key.key {
            Key::Escape => {
                ctx.queue.post_event(AppEvent::PopMode);
                true
            }
            Key::E => true,
            _ => false,
        }
    }
}

/// Text entry for a pending dimension value.
pub struct DimensionMode;

impl Mode for DimensionMode {
    fn id(&self) -> ModeId {
        ModeId::Dimension
    }

    fn process_event(&self, event: &AppEvent, ctx: &mut ModeContext<'_>) -> bool {
        match event {
            AppEvent::ToggleDimensionMode => {
                ctx.stack.exit(ModeId::Dimension);
                true
            }
            _ => false,
        }
    }

    fn key_press(&self, key: KeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match key.key {
            Key::Escape => {
                ctx.queue.post_event(AppEvent::PopMode);
                true
            }
            Key::Enter => {
                ctx.queue.post_event(AppEvent::ConfirmDimension);
                true
            }
            Key::Delete | Key::Backspace => {
                ctx.state.pending_dimension.pop();
                ctx.state.pending_dim_cursor = ctx
                    .state
                    .pending_dim_cursor
                    .min(ctx.state.pending_dimension.len());
                true
            }
            Key::Left => {
                ctx.state.pending_dim_cursor = ctx.state.pending_dim_cursor.saturating_sub(1);
                true
            }
            Key::Right => {
                ctx.state.pending_dim_cursor = (ctx.state.pending_dim_cursor + 1)
                    .min(ctx.state.pending_dimension.len());
                true
            }
            other => match other.to_char() {
                Some(c) => {
                    ctx.state.pending_dimension.push(c);
                    ctx.state.pending_dim_cursor = ctx.state.pending_dimension.len();
                    true
                }
                None => false,
            },
        }
    }

    fn mouse_release(&self, button: MouseKeyPress, ctx: &mut ModeContext<'_>) -> bool {
        match button.button {
            MouseButton::Left => {
                ctx.queue.post_event(AppEvent::ToggleDimensionMode);
                true
            }
            _ => false,
        }
    }
}
