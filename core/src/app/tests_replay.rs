use super::Application;
use crate::adapters::{InputFrame, ScriptedInput};
use crate::event::{AppEvent, Ray};
use crate::graph::ConstraintType;
use crate::mode::{Key, KeyPress, ModeId};
use nalgebra::{Point3, Vector3};

fn hit(x: f64, y: f64, z: f64) -> AppEvent {
    AppEvent::SketchPlaneHit {
        x,
        y,
        z,
        ray: Ray {
            origin: Point3::new(x, y, z + 10.0),
            dir: Vector3::new(0.0, 0.0, -1.0),
        },
    }
}

fn drain(app: &mut Application) {
    while !app.queue.empty() {
        let event = app.queue.pop();
        app.process_event(&event);
    }
}

#[test]
fn sketch_mode_toggles_through_the_stack() {
    let mut app = Application::headless();
    assert_eq!(app.mode_stack.size(), 1);

    app.post_event(AppEvent::EnableSketchMode);
    drain(&mut app);
    assert!(app.mode_stack.is_active(ModeId::Sketch));
    assert!(app.state.sketch_mode_active);

    app.post_event(AppEvent::ToggleSketchMode);
    drain(&mut app);
    assert!(!app.mode_stack.is_active(ModeId::Sketch));
    assert!(!app.state.sketch_mode_active);
}

#[test]
fn pop_mode_never_removes_the_global_mode() {
    let mut app = Application::headless();
    app.post_event(AppEvent::PopMode);
    app.post_event(AppEvent::PopMode);
    drain(&mut app);
    assert_eq!(app.mode_stack.size(), 1);
    assert_eq!(app.mode_stack.peek(0), Some(ModeId::Global));
}

#[test]
fn plane_hits_in_point_mode_create_scene_points() {
    let mut app = Application::headless();
    app.post_event(AppEvent::EnableSketchMode);
    app.post_event(AppEvent::TogglePointMode);
    app.post_event(hit(1.0, 0.0, 0.0));
    app.post_event(hit(0.0, 2.0, 0.0));
    app.post_event(hit(0.0, 0.0, 3.0));
    drain(&mut app);

    let points = app.state.scene.rasterize_points();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0].pos, Point3::new(1.0, 0.0, 0.0));
    assert_eq!(points[1].pos, Point3::new(0.0, 2.0, 0.0));
    assert_eq!(points[2].pos, Point3::new(0.0, 0.0, 3.0));
}

#[test]
fn plane_hits_outside_point_mode_are_ignored() {
    let mut app = Application::headless();
    app.post_event(hit(1.0, 0.0, 0.0));
    drain(&mut app);
    assert!(app.state.scene.rasterize_points().is_empty());
}

#[test]
fn line_mode_joins_two_hits_into_a_segment() {
    let mut app = Application::headless();
    app.post_event(AppEvent::EnableSketchMode);
    app.post_event(AppEvent::ToggleLineMode);
    app.post_event(hit(0.0, 0.0, 0.0));
    app.post_event(hit(1.0, 1.0, 0.0));
    drain(&mut app);

    let lines = app.state.scene.rasterize_shapes();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].start, Point3::new(0.0, 0.0, 0.0));
    assert_eq!(lines[0].end, Point3::new(1.0, 1.0, 0.0));
    // Completing the line posted a toggle that closed the mode.
    assert!(!app.mode_stack.is_active(ModeId::Line));
}

#[test]
fn replayed_history_rebuilds_the_scene() {
    let mut app = Application::headless();
    app.post_event(AppEvent::EnableSketchMode);
    app.post_event(AppEvent::TogglePointMode);
    app.post_event(hit(1.0, 0.0, 0.0));
    app.post_event(hit(0.0, 2.0, 0.0));
    app.post_event(hit(0.0, 0.0, 3.0));
    drain(&mut app);

    let saved = app.save_history();
    let before = app.state.scene.rasterize_points();

    let mut restored = Application::headless();
    let report = restored
        .load_history(&saved)
        .expect("the payload should parse");
    assert_eq!(report.loaded, 5);
    assert!(report.skipped.is_empty());

    let after = restored.state.scene.rasterize_points();
    assert_eq!(after.len(), before.len());
    for (a, b) in before.iter().zip(after.iter()) {
        assert_eq!(a.pos, b.pos);
    }
}

#[test]
fn replay_does_not_grow_the_history() {
    let mut app = Application::headless();
    app.post_event(AppEvent::EnableSketchMode);
    app.post_event(AppEvent::ToggleLineMode);
    app.post_event(hit(0.0, 0.0, 0.0));
    app.post_event(hit(1.0, 1.0, 0.0));
    drain(&mut app);

    // The completed line posted a toggleLineMode of its own, which is part
    // of the recorded history.
    let saved = app.save_history();
    let recorded = app.queue.history_len();

    let mut restored = Application::headless();
    restored.load_history(&saved).expect("payload parses");
    assert_eq!(restored.queue.history_len(), recorded);
    assert_eq!(restored.state.scene.rasterize_shapes().len(), 1);

    // A second round trip is stable.
    let saved_again = restored.save_history();
    assert_eq!(saved, saved_again);
}

#[test]
fn selection_and_constraint_flow_through_events() {
    let mut app = Application::headless();
    let a = app.state.sketch.add_point_at(nalgebra::Point2::new(0.0, 0.0));
    let b = app.state.sketch.add_point_at(nalgebra::Point2::new(1.0, 0.5));
    app.state.sketch.set_fixed(a, true).unwrap();

    app.post_event(AppEvent::EnableSketchMode);
    drain(&mut app);

    // Click a, then shift-click b. The zoom keeps the pick radius tight
    // enough that each click only reaches its own point.
    app.post_event(AppEvent::SketchClick {
        x: 0.0,
        y: 0.0,
        zoom_scale: 40.0,
    });
    drain(&mut app);
    assert_eq!(app.state.active_entities, vec![a]);

    app.last_shift = true;
    app.post_event(AppEvent::SketchClick {
        x: 1.0,
        y: 0.5,
        zoom_scale: 40.0,
    });
    drain(&mut app);
    assert_eq!(app.state.active_entities, vec![a, b]);
    app.last_shift = false;

    app.post_event(AppEvent::SketchConstrain {
        ty: ConstraintType::Horizontal,
    });
    drain(&mut app);

    assert_eq!(app.state.sketch.constraints().len(), 1);
    assert_eq!(
        app.state.sketch.constraints()[0].ty,
        ConstraintType::Horizontal
    );
    assert!(app.state.active_entities.is_empty());
}

#[test]
fn constraints_referencing_deleted_entities_are_ignored() {
    let mut app = Application::headless();
    let a = app.state.sketch.add_point_at(nalgebra::Point2::new(0.0, 0.0));
    let b = app.state.sketch.add_point_at(nalgebra::Point2::new(1.0, 0.0));

    app.post_event(AppEvent::EnableSketchMode);
    drain(&mut app);

    app.state.active_entities = vec![a, b];
    app.state.sketch.delete_entity(b).unwrap();

    app.post_event(AppEvent::SketchConstrain {
        ty: ConstraintType::Vertical,
    });
    drain(&mut app);

    // The event is dropped without touching the sketch.
    assert!(app.state.sketch.constraints().is_empty());
}

#[test]
fn exit_program_raises_the_flag_observed_by_the_main_loop() {
    let mut app = Application::headless();
    let mut input = ScriptedInput::new(vec![InputFrame {
        key_presses: vec![KeyPress::plain(Key::Q)],
        ..InputFrame::default()
    }]);

    app.run(&mut input, 10);
    assert!(app.state.should_exit);
}

#[test]
fn frames_drain_events_posted_during_the_drain() {
    // The key press posts toggleLineMode; processing it pushes the mode in
    // the same frame.
    let mut app = Application::headless();
    app.post_event(AppEvent::EnableSketchMode);
    drain(&mut app);

    let mut input = ScriptedInput::new(vec![InputFrame {
        key_presses: vec![KeyPress::plain(Key::L)],
        ..InputFrame::default()
    }]);
    app.update(&mut input);

    assert!(app.mode_stack.is_active(ModeId::Line));
    assert!(app.queue.empty());
}

#[test]
fn dimension_flow_applies_the_typed_distance() {
    let mut app = Application::headless();
    let a = app.state.sketch.add_point_at(nalgebra::Point2::new(0.0, 0.0));
    let b = app.state.sketch.add_point_at(nalgebra::Point2::new(1.0, 0.0));
    app.state.sketch.set_fixed(a, true).unwrap();

    app.post_event(AppEvent::EnableSketchMode);
    drain(&mut app);

    app.state.active_entities = vec![a, b];
    app.post_event(AppEvent::SketchConstrain {
        ty: ConstraintType::Distance,
    });
    drain(&mut app);
    assert!(app.mode_stack.is_active(ModeId::Dimension));

    app.state.pending_dimension = "2".to_string();
    app.post_event(AppEvent::ConfirmDimension);
    drain(&mut app);

    assert!(!app.mode_stack.is_active(ModeId::Dimension));
    let constraints = app.state.sketch.constraints();
    assert_eq!(constraints.len(), 1);
    assert_eq!(constraints[0].ty, ConstraintType::Distance);
    assert!((constraints[0].value - 2.0).abs() < 1e-12);
}

#[test]
fn extrusion_runs_through_the_kernel_adapter() {
    let mut app = Application::headless();
    app.state
        .scene
        .create_line(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
    let mesh = app.extrude_scene(0.5).expect("the null kernel accepts all");
    assert!(mesh.positions.is_empty());
}
