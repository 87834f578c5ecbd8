//! Headless shell around the sketcher core: restores the persisted event
//! history on startup, runs the main loop against inert adapters, and writes
//! the history back on exit.

use std::fs;
use std::path::Path;

use nalgebra::{Point2, Point3, Vector3};
use sketcher_core::adapters::ScriptedInput;
use sketcher_core::app::Application;
use sketcher_core::event::{AppEvent, Ray};
use sketcher_core::graph::{Constraint, ConstraintType};
use sketcher_core::sketch::SketchEntity;
use tracing::{info, warn};

const HISTORY_PATH: &str = "history.json";

fn main() {
    tracing_subscriber::fmt::init();
    info!(version = sketcher_core::version(), "starting sketcher");

    let mut app = Application::headless();

    if Path::new(HISTORY_PATH).exists() {
        restore_session(&mut app);
    } else {
        seed_demo_session(&mut app);
    }

    let mut input = ScriptedInput::default();
    app.run(&mut input, 1);

    solve_demo_sketch(&mut app);

    match fs::write(HISTORY_PATH, app.save_history().to_string()) {
        Ok(()) => info!(path = HISTORY_PATH, "event history persisted"),
        Err(err) => warn!(%err, "could not persist the event history"),
    }
}

fn restore_session(app: &mut Application) {
    let raw = match fs::read_to_string(HISTORY_PATH) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(%err, "could not read the history file");
            return;
        }
    };
    let payload = match serde_json::from_str(&raw) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(%err, "history file is not valid JSON");
            return;
        }
    };
    match app.load_history(&payload) {
        Ok(report) => info!(
            loaded = report.loaded,
            skipped = report.skipped.len(),
            "session restored"
        ),
        Err(err) => warn!(%err, "could not restore the session"),
    }
}

/// First run: record a small session that drops three points onto the sketch
/// plane, and set up a dimensioned corner in the parametric sketch.
fn seed_demo_session(app: &mut Application) {
    app.post_event(AppEvent::EnableSketchMode);
    app.post_event(AppEvent::TogglePointMode);
    for (x, y, z) in [(1.0, 0.0, 0.0), (0.0, 2.0, 0.0), (0.0, 0.0, 3.0)] {
        app.post_event(AppEvent::SketchPlaneHit {
            x,
            y,
            z,
            ray: Ray {
                origin: Point3::new(x, y, z + 10.0),
                dir: Vector3::new(0.0, 0.0, -1.0),
            },
        });
    }

    let sketch = &mut app.state.sketch;
    let a = sketch.add_point_at(Point2::new(0.0, 0.0));
    let b = sketch.add_point_at(Point2::new(0.2, 1.0));
    let c = sketch.add_point_at(Point2::new(1.0, 0.2));
    if let Err(err) = sketch.set_fixed(a, true) {
        warn!(%err, "could not anchor the demo sketch");
    }
    let constraints = [
        (a, b, Constraint::new(ConstraintType::Vertical)),
        (a, b, Constraint::with_value(ConstraintType::Distance, 3.0)),
        (a, c, Constraint::new(ConstraintType::Horizontal)),
        (a, c, Constraint::with_value(ConstraintType::Distance, 5.0)),
    ];
    for (u, v, constraint) in constraints {
        if let Err(err) = sketch.connect(u, v, constraint) {
            warn!(%err, "could not constrain the demo sketch");
        }
    }
}

fn solve_demo_sketch(app: &mut Application) {
    if app.state.sketch.constraints().is_empty() {
        return;
    }
    match app.state.sketch.solve() {
        Ok(residual) => {
            info!(residual, "sketch solved");
            for entity in &app.state.sketch.entities {
                match entity {
                    SketchEntity::Point(p) => {
                        info!(id = %p.element, x = p.pos.x, y = p.pos.y, "point")
                    }
                    SketchEntity::Line(l) => {
                        info!(id = %l.element, k = l.k, m = l.m, "line")
                    }
                }
            }
        }
        Err(err) => warn!(%err, "the sketch could not be realised"),
    }
}
