pub mod adapters;
pub mod app;
pub mod event;
pub mod graph;
pub mod id;
pub mod mode;
pub mod scene;
pub mod sketch;

pub fn version() -> &'static str {
    "0.1.0"
}
