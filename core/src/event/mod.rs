pub mod queue;
pub mod types;

pub use queue::{EventQueue, HistoryError, ReplayReport};
pub use types::{AppEvent, Ray};
