pub mod analysis;
pub mod stree;
pub mod types;

pub use stree::{analyze, STree, StructureError};
pub use types::{Constraint, ConstraintGraph, ConstraintType, GeometricElement, GeometricKind};

#[cfg(test)]
mod tests_analysis;
#[cfg(test)]
mod tests_graph;
