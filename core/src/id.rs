use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// Identifier of a geometric element (point or line vertex).
///
/// Issued by a process-wide monotonic counter so that ids stay unique across
/// every graph in the process. Deep copies of a graph keep the original ids,
/// which is what allows the decomposer to locate the "same" vertex inside a
/// duplicated sub-graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u32);

/// Identifier of a constraint edge. Same allocation rules as [`ElementId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConstraintId(pub u32);

static NEXT_ELEMENT_ID: AtomicU32 = AtomicU32::new(0);
static NEXT_CONSTRAINT_ID: AtomicU32 = AtomicU32::new(1);

impl ElementId {
    /// Allocate a fresh id. Ids are never reused.
    pub fn next() -> Self {
        Self(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl ConstraintId {
    /// Allocate a fresh id. Ids are never reused.
    pub fn next() -> Self {
        Self(NEXT_CONSTRAINT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}
