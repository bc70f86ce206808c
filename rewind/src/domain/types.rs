//! Newtype wrappers for trace-navigation primitives.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a general-purpose register slot in the engine's register file.
///
/// The engine defines the slot order; `TraceEngine::register_names` gives the
/// display names in the same order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegisterId(pub usize);

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}
