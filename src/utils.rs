//! Utility functions for the rating service

use crate::types::RunId;
use uuid::Uuid;

/// Generate a new unique run ID
pub fn generate_run_id() -> RunId {
    Uuid::new_v4()
}

/// Check if two floats are within the given tolerance
pub fn approx_eq(a: f64, b: f64, tolerance: f64) -> bool {
    (a - b).abs() <= tolerance
}
