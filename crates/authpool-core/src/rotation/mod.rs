//! Round-robin rotation over credential sets with failure tracking

mod selector;

pub use selector::{RotationError, RotationSelector, RotationStats, WithSelectionError};
