//! Error type shared by the terrain and particle cores.

use thiserror::Error;

/// Errors reported by the simulation core.
///
/// All of these are precondition failures: the computations themselves are
/// deterministic and never fail transiently.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// A vertex or triangle index outside the mesh.
    #[error("{kind} index {index} out of range (len {len})")]
    IndexOutOfRange {
        /// What was indexed (`"vertex"`, `"triangle"`, ...)
        kind: &'static str,
        /// The offending index
        index: usize,
        /// Number of valid entries
        len: usize,
    },

    /// A grid rectangle that is empty or not finite.
    #[error("invalid extent: x [{min_x}, {max_x}], y [{min_y}, {max_y}]")]
    InvalidExtent {
        /// Minimum X coordinate
        min_x: f32,
        /// Maximum X coordinate
        max_x: f32,
        /// Minimum Y coordinate
        min_y: f32,
        /// Maximum Y coordinate
        max_y: f32,
    },

    /// A flat buffer whose length is not a multiple of its stride.
    #[error("{name} buffer length {len} is not a multiple of {stride}")]
    MalformedBuffer {
        /// Buffer name
        name: &'static str,
        /// Actual length
        len: usize,
        /// Expected element stride
        stride: usize,
    },

    /// Two buffers that must line up element for element do not.
    #[error("{name} buffer has {len} entries, expected {expected}")]
    LengthMismatch {
        /// Buffer name
        name: &'static str,
        /// Actual length
        len: usize,
        /// Required length
        expected: usize,
    },

    /// A requested element count that cannot be allocated.
    #[error("cannot allocate {requested} {what}")]
    CapacityExceeded {
        /// What was being allocated (`"particles"`, ...)
        what: &'static str,
        /// Requested count
        requested: usize,
    },

    /// A scalar parameter outside its valid range.
    #[error("parameter '{name}' {constraint}, got {value}")]
    InvalidParameter {
        /// Parameter name
        name: &'static str,
        /// Offending value
        value: f32,
        /// Human-readable constraint, e.g. `"must be positive"`
        constraint: &'static str,
    },
}

impl SimError {
    pub(crate) fn out_of_range(kind: &'static str, index: usize, len: usize) -> Self {
        Self::IndexOutOfRange { kind, index, len }
    }

    pub(crate) fn invalid_parameter(name: &'static str, value: f32, constraint: &'static str) -> Self {
        Self::InvalidParameter {
            name,
            value,
            constraint,
        }
    }
}

/// Result alias for fallible core operations.
pub type Result<T> = std::result::Result<T, SimError>;
