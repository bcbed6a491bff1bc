use std::result;

use thiserror::Error;

use crate::epoch::EpochVariant;

/// Fatal conditions. Any of these aborts the call that raised it.
#[derive(Debug, Error)]
pub enum Error {
    /// A raw array's shape matches none of the three epoch encodings.
    #[error("unrecognized epoch shape: {0}")]
    UnrecognizedEpochShape(String),

    /// Two epochs of different encodings were combined.
    #[error("epoch variant mismatch: expected {expected:?}, got {actual:?}")]
    VariantMismatch {
        expected: EpochVariant,
        actual: EpochVariant,
    },

    /// Fewer than year, month, and day were supplied to `compute`.
    #[error("insufficient time components: year, month, and day are required")]
    InsufficientTimeComponents,

    /// A timestamp string does not match `yyyy-mm-ddThh:mm:ss[.frac]`.
    #[error("invalid time format: {0:?}")]
    InvalidTimeFormat(String),

    /// The time axis decreases, so window selection cannot be trusted.
    #[error("time axis is not monotonic around record {0}")]
    NonMonotonicTimeAxis(usize),

    /// Unresolvable variable or dependency name.
    #[error("no variable named {0:?}")]
    BadName(String),

    /// A time window was requested for a variable with no DEPEND_0 axis.
    #[error("variable {0:?} has no DEPEND_0 axis to window on")]
    NoTimeAxis(String),

    /// Files in a set disagree on a variable's element type.
    #[error("inconsistent element type across files for variable {0:?}")]
    InconsistentType(String),

    /// Failure propagated from the external CDF library.
    #[error("cdf library: {0}")]
    Cdf(String),
}

/// Recoverable conditions. These never abort a read; they travel back to the
/// caller in `VarRead::warnings` alongside an empty (or partial) result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// The requested start falls after the last sample on the axis.
    /// Carries the encoded last timestamp for diagnostics.
    NoRecordsAfterStart { last: String },

    /// The requested end falls before the first sample on the axis.
    /// Carries the encoded first timestamp for diagnostics.
    NoRecordsBeforeEnd { first: String },

    /// The requested interval falls entirely between two adjacent samples.
    ProbableDataGap,

    /// The variable has zero records in the first file.
    EmptyVariable { name: String },
}

pub type Result<T> = result::Result<T, Error>;
