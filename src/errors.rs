//! Error types for window selection.

use thiserror::Error;

use crate::{read::CigarOp, region::Region};

/// Result type alias for window selection operations
pub type Result<T> = std::result::Result<T, SelectError>;

/// Error type for window selection operations
#[derive(Error, Debug)]
pub enum SelectError {
    /// Alignment path contains an operation outside the supported set.
    /// Signals malformed input; never silently skipped.
    #[error("unsupported CIGAR operation '{op}' in read '{read}'")]
    UnsupportedOperation {
        /// The offending operation
        op: CigarOp,
        /// Query name of the read carrying it
        read: String,
    },

    /// Region with start beyond end
    #[error("invalid region {0} (start > end)")]
    InvalidRegion(Region),

    /// Region string did not match ctg:start-end
    #[error("could not parse region string '{0}'")]
    BadRegion(String),

    /// CIGAR string was empty or garbled
    #[error("could not parse CIGAR string '{0}'")]
    BadCigar(String),
}
