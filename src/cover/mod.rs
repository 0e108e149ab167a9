/*!
 * Coverage Module
 * Coverage sessions, shared buffers, and PC filtering
 */

pub mod buffer;
pub mod filter;
pub mod handle;

pub use buffer::{Comparison, CoverBuffer, CoverWriter, COMPARISON_WORDS, COVER_DATA_OFFSET};
pub use filter::{PcFilter, PcRange};
pub use handle::{CoverBacking, CoverCapability, CoverState, CoverageHandle};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coverage buffer errors
///
/// Never surfaced to the engine: a handle that hits one degrades to unavailable.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum CoverError {
    #[error("Invalid coverage buffer size: {0} words")]
    InvalidSize(usize),

    #[error("Coverage buffer mapping failed: {0}")]
    MapFailed(String),
}

/// Result type for coverage buffer operations
#[must_use = "coverage operations can fail and must be handled"]
pub type CoverResult<T> = Result<T, CoverError>;
