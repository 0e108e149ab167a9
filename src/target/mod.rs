/*!
 * Target Module
 * Backend contract, architecture layout, and the engine-facing executor
 */

pub mod arch;
pub mod executor;
pub mod program;
pub mod traits;

pub use arch::{Arch, ArchParams};
pub use executor::{CallInfo, Executor};
pub use program::{parse_program, DataArena, ProgramArg, ProgramCall};
pub use traits::{
    Bootstrap, BootstrapError, CoverageReporter, DataSegment, DataSegmentRequest, Target,
};
