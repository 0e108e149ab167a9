/*!
 * xv6 Executor Library
 * xv6 backend for a syscall-level fuzzing executor, exposed as a library
 */

pub mod config;
pub mod consts;
pub mod core;
pub mod cover;
pub mod monitoring;
pub mod report;
pub mod setup;
pub mod syscalls;
pub mod target;
pub mod vminfo;
pub mod xv6;

// Re-exports
pub use config::{CoverConfig, ExecutorConfig, FeatureFlags, SandboxMode};
pub use core::{ExecutorError, ExecutorResult, Pc, SyscallRet, Word, SENTINEL_FAILURE};
pub use cover::{CoverCapability, CoverState, CoverageHandle};
pub use monitoring::init_tracing;
pub use report::{CrashKind, Report, Xv6Reporter};
pub use setup::{CapabilityStubs, SetupPlan, SetupSequence};
pub use syscalls::{ArgumentVector, DispatchError, Dispatcher, SyscallDescriptor};
pub use target::{Arch, CallInfo, CoverageReporter, Executor, ProgramCall, Target};
pub use xv6::{HostAbi, Xv6Target};
