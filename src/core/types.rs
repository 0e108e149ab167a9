/*!
 * Core Types
 * Common types shared by the executor and its targets
 */

/// Machine word carried in an argument slot
pub type Word = usize;

/// Signed result of a dispatched syscall (negative means failure)
pub type SyscallRet = isize;

/// Program counter reported through coverage
pub type Pc = u64;

/// Opaque identifier the engine assigns to a call
pub type CallId = u32;

/// Result returned for any call the target cannot perform
///
/// Collides with a legitimate `-1` return from the native call; callers that
/// need to tell them apart use `Dispatcher::dispatch` instead of the raw form.
pub const SENTINEL_FAILURE: SyscallRet = -1;

/// Common result type for executor operations
pub type ExecutorResult<T> = Result<T, super::errors::ExecutorError>;
