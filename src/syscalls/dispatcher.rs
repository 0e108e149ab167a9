/*!
 * Dispatcher
 * Contract for relaying a descriptor and its argument words into a native call
 */

use super::args::ArgumentSlots;
use super::descriptor::SyscallDescriptor;
use super::table::SyscallTable;
use crate::core::{SyscallRet, SENTINEL_FAILURE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Dispatch failures that never reached the native call
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum DispatchError {
    /// Target number outside the table
    #[error("Syscall number {nr} is not supported by this target")]
    Unsupported { nr: u64 },
}

impl DispatchError {
    /// Collapse into the single-word result the engine understands
    #[inline]
    pub const fn into_raw(self) -> SyscallRet {
        SENTINEL_FAILURE
    }
}

/// Dispatch result: native return value or a pre-call rejection
#[must_use = "dispatch results carry the native return value"]
pub type DispatchResult = Result<SyscallRet, DispatchError>;

/// Performs the real invocation for a descriptor
pub trait Dispatcher {
    /// Argument storage the target ABI passes
    type Args: ArgumentSlots;

    /// Table this dispatcher serves
    fn syscall_table(&self) -> &SyscallTable;

    /// Calls the executor serves itself rather than the kernel
    ///
    /// Their numbers must not collide with `syscall_table`.
    fn pseudo_table(&self) -> Option<&SyscallTable> {
        None
    }

    /// Invoke the native call
    ///
    /// Unknown target numbers return `Err(DispatchError::Unsupported)` without
    /// touching the target. Otherwise the native return value comes back as
    /// `Ok`, including native failures.
    ///
    /// # Safety
    ///
    /// Pointer-kind slots are passed to the native call unchecked. The caller
    /// guarantees every such slot is either invalid in a way the target
    /// reports as an error, or points to memory valid for the call's access.
    /// Calls such as `exit` and `exec` may not return.
    unsafe fn dispatch(&self, call: &SyscallDescriptor, args: &Self::Args) -> DispatchResult;

    /// Single-word form: unsupported calls become the `-1` sentinel
    ///
    /// # Safety
    ///
    /// Same contract as [`Dispatcher::dispatch`].
    unsafe fn dispatch_raw(&self, call: &SyscallDescriptor, args: &Self::Args) -> SyscallRet {
        // SAFETY: forwarded caller contract.
        match unsafe { self.dispatch(call, args) } {
            Ok(ret) => ret,
            Err(err) => err.into_raw(),
        }
    }
}
