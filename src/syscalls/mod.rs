/*!
 * Syscalls Module
 * Syscall tables, argument coercion, and the dispatch contract
 */

pub mod args;
pub mod descriptor;
pub mod dispatcher;
pub mod table;

pub use args::{Arg, ArgumentSlots, ArgumentVector, CallArgs};
pub use descriptor::SyscallDescriptor;
pub use dispatcher::{DispatchError, DispatchResult, Dispatcher};
pub use table::{ArgKind, SyscallEntry, SyscallTable};
