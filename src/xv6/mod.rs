/*!
 * xv6 Module
 * The xv6 executor backend: syscall table, native ABI, and stub capabilities
 */

pub mod abi;
pub mod boot;
pub mod dispatch;
pub mod host;
pub mod stubs;
pub mod sysno;
pub mod target;

pub use abi::{flags, Xv6Abi, Xv6Stat, T_DEVICE, T_DIR, T_FILE};
pub use dispatch::Xv6Args;
pub use host::{host_open_flags, HostAbi, DEFAULT_HEAP_LIMIT, TICK};
pub use sysno::{
    Sysno, SYZ_MMAP_NR, XV6_MAX_ARGS, XV6_PSEUDO_CALLS, XV6_PSEUDO_TABLE, XV6_SYSCALLS, XV6_TABLE,
};
pub use target::Xv6Target;
