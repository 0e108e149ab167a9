/*!
 * Syscall Table
 * Static mapping from call names to target numbers and argument signatures
 */

use super::descriptor::SyscallDescriptor;
use crate::core::{CallId, ExecutorError, ExecutorResult};
use serde::{Deserialize, Serialize};

/// Kind tag for one argument slot
///
/// The dispatcher coerces the raw slot word through its kind, so each native
/// parameter type is decided once, in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgKind {
    /// Plain `int`
    Int,
    /// File descriptor (`int`)
    Fd,
    /// Process id (`int`)
    Pid,
    /// Byte count (`int`)
    Len,
    /// Flag word (`int`)
    Flags,
    /// `short` (device numbers)
    Short,
    /// Untyped user pointer
    Ptr,
    /// NUL-terminated string
    CStr,
    /// NULL-terminated array of strings
    Argv,
}

impl ArgKind {
    /// Whether the slot carries a 32-bit integer on the native side
    #[inline]
    pub const fn is_int(self) -> bool {
        matches!(
            self,
            ArgKind::Int | ArgKind::Fd | ArgKind::Pid | ArgKind::Len | ArgKind::Flags
        )
    }

    /// Whether the slot carries an address
    #[inline]
    pub const fn is_pointer(self) -> bool {
        matches!(self, ArgKind::Ptr | ArgKind::CStr | ArgKind::Argv)
    }
}

/// One row of a target syscall table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyscallEntry {
    pub name: &'static str,
    pub nr: u64,
    pub args: &'static [ArgKind],
}

impl SyscallEntry {
    pub const fn new(name: &'static str, nr: u64, args: &'static [ArgKind]) -> Self {
        Self { name, nr, args }
    }

    #[inline]
    pub const fn arg_count(&self) -> usize {
        self.args.len()
    }
}

/// Closed identifier space of a target
#[derive(Debug, Clone, Copy)]
pub struct SyscallTable {
    entries: &'static [SyscallEntry],
    max_args: usize,
}

impl SyscallTable {
    pub const fn new(entries: &'static [SyscallEntry], max_args: usize) -> Self {
        Self { entries, max_args }
    }

    /// Look up an entry by target number
    pub fn by_nr(&self, nr: u64) -> Option<&'static SyscallEntry> {
        self.entries.iter().find(|e| e.nr == nr)
    }

    /// Look up an entry by call name
    pub fn by_name(&self, name: &str) -> Option<&'static SyscallEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn entries(&self) -> &'static [SyscallEntry] {
        self.entries
    }

    pub fn max_args(&self) -> usize {
        self.max_args
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build a descriptor for a named call
    pub fn descriptor(&self, id: CallId, name: &str) -> ExecutorResult<SyscallDescriptor> {
        let entry = self
            .by_name(name)
            .ok_or_else(|| ExecutorError::UnknownCall(name.to_string()))?;
        SyscallDescriptor::new(id, entry.name, entry.nr, entry.arg_count(), self.max_args)
    }
}
