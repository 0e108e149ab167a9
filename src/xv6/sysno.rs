/*!
 * xv6 Syscall Numbers
 * The xv6 syscall table (kernel/syscall.h numbering)
 */

use crate::syscalls::{ArgKind, SyscallEntry, SyscallTable};
use serde::{Deserialize, Serialize};

/// Argument words an xv6 call receives
pub const XV6_MAX_ARGS: usize = 6;

use ArgKind::{Argv, CStr, Fd, Flags, Int, Len, Pid, Ptr, Short};

/// Table rows, indexed by `nr - 1`
pub static XV6_SYSCALLS: [SyscallEntry; 21] = [
    SyscallEntry::new("fork", 1, &[]),
    SyscallEntry::new("exit", 2, &[Int]),
    SyscallEntry::new("wait", 3, &[Ptr]),
    SyscallEntry::new("pipe", 4, &[Ptr]),
    SyscallEntry::new("read", 5, &[Fd, Ptr, Len]),
    SyscallEntry::new("kill", 6, &[Pid]),
    SyscallEntry::new("exec", 7, &[CStr, Argv]),
    SyscallEntry::new("fstat", 8, &[Fd, Ptr]),
    SyscallEntry::new("chdir", 9, &[CStr]),
    SyscallEntry::new("dup", 10, &[Fd]),
    SyscallEntry::new("getpid", 11, &[]),
    SyscallEntry::new("sbrk", 12, &[Int]),
    SyscallEntry::new("sleep", 13, &[Int]),
    SyscallEntry::new("uptime", 14, &[]),
    SyscallEntry::new("open", 15, &[CStr, Flags]),
    SyscallEntry::new("write", 16, &[Fd, Ptr, Len]),
    SyscallEntry::new("mknod", 17, &[CStr, Short, Short]),
    SyscallEntry::new("unlink", 18, &[CStr]),
    SyscallEntry::new("link", 19, &[CStr, CStr]),
    SyscallEntry::new("mkdir", 20, &[CStr]),
    SyscallEntry::new("close", 21, &[Fd]),
];

/// The xv6 identifier space
pub static XV6_TABLE: SyscallTable = SyscallTable::new(&XV6_SYSCALLS, XV6_MAX_ARGS);

/// `syz_mmap` number, past every kernel number
pub const SYZ_MMAP_NR: u64 = 1_000_000;

/// Pseudo-calls the executor implements for xv6
pub static XV6_PSEUDO_CALLS: [SyscallEntry; 1] =
    [SyscallEntry::new("syz_mmap", SYZ_MMAP_NR, &[Ptr, Len])];

pub static XV6_PSEUDO_TABLE: SyscallTable = SyscallTable::new(&XV6_PSEUDO_CALLS, XV6_MAX_ARGS);

/// xv6 syscall numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u64)]
pub enum Sysno {
    Fork = 1,
    Exit = 2,
    Wait = 3,
    Pipe = 4,
    Read = 5,
    Kill = 6,
    Exec = 7,
    Fstat = 8,
    Chdir = 9,
    Dup = 10,
    Getpid = 11,
    Sbrk = 12,
    Sleep = 13,
    Uptime = 14,
    Open = 15,
    Write = 16,
    Mknod = 17,
    Unlink = 18,
    Link = 19,
    Mkdir = 20,
    Close = 21,
}

impl Sysno {
    pub const ALL: [Sysno; 21] = [
        Sysno::Fork,
        Sysno::Exit,
        Sysno::Wait,
        Sysno::Pipe,
        Sysno::Read,
        Sysno::Kill,
        Sysno::Exec,
        Sysno::Fstat,
        Sysno::Chdir,
        Sysno::Dup,
        Sysno::Getpid,
        Sysno::Sbrk,
        Sysno::Sleep,
        Sysno::Uptime,
        Sysno::Open,
        Sysno::Write,
        Sysno::Mknod,
        Sysno::Unlink,
        Sysno::Link,
        Sysno::Mkdir,
        Sysno::Close,
    ];

    pub fn from_nr(nr: u64) -> Option<Self> {
        let idx = usize::try_from(nr).ok()?.checked_sub(1)?;
        Self::ALL.get(idx).copied()
    }

    #[inline]
    pub const fn nr(self) -> u64 {
        self as u64
    }

    #[inline]
    pub fn entry(self) -> &'static SyscallEntry {
        &XV6_SYSCALLS[self as usize - 1]
    }

    #[inline]
    pub fn name(self) -> &'static str {
        self.entry().name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_matches_enum() {
        for sysno in Sysno::ALL {
            assert_eq!(sysno.entry().nr, sysno.nr());
            assert_eq!(Sysno::from_nr(sysno.nr()), Some(sysno));
            assert!(sysno.entry().arg_count() <= XV6_MAX_ARGS);
        }
        assert_eq!(XV6_TABLE.len(), 21);
    }

    #[test]
    fn test_pseudo_calls_stay_out_of_kernel_range() {
        for entry in XV6_PSEUDO_CALLS.iter() {
            assert_eq!(Sysno::from_nr(entry.nr), None);
            assert!(XV6_TABLE.by_name(entry.name).is_none());
        }
        assert_eq!(XV6_PSEUDO_TABLE.by_name("syz_mmap").map(|e| e.nr), Some(SYZ_MMAP_NR));
    }

    #[test]
    fn test_out_of_range_numbers() {
        assert_eq!(Sysno::from_nr(0), None);
        assert_eq!(Sysno::from_nr(22), None);
        assert_eq!(Sysno::from_nr(u64::MAX), None);
    }

    #[test]
    fn test_known_numbers() {
        assert_eq!(XV6_TABLE.by_name("open").map(|e| e.nr), Some(15));
        assert_eq!(XV6_TABLE.by_name("close").map(|e| e.nr), Some(21));
        assert_eq!(Sysno::Mknod.entry().args, &[ArgKind::CStr, ArgKind::Short, ArgKind::Short]);
        assert_eq!(Sysno::Kill.entry().args, &[ArgKind::Pid]);
    }
}
