/*!
 * xv6 ABI
 * One method per native xv6 call, plus the user-visible ABI constants
 */

use std::ffi::{c_char, c_void};

/// xv6 `open` flags (kernel/fcntl.h)
pub mod flags {
    pub const O_RDONLY: i32 = 0x000;
    pub const O_WRONLY: i32 = 0x001;
    pub const O_RDWR: i32 = 0x002;
    pub const O_CREATE: i32 = 0x200;
    pub const O_TRUNC: i32 = 0x400;
}

/// `Xv6Stat::type_` values (kernel/stat.h)
pub const T_DIR: i16 = 1;
pub const T_FILE: i16 = 2;
pub const T_DEVICE: i16 = 3;

/// xv6 `struct stat`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Xv6Stat {
    /// File system's disk device
    pub dev: i32,
    /// Inode number
    pub ino: u32,
    /// Type of file
    pub type_: i16,
    /// Number of links to file
    pub nlink: i16,
    /// Size of file in bytes
    pub size: u64,
}

/// Native xv6 calls
///
/// Integer returns follow xv6: `-1` on failure. Methods taking pointers are
/// `unsafe` and pass them on unchecked.
pub trait Xv6Abi {
    fn fork(&self) -> i32;

    fn exit(&self, status: i32) -> !;

    /// # Safety
    /// `status` is null or valid for a write of one `i32`.
    unsafe fn wait(&self, status: *mut i32) -> i32;

    /// # Safety
    /// `fds` is valid for a write of two `i32`s.
    unsafe fn pipe(&self, fds: *mut i32) -> i32;

    /// # Safety
    /// `buf` is valid for writes of `n` bytes.
    unsafe fn read(&self, fd: i32, buf: *mut c_void, n: i32) -> i32;

    fn kill(&self, pid: i32) -> i32;

    /// # Safety
    /// `path` is a C string and `argv` a NULL-terminated array of them.
    unsafe fn exec(&self, path: *const c_char, argv: *const *const c_char) -> i32;

    /// # Safety
    /// `st` is valid for a write of one `Xv6Stat`.
    unsafe fn fstat(&self, fd: i32, st: *mut Xv6Stat) -> i32;

    /// # Safety
    /// `path` is a C string.
    unsafe fn chdir(&self, path: *const c_char) -> i32;

    fn dup(&self, fd: i32) -> i32;

    fn getpid(&self) -> i32;

    /// Grow the data segment; returns the previous break or -1
    fn sbrk(&self, n: i32) -> isize;

    fn sleep(&self, ticks: i32) -> i32;

    fn uptime(&self) -> i32;

    /// # Safety
    /// `path` is a C string.
    unsafe fn open(&self, path: *const c_char, flags: i32) -> i32;

    /// # Safety
    /// `buf` is valid for reads of `n` bytes.
    unsafe fn write(&self, fd: i32, buf: *const c_void, n: i32) -> i32;

    /// # Safety
    /// `path` is a C string.
    unsafe fn mknod(&self, path: *const c_char, major: i16, minor: i16) -> i32;

    /// # Safety
    /// `path` is a C string.
    unsafe fn unlink(&self, path: *const c_char) -> i32;

    /// # Safety
    /// `old` and `new` are C strings.
    unsafe fn link(&self, old: *const c_char, new: *const c_char) -> i32;

    /// # Safety
    /// `path` is a C string.
    unsafe fn mkdir(&self, path: *const c_char) -> i32;

    fn close(&self, fd: i32) -> i32;
}
