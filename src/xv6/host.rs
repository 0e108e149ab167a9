/*!
 * Host ABI
 *
 * Runs xv6 calls on a POSIX development host with xv6 semantics:
 * xv6 open flags, SIGKILL-only kill, 100 Hz ticks, xv6 `struct stat`,
 * and a private heap arena standing in for the process break.
 */

use super::abi::{flags, Xv6Abi, Xv6Stat, T_DEVICE, T_DIR, T_FILE};
use nix::libc;
use nix::sys::mman::{mmap_anonymous, munmap, MapFlags, ProtFlags};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{wait, WaitStatus};
use nix::unistd::{getpid, Pid};
use std::cell::Cell;
use std::ffi::{c_char, c_void};
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// Default ceiling for the emulated break
pub const DEFAULT_HEAP_LIMIT: usize = 64 << 20;

/// Length of one xv6 timer tick
pub const TICK: Duration = Duration::from_millis(10);

/// Translate xv6 open flags to host flags
pub fn host_open_flags(xv6_flags: i32) -> i32 {
    let mut host = match xv6_flags & 0x3 {
        flags::O_WRONLY => libc::O_WRONLY,
        flags::O_RDWR => libc::O_RDWR,
        _ => libc::O_RDONLY,
    };
    if xv6_flags & flags::O_CREATE != 0 {
        host |= libc::O_CREAT;
    }
    if xv6_flags & flags::O_TRUNC != 0 {
        host |= libc::O_TRUNC;
    }
    host
}

/// Reserved region the break moves through
#[derive(Debug)]
struct HostHeap {
    base: NonNull<c_void>,
    limit: usize,
    brk: Cell<usize>,
}

impl HostHeap {
    fn reserve(limit: usize) -> Option<Self> {
        let len = NonZeroUsize::new(limit)?;
        // SAFETY: a fresh anonymous mapping at a kernel-chosen address
        // aliases no existing memory.
        let base = unsafe {
            mmap_anonymous(
                None,
                len,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_PRIVATE,
            )
        };
        match base {
            Ok(base) => Some(Self {
                base,
                limit,
                brk: Cell::new(0),
            }),
            Err(e) => {
                warn!(limit, error = %e, "heap arena reservation failed");
                None
            }
        }
    }

    fn sbrk(&self, n: i32) -> isize {
        let old = self.brk.get();
        let new = if n >= 0 {
            old.checked_add(n as usize)
        } else {
            old.checked_sub(n.unsigned_abs() as usize)
        };
        match new {
            Some(new) if new <= self.limit => {
                self.brk.set(new);
                (self.base.as_ptr() as usize + old) as isize
            }
            _ => -1,
        }
    }
}

impl Drop for HostHeap {
    fn drop(&mut self) {
        // SAFETY: `base` and `limit` describe the arena `reserve` mapped.
        // Addresses handed out by sbrk are dangling after this point, as
        // they are once an xv6 process exits.
        if let Err(e) = unsafe { munmap(self.base, self.limit) } {
            warn!(limit = self.limit, error = %e, "heap arena unmap failed");
        }
    }
}

/// xv6 calls relayed to the host kernel
#[derive(Debug)]
pub struct HostAbi {
    heap: Option<HostHeap>,
    boot: Instant,
}

impl HostAbi {
    pub fn new() -> Self {
        Self::with_heap_limit(DEFAULT_HEAP_LIMIT)
    }

    /// Cap the emulated break at `limit` bytes; zero refuses every sbrk
    pub fn with_heap_limit(limit: usize) -> Self {
        Self {
            heap: HostHeap::reserve(limit),
            boot: Instant::now(),
        }
    }

    pub fn heap_limit(&self) -> usize {
        self.heap.as_ref().map_or(0, |h| h.limit)
    }
}

impl Default for HostAbi {
    fn default() -> Self {
        Self::new()
    }
}

impl Xv6Abi for HostAbi {
    fn fork(&self) -> i32 {
        unsafe { libc::fork() }
    }

    fn exit(&self, status: i32) -> ! {
        // SAFETY: _exit only ends the process. Nothing is unwound and no
        // atexit handler runs, matching an xv6 exit.
        unsafe { libc::_exit(status) }
    }

    unsafe fn wait(&self, status: *mut i32) -> i32 {
        match wait() {
            Ok(ws) => {
                let code = match ws {
                    WaitStatus::Exited(_, code) => code,
                    _ => -1,
                };
                if !status.is_null() {
                    unsafe { status.write_unaligned(code) };
                }
                ws.pid().map_or(-1, Pid::as_raw)
            }
            Err(_) => -1,
        }
    }

    unsafe fn pipe(&self, fds: *mut i32) -> i32 {
        unsafe { libc::pipe(fds) }
    }

    unsafe fn read(&self, fd: i32, buf: *mut c_void, n: i32) -> i32 {
        if n < 0 {
            return -1;
        }
        unsafe { libc::read(fd, buf, n as usize) as i32 }
    }

    fn kill(&self, pid: i32) -> i32 {
        // xv6 kill names exactly one process; never signal a group.
        if pid <= 0 {
            return -1;
        }
        kill(Pid::from_raw(pid), Signal::SIGKILL).map_or(-1, |()| 0)
    }

    unsafe fn exec(&self, path: *const c_char, argv: *const *const c_char) -> i32 {
        unsafe { libc::execv(path, argv) }
    }

    unsafe fn fstat(&self, fd: i32, st: *mut Xv6Stat) -> i32 {
        if st.is_null() {
            return -1;
        }
        let mut host: libc::stat = unsafe { std::mem::zeroed() };
        if unsafe { libc::fstat(fd, &mut host) } < 0 {
            return -1;
        }
        let type_ = match host.st_mode & libc::S_IFMT {
            libc::S_IFDIR => T_DIR,
            libc::S_IFCHR | libc::S_IFBLK => T_DEVICE,
            _ => T_FILE,
        };
        let stat = Xv6Stat {
            dev: host.st_dev as i32,
            ino: host.st_ino as u32,
            type_,
            nlink: host.st_nlink as i16,
            size: host.st_size as u64,
        };
        unsafe { st.write_unaligned(stat) };
        0
    }

    unsafe fn chdir(&self, path: *const c_char) -> i32 {
        unsafe { libc::chdir(path) }
    }

    fn dup(&self, fd: i32) -> i32 {
        unsafe { libc::dup(fd) }
    }

    fn getpid(&self) -> i32 {
        getpid().as_raw()
    }

    fn sbrk(&self, n: i32) -> isize {
        let ret = self.heap.as_ref().map_or(-1, |heap| heap.sbrk(n));
        trace!(n, ret, "sbrk");
        ret
    }

    fn sleep(&self, ticks: i32) -> i32 {
        if ticks > 0 {
            std::thread::sleep(TICK * ticks as u32);
        }
        0
    }

    fn uptime(&self) -> i32 {
        (self.boot.elapsed().as_millis() / TICK.as_millis()) as i32
    }

    unsafe fn open(&self, path: *const c_char, flags: i32) -> i32 {
        unsafe { libc::open(path, host_open_flags(flags), 0o644 as libc::c_uint) }
    }

    unsafe fn write(&self, fd: i32, buf: *const c_void, n: i32) -> i32 {
        if n < 0 {
            return -1;
        }
        unsafe { libc::write(fd, buf, n as usize) as i32 }
    }

    unsafe fn mknod(&self, path: *const c_char, major: i16, minor: i16) -> i32 {
        // Host device nodes need privileges; the node is created as a regular file.
        trace!(major, minor, "mknod");
        unsafe { libc::mknod(path, libc::S_IFREG | 0o644, 0) }
    }

    unsafe fn unlink(&self, path: *const c_char) -> i32 {
        unsafe { libc::unlink(path) }
    }

    unsafe fn link(&self, old: *const c_char, new: *const c_char) -> i32 {
        unsafe { libc::link(old, new) }
    }

    unsafe fn mkdir(&self, path: *const c_char) -> i32 {
        unsafe { libc::mkdir(path, 0o755) }
    }

    fn close(&self, fd: i32) -> i32 {
        unsafe { libc::close(fd) }
    }
}
