/*!
 * Syscall Support
 * Which engine calls the xv6 target can run
 */

use super::Unsupported;
use std::fs::OpenOptions;

/// Calls with a known answer, checked before the fallbacks
const KNOWN: &[(&str, Option<&str>)] = &[
    ("open", None),
    ("openat", None),
    ("fork", None),
    ("exec", None),
    ("exit", None),
    ("wait", None),
    ("getpid", None),
    ("read", None),
    ("write", None),
    ("close", None),
    ("dup", None),
    ("pipe", None),
    ("sbrk", None),
    ("sleep", None),
    ("chroot", None),
    ("chdir", None),
    ("kill", None),
    ("stat", None),
    ("fstat", None),
    ("lstat", None),
    ("mkdir", None),
    ("rmdir", None),
    ("unlink", None),
    ("link", None),
    ("socket", Some(NO_NET)),
    ("bind", Some(NO_NET)),
    ("listen", Some(NO_NET)),
    ("accept", Some(NO_NET)),
    ("connect", Some(NO_NET)),
    ("mount", Some("xv6 has no mount/umount")),
    ("umount", Some("xv6 has no mount/umount")),
    ("mmap", Some(NO_VM)),
    ("munmap", Some(NO_VM)),
    ("mprotect", Some(NO_VM)),
    ("clone", Some("xv6 only has plain fork")),
    ("vfork", Some("xv6 only has plain fork")),
    ("ioctl", Some("xv6 has no ioctl")),
    ("fcntl", Some("xv6 has no fcntl")),
    ("epoll_create", Some("xv6 has no epoll")),
    ("epoll_ctl", Some("xv6 has no epoll")),
    ("epoll_wait", Some("xv6 has no epoll")),
    ("select", Some("xv6 has no select/poll")),
    ("poll", Some("xv6 has no select/poll")),
    ("sendfile", Some("xv6 has no sendfile/splice")),
    ("splice", Some("xv6 has no sendfile/splice")),
    ("signalfd", Some(NO_EVENT_FDS)),
    ("eventfd", Some(NO_EVENT_FDS)),
    ("timerfd_create", Some(NO_EVENT_FDS)),
    ("prctl", Some("xv6 has no process control or tracing")),
    ("ptrace", Some("xv6 has no process control or tracing")),
    ("setuid", Some(NO_USERS)),
    ("setgid", Some(NO_USERS)),
    ("setreuid", Some(NO_USERS)),
    ("setregid", Some(NO_USERS)),
    ("capget", Some("xv6 has no capabilities")),
    ("capset", Some("xv6 has no capabilities")),
    ("acct", Some("xv6 has no accounting or quotas")),
    ("quotactl", Some("xv6 has no accounting or quotas")),
    ("syslog", Some("xv6 has no syslog")),
    ("klogctl", Some("xv6 has no syslog")),
    ("reboot", Some("xv6 has no reboot/sync")),
    ("sync", Some("xv6 has no reboot/sync")),
    ("syz_open_dev", Some("xv6 has only console devices")),
    ("syz_mount_image", Some("xv6 cannot mount filesystem images")),
    ("syz_read_part_table", Some("xv6 has no partition tables")),
];

const NO_NET: &str = "xv6 has no networking";
const NO_VM: &str = "xv6 has no user-controlled memory mappings";
const NO_EVENT_FDS: &str = "xv6 has no fd-based event mechanisms";
const NO_USERS: &str = "xv6 has a single user";

/// Plain Unix calls assumed present when not listed above
const BASIC_UNIX: &[&str] = &[
    "fork", "exec", "exit", "wait", "getpid", "getppid", "open", "read", "write", "close",
    "lseek", "dup", "dup2", "chdir", "mkdir", "rmdir", "unlink", "link", "stat", "fstat", "pipe",
    "sbrk", "kill", "sleep",
];

/// Check whether `name` can run on xv6
pub fn check_syscall(name: &str) -> Result<(), Unsupported> {
    if let Some((_, verdict)) = KNOWN.iter().find(|(known, _)| *known == name) {
        return match verdict {
            None => Ok(()),
            Some(reason) => Err(Unsupported::new(name, *reason)),
        };
    }
    if name.len() > "syz_".len() && name.starts_with("syz_") {
        return Err(Unsupported::new(name, "xv6 has no pseudo-syscalls"));
    }
    if BASIC_UNIX.contains(&name) {
        return Ok(());
    }
    Err(Unsupported::new(name, "xv6 lacks this call"))
}

/// Check a call whose file argument is fixed to `fname`
///
/// `open` and `openat` on an absolute path are only supported when the
/// path opens in at least one access mode. Other calls ignore `fname`.
pub fn check_call(name: &str, fname: Option<&str>) -> Result<(), Unsupported> {
    match name {
        "open" | "openat" => check_open(name, fname),
        _ => check_syscall(name),
    }
}

fn check_open(name: &str, fname: Option<&str>) -> Result<(), Unsupported> {
    let Some(path) = fname.filter(|path| path.starts_with('/')) else {
        return Ok(());
    };
    let opens = [(true, false), (false, true), (true, true)]
        .iter()
        .any(|&(read, write)| OpenOptions::new().read(read).write(write).open(path).is_ok());
    if opens {
        Ok(())
    } else {
        Err(Unsupported::new(name, format!("failed to open {path}")))
    }
}
