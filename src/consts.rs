/*!
 * Target Constants
 *
 * Values of the named constants syscall descriptions refer to, and a check
 * that a directory holds an xv6 source tree.
 */

use crate::xv6::{flags, XV6_TABLE};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use thiserror::Error;

/// Constant lookup failures
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum ConstError {
    #[error("xv6 has no memory protection flags: {0}")]
    Unsupported(String),

    #[error("xv6 constant {0} not found")]
    NotFound(String),

    #[error("not an xv6 source tree: {0} missing")]
    NotXv6Tree(String),

    #[error("not an xv6 source tree: Makefile {0}")]
    ForeignMakefile(String),
}

/// Constants every extraction carries
pub const BUILTINS: &[(&str, u64)] = &[
    ("XV6_NPROC", 64),
    ("XV6_NOFILE", 16),
    ("XV6_NFILE", 100),
    ("XV6_NINODE", 50),
    ("XV6_NDEV", 10),
    ("XV6_ROOTDEV", 1),
    ("XV6_MAXARG", 32),
    ("XV6_PGSIZE", 4096),
    ("XV6_PGSHIFT", 12),
    ("XV6_ROOTINO", 1),
    ("XV6_BSIZE", 1024),
    ("XV6_NDIRECT", 12),
    ("XV6_NINDIRECT", 256),
    ("XV6_MAXFILE", 12 + 256),
    ("XV6_KSTACKSIZE", 4096),
];

const MAP_FLAGS: &[(&str, u64)] = &[
    ("MAP_PRIVATE", 0x02),
    ("MAP_ANON", 0x20),
    ("MAP_ANONYMOUS", 0x20),
];

const FILE_TYPES: &[(&str, u64)] = &[
    ("S_IFDIR", 0x4000),
    ("S_IFREG", 0x8000),
    ("S_IFCHR", 0x2000),
    ("S_IFBLK", 0x6000),
    ("S_IFIFO", 0x1000),
];

const AT_FLAGS: &[(&str, u64)] = &[("AT_FDCWD", 0xffff_ff9c)];

const COMMON: &[(&str, u64)] = &[
    ("EPERM", 1),
    ("ENOENT", 2),
    ("ESRCH", 3),
    ("EINTR", 4),
    ("EIO", 5),
    ("ENXIO", 6),
    ("E2BIG", 7),
    ("ENOEXEC", 8),
    ("EBADF", 9),
    ("ECHILD", 10),
    ("EAGAIN", 11),
    ("ENOMEM", 12),
    ("EACCES", 13),
    ("EFAULT", 14),
    ("EBUSY", 16),
    ("EEXIST", 17),
    ("EXDEV", 18),
    ("ENODEV", 19),
    ("ENOTDIR", 20),
    ("EISDIR", 21),
    ("EINVAL", 22),
    ("ENFILE", 23),
    ("EMFILE", 24),
    ("ENOTTY", 25),
    ("ETXTBSY", 26),
    ("EFBIG", 27),
    ("ENOSPC", 28),
    ("ESPIPE", 29),
    ("EROFS", 30),
    ("EMLINK", 31),
    ("EPIPE", 32),
    ("S_IRUSR", 0o400),
    ("S_IWUSR", 0o200),
    ("S_IXUSR", 0o100),
    ("S_IRGRP", 0o040),
    ("S_IWGRP", 0o020),
    ("S_IXGRP", 0o010),
    ("S_IROTH", 0o004),
    ("S_IWOTH", 0o002),
    ("S_IXOTH", 0o001),
    ("S_ISUID", 0o4000),
    ("S_ISGID", 0o2000),
    ("S_ISVTX", 0o1000),
    ("SEEK_SET", 0),
    ("SEEK_CUR", 1),
    ("SEEK_END", 2),
    ("NULL", 0),
];

/// Files whose presence marks an xv6 source tree
pub const XV6_TREE_MARKERS: &[&str] = &["Makefile", "kernel/kernel.ld", "kernel/main.c", "user/init.c"];

/// At least one of these must appear in an xv6 Makefile
pub const XV6_MAKEFILE_HINTS: &[&str] = &["xv6", "QEMU", "riscv64", "kernel.ld"];

fn find(table: &[(&str, u64)], name: &str) -> Result<u64, ConstError> {
    table
        .iter()
        .find(|(known, _)| *known == name)
        .map(|(_, value)| *value)
        .ok_or_else(|| ConstError::NotFound(name.to_string()))
}

fn open_flag(name: &str) -> Result<u64, ConstError> {
    let value = match name {
        "O_RDONLY" => flags::O_RDONLY,
        "O_WRONLY" => flags::O_WRONLY,
        "O_RDWR" => flags::O_RDWR,
        "O_CREATE" => flags::O_CREATE,
        "O_TRUNC" => flags::O_TRUNC,
        _ => return Err(ConstError::NotFound(name.to_string())),
    };
    Ok(value as u64)
}

/// Value of one named constant
pub fn lookup(name: &str) -> Result<u64, ConstError> {
    if let Some(call) = name.strip_prefix("SYS_") {
        return XV6_TABLE
            .by_name(call)
            .map(|entry| entry.nr)
            .ok_or_else(|| ConstError::NotFound(name.to_string()));
    }
    if name.starts_with("PROT_") {
        return Err(ConstError::Unsupported(name.to_string()));
    }
    if name.starts_with("O_") {
        return open_flag(name);
    }
    if name.starts_with("MAP_") {
        return find(MAP_FLAGS, name);
    }
    if name.starts_with("S_IF") {
        return find(FILE_TYPES, name);
    }
    if name.starts_with("AT_") {
        return find(AT_FLAGS, name);
    }
    find(COMMON, name).or_else(|_| find(BUILTINS, name))
}

/// Result of extracting a batch of constants
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extracted {
    pub consts: BTreeMap<String, u64>,
    pub undeclared: BTreeSet<String>,
}

/// Look up every name; builtins are always included
pub fn extract<'a>(names: impl IntoIterator<Item = &'a str>) -> Extracted {
    let mut out = Extracted::default();
    for name in names {
        match lookup(name) {
            Ok(value) => {
                out.consts.insert(name.to_string(), value);
            }
            Err(_) => {
                out.undeclared.insert(name.to_string());
            }
        }
    }
    for (name, value) in BUILTINS {
        out.consts.insert((*name).to_string(), *value);
    }
    out
}

/// Verify `dir` looks like an xv6 source tree
pub fn check_source_tree(dir: impl AsRef<Path>) -> Result<(), ConstError> {
    let dir = dir.as_ref();
    if let Some(missing) = XV6_TREE_MARKERS.iter().find(|marker| !dir.join(marker).exists()) {
        return Err(ConstError::NotXv6Tree((*missing).to_string()));
    }
    let makefile = std::fs::read_to_string(dir.join("Makefile"))
        .map_err(|e| ConstError::ForeignMakefile(format!("unreadable: {e}")))?;
    if XV6_MAKEFILE_HINTS.iter().any(|hint| makefile.contains(hint)) {
        Ok(())
    } else {
        Err(ConstError::ForeignMakefile("has no xv6 build rules".into()))
    }
}
