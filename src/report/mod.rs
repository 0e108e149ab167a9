/*!
 * Report Module
 * Crash detection and extraction for xv6 console output
 */

pub mod parser;

pub use parser::Xv6Reporter;

use serde::{Deserialize, Serialize};

/// Crash category derived from a report title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CrashKind {
    KernelPanic,
    AssertionFailure,
    MemoryError,
    StackError,
    Deadlock,
    Unknown,
}

impl CrashKind {
    /// Classify a title by its keywords
    pub fn classify(title: &str) -> Self {
        let title = title.to_lowercase();
        if title.contains("panic") {
            CrashKind::KernelPanic
        } else if title.contains("assertion") {
            CrashKind::AssertionFailure
        } else if title.contains("segmentation") || title.contains("segfault") {
            CrashKind::MemoryError
        } else if title.contains("stack") {
            CrashKind::StackError
        } else if title.contains("deadlock") {
            CrashKind::Deadlock
        } else {
            CrashKind::Unknown
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CrashKind::KernelPanic => "kernel-panic",
            CrashKind::AssertionFailure => "assertion-failure",
            CrashKind::MemoryError => "memory-error",
            CrashKind::StackError => "stack-error",
            CrashKind::Deadlock => "deadlock",
            CrashKind::Unknown => "unknown",
        }
    }
}

/// One extracted crash
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    /// Excerpt of the console output describing the crash
    pub report: String,
    /// Byte offset of the crash line in the output
    pub start: usize,
    /// `start` plus the excerpt length
    pub end: usize,
    pub kind: CrashKind,
}

impl Report {
    /// xv6 sources worth reading for this crash
    pub fn relevant_files(&self) -> &'static [&'static str] {
        let title = self.title.to_lowercase();
        let has = |needles: &[&str]| needles.iter().any(|n| title.contains(n));

        if has(&["vm", "memory", "page"]) {
            &["kernel/vm.c", "kernel/kalloc.c"]
        } else if has(&["proc", "process"]) {
            &["kernel/proc.c", "kernel/swtch.S"]
        } else if has(&["syscall"]) {
            &["kernel/syscall.c", "kernel/sysproc.c"]
        } else if has(&["fs", "file"]) {
            &["kernel/fs.c", "kernel/file.c", "kernel/bio.c"]
        } else if has(&["lock"]) {
            &["kernel/spinlock.c", "kernel/sleeplock.c"]
        } else {
            &[
                "kernel/main.c",
                "kernel/vm.c",
                "kernel/proc.c",
                "kernel/syscall.c",
                "kernel/trap.c",
                "kernel/fs.c",
                "kernel/bio.c",
                "kernel/sleeplock.c",
                "kernel/spinlock.c",
            ]
        }
    }
}
