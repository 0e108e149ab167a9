/*!
 * xv6 Console Parser
 * Finds the first crash in console output and cuts a report around it
 */

use super::{CrashKind, Report};
use regex::Regex;
use std::sync::OnceLock;

/// Lines kept on each side of the crash line
const CONTEXT_LINES: usize = 10;

/// Frames scanned after a stack trace header
const MAX_TRACE_LINES: usize = 20;

const CRASH_PATTERNS: &[&str] = &[
    r"panic: (.+)",
    r"PANIC: (.+)",
    r"assertion failed: (.+)",
    r"assert\((.+)\) failed",
    r"page fault: (.+)",
    r"segmentation fault: (.+)",
    r"invalid memory access: (.+)",
    r"stack overflow",
    r"deadlock detected",
    r"kernel error: (.+)",
    r"fatal error: (.+)",
];

const SUSPICIOUS: &[&str] = &[
    "trap",
    "interrupt",
    "exception",
    "fault",
    "error",
    "warning",
    "corruption",
    "invalid",
    "illegal",
    "unexpected",
];

/// Line patterns that produce a titled report, in priority order
const TITLED: &[(&str, &str)] = &[
    (r"panic: (.+)", "XV6 kernel panic: "),
    (r"assertion failed: (.+)", "XV6 assertion failed: "),
    (r"segmentation fault: (.+)", "XV6 segmentation fault: "),
    (r"kernel error: (.+)", "XV6 kernel error: "),
];

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
}

fn crash_patterns() -> &'static [Regex] {
    static CELL: OnceLock<Vec<Regex>> = OnceLock::new();
    CELL.get_or_init(|| compile(CRASH_PATTERNS))
}

fn titled_patterns() -> &'static [(Regex, &'static str)] {
    static CELL: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    CELL.get_or_init(|| {
        TITLED
            .iter()
            .filter_map(|(p, prefix)| Regex::new(p).ok().map(|re| (re, *prefix)))
            .collect()
    })
}

/// Crash reporter for xv6 consoles
#[derive(Debug, Default, Clone, Copy)]
pub struct Xv6Reporter;

impl Xv6Reporter {
    pub fn new() -> Self {
        Self
    }

    /// Whether the output shows any crash
    pub fn contains_crash(&self, output: &str) -> bool {
        crash_patterns().iter().any(|re| re.is_match(output))
    }

    /// Extract the first crash, or flag suspicious output as a whole
    pub fn parse(&self, output: &str) -> Option<Report> {
        let lines: Vec<&str> = output.split('\n').collect();
        let mut offset = 0;

        for (idx, raw) in lines.iter().enumerate() {
            let line = raw.trim();

            for (re, prefix) in titled_patterns() {
                if let Some(caps) = re.captures(line) {
                    let title = format!("{prefix}{}", &caps[1]);
                    return Some(make_report(title, context(&lines, idx), offset));
                }
            }

            if line.contains("backtrace:") || line.contains("stack trace:") {
                return Some(make_report(
                    "XV6 stack trace".to_string(),
                    stack_trace(&lines, idx),
                    offset,
                ));
            }

            offset += raw.len() + 1;
        }

        let lower = output.to_lowercase();
        if SUSPICIOUS.iter().any(|word| lower.contains(word)) {
            return Some(make_report(
                "XV6 suspicious output".to_string(),
                output.to_string(),
                0,
            ));
        }
        None
    }
}

fn make_report(title: String, report: String, start: usize) -> Report {
    let kind = CrashKind::classify(&title);
    let end = start + report.len();
    Report {
        title,
        report,
        start,
        end,
        kind,
    }
}

/// Lines around `crash`, with the crash line marked
fn context(lines: &[&str], crash: usize) -> String {
    let start = crash.saturating_sub(CONTEXT_LINES);
    let end = (crash + CONTEXT_LINES + 1).min(lines.len());
    (start..end)
        .map(|i| {
            if i == crash {
                format!(">>> {} <<<", lines[i])
            } else {
                lines[i].to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Header line plus the frame lines that follow it
fn stack_trace(lines: &[&str], header: usize) -> String {
    let frames = lines[header + 1..]
        .iter()
        .take(MAX_TRACE_LINES - 1)
        .take_while(|line| is_frame(line.trim()));
    std::iter::once(&lines[header])
        .chain(frames)
        .copied()
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_frame(line: &str) -> bool {
    if line.is_empty() {
        return false;
    }
    (line.len() > 2 && line.starts_with("0x"))
        || (line.contains('+') && line.contains("0x"))
        || line.contains("()")
}
