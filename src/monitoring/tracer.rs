/*!
 * Tracing
 * Structured tracing for dispatched syscalls using the tracing crate
 */

use crate::core::SyscallRet;
use std::time::{Duration, Instant};
use tracing::{debug, info, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Switches log output to JSON when `1` or `true`
pub const TRACE_JSON_ENV: &str = "XV6_EXECUTOR_TRACE_JSON";

/// Calls slower than this log a warning
pub const SLOW_CALL_THRESHOLD: Duration = Duration::from_millis(10);

/// Initialize structured tracing
///
/// Environment variables:
/// - RUST_LOG: Set log level (default: info)
/// - XV6_EXECUTOR_TRACE_JSON: Enable JSON output (default: false)
///
/// `force_json` turns JSON on regardless of the environment. A second call
/// leaves the first subscriber in place.
pub fn init_tracing(force_json: bool) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = force_json
        || std::env::var(TRACE_JSON_ENV)
            .map(|v| v == "1" || v == "true")
            .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    // Logs go to stderr; stdout carries call results.
    let initialized = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()
    };

    if initialized.is_ok() {
        info!(json = use_json, "structured tracing initialized");
    }
}

/// Span for one dispatched syscall
pub struct SyscallSpan {
    span: tracing::Span,
    start: Instant,
    name: &'static str,
    nr: u64,
}

impl SyscallSpan {
    pub fn new(name: &'static str, nr: u64) -> Self {
        let span = span!(
            Level::DEBUG,
            "syscall",
            syscall = name,
            nr = nr,
            duration_us = tracing::field::Empty,
            duration_ms = tracing::field::Empty,
            return_value = tracing::field::Empty,
            result = tracing::field::Empty,
        );

        let entered = span.enter();
        debug!(syscall = name, nr, "syscall started");
        drop(entered);

        Self {
            span,
            start: Instant::now(),
            name,
            nr,
        }
    }

    /// Record the native return value
    pub fn record_return(&self, ret: SyscallRet) {
        self.span.record("return_value", ret);
        self.span
            .record("result", if ret < 0 { "error" } else { "success" });
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

impl Drop for SyscallSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        let _entered = self.span.enter();

        if duration > SLOW_CALL_THRESHOLD {
            self.span.record("duration_ms", duration.as_millis() as u64);
            warn!(
                syscall = self.name,
                nr = self.nr,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow syscall detected"
            );
        } else {
            self.span.record("duration_us", duration.as_micros() as u64);
            debug!(
                syscall = self.name,
                nr = self.nr,
                duration_us = duration.as_micros() as u64,
                "syscall completed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_lifecycle_without_subscriber() {
        let span = SyscallSpan::new("getpid", 11);
        {
            let _entered = span.enter();
            span.record_return(42);
        }
        drop(span);
    }

    #[test]
    fn test_repeated_init_is_harmless() {
        init_tracing(false);
        init_tracing(true);
    }
}
