/*!
 * Monitoring Module
 * Structured logging and per-syscall spans
 */

pub mod tracer;

pub use tracer::{init_tracing, SyscallSpan, SLOW_CALL_THRESHOLD, TRACE_JSON_ENV};
