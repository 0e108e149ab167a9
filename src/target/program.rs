/*!
 * Programs
 * JSON call sequences and their layout into the data segment
 */

use super::traits::DataSegment;
use crate::core::{ExecutorError, ExecutorResult, Word};
use serde::{Deserialize, Serialize};

/// One argument as written in a program file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgramArg {
    /// Signed integer, passed as its two's complement word
    Int(i64),
    /// Unsigned integer too large for `Int`
    Unsigned(u64),
    /// String copied into the data segment with a trailing NUL
    Text(String),
    /// Zeroed buffer of `len` bytes in the data segment
    Buffer { len: usize },
}

/// One call in a program
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramCall {
    pub call: String,
    /// Raw target number for calls outside the table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nr: Option<u64>,
    #[serde(default)]
    pub args: Vec<ProgramArg>,
}

impl ProgramCall {
    pub fn new(call: impl Into<String>, args: Vec<ProgramArg>) -> Self {
        Self {
            call: call.into(),
            nr: None,
            args,
        }
    }
}

/// Parse a JSON program
pub fn parse_program(json: &str) -> ExecutorResult<Vec<ProgramCall>> {
    serde_json::from_str(json).map_err(|e| ExecutorError::InvalidProgram(e.to_string()))
}

/// Bump allocator over the data segment
#[derive(Debug)]
pub struct DataArena {
    segment: DataSegment,
    used: usize,
}

impl DataArena {
    const ALIGN: usize = std::mem::size_of::<Word>();

    pub fn new(segment: DataSegment) -> Self {
        Self { segment, used: 0 }
    }

    pub fn used(&self) -> usize {
        self.used
    }

    /// Lay out one argument, returning the word passed in its slot
    ///
    /// # Safety
    ///
    /// The segment must be mapped and writable for its full size.
    pub unsafe fn place(&mut self, arg: &ProgramArg) -> ExecutorResult<Word> {
        match arg {
            ProgramArg::Int(v) => Ok(*v as Word),
            ProgramArg::Unsigned(v) => Ok(*v as Word),
            ProgramArg::Text(text) => {
                let at = self.reserve(text.len() + 1)?;
                // SAFETY: `reserve` returned a range inside the segment.
                unsafe {
                    std::ptr::copy_nonoverlapping(text.as_ptr(), at as *mut u8, text.len());
                    *((at + text.len()) as *mut u8) = 0;
                }
                Ok(at)
            }
            ProgramArg::Buffer { len } => {
                let at = self.reserve(*len)?;
                // SAFETY: `reserve` returned a range inside the segment.
                unsafe { std::ptr::write_bytes(at as *mut u8, 0, *len) };
                Ok(at)
            }
        }
    }

    fn reserve(&mut self, len: usize) -> ExecutorResult<usize> {
        let start = self.used.next_multiple_of(Self::ALIGN);
        let available = self.segment.size.saturating_sub(start);
        if len > available {
            return Err(ExecutorError::DataExhausted {
                needed: len,
                available,
            });
        }
        self.used = start + len;
        Ok(self.segment.base + start)
    }
}
