/*!
 * Coverage Buffer
 * Shared memory region the instrumented target appends coverage into
 *
 * Layout (64-bit words):
 * - word 0: write cursor (entries written so far)
 * - word 1..: PCs, or 4-word comparison records in comparison mode
 */

use super::{CoverError, CoverResult};
use crate::core::Pc;
use nix::sys::mman::{mmap_anonymous, munmap, MapFlags, ProtFlags};
use serde::{Deserialize, Serialize};
use std::ffi::c_void;
use std::num::NonZeroUsize;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::warn;

/// Byte offset of the first data word
pub const COVER_DATA_OFFSET: usize = std::mem::size_of::<u64>();

/// Words per comparison record
pub const COMPARISON_WORDS: usize = 4;

/// One comparison operand pair observed by the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comparison {
    pub kind: u64,
    pub arg1: u64,
    pub arg2: u64,
    pub pc: Pc,
}

#[derive(Debug)]
struct Mapping {
    base: NonNull<c_void>,
    words: usize,
}

// All access goes through atomics over a MAP_SHARED region.
unsafe impl Send for Mapping {}
unsafe impl Sync for Mapping {}

impl Mapping {
    fn slots(&self) -> &[AtomicU64] {
        // SAFETY: the region is `words * 8` bytes, page aligned, and lives
        // until drop; AtomicU64 has the layout of u64.
        unsafe { std::slice::from_raw_parts(self.base.as_ptr().cast::<AtomicU64>(), self.words) }
    }
}

impl Drop for Mapping {
    fn drop(&mut self) {
        let bytes = self.words * COVER_DATA_OFFSET;
        // SAFETY: `base` came from `map` with this length and every slice
        // handed out borrows the mapping, so none outlive it.
        if let Err(e) = unsafe { munmap(self.base, bytes) } {
            warn!(bytes, error = %e, "coverage buffer unmap failed");
        }
    }
}

/// Mapped coverage buffer
///
/// Clones share the same mapping. The region is MAP_SHARED, so children
/// forked after mapping write into the parent's view.
#[derive(Debug, Clone)]
pub struct CoverBuffer {
    mapping: Arc<Mapping>,
}

impl CoverBuffer {
    /// Map a buffer of `words` 64-bit slots, cursor included
    pub fn map(words: usize) -> CoverResult<Self> {
        if words < 2 {
            return Err(CoverError::InvalidSize(words));
        }
        let bytes = words
            .checked_mul(COVER_DATA_OFFSET)
            .and_then(NonZeroUsize::new)
            .ok_or(CoverError::InvalidSize(words))?;

        // SAFETY: a fresh anonymous mapping at a kernel-chosen address
        // aliases no existing memory.
        let base = unsafe {
            mmap_anonymous(
                None,
                bytes,
                ProtFlags::PROT_READ | ProtFlags::PROT_WRITE,
                MapFlags::MAP_SHARED,
            )
        }
        .map_err(|e| CoverError::MapFailed(e.to_string()))?;

        Ok(Self {
            mapping: Arc::new(Mapping { base, words }),
        })
    }

    #[inline]
    fn slots(&self) -> &[AtomicU64] {
        self.mapping.slots()
    }

    /// Total mapping size in bytes
    pub fn size_bytes(&self) -> usize {
        self.mapping.words * COVER_DATA_OFFSET
    }

    /// Data slots after the cursor word
    pub fn capacity(&self) -> usize {
        self.mapping.words - 1
    }

    /// Entries the target reports as written
    pub fn cursor(&self) -> usize {
        self.slots()[0].load(Ordering::Acquire) as usize
    }

    pub fn reset(&self) {
        self.slots()[0].store(0, Ordering::Release);
    }

    /// PCs up to the cursor, clamped to capacity
    pub fn pcs(&self) -> Vec<Pc> {
        let count = self.cursor().min(self.capacity());
        self.slots()[1..=count]
            .iter()
            .map(|slot| slot.load(Ordering::Relaxed))
            .collect()
    }

    /// Comparison records up to the cursor, clamped to capacity
    pub fn comparisons(&self) -> Vec<Comparison> {
        let count = self.cursor().min(self.capacity() / COMPARISON_WORDS);
        let slots = self.slots();
        (0..count)
            .map(|i| {
                let at = 1 + i * COMPARISON_WORDS;
                Comparison {
                    kind: slots[at].load(Ordering::Relaxed),
                    arg1: slots[at + 1].load(Ordering::Relaxed),
                    arg2: slots[at + 2].load(Ordering::Relaxed),
                    pc: slots[at + 3].load(Ordering::Relaxed),
                }
            })
            .collect()
    }

    /// Target-side writer sharing this mapping
    pub fn writer(&self) -> CoverWriter {
        CoverWriter {
            buffer: self.clone(),
        }
    }
}

/// Appends coverage the way instrumented target code does
#[derive(Debug, Clone)]
pub struct CoverWriter {
    buffer: CoverBuffer,
}

impl CoverWriter {
    /// Append a PC; returns false once the buffer is full
    pub fn record_pc(&self, pc: Pc) -> bool {
        let slots = self.buffer.slots();
        let idx = self.buffer.cursor();
        if idx >= self.buffer.capacity() {
            return false;
        }
        slots[1 + idx].store(pc, Ordering::Relaxed);
        slots[0].store((idx + 1) as u64, Ordering::Release);
        true
    }

    /// Append a comparison record; returns false once the buffer is full
    pub fn record_comparison(&self, cmp: Comparison) -> bool {
        let slots = self.buffer.slots();
        let idx = self.buffer.cursor();
        if (idx + 1) * COMPARISON_WORDS > self.buffer.capacity() {
            return false;
        }
        let at = 1 + idx * COMPARISON_WORDS;
        slots[at].store(cmp.kind, Ordering::Relaxed);
        slots[at + 1].store(cmp.arg1, Ordering::Relaxed);
        slots[at + 2].store(cmp.arg2, Ordering::Relaxed);
        slots[at + 3].store(cmp.pc, Ordering::Relaxed);
        slots[0].store((idx + 1) as u64, Ordering::Release);
        true
    }
}
