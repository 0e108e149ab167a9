/*!
 * Argument Vectors
 * Fixed-width word slots and their kind-directed coercion to native types
 */

use super::table::ArgKind;
use crate::core::{ExecutorError, ExecutorResult, Word};
use std::ffi::{c_char, c_void};

/// Fixed-size argument storage a dispatcher accepts
pub trait ArgumentSlots: Sized {
    /// Number of word slots
    const LEN: usize;

    /// Build from a possibly shorter slice, zero-filling the tail
    fn from_words(words: &[Word]) -> ExecutorResult<Self>;

    /// All slots, including zero-filled ones
    fn words(&self) -> &[Word];
}

/// Ordered sequence of `N` word-sized argument values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArgumentVector<const N: usize> {
    slots: [Word; N],
}

impl<const N: usize> ArgumentVector<N> {
    pub const fn new(slots: [Word; N]) -> Self {
        Self { slots }
    }

    pub const fn zeroed() -> Self {
        Self { slots: [0; N] }
    }

    /// Slot value, zero past the end
    #[inline]
    pub fn get(&self, idx: usize) -> Word {
        self.slots.get(idx).copied().unwrap_or(0)
    }

    /// Coerce every slot through the given signature
    ///
    /// Slots past the signature stay as untyped integers.
    pub fn decode(&self, signature: &[ArgKind]) -> CallArgs<N> {
        let mut args = [Arg::Int(0); N];
        for (idx, slot) in args.iter_mut().enumerate() {
            let kind = signature.get(idx).copied().unwrap_or(ArgKind::Int);
            *slot = Arg::coerce(kind, self.slots[idx]);
        }
        CallArgs { args }
    }
}

impl<const N: usize> Default for ArgumentVector<N> {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl<const N: usize> ArgumentSlots for ArgumentVector<N> {
    const LEN: usize = N;

    fn from_words(words: &[Word]) -> ExecutorResult<Self> {
        if words.len() > N {
            return Err(ExecutorError::TooManyArgs {
                call: "<raw>".into(),
                given: words.len(),
                max: N,
            });
        }
        let mut slots = [0; N];
        slots[..words.len()].copy_from_slice(words);
        Ok(Self { slots })
    }

    fn words(&self) -> &[Word] {
        &self.slots
    }
}

/// Typed argument after coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arg {
    Int(i32),
    Short(i16),
    Ptr(*mut c_void),
    CStr(*const c_char),
    Argv(*const *const c_char),
}

impl Arg {
    /// Coerce a raw word through its slot kind
    ///
    /// Integers truncate to the native width; pointers reinterpret the word.
    pub fn coerce(kind: ArgKind, word: Word) -> Self {
        match kind {
            ArgKind::Int | ArgKind::Fd | ArgKind::Pid | ArgKind::Len | ArgKind::Flags => {
                Arg::Int(word as i32)
            }
            ArgKind::Short => Arg::Short(word as i16),
            ArgKind::Ptr => Arg::Ptr(word as *mut c_void),
            ArgKind::CStr => Arg::CStr(word as *const c_char),
            ArgKind::Argv => Arg::Argv(word as *const *const c_char),
        }
    }

    /// Word this argument was coerced from, after truncation
    pub fn word(self) -> Word {
        match self {
            Arg::Int(v) => v as Word,
            Arg::Short(v) => v as Word,
            Arg::Ptr(p) => p as Word,
            Arg::CStr(p) => p as Word,
            Arg::Argv(p) => p as Word,
        }
    }
}

/// Decoded arguments of one call
///
/// Accessors return the slot in the requested native type. A slot of a
/// different kind is re-coerced from its word, so mismatches never fault here.
#[derive(Debug, Clone, Copy)]
pub struct CallArgs<const N: usize> {
    args: [Arg; N],
}

impl<const N: usize> CallArgs<N> {
    #[inline]
    pub fn get(&self, idx: usize) -> Arg {
        self.args.get(idx).copied().unwrap_or(Arg::Int(0))
    }

    pub fn int(&self, idx: usize) -> i32 {
        match self.get(idx) {
            Arg::Int(v) => v,
            other => other.word() as i32,
        }
    }

    pub fn short(&self, idx: usize) -> i16 {
        match self.get(idx) {
            Arg::Short(v) => v,
            other => other.word() as i16,
        }
    }

    pub fn ptr<T>(&self, idx: usize) -> *mut T {
        match self.get(idx) {
            Arg::Ptr(p) => p.cast(),
            other => other.word() as *mut T,
        }
    }

    pub fn cstr(&self, idx: usize) -> *const c_char {
        match self.get(idx) {
            Arg::CStr(p) => p,
            other => other.word() as *const c_char,
        }
    }

    pub fn argv(&self, idx: usize) -> *const *const c_char {
        match self.get(idx) {
            Arg::Argv(p) => p,
            other => other.word() as *const *const c_char,
        }
    }
}
