/*!
 * PC Filter
 * Decides which reported PCs belong to the target under test
 */

use crate::core::Pc;
use serde::{Deserialize, Serialize};

/// Half-open address range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PcRange {
    pub start: Pc,
    pub end: Pc,
}

impl PcRange {
    pub const fn new(start: Pc, end: Pc) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, pc: Pc) -> bool {
        self.start <= pc && pc < self.end
    }
}

/// PC validation policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", content = "range", rename_all = "snake_case")]
pub enum PcFilter {
    /// Accept every PC
    #[default]
    All,
    /// Accept PCs inside the kernel text range
    Range(PcRange),
}

impl PcFilter {
    /// Accepts 32-bit and 64-bit PCs alike
    #[inline]
    pub fn check(&self, pc: impl Into<Pc>) -> bool {
        match self {
            PcFilter::All => true,
            PcFilter::Range(range) => range.contains(pc.into()),
        }
    }
}
