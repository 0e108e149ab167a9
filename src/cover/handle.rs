/*!
 * Coverage Handle
 * Four-state coverage session that degrades to a no-op without hardware
 */

use super::buffer::{Comparison, CoverBuffer, CoverWriter, COVER_DATA_OFFSET};
use crate::core::Pc;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Coverage support a target advertises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CoverCapability {
    /// No instrumentation; every handle is unavailable
    #[default]
    None,
    /// Shared buffer of `words` 64-bit slots
    Shared { words: usize },
}

/// Lifecycle state of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverState {
    Closed,
    Open,
    Enabled,
    Collecting,
}

/// What a handle reads from
#[derive(Debug, Clone)]
pub enum CoverBacking {
    Unavailable,
    Mapped(CoverBuffer),
}

/// One coverage session
#[derive(Debug, Clone)]
pub struct CoverageHandle {
    state: CoverState,
    backing: CoverBacking,
    extra: bool,
    collect_comps: bool,
}

impl CoverageHandle {
    /// Handle in the closed state
    pub fn closed() -> Self {
        Self {
            state: CoverState::Closed,
            backing: CoverBacking::Unavailable,
            extra: false,
            collect_comps: false,
        }
    }

    /// Open a session for the given capability
    ///
    /// A buffer that cannot be mapped leaves the handle open but unavailable.
    pub fn open(capability: CoverCapability, extra: bool) -> Self {
        let backing = match capability {
            CoverCapability::None => {
                debug!(extra, "coverage unavailable on this target");
                CoverBacking::Unavailable
            }
            CoverCapability::Shared { words } => match CoverBuffer::map(words) {
                Ok(buffer) => {
                    debug!(words, extra, "coverage buffer mapped");
                    CoverBacking::Mapped(buffer)
                }
                Err(e) => {
                    warn!(words, error = %e, "coverage buffer unavailable");
                    CoverBacking::Unavailable
                }
            },
        };
        Self {
            state: CoverState::Open,
            backing,
            extra,
            collect_comps: false,
        }
    }

    /// Start a collection window, truncating the buffer
    pub fn enable(&mut self, collect_comps: bool, extra: bool) {
        if self.state == CoverState::Closed {
            debug!("enable on a closed coverage handle ignored");
            return;
        }
        self.state = CoverState::Enabled;
        self.collect_comps = collect_comps;
        self.extra = extra;
        if let CoverBacking::Mapped(buffer) = &self.backing {
            buffer.reset();
        }
    }

    /// Clear collected entries ahead of the next window
    pub fn reset(&mut self) {
        if let CoverBacking::Mapped(buffer) = &self.backing {
            buffer.reset();
        }
    }

    /// PCs covered since the last reset
    pub fn collect(&mut self) -> Vec<Pc> {
        if self.state != CoverState::Enabled {
            return Vec::new();
        }
        self.state = CoverState::Collecting;
        let pcs = match &self.backing {
            CoverBacking::Unavailable => Vec::new(),
            CoverBacking::Mapped(buffer) if self.collect_comps => {
                buffer.comparisons().iter().map(|c| c.pc).collect()
            }
            CoverBacking::Mapped(buffer) => buffer.pcs(),
        };
        self.state = CoverState::Enabled;
        pcs
    }

    /// Comparison records since the last reset (comparison mode only)
    pub fn collect_comparisons(&mut self) -> Vec<Comparison> {
        if self.state != CoverState::Enabled || !self.collect_comps {
            return Vec::new();
        }
        self.state = CoverState::Collecting;
        let records = match &self.backing {
            CoverBacking::Unavailable => Vec::new(),
            CoverBacking::Mapped(buffer) => buffer.comparisons(),
        };
        self.state = CoverState::Enabled;
        records
    }

    /// Tear down from any state
    pub fn close(&mut self) {
        self.backing = CoverBacking::Unavailable;
        self.state = CoverState::Closed;
    }

    pub fn state(&self) -> CoverState {
        self.state
    }

    pub fn is_available(&self) -> bool {
        matches!(self.backing, CoverBacking::Mapped(_))
    }

    pub fn extra(&self) -> bool {
        self.extra
    }

    /// Mapping size in bytes, zero when unavailable
    pub fn size_bytes(&self) -> usize {
        match &self.backing {
            CoverBacking::Unavailable => 0,
            CoverBacking::Mapped(buffer) => buffer.size_bytes(),
        }
    }

    /// Byte offset where data begins
    pub fn data_offset(&self) -> usize {
        if self.is_available() {
            COVER_DATA_OFFSET
        } else {
            0
        }
    }

    /// Current write cursor in entries
    pub fn write_offset(&self) -> usize {
        match &self.backing {
            CoverBacking::Unavailable => 0,
            CoverBacking::Mapped(buffer) => buffer.cursor(),
        }
    }

    /// Byte offset of the comparison table in comparison mode
    pub fn comparison_offset(&self) -> Option<usize> {
        (self.is_available() && self.collect_comps).then_some(COVER_DATA_OFFSET)
    }

    /// Writer for the target side of a mapped buffer
    pub fn writer(&self) -> Option<CoverWriter> {
        match &self.backing {
            CoverBacking::Unavailable => None,
            CoverBacking::Mapped(buffer) => Some(buffer.writer()),
        }
    }
}

impl Default for CoverageHandle {
    fn default() -> Self {
        Self::closed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unavailable_handle_is_inert() {
        let mut handle = CoverageHandle::open(CoverCapability::None, false);
        assert_eq!(handle.state(), CoverState::Open);
        assert!(!handle.is_available());

        handle.enable(true, true);
        handle.reset();
        assert!(handle.collect().is_empty());
        assert!(handle.collect_comparisons().is_empty());
        assert_eq!(handle.size_bytes(), 0);
        assert_eq!(handle.comparison_offset(), None);
        assert!(handle.writer().is_none());
    }

    #[test]
    fn test_collect_requires_enable() {
        let mut handle = CoverageHandle::open(CoverCapability::Shared { words: 8 }, false);
        handle.writer().unwrap().record_pc(1);
        assert!(handle.collect().is_empty());
        assert_eq!(handle.state(), CoverState::Open);
    }

    #[test]
    fn test_shared_lifecycle() {
        let mut handle = CoverageHandle::open(CoverCapability::Shared { words: 8 }, false);
        handle.enable(false, false);
        assert_eq!(handle.data_offset(), 8);

        let writer = handle.writer().unwrap();
        writer.record_pc(0x100);
        writer.record_pc(0x200);
        assert_eq!(handle.write_offset(), 2);
        assert_eq!(handle.collect(), vec![0x100, 0x200]);
        assert_eq!(handle.state(), CoverState::Enabled);

        handle.reset();
        assert!(handle.collect().is_empty());

        handle.close();
        assert_eq!(handle.state(), CoverState::Closed);
        assert!(!handle.is_available());
    }

    #[test]
    fn test_enable_on_closed_is_ignored() {
        let mut handle = CoverageHandle::closed();
        handle.enable(false, false);
        assert_eq!(handle.state(), CoverState::Closed);
    }

    #[test]
    fn test_comparison_mode_reports_pcs_of_records() {
        let mut handle = CoverageHandle::open(CoverCapability::Shared { words: 9 }, false);
        handle.enable(true, false);
        assert_eq!(handle.comparison_offset(), Some(8));

        handle.writer().unwrap().record_comparison(Comparison {
            kind: 3,
            arg1: 1,
            arg2: 2,
            pc: 0x42,
        });
        assert_eq!(handle.collect(), vec![0x42]);
        assert_eq!(handle.collect_comparisons().len(), 1);
    }
}
