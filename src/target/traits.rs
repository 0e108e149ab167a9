/*!
 * Target Traits
 * The backend contract a target OS implements for the executor
 */

use super::arch::{Arch, ArchParams};
use crate::core::Pc;
use crate::cover::{CoverCapability, CoverageHandle, PcFilter};
use crate::setup::CapabilityStubs;
use crate::syscalls::Dispatcher;
use crate::vminfo::Feature;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bootstrap failures; always fatal for the executor process
#[derive(Error, Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum BootstrapError {
    #[error("failed to allocate memory: data segment of {size} bytes refused")]
    DataSegmentRefused { size: usize },
}

/// Data segment the engine lays program buffers into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataSegment {
    pub base: usize,
    pub size: usize,
}

/// What the executor asks the bootstrap to reserve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSegmentRequest {
    /// Preferred base; targets without fixed mappings may ignore it
    pub preferred_base: usize,
    pub size: usize,
}

impl DataSegmentRequest {
    pub const fn for_arch(params: ArchParams) -> Self {
        Self {
            preferred_base: params.data_offset,
            size: params.data_size(),
        }
    }
}

/// One-time process initialization
pub trait Bootstrap {
    /// Reserve the data segment; called once, before any dispatch
    fn init(
        &mut self,
        argv: &[String],
        request: DataSegmentRequest,
    ) -> Result<DataSegment, BootstrapError>;
}

/// Coverage feedback around each dispatch
///
/// Defaults drive the handle directly; targets only say what they support.
pub trait CoverageReporter {
    /// Capability granted for a requested one
    fn cover_capability(&self, requested: CoverCapability) -> CoverCapability;

    /// PC validation policy
    fn pc_filter(&self) -> PcFilter {
        PcFilter::All
    }

    fn cover_open(&self, requested: CoverCapability, extra: bool) -> CoverageHandle {
        CoverageHandle::open(self.cover_capability(requested), extra)
    }

    fn cover_enable(&self, handle: &mut CoverageHandle, collect_comps: bool, extra: bool) {
        handle.enable(collect_comps, extra);
    }

    fn cover_reset(&self, handle: &mut CoverageHandle) {
        handle.reset();
    }

    fn cover_collect(&self, handle: &mut CoverageHandle) -> Vec<Pc> {
        handle.collect()
    }

    fn cover_check(&self, pc: Pc) -> bool {
        self.pc_filter().check(pc)
    }
}

/// A complete target backend
pub trait Target: Bootstrap + Dispatcher + CoverageReporter + CapabilityStubs {
    /// OS name as the engine knows it
    const NAME: &'static str;

    fn arch(&self) -> Arch;

    /// Reason a feature is unavailable, `None` when supported
    fn feature_support(&self, feature: Feature) -> Option<&'static str>;
}
