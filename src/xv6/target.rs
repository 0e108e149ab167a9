/*!
 * xv6 Target
 * The minimal conforming backend: relays calls, reports no coverage
 */

use super::abi::Xv6Abi;
use super::host::HostAbi;
use crate::core::{SyscallRet, Word};
use crate::cover::{CoverCapability, PcFilter};
use crate::target::{Arch, CoverageReporter, Target};
use crate::vminfo::{self, Feature};

/// xv6 backend over a native ABI
#[derive(Debug)]
pub struct Xv6Target<A: Xv6Abi = HostAbi> {
    pub(super) abi: A,
    arch: Arch,
}

impl<A: Xv6Abi> Xv6Target<A> {
    pub fn new(abi: A, arch: Arch) -> Self {
        Self { abi, arch }
    }

    pub fn abi(&self) -> &A {
        &self.abi
    }

    /// `syz_mmap`: the address is ignored and the segment grows by `len`
    pub fn syz_mmap(&self, _addr: Word, len: Word) -> SyscallRet {
        match i32::try_from(len) {
            Ok(len) => self.abi.sbrk(len),
            Err(_) => -1,
        }
    }
}

impl Xv6Target<HostAbi> {
    /// Target on the development host
    pub fn host(arch: Arch) -> Self {
        Self::new(HostAbi::new(), arch)
    }
}

impl<A: Xv6Abi> CoverageReporter for Xv6Target<A> {
    fn cover_capability(&self, _requested: CoverCapability) -> CoverCapability {
        CoverCapability::None
    }

    fn pc_filter(&self) -> PcFilter {
        PcFilter::All
    }
}

impl<A: Xv6Abi> Target for Xv6Target<A> {
    const NAME: &'static str = "xv6";

    fn arch(&self) -> Arch {
        self.arch
    }

    fn feature_support(&self, feature: Feature) -> Option<&'static str> {
        vminfo::check_feature(feature)
    }
}
