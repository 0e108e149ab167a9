/*!
 * Target Architectures
 * Per-arch memory layout of the executor data segment
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Architectures the xv6 target is built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Arch {
    #[default]
    #[serde(rename = "riscv64")]
    RiscV64,
    #[serde(rename = "386")]
    I386,
}

impl Arch {
    pub const ALL: [Arch; 2] = [Arch::RiscV64, Arch::I386];

    pub const fn name(self) -> &'static str {
        match self {
            Arch::RiscV64 => "riscv64",
            Arch::I386 => "386",
        }
    }

    pub const fn params(self) -> ArchParams {
        match self {
            Arch::RiscV64 => ArchParams {
                page_size: 4 << 10,
                data_offset: 16 << 20,
                num_pages: 512,
            },
            Arch::I386 => ArchParams {
                page_size: 4 << 10,
                data_offset: 8 << 20,
                num_pages: 512,
            },
        }
    }

    /// Parameters for an arch name, falling back to riscv64
    pub fn params_for(name: &str) -> ArchParams {
        name.parse::<Arch>().unwrap_or_default().params()
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Arch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "riscv64" => Ok(Arch::RiscV64),
            "386" | "i386" => Ok(Arch::I386),
            other => Err(format!("unknown xv6 arch: {other}")),
        }
    }
}

/// Data segment layout for one arch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchParams {
    pub page_size: usize,
    /// Preferred segment base; xv6 places the segment wherever sbrk puts it
    pub data_offset: usize,
    pub num_pages: usize,
}

impl ArchParams {
    /// Bytes the bootstrap reserves
    pub const fn data_size(&self) -> usize {
        self.page_size * self.num_pages
    }
}
