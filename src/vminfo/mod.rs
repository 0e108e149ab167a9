/*!
 * VM Info Module
 * Support checks the engine runs before fuzzing an xv6 machine
 *
 * xv6 is monolithic and reports no machine info and no kernel modules.
 */

pub mod features;
pub mod syscalls;

pub use features::{check_feature, Feature};
pub use syscalls::{check_call, check_syscall};

use serde::Serialize;
use thiserror::Error;

/// A call the target cannot run, with the reason shown to users
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{name}: {reason}")]
pub struct Unsupported {
    pub name: String,
    pub reason: String,
}

impl Unsupported {
    pub fn new(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
