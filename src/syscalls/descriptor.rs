/*!
 * Syscall Descriptor
 * Immutable per-dispatch identity of one call
 */

use crate::core::{CallId, ExecutorError, ExecutorResult};
use serde::{Deserialize, Serialize};

/// Identity of a call as handed to a dispatcher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyscallDescriptor {
    id: CallId,
    name: String,
    nr: u64,
    num_args: usize,
}

impl SyscallDescriptor {
    /// Create a descriptor, rejecting more arguments than the target passes
    pub fn new(
        id: CallId,
        name: impl Into<String>,
        nr: u64,
        num_args: usize,
        max_args: usize,
    ) -> ExecutorResult<Self> {
        let name = name.into();
        if num_args > max_args {
            return Err(ExecutorError::TooManyArgs {
                call: name,
                given: num_args,
                max: max_args,
            });
        }
        Ok(Self {
            id,
            name,
            nr,
            num_args,
        })
    }

    #[inline]
    pub fn id(&self) -> CallId {
        self.id
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn nr(&self) -> u64 {
        self.nr
    }

    #[inline]
    pub fn num_args(&self) -> usize {
        self.num_args
    }
}
