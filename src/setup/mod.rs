/*!
 * Setup Module
 * Bootstrap ordering and capability hooks run before the first dispatch
 */

pub mod hooks;
pub mod plan;
pub mod sequence;

pub use hooks::{CapabilityStubs, NamespaceKind, SetupHook};
pub use plan::SetupPlan;
pub use sequence::{Booted, Fresh, SetupSequence, ALLOC_FAILURE_MESSAGE, ALLOC_FAILURE_STATUS};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Setup hook failures (full-featured targets only; xv6 hooks never fail)
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case", tag = "error_type", content = "details")]
pub enum SetupError {
    #[error("Setup hook {hook} failed: {reason}")]
    HookFailed { hook: String, reason: String },
}

impl SetupError {
    pub fn hook_failed(hook: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::HookFailed {
            hook: hook.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for setup operations
#[must_use = "setup operations can fail and must be handled"]
pub type SetupResult<T> = Result<T, SetupError>;
