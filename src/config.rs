/*!
 * Executor Configuration
 *
 * Sandbox mode, feature flags, and coverage settings the engine requests.
 * Loaded from JSON, then overridden from XV6_EXECUTOR_* variables.
 */

use crate::core::{ExecutorError, ExecutorResult};
use crate::cover::CoverCapability;
use crate::target::Arch;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

/// Overrides the configured arch
pub const ARCH_ENV: &str = "XV6_EXECUTOR_ARCH";

/// Overrides the configured sandbox mode
pub const SANDBOX_ENV: &str = "XV6_EXECUTOR_SANDBOX";

/// Process isolation requested by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SandboxMode {
    #[default]
    None,
    Setuid,
    Namespace,
}

impl FromStr for SandboxMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(SandboxMode::None),
            "setuid" => Ok(SandboxMode::Setuid),
            "namespace" => Ok(SandboxMode::Namespace),
            other => Err(format!("unknown sandbox mode: {other}")),
        }
    }
}

/// Optional setup the engine asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FeatureFlags {
    pub net_injection: bool,
    pub net_devices: bool,
    pub usb: bool,
    pub sysctl: bool,
    pub binfmt_misc: bool,
    pub fault: bool,
    pub leak: bool,
    pub tmpdir: bool,
    pub cgroups: bool,
}

impl FeatureFlags {
    /// Every flag set
    pub fn all() -> Self {
        Self {
            net_injection: true,
            net_devices: true,
            usb: true,
            sysctl: true,
            binfmt_misc: true,
            fault: true,
            leak: true,
            tmpdir: true,
            cgroups: true,
        }
    }
}

/// Coverage settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CoverConfig {
    /// Capability requested when the target supports coverage
    pub capability: CoverCapability,
    /// Collect comparison operands instead of PCs
    pub comparisons: bool,
    /// Collect coverage from background threads too
    pub extra: bool,
}

/// Complete executor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    pub arch: Arch,
    pub sandbox: SandboxMode,
    pub features: FeatureFlags,
    pub cover: CoverConfig,
}

impl ExecutorConfig {
    /// Default configuration: no sandbox, temp directory only
    pub fn new() -> Self {
        Self {
            arch: Arch::default(),
            sandbox: SandboxMode::None,
            features: FeatureFlags {
                tmpdir: true,
                ..FeatureFlags::default()
            },
            cover: CoverConfig::default(),
        }
    }

    /// Nothing beyond bootstrap and dispatch
    pub fn minimal() -> Self {
        Self {
            arch: Arch::default(),
            sandbox: SandboxMode::None,
            features: FeatureFlags::default(),
            cover: CoverConfig::default(),
        }
    }

    /// Every hook and shared-buffer coverage (fully featured targets)
    pub fn full() -> Self {
        Self {
            arch: Arch::default(),
            sandbox: SandboxMode::Namespace,
            features: FeatureFlags::all(),
            cover: CoverConfig {
                capability: CoverCapability::Shared { words: 64 << 10 },
                comparisons: false,
                extra: true,
            },
        }
    }

    pub fn with_arch(mut self, arch: Arch) -> Self {
        self.arch = arch;
        self
    }

    pub fn with_sandbox(mut self, sandbox: SandboxMode) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_features(mut self, features: FeatureFlags) -> Self {
        self.features = features;
        self
    }

    pub fn with_cover(mut self, cover: CoverConfig) -> Self {
        self.cover = cover;
        self
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> ExecutorResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ExecutorError::Config(format!("{}: {e}", path.display())))?;
        let config = serde_json::from_str(&text)
            .map_err(|e| ExecutorError::Config(format!("{}: {e}", path.display())))?;
        info!(path = %path.display(), "executor configuration loaded");
        Ok(config)
    }

    /// Apply XV6_EXECUTOR_ARCH and XV6_EXECUTOR_SANDBOX
    pub fn apply_env(self) -> ExecutorResult<Self> {
        let arch = std::env::var(ARCH_ENV).ok();
        let sandbox = std::env::var(SANDBOX_ENV).ok();
        self.apply_overrides(arch.as_deref(), sandbox.as_deref())
    }

    /// Apply textual overrides, rejecting unknown values
    pub fn apply_overrides(
        mut self,
        arch: Option<&str>,
        sandbox: Option<&str>,
    ) -> ExecutorResult<Self> {
        if let Some(arch) = arch {
            self.arch = arch.parse().map_err(ExecutorError::Config)?;
        }
        if let Some(sandbox) = sandbox {
            self.sandbox = sandbox.parse().map_err(ExecutorError::Config)?;
        }
        Ok(self)
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_presets() {
        let minimal = ExecutorConfig::minimal();
        assert_eq!(minimal.features, FeatureFlags::default());
        assert_eq!(minimal.cover.capability, CoverCapability::None);

        assert!(ExecutorConfig::default().features.tmpdir);
        assert_eq!(ExecutorConfig::full().sandbox, SandboxMode::Namespace);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"arch": "386", "sandbox": "setuid", "features": {{"fault": true}}}}"#)
            .unwrap();

        let config = ExecutorConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.arch, Arch::I386);
        assert_eq!(config.sandbox, SandboxMode::Setuid);
        assert!(config.features.fault);
        assert!(!config.features.usb);
    }

    #[test]
    fn test_bad_json_is_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(matches!(
            ExecutorConfig::from_json_file(file.path()),
            Err(ExecutorError::Config(_))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = ExecutorConfig::minimal()
            .apply_overrides(Some("386"), Some("namespace"))
            .unwrap();
        assert_eq!(config.arch, Arch::I386);
        assert_eq!(config.sandbox, SandboxMode::Namespace);

        assert!(ExecutorConfig::minimal()
            .apply_overrides(None, Some("jail"))
            .is_err());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var(ARCH_ENV, "386");
        std::env::remove_var(SANDBOX_ENV);
        let config = ExecutorConfig::minimal().apply_env().unwrap();
        std::env::remove_var(ARCH_ENV);

        assert_eq!(config.arch, Arch::I386);
        assert_eq!(config.sandbox, SandboxMode::None);
    }
}
