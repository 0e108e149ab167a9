/*!
 * Feature Support
 * Engine features and what the xv6 target says about each
 */

use crate::config::{ExecutorConfig, SandboxMode};
use crate::cover::CoverCapability;
use serde::{Deserialize, Serialize};

/// Engine features a target may offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Coverage,
    Comparisons,
    ExtraCoverage,
    SandboxSetuid,
    SandboxNamespace,
    SandboxAndroid,
    Fault,
    Leak,
    NetInjection,
    NetDevices,
    Kcsan,
    DevlinkPci,
    UsbEmulation,
    VhciInjection,
    WifiEmulation,
}

impl Feature {
    pub const ALL: [Feature; 15] = [
        Feature::Coverage,
        Feature::Comparisons,
        Feature::ExtraCoverage,
        Feature::SandboxSetuid,
        Feature::SandboxNamespace,
        Feature::SandboxAndroid,
        Feature::Fault,
        Feature::Leak,
        Feature::NetInjection,
        Feature::NetDevices,
        Feature::Kcsan,
        Feature::DevlinkPci,
        Feature::UsbEmulation,
        Feature::VhciInjection,
        Feature::WifiEmulation,
    ];

    /// Features a configuration asks the target for
    pub fn requested_by(config: &ExecutorConfig) -> Vec<Feature> {
        let mut wanted = Vec::new();
        if config.cover.capability != CoverCapability::None {
            wanted.push(Feature::Coverage);
            if config.cover.comparisons {
                wanted.push(Feature::Comparisons);
            }
            if config.cover.extra {
                wanted.push(Feature::ExtraCoverage);
            }
        }
        match config.sandbox {
            SandboxMode::None => {}
            SandboxMode::Setuid => wanted.push(Feature::SandboxSetuid),
            SandboxMode::Namespace => wanted.push(Feature::SandboxNamespace),
        }
        let flags = &config.features;
        for (on, feature) in [
            (flags.fault, Feature::Fault),
            (flags.leak, Feature::Leak),
            (flags.net_injection, Feature::NetInjection),
            (flags.net_devices, Feature::NetDevices),
            (flags.usb, Feature::UsbEmulation),
        ] {
            if on {
                wanted.push(feature);
            }
        }
        wanted
    }
}

/// Reason a feature is unavailable on xv6; `None` would mean supported
pub fn check_feature(feature: Feature) -> Option<&'static str> {
    let reason = match feature {
        Feature::Coverage => "xv6 has no kernel coverage",
        Feature::Comparisons => "xv6 has no comparison coverage",
        Feature::ExtraCoverage => "xv6 has no extra coverage",
        Feature::SandboxSetuid => "xv6 has a single user",
        Feature::SandboxNamespace => "xv6 has no namespaces",
        Feature::SandboxAndroid => "xv6 is not Android",
        Feature::Fault => "xv6 has no fault injection",
        Feature::Leak => "xv6 has no leak detection",
        Feature::NetInjection => "xv6 has no network injection",
        Feature::NetDevices => "xv6 has no network devices",
        Feature::Kcsan => "xv6 has no KCSAN",
        Feature::DevlinkPci => "xv6 has no devlink",
        Feature::UsbEmulation => "xv6 has no USB emulation",
        Feature::VhciInjection => "xv6 has no VHCI injection",
        Feature::WifiEmulation => "xv6 has no WiFi emulation",
    };
    Some(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_feature_unsupported() {
        for feature in Feature::ALL {
            assert!(check_feature(feature).is_some(), "{feature:?}");
        }
    }

    #[test]
    fn test_minimal_config_requests_nothing() {
        assert!(Feature::requested_by(&ExecutorConfig::minimal()).is_empty());
    }

    #[test]
    fn test_full_config_requests() {
        let wanted = Feature::requested_by(&ExecutorConfig::full());
        assert!(wanted.contains(&Feature::Coverage));
        assert!(wanted.contains(&Feature::ExtraCoverage));
        assert!(wanted.contains(&Feature::SandboxNamespace));
        assert!(wanted.contains(&Feature::UsbEmulation));
        assert!(!wanted.contains(&Feature::Comparisons));
    }
}
