/*!
 * Setup Plan
 * Selects hooks from the configuration, keeping the fixed order
 */

use super::hooks::{CapabilityStubs, NamespaceKind, SetupHook};
use super::SetupResult;
use crate::config::{ExecutorConfig, SandboxMode};
use tracing::{debug, info, info_span};

/// Ordered hooks to run for one configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupPlan {
    hooks: Vec<SetupHook>,
}

impl SetupPlan {
    pub fn new(config: &ExecutorConfig) -> Self {
        let flags = &config.features;
        let mut hooks = vec![SetupHook::ControlPipes, SetupHook::Common];

        if flags.net_injection || flags.net_devices {
            hooks.push(SetupHook::Net);
        }
        if flags.usb {
            hooks.push(SetupHook::Usb);
        }
        if flags.sysctl {
            hooks.push(SetupHook::Sysctl);
        }
        if flags.binfmt_misc {
            hooks.push(SetupHook::BinfmtMisc);
        }
        if config.sandbox != SandboxMode::None {
            hooks.push(SetupHook::Sandbox(config.sandbox));
        }
        if config.sandbox == SandboxMode::Namespace {
            hooks.extend(NamespaceKind::ALL.into_iter().map(SetupHook::Namespace));
        }
        if flags.cgroups {
            hooks.push(SetupHook::Cgroups);
        }
        if flags.tmpdir {
            hooks.push(SetupHook::Tmpdir);
            hooks.push(SetupHook::Tmpfile);
        }
        if config.sandbox != SandboxMode::None {
            hooks.push(SetupHook::DropCaps);
        }
        if flags.fault {
            hooks.push(SetupHook::Fault);
        }
        if flags.leak {
            hooks.push(SetupHook::Leak);
        }
        hooks.push(SetupHook::SegvHandler);

        debug_assert!(hooks.windows(2).all(|w| w[0].order() < w[1].order()));
        Self { hooks }
    }

    pub fn hooks(&self) -> &[SetupHook] {
        &self.hooks
    }

    /// Run every hook in order, stopping at the first failure
    pub fn run<S: CapabilityStubs + ?Sized>(&self, stubs: &mut S) -> SetupResult<()> {
        let span = info_span!("setup", hooks = self.hooks.len());
        let _entered = span.enter();

        for hook in &self.hooks {
            debug!(hook = hook.name(), arg = ?hook, "running setup hook");
            hook.apply(stubs)?;
        }
        info!(hooks = self.hooks.len(), "setup complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureFlags;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_minimal_plan() {
        let plan = SetupPlan::new(&ExecutorConfig::minimal());
        assert_eq!(
            plan.hooks(),
            &[
                SetupHook::ControlPipes,
                SetupHook::Common,
                SetupHook::SegvHandler
            ]
        );
    }

    #[test]
    fn test_full_plan_runs_every_hook_in_order() {
        let plan = SetupPlan::new(&ExecutorConfig::full());
        assert_eq!(plan.hooks().len(), 21);
        let orders: Vec<usize> = plan.hooks().iter().map(|h| h.order()).collect();
        assert_eq!(orders, (0..21).collect::<Vec<_>>());
    }

    #[test]
    fn test_setuid_drops_caps_without_namespaces() {
        let config = ExecutorConfig::minimal().with_sandbox(SandboxMode::Setuid);
        let plan = SetupPlan::new(&config);
        assert!(plan.hooks().contains(&SetupHook::Sandbox(SandboxMode::Setuid)));
        assert!(plan.hooks().contains(&SetupHook::DropCaps));
        assert!(!plan
            .hooks()
            .iter()
            .any(|h| matches!(h, SetupHook::Namespace(_))));
    }

    #[test]
    fn test_net_devices_alone_enable_net() {
        let config = ExecutorConfig::minimal().with_features(FeatureFlags {
            net_devices: true,
            ..FeatureFlags::default()
        });
        assert!(SetupPlan::new(&config).hooks().contains(&SetupHook::Net));
    }
}
