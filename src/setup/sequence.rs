/*!
 * Setup Sequence
 *
 * Typestate over the executor startup order: a target is bootstrapped,
 * then set up, and only then handed out as an `Executor`.
 */

use super::plan::SetupPlan;
use super::SetupResult;
use crate::config::ExecutorConfig;
use crate::target::{
    BootstrapError, DataSegment, DataSegmentRequest, Executor, Target,
};
use crate::vminfo::Feature;
use tracing::{error, info, warn};

/// Diagnostic printed before exiting on bootstrap failure
pub const ALLOC_FAILURE_MESSAGE: &str = "syz-executor: failed to allocate memory";

/// Exit status after bootstrap failure
pub const ALLOC_FAILURE_STATUS: i32 = 1;

/// Target not yet bootstrapped
#[derive(Debug)]
pub struct Fresh;

/// Target with its data segment reserved
#[derive(Debug)]
pub struct Booted {
    segment: DataSegment,
}

/// Executor startup in progress
#[derive(Debug)]
pub struct SetupSequence<T: Target, S> {
    target: T,
    config: ExecutorConfig,
    state: S,
}

impl<T: Target> SetupSequence<T, Fresh> {
    pub fn new(target: T, config: ExecutorConfig) -> Self {
        Self {
            target,
            config,
            state: Fresh,
        }
    }

    /// Reserve the data segment
    pub fn bootstrap(mut self, argv: &[String]) -> Result<SetupSequence<T, Booted>, BootstrapError> {
        let request = DataSegmentRequest::for_arch(self.config.arch.params());
        let segment = self.target.init(argv, request)?;
        info!(
            target_os = T::NAME,
            arch = %self.config.arch,
            base = format_args!("{:#x}", segment.base),
            size = segment.size,
            "data segment reserved"
        );
        Ok(SetupSequence {
            target: self.target,
            config: self.config,
            state: Booted { segment },
        })
    }

    /// Bootstrap, exiting the process with status 1 on failure
    pub fn bootstrap_or_exit(self, argv: &[String]) -> SetupSequence<T, Booted> {
        match self.bootstrap(argv) {
            Ok(booted) => booted,
            Err(e) => {
                error!(error = %e, "bootstrap failed");
                eprintln!("{ALLOC_FAILURE_MESSAGE}");
                std::process::exit(ALLOC_FAILURE_STATUS);
            }
        }
    }
}

impl<T: Target> SetupSequence<T, Booted> {
    pub fn segment(&self) -> DataSegment {
        self.state.segment
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn plan(&self) -> SetupPlan {
        SetupPlan::new(&self.config)
    }

    /// Run the setup hooks and open coverage
    pub fn run_hooks(mut self) -> SetupResult<Executor<T>> {
        for feature in Feature::requested_by(&self.config) {
            if let Some(reason) = self.target.feature_support(feature) {
                warn!(target_os = T::NAME, ?feature, reason, "requested feature unavailable");
            }
        }

        self.plan().run(&mut self.target)?;

        let cover_config = self.config.cover;
        let mut cover = self
            .target
            .cover_open(cover_config.capability, cover_config.extra);
        self.target
            .cover_enable(&mut cover, cover_config.comparisons, cover_config.extra);
        info!(
            target_os = T::NAME,
            coverage = cover.is_available(),
            "executor ready"
        );

        Ok(Executor::new(
            self.target,
            cover,
            self.state.segment,
            self.config,
        ))
    }
}
