/*!
 * Executor
 * Runs calls against a set-up target with coverage around each one
 */

use super::program::{DataArena, ProgramCall};
use super::traits::{DataSegment, Target};
use crate::config::ExecutorConfig;
use crate::core::{CallId, ExecutorError, ExecutorResult, Pc, SyscallRet, Word};
use crate::cover::CoverageHandle;
use crate::syscalls::{ArgumentSlots, SyscallDescriptor};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

/// Outcome of one call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallInfo {
    pub call: String,
    pub result: SyscallRet,
    /// The target rejected the call number before invoking anything
    pub unsupported: bool,
    pub cover: Vec<Pc>,
}

/// A bootstrapped, set-up target ready to run calls
///
/// Only `SetupSequence::run_hooks` builds one.
#[derive(Debug)]
pub struct Executor<T: Target> {
    target: T,
    cover: CoverageHandle,
    segment: DataSegment,
    config: ExecutorConfig,
    run_id: String,
}

impl<T: Target> Executor<T> {
    pub(crate) fn new(
        target: T,
        cover: CoverageHandle,
        segment: DataSegment,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            target,
            cover,
            segment,
            config,
            run_id: uuid::Uuid::new_v4().to_string(),
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    pub fn cover(&self) -> &CoverageHandle {
        &self.cover
    }

    pub fn segment(&self) -> DataSegment {
        self.segment
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Identifier attached to every span of this executor
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Reset coverage, dispatch, then collect filtered coverage
    ///
    /// # Safety
    ///
    /// Same contract as `Dispatcher::dispatch`.
    pub unsafe fn execute_call(&mut self, call: &SyscallDescriptor, args: &T::Args) -> CallInfo {
        self.target.cover_reset(&mut self.cover);

        // SAFETY: forwarded caller contract.
        let outcome = unsafe { self.target.dispatch(call, args) };

        let collected = self.target.cover_collect(&mut self.cover);
        let cover: Vec<Pc> = collected
            .into_iter()
            .filter(|&pc| self.target.cover_check(pc))
            .collect();

        let (result, unsupported) = match outcome {
            Ok(ret) => (ret, false),
            Err(e) => {
                debug!(call = call.name(), error = %e, "call rejected by target");
                (e.into_raw(), true)
            }
        };
        CallInfo {
            call: call.name().to_string(),
            result,
            unsupported,
            cover,
        }
    }

    /// Run a whole program and collect one record per call
    ///
    /// # Safety
    ///
    /// Same contract as [`Executor::execute_program_with`].
    pub unsafe fn execute_program(
        &mut self,
        program: &[ProgramCall],
    ) -> ExecutorResult<Vec<CallInfo>> {
        let mut results = Vec::with_capacity(program.len());
        // SAFETY: forwarded caller contract.
        unsafe {
            self.execute_program_with(program, |info| {
                results.push(info.clone());
                Ok(())
            })?;
        }
        Ok(results)
    }

    /// Run a whole program, handing each record to `emit` before the next call
    ///
    /// Every call is resolved and its argument count checked before the
    /// first one runs. Buffers are laid into the data segment call by call.
    /// A record reaches `emit` as soon as its call returns, so calls that
    /// never return (`exit`, a successful `exec`) keep the records before
    /// them. Returns the number of calls run.
    ///
    /// # Safety
    ///
    /// The data segment must be mapped and writable, and the program's
    /// integer arguments are passed unchecked, as with `execute_call`.
    pub unsafe fn execute_program_with<F>(
        &mut self,
        program: &[ProgramCall],
        mut emit: F,
    ) -> ExecutorResult<usize>
    where
        F: FnMut(&CallInfo) -> ExecutorResult<()>,
    {
        let span = info_span!("program", run_id = %self.run_id, calls = program.len());
        let _entered = span.enter();

        let descriptors = program
            .iter()
            .enumerate()
            .map(|(idx, call)| self.resolve(idx as CallId, call))
            .collect::<ExecutorResult<Vec<_>>>()?;

        let mut arena = DataArena::new(self.segment);
        for (call, descriptor) in program.iter().zip(&descriptors) {
            let words = call
                .args
                .iter()
                // SAFETY: segment validity is part of the caller contract.
                .map(|arg| unsafe { arena.place(arg) })
                .collect::<ExecutorResult<Vec<Word>>>()?;
            let args = <T::Args as ArgumentSlots>::from_words(&words)
                .map_err(|_| too_many_args::<T>(call))?;

            // SAFETY: forwarded caller contract.
            let info = unsafe { self.execute_call(descriptor, &args) };
            debug!(call = %info.call, result = info.result, cover = info.cover.len(), "call finished");
            emit(&info)?;
        }

        info!(calls = descriptors.len(), data_used = arena.used(), "program finished");
        Ok(descriptors.len())
    }

    fn resolve(&self, id: CallId, call: &ProgramCall) -> ExecutorResult<SyscallDescriptor> {
        if call.args.len() > <T::Args as ArgumentSlots>::LEN {
            return Err(too_many_args::<T>(call));
        }
        self.describe(id, call)
    }

    fn describe(&self, id: CallId, call: &ProgramCall) -> ExecutorResult<SyscallDescriptor> {
        let table = self.target.syscall_table();
        if table.by_name(&call.call).is_some() {
            return table.descriptor(id, &call.call);
        }
        let pseudo = self
            .target
            .pseudo_table()
            .filter(|pseudo| pseudo.by_name(&call.call).is_some());
        if let Some(pseudo) = pseudo {
            return pseudo.descriptor(id, &call.call);
        }
        match call.nr {
            Some(nr) => {
                SyscallDescriptor::new(id, call.call.clone(), nr, call.args.len(), table.max_args())
            }
            None => Err(ExecutorError::UnknownCall(call.call.clone())),
        }
    }
}

fn too_many_args<T: Target>(call: &ProgramCall) -> ExecutorError {
    ExecutorError::TooManyArgs {
        call: call.call.clone(),
        given: call.args.len(),
        max: <T::Args as ArgumentSlots>::LEN,
    }
}

impl<T: Target> Drop for Executor<T> {
    fn drop(&mut self) {
        self.cover.close();
    }
}
