/*!
 * Setup Sequence Tests
 * Hook ordering, coverage wiring, and failure paths against a scripted target
 */

use pretty_assertions::assert_eq;
use std::ffi::CStr;

use xv6_executor::config::{CoverConfig, FeatureFlags, SandboxMode};
use xv6_executor::cover::{CoverWriter, PcFilter, PcRange};
use xv6_executor::setup::{NamespaceKind, SetupError, SetupHook};
use xv6_executor::syscalls::{
    ArgKind, ArgumentVector, DispatchResult, SyscallEntry, SyscallTable,
};
use xv6_executor::target::{
    Bootstrap, BootstrapError, DataSegment, DataSegmentRequest, ProgramArg, ProgramCall,
};
use xv6_executor::vminfo::Feature;
use xv6_executor::{
    Arch, CapabilityStubs, CoverCapability, CoverState, CoverageReporter, DispatchError,
    Dispatcher, ExecutorConfig, ExecutorError, SetupPlan, SetupSequence, SyscallDescriptor,
    Target,
};

const TEXT_START: u64 = 0x8000_0000;
const TEXT_END: u64 = 0x9000_0000;

static MOCK_CALLS: [SyscallEntry; 3] = [
    SyscallEntry::new("nop", 1, &[]),
    SyscallEntry::new("add", 2, &[ArgKind::Int, ArgKind::Int]),
    SyscallEntry::new("strlen", 3, &[ArgKind::CStr]),
];

static MOCK_TABLE: SyscallTable = SyscallTable::new(&MOCK_CALLS, 3);

/// Target that records hooks and emits coverage from every dispatch
#[derive(Debug, Default)]
struct MockTarget {
    hooks: Vec<SetupHook>,
    fail_on: Option<SetupHook>,
    refuse_segment: bool,
    request: Option<DataSegmentRequest>,
    memory: Vec<u8>,
    writer: Option<CoverWriter>,
}

impl MockTarget {
    fn hit(&mut self, hook: SetupHook) -> Result<(), SetupError> {
        if self.fail_on == Some(hook) {
            return Err(SetupError::hook_failed(hook.name(), "scripted failure"));
        }
        self.hooks.push(hook);
        Ok(())
    }
}

impl Bootstrap for MockTarget {
    fn init(
        &mut self,
        _argv: &[String],
        request: DataSegmentRequest,
    ) -> Result<DataSegment, BootstrapError> {
        self.request = Some(request);
        if self.refuse_segment {
            return Err(BootstrapError::DataSegmentRefused { size: request.size });
        }
        self.memory = vec![0xaa; request.size];
        Ok(DataSegment {
            base: self.memory.as_mut_ptr() as usize,
            size: request.size,
        })
    }
}

impl Dispatcher for MockTarget {
    type Args = ArgumentVector<3>;

    fn syscall_table(&self) -> &SyscallTable {
        &MOCK_TABLE
    }

    unsafe fn dispatch(&self, call: &SyscallDescriptor, args: &Self::Args) -> DispatchResult {
        let Some(entry) = MOCK_TABLE.by_nr(call.nr()) else {
            return Err(DispatchError::Unsupported { nr: call.nr() });
        };
        if let Some(writer) = &self.writer {
            writer.record_pc(TEXT_START + call.nr());
            writer.record_pc(0x10);
        }
        let a = args.decode(entry.args);
        let ret = match entry.name {
            "add" => (a.int(0) + a.int(1)) as isize,
            "strlen" => unsafe { CStr::from_ptr(a.cstr(0)) }.to_bytes().len() as isize,
            _ => 0,
        };
        Ok(ret)
    }
}

impl CoverageReporter for MockTarget {
    fn cover_capability(&self, requested: CoverCapability) -> CoverCapability {
        requested
    }

    fn pc_filter(&self) -> PcFilter {
        PcFilter::Range(PcRange::new(TEXT_START, TEXT_END))
    }
}

impl CapabilityStubs for MockTarget {
    fn setup_control_pipes(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::ControlPipes)
    }
    fn setup_common(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Common)
    }
    fn setup_net(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Net)
    }
    fn setup_usb(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Usb)
    }
    fn setup_sysctl(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Sysctl)
    }
    fn setup_binfmt_misc(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::BinfmtMisc)
    }
    fn setup_sandbox(&mut self, mode: SandboxMode) -> Result<(), SetupError> {
        self.hit(SetupHook::Sandbox(mode))
    }
    fn use_net_namespace(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Namespace(NamespaceKind::Net))
    }
    fn use_pid_namespace(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Namespace(NamespaceKind::Pid))
    }
    fn use_uts_namespace(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Namespace(NamespaceKind::Uts))
    }
    fn use_ipc_namespace(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Namespace(NamespaceKind::Ipc))
    }
    fn use_user_namespace(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Namespace(NamespaceKind::User))
    }
    fn use_cgroup_namespace(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Namespace(NamespaceKind::Cgroup))
    }
    fn use_time_namespace(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Namespace(NamespaceKind::Time))
    }
    fn use_cgroups(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Cgroups)
    }
    fn use_tmpdir(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Tmpdir)
    }
    fn use_tmpfile(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Tmpfile)
    }
    fn drop_caps(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::DropCaps)
    }
    fn setup_fault(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Fault)
    }
    fn setup_leak(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::Leak)
    }
    fn install_segv_handler(&mut self) -> Result<(), SetupError> {
        self.hit(SetupHook::SegvHandler)
    }
    fn read_tun(&mut self, buf: &mut [u8]) -> isize {
        buf.len() as isize
    }
    fn wait_for_loop(&mut self, pid: i32) -> i32 {
        pid
    }
    fn write_file(&mut self, _path: &str, _contents: &[u8]) {}
}

impl Target for MockTarget {
    const NAME: &'static str = "mock";

    fn arch(&self) -> Arch {
        Arch::RiscV64
    }

    fn feature_support(&self, _feature: Feature) -> Option<&'static str> {
        None
    }
}

fn argv() -> Vec<String> {
    vec!["syz-executor".to_string()]
}

#[test]
fn test_hooks_run_in_plan_order() {
    let config = ExecutorConfig::full();
    let expected = SetupPlan::new(&config).hooks().to_vec();
    assert_eq!(expected.len(), 21);

    let executor = SetupSequence::new(MockTarget::default(), config)
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    assert_eq!(executor.target().hooks, expected);
    assert_eq!(executor.target().hooks[6], SetupHook::Sandbox(SandboxMode::Namespace));
}

#[test]
fn test_minimal_config_runs_fixed_hooks_only() {
    let executor = SetupSequence::new(MockTarget::default(), ExecutorConfig::minimal())
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    assert_eq!(
        executor.target().hooks,
        vec![SetupHook::ControlPipes, SetupHook::Common, SetupHook::SegvHandler]
    );
    assert!(!executor.cover().is_available());
}

#[test]
fn test_bootstrap_request_follows_arch() {
    let booted = SetupSequence::new(
        MockTarget::default(),
        ExecutorConfig::minimal().with_arch(Arch::I386),
    )
    .bootstrap(&argv())
    .unwrap();

    let request = booted.target().request.unwrap();
    assert_eq!(request.preferred_base, 0x800000);
    assert_eq!(request.size, 4096 * 512);
    assert_eq!(booted.segment().size, request.size);
}

#[test]
fn test_bootstrap_refusal_is_reported() {
    let target = MockTarget {
        refuse_segment: true,
        ..MockTarget::default()
    };
    let outcome = SetupSequence::new(target, ExecutorConfig::minimal()).bootstrap(&argv());
    assert!(matches!(
        outcome,
        Err(BootstrapError::DataSegmentRefused { size }) if size == 4096 * 512
    ));
}

#[test]
fn test_hook_failure_stops_setup() {
    let target = MockTarget {
        fail_on: Some(SetupHook::Tmpdir),
        ..MockTarget::default()
    };
    let booted = SetupSequence::new(target, ExecutorConfig::new())
        .bootstrap(&argv())
        .unwrap();

    match booted.run_hooks() {
        Err(SetupError::HookFailed { hook, .. }) => assert_eq!(hook, "tmpdir"),
        Err(e) => panic!("unexpected error: {e}"),
        Ok(_) => panic!("setup should have failed"),
    }
}

#[test]
fn test_execute_call_filters_coverage() {
    let config = ExecutorConfig::minimal().with_cover(CoverConfig {
        capability: CoverCapability::Shared { words: 256 },
        comparisons: false,
        extra: false,
    });
    let mut executor = SetupSequence::new(MockTarget::default(), config)
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    assert!(executor.cover().is_available());
    assert_eq!(executor.cover().state(), CoverState::Enabled);
    let writer = executor.cover().writer();
    executor.target_mut().writer = writer;

    let add = MOCK_TABLE.descriptor(0, "add").unwrap();
    let info = unsafe { executor.execute_call(&add, &ArgumentVector::new([2, 3, 0])) };
    assert_eq!(info.call, "add");
    assert_eq!(info.result, 5);
    assert!(!info.unsupported);
    assert_eq!(info.cover, vec![TEXT_START + 2]);

    let nop = MOCK_TABLE.descriptor(1, "nop").unwrap();
    let info = unsafe { executor.execute_call(&nop, &ArgumentVector::zeroed()) };
    assert_eq!(info.cover, vec![TEXT_START + 1]);
}

#[test]
fn test_execute_program_places_arguments() {
    let mut executor = SetupSequence::new(MockTarget::default(), ExecutorConfig::minimal())
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    let program = vec![
        ProgramCall::new("strlen", vec![ProgramArg::Text("/init".into())]),
        ProgramCall::new("add", vec![ProgramArg::Int(-4), ProgramArg::Int(10)]),
        ProgramCall {
            call: "socket".into(),
            nr: Some(198),
            args: vec![ProgramArg::Int(2)],
        },
    ];

    let results = unsafe { executor.execute_program(&program) }.unwrap();
    let summary: Vec<(String, isize, bool)> = results
        .into_iter()
        .map(|info| (info.call, info.result, info.unsupported))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("strlen".to_string(), 5, false),
            ("add".to_string(), 6, false),
            ("socket".to_string(), -1, true),
        ]
    );
}

#[test]
fn test_execute_program_rejects_bad_calls() {
    let mut executor = SetupSequence::new(MockTarget::default(), ExecutorConfig::minimal())
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    let unknown = vec![ProgramCall::new("bogus", vec![])];
    assert_eq!(
        unsafe { executor.execute_program(&unknown) }.unwrap_err(),
        ExecutorError::UnknownCall("bogus".into())
    );

    let wide = vec![ProgramCall {
        call: "wide".into(),
        nr: Some(50),
        args: vec![ProgramArg::Int(0); 4],
    }];
    assert!(matches!(
        unsafe { executor.execute_program(&wide) },
        Err(ExecutorError::TooManyArgs { given: 4, max: 3, .. })
    ));

    let huge = vec![ProgramCall::new(
        "strlen",
        vec![ProgramArg::Buffer { len: 8 << 20 }],
    )];
    assert!(matches!(
        unsafe { executor.execute_program(&huge) },
        Err(ExecutorError::DataExhausted { .. })
    ));
}

#[test]
fn test_records_reach_sink_before_later_failures() {
    let mut executor = SetupSequence::new(MockTarget::default(), ExecutorConfig::minimal())
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    let program = vec![
        ProgramCall::new("nop", vec![]),
        ProgramCall::new("add", vec![ProgramArg::Int(1), ProgramArg::Int(2)]),
        ProgramCall::new("strlen", vec![ProgramArg::Buffer { len: 8 << 20 }]),
    ];
    let mut seen = Vec::new();
    let outcome = unsafe {
        executor.execute_program_with(&program, |info| {
            seen.push((info.call.clone(), info.result));
            Ok(())
        })
    };
    assert!(matches!(outcome, Err(ExecutorError::DataExhausted { .. })));
    assert_eq!(seen, vec![("nop".to_string(), 0), ("add".to_string(), 3)]);
}

#[test]
fn test_unresolved_program_runs_nothing() {
    let mut executor = SetupSequence::new(MockTarget::default(), ExecutorConfig::minimal())
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    let program = vec![
        ProgramCall::new("nop", vec![]),
        ProgramCall::new("add", vec![ProgramArg::Int(0); 4]),
    ];
    let mut emitted = 0;
    let outcome = unsafe {
        executor.execute_program_with(&program, |_| {
            emitted += 1;
            Ok(())
        })
    };
    assert!(matches!(outcome, Err(ExecutorError::TooManyArgs { given: 4, max: 3, .. })));
    assert_eq!(emitted, 0);
}

#[test]
fn test_sink_failure_stops_program() {
    let mut executor = SetupSequence::new(MockTarget::default(), ExecutorConfig::minimal())
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    let program = vec![ProgramCall::new("nop", vec![]), ProgramCall::new("nop", vec![])];
    let mut emitted = 0;
    let outcome = unsafe {
        executor.execute_program_with(&program, |_| {
            emitted += 1;
            Err(ExecutorError::Io("stdout closed".into()))
        })
    };
    assert_eq!(outcome, Err(ExecutorError::Io("stdout closed".into())));
    assert_eq!(emitted, 1);
}

#[test]
fn test_fault_feature_adds_hook() {
    let features = FeatureFlags {
        fault: true,
        ..FeatureFlags::default()
    };
    let config = ExecutorConfig::minimal().with_features(features);
    let executor = SetupSequence::new(MockTarget::default(), config)
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();
    assert_eq!(executor.target().hooks.last(), Some(&SetupHook::SegvHandler));
    assert!(executor.target().hooks.contains(&SetupHook::Fault));
}
