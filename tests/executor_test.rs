/*!
 * xv6 Executor Tests
 * Bootstrap, setup, and program execution on the host-backed xv6 target
 */

use pretty_assertions::assert_eq;

use xv6_executor::target::{BootstrapError, ProgramArg, ProgramCall};
use xv6_executor::xv6::flags;
use xv6_executor::{
    Arch, CapabilityStubs, CoverState, ExecutorConfig, HostAbi, SetupSequence, Xv6Target,
};

const SEGMENT_SIZE: usize = 4096 * 512;

fn argv() -> Vec<String> {
    vec!["syz-executor".to_string()]
}

fn text(path: &std::path::Path) -> ProgramArg {
    ProgramArg::Text(path.to_str().unwrap().to_string())
}

#[test]
fn test_bootstrap_reserves_segment() {
    for arch in Arch::ALL {
        let booted = SetupSequence::new(Xv6Target::host(arch), ExecutorConfig::new().with_arch(arch))
            .bootstrap(&argv())
            .unwrap();
        let segment = booted.segment();
        assert_eq!(segment.size, SEGMENT_SIZE);
        assert_ne!(segment.base, 0);
    }
}

#[test]
fn test_bootstrap_refused_when_heap_is_too_small() {
    for limit in [0, SEGMENT_SIZE / 2] {
        let target = Xv6Target::new(HostAbi::with_heap_limit(limit), Arch::RiscV64);
        let outcome = SetupSequence::new(target, ExecutorConfig::new()).bootstrap(&argv());
        assert!(matches!(
            outcome,
            Err(BootstrapError::DataSegmentRefused { size: SEGMENT_SIZE })
        ));
    }
}

#[test]
fn test_default_plan() {
    let booted = SetupSequence::new(Xv6Target::host(Arch::RiscV64), ExecutorConfig::new())
        .bootstrap(&argv())
        .unwrap();
    let names: Vec<&str> = booted.plan().hooks().iter().map(|h| h.name()).collect();
    assert_eq!(
        names,
        vec!["control_pipes", "common", "tmpdir", "tmpfile", "segv_handler"]
    );
}

#[test]
fn test_full_config_still_sets_up() {
    let executor = SetupSequence::new(Xv6Target::host(Arch::RiscV64), ExecutorConfig::full())
        .bootstrap(&argv())
        .unwrap()
        .run_hooks()
        .unwrap();

    assert!(!executor.cover().is_available());
    assert_eq!(executor.cover().state(), CoverState::Enabled);
    assert_eq!(executor.run_id().len(), 36);
}

#[test]
fn test_run_ids_differ() {
    let make = || {
        SetupSequence::new(Xv6Target::host(Arch::RiscV64), ExecutorConfig::minimal())
            .bootstrap(&argv())
            .unwrap()
            .run_hooks()
            .unwrap()
    };
    assert_ne!(make().run_id().to_string(), make().run_id().to_string());
}

#[test]
fn test_program_round_trip_through_files() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("out");
    let sub = dir.path().join("sub");

    let mut executor =
        SetupSequence::new(Xv6Target::host(Arch::RiscV64), ExecutorConfig::new())
            .bootstrap(&argv())
            .unwrap()
            .run_hooks()
            .unwrap();

    let open = vec![
        ProgramCall::new(
            "open",
            vec![text(&file), ProgramArg::Int((flags::O_CREATE | flags::O_RDWR) as i64)],
        ),
        ProgramCall::new("mkdir", vec![text(&sub)]),
        ProgramCall::new("getpid", vec![]),
        ProgramCall {
            call: "socket".into(),
            nr: Some(198),
            args: vec![ProgramArg::Int(2), ProgramArg::Int(1), ProgramArg::Int(0)],
        },
    ];
    let results = unsafe { executor.execute_program(&open) }.unwrap();

    let fd = results[0].result;
    assert!(fd >= 0);
    assert_eq!(results[1].result, 0);
    assert!(sub.is_dir());
    assert_eq!(results[2].result, std::process::id() as isize);
    assert_eq!(results[3].call, "socket");
    assert_eq!(results[3].result, -1);
    assert!(results[3].unsupported);
    assert!(results.iter().all(|info| info.cover.is_empty()));

    let write = vec![
        ProgramCall::new(
            "write",
            vec![
                ProgramArg::Int(fd as i64),
                ProgramArg::Text("hello".into()),
                ProgramArg::Int(5),
            ],
        ),
        ProgramCall::new("fstat", vec![ProgramArg::Int(fd as i64), ProgramArg::Buffer { len: 24 }]),
        ProgramCall::new("close", vec![ProgramArg::Int(fd as i64)]),
        ProgramCall::new("close", vec![ProgramArg::Int(fd as i64)]),
    ];
    let results = unsafe { executor.execute_program(&write) }.unwrap();
    let rets: Vec<isize> = results.iter().map(|info| info.result).collect();
    assert_eq!(rets, vec![5, 0, 0, -1]);
    assert_eq!(std::fs::read(&file).unwrap(), b"hello");
}

#[test]
fn test_syz_mmap_runs_as_program_call() {
    let mut executor =
        SetupSequence::new(Xv6Target::host(Arch::I386), ExecutorConfig::minimal())
            .bootstrap(&argv())
            .unwrap()
            .run_hooks()
            .unwrap();

    let program = vec![
        ProgramCall::new("sbrk", vec![ProgramArg::Int(0)]),
        ProgramCall::new("syz_mmap", vec![ProgramArg::Int(0x2000_0000), ProgramArg::Int(4096)]),
        ProgramCall::new("sbrk", vec![ProgramArg::Int(0)]),
    ];
    let results = unsafe { executor.execute_program(&program) }.unwrap();

    assert_eq!(results[1].call, "syz_mmap");
    assert!(!results[1].unsupported);
    assert_eq!(results[1].result, results[0].result);
    assert_eq!(results[2].result, results[0].result + 4096);
}

#[test]
fn test_capability_extras() {
    let dir = tempfile::tempdir().unwrap();
    let mut target = Xv6Target::host(Arch::RiscV64);

    let path = dir.path().join("sysctl");
    target.write_file(path.to_str().unwrap(), b"1\n");
    assert_eq!(std::fs::read(&path).unwrap(), b"1\n");

    target.write_file(dir.path().join("missing/dir/file").to_str().unwrap(), b"x");
    target.write_file("bad\0path", b"x");

    let mut buf = [0u8; 64];
    assert_eq!(target.read_tun(&mut buf), -1);
    assert_eq!(target.wait_for_loop(1), 0);
}
