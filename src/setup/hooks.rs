/*!
 * Setup Hooks
 * Named capability hooks and the stub contract targets implement
 */

use super::SetupResult;
use crate::config::SandboxMode;
use serde::{Deserialize, Serialize};

/// Namespaces a sandboxed executor may enter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamespaceKind {
    Net,
    Pid,
    Uts,
    Ipc,
    User,
    Cgroup,
    Time,
}

impl NamespaceKind {
    /// Entry order
    pub const ALL: [NamespaceKind; 7] = [
        NamespaceKind::Net,
        NamespaceKind::Pid,
        NamespaceKind::Uts,
        NamespaceKind::Ipc,
        NamespaceKind::User,
        NamespaceKind::Cgroup,
        NamespaceKind::Time,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            NamespaceKind::Net => "net",
            NamespaceKind::Pid => "pid",
            NamespaceKind::Uts => "uts",
            NamespaceKind::Ipc => "ipc",
            NamespaceKind::User => "user",
            NamespaceKind::Cgroup => "cgroup",
            NamespaceKind::Time => "time",
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

/// One setup step, in the order the sequence runs them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "hook", content = "arg")]
pub enum SetupHook {
    ControlPipes,
    Common,
    Net,
    Usb,
    Sysctl,
    BinfmtMisc,
    Sandbox(SandboxMode),
    Namespace(NamespaceKind),
    Cgroups,
    Tmpdir,
    Tmpfile,
    DropCaps,
    Fault,
    Leak,
    SegvHandler,
}

impl SetupHook {
    /// Position in the fixed hook order
    pub const fn order(self) -> usize {
        match self {
            SetupHook::ControlPipes => 0,
            SetupHook::Common => 1,
            SetupHook::Net => 2,
            SetupHook::Usb => 3,
            SetupHook::Sysctl => 4,
            SetupHook::BinfmtMisc => 5,
            SetupHook::Sandbox(_) => 6,
            SetupHook::Namespace(kind) => 7 + kind.index(),
            SetupHook::Cgroups => 14,
            SetupHook::Tmpdir => 15,
            SetupHook::Tmpfile => 16,
            SetupHook::DropCaps => 17,
            SetupHook::Fault => 18,
            SetupHook::Leak => 19,
            SetupHook::SegvHandler => 20,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            SetupHook::ControlPipes => "control_pipes",
            SetupHook::Common => "common",
            SetupHook::Net => "net",
            SetupHook::Usb => "usb",
            SetupHook::Sysctl => "sysctl",
            SetupHook::BinfmtMisc => "binfmt_misc",
            SetupHook::Sandbox(_) => "sandbox",
            SetupHook::Namespace(_) => "namespace",
            SetupHook::Cgroups => "cgroups",
            SetupHook::Tmpdir => "tmpdir",
            SetupHook::Tmpfile => "tmpfile",
            SetupHook::DropCaps => "drop_caps",
            SetupHook::Fault => "fault",
            SetupHook::Leak => "leak",
            SetupHook::SegvHandler => "segv_handler",
        }
    }

    /// Run this hook against a target's stubs
    pub fn apply<S: CapabilityStubs + ?Sized>(self, stubs: &mut S) -> SetupResult<()> {
        match self {
            SetupHook::ControlPipes => stubs.setup_control_pipes(),
            SetupHook::Common => stubs.setup_common(),
            SetupHook::Net => stubs.setup_net(),
            SetupHook::Usb => stubs.setup_usb(),
            SetupHook::Sysctl => stubs.setup_sysctl(),
            SetupHook::BinfmtMisc => stubs.setup_binfmt_misc(),
            SetupHook::Sandbox(mode) => stubs.setup_sandbox(mode),
            SetupHook::Namespace(kind) => match kind {
                NamespaceKind::Net => stubs.use_net_namespace(),
                NamespaceKind::Pid => stubs.use_pid_namespace(),
                NamespaceKind::Uts => stubs.use_uts_namespace(),
                NamespaceKind::Ipc => stubs.use_ipc_namespace(),
                NamespaceKind::User => stubs.use_user_namespace(),
                NamespaceKind::Cgroup => stubs.use_cgroup_namespace(),
                NamespaceKind::Time => stubs.use_time_namespace(),
            },
            SetupHook::Cgroups => stubs.use_cgroups(),
            SetupHook::Tmpdir => stubs.use_tmpdir(),
            SetupHook::Tmpfile => stubs.use_tmpfile(),
            SetupHook::DropCaps => stubs.drop_caps(),
            SetupHook::Fault => stubs.setup_fault(),
            SetupHook::Leak => stubs.setup_leak(),
            SetupHook::SegvHandler => stubs.install_segv_handler(),
        }
    }
}

/// Setup capabilities of a target
///
/// Minimal targets implement every hook as `Ok(())`.
pub trait CapabilityStubs {
    fn setup_control_pipes(&mut self) -> SetupResult<()>;
    fn setup_common(&mut self) -> SetupResult<()>;
    fn setup_net(&mut self) -> SetupResult<()>;
    fn setup_usb(&mut self) -> SetupResult<()>;
    fn setup_sysctl(&mut self) -> SetupResult<()>;
    fn setup_binfmt_misc(&mut self) -> SetupResult<()>;
    fn setup_sandbox(&mut self, mode: SandboxMode) -> SetupResult<()>;

    fn use_net_namespace(&mut self) -> SetupResult<()>;
    fn use_pid_namespace(&mut self) -> SetupResult<()>;
    fn use_uts_namespace(&mut self) -> SetupResult<()>;
    fn use_ipc_namespace(&mut self) -> SetupResult<()>;
    fn use_user_namespace(&mut self) -> SetupResult<()>;
    fn use_cgroup_namespace(&mut self) -> SetupResult<()>;
    fn use_time_namespace(&mut self) -> SetupResult<()>;

    fn use_cgroups(&mut self) -> SetupResult<()>;
    fn use_tmpdir(&mut self) -> SetupResult<()>;
    fn use_tmpfile(&mut self) -> SetupResult<()>;
    fn drop_caps(&mut self) -> SetupResult<()>;
    fn setup_fault(&mut self) -> SetupResult<()>;
    fn setup_leak(&mut self) -> SetupResult<()>;
    fn install_segv_handler(&mut self) -> SetupResult<()>;

    /// Read a packet injected into the tun device; -1 without one
    fn read_tun(&mut self, buf: &mut [u8]) -> isize;

    /// Wait for the test loop child; returns its status
    fn wait_for_loop(&mut self, pid: i32) -> i32;

    /// Create or truncate `path` and write `contents`, ignoring failures
    fn write_file(&mut self, path: &str, contents: &[u8]);
}
