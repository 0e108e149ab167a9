/*!
 * xv6 Capability Stubs
 * xv6 has none of the setup capabilities; every hook succeeds doing nothing
 */

use super::abi::{flags, Xv6Abi};
use super::target::Xv6Target;
use crate::config::SandboxMode;
use crate::setup::{CapabilityStubs, SetupResult};
use std::ffi::CString;
use tracing::trace;

impl<A: Xv6Abi> Xv6Target<A> {
    fn skip(&self, hook: &'static str) -> SetupResult<()> {
        trace!(hook, "not available on xv6");
        Ok(())
    }
}

impl<A: Xv6Abi> CapabilityStubs for Xv6Target<A> {
    fn setup_control_pipes(&mut self) -> SetupResult<()> {
        self.skip("control_pipes")
    }

    fn setup_common(&mut self) -> SetupResult<()> {
        self.skip("common")
    }

    fn setup_net(&mut self) -> SetupResult<()> {
        self.skip("net")
    }

    fn setup_usb(&mut self) -> SetupResult<()> {
        self.skip("usb")
    }

    fn setup_sysctl(&mut self) -> SetupResult<()> {
        self.skip("sysctl")
    }

    fn setup_binfmt_misc(&mut self) -> SetupResult<()> {
        self.skip("binfmt_misc")
    }

    fn setup_sandbox(&mut self, _mode: SandboxMode) -> SetupResult<()> {
        self.skip("sandbox")
    }

    fn use_net_namespace(&mut self) -> SetupResult<()> {
        self.skip("net_namespace")
    }

    fn use_pid_namespace(&mut self) -> SetupResult<()> {
        self.skip("pid_namespace")
    }

    fn use_uts_namespace(&mut self) -> SetupResult<()> {
        self.skip("uts_namespace")
    }

    fn use_ipc_namespace(&mut self) -> SetupResult<()> {
        self.skip("ipc_namespace")
    }

    fn use_user_namespace(&mut self) -> SetupResult<()> {
        self.skip("user_namespace")
    }

    fn use_cgroup_namespace(&mut self) -> SetupResult<()> {
        self.skip("cgroup_namespace")
    }

    fn use_time_namespace(&mut self) -> SetupResult<()> {
        self.skip("time_namespace")
    }

    fn use_cgroups(&mut self) -> SetupResult<()> {
        self.skip("cgroups")
    }

    fn use_tmpdir(&mut self) -> SetupResult<()> {
        self.skip("tmpdir")
    }

    fn use_tmpfile(&mut self) -> SetupResult<()> {
        self.skip("tmpfile")
    }

    fn drop_caps(&mut self) -> SetupResult<()> {
        self.skip("drop_caps")
    }

    fn setup_fault(&mut self) -> SetupResult<()> {
        self.skip("fault")
    }

    fn setup_leak(&mut self) -> SetupResult<()> {
        self.skip("leak")
    }

    fn install_segv_handler(&mut self) -> SetupResult<()> {
        self.skip("segv_handler")
    }

    fn read_tun(&mut self, _buf: &mut [u8]) -> isize {
        -1
    }

    fn wait_for_loop(&mut self, _pid: i32) -> i32 {
        0
    }

    fn write_file(&mut self, path: &str, contents: &[u8]) {
        let Ok(cpath) = CString::new(path) else {
            return;
        };
        // SAFETY: `cpath` is NUL-terminated and `contents` is a live slice.
        unsafe {
            let fd = self
                .abi
                .open(cpath.as_ptr(), flags::O_WRONLY | flags::O_CREATE | flags::O_TRUNC);
            if fd < 0 {
                return;
            }
            let len = i32::try_from(contents.len()).unwrap_or(i32::MAX);
            let written = self.abi.write(fd, contents.as_ptr().cast(), len);
            if written != len {
                trace!(path, written, len, "short write_file");
            }
            self.abi.close(fd);
        }
    }
}
