/*!
 * xv6 Dispatch
 * Relays a descriptor and its argument words into the native xv6 call
 */

use super::abi::Xv6Abi;
use super::sysno::{Sysno, SYZ_MMAP_NR, XV6_MAX_ARGS, XV6_PSEUDO_TABLE, XV6_TABLE};
use super::target::Xv6Target;
use crate::core::SyscallRet;
use crate::monitoring::SyscallSpan;
use crate::syscalls::{
    ArgumentVector, DispatchError, DispatchResult, Dispatcher, SyscallDescriptor, SyscallTable,
};
use tracing::debug;

/// Argument vector xv6 calls take
pub type Xv6Args = ArgumentVector<XV6_MAX_ARGS>;

impl<A: Xv6Abi> Dispatcher for Xv6Target<A> {
    type Args = Xv6Args;

    fn syscall_table(&self) -> &SyscallTable {
        &XV6_TABLE
    }

    fn pseudo_table(&self) -> Option<&SyscallTable> {
        Some(&XV6_PSEUDO_TABLE)
    }

    unsafe fn dispatch(&self, call: &SyscallDescriptor, args: &Xv6Args) -> DispatchResult {
        if call.nr() == SYZ_MMAP_NR {
            let span = SyscallSpan::new("syz_mmap", SYZ_MMAP_NR);
            let ret = self.syz_mmap(args.get(0), args.get(1));
            span.record_return(ret);
            return Ok(ret);
        }

        let Some(sysno) = Sysno::from_nr(call.nr()) else {
            debug!(call = call.name(), nr = call.nr(), "unsupported syscall number");
            return Err(DispatchError::Unsupported { nr: call.nr() });
        };

        let span = SyscallSpan::new(sysno.name(), sysno.nr());
        let a = args.decode(sysno.entry().args);
        let abi = &self.abi;

        // SAFETY: pointer slots are the caller's responsibility per the
        // `Dispatcher::dispatch` contract; the ABI passes them on unchecked.
        let ret: SyscallRet = unsafe {
            match sysno {
                Sysno::Fork => abi.fork() as SyscallRet,
                Sysno::Exit => abi.exit(a.int(0)),
                Sysno::Wait => abi.wait(a.ptr(0)) as SyscallRet,
                Sysno::Pipe => abi.pipe(a.ptr(0)) as SyscallRet,
                Sysno::Read => abi.read(a.int(0), a.ptr(1), a.int(2)) as SyscallRet,
                Sysno::Kill => abi.kill(a.int(0)) as SyscallRet,
                Sysno::Exec => abi.exec(a.cstr(0), a.argv(1)) as SyscallRet,
                Sysno::Fstat => abi.fstat(a.int(0), a.ptr(1)) as SyscallRet,
                Sysno::Chdir => abi.chdir(a.cstr(0)) as SyscallRet,
                Sysno::Dup => abi.dup(a.int(0)) as SyscallRet,
                Sysno::Getpid => abi.getpid() as SyscallRet,
                Sysno::Sbrk => abi.sbrk(a.int(0)),
                Sysno::Sleep => abi.sleep(a.int(0)) as SyscallRet,
                Sysno::Uptime => abi.uptime() as SyscallRet,
                Sysno::Open => abi.open(a.cstr(0), a.int(1)) as SyscallRet,
                Sysno::Write => abi.write(a.int(0), a.ptr::<u8>(1).cast_const().cast(), a.int(2))
                    as SyscallRet,
                Sysno::Mknod => abi.mknod(a.cstr(0), a.short(1), a.short(2)) as SyscallRet,
                Sysno::Unlink => abi.unlink(a.cstr(0)) as SyscallRet,
                Sysno::Link => abi.link(a.cstr(0), a.cstr(1)) as SyscallRet,
                Sysno::Mkdir => abi.mkdir(a.cstr(0)) as SyscallRet,
                Sysno::Close => abi.close(a.int(0)) as SyscallRet,
            }
        };

        span.record_return(ret);
        Ok(ret)
    }
}
