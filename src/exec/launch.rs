// src/exec/launch.rs

use std::ffi::CString;
use std::process;

use anyhow::{Context, Result};
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::{execv, fork, getppid, ForkResult, Pid};

/// How `launch` relates the caller to the new child.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForkMode {
    /// Block until the child exits and return its exit status. The child is
    /// signalled if the launching process dies first.
    Wait,

    /// Return the child's pid immediately; the caller owns the wait and must
    /// reap the pid itself.
    DetachNoOrphan,

    /// Return immediately; the child is re-parented through a double fork so
    /// that its eventual termination never needs a wait call.
    DetachDontCare,
}

/// A launch request: fork mode plus an optional hook run in the child after
/// the fork and before exec.
pub struct ExecPolicy<'a> {
    pub mode: ForkMode,
    pub pre_exec: Option<&'a dyn Fn()>,
}

/// Outcome of a successful [`launch`], per fork mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Launched {
    /// `Wait`: the child exited with this status code.
    Exited(i32),

    /// `DetachNoOrphan`: the running child, to be waited on by the caller.
    Detached(Pid),

    /// `DetachDontCare`: nothing left to track.
    Forgotten,
}

/// Fork and exec `argv` under `policy`.
///
/// Exec failure is fatal only to the child: synchronous callers observe exit
/// status 127, detached callers observe nothing. No retries.
pub fn launch(policy: &ExecPolicy<'_>, argv: &[String]) -> Result<Launched> {
    assert!(!argv.is_empty(), "launch needs at least argv[0]");

    match unsafe { fork() }.context("forking child process")? {
        ForkResult::Parent { child } => match policy.mode {
            ForkMode::Wait => {
                let status = waitpid(child, None)
                    .with_context(|| format!("waiting for '{}'", argv[0]))?;
                Ok(Launched::Exited(exit_code(&status)))
            }
            ForkMode::DetachNoOrphan => Ok(Launched::Detached(child)),
            ForkMode::DetachDontCare => {
                // Reap the intermediate; the grandchild belongs to init now.
                let _ = waitpid(child, None);
                Ok(Launched::Forgotten)
            }
        },
        ForkResult::Child => child_exec(policy, argv),
    }
}

fn exit_code(status: &WaitStatus) -> i32 {
    match status {
        WaitStatus::Exited(_, code) => *code,
        WaitStatus::Signaled(_, sig, _) => 128 + *sig as i32,
        _ => -1,
    }
}

/// Child side: arrange detachment, run the hook, exec. Never returns.
fn child_exec(policy: &ExecPolicy<'_>, argv: &[String]) -> ! {
    match policy.mode {
        ForkMode::Wait => {
            // Die with the launcher rather than lingering as an orphan.
            unsafe {
                libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM);
            }
            if getppid() == Pid::from_raw(1) {
                process::exit(1);
            }
        }
        ForkMode::DetachNoOrphan => {}
        ForkMode::DetachDontCare => match unsafe { fork() } {
            // The intermediate exits at once, handing the grandchild to init
            // so that nobody has to reap it.
            Ok(ForkResult::Parent { .. }) => process::exit(0),
            Ok(ForkResult::Child) => {}
            Err(_) => process::exit(1),
        },
    }

    if let Some(hook) = policy.pre_exec {
        hook();
    }

    let cargs: Vec<CString> = argv
        .iter()
        .filter_map(|arg| CString::new(arg.as_str()).ok())
        .collect();
    if cargs.len() == argv.len() {
        let _ = execv(&cargs[0], &cargs);
    }
    process::exit(127);
}
