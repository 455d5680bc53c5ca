// src/supervisor/mod.rs

//! Deadline supervisor for the one timed boot stage.
//!
//! Bounds the time the caller can spend blocked on scripts to a fixed budget
//! using only process primitives: the stage runs inside a forked subtree, a
//! second fork sleeps until the deadline, and script completion races the
//! timer through `wait(2)`. Once the timer wins the race, the remaining
//! scripts of the invocation run fire-and-forget. The deadline cancels the
//! *waiting*, never the scripts themselves.

mod deadline;

pub use deadline::Deadline;

use anyhow::{Context, Result};
use nix::sys::signal::{kill, Signal};
use nix::sys::wait::{wait, waitpid};
use nix::unistd::{fork, ForkResult, Pid};
use tracing::warn;

use crate::exec::ForkMode;

/// Explicit launch-gating state, scoped to one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Stage carries no deadline; supervisor logic is bypassed entirely.
    NotTimed,

    /// Timer is scheduled; launches block and are waited for.
    Armed { timer: Pid },

    /// Timer fired, or could not be armed; launches are fire-and-forget.
    Expired,

    /// Terminal; the subtree has finished.
    Done,
}

/// Owner of the launch-gating state for one stage invocation.
///
/// Exclusively owned by the process subtree driving the stage and dropped
/// when that subtree exits, so no synchronisation exists anywhere.
#[derive(Debug)]
pub struct Supervisor {
    state: SupervisorState,
}

impl Supervisor {
    /// Supervisor for stages without a deadline.
    pub fn not_timed() -> Self {
        Supervisor {
            state: SupervisorState::NotTimed,
        }
    }

    /// Supervisor for a timed invocation whose deadline already passed.
    pub fn expired() -> Self {
        Supervisor {
            state: SupervisorState::Expired,
        }
    }

    /// Arm the timer for a timed stage: fork a process whose only job is to
    /// sleep until `deadline` and then exit. A failed fork means the stage
    /// starts out expired instead of hanging.
    pub fn armed(deadline: Deadline) -> Self {
        let state = match unsafe { fork() } {
            Ok(ForkResult::Parent { child }) => SupervisorState::Armed { timer: child },
            Ok(ForkResult::Child) => {
                deadline.sleep_until();
                std::process::exit(0);
            }
            Err(err) => {
                warn!(error = %err, "could not arm stage timer; running unblocked");
                SupervisorState::Expired
            }
        };
        Supervisor { state }
    }

    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Fork mode for the next script launch under the current state.
    pub fn mode(&self) -> ForkMode {
        match self.state {
            SupervisorState::Armed { .. } => ForkMode::DetachNoOrphan,
            _ => ForkMode::DetachDontCare,
        }
    }

    /// After an armed launch, block until any child is reaped. Reaping the
    /// timer means the budget ran out: warn once and stop blocking for the
    /// rest of this invocation.
    pub fn reap(&mut self) {
        if let SupervisorState::Armed { timer } = self.state {
            match wait() {
                Ok(status) if status.pid() == Some(timer) => {
                    warn!("stage blocking phase timed out; remaining scripts run detached");
                    self.state = SupervisorState::Expired;
                }
                _ => {}
            }
        }
    }

    /// Tear down at end of stage: a timer that never fired must not leak.
    pub fn finish(&mut self) {
        if let SupervisorState::Armed { timer } = self.state {
            let _ = kill(timer, Signal::SIGKILL);
            let _ = waitpid(timer, None);
        }
        self.state = SupervisorState::Done;
    }
}

/// Run `body` inside a dedicated forked subtree and wait for it to finish.
///
/// The subtree confines all process-table churn from script launches and the
/// timer, so the real caller only ever observes this one child. The closure
/// receives a supervisor already armed against `deadline`; the subtree tears
/// the supervisor down and exits when the closure returns.
pub fn confine<F>(deadline: Deadline, body: F) -> Result<()>
where
    F: FnOnce(&mut Supervisor),
{
    match unsafe { fork() }.context("forking stage subtree")? {
        ForkResult::Parent { child } => {
            let _ = waitpid(child, None);
            Ok(())
        }
        ForkResult::Child => {
            let mut sup = Supervisor::armed(deadline);
            body(&mut sup);
            sup.finish();
            std::process::exit(0);
        }
    }
}
