// src/supervisor/deadline.rs

use std::time::Duration;

const NANOS_PER_SEC: libc::c_long = 1_000_000_000;

/// Absolute `CLOCK_MONOTONIC` timestamp bounding one timed-stage invocation.
///
/// Computed once at stage entry and passed by value into the module phase of
/// the same stage; comparison is always against a fresh clock reading, never
/// through shared memory.
#[derive(Debug, Clone, Copy)]
pub struct Deadline(libc::timespec);

fn now_monotonic() -> libc::timespec {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    // CLOCK_MONOTONIC cannot fail with a valid timespec pointer.
    unsafe { libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts) };
    ts
}

impl Deadline {
    /// `now + budget` on the monotonic clock.
    pub fn after(budget: Duration) -> Self {
        let mut ts = now_monotonic();
        ts.tv_sec += budget.as_secs() as libc::time_t;
        ts.tv_nsec += budget.subsec_nanos() as libc::c_long;
        if ts.tv_nsec >= NANOS_PER_SEC {
            ts.tv_sec += 1;
            ts.tv_nsec -= NANOS_PER_SEC;
        }
        Deadline(ts)
    }

    /// Whether the deadline lies before a fresh clock reading.
    pub fn passed(&self) -> bool {
        let now = now_monotonic();
        (now.tv_sec, now.tv_nsec) > (self.0.tv_sec, self.0.tv_nsec)
    }

    /// Sleep until the absolute deadline, resuming across signals.
    pub fn sleep_until(&self) {
        loop {
            let rc = unsafe {
                libc::clock_nanosleep(
                    libc::CLOCK_MONOTONIC,
                    libc::TIMER_ABSTIME,
                    &self.0,
                    std::ptr::null_mut(),
                )
            };
            if rc != libc::EINTR {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_deadline_has_not_passed() {
        let deadline = Deadline::after(Duration::from_secs(60));
        assert!(!deadline.passed());
    }

    #[test]
    fn zero_budget_deadline_passes_immediately() {
        let deadline = Deadline::after(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(5));
        assert!(deadline.passed());
    }

    #[test]
    fn sleep_until_returns_at_the_deadline() {
        let deadline = Deadline::after(Duration::from_millis(50));
        deadline.sleep_until();
        assert!(deadline.passed());
    }
}
