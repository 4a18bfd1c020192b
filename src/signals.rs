//! Interrupt capture for the launcher.
//!
//! Handlers only record the signal; the supervision loop polls `pending()`
//! between child waits and performs the shutdown outside signal context.

use std::sync::atomic::{AtomicI32, Ordering};

#[cfg(unix)]
use nix::sys::signal::{self, SaFlags, SigAction, SigHandler, SigSet, Signal};

static PENDING: AtomicI32 = AtomicI32::new(0);

#[cfg(unix)]
extern "C" fn record_signal(sig: i32) {
    // First signal wins; later ones do not overwrite it.
    let _ = PENDING.compare_exchange(0, sig, Ordering::SeqCst, Ordering::SeqCst);
}

/// Install SIGINT, SIGTERM and SIGHUP handlers.
#[cfg(unix)]
pub fn install() {
    let act = SigAction::new(
        SigHandler::Handler(record_signal),
        SaFlags::SA_RESTART,
        SigSet::empty(),
    );
    unsafe {
        let _ = signal::sigaction(Signal::SIGINT, &act);
        let _ = signal::sigaction(Signal::SIGTERM, &act);
        let _ = signal::sigaction(Signal::SIGHUP, &act);
    }
}

#[cfg(not(unix))]
pub fn install() {}

/// Raw number of the first received signal, if any.
pub fn pending() -> Option<i32> {
    match PENDING.load(Ordering::SeqCst) {
        0 => None,
        n => Some(n),
    }
}

/// Human-readable name for a signal number (`SIGTERM` etc.).
pub fn name(sig: i32) -> String {
    #[cfg(unix)]
    {
        if let Ok(s) = Signal::try_from(sig) {
            return s.as_str().to_string();
        }
    }
    format!("signal {sig}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_signal_names() {
        assert_eq!(name(Signal::SIGTERM as i32), "SIGTERM");
        assert_eq!(name(Signal::SIGINT as i32), "SIGINT");
        assert_eq!(name(9999), "signal 9999");
    }
}
