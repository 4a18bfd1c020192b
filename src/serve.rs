//! Dev-server child process: spawn through the platform shell and supervise.

use std::io;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use wait_timeout::ChildExt;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::DevError;

/// Interval between child polls while watching for signals.
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeOutcome {
    /// Child finished on its own with this exit code.
    Exited(i32),
    /// The launcher received this signal and shut the child down.
    Interrupted(i32),
}

/// Build the shell invocation for a command line with inherited stdio.
pub fn shell_command(cmdline: &str) -> Command {
    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(cmdline);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(cmdline);
        c
    };
    cmd.stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit());
    cmd
}

#[cfg_attr(feature = "tracing", instrument(level = "info", err))]
pub fn spawn(cmdline: &str) -> Result<Child, DevError> {
    shell_command(cmdline).spawn().map_err(|source| DevError::Spawn {
        command: cmdline.to_string(),
        source,
    })
}

/// Exit code for a finished child; a signal death maps to 128+signo.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return 128 + sig;
        }
    }
    1
}

/// Wait for the child while polling `interrupted` for a received signal.
///
/// On interrupt the child gets SIGTERM, then `grace` to exit before it is killed.
pub fn supervise<F>(child: &mut Child, grace: Duration, interrupted: F) -> io::Result<ServeOutcome>
where
    F: Fn() -> Option<i32>,
{
    loop {
        if let Some(sig) = interrupted() {
            shutdown(child, grace)?;
            return Ok(ServeOutcome::Interrupted(sig));
        }
        if let Some(status) = child.wait_timeout(POLL_INTERVAL)? {
            // Ctrl+C reaches the whole process group: the child may die from the
            // same SIGINT that set the flag, so it still counts as an interrupt.
            if let Some(sig) = interrupted() {
                return Ok(ServeOutcome::Interrupted(sig));
            }
            return Ok(ServeOutcome::Exited(exit_code(status)));
        }
    }
}

fn shutdown(child: &mut Child, grace: Duration) -> io::Result<()> {
    if child.try_wait()?.is_some() {
        return Ok(());
    }
    terminate(child);
    let deadline = Instant::now() + grace;
    loop {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            break;
        }
        if child.wait_timeout(left.min(POLL_INTERVAL))?.is_some() {
            return Ok(());
        }
    }
    let _ = child.kill();
    child.wait().map(|_| ())
}

#[cfg(unix)]
fn terminate(child: &mut Child) {
    use nix::sys::signal::{kill, Signal};
    use nix::unistd::Pid;
    let _ = kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM);
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) {
    let _ = child.kill();
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn quiet(cmdline: &str) -> Child {
        let mut cmd = shell_command(cmdline);
        cmd.stdin(Stdio::null());
        cmd.spawn().expect("spawn sh")
    }

    #[test]
    fn test_supervise_propagates_exit_code() {
        let mut child = quiet("exit 7");
        let out = supervise(&mut child, Duration::from_secs(1), || None).unwrap();
        assert_eq!(out, ServeOutcome::Exited(7));
    }

    #[test]
    fn test_supervise_interrupt_terminates_child() {
        let mut child = quiet("sleep 30");
        let polls = Cell::new(0u32);
        let started = Instant::now();
        let out = supervise(&mut child, Duration::from_secs(5), || {
            polls.set(polls.get() + 1);
            if polls.get() > 2 {
                Some(15)
            } else {
                None
            }
        })
        .unwrap();
        assert_eq!(out, ServeOutcome::Interrupted(15));
        assert!(child.try_wait().unwrap().is_some(), "child still running");
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_supervise_child_dying_with_interrupt_counts_as_interrupt() {
        let mut child = quiet("exit 130");
        let polls = Cell::new(0u32);
        let out = supervise(&mut child, Duration::from_secs(1), || {
            polls.set(polls.get() + 1);
            if polls.get() > 1 {
                Some(2)
            } else {
                None
            }
        })
        .unwrap();
        assert_eq!(out, ServeOutcome::Interrupted(2));
    }

    #[test]
    fn test_exit_code_for_signal_death() {
        let mut child = quiet("kill -9 $$");
        let status = child.wait().unwrap();
        assert_eq!(exit_code(status), 137);
    }

    #[test]
    fn test_spawn_runs_through_shell() {
        let mut child = spawn("exit 0").unwrap();
        assert!(child.wait().unwrap().success());
    }
}
