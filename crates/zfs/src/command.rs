//! External command execution with a deadline

use crossbeam_channel::RecvTimeoutError;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use snap_core::StoreError;
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::time::Duration;
use tracing::{debug, warn};

/// Captured result of a finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, `None` if killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Executes external programs
pub trait Runner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, StoreError>;
}

impl<R: Runner + ?Sized> Runner for &R {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, StoreError> {
        (**self).run(program, args)
    }
}

/// Runs programs on the host with a per-command timeout
#[derive(Debug, Clone, Copy)]
pub struct SystemRunner {
    timeout: Duration,
}

impl SystemRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new(Duration::from_secs(60))
    }
}

impl Runner for SystemRunner {
    fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, StoreError> {
        run_with_timeout(program, args, None, self.timeout)
    }
}

/// Run `program`, optionally feeding `stdin`, killing it after `timeout`
///
/// A helper thread writes `stdin` and waits for the child, so a command that
/// never reads its input still cannot outlive the deadline. If no result
/// arrives in time the child gets SIGKILL and [`StoreError::Timeout`] is
/// returned.
pub fn run_with_timeout(
    program: &str,
    args: &[&str],
    stdin: Option<&str>,
    timeout: Duration,
) -> Result<CommandOutput, StoreError> {
    let command = command_line(program, args);
    debug!("Running `{}`", command);

    let mut child = Command::new(program)
        .args(args)
        .stdin(if stdin.is_some() { Stdio::piped() } else { Stdio::null() })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;

    let input = stdin.map(str::to_owned);
    let pipe = child.stdin.take();
    let pid = child.id();
    let (tx, rx) = crossbeam_channel::bounded(1);
    std::thread::spawn(move || {
        if let (Some(input), Some(mut pipe)) = (input, pipe) {
            // Dropping the pipe closes the child's stdin; a child exiting
            // without reading is not an error here
            let _ = pipe.write_all(input.as_bytes());
        }
        let _ = tx.send(child.wait_with_output());
    });

    match rx.recv_timeout(timeout) {
        Ok(result) => {
            let output = result?;
            Ok(CommandOutput {
                code: output.status.code(),
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            })
        }
        Err(RecvTimeoutError::Timeout) => {
            warn!("`{}` timed out after {:?}, killing pid {}", command, timeout, pid);
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGKILL) {
                warn!("Failed to kill pid {}: {}", pid, e);
            }
            Err(StoreError::Timeout {
                command,
                after: timeout,
            })
        }
        Err(RecvTimeoutError::Disconnected) => Err(StoreError::Io(io::Error::new(
            io::ErrorKind::Other,
            format!("lost track of `{}`", command),
        ))),
    }
}

fn command_line(program: &str, args: &[&str]) -> String {
    let mut line = program.to_string();
    for arg in args {
        line.push(' ');
        line.push_str(arg);
    }
    line
}
