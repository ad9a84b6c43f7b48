//! External tool invocation with an optional deadline.

use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Captured output of a successful tool run.
#[derive(Debug, Clone, Default)]
pub struct ToolOutput {
    /// Raw standard output
    pub stdout: Vec<u8>,
    /// Standard error, lossily decoded
    pub stderr: String,
}

impl ToolOutput {
    /// Standard output decoded as UTF-8 (lossy).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }
}

/// Run `command` to completion and capture its output.
///
/// `tool` names the program in errors. With a `deadline`, the child is
/// killed once it runs longer and [`Error::Timeout`] is returned.
/// A non-zero exit becomes [`Error::ToolFailed`].
pub fn run(mut command: Command, tool: &str, deadline: Option<Duration>) -> Result<ToolOutput> {
    log::trace!("running {:?}", command);

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::ToolFailed {
            tool: tool.to_string(),
            status: "spawn failure".to_string(),
            stderr: e.to_string(),
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let status = match deadline {
        Some(limit) => wait_until(&mut child, tool, limit)?,
        None => child.wait()?,
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = String::from_utf8_lossy(&stderr.join().unwrap_or_default())
        .trim()
        .to_string();

    if !status.success() {
        return Err(Error::ToolFailed {
            tool: tool.to_string(),
            status: status.to_string(),
            stderr,
        });
    }

    Ok(ToolOutput { stdout, stderr })
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        buf
    })
}

fn wait_until(child: &mut Child, tool: &str, limit: Duration) -> Result<ExitStatus> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            log::warn!("{} killed after {:?}", tool, limit);
            return Err(Error::Timeout {
                tool: tool.to_string(),
                limit,
            });
        }
        thread::sleep(POLL_INTERVAL);
    }
}

/// Whether `binary --version` can be executed.
pub fn is_available(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    #[test]
    fn test_captures_stdout() {
        let out = run(sh("echo hello"), "sh", None).unwrap();
        assert_eq!(out.stdout_text().trim(), "hello");
    }

    #[test]
    fn test_nonzero_exit_is_tool_failure() {
        let err = run(sh("echo broken >&2; exit 1"), "sh", None).unwrap_err();
        match err {
            Error::ToolFailed { tool, stderr, .. } => {
                assert_eq!(tool, "sh");
                assert_eq!(stderr, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deadline_kills_child() {
        let started = Instant::now();
        let err = run(sh("sleep 5"), "sleeper", Some(Duration::from_millis(200))).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(4));
        assert_eq!(err.to_string(), "sleeper did not finish within 200ms");
        match err {
            Error::Timeout { tool, limit } => {
                assert_eq!(tool, "sleeper");
                assert_eq!(limit, Duration::from_millis(200));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_binary() {
        let err = run(Command::new("/nonexistent/tool"), "tool", None).unwrap_err();
        assert!(matches!(err, Error::ToolFailed { .. }));
        assert!(!is_available("/nonexistent/tool"));
    }
}
