use std::process::Stdio;
use std::sync::{Arc, Mutex};

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::launch::LaunchPlan;
use crate::types::{RpcFrame, RpcRequest};
use crate::{CopilotError, Result};

// ─── CopilotProcess ───────────────────────────────────────────────────────

/// A running `copilot --server --stdio` subprocess.
///
/// Requests are written as newline-delimited JSON-RPC frames on stdin and
/// responses read as JSONL from stdout. The process is long-lived: stdin
/// stays open across requests until [`CopilotProcess::kill`]. Stderr is
/// captured in a background task and surfaced on process exit errors.
pub(crate) struct CopilotProcess {
    child: Child,
    lines: Lines<BufReader<ChildStdout>>,
    stdin: Option<ChildStdin>,
    /// Stderr output collected by a background reader task.
    stderr_buf: Arc<Mutex<String>>,
}

impl CopilotProcess {
    /// Spawn the Copilot CLI in server mode according to a resolved plan.
    pub(crate) fn spawn(plan: &LaunchPlan, token: Option<&str>) -> Result<Self> {
        Self::from_command(plan.command(token))
    }

    /// Spawn an arbitrary command as a mock Copilot server.
    /// Used in unit tests to inject a command that emits fixed JSON lines.
    #[cfg(test)]
    pub(crate) fn spawn_command(cmd: Command) -> Result<Self> {
        Self::from_command(cmd)
    }

    fn from_command(mut cmd: Command) -> Result<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(CopilotError::Io)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CopilotError::Process("stdout not captured".into()))?;

        let stdin = child.stdin.take();

        // Drain stderr into a buffer so it can be attached to exit errors.
        let stderr_buf = Arc::new(Mutex::new(String::new()));
        if let Some(stderr) = child.stderr.take() {
            let buf = Arc::clone(&stderr_buf);
            tokio::spawn(async move {
                let mut reader = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = reader.next_line().await {
                    if let Ok(mut b) = buf.lock() {
                        if !b.is_empty() {
                            b.push('\n');
                        }
                        b.push_str(&line);
                    }
                }
            });
        }

        let lines = BufReader::new(stdout).lines();
        Ok(Self {
            child,
            lines,
            stdin,
            stderr_buf,
        })
    }

    /// Write one request frame to the server's stdin.
    pub(crate) async fn send_frame(&mut self, req: &RpcRequest<'_>) -> Result<()> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| CopilotError::Process("stdin already closed".into()))?;

        let mut buf = serde_json::to_vec(req)
            .map_err(|e| CopilotError::Process(format!("failed to serialize request: {e}")))?;
        buf.push(b'\n');

        stdin.write_all(&buf).await.map_err(CopilotError::Io)?;
        stdin.flush().await.map_err(CopilotError::Io)?;

        Ok(())
    }

    /// Read the next non-empty JSONL line from stdout and deserialize it.
    ///
    /// Returns `Ok(None)` on EOF (server exited). A line that is not a
    /// JSON-RPC frame is a hard [`CopilotError::Parse`] — the server never
    /// writes anything else to stdout.
    pub(crate) async fn next_frame(&mut self) -> Result<Option<RpcFrame>> {
        loop {
            match self.lines.next_line().await {
                Err(e) => return Err(CopilotError::Io(e)),
                Ok(None) => return Ok(None),
                Ok(Some(line)) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    return serde_json::from_str::<RpcFrame>(trimmed)
                        .map(Some)
                        .map_err(|e| CopilotError::Parse {
                            line: trimmed.to_owned(),
                            source: e,
                        });
                }
            }
        }
    }

    /// Wait for the child to exit and return an error if the exit code is
    /// non-zero or the process was killed by a signal. Captured stderr is
    /// included in the error message.
    pub(crate) async fn wait_exit_error(&mut self) -> Option<CopilotError> {
        let status = match self.child.wait().await {
            Ok(s) => s,
            Err(e) => return Some(CopilotError::Io(e)),
        };

        if status.success() {
            return None;
        }

        let stderr = self
            .stderr_buf
            .lock()
            .ok()
            .map(|b| b.clone())
            .unwrap_or_default();

        let msg = if let Some(code) = status.code() {
            if stderr.is_empty() {
                format!("Copilot CLI exited with code {code}")
            } else {
                format!("Copilot CLI exited with code {code}\nstderr: {stderr}")
            }
        } else {
            // Killed by signal (Unix)
            if stderr.is_empty() {
                "Copilot CLI terminated by signal".to_string()
            } else {
                format!("Copilot CLI terminated by signal\nstderr: {stderr}")
            }
        };

        Some(CopilotError::Process(msg))
    }

    /// Kill the subprocess (best-effort; errors are silently ignored).
    pub(crate) async fn kill(&mut self) {
        let _ = self.child.kill().await;
    }
}
