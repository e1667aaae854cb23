//! macOS adapters driven through `osascript`.

mod dialog;
mod reminders;

use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{MeetSyncError, MeetSyncResult};

pub use dialog::DialogPresenter;
pub use reminders::RemindersAppSink;

/// Limit for scripts that don't wait on the user.
pub const SCRIPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Run an AppleScript and return its trimmed stdout.
///
/// The script is fed on stdin. The child is killed if `limit` elapses.
pub async fn run_osascript(script: &str, limit: Duration) -> MeetSyncResult<String> {
    tracing::trace!(
        script_preview = %script.chars().take(100).collect::<String>(),
        timeout_secs = limit.as_secs(),
        "running osascript"
    );

    timeout(limit, run_raw(script))
        .await
        .map_err(|_| MeetSyncError::ScriptTimeout(limit.as_secs()))?
}

async fn run_raw(script: &str) -> MeetSyncResult<String> {
    let mut child = TokioCommand::new("osascript")
        .arg("-")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| MeetSyncError::Script(format!("Failed to spawn osascript: {e}")))?;

    let mut stdin = child
        .stdin
        .take()
        .ok_or_else(|| MeetSyncError::Script("osascript stdin unavailable".into()))?;
    stdin.write_all(script.as_bytes()).await?;
    drop(stdin);

    let output = child.wait_with_output().await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(MeetSyncError::Script(format!(
            "exit status {}: {}",
            output.status.code().unwrap_or(-1),
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Render `text` as a double-quoted AppleScript string literal.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out.push('"');
    out
}
