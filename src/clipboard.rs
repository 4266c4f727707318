//! Copies the server URL to the system clipboard by piping it into the
//! platform's clipboard tool.

use std::io;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

/// Clipboard tools tried in order, program and arguments
const TOOLS: &[(&str, &[&str])] = &[
    ("pbcopy", &[]),
    ("clip", &[]),
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

/// Upper bound for a single tool invocation
const TOOL_TIMEOUT: Duration = Duration::from_secs(2);

/// Copy `text` using the first tool that succeeds.
///
/// Returns the last tool's error when none of them works.
pub async fn copy(text: &str) -> io::Result<()> {
    let mut last_error = io::Error::new(io::ErrorKind::NotFound, "no clipboard tool available");

    for (program, args) in TOOLS {
        match tokio::time::timeout(TOOL_TIMEOUT, pipe_into(program, args, text)).await {
            Ok(Ok(())) => return Ok(()),
            Ok(Err(e)) => last_error = e,
            Err(_) => {
                last_error = io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("{program} did not finish in time"),
                );
            }
        }
    }
    Err(last_error)
}

async fn pipe_into(program: &str, args: &[&str], text: &str) -> io::Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes()).await?;
        // Closing stdin tells the tool the input is complete
        drop(stdin);
    }

    let status = child.wait().await?;
    if status.success() {
        Ok(())
    } else {
        Err(io::Error::other(format!("{program} exited with {status}")))
    }
}
