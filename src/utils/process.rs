use std::{process::Stdio, time::Duration};

use tokio::process::Command;

use super::ProcessError;

const STDERR_TAIL_CHARS: usize = 600;
const AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs `command` to completion, killing it when `timeout` elapses. Stdout is
/// returned only for a zero exit status.
pub async fn run(program: &str, command: &mut Command, timeout: Duration) -> Result<Vec<u8>, ProcessError> {
    command
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let child = command.spawn().map_err(|source| ProcessError::Spawn {
        program: program.to_string(),
        source,
    })?;

    // Dropping the future on timeout drops the child, which kills it.
    let output = match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(result) => result.map_err(|source| ProcessError::Spawn {
            program: program.to_string(),
            source,
        })?,
        Err(_) => {
            return Err(ProcessError::TimedOut {
                program: program.to_string(),
                timeout,
            })
        }
    };

    if !output.status.success() {
        return Err(ProcessError::Failed {
            program: program.to_string(),
            status: output.status,
            stderr: stderr_tail(&output.stderr),
        });
    }

    Ok(output.stdout)
}

/// Whether `program` can be started at all.
pub async fn binary_available(program: &str, version_arg: &str) -> bool {
    let mut command = Command::new(program);
    command.arg(version_arg);

    match run(program, &mut command, AVAILABILITY_TIMEOUT).await {
        Ok(_) => true,
        Err(e) => {
            debug!("{} is not available: {}", program, e);
            false
        }
    }
}

/// Last few hundred characters of a tool's stderr, on one line.
pub fn stderr_tail(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let text = text.trim();
    let start = text
        .char_indices()
        .rev()
        .nth(STDERR_TAIL_CHARS - 1)
        .map(|(i, _)| i)
        .unwrap_or(0);
    text[start..].replace('\n', " | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stderr_tail_keeps_the_end() {
        let long = format!("{}END", "x".repeat(2000));
        let tail = stderr_tail(long.as_bytes());
        assert_eq!(tail.chars().count(), STDERR_TAIL_CHARS);
        assert!(tail.ends_with("END"));

        assert_eq!(stderr_tail(b"  line one\nline two\n"), "line one | line two");
    }

    #[tokio::test]
    async fn test_missing_binary_is_unavailable() {
        assert!(!binary_available("definitely-not-a-real-binary-4711", "--version").await);
    }

    #[tokio::test]
    async fn test_run_reports_spawn_failure() {
        let mut command = Command::new("definitely-not-a-real-binary-4711");
        let err = run("missing", &mut command, Duration::from_secs(1)).await.unwrap_err();
        assert!(matches!(err, ProcessError::Spawn { .. }));
    }
}
