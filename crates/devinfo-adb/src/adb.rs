use std::{
    io,
    path::{Path, PathBuf},
    process::{Output, Stdio},
    sync::OnceLock,
    time::Duration,
};

use devinfo_core::AccessorUnavailable;
use tokio::process::Command;

pub const DEFAULT_ADB_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum AdbFailure {
    #[error("adb not found (set DEVINFO_ADB_PATH or ANDROID_SDK_ROOT)")]
    NotFound,
    #[error("adb failed: {0}")]
    Io(String),
    #[error("adb command timed out after {}ms", .0.as_millis())]
    TimedOut(Duration),
    #[error("adb command failed with exit {status}{}", exit_detail(.stdout, .stderr))]
    Exit {
        status: i32,
        stdout: String,
        stderr: String,
    },
}

impl From<AdbFailure> for AccessorUnavailable {
    fn from(err: AdbFailure) -> Self {
        AccessorUnavailable::new(err.to_string())
    }
}

static ADB_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Location of the adb executable, resolved once per process.
pub fn adb_path() -> &'static Path {
    ADB_PATH.get_or_init(resolve_adb_path)
}

fn resolve_adb_path() -> PathBuf {
    if let Ok(path) = std::env::var("DEVINFO_ADB_PATH") {
        return PathBuf::from(path);
    }
    if let Ok(path) = std::env::var("ADB_PATH") {
        return PathBuf::from(path);
    }
    if let Ok(sdk_root) =
        std::env::var("ANDROID_SDK_ROOT").or_else(|_| std::env::var("ANDROID_HOME"))
    {
        let tools = PathBuf::from(&sdk_root).join("platform-tools");
        for name in ["adb", "adb.exe"] {
            let candidate = tools.join(name);
            if candidate.is_file() {
                return candidate;
            }
        }
    }
    PathBuf::from("adb")
}

fn spawn_failure(err: io::Error) -> AdbFailure {
    if err.kind() == io::ErrorKind::NotFound {
        AdbFailure::NotFound
    } else {
        AdbFailure::Io(err.to_string())
    }
}

fn check_status(output: Output) -> Result<Output, AdbFailure> {
    if output.status.success() {
        Ok(output)
    } else {
        Err(AdbFailure::Exit {
            status: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

pub(crate) async fn adb_output(args: &[&str], timeout: Duration) -> Result<Output, AdbFailure> {
    let mut cmd = Command::new(adb_path());
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    let output = match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(result) => result.map_err(spawn_failure)?,
        Err(_) => return Err(AdbFailure::TimedOut(timeout)),
    };
    check_status(output)
}

pub(crate) fn stdout_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

pub(crate) async fn adb_shell(
    serial: &str,
    command: &[&str],
    timeout: Duration,
) -> Result<String, AdbFailure> {
    let mut args = vec!["-s", serial, "shell"];
    args.extend_from_slice(command);
    let output = adb_output(&args, timeout).await?;
    Ok(stdout_text(&output))
}

pub(crate) async fn adb_get_prop(
    serial: &str,
    prop: &str,
    timeout: Duration,
) -> Result<String, AdbFailure> {
    adb_shell(serial, &["getprop", prop], timeout).await
}

pub(crate) async fn adb_get_state(serial: &str, timeout: Duration) -> Result<String, AdbFailure> {
    let output = adb_output(&["-s", serial, "get-state"], timeout).await?;
    Ok(stdout_text(&output))
}

pub(crate) fn format_adb_output(stdout: &str, stderr: &str) -> String {
    let stdout = stdout.trim();
    let stderr = stderr.trim();
    let mut out = String::new();

    if !stdout.is_empty() {
        out.push_str("stdout:\n");
        out.push_str(stdout);
        out.push('\n');
    }
    if !stderr.is_empty() {
        out.push_str("stderr:\n");
        out.push_str(stderr);
        out.push('\n');
    }

    out
}

fn exit_detail(stdout: &str, stderr: &str) -> String {
    let detail = format_adb_output(stdout, stderr);
    if detail.trim().is_empty() {
        String::new()
    } else {
        format!(": {}", detail.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_failure_message_includes_streams() {
        let err = AdbFailure::Exit {
            status: 1,
            stdout: String::new(),
            stderr: "error: device 'abc' not found\n".into(),
        };
        assert_eq!(
            err.to_string(),
            "adb command failed with exit 1: stderr:\nerror: device 'abc' not found"
        );
    }

    #[test]
    fn exit_failure_without_output() {
        let err = AdbFailure::Exit {
            status: 255,
            stdout: " ".into(),
            stderr: String::new(),
        };
        assert_eq!(err.to_string(), "adb command failed with exit 255");
    }

    #[test]
    fn failures_convert_to_unavailable() {
        let unavailable: AccessorUnavailable = AdbFailure::TimedOut(Duration::from_secs(2)).into();
        assert_eq!(unavailable.reason(), "adb command timed out after 2000ms");
    }
}
