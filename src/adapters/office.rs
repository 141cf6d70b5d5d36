//! Office-document conversion through a headless LibreOffice process.
//!
//! The process is invoked with a fixed shape:
//!
//! ```text
//! soffice --headless --invisible --nologo --nodefault --norestore --nolockcheck \
//!         [-env:UserInstallation=file://<out_dir>/office-profile] \
//!         --convert-to <target> --outdir <out_dir> <input>
//! ```
//!
//! Every run is bounded by a timeout. On expiry the child is killed (the
//! `Command` is `kill_on_drop`) and [`ToolError::Timeout`] is returned. The
//! same kill happens if the caller drops the conversion future.
//!
//! The `soffice` launcher forks `soffice.bin`, which would survive a kill of
//! the launcher alone. On unix the child therefore leads its own process
//! group, and the whole group is killed unless the launcher exited cleanly.
//!
//! `soffice` may exit 0 without writing anything (unsupported filter, broken
//! input), so a successful exit is only trusted once the expected output file
//! is on disk.

use crate::error::ToolError;
use futures::future::BoxFuture;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Converts one office document into `target` format inside `out_dir`.
///
/// Returns the path of the written file.
pub trait OfficeConverter: Send + Sync {
    fn convert<'a>(
        &'a self,
        input: &'a Path,
        out_dir: &'a Path,
        target: &'a str,
    ) -> BoxFuture<'a, Result<PathBuf, ToolError>>;
}

/// [`OfficeConverter`] backed by the `soffice` executable.
#[derive(Debug, Clone)]
pub struct SofficeConverter {
    binary: PathBuf,
    timeout: Duration,
    isolated_profile: bool,
}

impl SofficeConverter {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: Duration::from_secs(120),
            isolated_profile: true,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Give each run its own `UserInstallation` under `out_dir`, so runs never
    /// wait on each other's profile lock.
    pub fn with_isolated_profile(mut self, v: bool) -> Self {
        self.isolated_profile = v;
        self
    }

    fn tool_name(&self) -> String {
        self.binary
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.binary.display().to_string())
    }

    /// Arguments for one run, in invocation order.
    pub fn args(&self, input: &Path, out_dir: &Path, target: &str) -> Vec<String> {
        let mut args: Vec<String> = [
            "--headless",
            "--invisible",
            "--nologo",
            "--nodefault",
            "--norestore",
            "--nolockcheck",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        if self.isolated_profile {
            args.push(format!(
                "-env:UserInstallation={}",
                file_url(&out_dir.join("office-profile"))
            ));
        }

        args.push("--convert-to".into());
        args.push(target.to_string());
        args.push("--outdir".into());
        args.push(out_dir.display().to_string());
        args.push(input.display().to_string());
        args
    }

    async fn run(&self, input: &Path, out_dir: &Path, target: &str) -> Result<PathBuf, ToolError> {
        let tool = self.tool_name();
        let start = Instant::now();
        let expected = super::sibling_output(input, out_dir, target);

        let mut cmd = Command::new(&self.binary);
        cmd.args(self.args(input, out_dir, target))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        info!("Running {} → {} for {}", tool, target, input.display());

        let child = cmd.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ToolError::NotFound {
                    tool: tool.clone(),
                    detail: format!("'{}' is not on PATH", self.binary.display()),
                }
            } else {
                ToolError::NonZeroExit {
                    tool: tool.clone(),
                    code: None,
                    detail: format!("spawn failed: {e}"),
                }
            }
        })?;

        let mut group = ProcessGroup { leader: child.id() };

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                return Err(ToolError::NonZeroExit {
                    tool,
                    code: None,
                    detail: format!("wait failed: {e}"),
                })
            }
            Err(_) => {
                warn!(
                    "{} exceeded {}s on {}; killed",
                    tool,
                    self.timeout.as_secs(),
                    input.display()
                );
                return Err(ToolError::Timeout {
                    tool,
                    secs: self.timeout.as_secs(),
                });
            }
        };

        debug!(
            "{} exited with {:?} after {}ms",
            tool,
            output.status.code(),
            start.elapsed().as_millis()
        );

        if !output.status.success() {
            return Err(ToolError::NonZeroExit {
                tool,
                code: output.status.code(),
                detail: last_line(&output.stderr),
            });
        }

        group.release();
        super::ensure_produced(expected)
    }
}

/// Process group led by a spawned converter. Dropping it kills every member
/// still running; [`release`](Self::release) leaves them alone.
struct ProcessGroup {
    leader: Option<u32>,
}

impl ProcessGroup {
    fn release(&mut self) {
        self.leader = None;
    }
}

impl Drop for ProcessGroup {
    fn drop(&mut self) {
        let Some(leader) = self.leader.take() else {
            return;
        };
        #[cfg(unix)]
        {
            use nix::errno::Errno;
            use nix::sys::signal::{killpg, Signal};
            use nix::unistd::Pid;

            let Ok(pgid) = i32::try_from(leader) else {
                return;
            };
            match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
                Ok(()) => debug!("Killed process group {}", pgid),
                Err(Errno::ESRCH) => {}
                Err(e) => warn!("Failed to kill process group {}: {}", pgid, e),
            }
        }
        #[cfg(not(unix))]
        let _ = leader;
    }
}

impl OfficeConverter for SofficeConverter {
    fn convert<'a>(
        &'a self,
        input: &'a Path,
        out_dir: &'a Path,
        target: &'a str,
    ) -> BoxFuture<'a, Result<PathBuf, ToolError>> {
        Box::pin(self.run(input, out_dir, target))
    }
}

/// `file://` URL for a local absolute path.
fn file_url(path: &Path) -> String {
    let s = path.display().to_string().replace('\\', "/");
    if s.starts_with('/') {
        format!("file://{s}")
    } else {
        format!("file:///{s}")
    }
}

/// Last non-empty stderr line, trimmed to 200 chars.
fn last_line(stderr: &[u8]) -> String {
    let text = String::from_utf8_lossy(stderr);
    let line = text
        .lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("no diagnostic output");
    line.chars().take(200).collect()
}
