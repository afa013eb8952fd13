//! Interrogating an executable for the installation it belongs to.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use mavenkit_core::config::DEFAULT_PROBE_TIMEOUT_SECS;

/// Arguments that make the tool print its own home directory.
pub const PROBE_ARGS: [&str; 4] = [
    "help:evaluate",
    "-Dexpression=maven.home",
    "-q",
    "-DforceStdout",
];

/// Result of one interrogation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// First non-blank trimmed line of output.
    pub value: Option<String>,
    /// Exit code 0 and a non-blank value.
    pub succeeded: bool,
}

impl ProbeOutcome {
    /// A successful interrogation yielding `value`.
    #[must_use]
    pub fn success(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            succeeded: true,
        }
    }

    /// A failed interrogation.
    #[must_use]
    pub fn failure() -> Self {
        Self::default()
    }

    /// The value, only when the interrogation succeeded.
    #[must_use]
    pub fn into_value(self) -> Option<String> {
        if self.succeeded { self.value } else { None }
    }
}

/// Runs an executable and reports what it printed.
///
/// Implementations never fail: every problem becomes a failed outcome.
#[async_trait]
pub trait ExecutableProbe: Send + Sync {
    /// Interrogate `executable`.
    async fn probe(&self, executable: &Path) -> ProbeOutcome;
}

/// Spawns the executable as a child process with a bounded wait.
#[derive(Debug, Clone)]
pub struct ProcessProbe {
    timeout: Duration,
}

impl Default for ProcessProbe {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_PROBE_TIMEOUT_SECS))
    }
}

impl ProcessProbe {
    /// Create a probe that waits at most `timeout` for the child.
    #[must_use]
    pub const fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

async fn first_non_blank<R: AsyncRead + Unpin>(reader: R) -> Option<String> {
    let mut lines = BufReader::new(reader).lines();
    let mut found = None;
    // Keep draining so the child never blocks on a full pipe.
    while let Ok(Some(line)) = lines.next_line().await {
        if found.is_none() && !line.trim().is_empty() {
            found = Some(line.trim().to_string());
        }
    }
    found
}

#[async_trait]
impl ExecutableProbe for ProcessProbe {
    async fn probe(&self, executable: &Path) -> ProbeOutcome {
        debug!(executable = %executable.display(), "Probing executable");

        let mut cmd = Command::new(executable);
        cmd.args(PROBE_ARGS)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = executable.parent().filter(|d| !d.as_os_str().is_empty()) {
            cmd.current_dir(dir);
        }

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => {
                warn!(executable = %executable.display(), error = %e, "Failed to spawn executable");
                return ProbeOutcome::failure();
            }
        };

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let out = async {
                match stdout {
                    Some(s) => first_non_blank(s).await,
                    None => None,
                }
            };
            let err = async {
                match stderr {
                    Some(s) => first_non_blank(s).await,
                    None => None,
                }
            };
            let (out, err, status) = tokio::join!(out, err, child.wait());
            (out.or(err), status)
        };

        match timeout(self.timeout, run).await {
            Ok((value, Ok(status))) => {
                let succeeded = status.success() && value.is_some();
                if !succeeded {
                    warn!(
                        executable = %executable.display(),
                        code = ?status.code(),
                        output = ?value,
                        "Probe did not yield a value"
                    );
                }
                ProbeOutcome { value, succeeded }
            }
            Ok((_, Err(e))) => {
                warn!(executable = %executable.display(), error = %e, "Failed waiting for executable");
                ProbeOutcome::failure()
            }
            Err(_elapsed) => {
                warn!(
                    executable = %executable.display(),
                    timeout_secs = self.timeout.as_secs(),
                    "Probe timed out; killing child"
                );
                ProbeOutcome::failure()
            }
        }
    }
}
