//! Running a build with the selected installation.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

use mavenkit_core::{Error, Result};

use crate::distribution::{DistributionSelection, DistributionSelector, ExecutionOptions};
use crate::request::InvocationRequest;

/// Receives the build's output line by line.
pub trait OutputHandler: Send + Sync {
    /// A line written to stdout.
    fn on_stdout(&self, line: &str);
    /// A line written to stderr.
    fn on_stderr(&self, line: &str);
}

/// Forwards stdout to `info` and stderr to `warn` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingOutputHandler;

impl OutputHandler for TracingOutputHandler {
    fn on_stdout(&self, line: &str) {
        info!(target: "mavenkit::build", "{line}");
    }

    fn on_stderr(&self, line: &str) {
        warn!(target: "mavenkit::build", "{line}");
    }
}

/// Outcome of a finished build.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    /// Exit code; `-1` when the process was terminated by a signal.
    pub exit_code: i32,
    /// Installation that ran the build.
    pub selection: DistributionSelection,
    /// The request that was executed.
    pub request: InvocationRequest,
}

impl RunResult {
    /// Whether the build exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches builds.
#[derive(Debug, Clone, Default)]
pub struct BuildInvoker {
    selector: DistributionSelector,
}

impl BuildInvoker {
    /// Create an invoker using `selector` to pick installations.
    #[must_use]
    pub const fn new(selector: DistributionSelector) -> Self {
        Self { selector }
    }

    /// The selector in use.
    #[must_use]
    pub const fn selector(&self) -> &DistributionSelector {
        &self.selector
    }

    /// Translate `tokens`, pick an installation and run the build to
    /// completion.
    ///
    /// A non-zero exit code is reported through [`RunResult`], not as an
    /// error. Errors mean the process could not be started or observed.
    pub async fn run<S: AsRef<str>>(
        &self,
        pom: &Path,
        tokens: &[S],
        java_home: Option<&Path>,
        options: &ExecutionOptions,
        handler: &dyn OutputHandler,
    ) -> Result<RunResult> {
        let request =
            InvocationRequest::from_tokens(pom, tokens).with_java_home(java_home.map(Path::to_path_buf));
        let selection = self.selector.select(Some(pom), options).await;
        self.execute(request, selection, handler).await
    }

    /// Run an already-built request with an already-made selection.
    pub async fn execute(
        &self,
        request: InvocationRequest,
        selection: DistributionSelection,
        handler: &dyn OutputHandler,
    ) -> Result<RunResult> {
        let program = self.selector.launcher(&selection).unwrap_or_else(|| {
            let fallback = PathBuf::from(self.selector.platform().home_launcher());
            warn!(
                launcher = %fallback.display(),
                "No installation selected, relying on PATH"
            );
            fallback
        });
        let args = request.to_command_args();

        info!(
            launcher = %program.display(),
            mode = ?selection.mode,
            dir = %request.base_directory.display(),
            "Running build"
        );
        debug!(args = ?args, "Build arguments");

        let mut cmd = Command::new(&program);
        cmd.args(&args)
            .current_dir(&request.base_directory)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(java_home) = &request.java_home {
            cmd.env("JAVA_HOME", java_home);
        }

        let mut child = cmd.spawn().map_err(|e| {
            Error::io(e, Some(program.clone()), "spawning build process")
        })?;

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();
        let (_, _, status) = tokio::join!(
            forward_lines(stdout, |line| handler.on_stdout(line)),
            forward_lines(stderr, |line| handler.on_stderr(line)),
            child.wait()
        );
        let status = status.map_err(|e| Error::io(e, Some(program), "waiting for build process"))?;

        let exit_code = status.code().unwrap_or(-1);
        if exit_code == 0 {
            info!("Build succeeded");
        } else {
            warn!(exit_code, "Build failed");
        }

        Ok(RunResult {
            exit_code,
            selection,
            request,
        })
    }
}

async fn forward_lines<R, F>(reader: Option<R>, mut sink: F)
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let Some(reader) = reader else { return };
    let mut lines = BufReader::new(reader).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => sink(&line),
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "Stopped reading build output");
                break;
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::distribution::{DistributionMode, Platform, WRAPPER_MARKER, WRAPPER_UNIX};
    use crate::probe::ProcessProbe;
    use mavenkit_core::ToolEnvironment;
    use std::os::unix::fs::PermissionsExt;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    #[derive(Default)]
    struct Collecting {
        out: Mutex<Vec<String>>,
        err: Mutex<Vec<String>>,
    }

    impl OutputHandler for Collecting {
        fn on_stdout(&self, line: &str) {
            self.out.lock().unwrap().push(line.to_string());
        }

        fn on_stderr(&self, line: &str) {
            self.err.lock().unwrap().push(line.to_string());
        }
    }

    fn script(path: &Path, body: &str) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn invoker() -> BuildInvoker {
        let selector =
            DistributionSelector::new(ToolEnvironment::empty(), Arc::new(ProcessProbe::default()))
                .with_platform(Platform::Unix);
        BuildInvoker::new(selector)
    }

    #[tokio::test]
    async fn test_runs_wrapper_with_rendered_arguments() {
        let project = TempDir::new().unwrap();
        std::fs::create_dir_all(project.path().join(".mvn/wrapper")).unwrap();
        std::fs::write(project.path().join(WRAPPER_MARKER), "").unwrap();
        script(
            &project.path().join(WRAPPER_UNIX),
            "echo \"args: $*\"\necho \"java: $JAVA_HOME\"\necho oops >&2",
        );
        let pom = project.path().join("pom.xml");

        let handler = Collecting::default();
        let result = invoker()
            .run(
                &pom,
                &["clean", "-Pci"],
                Some(Path::new("/opt/jdk")),
                &ExecutionOptions::default(),
                &handler,
            )
            .await
            .unwrap();

        assert!(result.success());
        assert_eq!(result.selection.mode, DistributionMode::Wrapper);
        let out = handler.out.lock().unwrap().clone();
        assert_eq!(
            out,
            vec![
                format!("args: -B -f {} clean -P ci", pom.display()),
                "java: /opt/jdk".to_string(),
            ]
        );
        assert_eq!(handler.err.lock().unwrap().clone(), vec!["oops"]);
    }

    #[tokio::test]
    async fn test_home_launcher_exit_code_is_reported() {
        let project = TempDir::new().unwrap();
        let home = TempDir::new().unwrap();
        script(&home.path().join("bin/mvn"), "exit 3");
        let pom = project.path().join("pom.xml");

        let options = ExecutionOptions::default().with_tool_home(home.path());
        let result = invoker()
            .run(&pom, &["verify"], None, &options, &TracingOutputHandler)
            .await
            .unwrap();
        assert_eq!(result.exit_code, 3);
        assert!(!result.success());
        assert_eq!(result.selection.mode, DistributionMode::Home);
    }

    #[tokio::test]
    async fn test_missing_launcher_is_an_io_error() {
        let project = TempDir::new().unwrap();
        let options = ExecutionOptions::default().with_tool_home(project.path().join("nope"));
        let err = invoker()
            .run(
                &project.path().join("pom.xml"),
                &["verify"],
                None,
                &options,
                &TracingOutputHandler,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
