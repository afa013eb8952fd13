//! Choosing which toolchain installation runs a build.
//!
//! Precedence is strict:
//!
//! 1. the project's wrapper (`mvnw` plus `.mvn/wrapper/maven-wrapper.properties`),
//!    when wrappers are preferred;
//! 2. the caller-configured tool home;
//! 3. auto-discovery: the `MAVEN_HOME` override, else the first `mvn` on
//!    `PATH` whose interrogation succeeds.
//!
//! Discovery never fails. When nothing is found the selection simply
//! carries no home.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use mavenkit_core::ToolEnvironment;

use crate::probe::{ExecutableProbe, ProcessProbe};

/// Marker file proving a project carries a wrapper.
pub const WRAPPER_MARKER: &str = ".mvn/wrapper/maven-wrapper.properties";

/// Wrapper launcher for Unix-like systems.
pub const WRAPPER_UNIX: &str = "mvnw";

/// Wrapper launcher for Windows.
pub const WRAPPER_WINDOWS: &str = "mvnw.cmd";

/// How the tool will be launched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DistributionMode {
    /// The project's wrapper script.
    Wrapper,
    /// A caller-configured installation.
    Home,
    /// Whatever discovery found, possibly nothing.
    Default,
}

/// Caller options for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionOptions {
    /// Project directory; defaults to the descriptor's directory.
    pub project_dir: Option<PathBuf>,
    /// Installation to use when no wrapper applies.
    pub configured_tool_home: Option<PathBuf>,
    /// Whether a project wrapper takes precedence.
    pub prefer_wrapper: bool,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            project_dir: None,
            configured_tool_home: None,
            prefer_wrapper: true,
        }
    }
}

impl ExecutionOptions {
    /// Set the project directory.
    #[must_use]
    pub fn with_project_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.project_dir = Some(dir.into());
        self
    }

    /// Set the configured tool home.
    #[must_use]
    pub fn with_tool_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.configured_tool_home = Some(home.into());
        self
    }

    /// Set whether a project wrapper takes precedence.
    #[must_use]
    pub const fn with_prefer_wrapper(mut self, prefer: bool) -> Self {
        self.prefer_wrapper = prefer;
        self
    }
}

/// The outcome of [`DistributionSelector::select`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionSelection {
    /// Chosen mode.
    pub mode: DistributionMode,
    /// Project directory the decision was made for.
    pub project_dir: Option<PathBuf>,
    /// Wrapper script, in `Wrapper` mode.
    pub executable: Option<PathBuf>,
    /// Tool home, in `Home` and `Default` modes.
    pub tool_home: Option<PathBuf>,
}

/// Target platform for script and executable naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux, macOS and other Unix-likes.
    Unix,
    /// Windows.
    Windows,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }

    /// Wrapper scripts in order of preference.
    #[must_use]
    pub const fn wrapper_scripts(self) -> [&'static str; 2] {
        match self {
            Self::Unix => [WRAPPER_UNIX, WRAPPER_WINDOWS],
            Self::Windows => [WRAPPER_WINDOWS, WRAPPER_UNIX],
        }
    }

    /// Launcher names looked up in each `PATH` directory, in order.
    #[must_use]
    pub const fn launcher_names(self) -> &'static [&'static str] {
        match self {
            Self::Unix => &["mvn"],
            Self::Windows => &["mvn.cmd", "mvn.bat", "mvn"],
        }
    }

    /// The launcher inside `<home>/bin`.
    #[must_use]
    pub const fn home_launcher(self) -> &'static str {
        match self {
            Self::Unix => "mvn",
            Self::Windows => "mvn.cmd",
        }
    }
}

/// Find the wrapper script for `project_dir`, preferring the platform's
/// native script. `None` unless the marker file exists too.
#[must_use]
pub fn find_wrapper_executable(project_dir: &Path, platform: Platform) -> Option<PathBuf> {
    if !project_dir.join(WRAPPER_MARKER).is_file() {
        return None;
    }
    platform
        .wrapper_scripts()
        .iter()
        .map(|name| project_dir.join(name))
        .find(|path| path.is_file())
}

/// Whether `path` is a file the current user may execute.
#[must_use]
pub fn is_executable(path: &Path) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    metadata.is_file() && has_execute_bit(&metadata)
}

#[cfg(unix)]
fn has_execute_bit(metadata: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn has_execute_bit(_metadata: &std::fs::Metadata) -> bool {
    true
}

/// Decides which installation runs a build.
#[derive(Clone)]
pub struct DistributionSelector {
    env: ToolEnvironment,
    probe: Arc<dyn ExecutableProbe>,
    platform: Platform,
}

impl std::fmt::Debug for DistributionSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributionSelector")
            .field("env", &self.env)
            .field("platform", &self.platform)
            .finish_non_exhaustive()
    }
}

impl Default for DistributionSelector {
    fn default() -> Self {
        Self::new(ToolEnvironment::from_process(), Arc::new(ProcessProbe::default()))
    }
}

impl DistributionSelector {
    /// Create a selector reading `env` and interrogating with `probe`.
    #[must_use]
    pub fn new(env: ToolEnvironment, probe: Arc<dyn ExecutableProbe>) -> Self {
        Self {
            env,
            probe,
            platform: Platform::current(),
        }
    }

    /// Override the platform used for script naming.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// The environment discovery reads.
    #[must_use]
    pub const fn env(&self) -> &ToolEnvironment {
        &self.env
    }

    /// The platform used for script naming.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Choose the installation for a build of `pom`.
    pub async fn select(
        &self,
        pom: Option<&Path>,
        options: &ExecutionOptions,
    ) -> DistributionSelection {
        let project_dir = options.project_dir.clone().or_else(|| {
            pom.and_then(Path::parent).map(|p| {
                if p.as_os_str().is_empty() {
                    PathBuf::from(".")
                } else {
                    p.to_path_buf()
                }
            })
        });

        if options.prefer_wrapper
            && let Some(dir) = &project_dir
            && let Some(script) = find_wrapper_executable(dir, self.platform)
        {
            info!(wrapper = %script.display(), "Using project wrapper");
            return DistributionSelection {
                mode: DistributionMode::Wrapper,
                project_dir,
                executable: Some(script),
                tool_home: None,
            };
        }

        if let Some(home) = &options.configured_tool_home {
            debug!(home = %home.display(), "Using configured tool home");
            return DistributionSelection {
                mode: DistributionMode::Home,
                project_dir,
                executable: None,
                tool_home: Some(home.clone()),
            };
        }

        let tool_home = self.locate_tool_home().await;
        DistributionSelection {
            mode: DistributionMode::Default,
            project_dir,
            executable: None,
            tool_home,
        }
    }

    /// Auto-discover an installation: the `MAVEN_HOME` override, then each
    /// launcher on `PATH` that answers an interrogation.
    pub async fn locate_tool_home(&self) -> Option<PathBuf> {
        if let Some(home) = self.env.maven_home_override() {
            debug!(home = %home.display(), "Using MAVEN_HOME override");
            return Some(home);
        }

        for dir in self.env.path_entries() {
            for name in self.platform.launcher_names() {
                let candidate = dir.join(name);
                if !is_executable(&candidate) {
                    continue;
                }
                if let Some(home) = self.probe.probe(&candidate).await.into_value() {
                    debug!(
                        launcher = %candidate.display(),
                        home = %home,
                        "Discovered tool home on PATH"
                    );
                    return Some(PathBuf::from(home));
                }
                warn!(launcher = %candidate.display(), "Launcher did not report a home, continuing");
            }
        }

        debug!("No tool installation discovered");
        None
    }

    /// The home whose `conf/settings.xml` applies to `selection`.
    ///
    /// In wrapper mode this is whatever the wrapper reports, never the
    /// configured home.
    pub async fn home_for_settings(&self, selection: &DistributionSelection) -> Option<PathBuf> {
        match selection.mode {
            DistributionMode::Wrapper => {
                let script = selection.executable.as_deref()?;
                let home = self.probe.probe(script).await.into_value().map(PathBuf::from);
                if home.is_none() {
                    warn!(wrapper = %script.display(), "Wrapper did not report its home");
                }
                home
            }
            DistributionMode::Home | DistributionMode::Default => selection.tool_home.clone(),
        }
    }

    /// The launcher to spawn for `selection`, `None` meaning plain `mvn`
    /// from `PATH`.
    #[must_use]
    pub fn launcher(&self, selection: &DistributionSelection) -> Option<PathBuf> {
        match selection.mode {
            DistributionMode::Wrapper => selection.executable.clone(),
            DistributionMode::Home | DistributionMode::Default => selection
                .tool_home
                .as_ref()
                .map(|home| home.join("bin").join(self.platform.home_launcher())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::ProbeOutcome;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Answers from a fixed table and records every call.
    #[derive(Default)]
    struct ScriptedProbe {
        answers: HashMap<PathBuf, ProbeOutcome>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedProbe {
        fn answer(mut self, exe: impl Into<PathBuf>, outcome: ProbeOutcome) -> Self {
            self.answers.insert(exe.into(), outcome);
            self
        }

        fn calls(&self) -> Vec<PathBuf> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExecutableProbe for ScriptedProbe {
        async fn probe(&self, executable: &Path) -> ProbeOutcome {
            self.calls.lock().unwrap().push(executable.to_path_buf());
            self.answers.get(executable).cloned().unwrap_or_default()
        }
    }

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, "").unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    fn with_wrapper(dir: &Path, script: &str) {
        touch(&dir.join(WRAPPER_MARKER));
        touch(&dir.join(script));
    }

    fn selector(env: ToolEnvironment, probe: ScriptedProbe) -> (DistributionSelector, Arc<ScriptedProbe>) {
        let probe = Arc::new(probe);
        let selector = DistributionSelector::new(env, probe.clone()).with_platform(Platform::Unix);
        (selector, probe)
    }

    #[tokio::test]
    async fn test_wrapper_beats_configured_home() {
        let project = TempDir::new().unwrap();
        with_wrapper(project.path(), WRAPPER_UNIX);
        let (selector, _) = selector(ToolEnvironment::empty(), ScriptedProbe::default());

        let options = ExecutionOptions::default().with_tool_home("/opt/maven");
        let pom = project.path().join("pom.xml");
        let selection = selector.select(Some(&pom), &options).await;

        assert_eq!(selection.mode, DistributionMode::Wrapper);
        assert_eq!(selection.executable, Some(project.path().join(WRAPPER_UNIX)));
        assert_eq!(selection.project_dir.as_deref(), Some(project.path()));
        assert_eq!(selection.tool_home, None);
    }

    #[tokio::test]
    async fn test_bare_descriptor_name_uses_current_directory() {
        let (selector, _) = selector(ToolEnvironment::empty(), ScriptedProbe::default());
        let options = ExecutionOptions::default().with_tool_home("/opt/maven");
        let selection = selector.select(Some(Path::new("pom.xml")), &options).await;

        assert_eq!(selection.project_dir, Some(PathBuf::from(".")));
    }

    #[tokio::test]
    async fn test_wrapper_ignored_when_not_preferred() {
        let project = TempDir::new().unwrap();
        with_wrapper(project.path(), WRAPPER_UNIX);
        let (selector, _) = selector(ToolEnvironment::empty(), ScriptedProbe::default());

        let options = ExecutionOptions::default()
            .with_project_dir(project.path())
            .with_tool_home("/opt/maven")
            .with_prefer_wrapper(false);
        let selection = selector.select(None, &options).await;

        assert_eq!(selection.mode, DistributionMode::Home);
        assert_eq!(selection.tool_home, Some(PathBuf::from("/opt/maven")));
    }

    #[tokio::test]
    async fn test_marker_without_script_is_not_a_wrapper() {
        let project = TempDir::new().unwrap();
        touch(&project.path().join(WRAPPER_MARKER));
        let (selector, _) = selector(ToolEnvironment::empty(), ScriptedProbe::default());

        let options = ExecutionOptions::default().with_project_dir(project.path());
        let selection = selector.select(None, &options).await;
        assert_eq!(selection.mode, DistributionMode::Default);
        assert_eq!(selection.tool_home, None);
    }

    #[tokio::test]
    async fn test_script_without_marker_is_not_a_wrapper() {
        let project = TempDir::new().unwrap();
        touch(&project.path().join(WRAPPER_UNIX));
        assert_eq!(find_wrapper_executable(project.path(), Platform::Unix), None);
    }

    #[test]
    fn test_wrapper_script_preference() {
        let project = TempDir::new().unwrap();
        with_wrapper(project.path(), WRAPPER_WINDOWS);
        // Only the Windows script exists: both platforms fall back to it.
        assert_eq!(
            find_wrapper_executable(project.path(), Platform::Unix),
            Some(project.path().join(WRAPPER_WINDOWS))
        );
        touch(&project.path().join(WRAPPER_UNIX));
        assert_eq!(
            find_wrapper_executable(project.path(), Platform::Unix),
            Some(project.path().join(WRAPPER_UNIX))
        );
        assert_eq!(
            find_wrapper_executable(project.path(), Platform::Windows),
            Some(project.path().join(WRAPPER_WINDOWS))
        );
    }

    #[tokio::test]
    async fn test_maven_home_override_skips_path_scan() {
        let bin = TempDir::new().unwrap();
        touch(&bin.path().join("mvn"));
        let env = ToolEnvironment::empty()
            .with_path_entries([bin.path()])
            .with_property("MAVEN_HOME", "/from/property");
        let (selector, probe) = selector(env, ScriptedProbe::default());

        let selection = selector.select(None, &ExecutionOptions::default()).await;
        assert_eq!(selection.mode, DistributionMode::Default);
        assert_eq!(selection.tool_home, Some(PathBuf::from("/from/property")));
        assert!(probe.calls().is_empty());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_path_scan_skips_failed_candidates() {
        let broken = TempDir::new().unwrap();
        let working = TempDir::new().unwrap();
        let empty = TempDir::new().unwrap();
        touch(&broken.path().join("mvn"));
        touch(&working.path().join("mvn"));

        let env = ToolEnvironment::empty().with_path_entries([
            empty.path(),
            broken.path(),
            working.path(),
        ]);
        let probe = ScriptedProbe::default()
            .answer(broken.path().join("mvn"), ProbeOutcome::failure())
            .answer(working.path().join("mvn"), ProbeOutcome::success("/opt/apache-maven"));
        let (selector, probe) = selector(env, probe);

        let home = selector.locate_tool_home().await;
        assert_eq!(home, Some(PathBuf::from("/opt/apache-maven")));
        assert_eq!(
            probe.calls(),
            vec![broken.path().join("mvn"), working.path().join("mvn")]
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_executable_candidates_are_not_probed() {
        use std::os::unix::fs::PermissionsExt;
        let bin = TempDir::new().unwrap();
        let mvn = bin.path().join("mvn");
        std::fs::write(&mvn, "").unwrap();
        std::fs::set_permissions(&mvn, std::fs::Permissions::from_mode(0o644)).unwrap();

        let env = ToolEnvironment::empty().with_path_entries([bin.path()]);
        let (selector, probe) = selector(env, ScriptedProbe::default());
        assert_eq!(selector.locate_tool_home().await, None);
        assert!(probe.calls().is_empty());
    }

    #[tokio::test]
    async fn test_nothing_found_is_not_an_error() {
        let (selector, _) = selector(ToolEnvironment::empty(), ScriptedProbe::default());
        let selection = selector.select(None, &ExecutionOptions::default()).await;
        assert_eq!(selection.mode, DistributionMode::Default);
        assert_eq!(selection.project_dir, None);
        assert_eq!(selection.tool_home, None);
        assert_eq!(selector.launcher(&selection), None);
    }

    #[tokio::test]
    async fn test_settings_home_under_wrapper_comes_from_probe() {
        let project = TempDir::new().unwrap();
        with_wrapper(project.path(), WRAPPER_UNIX);
        let script = project.path().join(WRAPPER_UNIX);
        let probe = ScriptedProbe::default()
            .answer(&script, ProbeOutcome::success("/home/u/.m2/wrapper/dists/maven"));
        let (selector, probe) = selector(ToolEnvironment::empty(), probe);

        let options = ExecutionOptions::default()
            .with_project_dir(project.path())
            .with_tool_home("/configured/home");
        let selection = selector.select(None, &options).await;
        let home = selector.home_for_settings(&selection).await;

        assert_eq!(home, Some(PathBuf::from("/home/u/.m2/wrapper/dists/maven")));
        assert_eq!(probe.calls(), vec![script]);
    }

    #[tokio::test]
    async fn test_settings_home_in_home_mode_is_configured_home() {
        let (selector, probe) = selector(ToolEnvironment::empty(), ScriptedProbe::default());
        let options = ExecutionOptions::default().with_tool_home("/opt/maven");
        let selection = selector.select(None, &options).await;

        assert_eq!(
            selector.home_for_settings(&selection).await,
            Some(PathBuf::from("/opt/maven"))
        );
        assert_eq!(
            selector.launcher(&selection),
            Some(PathBuf::from("/opt/maven/bin/mvn"))
        );
        assert!(probe.calls().is_empty());
    }
}
