//! Command implementations.

use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, instrument};

use mavenkit_core::config::CONFIG_FILE_NAME;
use mavenkit_core::{Coordinate, MavenKitConfig, RemoteRepository, ToolEnvironment};
use mavenkit_invoker::{
    BuildInvoker, DistributionSelection, DistributionSelector, ExecutionOptions, OutputHandler,
    ProcessProbe,
};
use mavenkit_metadata::ArtifactLookup;
use mavenkit_resolver::MavenResolver;

use crate::cli::{CliError, Command, OkEnvelope};

/// State shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    /// Loaded configuration.
    pub config: MavenKitConfig,
    /// Emit JSON envelopes.
    pub json: bool,
}

impl Context {
    /// Load the configuration from `path`, or `./mavenkit.toml` when absent.
    pub fn load(path: Option<&Path>, json: bool) -> Result<Self, CliError> {
        let path = path.map_or_else(|| PathBuf::from(CONFIG_FILE_NAME), Path::to_path_buf);
        debug!(config = %path.display(), "Loading configuration");
        Ok(Self {
            config: MavenKitConfig::load(&path)?,
            json,
        })
    }

    fn selector(&self) -> DistributionSelector {
        DistributionSelector::new(
            ToolEnvironment::from_process(),
            Arc::new(ProcessProbe::new(self.config.probe_timeout())),
        )
    }

    fn resolver(&self, repositories: Vec<RemoteRepository>) -> MavenResolver {
        let mut resolver = MavenResolver::new(self.config.clone()).with_selector(self.selector());
        for repository in repositories {
            resolver.add_remote_repository(repository);
        }
        resolver
    }

    /// Print `data` as a JSON envelope, or `text` otherwise.
    #[allow(clippy::print_stdout)]
    fn emit<T: Serialize>(&self, data: &T, text: &str) -> Result<(), CliError> {
        if self.json {
            let json = serde_json::to_string(&OkEnvelope::new(data))
                .map_err(|e| CliError::other(format!("Failed to serialize output: {e}")))?;
            println!("{json}");
        } else if !text.is_empty() {
            println!("{text}");
        }
        Ok(())
    }
}

/// Writes build output straight to the terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput {
    quiet: bool,
}

#[allow(clippy::print_stdout, clippy::print_stderr)]
impl OutputHandler for ConsoleOutput {
    fn on_stdout(&self, line: &str) {
        if self.quiet {
            eprintln!("{line}");
        } else {
            println!("{line}");
        }
    }

    fn on_stderr(&self, line: &str) {
        eprintln!("{line}");
    }
}

#[derive(Serialize)]
struct SelectOutput<'a> {
    #[serde(flatten)]
    selection: &'a DistributionSelection,
    launcher: Option<PathBuf>,
    settings_home: Option<PathBuf>,
}

#[derive(Serialize)]
struct ResolveOutput<'a> {
    selection: &'a DistributionSelection,
    files: Vec<&'a Path>,
}

/// Run `command`.
#[instrument(name = "command", skip_all)]
pub async fn execute(command: Command, ctx: &Context) -> Result<(), CliError> {
    match command {
        Command::Run {
            pom,
            selection,
            java_home,
            args,
        } => {
            let invoker = BuildInvoker::new(ctx.selector());
            // JSON mode keeps stdout for the envelope.
            let output = ConsoleOutput { quiet: ctx.json };
            let result = invoker
                .run(&pom, &args, java_home.as_deref(), &selection.options(), &output)
                .await?;
            ctx.emit(&result, "")?;
            if result.success() {
                Ok(())
            } else {
                Err(CliError::Build {
                    exit_code: result.exit_code,
                })
            }
        }
        Command::Resolve {
            pom,
            test,
            repositories,
            selection,
        } => {
            let resolution = ctx
                .resolver(repositories)
                .resolve_dependencies(&pom, &selection.options(), test)
                .await?;
            let files: Vec<&Path> = resolution.files.paths().collect();
            let text = files
                .iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>()
                .join("\n");
            ctx.emit(
                &ResolveOutput {
                    selection: &resolution.selection,
                    files,
                },
                &text,
            )
        }
        Command::Classpath {
            pom,
            repositories,
            selection,
        } => {
            let class_path = ctx
                .resolver(repositories)
                .class_path(&pom, &selection.options())
                .await?;
            let joined = std::env::join_paths(&class_path)
                .map_err(|e| CliError::other(format!("Cannot join class path: {e}")))?;
            ctx.emit(&class_path, &joined.to_string_lossy())
        }
        Command::Artifact {
            coordinate,
            repositories,
        } => {
            let coordinate = Coordinate::parse(&coordinate)?;
            let path = ctx
                .resolver(repositories)
                .resolve_coordinate(&coordinate, &ExecutionOptions::default())
                .await?;
            ctx.emit(&path, &path.display().to_string())
        }
        Command::Latest { coordinate } => {
            let lookup = ArtifactLookup::from_config(&ctx.config)?;
            let version = lookup.fetch_latest_version_str(&coordinate).await?;
            ctx.emit(&version, &version)
        }
        Command::Compare { coordinate } => {
            let lookup = ArtifactLookup::from_config(&ctx.config)?;
            let result = lookup.compare_with_latest_str(&coordinate).await?;
            let text = format!("{}\t{}", result.latest_version, result.signum());
            ctx.emit(&result, &text)
        }
        Command::Select { pom, selection } => {
            let selector = ctx.selector();
            let chosen = selector.select(Some(&pom), &selection.options()).await;
            let launcher = selector.launcher(&chosen);
            let settings_home = selector.home_for_settings(&chosen).await;
            let text = format!(
                "mode: {:?}\nlauncher: {}\nsettings home: {}",
                chosen.mode,
                launcher
                    .as_deref()
                    .map_or_else(|| "mvn (PATH)".to_string(), |p| p.display().to_string()),
                settings_home
                    .as_deref()
                    .map_or_else(|| "-".to_string(), |p| p.display().to_string()),
            );
            ctx.emit(
                &SelectOutput {
                    selection: &chosen,
                    launcher,
                    settings_home,
                },
                &text,
            )
        }
    }
}
