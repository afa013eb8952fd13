use clap::{Args, Parser, Subcommand};
use miette::{Diagnostic, Report};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use thiserror::Error;

use mavenkit_core::RemoteRepository;
use mavenkit_invoker::ExecutionOptions;

use crate::tracing::TracingFormat;

/// Exit codes for the CLI application
pub const EXIT_OK: i32 = 0;
/// The build ran and failed
pub const EXIT_BUILD: i32 = 1;
/// CLI or configuration error exit code
pub const EXIT_CLI: i32 = 2;
/// Resolution, network or other runtime error exit code
pub const EXIT_RESOLUTION: i32 = 3;

/// CLI-specific error types with proper exit code mapping
#[derive(Error, Debug, Clone, Diagnostic)]
pub enum CliError {
    /// CLI or configuration error (exit code 2)
    #[error("CLI/configuration error: {message}")]
    #[diagnostic(code(mavenkit::cli::config))]
    Config {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Resolution or network error (exit code 3)
    #[error("Resolution error: {message}")]
    #[diagnostic(code(mavenkit::cli::resolution))]
    Resolution {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// Other unexpected error (exit code 3)
    #[error("Unexpected error: {message}")]
    #[diagnostic(code(mavenkit::cli::other))]
    Other {
        /// The error message
        message: String,
        /// Optional help text
        #[help]
        help: Option<String>,
    },
    /// The build itself failed (exit code 1)
    #[error("Build failed with exit code {exit_code}")]
    #[diagnostic(code(mavenkit::cli::build))]
    Build {
        /// Exit code reported by the build
        exit_code: i32,
    },
}

impl CliError {
    /// Create a new configuration error
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new resolution error
    #[must_use]
    pub fn resolution(message: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
            help: None,
        }
    }

    /// Create a new resolution error with help text
    #[must_use]
    pub fn resolution_with_help(message: impl Into<String>, help: impl Into<String>) -> Self {
        Self::Resolution {
            message: message.into(),
            help: Some(help.into()),
        }
    }

    /// Create a new other error
    #[must_use]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
            help: None,
        }
    }
}

/// Convert `mavenkit_core::Error` to the matching `CliError` category.
impl From<mavenkit_core::Error> for CliError {
    fn from(err: mavenkit_core::Error) -> Self {
        use mavenkit_core::Error;
        match err {
            Error::MalformedInput { message } | Error::ConfigBuild { message } => Self::config(message),
            Error::NotFound { .. } => Self::resolution(err.to_string()),
            Error::Network { .. } => Self::resolution_with_help(
                err.to_string(),
                "Check network access and the configured repository URLs",
            ),
            Error::DependencyResolution { .. } => Self::resolution_with_help(
                err.to_string(),
                "Check that the coordinate exists in one of the configured repositories",
            ),
            Error::Io {
                source,
                path,
                operation,
            } => {
                let path_str = path
                    .as_ref()
                    .map_or(String::new(), |p| format!(" on {}", p.display()));
                Self::Other {
                    message: format!("I/O {operation} failed{path_str}: {source}"),
                    help: Some("Check file permissions and ensure the path exists".to_string()),
                }
            }
        }
    }
}

/// Map CLI error to appropriate exit code
#[must_use]
pub const fn exit_code_for(err: &CliError) -> i32 {
    match err {
        CliError::Config { .. } => EXIT_CLI,
        CliError::Resolution { .. } | CliError::Other { .. } => EXIT_RESOLUTION,
        CliError::Build { .. } => EXIT_BUILD,
    }
}

/// Render error appropriately based on JSON flag
#[allow(clippy::print_stdout, clippy::print_stderr)]
pub fn render_error(err: &CliError, json_mode: bool) {
    if json_mode {
        let code = match err {
            CliError::Config { .. } => "config",
            CliError::Resolution { .. } => "resolution",
            CliError::Other { .. } => "other",
            CliError::Build { .. } => "build",
        };
        let envelope = ErrorEnvelope::new(serde_json::json!({
            "code": code,
            "message": err.to_string(),
        }));
        match serde_json::to_string(&envelope) {
            Ok(json) => println!("{json}"),
            Err(_) => eprintln!("Error serializing error response"),
        }
    } else {
        let report = Report::new(err.clone());
        eprintln!("{report:?}");
        let _ = io::stderr().flush();
    }
}

/// Success response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct OkEnvelope<T> {
    /// Always "ok"
    pub status: &'static str,
    /// The payload
    pub data: T,
}

impl<T> OkEnvelope<T> {
    /// Wrap `data`
    #[must_use]
    pub const fn new(data: T) -> Self {
        Self { status: "ok", data }
    }
}

/// Error response envelope for JSON output
#[derive(Debug, Clone, Serialize)]
pub struct ErrorEnvelope<T> {
    /// Always "error"
    pub status: &'static str,
    /// The error payload
    pub error: T,
}

impl<T> ErrorEnvelope<T> {
    /// Wrap `error`
    #[must_use]
    pub const fn new(error: T) -> Self {
        Self {
            status: "error",
            error,
        }
    }
}

/// Drive Maven builds and resolve Maven dependencies from the command line.
#[derive(Parser, Debug)]
#[command(name = "mavenkit", version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value_t = TracingFormat::Compact)]
    pub log_format: TracingFormat,

    /// Emit JSON envelopes instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file; defaults to ./mavenkit.toml when present
    #[arg(long, global = true, env = "MAVENKIT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

/// Options deciding which installation applies.
#[derive(Args, Debug, Clone, Default)]
pub struct SelectionArgs {
    /// Installation to use when the project has no wrapper
    #[arg(long, env = "MAVENKIT_MAVEN_HOME")]
    pub maven_home: Option<PathBuf>,

    /// Ignore the project's wrapper script
    #[arg(long)]
    pub no_wrapper: bool,

    /// Project directory, when it differs from the POM's directory
    #[arg(long)]
    pub project_dir: Option<PathBuf>,
}

impl SelectionArgs {
    /// The execution options these arguments describe.
    #[must_use]
    pub fn options(&self) -> ExecutionOptions {
        ExecutionOptions {
            project_dir: self.project_dir.clone(),
            configured_tool_home: self.maven_home.clone(),
            prefer_wrapper: !self.no_wrapper,
        }
    }
}

/// Subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run a build: `mavenkit run pom.xml -- clean install -DskipTests`
    Run {
        /// Project descriptor
        pom: PathBuf,
        /// Installation selection
        #[command(flatten)]
        selection: SelectionArgs,
        /// JAVA_HOME for the build
        #[arg(long)]
        java_home: Option<PathBuf>,
        /// Goals, phases and options passed to the build
        #[arg(last = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Resolve the project's dependencies to local files
    Resolve {
        /// Project descriptor
        pom: PathBuf,
        /// Include test-scoped dependencies
        #[arg(long)]
        test: bool,
        /// Extra repository as id=url, searched after the configured ones
        #[arg(long = "repo", value_parser = parse_repository)]
        repositories: Vec<RemoteRepository>,
        /// Installation selection
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Print the project's class path
    Classpath {
        /// Project descriptor
        pom: PathBuf,
        /// Extra repository as id=url
        #[arg(long = "repo", value_parser = parse_repository)]
        repositories: Vec<RemoteRepository>,
        /// Installation selection
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Resolve one artifact: `group:artifact[:extension[:classifier]]:version`
    Artifact {
        /// Artifact coordinate
        coordinate: String,
        /// Extra repository as id=url
        #[arg(long = "repo", value_parser = parse_repository)]
        repositories: Vec<RemoteRepository>,
    },
    /// Print the newest published version: `group:artifact[:packaging[:classifier]]`
    Latest {
        /// Artifact coordinate without version
        coordinate: String,
    },
    /// Compare a version with the newest published one: `group:artifact:version[:packaging[:classifier]]`
    Compare {
        /// Artifact coordinate with version
        coordinate: String,
    },
    /// Show which installation a build of the project would use
    Select {
        /// Project descriptor
        pom: PathBuf,
        /// Installation selection
        #[command(flatten)]
        selection: SelectionArgs,
    },
}

/// Parse `id=url`.
pub fn parse_repository(value: &str) -> Result<RemoteRepository, String> {
    match value.split_once('=') {
        Some((id, url)) if !id.trim().is_empty() && !url.trim().is_empty() => {
            Ok(RemoteRepository::new(id.trim(), url.trim()))
        }
        _ => Err(format!("expected id=url, got '{value}'")),
    }
}

/// Parse the process arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_run_forwards_trailing_args() {
        let cli = Cli::try_parse_from([
            "mavenkit",
            "run",
            "pom.xml",
            "--no-wrapper",
            "--",
            "clean",
            "-DskipTests",
            "-Pci",
        ])
        .unwrap();
        match cli.command {
            Command::Run { pom, selection, args, .. } => {
                assert_eq!(pom, PathBuf::from("pom.xml"));
                assert!(!selection.options().prefer_wrapper);
                assert_eq!(args, vec!["clean", "-DskipTests", "-Pci"]);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_repositories() {
        let cli = Cli::try_parse_from([
            "mavenkit",
            "resolve",
            "pom.xml",
            "--test",
            "--repo",
            "internal=https://nexus.example.com/repo",
            "-v",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 1);
        match cli.command {
            Command::Resolve { test, repositories, .. } => {
                assert!(test);
                assert_eq!(repositories[0].id, "internal");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_repository_rejects_missing_url() {
        assert!(parse_repository("internal").is_err());
        assert!(parse_repository("=https://x").is_err());
    }

    #[test]
    fn test_exit_codes() {
        let not_found: CliError = mavenkit_core::Error::not_found("x").into();
        assert_eq!(exit_code_for(&not_found), EXIT_RESOLUTION);
        let malformed: CliError = mavenkit_core::Error::malformed_input("x").into();
        assert_eq!(exit_code_for(&malformed), EXIT_CLI);
        let graph: CliError = mavenkit_core::Error::dependency_resolution("g:a:jar:1", "boom").into();
        assert_eq!(exit_code_for(&graph), EXIT_RESOLUTION);
        assert_eq!(exit_code_for(&CliError::Build { exit_code: 7 }), EXIT_BUILD);
    }
}
