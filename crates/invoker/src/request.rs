//! A complete build invocation and its command-line rendering.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::args::{ParsedInvocation, translate};

/// Everything needed to launch one build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InvocationRequest {
    /// Build descriptor.
    pub pom_file: PathBuf,
    /// Working directory of the build; the descriptor's directory.
    pub base_directory: PathBuf,
    /// Translated arguments.
    pub invocation: ParsedInvocation,
    /// `JAVA_HOME` for the child process.
    pub java_home: Option<PathBuf>,
    /// Run without interactive prompts (`-B`).
    pub batch_mode: bool,
}

impl InvocationRequest {
    /// Build a batch-mode request for `pom_file`.
    #[must_use]
    pub fn new(pom_file: impl Into<PathBuf>, invocation: ParsedInvocation) -> Self {
        let pom_file = pom_file.into();
        let base_directory = pom_file
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
        Self {
            pom_file,
            base_directory,
            invocation,
            java_home: None,
            batch_mode: true,
        }
    }

    /// Translate `tokens` and build a request from them.
    #[must_use]
    pub fn from_tokens<S: AsRef<str>>(pom_file: impl Into<PathBuf>, tokens: &[S]) -> Self {
        Self::new(pom_file, translate(tokens))
    }

    /// Set `JAVA_HOME`.
    #[must_use]
    pub fn with_java_home(mut self, java_home: Option<PathBuf>) -> Self {
        self.java_home = java_home;
        self
    }

    /// Render the request as command-line arguments for the build tool.
    ///
    /// Properties are emitted sorted by key; unrecognized arguments are
    /// appended verbatim after everything else.
    #[must_use]
    pub fn to_command_args(&self) -> Vec<String> {
        let inv = &self.invocation;
        let mut args = Vec::new();

        if self.batch_mode {
            args.push("-B".to_string());
        }
        args.push("-f".to_string());
        args.push(self.pom_file.display().to_string());

        args.extend(inv.goals.iter().cloned());

        args.extend(inv.properties.iter().map(|(k, v)| {
            if v.is_empty() {
                format!("-D{k}")
            } else {
                format!("-D{k}={v}")
            }
        }));

        if !inv.profiles.is_empty() {
            args.push("-P".to_string());
            args.push(inv.profiles.join(","));
        }
        if !inv.projects.is_empty() {
            args.push("-pl".to_string());
            args.push(inv.projects.join(","));
        }

        let files = [
            ("-s", &inv.user_settings_file),
            ("-gs", &inv.global_settings_file),
            ("-t", &inv.toolchains_file),
        ];
        for (flag, file) in files {
            if let Some(file) = file {
                args.push(flag.to_string());
                args.push(file.display().to_string());
            }
        }

        if let Some(threads) = &inv.threads {
            args.push("-T".to_string());
            args.push(threads.clone());
        }
        if let Some(resume_from) = &inv.resume_from {
            args.push("-rf".to_string());
            args.push(resume_from.clone());
        }
        if let Some(behavior) = inv.reactor_failure_behavior {
            args.push(behavior.flag().to_string());
        }

        let flags = &inv.flags;
        let switches = [
            (flags.also_make, "-am"),
            (flags.also_make_dependents, "-amd"),
            (flags.offline, "-o"),
            (flags.update_snapshots, "-U"),
            (flags.no_snapshot_updates, "-nsu"),
            (flags.debug, "-X"),
            (flags.show_errors, "-e"),
            (flags.quiet, "-q"),
            (flags.no_transfer_progress, "-ntp"),
        ];
        args.extend(
            switches
                .iter()
                .filter(|(on, _)| *on)
                .map(|(_, flag)| (*flag).to_string()),
        );

        args.extend(inv.additional_args.iter().cloned());
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_directory_is_pom_parent() {
        let request = InvocationRequest::from_tokens("/work/app/pom.xml", &["package"]);
        assert_eq!(request.base_directory, PathBuf::from("/work/app"));
        assert!(request.batch_mode);

        let request = InvocationRequest::from_tokens("pom.xml", &["package"]);
        assert_eq!(request.base_directory, PathBuf::from("."));
    }

    #[test]
    fn test_render_full_request() {
        let request = InvocationRequest::from_tokens(
            "/p/pom.xml",
            &[
                "clean", "install", "-Dz=1", "-Da", "-Pone,two", "-pl", "core", "-s", "s.xml",
                "-T", "2", "-rf", ":core", "-fae", "-U", "-q", "-Z",
            ],
        );
        assert_eq!(
            request.to_command_args(),
            vec![
                "-B", "-f", "/p/pom.xml", "clean", "install", "-Da", "-Dz=1", "-P", "one,two",
                "-pl", "core", "-s", "s.xml", "-T", "2", "-rf", ":core", "-fae", "-U", "-q",
                "-Z",
            ]
        );
    }

    #[test]
    fn test_rendered_args_translate_back() {
        let tokens = ["verify", "-Dk=v", "-Pp", "-o", "-nsu", "-ff"];
        let request = InvocationRequest::from_tokens("pom.xml", &tokens);
        let rendered = request.to_command_args();
        // Skip -B -f <pom>, which the translator forwards or reads as a goal.
        let reparsed = translate(&rendered[3..]);
        assert_eq!(reparsed, request.invocation);
    }
}
