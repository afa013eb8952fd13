//! Translation of command-line style tokens into a structured invocation.
//!
//! [`translate`] never fails: tokens it does not understand are forwarded
//! verbatim through [`ParsedInvocation::additional_args`], and flags that
//! need a value but have none are dropped with a warning.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{trace, warn};

/// How the reactor reacts to a failing module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReactorFailureBehavior {
    /// `-fae`: build everything possible, fail at the end.
    FailAtEnd,
    /// `-ff`: stop at the first failure.
    FailFast,
    /// `-fn`: never fail the build.
    FailNever,
}

impl ReactorFailureBehavior {
    /// The switch that selects this behavior.
    #[must_use]
    pub const fn flag(self) -> &'static str {
        match self {
            Self::FailAtEnd => "-fae",
            Self::FailFast => "-ff",
            Self::FailNever => "-fn",
        }
    }
}

/// Boolean switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
#[allow(clippy::struct_excessive_bools)]
pub struct InvocationFlags {
    /// `-am`
    pub also_make: bool,
    /// `-amd`
    pub also_make_dependents: bool,
    /// `-o` / `--offline`
    pub offline: bool,
    /// `-U`
    pub update_snapshots: bool,
    /// `-nsu`
    pub no_snapshot_updates: bool,
    /// `-X` / `--debug`
    pub debug: bool,
    /// `-e` / `--errors`
    pub show_errors: bool,
    /// `-q` / `--quiet`
    pub quiet: bool,
    /// `-ntp` / `--no-transfer-progress`
    pub no_transfer_progress: bool,
}

/// The structured form of a token list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParsedInvocation {
    /// Goals and phases, in order.
    pub goals: Vec<String>,
    /// `-D` properties. A later definition of the same key wins.
    pub properties: BTreeMap<String, String>,
    /// Active profiles (`-P`).
    pub profiles: Vec<String>,
    /// Selected reactor projects (`-pl`).
    pub projects: Vec<String>,
    /// `-s` / `--settings`
    pub user_settings_file: Option<PathBuf>,
    /// `-gs` / `--global-settings`
    pub global_settings_file: Option<PathBuf>,
    /// `-t` / `--toolchains`
    pub toolchains_file: Option<PathBuf>,
    /// `-T`
    pub threads: Option<String>,
    /// `-rf`
    pub resume_from: Option<String>,
    /// `-fae` / `-ff` / `-fn`; the last one wins.
    pub reactor_failure_behavior: Option<ReactorFailureBehavior>,
    /// Boolean switches.
    pub flags: InvocationFlags,
    /// Unrecognized `-` tokens, forwarded uninterpreted.
    pub additional_args: Vec<String>,
}

/// Flags taking a value, recognized by prefix in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueFlag {
    Property,
    Profiles,
    UserSettings,
    GlobalSettings,
    Toolchains,
    Projects,
    ResumeFrom,
    Threads,
}

const VALUE_FLAGS: &[(ValueFlag, &[&str])] = &[
    (ValueFlag::Property, &["-D"]),
    (ValueFlag::Profiles, &["-P"]),
    (ValueFlag::UserSettings, &["--settings", "-s"]),
    (ValueFlag::GlobalSettings, &["--global-settings", "-gs"]),
    (ValueFlag::Toolchains, &["--toolchains", "-t"]),
    (ValueFlag::Projects, &["-pl"]),
    (ValueFlag::ResumeFrom, &["-rf"]),
    (ValueFlag::Threads, &["-T"]),
];

fn match_value_flag(token: &str) -> Option<(ValueFlag, &'static str)> {
    VALUE_FLAGS.iter().find_map(|(flag, forms)| {
        forms
            .iter()
            .find(|form| token.starts_with(**form))
            .map(|form| (*flag, *form))
    })
}

/// Translate tokens into a [`ParsedInvocation`].
///
/// Blank tokens are skipped. The same input always yields the same output.
#[must_use]
pub fn translate<S: AsRef<str>>(tokens: &[S]) -> ParsedInvocation {
    let mut parsed = ParsedInvocation::default();
    let mut i = 0;

    while i < tokens.len() {
        let token = tokens[i].as_ref().trim();
        i += 1;

        if token.is_empty() {
            continue;
        }
        if !token.starts_with('-') {
            parsed.goals.push(token.to_string());
            continue;
        }
        if apply_switch(&mut parsed, token) {
            continue;
        }

        let Some((flag, form)) = match_value_flag(token) else {
            trace!(arg = token, "Forwarding unrecognized argument");
            parsed.additional_args.push(token.to_string());
            continue;
        };

        let attached = &token[form.len()..];
        // `-D` only takes an attached definition.
        let value = if attached.is_empty() && flag == ValueFlag::Property {
            None
        } else if attached.is_empty() {
            match tokens.get(i) {
                Some(next) => {
                    i += 1;
                    Some(next.as_ref().trim().to_string())
                }
                None => None,
            }
        } else {
            Some(attached.strip_prefix('=').unwrap_or(attached).to_string())
        };

        match value.filter(|v| !v.trim().is_empty()) {
            Some(value) => apply_value(&mut parsed, flag, &value),
            None => warn!(flag = form, "Dropping flag without a value"),
        }
    }

    parsed
}

fn apply_switch(parsed: &mut ParsedInvocation, token: &str) -> bool {
    let flags = &mut parsed.flags;
    match token {
        "-am" => flags.also_make = true,
        "-amd" => flags.also_make_dependents = true,
        "-o" | "--offline" => flags.offline = true,
        "-U" => flags.update_snapshots = true,
        "-nsu" => flags.no_snapshot_updates = true,
        "-X" | "--debug" => flags.debug = true,
        "-e" | "--errors" => flags.show_errors = true,
        "-q" | "--quiet" => flags.quiet = true,
        "-ntp" | "--no-transfer-progress" => flags.no_transfer_progress = true,
        "-fae" => parsed.reactor_failure_behavior = Some(ReactorFailureBehavior::FailAtEnd),
        "-ff" => parsed.reactor_failure_behavior = Some(ReactorFailureBehavior::FailFast),
        "-fn" => parsed.reactor_failure_behavior = Some(ReactorFailureBehavior::FailNever),
        _ => return false,
    }
    true
}

fn apply_value(parsed: &mut ParsedInvocation, flag: ValueFlag, value: &str) {
    match flag {
        ValueFlag::Property => {
            let (key, val) = value.split_once('=').unwrap_or((value, ""));
            if key.trim().is_empty() {
                warn!(definition = value, "Dropping property without a name");
            } else {
                parsed.properties.insert(key.to_string(), val.to_string());
            }
        }
        ValueFlag::Profiles => parsed.profiles.extend(split_list(value)),
        ValueFlag::Projects => parsed.projects.extend(split_list(value)),
        ValueFlag::UserSettings => parsed.user_settings_file = Some(PathBuf::from(value)),
        ValueFlag::GlobalSettings => parsed.global_settings_file = Some(PathBuf::from(value)),
        ValueFlag::Toolchains => parsed.toolchains_file = Some(PathBuf::from(value)),
        ValueFlag::ResumeFrom => parsed.resume_from = Some(value.to_string()),
        ValueFlag::Threads => parsed.threads = Some(value.to_string()),
    }
}

fn split_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
