//! Rendering shared by every inspection command.
//!
//! Each command builds one serializable report and hands it to
//! [`render_mode`] with a tab-separated renderer and a human renderer; JSON
//! comes for free from `serde`.
//!
//! The mode is picked, first match wins, from `--format` (or the hidden
//! `--json`), then the `FORMAT` environment variable, then whether stdout is
//! a terminal ([`OutputMode::Pretty`]) or a pipe ([`OutputMode::Text`]).

use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use egonav_core::error::{ConfigError, DatasetError, ErrorCode};
use serde::Serialize;

/// Width of the rule under pretty section headings.
pub const RULE_WIDTH: usize = 72;

pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{}", "-".repeat(RULE_WIDTH))
}

/// Heading plus rule.
pub fn pretty_section(w: &mut dyn Write, heading: &str) -> io::Result<()> {
    writeln!(w, "{heading}")?;
    pretty_rule(w)
}

/// `Key:` padded to a fixed column, then the value.
pub fn pretty_kv(w: &mut dyn Write, key: &str, value: impl AsRef<str>) -> io::Result<()> {
    let key = format!("{key}:");
    writeln!(w, "{key:<12} {}", value.as_ref())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Sections and aligned columns for people.
    Pretty,
    /// One tab-separated record per line for scripts.
    Text,
    /// The report serialized as JSON.
    Json,
}

impl OutputMode {
    fn from_env_value(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Some(Self::Pretty),
            "text" => Some(Self::Text),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

fn pick_mode(
    flag: Option<OutputMode>,
    json: bool,
    env: Option<&str>,
    stdout_is_tty: bool,
) -> OutputMode {
    flag.or_else(|| json.then_some(OutputMode::Json))
        .or_else(|| env.and_then(OutputMode::from_env_value))
        .unwrap_or(if stdout_is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// The effective mode for this process.
pub fn resolve_output_mode(flag: Option<OutputMode>, json: bool) -> OutputMode {
    let env = std::env::var("FORMAT").ok();
    pick_mode(flag, json, env.as_deref(), io::stdout().is_terminal())
}

/// Write `report` to stdout in `mode`.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    report: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    render_to(&mut io::stdout().lock(), mode, report, text, pretty)
}

/// [`render_mode`] against any writer.
pub fn render_to<T: Serialize>(
    out: &mut dyn Write,
    mode: OutputMode,
    report: &T,
    text: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *out, report)?;
            writeln!(out)?;
        }
        OutputMode::Text => text(report, out)?,
        OutputMode::Pretty => pretty(report, out)?,
    }
    Ok(())
}

/// A failure as shown to the user, with the typed code for scripts.
#[derive(Debug, Serialize)]
pub struct CliError {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// `E####` from [`ErrorCode::code`].
    pub error_code: String,
}

impl CliError {
    pub fn from_code(message: String, code: ErrorCode) -> Self {
        Self {
            message,
            suggestion: code.hint().map(str::to_string),
            error_code: code.code().to_string(),
        }
    }
}

impl From<&DatasetError> for CliError {
    fn from(err: &DatasetError) -> Self {
        Self::from_code(err.to_string(), err.code())
    }
}

impl From<&ConfigError> for CliError {
    fn from(err: &ConfigError) -> Self {
        Self::from_code(err.to_string(), err.code())
    }
}

/// Report `error` on stderr.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    write_error(&mut io::stderr().lock(), mode, error)
}

fn write_error(out: &mut dyn Write, mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        serde_json::to_writer_pretty(&mut *out, &serde_json::json!({ "error": error }))?;
        writeln!(out)?;
        return Ok(());
    }
    writeln!(out, "error[{}]: {}", error.error_code, error.message)?;
    if let Some(hint) = &error.suggestion {
        writeln!(out, "  hint: {hint}")?;
    }
    Ok(())
}
