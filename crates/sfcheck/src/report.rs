//! Report rendering: boxed table for terminals, single status line for
//! monitoring supervisors, JSON for everything else.

use std::fmt::Write as _;
use std::io::IsTerminal;

use chrono::{DateTime, Local};
use colored::Colorize;
use serde::Serialize;

use crate::aggregate::{AggregateStatus, CheckResult};
use crate::error::CheckError;
use crate::severity::Severity;
use crate::target::Mode;

/// Probe name shown in the table header.
pub const PROBE_NAME: &str = "Element Monitoring Plugin";

/// Inner width of the table box.
const INNER_WIDTH: usize = 83;

/// Width of each table column.
const COLUMN_WIDTH: usize = 40;

/// Wrap width for values that do not fit their column.
const WRAP_WIDTH: usize = 18;

/// asctime-style timestamp.
const TIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// How to print the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Table on a terminal, line otherwise.
    #[default]
    Auto,
    /// Boxed table.
    Table,
    /// Single status line.
    Line,
    /// JSON document.
    Json,
}

impl OutputFormat {
    /// Resolve `Auto` against whether stdout is a terminal.
    #[must_use]
    pub fn resolve(self) -> Self {
        match self {
            Self::Auto if std::io::stdout().is_terminal() => Self::Table,
            Self::Auto => Self::Line,
            other => other,
        }
    }
}

/// Outcome of one run, ready to render.
#[derive(Debug, Clone)]
pub struct Report {
    /// Header text.
    pub title: String,
    /// Kind of check that ran.
    pub mode: Mode,
    /// Aggregated results.
    pub status: AggregateStatus,
    /// When the run finished.
    pub executed_at: DateTime<Local>,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    mode: Mode,
    status: Severity,
    exit_code: i32,
    executed_at: String,
    results: &'a [CheckResult],
}

impl Report {
    /// Create a report stamped with the current time.
    pub fn new(mode: Mode, status: AggregateStatus) -> Self {
        let section = match mode {
            Mode::Cluster => "Cluster information",
            Mode::Node => "Node information",
        };
        Self {
            title: format!("{PROBE_NAME} v{} {section}", env!("CARGO_PKG_VERSION")),
            mode,
            status,
            executed_at: Local::now(),
        }
    }

    /// Overall severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.status.severity
    }

    /// Process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.status.severity.exit_code()
    }

    /// Render in the given format. `Auto` is resolved first.
    pub fn render(&self, format: OutputFormat, color: bool) -> Result<String, CheckError> {
        match format.resolve() {
            OutputFormat::Table | OutputFormat::Auto => Ok(self.render_table(color)),
            OutputFormat::Line => Ok(self.render_line()),
            OutputFormat::Json => self.render_json(),
        }
    }

    /// Boxed two-column table.
    #[must_use]
    pub fn render_table(&self, color: bool) -> String {
        let border = format!("+{}+", "-".repeat(INNER_WIDTH));
        let mut out = String::new();

        let _ = writeln!(out, "{border}");
        let _ = writeln!(out, "| {:<width$}|", self.title, width = INNER_WIDTH - 1);
        let _ = writeln!(out, "{border}");

        for result in &self.status.results {
            push_row(&mut out, &result.label, &result.display, None);
        }

        let executed = self.executed_at.format(TIME_FORMAT).to_string();
        push_row(&mut out, "Execution Time", &executed, None);

        let label = self.severity().display_label();
        let shown = if color {
            paint(self.severity(), label)
        } else {
            label.to_string()
        };
        push_row(&mut out, "Exit State", label, Some(&shown));

        let _ = writeln!(out, "{border}");
        out
    }

    /// `<STATUS> - Label: value ...` over the summary results.
    #[must_use]
    pub fn render_line(&self) -> String {
        let mut line = format!("{} -", self.severity().as_str());
        for result in self.status.summary() {
            let _ = write!(line, " {}: {}", result.label, result.display);
        }
        line
    }

    /// Pretty-printed JSON document.
    pub fn render_json(&self) -> Result<String, CheckError> {
        let doc = JsonReport {
            title: &self.title,
            mode: self.mode,
            status: self.severity(),
            exit_code: self.exit_code(),
            executed_at: self.executed_at.to_rfc3339(),
            results: &self.status.results,
        };
        serde_json::to_string_pretty(&doc)
            .map_err(|e| CheckError::Configuration(format!("unable to encode report: {e}")))
    }
}

/// Line printed when a run could not complete.
#[must_use]
pub fn render_error(err: &CheckError) -> String {
    format!("{} - {err}", err.severity().as_str())
}

fn paint(severity: Severity, text: &str) -> String {
    match severity {
        Severity::Ok => text.green().bold().to_string(),
        Severity::Warning => text.yellow().bold().to_string(),
        Severity::Critical => text.red().bold().to_string(),
        Severity::Unknown | Severity::Dependent => text.magenta().bold().to_string(),
    }
}

/// Append one `| label | value |` row. `shown` replaces `value` on output
/// (for colored text) while padding follows the plain value.
fn push_row(out: &mut String, label: &str, value: &str, shown: Option<&str>) {
    let width = value.chars().count();
    if width < COLUMN_WIDTH {
        let pad = COLUMN_WIDTH - width;
        let _ = writeln!(
            out,
            "| {label:<COLUMN_WIDTH$} | {}{:>pad$}",
            shown.unwrap_or(value),
            "|"
        );
        return;
    }

    let _ = writeln!(out, "| {label:<COLUMN_WIDTH$} |{:>w$}", "|", w = COLUMN_WIDTH + 1);
    for chunk in wrap(value, WRAP_WIDTH) {
        let pad = COLUMN_WIDTH - chunk.chars().count();
        let _ = writeln!(out, "| {:<COLUMN_WIDTH$} | {chunk}{:>pad$}", "", "|");
    }
}

/// Greedy word wrap; words longer than `width` are split.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while word.len() > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            lines.push(word.drain(..width).collect());
        }
        if word.is_empty() {
            continue;
        }

        let word: String = word.into_iter().collect();
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&word);
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
