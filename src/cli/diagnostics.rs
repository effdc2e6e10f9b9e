//! Terminal presentation of validation diagnostics.
//!
//! Structural errors are rendered by miette; semantic findings use this
//! lighter renderer: a header, the location, and the offending source line
//! with a caret underline.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::io;

use termcolor::{Color, ColorSpec, WriteColor};
use unicode_width::UnicodeWidthStr;

use crate::errors::SourceContext;
use crate::validation::{Diagnostic, Severity};

/// A diagnostic paired with the source it points into.
pub struct DiagnosticReport<'a> {
    diagnostic: &'a Diagnostic,
    source: &'a SourceContext,
}

impl<'a> DiagnosticReport<'a> {
    pub fn new(diagnostic: &'a Diagnostic, source: &'a SourceContext) -> Self {
        Self { diagnostic, source }
    }

    fn header(&self) -> String {
        format!(
            "{}[{}]: {}",
            self.diagnostic.severity, self.diagnostic.code, self.diagnostic.message
        )
    }

    fn location(&self) -> String {
        format!(
            "  --> {}:{}:{}",
            self.source.name, self.diagnostic.span.line, self.diagnostic.span.column
        )
    }
}

impl Display for DiagnosticReport<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(f, "{}", self.header())?;
        writeln!(f, "{}", self.location())?;
        if let Some(snippet) = code_snippet(&self.source.content, self.diagnostic) {
            write!(f, "{}", snippet)?;
        }
        Ok(())
    }
}

/// Writes `report` with the severity colored.
pub fn write_report(writer: &mut impl WriteColor, report: &DiagnosticReport) -> io::Result<()> {
    let color = match report.diagnostic.severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    };
    writer.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(writer, "{}", report.diagnostic.severity)?;
    writer.reset()?;
    writer.set_color(ColorSpec::new().set_bold(true))?;
    writeln!(
        writer,
        "[{}]: {}",
        report.diagnostic.code, report.diagnostic.message
    )?;
    writer.reset()?;
    writeln!(writer, "{}", report.location())?;
    if let Some(snippet) = code_snippet(&report.source.content, report.diagnostic) {
        write!(writer, "{}", snippet)?;
    }
    Ok(())
}

// ============================================================================
// SNIPPETS
// ============================================================================

/// The first line of the diagnostic's span, underlined.
fn code_snippet(source: &str, diagnostic: &Diagnostic) -> Option<String> {
    let span = diagnostic.span;
    let line = source.lines().nth(span.line.checked_sub(1)?)?;
    let line_start = line_offset(source, span.line)?;

    let column_offset = span.start.checked_sub(line_start)?;
    let prefix = line.get(..column_offset.min(line.len()))?;
    let underlined = line.get(prefix.len()..(span.end.saturating_sub(line_start)).min(line.len()))?;

    let gutter = span.line.to_string().len();
    let carets = underlined.width().max(1);

    let mut out = String::new();
    out.push_str(&format!("{:width$} |\n", "", width = gutter));
    out.push_str(&format!("{} | {}\n", span.line, line));
    out.push_str(&format!(
        "{:width$} | {}{}\n",
        "",
        " ".repeat(prefix.width()),
        "^".repeat(carets),
        width = gutter
    ));
    Some(out)
}

/// Byte offset at which 1-based `line` starts.
fn line_offset(source: &str, line: usize) -> Option<usize> {
    if line == 1 {
        return Some(0);
    }
    source
        .match_indices('\n')
        .nth(line - 2)
        .map(|(offset, _)| offset + 1)
}
