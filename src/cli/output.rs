//! User-facing output for the CLI: data dumps, reports and diffs.

use std::io;

use difference::{Changeset, Difference};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::cli::diagnostics::{write_report, DiagnosticReport};
use crate::errors::SourceContext;
use crate::validation::Diagnostics;

// ============================================================================
// DATA OUTPUT
// ============================================================================

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).into_diagnostic()?;
    println!("{}", text);
    Ok(())
}

pub fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_yaml::to_string(value).into_diagnostic()?;
    print!("{}", text);
    Ok(())
}

// ============================================================================
// DIAGNOSTICS
// ============================================================================

/// Prints every diagnostic of `source` to stderr.
pub fn print_diagnostics(diagnostics: &Diagnostics, source: &SourceContext) {
    let mut stderr = StandardStream::stderr(ColorChoice::Auto);
    for diagnostic in diagnostics {
        let report = DiagnosticReport::new(diagnostic, source);
        if write_report(&mut stderr, &report).is_err() {
            eprintln!("{}", report);
        }
    }
}

/// One-line verdict for a checked file.
pub fn print_verdict(name: &str, diagnostics: &Diagnostics) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let errors = diagnostics.errors().count();
    let warnings = diagnostics.warnings().count();
    let (label, color) = match (errors, warnings) {
        (0, 0) => ("ok", Color::Green),
        (0, _) => ("ok", Color::Yellow),
        _ => ("invalid", Color::Red),
    };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    print!("{:>7}", label);
    let _ = stdout.reset();
    println!(
        " {} ({} {}, {} {})",
        name,
        errors,
        plural(errors, "error"),
        warnings,
        plural(warnings, "warning")
    );
}

pub fn print_summary(files: usize, failed: usize) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    let color = if failed == 0 { Color::Green } else { Color::Red };
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true));
    println!("{} {} checked, {} failed", files, plural(files, "file"), failed);
    let _ = stdout.reset();
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}

// ============================================================================
// DIFFS
// ============================================================================

/// Prints a line diff from `original` to `formatted`.
pub fn print_format_diff(name: &str, original: &str, formatted: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Auto);
    println!("--- {}", name);
    println!("+++ {} (formatted)", name);
    let changeset = Changeset::new(original, formatted, "\n");
    if print_diff(&mut stdout, &changeset.diffs).is_err() {
        println!("{}", changeset);
    }
}

fn print_diff(stdout: &mut impl WriteColor, diffs: &[Difference]) -> io::Result<()> {
    for diff in diffs {
        match diff {
            Difference::Same(ref x) => {
                stdout.reset()?;
                for line in x.lines() {
                    writeln!(stdout, " {}", line)?;
                }
            }
            Difference::Add(ref x) => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
                for line in x.lines() {
                    writeln!(stdout, "+{}", line)?;
                }
            }
            Difference::Rem(ref x) => {
                stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                for line in x.lines() {
                    writeln!(stdout, "-{}", line)?;
                }
            }
        }
    }
    stdout.reset()
}
