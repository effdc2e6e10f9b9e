//! The `ddl` command-line interface.
//!
//! Thin driver over the library: reads files, runs the readers and the
//! validator, and renders results. Structural errors are reported through
//! miette; validation findings through [`output`].

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use walkdir::WalkDir;

use crate::cli::args::{Command, DataFormat, DdlArgs, ReportFormat};
use crate::document::{self, ReaderOptions};
use crate::errors::{print_error, DdlError, SourceContext};
use crate::schema::{self, Schema};
use crate::syntax::StringTable;
use crate::validation::{Diagnostics, SymbolTable, ValidationContext, Validator};

pub mod args;
pub mod diagnostics;
pub mod output;

/// File extension of DDL documents picked up from directories.
pub const DOCUMENT_EXTENSION: &str = "ddl";

/// The main entry point for the CLI.
pub fn run() {
    let args = DdlArgs::parse();
    init_tracing(args.verbose);

    let options = ReaderOptions {
        duplicate_keys: args.duplicate_keys.into(),
        ..ReaderOptions::default()
    };

    let result = match args.command {
        Command::Check {
            schemas,
            paths,
            format,
            deny_warnings,
        } => handle_check(&schemas, &paths, format, deny_warnings, options),
        Command::Parse { file, format } => handle_parse(&file, format, options),
        Command::Schema { file } => handle_schema(&file),
        Command::Fmt { file, check } => handle_fmt(&file, check, options),
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(report) => {
            eprintln!("{:?}", report);
            process::exit(1);
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ddl={}", level)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn read_source(path: &Path) -> Result<SourceContext> {
    let content = fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(SourceContext::from_file(path.display().to_string(), content))
}

/// Expands directories into the `.ddl` files below them, sorted.
pub fn collect_documents(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let mut found = Vec::new();
        for entry in WalkDir::new(path) {
            let entry = entry
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to walk {}", path.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let is_document = entry
                .path()
                .extension()
                .is_some_and(|ext| ext == DOCUMENT_EXTENSION);
            if is_document {
                found.push(entry.path().to_path_buf());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

// ============================================================================
// CHECK
// ============================================================================

#[derive(Debug, Serialize)]
struct FileReport {
    file: String,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    diagnostics: Diagnostics,
}

fn handle_check(
    schema_paths: &[PathBuf],
    paths: &[PathBuf],
    format: ReportFormat,
    deny_warnings: bool,
    options: ReaderOptions,
) -> Result<bool> {
    let mut strings = StringTable::new();

    let mut schema_sources = Vec::new();
    for path in schema_paths {
        schema_sources.push(read_source(path)?);
    }
    let schemas = schema_sources
        .iter()
        .map(|source| schema::parse_with(source, &mut strings))
        .collect::<std::result::Result<Vec<Schema>, DdlError>>()?;

    let mut table = SymbolTable::new();
    let mut documents = Vec::new();
    for (path, schema) in schema_paths.iter().zip(&schemas) {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| SymbolTable::DEFAULT_DOCUMENT.to_string());
        documents.push(table.add_document(strings.intern(&stem), schema));
    }

    let mut schema_ok = true;
    for (document, source) in documents.iter().zip(&schema_sources) {
        let findings = table.document_diagnostics(*document);
        if !findings.is_empty() {
            output::print_diagnostics(&findings, source);
        }
        schema_ok &= findings.is_valid();
    }
    if !schema_ok {
        eprintln!("schema errors; no documents were checked");
        return Ok(false);
    }
    let root = documents[0];

    let files = collect_documents(paths)?;
    let mut reports = Vec::new();
    let mut failed = 0;
    for file in &files {
        let source = read_source(file)?;
        let report = match document::parse_with(&source, &mut strings, options) {
            Ok(node) => {
                let mut context = ValidationContext::new();
                Validator::new(&table, &mut context).run_document(root, &node);
                let diagnostics = context.into_diagnostics();
                let valid = diagnostics.is_valid()
                    && !(deny_warnings && diagnostics.warnings().next().is_some());
                if format == ReportFormat::Text {
                    output::print_diagnostics(&diagnostics, &source);
                    output::print_verdict(&source.name, &diagnostics);
                }
                FileReport {
                    file: source.name.clone(),
                    valid,
                    error: None,
                    diagnostics,
                }
            }
            Err(error) => {
                let message = error.to_string();
                if format == ReportFormat::Text {
                    print_error(error);
                }
                FileReport {
                    file: source.name.clone(),
                    valid: false,
                    error: Some(message),
                    diagnostics: Diagnostics::new(),
                }
            }
        };
        if !report.valid {
            failed += 1;
        }
        reports.push(report);
    }

    match format {
        ReportFormat::Text => output::print_summary(files.len(), failed),
        ReportFormat::Json => output::print_json(&reports)?,
    }
    Ok(failed == 0)
}

// ============================================================================
// PARSE / SCHEMA / FMT
// ============================================================================

fn handle_parse(path: &Path, format: DataFormat, options: ReaderOptions) -> Result<bool> {
    let source = read_source(path)?;
    let node = document::parse_with(&source, &mut StringTable::new(), options)?;
    match format {
        DataFormat::Json => output::print_json(&node)?,
        DataFormat::Yaml => output::print_yaml(&node)?,
    }
    Ok(true)
}

fn handle_schema(path: &Path) -> Result<bool> {
    let source = read_source(path)?;
    let schema = schema::parse_with(&source, &mut StringTable::new())?;
    println!("{}", schema);

    let table = SymbolTable::build(&schema);
    let findings = table.diagnostics();
    output::print_diagnostics(&findings, &source);
    Ok(findings.is_valid())
}

fn handle_fmt(path: &Path, check: bool, options: ReaderOptions) -> Result<bool> {
    let source = read_source(path)?;
    let node = document::parse_with(&source, &mut StringTable::new(), options)?;
    let formatted = document::to_pretty_string(&node);

    if !check {
        print!("{}", formatted);
        return Ok(true);
    }
    if formatted == source.content {
        return Ok(true);
    }
    output::print_format_diff(&source.name, &source.content, &formatted);
    Ok(false)
}
