#![forbid(unsafe_code)]

//! GEDCOM CLI - parse, validate and re-emit genealogy transmissions.
//!
//! # Commands
//!
//! - `parse`: Output a JSON summary or the full record tree
//! - `emit`: Re-serialize a transmission in canonical order
//! - `validate`: Check input for errors and report diagnostics
//! - `find`: Print one indexed record's regenerated text

use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ged_core::{Category, GedcomConfig, ParseConfig};
use ged_emit::{GedcomEmitter, emit_with_config};
use ged_parser::{ParseResult, parse_summary_json, parse_with_config};
use serde::Serialize;
use tracing::{debug, info, warn};

/// GEDCOM CLI - parse, validate and re-emit genealogy transmissions.
#[derive(Debug, Parser)]
#[command(
    name = "ged",
    version,
    about = "GEDCOM CLI - parse, validate and re-emit genealogy transmissions",
    long_about = "A table-driven GEDCOM 5.5 engine.\n\n\
        Reads lineage-linked transmissions into a typed record tree, resolves\n\
        cross-references, and writes canonical GEDCOM back out."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable verbose logging (can be repeated for more detail: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML file with `[parse]` and `[emit]` sections. Flags override it.
    #[arg(short, long, global = true)]
    config: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a transmission and output it as JSON.
    Parse {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output the full record tree (default is summary)
        #[arg(long)]
        full: bool,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Re-serialize a transmission as canonical GEDCOM.
    Emit {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output file path. If omitted, writes to stdout.
        #[arg(short, long)]
        output: Option<String>,

        /// Line width before data continues on a CONC line
        #[arg(short, long)]
        wrap: Option<usize>,
    },

    /// Validate a transmission and report diagnostics.
    Validate {
        /// Input file path or "-" for stdin.
        #[arg(default_value = "-")]
        input: String,

        /// Output as JSON (structured diagnostics)
        #[arg(long)]
        json: bool,

        /// Require a trailer and exit with non-zero status on warnings
        #[arg(long)]
        strict: bool,
    },

    /// Print one record, looked up by category and xref key.
    Find {
        /// Input file path or "-" for stdin.
        input: String,

        /// Record category (individual, family, source, note, ... or its tag)
        category: String,

        /// Xref key, with or without the surrounding `@`
        key: String,
    },
}

#[derive(Debug, Serialize)]
struct Diagnostic {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    line: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ValidateResult {
    valid: bool,
    record_count: usize,
    has_trailer: bool,
    dangling_references: Vec<String>,
    warnings: Vec<Diagnostic>,
    errors: Vec<Diagnostic>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Parse {
            input,
            full,
            pretty,
        } => cmd_parse(&input, &config, full, pretty),
        Command::Emit {
            input,
            output,
            wrap,
        } => cmd_emit(&input, config, output.as_deref(), wrap),
        Command::Validate {
            input,
            json,
            strict,
        } => cmd_validate(&input, config, json, strict),
        Command::Find {
            input,
            category,
            key,
        } => cmd_find(&input, &config, &category, &key),
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .without_time()
        .try_init();
}

fn load_config(path: Option<&str>) -> Result<GedcomConfig> {
    let Some(path) = path else {
        return Ok(GedcomConfig::default());
    };
    let text = std::fs::read_to_string(path).context(format!("Failed to read config: {path}"))?;
    let config: GedcomConfig =
        toml::from_str(&text).context(format!("Invalid config file: {path}"))?;
    debug!("Loaded config from {path}: {config:?}");
    Ok(config)
}

fn load_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).context(format!("Failed to read file: {input}"))
    }
}

fn write_output(output: Option<&str>, content: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, content).context(format!("Failed to write to: {path}"))?;
            info!("Wrote output to: {path}");
        }
        None => {
            io::stdout()
                .write_all(content.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }
    Ok(())
}

fn load_and_parse(input: &str, config: &ParseConfig) -> Result<ParseResult> {
    let source = load_input(input)?;
    let parsed = parse_with_config(&source, config);
    for warning in &parsed.warnings {
        warn!("{}", warning.message);
    }
    Ok(parsed)
}

// =============================================================================
// Command: parse
// =============================================================================

fn cmd_parse(input: &str, config: &GedcomConfig, full: bool, pretty: bool) -> Result<()> {
    let parsed = load_and_parse(input, &config.parse)?;

    let output = if full {
        if pretty {
            serde_json::to_string_pretty(&parsed.transmission)?
        } else {
            serde_json::to_string(&parsed.transmission)?
        }
    } else {
        let summary = parse_summary_json(&parsed);
        if pretty {
            let value: serde_json::Value = serde_json::from_str(&summary)?;
            serde_json::to_string_pretty(&value)?
        } else {
            summary
        }
    };

    println!("{output}");
    Ok(())
}

// =============================================================================
// Command: emit
// =============================================================================

fn cmd_emit(
    input: &str,
    mut config: GedcomConfig,
    output: Option<&str>,
    wrap: Option<usize>,
) -> Result<()> {
    if let Some(width) = wrap {
        config.emit.wrap_width = width;
    }

    let parsed = load_and_parse(input, &config.parse)?;
    for error in &parsed.errors {
        warn!("Dropped line [{}]: {error}", error.code().as_str());
    }

    let text = emit_with_config(&parsed.transmission, &config.emit);
    write_output(output, &text)
}

// =============================================================================
// Command: validate
// =============================================================================

fn cmd_validate(
    input: &str,
    mut config: GedcomConfig,
    json_output: bool,
    strict: bool,
) -> Result<()> {
    if strict {
        config.parse.require_trailer = true;
    }

    let parsed = load_and_parse(input, &config.parse)?;
    let transmission = &parsed.transmission;

    let warnings: Vec<Diagnostic> = parsed
        .warnings
        .iter()
        .map(|warning| Diagnostic {
            code: warning.code.as_str().to_string(),
            message: warning.message.clone(),
            line: (warning.line > 0).then_some(warning.line),
        })
        .collect();
    let errors: Vec<Diagnostic> = parsed
        .errors
        .iter()
        .map(|error| Diagnostic {
            code: error.code().as_str().to_string(),
            message: error.to_string(),
            line: error.line(),
        })
        .collect();
    let dangling_references: Vec<String> = transmission
        .dangling_references()
        .iter()
        .map(|xref| format!("{} {xref}", xref.category.as_str()))
        .collect();

    let valid = errors.is_empty()
        && dangling_references.is_empty()
        && (!strict || warnings.is_empty());

    let result = ValidateResult {
        valid,
        record_count: transmission.counts().values().sum(),
        has_trailer: transmission.has_trailer(),
        dangling_references,
        warnings,
        errors,
    };

    if json_output {
        let output = serde_json::to_string_pretty(&result)?;
        println!("{output}");
    } else {
        if result.valid {
            println!("✓ Valid transmission");
        } else {
            println!("✗ Invalid transmission");
        }

        println!("  Records: {}", result.record_count);
        println!("  Trailer: {}", if result.has_trailer { "yes" } else { "no" });

        if !result.errors.is_empty() {
            println!("\nErrors:");
            for err in &result.errors {
                print_diagnostic(err);
            }
        }

        if !result.dangling_references.is_empty() {
            println!("\nDangling references:");
            for reference in &result.dangling_references {
                println!("  {reference}");
            }
        }

        if !result.warnings.is_empty() {
            println!("\nWarnings:");
            for warning in &result.warnings {
                print_diagnostic(warning);
            }
        }
    }

    if !result.valid {
        std::process::exit(1);
    }

    Ok(())
}

fn print_diagnostic(diagnostic: &Diagnostic) {
    let location = diagnostic
        .line
        .map(|line| format!(" (line {line})"))
        .unwrap_or_default();
    println!("  [{}] {}{}", diagnostic.code, diagnostic.message, location);
}

// =============================================================================
// Command: find
// =============================================================================

fn cmd_find(input: &str, config: &GedcomConfig, category: &str, key: &str) -> Result<()> {
    let category = Category::parse(category)
        .with_context(|| format!("Unknown record category: {category}"))?;
    let key = key.trim_matches('@');

    let parsed = load_and_parse(input, &config.parse)?;
    let transmission = &parsed.transmission;
    let record = transmission
        .find(category, key)
        .with_context(|| format!("No {} record @{key}@", category.as_str()))?;

    let text =
        GedcomEmitter::new(config.emit.clone()).emit_record(transmission, record, 0);
    debug!("Found {} @{key}@ ({} bytes)", category.as_str(), text.len());
    write_output(None, &text)
}
