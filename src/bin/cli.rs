// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 ascad contributors

//! ascad CLI

use anyhow::{Context, Result};
use ascad::{format as format_program, parse, Evaluator, Fault};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::fs;
use std::path::Path;

#[derive(Parser)]
#[command(name = "ascad")]
#[command(about = "ascad - declarative parametric CAD modeling", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a program to binary STL
    Render {
        /// Input program
        input: String,

        /// Output STL file
        #[arg(short, long)]
        output: String,
    },

    /// Reprint a program in canonical form
    Fmt {
        /// Input program
        input: String,

        /// Rewrite the file in place instead of printing to stdout
        #[arg(short, long)]
        write: bool,
    },

    /// Parse a program and output its syntax tree as JSON
    Parse {
        /// Input program
        input: String,

        /// Output JSON file
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Parse and evaluate a program, reporting the first fault if any
    Check {
        /// Input program
        input: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Render { input, output } => render_command(input, output),
        Commands::Fmt { input, write } => fmt_command(input, *write),
        Commands::Parse { input, output } => parse_command(input, output.as_deref()),
        Commands::Check { input } => check_command(input),
        Commands::Version => {
            println!("ascad v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn read_program(input: &str) -> Result<String> {
    if !Path::new(input).exists() {
        anyhow::bail!("input file not found: {}", input);
    }
    fs::read_to_string(input).with_context(|| format!("failed to read {}", input))
}

fn report_fault(fault: &Fault) {
    eprintln!("{} {}", "error:".red().bold(), fault);
}

fn render_command(input: &str, output: &str) -> Result<()> {
    let text = read_program(input)?;

    let start = std::time::Instant::now();
    let stl = match ascad::render(input, &text) {
        Ok(stl) => stl,
        Err(fault) => {
            report_fault(&fault);
            std::process::exit(1);
        }
    };

    fs::write(output, &stl).with_context(|| format!("failed to write {}", output))?;
    println!(
        "Rendered {} -> {} ({} bytes in {:.2?})",
        input,
        output,
        stl.len(),
        start.elapsed()
    );
    Ok(())
}

fn fmt_command(input: &str, write: bool) -> Result<()> {
    let text = read_program(input)?;
    let formatted = match format_program(input, &text) {
        Ok(formatted) => formatted,
        Err(fault) => {
            report_fault(&fault);
            std::process::exit(1);
        }
    };

    if write {
        fs::write(input, &formatted).with_context(|| format!("failed to write {}", input))?;
    } else {
        print!("{}", formatted);
    }
    Ok(())
}

fn parse_command(input: &str, output: Option<&str>) -> Result<()> {
    let text = read_program(input)?;
    let syntaxes = match parse(input, &text) {
        Ok(syntaxes) => syntaxes,
        Err(fault) => {
            report_fault(&fault);
            std::process::exit(1);
        }
    };

    let json = serde_json::to_string_pretty(&syntaxes)?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("failed to write {}", path))?
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn check_command(input: &str) -> Result<()> {
    let text = read_program(input)?;
    let result = parse(input, &text).and_then(|syntaxes| Evaluator::new().evaluate(&syntaxes));
    match result {
        Ok(root) => {
            println!("{} {} ({} shapes)", "ok:".green().bold(), input, root.children.len());
            Ok(())
        }
        Err(fault) => {
            report_fault(&fault);
            std::process::exit(1);
        }
    }
}
