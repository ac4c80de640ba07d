//! CLI definition.
//!
//! ClassGenie has a single workflow: read a project configuration and
//! generate the sources of every class it declares. `--check` runs the same
//! pipeline without writing anything.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use genie_model::{Project, ProjectReader};

pub mod check;
pub mod generate;

/// ClassGenie - class source generator
#[derive(Parser, Debug)]
#[command(name = "classgenie")]
#[command(version, about = "ClassGenie - generate class sources from metadata and templates")]
#[command(long_about = r#"
ClassGenie merges class metadata (JSON, YAML or XML) into text templates and
writes one definition file, and optionally one implementation file, per class.

Output goes to <project-directory>/<project-name> unless --output is given.

EXIT CODES:
  0 - Success
  1 - General error
  2 - Invalid arguments
  3 - Validation failure
  4 - Template, grammar or block error
  5 - Configuration error
  6 - Write error
"#)]
pub struct Cli {
    /// Path to the project configuration file (.json, .xml, .yaml)
    #[arg(short, long, env = "CLASSGENIE_CONFIG")]
    pub config_file: PathBuf,

    /// Fail on tags left unresolved in the output. `#include <a.h>` and
    /// `#import <a.h>` targets are not tags
    #[arg(long, env = "CLASSGENIE_STRICT")]
    pub strict: bool,

    /// Expand every template without writing files
    #[arg(long)]
    pub check: bool,

    /// Write into this directory instead of <project-directory>/<project-name>
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Read and decode the project configuration.
pub fn load_project(path: &Path) -> Result<Project> {
    ProjectReader::read(path)
        .with_context(|| format!("Failed to load project from {}", path.display()))
}
