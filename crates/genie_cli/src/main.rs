//! ClassGenie CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments
//! - 3: Validation failure
//! - 4: Template, grammar or block error
//! - 5: Configuration error
//! - 6: Write error

use std::process::ExitCode;

use clap::error::ErrorKind as ClapErrorKind;
use clap::Parser;
use genie_model::ModelError;
use genie_templates::{ErrorKind, TemplateError};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

use commands::Cli;

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const VALIDATION_FAILURE: u8 = 3;
    pub const TEMPLATE_ERROR: u8 = 4;
    pub const CONFIGURATION_ERROR: u8 = 5;
    pub const WRITE_ERROR: u8 = 6;
}

const DEFAULT_DIRECTIVES: &str = "classgenie=info,genie_model=info,genie_templates=info,warn";
const VERBOSE_DIRECTIVES: &str = "classgenie=debug,genie_model=debug,genie_templates=debug,warn";
const QUIET_DIRECTIVES: &str = "warn";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                    ExitCode::from(ExitCodes::SUCCESS)
                }
                _ => ExitCode::from(ExitCodes::INVALID_ARGS),
            };
        }
    };

    init_logging(&cli);

    let result = if cli.check {
        commands::check::execute(&cli)
    } else {
        commands::generate::execute(&cli)
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("❌ Error: {:#}", e);
            ExitCode::from(exit_code)
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` wins over the verbosity flags.
fn init_logging(cli: &Cli) {
    let directives = if cli.verbose {
        VERBOSE_DIRECTIVES
    } else if cli.quiet {
        QUIET_DIRECTIVES
    } else {
        DEFAULT_DIRECTIVES
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }
}

/// Map the first library error in the chain to an exit code.
fn categorize_error(e: &anyhow::Error) -> u8 {
    for cause in e.chain() {
        if let Some(error) = cause.downcast_ref::<TemplateError>() {
            return match error.kind() {
                ErrorKind::Validation => ExitCodes::VALIDATION_FAILURE,
                ErrorKind::TemplateNotFound
                | ErrorKind::GrammarNotFound
                | ErrorKind::MalformedBlock => ExitCodes::TEMPLATE_ERROR,
                ErrorKind::Configuration => ExitCodes::CONFIGURATION_ERROR,
                ErrorKind::Io => ExitCodes::WRITE_ERROR,
            };
        }
        if let Some(error) = cause.downcast_ref::<ModelError>() {
            return if error.is_validation() {
                ExitCodes::VALIDATION_FAILURE
            } else {
                ExitCodes::CONFIGURATION_ERROR
            };
        }
    }
    ExitCodes::GENERAL_ERROR
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use std::path::PathBuf;

    #[test]
    fn test_cli_requires_config_file() {
        std::env::remove_var("CLASSGENIE_CONFIG");
        let err = Cli::try_parse_from(["classgenie"]).unwrap_err();
        assert_eq!(err.kind(), ClapErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from([
            "classgenie",
            "--config-file",
            "project.json",
            "--strict",
            "--check",
            "-o",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.config_file, PathBuf::from("project.json"));
        assert!(cli.strict);
        assert!(cli.check);
        assert_eq!(cli.output, Some(PathBuf::from("out")));
        assert!(Cli::try_parse_from(["classgenie", "-c", "p.json", "-v", "-q"]).is_err());
    }

    #[test]
    fn test_categorize_template_errors() {
        let malformed = anyhow::Error::new(TemplateError::MalformedBlock {
            class: "Widget".to_string(),
            template: "t".to_string(),
            tag: "<functions>".to_string(),
        })
        .context("Generation failed");
        assert_eq!(categorize_error(&malformed), ExitCodes::TEMPLATE_ERROR);

        let unresolved = anyhow::Error::new(TemplateError::UnresolvedTag {
            class: "Widget".to_string(),
            template: "t".to_string(),
            tag: "<x.y>".to_string(),
        });
        assert_eq!(categorize_error(&unresolved), ExitCodes::VALIDATION_FAILURE);

        let write = anyhow::Error::new(TemplateError::Write {
            path: PathBuf::from("out/Widget.h"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        });
        assert_eq!(categorize_error(&write), ExitCodes::WRITE_ERROR);

        let license = anyhow::Error::new(TemplateError::License {
            path: PathBuf::from("templates/LICENSE.txt"),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, "not UTF-8"),
        });
        assert_eq!(categorize_error(&license), ExitCodes::CONFIGURATION_ERROR);
    }

    #[test]
    fn test_categorize_model_errors() {
        let result: Result<(), ModelError> = Err(ModelError::Configuration {
            path: PathBuf::from("p.json"),
            message: "bad".to_string(),
        });
        let config = result.context("Failed to load project").unwrap_err();
        assert_eq!(categorize_error(&config), ExitCodes::CONFIGURATION_ERROR);

        let validation = anyhow::Error::new(ModelError::Validation("duplicate".to_string()));
        assert_eq!(categorize_error(&validation), ExitCodes::VALIDATION_FAILURE);

        assert_eq!(
            categorize_error(&anyhow::anyhow!("something else")),
            ExitCodes::GENERAL_ERROR
        );
    }
}
