//! Check command - validate a project and expand its templates without
//! writing anything.

use anyhow::{Context, Result};
use tracing::info;

use genie_templates::{Generator, GeneratorOptions};

use super::{load_project, Cli};

pub fn execute(cli: &Cli) -> Result<()> {
    let project = load_project(&cli.config_file)?;
    info!("Checking project {}", project.name());

    let options = GeneratorOptions::new()
        .with_strict(cli.strict)
        .with_dry_run(true)
        .with_output(cli.output.clone());
    let report = Generator::new(&project, options)
        .run()
        .with_context(|| format!("Check failed for project {}", project.name()))?;

    if cli.quiet {
        return Ok(());
    }

    println!("📋 Project {}", report.project);
    for warning in &report.warnings {
        println!("   ⚠️  {}", warning);
    }
    for class in &report.classes {
        if class.unresolved.is_empty() {
            println!("   ✅ {}", class.class);
        } else {
            println!(
                "   ⚠️  {}: unresolved tags {}",
                class.class,
                class.unresolved.join(", ")
            );
        }
        for file in &class.files {
            println!("      would write {}", file.display());
        }
    }
    println!(
        "✅ Check passed: {} classes, {} files, {} unresolved tags",
        report.classes.len(),
        report.file_count(),
        report.unresolved_count()
    );

    Ok(())
}
