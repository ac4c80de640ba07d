//! Generate command - expand and write every class of a project.

use anyhow::{Context, Result};
use tracing::info;

use genie_templates::{Generator, GeneratorOptions};

use super::{load_project, Cli};

pub fn execute(cli: &Cli) -> Result<()> {
    let project = load_project(&cli.config_file)?;
    info!(
        "Generating {} classes for project {}",
        project.classes().len(),
        project.name()
    );

    let options = GeneratorOptions::new()
        .with_strict(cli.strict)
        .with_output(cli.output.clone());
    let report = Generator::new(&project, options)
        .run()
        .with_context(|| format!("Generation failed for project {}", project.name()))?;

    if cli.quiet {
        return Ok(());
    }

    for class in &report.classes {
        for file in &class.files {
            println!("   📄 {}", file.display());
        }
        if !class.unresolved.is_empty() {
            println!(
                "   ⚠️  {}: unresolved tags {}",
                class.class,
                class.unresolved.join(", ")
            );
        }
    }
    println!(
        "✅ Generated {} files for {} classes into {}",
        report.file_count(),
        report.classes.len(),
        report.output_root.display()
    );

    Ok(())
}
