//! The generation pipeline: validate, then expand and emit each class in
//! project order.

use std::fs;
use std::path::{Path, PathBuf};

use genie_model::{ClassSpec, Project, ProjectValidator};
use tracing::{debug, info, warn};

use crate::catalog::TagCatalog;
use crate::context::ClassContext;
use crate::emitter::Emitter;
use crate::engine::TemplateEngine;
use crate::error::{TemplateError, TemplateResult};
use crate::grammar::{GrammarCache, TemplatePart};
use crate::loader::TemplateLoader;

/// Options for a generation run.
#[derive(Debug, Clone, Default)]
pub struct GeneratorOptions {
    /// Fail on the first unresolved tag.
    pub strict: bool,
    /// Expand everything but write nothing.
    pub dry_run: bool,
    /// Output root replacing `<project-directory>/<project-name>`.
    pub output: Option<PathBuf>,
}

impl GeneratorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_output(mut self, output: Option<PathBuf>) -> Self {
        self.output = output;
        self
    }
}

/// Outcome for one class.
#[derive(Debug, Clone, Default)]
pub struct ClassReport {
    pub class: String,
    /// Files written, or that would be written in a dry run.
    pub files: Vec<PathBuf>,
    pub unresolved: Vec<String>,
}

/// Outcome of a generation run.
#[derive(Debug, Clone, Default)]
pub struct GenerationReport {
    pub project: String,
    pub output_root: PathBuf,
    pub dry_run: bool,
    pub classes: Vec<ClassReport>,
    pub warnings: Vec<String>,
}

impl GenerationReport {
    pub fn files(&self) -> impl Iterator<Item = &Path> {
        self.classes
            .iter()
            .flat_map(|c| c.files.iter().map(PathBuf::as_path))
    }

    pub fn file_count(&self) -> usize {
        self.classes.iter().map(|c| c.files.len()).sum()
    }

    pub fn unresolved_count(&self) -> usize {
        self.classes.iter().map(|c| c.unresolved.len()).sum()
    }
}

/// Runs the whole pipeline for one project.
pub struct Generator<'p> {
    project: &'p Project,
    options: GeneratorOptions,
    loader: TemplateLoader,
    grammars: GrammarCache,
    emitter: Emitter,
}

impl<'p> Generator<'p> {
    pub fn new(project: &'p Project, options: GeneratorOptions) -> Self {
        Self {
            project,
            loader: TemplateLoader::new(project.template_directory.clone()),
            grammars: GrammarCache::new(),
            emitter: Emitter::new(),
            options,
        }
    }

    /// Root directory generated files go under.
    pub fn output_root(&self) -> PathBuf {
        self.options
            .output
            .clone()
            .unwrap_or_else(|| self.project.output_root())
    }

    /// Generate every class. Stops at the first error; files already
    /// written stay on disk.
    pub fn run(&self) -> TemplateResult<GenerationReport> {
        let warnings = ProjectValidator::validate_project(self.project).into_result()?;
        for warning in &warnings {
            warn!("{}", warning);
        }

        let mut report = GenerationReport {
            project: self.project.name().to_string(),
            output_root: self.output_root(),
            dry_run: self.options.dry_run,
            classes: Vec::new(),
            warnings,
        };

        for class in self.project.classes() {
            let class_report = self.generate_class(class, &report.output_root)?;
            report.classes.push(class_report);
        }

        info!(
            "Project {}: {} classes, {} files{}",
            report.project,
            report.classes.len(),
            report.file_count(),
            if report.dry_run { " (dry run)" } else { "" }
        );
        Ok(report)
    }

    /// Expand and emit one class.
    pub fn generate_class(
        &self,
        class: &ClassSpec,
        output_root: &Path,
    ) -> TemplateResult<ClassReport> {
        let name = class.name();
        let language = self.project.language;
        info!("Generating class {}", name);

        let ctx = ClassContext::new(self.project, class).with_license(self.license_text(class)?);
        let catalog = self.catalog_for(class)?;
        let engine = TemplateEngine::new(&self.grammars).with_strict(self.options.strict);

        let template = self.loader.load(&class.definition_template, name)?;
        let definition = engine.expand(&template, &ctx, &catalog, TemplatePart::Definition)?;
        let mut unresolved = definition.unresolved;

        let implementation = if class.implementation_template.is_empty() {
            None
        } else if language.implementation_extension().is_none() {
            warn!(
                "Class {}: implementation template {} ignored for {}",
                name, class.implementation_template, language
            );
            None
        } else {
            let template = self.loader.load(&class.implementation_template, name)?;
            let expansion =
                engine.expand(&template, &ctx, &catalog, TemplatePart::Implementation)?;
            for tag in expansion.unresolved {
                if !unresolved.contains(&tag) {
                    unresolved.push(tag);
                }
            }
            Some(expansion.text)
        };

        let files = if self.options.dry_run {
            let dir = Emitter::class_directory(output_root, class);
            let mut files = vec![dir.join(class.definition_file_name(language))];
            if implementation.is_some() {
                files.extend(class.implementation_file_name(language).map(|f| dir.join(f)));
            }
            files
        } else {
            self.emitter.emit(
                output_root,
                class,
                language,
                &definition.text,
                implementation.as_deref(),
            )?
        };

        Ok(ClassReport {
            class: name.to_string(),
            files,
            unresolved,
        })
    }

    /// The standard catalog plus the class's grammar tags, if it names a
    /// grammar file.
    fn catalog_for(&self, class: &ClassSpec) -> TemplateResult<TagCatalog> {
        let catalog = TagCatalog::standard();
        if class.grammar_file.is_empty() {
            return Ok(catalog);
        }
        let path = self.loader.resolve(&class.grammar_file);
        let grammar = self.grammars.load(&path, class.name())?;
        Ok(catalog.with_grammar(&path, &grammar))
    }

    /// License text: the content of the named file in the template
    /// directory, or the value itself.
    fn license_text(&self, class: &ClassSpec) -> TemplateResult<String> {
        if class.license.is_empty() {
            return Ok(String::new());
        }
        let path = self.loader.resolve(&class.license);
        if path.is_file() {
            debug!("Reading license for {} from {:?}", class.name(), path);
            fs::read_to_string(&path).map_err(|source| TemplateError::License { path, source })
        } else {
            Ok(class.license.clone())
        }
    }
}
