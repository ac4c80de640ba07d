//! Writing expanded text to the output tree.

use std::fs;
use std::path::{Path, PathBuf};

use genie_model::{ClassSpec, Language};
use tracing::{info, warn};

use crate::error::{TemplateError, TemplateResult};

/// Writes a class's expanded definition and implementation files.
#[derive(Debug, Clone, Copy, Default)]
pub struct Emitter;

impl Emitter {
    pub fn new() -> Self {
        Self
    }

    /// Directory a class's files are written to.
    pub fn class_directory(output_dir: &Path, class: &ClassSpec) -> PathBuf {
        if class.subdirectory.is_empty() {
            output_dir.to_path_buf()
        } else {
            output_dir.join(&class.subdirectory)
        }
    }

    /// Write `<name><ext>` for the definition and, when an implementation was
    /// expanded and the language has a second file, the implementation.
    ///
    /// Existing files are overwritten. Returns the paths written.
    pub fn emit(
        &self,
        output_dir: &Path,
        class: &ClassSpec,
        language: Language,
        definition: &str,
        implementation: Option<&str>,
    ) -> TemplateResult<Vec<PathBuf>> {
        let dir = Self::class_directory(output_dir, class);
        fs::create_dir_all(&dir).map_err(|source| TemplateError::Write {
            path: dir.clone(),
            source,
        })?;

        let mut written = Vec::with_capacity(2);
        let definition_path = dir.join(class.definition_file_name(language));
        write_file(&definition_path, definition)?;
        written.push(definition_path);

        if let Some(text) = implementation {
            match class.implementation_file_name(language) {
                Some(file_name) => {
                    let path = dir.join(file_name);
                    write_file(&path, text)?;
                    written.push(path);
                }
                None => warn!(
                    "Class {}: {} sources are single-file, implementation output skipped",
                    class.name(),
                    language
                ),
            }
        }

        Ok(written)
    }
}

fn write_file(path: &Path, text: &str) -> TemplateResult<()> {
    fs::write(path, text).map_err(|source| TemplateError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Wrote {:?}", path);
    Ok(())
}
