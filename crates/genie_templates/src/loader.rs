//! Template loading.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{TemplateError, TemplateResult};

/// A template's text and the reference it was loaded by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pub name: String,
    pub text: String,
}

impl Template {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Loads templates relative to a search directory, reading each file once.
#[derive(Debug)]
pub struct TemplateLoader {
    templates_path: PathBuf,
    cache: RwLock<HashMap<PathBuf, Arc<Template>>>,
}

impl TemplateLoader {
    pub fn new(templates_path: impl Into<PathBuf>) -> Self {
        Self {
            templates_path: templates_path.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve a reference against the search directory.
    pub fn resolve(&self, reference: &str) -> PathBuf {
        self.templates_path.join(reference)
    }

    /// Load the template `reference` for `class`.
    pub fn load(&self, reference: &str, class: &str) -> TemplateResult<Arc<Template>> {
        let path = self.resolve(reference);
        if let Some(template) = self.cache.read().get(&path) {
            debug!("Template cache hit: {:?}", path);
            return Ok(Arc::clone(template));
        }

        let mut cache = self.cache.write();
        if let Some(template) = cache.get(&path) {
            return Ok(Arc::clone(template));
        }

        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(_) => {
                return Err(TemplateError::TemplateNotFound {
                    class: class.to_string(),
                    hint: self.available_hint(),
                    path,
                })
            }
        };

        debug!("Loaded template {:?} ({} bytes)", path, text.len());
        let template = Arc::new(Template::new(reference, text));
        cache.insert(path, Arc::clone(&template));
        Ok(template)
    }

    /// Template files under the search directory, relative to it and sorted.
    pub fn available(&self) -> Vec<String> {
        let mut names: Vec<String> = WalkDir::new(&self.templates_path)
            .min_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .filter_map(|e| {
                e.path()
                    .strip_prefix(&self.templates_path)
                    .ok()
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
            })
            .collect();
        names.sort();
        names
    }

    fn available_hint(&self) -> String {
        let names = self.available();
        if names.is_empty() {
            format!(" (no templates found in {:?})", self.templates_path)
        } else {
            format!(" (available: {})", names.join(", "))
        }
    }
}
