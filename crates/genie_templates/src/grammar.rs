//! Grammar files: coarse tag to literal-text mappings expanded before any
//! class-level tag.
//!
//! A grammar file is a JSON object. String values form the `shared` section;
//! object values are named sections (`shared`, `definition`,
//! `implementation`) of strings.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::error::{TemplateError, TemplateResult};

pub const SHARED_SECTION: &str = "shared";

/// Which of a class's two templates is being expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplatePart {
    Definition,
    Implementation,
}

impl TemplatePart {
    /// Grammar section consulted after `shared` for this part.
    pub fn section(&self) -> &'static str {
        match self {
            TemplatePart::Definition => "definition",
            TemplatePart::Implementation => "implementation",
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GrammarEntry {
    Text(String),
    Section(IndexMap<String, String>),
}

/// A parsed grammar file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Grammar {
    sections: IndexMap<String, IndexMap<String, String>>,
}

impl Grammar {
    /// Parse grammar JSON.
    pub fn from_json_str(text: &str) -> Result<Self, serde_json::Error> {
        let entries: IndexMap<String, GrammarEntry> = serde_json::from_str(text)?;

        let mut grammar = Grammar::default();
        for (key, entry) in entries {
            match entry {
                GrammarEntry::Text(value) => grammar.insert(SHARED_SECTION, key, value),
                GrammarEntry::Section(section) => {
                    for (tag, value) in section {
                        grammar.insert(&key, tag, value);
                    }
                }
            }
        }
        Ok(grammar)
    }

    pub fn insert(&mut self, section: &str, tag: impl Into<String>, text: impl Into<String>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(tag.into(), text.into());
    }

    /// Replacement text for a tag. `shared` is consulted first, then the
    /// part's own section; the first section defining the tag wins.
    pub fn lookup(&self, tag: &str, part: TemplatePart) -> Option<&str> {
        [SHARED_SECTION, part.section()]
            .into_iter()
            .filter_map(|section| self.sections.get(section))
            .find_map(|entries| entries.get(tag))
            .map(String::as_str)
    }

    /// Every tag defined for either template part, in section order.
    pub fn tags(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = Vec::new();
        for section in [
            SHARED_SECTION,
            TemplatePart::Definition.section(),
            TemplatePart::Implementation.section(),
        ] {
            if let Some(entries) = self.sections.get(section) {
                for tag in entries.keys() {
                    if !tags.contains(&tag.as_str()) {
                        tags.push(tag);
                    }
                }
            }
        }
        tags
    }

    pub fn is_empty(&self) -> bool {
        self.sections.values().all(IndexMap::is_empty)
    }
}

/// Per-run grammar cache. Each path is read at most once.
#[derive(Debug, Default)]
pub struct GrammarCache {
    grammars: RwLock<HashMap<PathBuf, Arc<Grammar>>>,
}

impl GrammarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a grammar, reading the file only on first use.
    ///
    /// `class` names the class being generated, for error context.
    pub fn load(&self, path: &Path, class: &str) -> TemplateResult<Arc<Grammar>> {
        if let Some(grammar) = self.grammars.read().get(path) {
            debug!("Grammar cache hit: {:?}", path);
            return Ok(Arc::clone(grammar));
        }

        let mut grammars = self.grammars.write();
        if let Some(grammar) = grammars.get(path) {
            return Ok(Arc::clone(grammar));
        }

        if !path.is_file() {
            return Err(TemplateError::GrammarNotFound {
                class: class.to_string(),
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path)?;
        let grammar =
            Grammar::from_json_str(&content).map_err(|source| TemplateError::InvalidGrammar {
                path: path.to_path_buf(),
                source,
            })?;

        if grammar.is_empty() {
            warn!("Grammar {:?} defines no tags", path);
        } else {
            info!("Loaded grammar {:?} ({} tags)", path, grammar.tags().len());
        }
        let grammar = Arc::new(grammar);
        grammars.insert(path.to_path_buf(), Arc::clone(&grammar));
        Ok(grammar)
    }

    /// Pre-warm the cache with an already parsed grammar.
    pub fn insert(&self, path: impl Into<PathBuf>, grammar: Grammar) {
        self.grammars.write().insert(path.into(), Arc::new(grammar));
    }

    pub fn len(&self) -> usize {
        self.grammars.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.grammars.read().is_empty()
    }
}
