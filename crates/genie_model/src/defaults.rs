//! Propagation of project-level defaults into classes.

use crate::models::{ClassDefaults, ClassSpec, Project};

/// Fills unset class fields from project defaults.
///
/// Each field is all-or-nothing: an empty class value is replaced verbatim by
/// the project value, a non-empty class value is kept as is.
pub struct DefaultsResolver;

impl DefaultsResolver {
    /// Resolve a class against a project's defaults. The project is not modified.
    pub fn resolve(project: &Project, class: &ClassSpec) -> ClassSpec {
        Self::resolve_with(&project.defaults, class)
    }

    /// Resolve a class against an explicit set of defaults.
    pub fn resolve_with(defaults: &ClassDefaults, class: &ClassSpec) -> ClassSpec {
        let mut resolved = class.clone();
        inherit(&mut resolved.license, &defaults.license);
        inherit(&mut resolved.definition_template, &defaults.definition_template);
        inherit(
            &mut resolved.implementation_template,
            &defaults.implementation_template,
        );
        inherit(&mut resolved.namespace, &defaults.namespace);
        inherit(&mut resolved.grammar_file, &defaults.grammar_file);
        resolved
    }
}

fn inherit(field: &mut String, default: &str) {
    if field.is_empty() {
        *field = default.to_string();
    }
}
