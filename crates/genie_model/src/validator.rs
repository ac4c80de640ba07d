//! Name validation and static project checks.

use crate::error::{ModelError, ModelResult};
use crate::models::{ClassSpec, Project};

/// Reject empty names and names containing whitespace.
pub fn validate_name(kind: &str, name: &str) -> ModelResult<()> {
    if name.is_empty() {
        return Err(ModelError::Validation(format!("{} name cannot be empty", kind)));
    }
    if name.chars().any(char::is_whitespace) {
        return Err(ModelError::Validation(format!(
            "{} name '{}' cannot contain whitespace",
            kind, name
        )));
    }
    Ok(())
}

/// Findings of a static check. Errors block generation, warnings do not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn merge(&mut self, other: ValidationResult) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Convert errors into a single validation error.
    pub fn into_result(self) -> ModelResult<Vec<String>> {
        if self.is_valid() {
            Ok(self.warnings)
        } else {
            Err(ModelError::Validation(self.errors.join("; ")))
        }
    }
}

/// Static checks over a resolved project, run before any expansion.
pub struct ProjectValidator;

impl ProjectValidator {
    /// Validate every class of a project.
    pub fn validate_project(project: &Project) -> ValidationResult {
        let mut result = ValidationResult::new();

        if project.classes().next().is_none() {
            result.add_warning(format!("Project '{}' declares no classes", project.name()));
        }

        for class in project.classes() {
            result.merge(Self::validate_class(class));
        }

        result
    }

    /// Validate a single class.
    pub fn validate_class(class: &ClassSpec) -> ValidationResult {
        let mut result = ValidationResult::new();
        let name = class.name();

        if class.definition_template.is_empty() {
            result.add_error(format!("Class '{}' has no definition template", name));
        }

        if class.base_classes().any(|base| base == name) {
            result.add_error(format!("Class '{}' cannot derive from itself", name));
        }

        for member in class.member_variables() {
            if member.var_type.trim().is_empty() {
                result.add_warning(format!(
                    "Member variable '{}::{}' has an empty type",
                    name,
                    member.name()
                ));
            }
        }

        for function in class.functions() {
            if function.return_type.trim().is_empty() {
                result.add_warning(format!(
                    "Function '{}::{}' has no return type",
                    name,
                    function.name()
                ));
            }
            for parameter in function.parameters() {
                if parameter.param_type.trim().is_empty() {
                    result.add_warning(format!(
                        "Parameter '{}' of '{}::{}' has an empty type",
                        parameter.name(),
                        name,
                        function.name()
                    ));
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Function, MemberVariable, Parameter};

    #[test]
    fn test_validate_name() {
        assert!(validate_name("class", "Widget").is_ok());
        assert!(validate_name("class", "").is_err());
        assert!(validate_name("class", "Wid get").is_err());
        assert!(validate_name("class", "Widget\n").is_err());
    }

    #[test]
    fn test_validate_class_without_template() {
        let class = ClassSpec::new("Widget").unwrap();
        let result = ProjectValidator::validate_class(&class);
        assert!(!result.is_valid());
        assert_eq!(result.errors.len(), 1);
    }

    #[test]
    fn test_validate_class_warnings() {
        let mut class = ClassSpec::new("Widget")
            .unwrap()
            .with_definition_template("def.template")
            .with_member_variable(MemberVariable::new("count", "").unwrap())
            .with_function(
                Function::new("reset", "void")
                    .unwrap()
                    .with_parameter(Parameter::new("value", " ").unwrap()),
            );
        class.add_base_class("Base");

        let result = ProjectValidator::validate_class(&class);
        assert!(result.is_valid());
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_self_derivation_is_an_error() {
        let mut class = ClassSpec::new("Widget")
            .unwrap()
            .with_definition_template("def.template");
        class.add_base_class("Widget");
        let result = ProjectValidator::validate_class(&class);
        assert!(!result.is_valid());
    }
}
