//! Expansion context: the class being generated and the chain of collection
//! elements a block nests through.
//!
//! Scalars resolve against the innermost element that provides the field,
//! then against enclosing elements, then against the class itself.

use genie_model::{
    ClassSpec, Function, Language, MemberVariable, Parameter, Project, SpecialMember,
    SpecialMemberKind,
};

use crate::catalog::{Collection, Field};

/// One element of a block collection.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    MemberVariable(&'a MemberVariable),
    Function(&'a Function),
    Parameter { param: &'a Parameter, last: bool },
    BaseClass { name: &'a str, last: bool },
    Include(&'a str),
    Dependency(&'a str),
    SpecialMember {
        kind: SpecialMemberKind,
        member: &'a SpecialMember,
    },
}

const SEPARATOR: &str = ", ";

fn separator(last: bool) -> String {
    if last {
        String::new()
    } else {
        SEPARATOR.to_string()
    }
}

impl<'a> Node<'a> {
    /// The value of `field` on this element, if the element provides it.
    pub fn field(&self, field: Field, language: Language) -> Option<String> {
        match (self, field) {
            (Node::MemberVariable(m), Field::MemberName) => Some(m.name().to_string()),
            (Node::MemberVariable(m), Field::MemberNameUpper) => Some(m.name().to_uppercase()),
            (Node::MemberVariable(m), Field::MemberCapitalizedName) => Some(m.capitalized_name()),
            (Node::MemberVariable(m), Field::MemberType) => Some(m.var_type.clone()),
            (Node::MemberVariable(m), Field::MemberDefaultValue) => Some(m.default_value.clone()),
            (Node::MemberVariable(m), Field::MemberScope) => Some(m.scope.to_string()),

            (Node::Function(f), Field::FunctionName) => Some(f.name().to_string()),
            (Node::Function(f), Field::FunctionReturnType) => Some(f.return_type.clone()),
            (Node::Function(f), Field::FunctionScope) => Some(f.scope.to_string()),
            (Node::Function(f), Field::FunctionParameterList) => Some(f.parameter_list()),
            (Node::Function(f), Field::FunctionBody) => Some(f.body(language)),

            (Node::Parameter { param, .. }, Field::ParameterName) => Some(param.name().to_string()),
            (Node::Parameter { param, .. }, Field::ParameterType) => Some(param.param_type.clone()),
            (Node::Parameter { param, .. }, Field::ParameterDefaultValue) => {
                Some(param.default_value.clone())
            }
            (Node::Parameter { last, .. }, Field::ParameterSeparator) => Some(separator(*last)),

            (Node::BaseClass { name, .. }, Field::BaseClassName) => Some(name.to_string()),
            (Node::BaseClass { last, .. }, Field::BaseClassSeparator) => Some(separator(*last)),

            (Node::Include(name), Field::IncludeName) => Some(name.to_string()),
            (Node::Dependency(name), Field::DependencyName) => Some(name.to_string()),

            (Node::SpecialMember { kind, .. }, Field::SpecialMemberName) => {
                Some(kind.tag_name().to_string())
            }
            (Node::SpecialMember { member, .. }, Field::SpecialMemberBody) => {
                Some(member.body(language))
            }

            _ => None,
        }
    }
}

/// Read-only view of one class during expansion.
#[derive(Debug, Clone)]
pub struct ClassContext<'a> {
    pub class: &'a ClassSpec,
    pub project_name: &'a str,
    pub language: Language,
    /// License text after file lookup.
    pub license: String,
}

impl<'a> ClassContext<'a> {
    pub fn new(project: &'a Project, class: &'a ClassSpec) -> Self {
        Self {
            class,
            project_name: project.name(),
            language: project.language,
            license: class.license.clone(),
        }
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    /// Resolve a scalar against the element chain, innermost first, then the
    /// class.
    pub fn resolve(&self, field: Field, scope: &[Node<'a>]) -> Option<String> {
        scope
            .iter()
            .rev()
            .find_map(|node| node.field(field, self.language))
            .or_else(|| self.class_field(field))
    }

    fn class_field(&self, field: Field) -> Option<String> {
        let class = self.class;
        let value = match field {
            Field::ClassName => class.name().to_string(),
            Field::ClassNameUpper => class.name().to_uppercase(),
            Field::ClassNamespace => class.namespace.clone(),
            Field::ClassNamespaceUpper => class.namespace.to_uppercase(),
            Field::ClassLicense => self.license.clone(),
            Field::ClassSubdirectory => class.subdirectory.clone(),
            Field::DefinitionFile => class.definition_file_name(self.language),
            Field::ImplementationFile => class
                .implementation_file_name(self.language)
                .unwrap_or_default(),
            Field::BaseClassList => class.base_classes().collect::<Vec<_>>().join(SEPARATOR),
            Field::ProjectName => self.project_name.to_string(),
            Field::ProjectNameUpper => self.project_name.to_uppercase(),
            Field::ProjectLanguage => self.language.as_str().to_string(),
            _ => return None,
        };
        Some(value)
    }

    /// Elements a block over `collection` repeats for, in collection order.
    ///
    /// Collections that need an enclosing element (parameters, documentation)
    /// are empty when there is none.
    pub fn elements(&self, collection: Collection, scope: &[Node<'a>]) -> Vec<Node<'a>> {
        let class = self.class;
        match collection {
            Collection::MemberVariables(filter) => class
                .member_variables()
                .filter(|m| filter.map_or(true, |scope| m.scope == scope))
                .map(Node::MemberVariable)
                .collect(),
            Collection::Accessors => class
                .member_variables()
                .filter(|m| m.access_function)
                .map(Node::MemberVariable)
                .collect(),
            Collection::Functions(filter) => class
                .functions()
                .filter(|f| filter.map_or(true, |scope| f.scope == scope))
                .map(Node::Function)
                .collect(),
            Collection::Parameters => match enclosing_function(scope) {
                Some(function) => {
                    let count = function.parameters().len();
                    function
                        .parameters()
                        .enumerate()
                        .map(|(i, param)| Node::Parameter {
                            param,
                            last: i + 1 == count,
                        })
                        .collect()
                }
                None => Vec::new(),
            },
            Collection::Documentation => enclosing_function(scope)
                .filter(|f| f.documentation)
                .map(Node::Function)
                .into_iter()
                .collect(),
            Collection::BaseClasses => {
                let count = class.base_classes().len();
                class
                    .base_classes()
                    .enumerate()
                    .map(|(i, name)| Node::BaseClass {
                        name,
                        last: i + 1 == count,
                    })
                    .collect()
            }
            Collection::SystemIncludes => class.system_includes().map(Node::Include).collect(),
            Collection::Dependencies => class.dependencies().map(Node::Dependency).collect(),
            Collection::SpecialMember(kind) => {
                let member = class.special_members.get(kind);
                if member.generate {
                    vec![Node::SpecialMember { kind, member }]
                } else {
                    Vec::new()
                }
            }
        }
    }
}

fn enclosing_function<'a>(scope: &[Node<'a>]) -> Option<&'a Function> {
    scope.iter().rev().find_map(|node| match node {
        Node::Function(function) => Some(*function),
        _ => None,
    })
}
