//! Data models for a generation project.
//!
//! A [`Project`] exclusively owns its [`ClassSpec`]s, and each class owns its
//! member variables, functions and special-member descriptors. Names are
//! validated on construction and are read-only afterwards; the remaining fields
//! are plain data.

use std::fmt;
use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::defaults::DefaultsResolver;
use crate::error::{ModelError, ModelResult};
use crate::validator::validate_name;

/// Visibility of a member variable or function.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Public,
    Protected,
    #[default]
    Private,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Public => "public",
            Scope::Protected => "protected",
            Scope::Private => "private",
        }
    }

    /// Parse a scope keyword. Blank input yields the default (private).
    pub fn parse(s: &str) -> ModelResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "public" => Ok(Scope::Public),
            "protected" => Ok(Scope::Protected),
            "private" | "" => Ok(Scope::Private),
            other => Err(ModelError::validation(format!("unknown scope '{}'", other))),
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Target language of the generated sources.
///
/// The generator never inspects target-language syntax; the language only
/// selects file extensions and the comment marker used for synthesized bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    Cpp,
    C,
    Java,
    Python,
}

impl Language {
    /// Parse a project language tag.
    pub fn from_tag(tag: &str) -> ModelResult<Self> {
        match tag.trim().to_lowercase().as_str() {
            "c++" | "cpp" | "cxx" => Ok(Language::Cpp),
            "c" => Ok(Language::C),
            "java" => Ok(Language::Java),
            "python" | "py" => Ok(Language::Python),
            other => Err(ModelError::validation(format!(
                "unsupported target language '{}'",
                other
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "c++",
            Language::C => "c",
            Language::Java => "java",
            Language::Python => "python",
        }
    }

    /// Extension of the definition file, including the leading dot.
    pub fn definition_extension(&self) -> &'static str {
        match self {
            Language::Cpp | Language::C => ".h",
            Language::Java => ".java",
            Language::Python => ".py",
        }
    }

    /// Extension of the implementation file, if the language splits sources.
    pub fn implementation_extension(&self) -> Option<&'static str> {
        match self {
            Language::Cpp => Some(".cpp"),
            Language::C => Some(".c"),
            Language::Java | Language::Python => None,
        }
    }

    /// Body emitted for a generated member that has no custom code.
    pub fn placeholder_body(&self) -> &'static str {
        match self {
            Language::Python => "pass  # generated by classgenie",
            _ => "// generated by classgenie",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed set of special members a class may opt to generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialMemberKind {
    DefaultConstructor,
    DefaultDestructor,
    CopyConstructor,
    AssignmentOperator,
    EqualityOperator,
    InequalityOperator,
    OutputOperator,
    InputOperator,
}

impl SpecialMemberKind {
    pub const ALL: [SpecialMemberKind; 8] = [
        SpecialMemberKind::DefaultConstructor,
        SpecialMemberKind::DefaultDestructor,
        SpecialMemberKind::CopyConstructor,
        SpecialMemberKind::AssignmentOperator,
        SpecialMemberKind::EqualityOperator,
        SpecialMemberKind::InequalityOperator,
        SpecialMemberKind::OutputOperator,
        SpecialMemberKind::InputOperator,
    ];

    /// Key used for this member in configuration files.
    pub fn config_key(&self) -> &'static str {
        match self {
            SpecialMemberKind::DefaultConstructor => "default-constructor",
            SpecialMemberKind::DefaultDestructor => "default-destructor",
            SpecialMemberKind::CopyConstructor => "copy-constructor",
            SpecialMemberKind::AssignmentOperator => "assignment-operator",
            SpecialMemberKind::EqualityOperator => "equals-operator",
            SpecialMemberKind::InequalityOperator => "not-equals-operator",
            SpecialMemberKind::OutputOperator => "output-operator",
            SpecialMemberKind::InputOperator => "input-operator",
        }
    }

    /// Identifier used for this member's block tag.
    pub fn tag_name(&self) -> &'static str {
        match self {
            SpecialMemberKind::DefaultConstructor => "default_constructor",
            SpecialMemberKind::DefaultDestructor => "default_destructor",
            SpecialMemberKind::CopyConstructor => "copy_constructor",
            SpecialMemberKind::AssignmentOperator => "assignment_operator",
            SpecialMemberKind::EqualityOperator => "equality_operator",
            SpecialMemberKind::InequalityOperator => "inequality_operator",
            SpecialMemberKind::OutputOperator => "output_operator",
            SpecialMemberKind::InputOperator => "input_operator",
        }
    }

    /// Look up a kind by configuration key. `-` and `_` are interchangeable.
    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().replace('_', "-");
        Self::ALL
            .into_iter()
            .find(|kind| kind.config_key() == key || kind.tag_name().replace('_', "-") == key)
    }

    fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SpecialMemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.config_key())
    }
}

/// Generation settings for one special member.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialMember {
    pub generate: bool,
    /// Source lines; empty means a synthesized body.
    pub custom_code: Vec<String>,
}

impl SpecialMember {
    pub fn generated() -> Self {
        Self {
            generate: true,
            custom_code: Vec::new(),
        }
    }

    pub fn with_code<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_code = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn body(&self, language: Language) -> String {
        body_text(&self.custom_code, language)
    }
}

/// The eight special members of a class, indexed by [`SpecialMemberKind`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialMembers {
    members: [SpecialMember; 8],
}

impl SpecialMembers {
    pub fn get(&self, kind: SpecialMemberKind) -> &SpecialMember {
        &self.members[kind.index()]
    }

    pub fn set(&mut self, kind: SpecialMemberKind, member: SpecialMember) {
        self.members[kind.index()] = member;
    }
}

/// A function parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parameter {
    name: String,
    pub param_type: String,
    pub default_value: String,
}

impl Parameter {
    pub fn new(name: impl Into<String>, param_type: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name("parameter", &name)?;
        Ok(Self {
            name,
            param_type: param_type.into(),
            default_value: String::new(),
        })
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A member variable of a generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberVariable {
    name: String,
    pub scope: Scope,
    pub var_type: String,
    pub default_value: String,
    /// Whether accessor/mutator functions should be synthesized.
    pub access_function: bool,
}

impl MemberVariable {
    pub fn new(name: impl Into<String>, var_type: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name("member variable", &name)?;
        Ok(Self {
            name,
            scope: Scope::default(),
            var_type: var_type.into(),
            default_value: String::new(),
            access_function: false,
        })
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn with_access_function(mut self, access: bool) -> Self {
        self.access_function = access;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name with its first character upper-cased (`count` -> `Count`).
    pub fn capitalized_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
            None => String::new(),
        }
    }
}

/// A member function of a generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Function {
    name: String,
    pub scope: Scope,
    pub return_type: String,
    pub documentation: bool,
    parameters: IndexMap<String, Parameter>,
    /// Source lines replacing any synthesized body when non-empty.
    pub custom_code: Vec<String>,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name("function", &name)?;
        Ok(Self {
            name,
            scope: Scope::default(),
            return_type: return_type.into(),
            documentation: false,
            parameters: IndexMap::new(),
            custom_code: Vec::new(),
        })
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_documentation(mut self, documentation: bool) -> Self {
        self.documentation = documentation;
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.add_parameter(parameter);
        self
    }

    pub fn with_code<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.custom_code = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a parameter, replacing any parameter with the same name.
    pub fn add_parameter(&mut self, parameter: Parameter) -> Option<Parameter> {
        self.parameters.insert(parameter.name.clone(), parameter)
    }

    pub fn parameters(&self) -> impl ExactSizeIterator<Item = &Parameter> {
        self.parameters.values()
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.get(name)
    }

    /// `type name` pairs joined by `, `.
    pub fn parameter_list(&self) -> String {
        self.parameters
            .values()
            .map(|p| format!("{} {}", p.param_type, p.name))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn body(&self, language: Language) -> String {
        body_text(&self.custom_code, language)
    }
}

fn body_text(lines: &[String], language: Language) -> String {
    if lines.is_empty() {
        language.placeholder_body().to_string()
    } else {
        lines.join("\n")
    }
}

/// A class to generate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSpec {
    name: String,
    pub definition_template: String,
    pub implementation_template: String,
    pub grammar_file: String,
    pub license: String,
    pub namespace: String,
    pub subdirectory: String,
    base_classes: IndexSet<String>,
    system_includes: IndexSet<String>,
    dependencies: IndexSet<String>,
    pub special_members: SpecialMembers,
    member_variables: IndexMap<String, MemberVariable>,
    functions: IndexMap<String, Function>,
}

impl ClassSpec {
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name("class", &name)?;
        Ok(Self {
            name,
            definition_template: String::new(),
            implementation_template: String::new(),
            grammar_file: String::new(),
            license: String::new(),
            namespace: String::new(),
            subdirectory: String::new(),
            base_classes: IndexSet::new(),
            system_includes: IndexSet::new(),
            dependencies: IndexSet::new(),
            special_members: SpecialMembers::default(),
            member_variables: IndexMap::new(),
            functions: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_definition_template(mut self, template: impl Into<String>) -> Self {
        self.definition_template = template.into();
        self
    }

    pub fn with_implementation_template(mut self, template: impl Into<String>) -> Self {
        self.implementation_template = template.into();
        self
    }

    pub fn with_grammar_file(mut self, grammar: impl Into<String>) -> Self {
        self.grammar_file = grammar.into();
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_license(mut self, license: impl Into<String>) -> Self {
        self.license = license.into();
        self
    }

    pub fn with_member_variable(mut self, member: MemberVariable) -> Self {
        self.add_member_variable(member);
        self
    }

    pub fn with_function(mut self, function: Function) -> Self {
        self.add_function(function);
        self
    }

    pub fn with_special_member(mut self, kind: SpecialMemberKind, member: SpecialMember) -> Self {
        self.special_members.set(kind, member);
        self
    }

    /// Add a base class. Returns false if it was already present.
    pub fn add_base_class(&mut self, name: impl Into<String>) -> bool {
        self.base_classes.insert(name.into())
    }

    /// Add a system include. Returns false if it was already present.
    pub fn add_system_include(&mut self, include: impl Into<String>) -> bool {
        self.system_includes.insert(include.into())
    }

    /// Add a dependency. Returns false if it was already present.
    pub fn add_dependency(&mut self, dependency: impl Into<String>) -> bool {
        self.dependencies.insert(dependency.into())
    }

    /// Add a member variable, replacing any member with the same name.
    ///
    /// A replaced member keeps its original position.
    pub fn add_member_variable(&mut self, member: MemberVariable) -> Option<MemberVariable> {
        self.member_variables.insert(member.name.clone(), member)
    }

    /// Add a function, replacing any function with the same name.
    pub fn add_function(&mut self, function: Function) -> Option<Function> {
        self.functions.insert(function.name.clone(), function)
    }

    pub fn base_classes(&self) -> impl ExactSizeIterator<Item = &str> {
        self.base_classes.iter().map(String::as_str)
    }

    pub fn system_includes(&self) -> impl ExactSizeIterator<Item = &str> {
        self.system_includes.iter().map(String::as_str)
    }

    pub fn dependencies(&self) -> impl ExactSizeIterator<Item = &str> {
        self.dependencies.iter().map(String::as_str)
    }

    pub fn member_variables(&self) -> impl ExactSizeIterator<Item = &MemberVariable> {
        self.member_variables.values()
    }

    pub fn member_variable(&self, name: &str) -> Option<&MemberVariable> {
        self.member_variables.get(name)
    }

    pub fn functions(&self) -> impl ExactSizeIterator<Item = &Function> {
        self.functions.values()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    /// File name of the definition output, e.g. `Widget.h`.
    pub fn definition_file_name(&self, language: Language) -> String {
        format!("{}{}", self.name, language.definition_extension())
    }

    /// File name of the implementation output, if one will be written.
    pub fn implementation_file_name(&self, language: Language) -> Option<String> {
        if self.implementation_template.is_empty() {
            return None;
        }
        language
            .implementation_extension()
            .map(|ext| format!("{}{}", self.name, ext))
    }
}

/// Project-level values inherited by classes that leave them unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassDefaults {
    pub license: String,
    pub definition_template: String,
    pub implementation_template: String,
    pub namespace: String,
    pub grammar_file: String,
}

/// A generation project: settings plus the classes it owns.
#[derive(Debug, Clone)]
pub struct Project {
    name: String,
    /// Directory the project's output folder is created in.
    pub output_directory: PathBuf,
    /// Directory template, grammar and license references resolve against.
    pub template_directory: PathBuf,
    pub language: Language,
    pub defaults: ClassDefaults,
    classes: IndexMap<String, ClassSpec>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> ModelResult<Self> {
        let name = name.into();
        validate_name("project", &name)?;
        Ok(Self {
            name,
            output_directory: PathBuf::from("."),
            template_directory: PathBuf::from("templates"),
            language: Language::default(),
            defaults: ClassDefaults::default(),
            classes: IndexMap::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_defaults(mut self, defaults: ClassDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_output_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_directory = dir.into();
        self
    }

    pub fn with_template_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_directory = dir.into();
        self
    }

    /// Register a class, filling its unset fields from the project defaults.
    ///
    /// Defaults are applied once, here; later changes to `defaults` do not
    /// affect classes already registered. Duplicate names are rejected.
    pub fn add_class(&mut self, class: ClassSpec) -> ModelResult<()> {
        if self.classes.contains_key(class.name()) {
            return Err(ModelError::validation(format!(
                "duplicate class '{}' in project '{}'",
                class.name(),
                self.name
            )));
        }

        let resolved = DefaultsResolver::resolve(self, &class);
        debug!("Registered class {} in project {}", resolved.name(), self.name);
        self.classes.insert(resolved.name.clone(), resolved);
        Ok(())
    }

    pub fn class(&self, name: &str) -> Option<&ClassSpec> {
        self.classes.get(name)
    }

    /// Classes in registration order.
    pub fn classes(&self) -> impl ExactSizeIterator<Item = &ClassSpec> {
        self.classes.values()
    }

    /// Directory generated files are written under: `<output_directory>/<name>`.
    pub fn output_root(&self) -> PathBuf {
        self.output_directory.join(&self.name)
    }
}
