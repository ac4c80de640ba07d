//! Decoded configuration records and their conversion into the metadata tree.
//!
//! These mirror the on-disk shape (kebab-case keys, boolean flags that may be
//! strings, name-keyed maps) and are converted once into [`Project`].

use std::fmt;
use std::marker::PhantomData;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::error::ModelResult;
use crate::models::{
    ClassDefaults, ClassSpec, Function, Language, MemberVariable, Parameter, Project, Scope,
    SpecialMember, SpecialMemberKind,
};

/// Project section of a configuration file.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RawProject {
    #[serde(alias = "name", alias = "project_name")]
    pub project_name: String,
    #[serde(default, alias = "default_license")]
    pub default_license: String,
    #[serde(
        default,
        alias = "project_directory",
        alias = "parent-directory",
        alias = "parent_directory"
    )]
    pub project_directory: Option<String>,
    #[serde(default, alias = "template_location")]
    pub template_location: Option<String>,
    #[serde(default, alias = "default_definition_template")]
    pub default_definition_template: String,
    #[serde(default, alias = "default_implementation_template")]
    pub default_implementation_template: String,
    #[serde(default, alias = "default_namespace")]
    pub default_namespace: String,
    #[serde(default, alias = "default_grammar_file")]
    pub default_grammar_file: String,
    #[serde(default)]
    pub language: Option<String>,
    /// Classes in file order. Duplicate keys are kept so they can be rejected.
    #[serde(default, deserialize_with = "ordered_entries")]
    pub classes: Vec<(String, RawClass)>,
}

/// One class entry.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RawClass {
    pub name: Option<String>,
    #[serde(alias = "definition_template")]
    pub definition_template: String,
    #[serde(alias = "implementation_template")]
    pub implementation_template: String,
    #[serde(alias = "grammar_file")]
    pub grammar_file: String,
    #[serde(alias = "class_license", alias = "license")]
    pub class_license: String,
    pub namespace: String,
    pub subdirectory: String,
    #[serde(alias = "base_classes")]
    pub base_classes: Vec<String>,
    #[serde(alias = "system_includes")]
    pub system_includes: Vec<String>,
    pub dependencies: Vec<String>,
    #[serde(alias = "default_constructor")]
    pub default_constructor: Option<RawSpecialMember>,
    #[serde(alias = "default_destructor")]
    pub default_destructor: Option<RawSpecialMember>,
    #[serde(alias = "copy_constructor")]
    pub copy_constructor: Option<RawSpecialMember>,
    #[serde(alias = "assignment_operator")]
    pub assignment_operator: Option<RawSpecialMember>,
    #[serde(
        alias = "equals_operator",
        alias = "equality-operator",
        alias = "equality_operator"
    )]
    pub equals_operator: Option<RawSpecialMember>,
    #[serde(
        alias = "not_equals_operator",
        alias = "inequality-operator",
        alias = "inequality_operator"
    )]
    pub not_equals_operator: Option<RawSpecialMember>,
    #[serde(alias = "output_operator")]
    pub output_operator: Option<RawSpecialMember>,
    #[serde(alias = "input_operator")]
    pub input_operator: Option<RawSpecialMember>,
    #[serde(alias = "member_variables")]
    pub member_variables: IndexMap<String, RawMemberVariable>,
    pub functions: IndexMap<String, RawFunction>,
}

/// Generate flag and custom code for a special member.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RawSpecialMember {
    #[serde(deserialize_with = "flexible_bool")]
    pub generate: bool,
    #[serde(alias = "custom_code")]
    pub custom_code: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RawMemberVariable {
    pub name: Option<String>,
    pub scope: String,
    #[serde(rename = "type")]
    pub var_type: String,
    #[serde(alias = "default_value", deserialize_with = "scalar_string")]
    pub default_value: String,
    #[serde(alias = "access_function", deserialize_with = "flexible_bool")]
    pub access_function: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RawFunction {
    pub name: Option<String>,
    pub scope: String,
    #[serde(alias = "return_type")]
    pub return_type: String,
    #[serde(deserialize_with = "flexible_bool")]
    pub documentation: bool,
    pub parameters: IndexMap<String, RawParameter>,
    #[serde(alias = "custom_code")]
    pub custom_code: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct RawParameter {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(alias = "default_value", deserialize_with = "scalar_string")]
    pub default_value: String,
}

impl RawProject {
    /// Build the metadata tree. Relative directories resolve against `base_dir`.
    pub fn into_project(self, base_dir: &Path) -> ModelResult<Project> {
        let language = Language::from_tag(self.language.as_deref().unwrap_or("c++"))?;

        let output_directory = match self.project_directory.as_deref() {
            Some(dir) if !dir.is_empty() => base_dir.join(dir),
            _ => base_dir.to_path_buf(),
        };
        let template_directory = base_dir.join(
            self.template_location
                .as_deref()
                .filter(|dir| !dir.is_empty())
                .unwrap_or("templates"),
        );

        let mut project = Project::new(self.project_name)?
            .with_language(language)
            .with_output_directory(output_directory)
            .with_template_directory(template_directory)
            .with_defaults(ClassDefaults {
                license: self.default_license,
                definition_template: self.default_definition_template,
                implementation_template: self.default_implementation_template,
                namespace: self.default_namespace,
                grammar_file: self.default_grammar_file,
            });

        for (key, raw) in self.classes {
            project.add_class(raw.into_class(&key)?)?;
        }

        Ok(project)
    }
}

impl RawClass {
    pub fn into_class(self, key: &str) -> ModelResult<ClassSpec> {
        let mut class = ClassSpec::new(element_name(self.name, key))?
            .with_definition_template(self.definition_template)
            .with_implementation_template(self.implementation_template)
            .with_grammar_file(self.grammar_file)
            .with_license(self.class_license)
            .with_namespace(self.namespace);
        class.subdirectory = self.subdirectory;

        for base in self.base_classes {
            class.add_base_class(base);
        }
        for include in self.system_includes {
            class.add_system_include(include);
        }
        for dependency in self.dependencies {
            class.add_dependency(dependency);
        }

        let specials = [
            (SpecialMemberKind::DefaultConstructor, self.default_constructor),
            (SpecialMemberKind::DefaultDestructor, self.default_destructor),
            (SpecialMemberKind::CopyConstructor, self.copy_constructor),
            (SpecialMemberKind::AssignmentOperator, self.assignment_operator),
            (SpecialMemberKind::EqualityOperator, self.equals_operator),
            (SpecialMemberKind::InequalityOperator, self.not_equals_operator),
            (SpecialMemberKind::OutputOperator, self.output_operator),
            (SpecialMemberKind::InputOperator, self.input_operator),
        ];
        for (kind, raw) in specials {
            if let Some(raw) = raw {
                class.special_members.set(kind, raw.into_special_member());
            }
        }

        for (key, raw) in self.member_variables {
            class.add_member_variable(raw.into_member_variable(&key)?);
        }
        for (key, raw) in self.functions {
            class.add_function(raw.into_function(&key)?);
        }

        Ok(class)
    }
}

impl RawSpecialMember {
    pub fn into_special_member(self) -> SpecialMember {
        SpecialMember {
            generate: self.generate,
            custom_code: self.custom_code,
        }
    }
}

impl RawMemberVariable {
    pub fn into_member_variable(self, key: &str) -> ModelResult<MemberVariable> {
        Ok(MemberVariable::new(element_name(self.name, key), self.var_type)?
            .with_scope(Scope::parse(&self.scope)?)
            .with_default(self.default_value)
            .with_access_function(self.access_function))
    }
}

impl RawFunction {
    pub fn into_function(self, key: &str) -> ModelResult<Function> {
        let mut function = Function::new(element_name(self.name, key), self.return_type)?
            .with_scope(Scope::parse(&self.scope)?)
            .with_documentation(self.documentation)
            .with_code(self.custom_code);
        for (key, raw) in self.parameters {
            function.add_parameter(raw.into_parameter(&key)?);
        }
        Ok(function)
    }
}

impl RawParameter {
    pub fn into_parameter(self, key: &str) -> ModelResult<Parameter> {
        Ok(Parameter::new(element_name(self.name, key), self.param_type)?
            .with_default(self.default_value))
    }
}

/// An explicit `name` wins over the map key it is stored under.
fn element_name(name: Option<String>, key: &str) -> String {
    name.filter(|n| !n.is_empty())
        .unwrap_or_else(|| key.to_string())
}

/// Parse a boolean flag written as text.
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" | "" => Some(false),
        _ => None,
    }
}

fn flexible_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Flag::deserialize(deserializer)? {
        Flag::Bool(value) => Ok(value),
        Flag::Text(text) => parse_bool(&text)
            .ok_or_else(|| de::Error::custom(format!("expected a boolean, found '{}'", text))),
    }
}

/// Accept strings, numbers and booleans for literal-valued fields.
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Integer(i64),
        Float(f64),
        Bool(bool),
    }

    Ok(match Scalar::deserialize(deserializer)? {
        Scalar::Text(text) => text,
        Scalar::Integer(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Bool(b) => b.to_string(),
    })
}

fn ordered_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V> Visitor<'de> for EntriesVisitor<V>
    where
        V: Deserialize<'de>,
    {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map keyed by class name")
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some(entry) = map.next_entry::<String, V>()? {
                entries.push(entry);
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_map(EntriesVisitor(PhantomData))
}
