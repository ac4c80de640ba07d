//! The tag catalog: which placeholder strings a template may contain and how
//! each one is resolved.
//!
//! Tags are matched literally and case-sensitively. An upper-case rendering of
//! a value is its own entry (`<CLASS.NAME>`), not a transform of `<class.name>`.

use std::path::{Path, PathBuf};

use genie_model::{Scope, SpecialMemberKind};
use indexmap::IndexMap;

use crate::grammar::Grammar;

/// A single value read from the metadata tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    ClassName,
    ClassNameUpper,
    ClassNamespace,
    ClassNamespaceUpper,
    ClassLicense,
    ClassSubdirectory,
    DefinitionFile,
    ImplementationFile,
    BaseClassList,
    ProjectName,
    ProjectNameUpper,
    ProjectLanguage,
    MemberName,
    MemberNameUpper,
    MemberCapitalizedName,
    MemberType,
    MemberDefaultValue,
    MemberScope,
    FunctionName,
    FunctionReturnType,
    FunctionScope,
    FunctionParameterList,
    FunctionBody,
    ParameterName,
    ParameterType,
    ParameterDefaultValue,
    ParameterSeparator,
    BaseClassName,
    BaseClassSeparator,
    IncludeName,
    DependencyName,
    SpecialMemberName,
    SpecialMemberBody,
}

/// An ordered collection a block tag repeats over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Member variables, optionally restricted to one scope.
    MemberVariables(Option<Scope>),
    /// Member variables with the access-function flag set.
    Accessors,
    /// Functions, optionally restricted to one scope.
    Functions(Option<Scope>),
    /// Parameters of the enclosing function.
    Parameters,
    /// The enclosing function, when its documentation flag is set.
    Documentation,
    BaseClasses,
    SystemIncludes,
    Dependencies,
    /// The special member, when its generate flag is set.
    SpecialMember(SpecialMemberKind),
}

/// How a tag is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagKind {
    /// Replaced by one value of the current node.
    Scalar(Field),
    /// Opens a region, ended by `close`, repeated once per collection element.
    Block { close: String, collection: Collection },
    /// Replaced by text from a grammar file before any other expansion.
    External { grammar: PathBuf },
}

/// Mapping from tag string to [`TagKind`], in registration order.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    entries: IndexMap<String, TagKind>,
}

impl TagCatalog {
    /// An empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in scalar and block tags.
    pub fn standard() -> Self {
        use Field::*;

        let mut catalog = Self::new()
            .with_scalar("<class.name>", ClassName)
            .with_scalar("<CLASS.NAME>", ClassNameUpper)
            .with_scalar("<class.namespace>", ClassNamespace)
            .with_scalar("<CLASS.NAMESPACE>", ClassNamespaceUpper)
            .with_scalar("<class.license>", ClassLicense)
            .with_scalar("<class.subdirectory>", ClassSubdirectory)
            .with_scalar("<class.definition_file>", DefinitionFile)
            .with_scalar("<class.implementation_file>", ImplementationFile)
            .with_scalar("<class.base_class_list>", BaseClassList)
            .with_scalar("<project.name>", ProjectName)
            .with_scalar("<PROJECT.NAME>", ProjectNameUpper)
            .with_scalar("<project.language>", ProjectLanguage)
            .with_scalar("<member_variable.name>", MemberName)
            .with_scalar("<MEMBER_VARIABLE.NAME>", MemberNameUpper)
            .with_scalar("<member_variable.capitalized_name>", MemberCapitalizedName)
            .with_scalar("<member_variable.type>", MemberType)
            .with_scalar("<member_variable.default_value>", MemberDefaultValue)
            .with_scalar("<member_variable.scope>", MemberScope)
            .with_scalar("<function.name>", FunctionName)
            .with_scalar("<function.return_type>", FunctionReturnType)
            .with_scalar("<function.scope>", FunctionScope)
            .with_scalar("<function.parameter_list>", FunctionParameterList)
            .with_scalar("<function.body>", FunctionBody)
            .with_scalar("<parameter.name>", ParameterName)
            .with_scalar("<parameter.type>", ParameterType)
            .with_scalar("<parameter.default_value>", ParameterDefaultValue)
            .with_scalar("<parameter.separator>", ParameterSeparator)
            .with_scalar("<base_class.name>", BaseClassName)
            .with_scalar("<base_class.separator>", BaseClassSeparator)
            .with_scalar("<include.name>", IncludeName)
            .with_scalar("<dependency.name>", DependencyName)
            .with_scalar("<special_member.name>", SpecialMemberName)
            .with_scalar("<special_member.body>", SpecialMemberBody)
            .with_block("member_variables", Collection::MemberVariables(None))
            .with_block(
                "public_member_variables",
                Collection::MemberVariables(Some(Scope::Public)),
            )
            .with_block(
                "protected_member_variables",
                Collection::MemberVariables(Some(Scope::Protected)),
            )
            .with_block(
                "private_member_variables",
                Collection::MemberVariables(Some(Scope::Private)),
            )
            .with_block("accessors", Collection::Accessors)
            .with_block("functions", Collection::Functions(None))
            .with_block("public_functions", Collection::Functions(Some(Scope::Public)))
            .with_block(
                "protected_functions",
                Collection::Functions(Some(Scope::Protected)),
            )
            .with_block("private_functions", Collection::Functions(Some(Scope::Private)))
            .with_block("parameters", Collection::Parameters)
            .with_block("documentation", Collection::Documentation)
            .with_block("base_classes", Collection::BaseClasses)
            .with_block("system_includes", Collection::SystemIncludes)
            .with_block("dependencies", Collection::Dependencies);

        for kind in SpecialMemberKind::ALL {
            catalog = catalog.with_block(kind.tag_name(), Collection::SpecialMember(kind));
        }

        catalog
    }

    /// Register a tag. Re-registering keeps the original position.
    pub fn insert(&mut self, tag: impl Into<String>, kind: TagKind) -> Option<TagKind> {
        self.entries.insert(tag.into(), kind)
    }

    pub fn with_scalar(mut self, tag: impl Into<String>, field: Field) -> Self {
        self.insert(tag, TagKind::Scalar(field));
        self
    }

    /// Register `<name>` ... `</name>` as a block over `collection`.
    pub fn with_block(self, name: &str, collection: Collection) -> Self {
        self.with_block_markers(format!("<{}>", name), format!("</{}>", name), collection)
    }

    /// Register a block with explicit open and close markers.
    pub fn with_block_markers(
        mut self,
        open: impl Into<String>,
        close: impl Into<String>,
        collection: Collection,
    ) -> Self {
        self.insert(
            open,
            TagKind::Block {
                close: close.into(),
                collection,
            },
        );
        self
    }

    pub fn with_external(mut self, tag: impl Into<String>, grammar: impl Into<PathBuf>) -> Self {
        self.insert(
            tag,
            TagKind::External {
                grammar: grammar.into(),
            },
        );
        self
    }

    /// Register every tag of a grammar file as an external tag.
    pub fn with_grammar(mut self, path: &Path, grammar: &Grammar) -> Self {
        for tag in grammar.tags() {
            self = self.with_external(tag, path);
        }
        self
    }

    pub fn get(&self, tag: &str) -> Option<&TagKind> {
        self.entries.get(tag)
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.entries.contains_key(tag)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &TagKind)> {
        self.entries.iter().map(|(tag, kind)| (tag.as_str(), kind))
    }

    /// External entries in registration order.
    pub fn externals(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.iter().filter_map(|(tag, kind)| match kind {
            TagKind::External { grammar } => Some((tag, grammar.as_path())),
            _ => None,
        })
    }

    /// Whether some scalar tag has the form `<prefix.field>`.
    pub fn is_scalar_namespace(&self, prefix: &str) -> bool {
        self.entries.iter().any(|(tag, kind)| {
            matches!(kind, TagKind::Scalar(_))
                && tag
                    .strip_prefix('<')
                    .and_then(|rest| rest.strip_prefix(prefix))
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_entries() {
        let catalog = TagCatalog::standard();
        assert_eq!(
            catalog.get("<class.name>"),
            Some(&TagKind::Scalar(Field::ClassName))
        );
        assert_eq!(
            catalog.get("<member_variables>"),
            Some(&TagKind::Block {
                close: "</member_variables>".to_string(),
                collection: Collection::MemberVariables(None),
            })
        );
        assert!(catalog.contains("<copy_constructor>"));
        assert!(catalog.is_scalar_namespace("class"));
        assert!(catalog.is_scalar_namespace("CLASS"));
        assert!(catalog.is_scalar_namespace("member_variable"));
        assert!(!catalog.is_scalar_namespace("stdio"));
        assert!(!catalog.is_scalar_namespace("functions"));
        assert_eq!(catalog.externals().count(), 0);
    }

    #[test]
    fn test_tags_are_case_sensitive() {
        let catalog = TagCatalog::standard();
        assert_eq!(
            catalog.get("<CLASS.NAME>"),
            Some(&TagKind::Scalar(Field::ClassNameUpper))
        );
        assert!(catalog.get("<Class.Name>").is_none());
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut catalog = TagCatalog::new()
            .with_scalar("<a.x>", Field::ClassName)
            .with_scalar("<b.x>", Field::ProjectName);
        catalog.insert("<a.x>", TagKind::Scalar(Field::ClassNameUpper));

        let tags: Vec<_> = catalog.iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec!["<a.x>", "<b.x>"]);
        assert_eq!(
            catalog.get("<a.x>"),
            Some(&TagKind::Scalar(Field::ClassNameUpper))
        );
    }

    #[test]
    fn test_with_grammar_registers_externals() {
        let grammar = Grammar::from_json_str(r##"{"<<includes>>": "#include", "<<guard>>": "x"}"##)
            .unwrap();
        let catalog = TagCatalog::standard().with_grammar(Path::new("grammar.json"), &grammar);

        let externals: Vec<_> = catalog.externals().map(|(tag, _)| tag).collect();
        assert_eq!(externals, vec!["<<includes>>", "<<guard>>"]);
    }
}
