//! XML configuration decoding.
//!
//! The document is read into a small element tree with quick-xml and then
//! mapped onto the same records the JSON and YAML readers produce. Attribute
//! and element names may use `-` or `_` as separator.

use indexmap::IndexMap;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::config::{
    parse_bool, RawClass, RawFunction, RawMemberVariable, RawParameter, RawProject,
    RawSpecialMember,
};
use crate::error::{ModelError, ModelResult};
use crate::models::SpecialMemberKind;

/// A parsed XML element.
#[derive(Debug, Default)]
struct Element {
    name: String,
    attributes: IndexMap<String, String>,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    fn attr_or_default(&self, key: &str) -> String {
        self.attr(key).unwrap_or_default().to_string()
    }

    fn flag(&self, key: &str) -> ModelResult<bool> {
        let value = self.attr(key).unwrap_or_default();
        parse_bool(value).ok_or_else(|| {
            ModelError::Xml(format!(
                "attribute '{}' of <{}> must be a boolean, found '{}'",
                key, self.name, value
            ))
        })
    }

    fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |child| child.name == name)
    }

    /// Text of every `<custom_code>` child, one line each.
    fn code_lines(&self) -> Vec<String> {
        self.children_named("custom_code")
            .map(|child| child.text.trim().to_string())
            .collect()
    }
}

/// Decode an XML project document.
pub fn parse_project(text: &str) -> ModelResult<RawProject> {
    let root = parse_document(text)?;
    debug!("Decoding XML project root <{}>", root.name);

    let mut project = RawProject {
        project_name: root
            .attr("name")
            .or_else(|| root.attr("project_name"))
            .ok_or_else(|| ModelError::Xml("root element has no 'name' attribute".to_string()))?
            .to_string(),
        default_license: root.attr_or_default("default_license"),
        project_directory: root
            .attr("parent_directory")
            .or_else(|| root.attr("project_directory"))
            .map(String::from),
        template_location: root.attr("template_location").map(String::from),
        default_definition_template: root.attr_or_default("default_definition_template"),
        default_implementation_template: root.attr_or_default("default_implementation_template"),
        default_namespace: root.attr_or_default("default_namespace"),
        default_grammar_file: root.attr_or_default("default_grammar_file"),
        language: root.attr("language").map(String::from),
        classes: Vec::new(),
    };

    for element in root.children_named("class") {
        let key = element.attr_or_default("name");
        project.classes.push((key, class_from_element(element)?));
    }

    Ok(project)
}

fn class_from_element(element: &Element) -> ModelResult<RawClass> {
    let mut class = RawClass {
        name: element.attr("name").map(String::from),
        definition_template: element.attr_or_default("definition_template"),
        implementation_template: element.attr_or_default("implementation_template"),
        grammar_file: element.attr_or_default("grammar_file"),
        class_license: element
            .attr("class_license")
            .or_else(|| element.attr("license"))
            .unwrap_or_default()
            .to_string(),
        namespace: element.attr_or_default("namespace"),
        subdirectory: element.attr_or_default("subdirectory"),
        ..RawClass::default()
    };

    for child in &element.children {
        match child.name.as_str() {
            "base_class" => class.base_classes.push(child.attr_or_default("name")),
            "system_include" => class.system_includes.push(child.attr_or_default("name")),
            "dependency" => class.dependencies.push(child.attr_or_default("name")),
            "member_variable" => {
                let member = RawMemberVariable {
                    name: child.attr("name").map(String::from),
                    scope: child.attr_or_default("scope"),
                    var_type: child.attr_or_default("type"),
                    default_value: child.attr_or_default("default_value"),
                    access_function: child.flag("access_function")?,
                };
                class
                    .member_variables
                    .insert(child.attr_or_default("name"), member);
            }
            "function" => {
                let function = function_from_element(child)?;
                class.functions.insert(child.attr_or_default("name"), function);
            }
            "operator" => {
                let key = child.attr_or_default("kind");
                let kind = SpecialMemberKind::from_key(&key).ok_or_else(|| {
                    ModelError::Xml(format!("unknown operator kind '{}'", key))
                })?;
                let member = Some(RawSpecialMember {
                    generate: child.flag("generate")?,
                    custom_code: child.code_lines(),
                });
                match kind {
                    SpecialMemberKind::DefaultConstructor => class.default_constructor = member,
                    SpecialMemberKind::DefaultDestructor => class.default_destructor = member,
                    SpecialMemberKind::CopyConstructor => class.copy_constructor = member,
                    SpecialMemberKind::AssignmentOperator => class.assignment_operator = member,
                    SpecialMemberKind::EqualityOperator => class.equals_operator = member,
                    SpecialMemberKind::InequalityOperator => class.not_equals_operator = member,
                    SpecialMemberKind::OutputOperator => class.output_operator = member,
                    SpecialMemberKind::InputOperator => class.input_operator = member,
                }
            }
            other => debug!("Ignoring <{}> in class {:?}", other, class.name),
        }
    }

    Ok(class)
}

fn function_from_element(element: &Element) -> ModelResult<RawFunction> {
    let mut function = RawFunction {
        name: element.attr("name").map(String::from),
        scope: element.attr_or_default("scope"),
        return_type: element.attr_or_default("return_type"),
        documentation: element.flag("documentation")?,
        custom_code: element.code_lines(),
        ..RawFunction::default()
    };

    for child in element.children_named("parameter") {
        let parameter = RawParameter {
            name: child.attr("name").map(String::from),
            param_type: child.attr_or_default("type"),
            default_value: child.attr_or_default("default_value"),
        };
        function
            .parameters
            .insert(child.attr_or_default("name"), parameter);
    }

    Ok(function)
}

/// Identifiers are compared with `_` as the only separator.
fn normalize(name: &[u8]) -> ModelResult<String> {
    let name = std::str::from_utf8(name).map_err(|e| ModelError::Xml(e.to_string()))?;
    Ok(name.replace('-', "_"))
}

fn start_element(start: &BytesStart<'_>) -> ModelResult<Element> {
    let mut element = Element {
        name: normalize(start.local_name().as_ref())?,
        ..Element::default()
    };

    for attr in start.attributes() {
        let attr = attr.map_err(|e| ModelError::Xml(e.to_string()))?;
        let key = normalize(attr.key.local_name().as_ref())?;
        let value = attr
            .unescape_value()
            .map_err(|e| ModelError::Xml(e.to_string()))?;
        element.attributes.insert(key, value.into_owned());
    }

    Ok(element)
}

fn parse_document(text: &str) -> ModelResult<Element> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(start_element(&start)?),
            Event::Empty(start) => {
                let element = start_element(&start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ModelError::Xml("unbalanced closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text.decode().map_err(|e| ModelError::Xml(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                let text = std::str::from_utf8(data.as_ref())
                    .map_err(|e| ModelError::Xml(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(text);
                }
            }
            Event::GeneralRef(reference) => {
                let raw = reference
                    .decode()
                    .map_err(|e| ModelError::Xml(e.to_string()))?;
                let resolved = resolve_entity(&raw)?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&resolved);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(ModelError::Xml("unexpected end of document".to_string()));
    }
    root.ok_or_else(|| ModelError::Xml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> ModelResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => return Err(ModelError::Xml("multiple root elements".to_string())),
    }
    Ok(())
}

fn resolve_entity(raw: &str) -> ModelResult<String> {
    if let Some(resolved) = resolve_xml_entity(raw) {
        return Ok(resolved.to_string());
    }

    if let Some(rest) = raw.strip_prefix('#') {
        let code = match rest.strip_prefix('x').or_else(|| rest.strip_prefix('X')) {
            Some(hex) => u32::from_str_radix(hex, 16).ok(),
            None => rest.parse::<u32>().ok(),
        };
        if let Some(ch) = code.and_then(char::from_u32) {
            return Ok(ch.to_string());
        }
        return Err(ModelError::Xml(format!("invalid character reference &{};", raw)));
    }

    Err(ModelError::Xml(format!("unknown entity &{};", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = r#"<?xml version="1.0"?>
<project name="Demo" parent_directory="out" language="c++" default-definition-template="def.template">
    <class name="Widget" namespace="ui">
        <base_class name="Base"/>
        <system_include name="string"/>
        <member_variable name="count" type="int" scope="private" default_value="0" access_function="true"/>
        <function name="reset" return_type="void" scope="public" documentation="false">
            <parameter name="value" type="int" default_value="0"/>
            <custom_code>count = value &amp;&amp; 1;</custom_code>
        </function>
        <operator kind="copy-constructor" generate="true">
            <custom_code>count = other.count;</custom_code>
        </operator>
    </class>
</project>"#;

    #[test]
    fn test_parse_project_attributes() {
        let raw = parse_project(PROJECT).unwrap();
        assert_eq!(raw.project_name, "Demo");
        assert_eq!(raw.project_directory.as_deref(), Some("out"));
        assert_eq!(raw.default_definition_template, "def.template");
        assert_eq!(raw.classes.len(), 1);
    }

    #[test]
    fn test_parse_class_children() {
        let raw = parse_project(PROJECT).unwrap();
        let (key, class) = &raw.classes[0];
        assert_eq!(key, "Widget");
        assert_eq!(class.base_classes, vec!["Base"]);
        assert_eq!(class.system_includes, vec!["string"]);

        let member = &class.member_variables["count"];
        assert!(member.access_function);
        assert_eq!(member.var_type, "int");

        let function = &class.functions["reset"];
        assert_eq!(function.custom_code, vec!["count = value && 1;"]);
        assert_eq!(function.parameters.len(), 1);

        let copy = class.copy_constructor.as_ref().unwrap();
        assert!(copy.generate);
        assert_eq!(copy.custom_code, vec!["count = other.count;"]);
    }

    #[test]
    fn test_unknown_operator_kind() {
        let text = r#"<project name="Demo"><class name="A"><operator kind="move" generate="true"/></class></project>"#;
        assert!(parse_project(text).is_err());
    }

    #[test]
    fn test_missing_project_name() {
        assert!(parse_project("<project/>").is_err());
    }

    #[test]
    fn test_unbalanced_document() {
        assert!(parse_project(r#"<project name="Demo"><class name="A">"#).is_err());
    }
}
