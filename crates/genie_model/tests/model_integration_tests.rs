//! Integration tests for configuration decoding.

use std::fs;
use std::path::Path;

use genie_model::{
    DefaultsResolver, Language, ModelError, Project, ProjectReader, ProjectValidator, Scope,
    SpecialMemberKind,
};
use tempfile::tempdir;

const JSON_PROJECT: &str = r#"{
    "project-name": "Shapes",
    "default-license": "LICENSE.txt",
    "project-directory": "build",
    "template-location": "tpl",
    "default-definition-template": "cpp/header.template",
    "default-implementation-template": "cpp/source.template",
    "default-namespace": "geo",
    "language": "c++",
    "classes": {
        "Point": {
            "member-variables": {
                "x": {"type": "double", "scope": "private", "default-value": "0.0", "access-function": "true"},
                "y": {"type": "double", "default-value": 0}
            },
            "copy-constructor": {"generate": "true"},
            "equals-operator": {"generate": true, "custom-code": ["return x == other.x && y == other.y;"]}
        },
        "Circle": {
            "namespace": "geo::round",
            "definition-template": "cpp/circle.template",
            "base-classes": ["Shape", "Drawable"],
            "system-includes": ["cmath"],
            "functions": {
                "area": {
                    "return-type": "double",
                    "scope": "public",
                    "documentation": "true",
                    "parameters": {"scale": {"type": "double", "default-value": "1.0"}},
                    "custom-code": ["return 3.14159 * r * r * scale;"]
                }
            }
        }
    }
}"#;

fn write(dir: &Path, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

/// Test a complete JSON project end to end: defaults, order and nested data.
#[test]
fn test_read_json_project() {
    let temp = tempdir().unwrap();
    let path = write(temp.path(), "shapes.json", JSON_PROJECT);

    let project = ProjectReader::read(&path).unwrap();

    assert_eq!(project.name(), "Shapes");
    assert_eq!(project.language, Language::Cpp);
    assert_eq!(project.output_directory, temp.path().join("build"));
    assert_eq!(project.template_directory, temp.path().join("tpl"));
    assert_eq!(project.output_root(), temp.path().join("build/Shapes"));

    let names: Vec<_> = project.classes().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Point", "Circle"]);

    let point = project.class("Point").unwrap();
    assert_eq!(point.definition_template, "cpp/header.template");
    assert_eq!(point.implementation_template, "cpp/source.template");
    assert_eq!(point.namespace, "geo");
    assert_eq!(point.license, "LICENSE.txt");
    let members: Vec<_> = point.member_variables().map(|m| m.name()).collect();
    assert_eq!(members, vec!["x", "y"]);
    assert!(point.member_variable("x").unwrap().access_function);
    assert_eq!(point.member_variable("y").unwrap().default_value, "0");
    assert_eq!(point.member_variable("y").unwrap().scope, Scope::Private);
    assert!(point
        .special_members
        .get(SpecialMemberKind::CopyConstructor)
        .generate);
    assert_eq!(
        point
            .special_members
            .get(SpecialMemberKind::EqualityOperator)
            .custom_code,
        vec!["return x == other.x && y == other.y;"]
    );
    assert!(!point
        .special_members
        .get(SpecialMemberKind::DefaultDestructor)
        .generate);

    let circle = project.class("Circle").unwrap();
    assert_eq!(circle.namespace, "geo::round");
    assert_eq!(circle.definition_template, "cpp/circle.template");
    assert_eq!(
        circle.base_classes().collect::<Vec<_>>(),
        vec!["Shape", "Drawable"]
    );
    let area = circle.function("area").unwrap();
    assert_eq!(area.scope, Scope::Public);
    assert!(area.documentation);
    assert_eq!(area.parameter("scale").unwrap().default_value, "1.0");
    assert_eq!(area.parameter_list(), "double scale");

    let result = ProjectValidator::validate_project(&project);
    assert!(result.is_valid(), "unexpected errors: {:?}", result.errors);
}

/// The XML encoding decodes to the same tree as the JSON one.
#[test]
fn test_read_xml_project() {
    let temp = tempdir().unwrap();
    let path = write(
        temp.path(),
        "shapes.xml",
        r#"<?xml version="1.0" encoding="UTF-8"?>
<project name="Shapes" parent_directory="build" template-location="tpl"
         default-definition-template="cpp/header.template" default_namespace="geo">
    <class name="Point">
        <member_variable name="x" type="double" default_value="0.0" access_function="true"/>
        <member_variable name="y" type="double" default_value="0.0"/>
        <operator kind="copy-constructor" generate="true"/>
    </class>
    <class name="Circle" namespace="geo::round">
        <base_class name="Shape"/>
        <function name="area" return_type="double" scope="public" documentation="true">
            <parameter name="scale" type="double" default_value="1.0"/>
            <custom_code>return 3.14159 * r * r * scale;</custom_code>
        </function>
    </class>
</project>"#,
    );

    let project = ProjectReader::read(&path).unwrap();

    assert_eq!(project.output_root(), temp.path().join("build/Shapes"));
    let names: Vec<_> = project.classes().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Point", "Circle"]);

    let point = project.class("Point").unwrap();
    assert_eq!(point.namespace, "geo");
    assert_eq!(point.definition_template, "cpp/header.template");
    assert!(point
        .special_members
        .get(SpecialMemberKind::CopyConstructor)
        .generate);

    let circle = project.class("Circle").unwrap();
    assert_eq!(circle.namespace, "geo::round");
    assert_eq!(
        circle.function("area").unwrap().custom_code,
        vec!["return 3.14159 * r * r * scale;"]
    );
}

#[test]
fn test_read_yaml_project() {
    let temp = tempdir().unwrap();
    let path = write(
        temp.path(),
        "shapes.yml",
        r#"
project-name: Shapes
language: python
default-definition-template: py/class.template
classes:
  Point:
    member-variables:
      x:
        type: float
        default-value: 0.0
"#,
    );

    let project = ProjectReader::read(&path).unwrap();
    assert_eq!(project.language, Language::Python);
    let point = project.class("Point").unwrap();
    assert_eq!(point.definition_file_name(project.language), "Point.py");
    assert_eq!(point.implementation_file_name(project.language), None);
}

#[test]
fn test_duplicate_classes_are_rejected() {
    let temp = tempdir().unwrap();
    let json = write(
        temp.path(),
        "dup.json",
        r#"{"project-name": "Demo", "classes": {"Widget": {}, "Widget": {"namespace": "x"}}}"#,
    );
    let xml = write(
        temp.path(),
        "dup.xml",
        r#"<project name="Demo"><class name="Widget"/><class name="Widget"/></project>"#,
    );

    for path in [json, xml] {
        let err = ProjectReader::read(&path).unwrap_err();
        assert!(err.is_validation(), "{:?} gave {}", path, err);
        assert!(err.to_string().contains("duplicate class 'Widget'"));
    }
}

#[test]
fn test_whitespace_names_are_rejected() {
    let err = ProjectReader::from_json_str(
        r#"{"project-name": "Demo", "classes": {"My Widget": {}}}"#,
        Path::new("."),
    )
    .unwrap_err();
    assert!(err.is_validation());

    let err = ProjectReader::from_json_str(
        r#"{"project-name": "Demo", "classes": {"Widget": {"member-variables": {"a b": {"type": "int"}}}}}"#,
        Path::new("."),
    )
    .unwrap_err();
    assert!(err.is_validation());
}

#[test]
fn test_malformed_and_unsupported_files() {
    let temp = tempdir().unwrap();

    let broken = write(temp.path(), "broken.json", "{ \"project-name\": ");
    match ProjectReader::read(&broken).unwrap_err() {
        ModelError::Configuration { path, .. } => assert_eq!(path, broken),
        other => panic!("unexpected error: {other}"),
    }

    let ini = write(temp.path(), "project.ini", "name=Demo");
    assert!(matches!(
        ProjectReader::read(&ini).unwrap_err(),
        ModelError::UnsupportedFormat(_)
    ));

    let missing = temp.path().join("missing.json");
    assert!(matches!(
        ProjectReader::read(&missing).unwrap_err(),
        ModelError::Configuration { .. }
    ));
}

#[test]
fn test_defaults_are_resolved_once() {
    let mut project = ProjectReader::from_json_str(
        r#"{
            "project-name": "Demo",
            "default-definition-template": "impl.template",
            "classes": {"Widget": {}, "Gadget": {"definition-template": "gadget.template"}}
        }"#,
        Path::new("."),
    )
    .unwrap();

    assert_eq!(
        project.class("Widget").unwrap().definition_template,
        "impl.template"
    );
    assert_eq!(
        project.class("Gadget").unwrap().definition_template,
        "gadget.template"
    );

    project.defaults.definition_template = "changed.template".to_string();
    assert_eq!(
        project.class("Widget").unwrap().definition_template,
        "impl.template"
    );

    let fresh = genie_model::ClassSpec::new("Late").unwrap();
    let resolved = DefaultsResolver::resolve(&project, &fresh);
    assert_eq!(resolved.definition_template, "changed.template");
    assert!(fresh.definition_template.is_empty());
}

#[test]
fn test_project_directory_defaults_to_config_dir() {
    let project: Project =
        ProjectReader::from_json_str(r#"{"project-name": "Demo"}"#, Path::new("/cfg")).unwrap();
    assert_eq!(project.output_root(), Path::new("/cfg/Demo"));
    assert_eq!(project.template_directory, Path::new("/cfg/templates"));
}
