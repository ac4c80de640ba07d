//! Integration tests for the generation pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use genie_model::ProjectReader;
use genie_templates::{ErrorKind, Generator, GeneratorOptions, TemplateError};
use tempfile::tempdir;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// A one-class project whose definition template is `template`.
fn widget_project(dir: &Path, template: &str, extra: &str) -> PathBuf {
    write(dir, "templates/widget.template", template);
    write(
        dir,
        "project.json",
        &format!(
            r#"{{
                "project-name": "Demo",
                "default-definition-template": "widget.template",
                {extra}
                "classes": {{
                    "Widget": {{
                        "member-variables": {{"count": {{"type": "int", "default-value": "0"}}}}
                    }}
                }}
            }}"#
        ),
    )
}

#[test]
fn test_member_variable_block_end_to_end() {
    let temp = tempdir().unwrap();
    let config = widget_project(
        temp.path(),
        "class <class.name> { <member_variables>int <member_variable.type> <member_variable.name>;</member_variables> };",
        "",
    );

    let project = ProjectReader::read(&config).unwrap();
    let report = Generator::new(&project, GeneratorOptions::new()).run().unwrap();

    let header = temp.path().join("Demo/Widget.h");
    assert_eq!(report.files().collect::<Vec<_>>(), vec![header.as_path()]);
    assert_eq!(
        fs::read_to_string(&header).unwrap(),
        "class Widget { int int count; };"
    );
}

#[test]
fn test_grammar_includes_end_to_end() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "templates/grammar/cpp.json",
        r##"{"<<system-includes>>": "#include <string>\n#include <vector>"}"##,
    );
    let config = widget_project(
        temp.path(),
        "<<system-includes>>\nclass <class.name>;\n",
        r#""default-grammar-file": "grammar/cpp.json","#,
    );

    let project = ProjectReader::read(&config).unwrap();
    let options = GeneratorOptions::new().with_strict(true);
    Generator::new(&project, options).run().unwrap();

    let header = fs::read_to_string(temp.path().join("Demo/Widget.h")).unwrap();
    assert_eq!(header, "#include <string>\n#include <vector>\nclass Widget;\n");
    assert!(!header.contains("<<"));
}

#[test]
fn test_unknown_tag_verbatim_then_strict_failure() {
    let temp = tempdir().unwrap();
    let config = widget_project(temp.path(), "int x = <unknown.field>;", "");
    let project = ProjectReader::read(&config).unwrap();

    let report = Generator::new(&project, GeneratorOptions::new()).run().unwrap();
    assert_eq!(report.unresolved_count(), 1);
    assert_eq!(report.classes[0].unresolved, vec!["<unknown.field>"]);
    assert_eq!(
        fs::read_to_string(temp.path().join("Demo/Widget.h")).unwrap(),
        "int x = <unknown.field>;"
    );

    let err = Generator::new(&project, GeneratorOptions::new().with_strict(true))
        .run()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().starts_with("Validation error"));
    assert!(err.to_string().contains("<unknown.field>"));
}

#[test]
fn test_full_cpp_class() {
    let temp = tempdir().unwrap();
    write(
        temp.path(),
        "templates/cpp/grammar.json",
        r##"{
            "shared": {"<<license>>": "/* <class.license> */"},
            "definition": {"<<guard-open>>": "#ifndef <CLASS.NAME>_H\n#define <CLASS.NAME>_H", "<<guard-close>>": "#endif"},
            "implementation": {"<<self-include>>": "#include \"<class.definition_file>\""}
        }"##,
    );
    write(temp.path(), "templates/LICENSE", "Copyright Demo");
    write(
        temp.path(),
        "templates/cpp/header.template",
        "<<license>>\n<<guard-open>>\n\
<system_includes>#include <<include.name>>\n</system_includes>\
namespace <class.namespace> {\n\
class <class.name> : <base_classes>public <base_class.name><base_class.separator></base_classes> {\n\
public:\n\
<default_constructor>    <class.name>();\n</default_constructor>\
<public_functions>    <function.return_type> <function.name>(<parameters><parameter.type> <parameter.name><parameter.separator></parameters>);\n</public_functions>\
<accessors>    <member_variable.type> get<member_variable.capitalized_name>() const;\n</accessors>\
private:\n\
<private_member_variables>    <member_variable.type> <member_variable.name>;\n</private_member_variables>\
};\n}\n<<guard-close>>\n",
    );
    write(
        temp.path(),
        "templates/cpp/source.template",
        "<<license>>\n<<self-include>>\n\
<default_constructor><class.name>::<class.name>() {\n    <special_member.body>\n}\n</default_constructor>\
<functions><function.return_type> <class.name>::<function.name>(<function.parameter_list>) {\n    <function.body>\n}\n</functions>",
    );
    let config = write(
        temp.path(),
        "config/shapes.json",
        r#"{
            "project-name": "Shapes",
            "project-directory": "../out",
            "template-location": "../templates",
            "default-license": "LICENSE",
            "default-definition-template": "cpp/header.template",
            "default-implementation-template": "cpp/source.template",
            "default-grammar-file": "cpp/grammar.json",
            "default-namespace": "geo",
            "classes": {
                "Circle": {
                    "subdirectory": "round",
                    "base-classes": ["Shape", "Drawable"],
                    "system-includes": ["cmath"],
                    "default-constructor": {"generate": "true"},
                    "member-variables": {
                        "radius": {"type": "double", "access-function": "true"}
                    },
                    "functions": {
                        "scale": {
                            "return-type": "void",
                            "scope": "public",
                            "parameters": {
                                "fx": {"type": "double"},
                                "fy": {"type": "double"}
                            },
                            "custom-code": ["radius *= fx;"]
                        }
                    }
                }
            }
        }"#,
    );

    let project = ProjectReader::read(&config).unwrap();
    let options = GeneratorOptions::new().with_strict(true);
    let report = Generator::new(&project, options).run().unwrap();
    assert_eq!(report.file_count(), 2);

    let dir = temp.path().join("config/../out/Shapes/round");
    let header = fs::read_to_string(dir.join("Circle.h")).unwrap();
    assert_eq!(
        header,
        concat!(
            "/* Copyright Demo */\n",
            "#ifndef CIRCLE_H\n",
            "#define CIRCLE_H\n",
            "#include <cmath>\n",
            "namespace geo {\n",
            "class Circle : public Shape, public Drawable {\n",
            "public:\n",
            "    Circle();\n",
            "    void scale(double fx, double fy);\n",
            "    double getRadius() const;\n",
            "private:\n",
            "    double radius;\n",
            "};\n",
            "}\n",
            "#endif\n",
        )
    );

    let source = fs::read_to_string(dir.join("Circle.cpp")).unwrap();
    assert_eq!(
        source,
        "/* Copyright Demo */\n#include \"Circle.h\"\n\
Circle::Circle() {\n    // generated by classgenie\n}\n\
void Circle::scale(double fx, double fy) {\n    radius *= fx;\n}\n"
    );
}

#[test]
fn test_missing_template_reports_class_and_path() {
    let temp = tempdir().unwrap();
    write(temp.path(), "templates/other.template", "");
    let config = write(
        temp.path(),
        "project.json",
        r#"{"project-name": "Demo", "classes": {"Widget": {"definition-template": "nope.template"}}}"#,
    );

    let project = ProjectReader::read(&config).unwrap();
    let err = Generator::new(&project, GeneratorOptions::new())
        .run()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    let message = err.to_string();
    assert!(message.contains("Widget"));
    assert!(message.contains("nope.template"));
    assert!(message.contains("other.template"));
}

#[test]
fn test_missing_grammar_file() {
    let temp = tempdir().unwrap();
    let config = widget_project(
        temp.path(),
        "<class.name>",
        r#""default-grammar-file": "missing.json","#,
    );

    let project = ProjectReader::read(&config).unwrap();
    let err = Generator::new(&project, GeneratorOptions::new())
        .run()
        .unwrap_err();
    assert!(matches!(err, TemplateError::GrammarNotFound { ref class, .. } if class == "Widget"));
}

#[test]
fn test_malformed_block_aborts_run() {
    let temp = tempdir().unwrap();
    write(temp.path(), "templates/good.template", "<class.name>");
    write(temp.path(), "templates/bad.template", "<functions><function.name>");
    let config = write(
        temp.path(),
        "project.json",
        r#"{"project-name": "Demo", "classes": {
            "First": {"definition-template": "good.template"},
            "Second": {"definition-template": "bad.template"},
            "Third": {"definition-template": "good.template"}
        }}"#,
    );

    let project = ProjectReader::read(&config).unwrap();
    let err = Generator::new(&project, GeneratorOptions::new())
        .run()
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::MalformedBlock);
    assert!(err.to_string().contains("Second"));
    assert!(err.to_string().contains("<functions>"));
    // Files written before the failure stay on disk.
    assert!(temp.path().join("Demo/First.h").is_file());
    assert!(!temp.path().join("Demo/Third.h").exists());
}

#[test]
fn test_rerun_overwrites_output() {
    let temp = tempdir().unwrap();
    let config = widget_project(temp.path(), "v1 <class.name>", "");
    let project = ProjectReader::read(&config).unwrap();
    Generator::new(&project, GeneratorOptions::new()).run().unwrap();

    write(temp.path(), "templates/widget.template", "v2 <class.name>");
    let project = ProjectReader::read(&config).unwrap();
    Generator::new(&project, GeneratorOptions::new()).run().unwrap();

    assert_eq!(
        fs::read_to_string(temp.path().join("Demo/Widget.h")).unwrap(),
        "v2 Widget"
    );
}

#[test]
fn test_java_ignores_implementation_template() {
    let temp = tempdir().unwrap();
    let config = widget_project(
        temp.path(),
        "public class <class.name> {}",
        r#""language": "java", "default-implementation-template": "never-read.template","#,
    );

    let project = ProjectReader::read(&config).unwrap();
    let report = Generator::new(&project, GeneratorOptions::new()).run().unwrap();

    assert_eq!(report.file_count(), 1);
    assert_eq!(
        fs::read_to_string(temp.path().join("Demo/Widget.java")).unwrap(),
        "public class Widget {}"
    );
}
