//! Configuration file reading.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::config::RawProject;
use crate::error::{ModelError, ModelResult};
use crate::models::Project;
use crate::xml;

/// Supported configuration encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Xml,
    Yaml,
}

impl ConfigFormat {
    /// Pick the format from a file extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_string_lossy().to_lowercase();
        match ext.as_str() {
            "json" => Some(ConfigFormat::Json),
            "xml" => Some(ConfigFormat::Xml),
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            _ => None,
        }
    }
}

/// Reader that decodes a configuration file into a [`Project`].
pub struct ProjectReader;

impl ProjectReader {
    /// Read a project from a configuration file.
    ///
    /// Relative directories in the file resolve against the file's directory.
    pub fn read(path: impl AsRef<Path>) -> ModelResult<Project> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ModelError::UnsupportedFormat(path.to_path_buf()))?;

        debug!("Reading {:?} configuration from {:?}", format, path);
        let content = fs::read_to_string(path).map_err(|e| ModelError::Configuration {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let project = Self::parse(&content, format, base_dir).map_err(|e| match e {
            ModelError::Validation(_) => e,
            other => ModelError::Configuration {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;

        info!(
            "Loaded project {} with {} classes",
            project.name(),
            project.classes().len()
        );
        Ok(project)
    }

    /// Decode configuration text in a known format.
    pub fn parse(content: &str, format: ConfigFormat, base_dir: &Path) -> ModelResult<Project> {
        let raw = match format {
            ConfigFormat::Json => serde_json::from_str::<RawProject>(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str::<RawProject>(content)?,
            ConfigFormat::Xml => xml::parse_project(content)?,
        };
        raw.into_project(base_dir)
    }

    pub fn from_json_str(content: &str, base_dir: &Path) -> ModelResult<Project> {
        Self::parse(content, ConfigFormat::Json, base_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a/project.JSON")),
            Some(ConfigFormat::Json)
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("project.yml")),
            Some(ConfigFormat::Yaml)
        );
        assert_eq!(ConfigFormat::from_path(Path::new("project.ini")), None);
        assert_eq!(ConfigFormat::from_path(Path::new("project")), None);
    }

    #[test]
    fn test_yaml_matches_json_shape() {
        let yaml = r#"
project-name: Demo
language: java
default-definition-template: class.template
classes:
  Widget:
    member-variables:
      count:
        type: int
        default-value: 0
"#;
        let project = ProjectReader::parse(yaml, ConfigFormat::Yaml, Path::new("/cfg")).unwrap();
        assert_eq!(project.language, Language::Java);
        let widget = project.class("Widget").unwrap();
        assert_eq!(widget.definition_template, "class.template");
        assert_eq!(widget.member_variable("count").unwrap().default_value, "0");
        assert_eq!(project.template_directory, Path::new("/cfg/templates"));
    }

    #[test]
    fn test_unknown_language_is_a_validation_error() {
        let json = r#"{"project-name": "Demo", "language": "cobol"}"#;
        let err = ProjectReader::from_json_str(json, Path::new(".")).unwrap_err();
        assert!(err.is_validation());
    }
}
