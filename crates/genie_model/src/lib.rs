//! # genie_model
//!
//! The metadata tree for ClassGenie: a project, the classes it generates and
//! their members, functions, parameters and special members.
//!
//! The tree is decoded once per generation run from a JSON, YAML or XML
//! configuration file. Class fields left unset inherit the project defaults
//! when the class is registered (see [`DefaultsResolver`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use genie_model::ProjectReader;
//!
//! let project = ProjectReader::read("project.json").unwrap();
//! for class in project.classes() {
//!     println!("{} -> {}", class.name(), class.definition_template);
//! }
//! ```

pub mod config;
pub mod defaults;
pub mod error;
pub mod models;
pub mod reader;
pub mod validator;
mod xml;

pub use defaults::DefaultsResolver;
pub use error::{ModelError, ModelResult};
pub use models::*;
pub use reader::{ConfigFormat, ProjectReader};
pub use validator::{validate_name, ProjectValidator, ValidationResult};
