//! # genie_templates
//!
//! Template expansion and source emission for ClassGenie.
//!
//! A template is plain text containing tags from a [`TagCatalog`]:
//!
//! - scalar tags such as `<class.name>` are replaced by one metadata value;
//! - block tags such as `<member_variables>` ... `</member_variables>` repeat
//!   their body once per element of a collection;
//! - external tags come from a grammar file and are replaced by literal
//!   target-language text before anything else.
//!
//! ## Example
//!
//! ```rust,no_run
//! use genie_model::ProjectReader;
//! use genie_templates::{Generator, GeneratorOptions};
//!
//! let project = ProjectReader::read("project.json").unwrap();
//! let report = Generator::new(&project, GeneratorOptions::new().with_strict(true))
//!     .run()
//!     .unwrap();
//! for file in report.files() {
//!     println!("{}", file.display());
//! }
//! ```

pub mod catalog;
pub mod context;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod generator;
pub mod grammar;
pub mod loader;

pub use catalog::{Collection, Field, TagCatalog, TagKind};
pub use context::{ClassContext, Node};
pub use emitter::Emitter;
pub use engine::{Expansion, TemplateEngine};
pub use error::{ErrorKind, TemplateError, TemplateResult};
pub use generator::{ClassReport, GenerationReport, Generator, GeneratorOptions};
pub use grammar::{Grammar, GrammarCache, TemplatePart};
pub use loader::{Template, TemplateLoader};
