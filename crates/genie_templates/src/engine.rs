//! Template expansion.
//!
//! Expansion runs in two passes over a template:
//!
//! 1. External (grammar) tags are replaced in a single left-to-right scan.
//!    At each position the first catalog entry that matches wins, and the
//!    inserted grammar text is not scanned again in this pass.
//! 2. The result is parsed into text, scalar tags and block regions. Blocks
//!    are rendered once per element of their collection, scalars are replaced
//!    by the value of the innermost element providing them. Inserted values
//!    are never scanned again.
//!
//! Tags that cannot be resolved stay in the output verbatim and are reported
//! in [`Expansion::unresolved`]; in strict mode the first one is an error.
//! Inside grammar text only tags of a catalog namespace (`<class.x>`,
//! `<CLASS.X>`, ...) are reported. The target of an `#include` or `#import`
//! directive is never a tag.

use std::ops::Range;
use std::sync::OnceLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::catalog::{Collection, Field, TagCatalog, TagKind};
use crate::context::{ClassContext, Node};
use crate::error::{TemplateError, TemplateResult};
use crate::grammar::{GrammarCache, TemplatePart};
use crate::loader::Template;

/// Literal text that looks like a tag but matched no catalog entry.
fn tag_shape() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"<<[^<>\s]+>>|<[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)+>")
            .expect("tag pattern is a valid regex")
    })
}

/// Result of expanding one template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    pub text: String,
    /// Tags left verbatim in `text`, in order of first appearance.
    pub unresolved: Vec<String>,
}

impl Expansion {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

#[derive(Debug)]
enum Segment<'t> {
    Text(Range<usize>),
    Scalar {
        tag: &'t str,
        field: Field,
    },
    Block {
        collection: Collection,
        body: Vec<Segment<'t>>,
    },
}

/// Grammar text after the external pass, with the byte ranges grammar
/// replacements occupy.
struct Substituted {
    text: String,
    inserted: Vec<Range<usize>>,
}

/// Expands templates against a class context.
pub struct TemplateEngine<'g> {
    grammars: &'g GrammarCache,
    strict: bool,
}

impl<'g> TemplateEngine<'g> {
    pub fn new(grammars: &'g GrammarCache) -> Self {
        Self {
            grammars,
            strict: false,
        }
    }

    /// Treat unresolved tags as validation errors.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Expand `template` for the class in `ctx`.
    pub fn expand(
        &self,
        template: &Template,
        ctx: &ClassContext<'_>,
        catalog: &TagCatalog,
        part: TemplatePart,
    ) -> TemplateResult<Expansion> {
        let class = ctx.class.name();
        debug!("Expanding {} for class {} ({:?})", template.name, class, part);

        let substituted = self.substitute_externals(&template.text, catalog, part, class)?;
        let text = substituted.text.as_str();

        let mut parser = Parser {
            text,
            catalog,
            pos: 0,
        };
        let segments = parser.parse(None).map_err(|tag| TemplateError::MalformedBlock {
            class: class.to_string(),
            template: template.name.clone(),
            tag: tag.to_string(),
        })?;

        let mut renderer = Renderer {
            text,
            catalog,
            inserted: &substituted.inserted,
            ctx,
            out: String::with_capacity(text.len()),
            unresolved: Vec::new(),
        };
        let mut scope = Vec::new();
        renderer.render(&segments, &mut scope);

        let Renderer {
            out, unresolved, ..
        } = renderer;

        if let Some(tag) = unresolved.first() {
            if self.strict {
                return Err(TemplateError::UnresolvedTag {
                    class: class.to_string(),
                    template: template.name.clone(),
                    tag: tag.clone(),
                });
            }
            for tag in &unresolved {
                warn!(
                    "Unresolved tag {} left in {} for class {}",
                    tag, template.name, class
                );
            }
        }

        Ok(Expansion {
            text: out,
            unresolved,
        })
    }

    /// Replace every external tag by its grammar text in one scan.
    fn substitute_externals(
        &self,
        text: &str,
        catalog: &TagCatalog,
        part: TemplatePart,
        class: &str,
    ) -> TemplateResult<Substituted> {
        let mut replacements: Vec<(&str, String)> = Vec::new();
        for (tag, path) in catalog.externals() {
            if !text.contains(tag) {
                continue;
            }
            let grammar = self.grammars.load(path, class)?;
            match grammar.lookup(tag, part) {
                Some(replacement) => replacements.push((tag, replacement.to_string())),
                None => debug!("Grammar {:?} has no {} text for {}", path, part.section(), tag),
            }
        }

        if replacements.is_empty() {
            return Ok(Substituted {
                text: text.to_string(),
                inserted: Vec::new(),
            });
        }

        let mut out = String::with_capacity(text.len());
        let mut inserted = Vec::new();
        let mut rest = text;
        while !rest.is_empty() {
            let hit = replacements
                .iter()
                .find(|(tag, _)| rest.starts_with(*tag));
            match hit {
                Some((tag, replacement)) => {
                    let start = out.len();
                    out.push_str(replacement);
                    inserted.push(start..out.len());
                    rest = &rest[tag.len()..];
                }
                None => {
                    let step = rest.chars().next().map_or(1, char::len_utf8);
                    out.push_str(&rest[..step]);
                    rest = &rest[step..];
                }
            }
        }

        Ok(Substituted {
            text: out,
            inserted,
        })
    }
}

struct Parser<'t> {
    text: &'t str,
    catalog: &'t TagCatalog,
    pos: usize,
}

impl<'t> Parser<'t> {
    /// Parse up to `close` (or the end of text at the top level).
    ///
    /// On a missing close marker returns the open tag of the unclosed block.
    fn parse(&mut self, close: Option<&str>) -> Result<Vec<Segment<'t>>, &'t str> {
        let mut segments = Vec::new();
        let mut text_start = self.pos;

        let text = self.text;
        while self.pos < text.len() {
            let rest = &text[self.pos..];
            if !rest.starts_with('<') {
                self.pos += rest.find('<').unwrap_or(rest.len());
                continue;
            }

            if let Some(close) = close {
                if rest.starts_with(close) {
                    push_text(&mut segments, text_start..self.pos);
                    self.pos += close.len();
                    return Ok(segments);
                }
            }

            let Some((tag, kind)) = self.match_tag(rest) else {
                self.pos += 1;
                continue;
            };

            push_text(&mut segments, text_start..self.pos);
            self.pos += tag.len();
            match kind {
                TagKind::Scalar(field) => segments.push(Segment::Scalar { tag, field: *field }),
                TagKind::Block { close, collection } => {
                    let body = self.parse(Some(close.as_str())).map_err(|inner| {
                        // Report the innermost unclosed block.
                        if inner.is_empty() {
                            tag
                        } else {
                            inner
                        }
                    })?;
                    segments.push(Segment::Block {
                        collection: *collection,
                        body,
                    });
                }
                TagKind::External { .. } => {}
            }
            text_start = self.pos;
        }

        if close.is_some() {
            return Err("");
        }
        push_text(&mut segments, text_start..self.pos);
        Ok(segments)
    }

    /// The first catalog entry, in catalog order, matching at the start of
    /// `rest`. External tags were handled by the grammar pass.
    fn match_tag(&self, rest: &str) -> Option<(&'t str, &'t TagKind)> {
        self.catalog
            .iter()
            .filter(|(_, kind)| !matches!(kind, TagKind::External { .. }))
            .find(|(tag, _)| rest.starts_with(tag))
    }
}

/// Whether the text at `at` follows `#include` or `#import` on its line.
fn is_include_target(text: &str, at: usize) -> bool {
    let line_start = text[..at].rfind('\n').map_or(0, |i| i + 1);
    let directive: String = text[line_start..at].split_whitespace().collect();
    directive == "#include" || directive == "#import"
}

fn push_text(segments: &mut Vec<Segment<'_>>, range: Range<usize>) {
    if !range.is_empty() {
        segments.push(Segment::Text(range));
    }
}

struct Renderer<'r, 'a> {
    text: &'r str,
    catalog: &'r TagCatalog,
    inserted: &'r [Range<usize>],
    ctx: &'r ClassContext<'a>,
    out: String,
    unresolved: Vec<String>,
}

impl<'r, 'a> Renderer<'r, 'a> {
    fn render(&mut self, segments: &[Segment<'_>], scope: &mut Vec<Node<'a>>) {
        for segment in segments {
            match segment {
                Segment::Text(range) => {
                    self.flag_literal_tags(range.clone());
                    self.out.push_str(&self.text[range.clone()]);
                }
                Segment::Scalar { tag, field } => match self.ctx.resolve(*field, scope) {
                    Some(value) => self.out.push_str(&value),
                    None => {
                        self.record(tag);
                        self.out.push_str(tag);
                    }
                },
                Segment::Block { collection, body } => {
                    for element in self.ctx.elements(*collection, scope) {
                        scope.push(element);
                        self.render(body, scope);
                        scope.pop();
                    }
                }
            }
        }
    }

    /// Record tag-shaped literal text that no catalog entry matched.
    fn flag_literal_tags(&mut self, range: Range<usize>) {
        let text = self.text;
        let slice = &text[range.clone()];
        for found in tag_shape().find_iter(slice) {
            let at = range.start + found.start();
            if self.is_placeholder(found.as_str(), at) {
                self.record(found.as_str());
            }
        }
    }

    fn is_placeholder(&self, tag: &str, at: usize) -> bool {
        if is_include_target(self.text, at) {
            return false;
        }
        if !self.inserted.iter().any(|r| r.contains(&at)) {
            return true;
        }
        tag.strip_prefix('<')
            .and_then(|rest| rest.split_once('.'))
            .is_some_and(|(prefix, _)| self.catalog.is_scalar_namespace(prefix))
    }

    fn record(&mut self, tag: &str) {
        if !self.unresolved.iter().any(|t| t == tag) {
            self.unresolved.push(tag.to_string());
        }
    }
}
