//! Format registry for parser and converter lookup
//!
//! Parsers and converters are registered under a primary name plus aliases and looked up
//! case-insensitively. The process-wide [`REGISTRY`] is filled with the built-in formats on
//! first use and only read afterwards, so concurrent lookups need no locking.

use crate::config::ConvertConfig;
use crate::converters::{Converter, LatexConverter, TypstConverter};
use crate::error::UnknownFormatError;
use crate::parsers::{MarkdownParser, Parser};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Registry holding the built-in formats with default options.
pub static REGISTRY: Lazy<FormatRegistry> = Lazy::new(FormatRegistry::with_defaults);

/// Which side of the pipeline a format sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Parser,
    Converter,
}

impl fmt::Display for FormatKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatKind::Parser => f.write_str("parser"),
            FormatKind::Converter => f.write_str("converter"),
        }
    }
}

/// A registered parser or converter.
#[derive(Clone)]
pub enum Implementation {
    Parser(Arc<dyn Parser>),
    Converter(Arc<dyn Converter>),
}

impl Implementation {
    pub fn parser(parser: impl Parser + 'static) -> Self {
        Implementation::Parser(Arc::new(parser))
    }

    pub fn converter(converter: impl Converter + 'static) -> Self {
        Implementation::Converter(Arc::new(converter))
    }

    pub fn kind(&self) -> FormatKind {
        match self {
            Implementation::Parser(_) => FormatKind::Parser,
            Implementation::Converter(_) => FormatKind::Converter,
        }
    }

    fn description(&self) -> &str {
        match self {
            Implementation::Parser(parser) => parser.description(),
            Implementation::Converter(converter) => converter.description(),
        }
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Implementation::Parser(parser) => write!(f, "Parser({})", parser.name()),
            Implementation::Converter(converter) => write!(f, "Converter({})", converter.name()),
        }
    }
}

/// Introspection record returned by [`FormatRegistry::list_formats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatInfo {
    pub name: String,
    pub aliases: Vec<String>,
    pub description: String,
}

#[derive(Debug)]
struct Entry {
    aliases: Vec<String>,
    implementation: Implementation,
}

/// Registry of parsers and converters
///
/// ```ignore
/// let mut registry = FormatRegistry::new();
/// registry.register("markdown", &["md"], Implementation::parser(MarkdownParser));
///
/// let parser = registry.resolve_parser("MD")?;
/// let doc = parser.parse("# Title")?;
/// ```
#[derive(Debug, Default)]
pub struct FormatRegistry {
    /// Keyed by kind and lowercased primary name; ordered for listing.
    entries: BTreeMap<(FormatKind, String), Entry>,
    /// Lowercased primary names and aliases, mapped to their primary name.
    lookup: HashMap<(FormatKind, String), String>,
}

impl FormatRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with the built-in formats and default converter options.
    pub fn with_defaults() -> Self {
        Self::with_config(&ConvertConfig::default())
    }

    /// Registry with the built-in formats, converters configured from `config`.
    pub fn with_config(config: &ConvertConfig) -> Self {
        let mut registry = Self::new();
        registry.register_parser("markdown", &["md"], MarkdownParser);
        registry.register_converter(
            "latex",
            &["tex"],
            LatexConverter::new(config.latex.clone()),
        );
        registry.register_converter(
            "typst",
            &["typ"],
            TypstConverter::new(config.typst.clone()),
        );
        registry
    }

    /// Register an implementation under `name` and `aliases`.
    ///
    /// The kind is taken from the implementation. Re-registering a primary name replaces the
    /// previous entry and drops its aliases.
    pub fn register(&mut self, name: &str, aliases: &[&str], implementation: Implementation) {
        let kind = implementation.kind();
        let name = name.to_lowercase();

        if let Some(previous) = self.entries.remove(&(kind, name.clone())) {
            for alias in previous.aliases {
                self.lookup.remove(&(kind, alias));
            }
        }

        let aliases: Vec<String> = aliases.iter().map(|alias| alias.to_lowercase()).collect();
        self.lookup.insert((kind, name.clone()), name.clone());
        for alias in &aliases {
            self.lookup.insert((kind, alias.clone()), name.clone());
        }

        debug!(%kind, name = %name, aliases = ?aliases, "registered format");
        self.entries.insert(
            (kind, name),
            Entry {
                aliases,
                implementation,
            },
        );
    }

    pub fn register_parser(&mut self, name: &str, aliases: &[&str], parser: impl Parser + 'static) {
        self.register(name, aliases, Implementation::parser(parser));
    }

    pub fn register_converter(
        &mut self,
        name: &str,
        aliases: &[&str],
        converter: impl Converter + 'static,
    ) {
        self.register(name, aliases, Implementation::converter(converter));
    }

    /// Look up a name or alias, ignoring case.
    pub fn resolve(&self, kind: FormatKind, name: &str) -> Result<&Implementation, UnknownFormatError> {
        let key = (kind, name.to_lowercase());
        let entry = self
            .lookup
            .get(&key)
            .and_then(|primary| self.entries.get(&(kind, primary.clone())));
        match entry {
            Some(entry) => {
                debug!(%kind, requested = name, resolved = %key.1, "resolved format");
                Ok(&entry.implementation)
            }
            None => Err(UnknownFormatError {
                kind,
                name: name.to_string(),
            }),
        }
    }

    pub fn resolve_parser(&self, name: &str) -> Result<Arc<dyn Parser>, UnknownFormatError> {
        match self.resolve(FormatKind::Parser, name)? {
            Implementation::Parser(parser) => Ok(Arc::clone(parser)),
            Implementation::Converter(_) => Err(UnknownFormatError {
                kind: FormatKind::Parser,
                name: name.to_string(),
            }),
        }
    }

    pub fn resolve_converter(&self, name: &str) -> Result<Arc<dyn Converter>, UnknownFormatError> {
        match self.resolve(FormatKind::Converter, name)? {
            Implementation::Converter(converter) => Ok(Arc::clone(converter)),
            Implementation::Parser(_) => Err(UnknownFormatError {
                kind: FormatKind::Converter,
                name: name.to_string(),
            }),
        }
    }

    /// Check if a name or alias is registered for `kind`
    pub fn has(&self, kind: FormatKind, name: &str) -> bool {
        self.lookup.contains_key(&(kind, name.to_lowercase()))
    }

    /// Registered formats per kind, each list sorted by primary name.
    pub fn list_formats(&self) -> BTreeMap<FormatKind, Vec<FormatInfo>> {
        let mut formats: BTreeMap<FormatKind, Vec<FormatInfo>> = BTreeMap::new();
        for ((kind, name), entry) in &self.entries {
            formats.entry(*kind).or_default().push(FormatInfo {
                name: name.clone(),
                aliases: entry.aliases.clone(),
                description: entry.implementation.description().to_string(),
            });
        }
        formats
    }

    /// Primary parser name whose file extensions include `extension`.
    pub fn parser_for_extension(&self, extension: &str) -> Option<String> {
        let extension = extension.to_lowercase();
        self.entries
            .iter()
            .find_map(|((_, name), entry)| match &entry.implementation {
                Implementation::Parser(parser)
                    if parser.file_extensions().iter().any(|e| *e == extension) =>
                {
                    Some(name.clone())
                }
                _ => None,
            })
    }
}
