// SPDX-FileCopyrightText: 2026 Dockyard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Figment errors rendered as miette diagnostics with key suggestions.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use std::fmt;

use figment::error::Kind;
use miette::{Diagnostic, GraphicalReportHandler, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// A project file error with diagnostic context.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown configuration key `{key}`")]
    #[diagnostic(
        code(dockyard::config::unknown_key),
        help("{}", KeyHelp::new(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        suggestion: Option<String>,
        valid_keys: String,
        #[label("not a recognized key here")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("invalid type for key `{key}`: {detail}")]
    #[diagnostic(code(dockyard::config::invalid_type), help("expected {expected}"))]
    InvalidType {
        key: String,
        detail: String,
        expected: String,
    },

    #[error("missing required key `{key}`")]
    #[diagnostic(
        code(dockyard::config::missing_key),
        help("set `{key}` in dockyard.toml")
    )]
    MissingKey { key: String },

    /// Semantic check that runs after deserialization succeeded.
    #[error("validation error: {message}")]
    #[diagnostic(code(dockyard::config::validation))]
    Validation { message: String },

    #[error("configuration error: {0}")]
    #[diagnostic(code(dockyard::config::other))]
    Other(String),
}

struct KeyHelp<'a> {
    suggestion: Option<&'a str>,
    valid_keys: &'a str,
}

impl<'a> KeyHelp<'a> {
    fn new(suggestion: Option<&'a str>, valid_keys: &'a str) -> Self {
        Self { suggestion, valid_keys }
    }
}

impl fmt::Display for KeyHelp<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(key) = self.suggestion {
            write!(f, "did you mean `{key}`? ")?;
        }
        write!(f, "valid keys: {}", self.valid_keys)
    }
}

impl ConfigError {
    fn from_figment(error: &figment::Error, sources: &[SourceFile<'_>]) -> Self {
        match &error.kind {
            Kind::UnknownField(field, expected) => {
                let located = SourceFile::pick(error, sources)
                    .and_then(|file| file.locate(&error.path, field));
                let (span, src) = located.unzip();
                ConfigError::UnknownKey {
                    key: field.clone(),
                    suggestion: suggest_key(field, expected),
                    valid_keys: expected.join(", "),
                    span,
                    src,
                }
            }
            Kind::MissingField(field) => {
                let mut segments = error.path.clone();
                segments.push(field.to_string());
                ConfigError::MissingKey {
                    key: segments.join("."),
                }
            }
            Kind::InvalidType(actual, expected) => ConfigError::InvalidType {
                key: error.path.join("."),
                detail: format!("found {actual}, expected {expected}"),
                expected: expected.clone(),
            },
            _ => ConfigError::Other(error.to_string()),
        }
    }
}

/// A TOML document that may have contributed to a figment error.
struct SourceFile<'a> {
    name: &'a str,
    content: &'a str,
}

impl<'a> SourceFile<'a> {
    /// The document the error came from. Inline providers carry no file
    /// path, so a lone source is assumed to be the one.
    fn pick<'s>(
        error: &figment::Error,
        sources: &'s [SourceFile<'a>],
    ) -> Option<&'s SourceFile<'a>> {
        let origin = error.metadata.as_ref().and_then(|meta| match meta.source.as_ref()? {
            figment::Source::File(path) => Some(path.display().to_string()),
            _ => None,
        });
        match origin {
            Some(origin) => sources.iter().find(|file| file.name == origin),
            None if sources.len() == 1 => sources.first(),
            None => None,
        }
    }

    fn locate(&self, path: &[String], field: &str) -> Option<(SourceSpan, NamedSource<String>)> {
        let offset = find_key_offset(self.content, path, field)?;
        Some((
            SourceSpan::new(offset.into(), field.len()),
            NamedSource::new(self.name, self.content.to_string()),
        ))
    }
}

/// Convert a `figment::Error` (possibly several) into diagnostics.
///
/// `toml_sources` pairs file paths with their contents so unknown keys can
/// be underlined in context.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    let sources: Vec<SourceFile<'_>> = toml_sources
        .iter()
        .map(|(name, content)| SourceFile { name, content })
        .collect();
    err.into_iter()
        .map(|error| ConfigError::from_figment(&error, &sources))
        .collect()
}

/// Byte offset of `field` as a key inside the table named by `path[0]`.
///
/// `[table]` and `[[table]]` headers both count. An empty path means the
/// root table, i.e. lines before the first header.
pub fn find_key_offset(content: &str, path: &[String], field: &str) -> Option<usize> {
    let wanted = path.first().map(String::as_str);
    let mut table: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let start = offset;
        offset += line.len();
        let body = line.trim_start();

        if body.starts_with('[') {
            table = Some(body.trim_end().trim_matches(|c| c == '[' || c == ']').trim());
            continue;
        }
        if table != wanted {
            continue;
        }
        let is_key = body
            .strip_prefix(field)
            .is_some_and(|rest| rest.starts_with([' ', '\t', '=']));
        if is_key {
            return Some(start + line.len() - body.len());
        }
    }
    None
}

/// Closest valid key by Jaro-Winkler similarity, if close enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    let mut best: Option<(f64, &str)> = None;
    for &key in valid_keys {
        let score = strsim::jaro_winkler(unknown, key);
        if score > SUGGESTION_THRESHOLD && best.is_none_or(|(top, _)| score > top) {
            best = Some((score, key));
        }
    }
    best.map(|(_, key)| key.to_string())
}

/// Print each diagnostic to stderr with miette's graphical renderer.
pub fn render_errors(errors: &[ConfigError]) {
    let handler = GraphicalReportHandler::new();
    for error in errors {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, error) {
            Ok(()) => eprint!("{rendered}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
