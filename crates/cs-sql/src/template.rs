//! Placeholder extraction from templated SQL

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::OnceLock;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
static OPTIONAL_BLOCK_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([^{}]*?)\s*\}\}").expect("valid regex"))
}

fn optional_block_re() -> &'static Regex {
    OPTIONAL_BLOCK_RE.get_or_init(|| Regex::new(r"(?s)\[\[(.*?)\]\]").expect("valid regex"))
}

/// What a `{{...}}` placeholder refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    /// A parameter, referenced by slug
    Variable,
    /// A saved question used as a subquery (`{{#123}}`, `{{#123-orders}}`)
    CardReference,
    /// A reusable SQL snippet (`{{snippet: name}}`)
    Snippet,
}

/// One `{{...}}` occurrence in the SQL text
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Placeholder {
    /// Inner identifier with surrounding whitespace removed
    pub name: String,
    pub kind: PlaceholderKind,
    /// Whether the placeholder sits inside a `[[ ... ]]` optional block
    pub optional: bool,
    /// Byte offset of the opening braces
    pub offset: usize,
}

/// All placeholders found in a SQL string, in text order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateScan {
    pub placeholders: Vec<Placeholder>,
    /// Number of `[[ ... ]]` optional blocks
    pub optional_blocks: usize,
}

impl TemplateScan {
    /// Distinct parameter names referenced anywhere in the SQL
    pub fn variable_names(&self) -> BTreeSet<String> {
        self.variables().map(|p| p.name.clone()).collect()
    }

    fn variables(&self) -> impl Iterator<Item = &Placeholder> {
        self.placeholders
            .iter()
            .filter(|p| p.kind == PlaceholderKind::Variable && !p.name.is_empty())
    }
}

fn classify(name: &str) -> PlaceholderKind {
    if name.starts_with('#') {
        PlaceholderKind::CardReference
    } else if name
        .get(..8)
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case("snippet:"))
    {
        PlaceholderKind::Snippet
    } else {
        PlaceholderKind::Variable
    }
}

/// Scan SQL for placeholders and optional blocks
pub fn scan(sql: &str) -> TemplateScan {
    let blocks: Vec<(usize, usize)> = optional_block_re()
        .find_iter(sql)
        .map(|m| (m.start(), m.end()))
        .collect();

    let placeholders = placeholder_re()
        .captures_iter(sql)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let name = caps.get(1)?.as_str().trim().to_string();
            let offset = whole.start();
            Some(Placeholder {
                kind: classify(&name),
                optional: blocks
                    .iter()
                    .any(|(start, end)| offset > *start && offset < *end),
                name,
                offset,
            })
        })
        .collect();

    TemplateScan {
        placeholders,
        optional_blocks: blocks.len(),
    }
}

/// Distinct parameter names referenced by `{{...}}` placeholders.
///
/// Matching is case-sensitive on the trimmed inner identifier. Card
/// references and snippets are not parameters and are excluded.
pub fn referenced_names(sql: &str) -> BTreeSet<String> {
    scan(sql).variable_names()
}

#[cfg(test)]
#[path = "template_test.rs"]
mod tests;
