//! Cross-check of SQL placeholders against declared parameter slugs

use crate::template::referenced_names;
use std::collections::BTreeSet;
use std::fmt;

/// A mismatch between declared parameters and placeholders in SQL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyIssue {
    /// Parameter declared but its `{{slug}}` never appears in SQL
    DeclaredNotReferenced { slug: String },
    /// `{{name}}` appears in SQL but no parameter declares that slug
    ReferencedNotDeclared { name: String },
    /// Undeclared placeholder that differs from a declared slug only by
    /// letter case or `-`/`_`
    NameMismatch { referenced: String, declared: String },
}

impl fmt::Display for ConsistencyIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConsistencyIssue::DeclaredNotReferenced { slug } => write!(
                f,
                "Parameter '{}' is declared but not referenced in SQL (missing {{{{{}}}}} in query)",
                slug, slug
            ),
            ConsistencyIssue::ReferencedNotDeclared { name } => write!(
                f,
                "SQL references {{{{{}}}}} but no parameter with slug '{}' is declared (missing parameter definition)",
                name, name
            ),
            ConsistencyIssue::NameMismatch {
                referenced,
                declared,
            } => write!(
                f,
                "SQL placeholder {{{{{}}}}} looks like parameter '{}'; placeholders must match the slug exactly",
                referenced, declared
            ),
        }
    }
}

fn loose_key(name: &str) -> String {
    name.to_lowercase().replace('-', "_")
}

/// Compare placeholders referenced in `sql` against the declared `slugs`.
///
/// Reports declared-but-unreferenced slugs in declaration order, then
/// referenced-but-undeclared names in sorted order, then naming mismatches.
pub fn check_consistency<'a>(
    sql: &str,
    slugs: impl IntoIterator<Item = &'a str>,
) -> Vec<ConsistencyIssue> {
    let referenced = referenced_names(sql);

    let mut declared: Vec<&str> = Vec::new();
    for slug in slugs {
        if !declared.contains(&slug) {
            declared.push(slug);
        }
    }
    let declared_set: BTreeSet<&str> = declared.iter().copied().collect();

    let mut issues: Vec<ConsistencyIssue> = declared
        .iter()
        .filter(|slug| !referenced.contains(**slug))
        .map(|slug| ConsistencyIssue::DeclaredNotReferenced {
            slug: slug.to_string(),
        })
        .collect();

    let undeclared: Vec<&String> = referenced
        .iter()
        .filter(|name| !declared_set.contains(name.as_str()))
        .collect();

    issues.extend(
        undeclared
            .iter()
            .map(|name| ConsistencyIssue::ReferencedNotDeclared {
                name: name.to_string(),
            }),
    );

    for name in undeclared {
        let key = loose_key(name);
        if let Some(declared) = declared.iter().find(|slug| loose_key(slug) == key) {
            issues.push(ConsistencyIssue::NameMismatch {
                referenced: name.clone(),
                declared: declared.to_string(),
            });
        }
    }

    issues
}

#[cfg(test)]
#[path = "consistency_test.rs"]
mod tests;
