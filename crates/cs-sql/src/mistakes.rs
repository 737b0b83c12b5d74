//! Detection of common placeholder misuse in native SQL.
//!
//! The templating layer already quotes and escapes substituted values
//! according to each parameter's type, so wrapping a placeholder in single
//! quotes produces doubled quoting. These findings are advisory only.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

static CASE_WHEN_QUOTED_RE: OnceLock<Regex> = OnceLock::new();

fn case_when_quoted_re() -> &'static Regex {
    CASE_WHEN_QUOTED_RE.get_or_init(|| {
        Regex::new(r"(?i)CASE\s+WHEN\s+'\{\{[^}]+\}\}'").expect("valid regex")
    })
}

/// A detected placeholder misuse
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mistake {
    /// `'{{slug}}'` somewhere in the SQL
    QuotedParameter { slug: String },
    /// `CASE WHEN '{{...}}'` comparing a quoted placeholder
    QuotedCaseWhen,
}

impl Mistake {
    /// Warning line followed by a wrong/correct example pair
    pub fn to_lines(&self) -> Vec<String> {
        match self {
            Mistake::QuotedParameter { slug } => vec![
                format!(
                    "WARNING: Parameter '{}' is quoted in SQL. Remove quotes - parameters include proper formatting automatically.",
                    slug
                ),
                format!("  WRONG: WHERE column = '{{{{{}}}}}'", slug),
                format!("  CORRECT: WHERE column = {{{{{}}}}}", slug),
            ],
            Mistake::QuotedCaseWhen => vec![
                "WARNING: CASE WHEN statement has quoted parameters. Remove quotes around parameters."
                    .to_string(),
                "  WRONG: CASE WHEN '{{metric_type}}' = 'spend'".to_string(),
                "  CORRECT: CASE WHEN {{metric_type}} = 'spend'".to_string(),
            ],
        }
    }
}

impl fmt::Display for Mistake {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_lines().join("\n"))
    }
}

fn quoted_parameter_re(slug: &str) -> Option<Regex> {
    Regex::new(&format!(r"(?i)'\{{\{{\s*{}\s*\}}\}}'", regex::escape(slug))).ok()
}

/// Scan SQL for quoted placeholders of the given slugs and for quoted
/// placeholders directly after `CASE WHEN`.
///
/// Slugs are reported in the order given, each at most once. The
/// `CASE WHEN` check runs regardless of which slugs are declared.
pub fn detect_parameter_mistakes<'a>(
    sql: &str,
    slugs: impl IntoIterator<Item = &'a str>,
) -> Vec<Mistake> {
    let mut mistakes = Vec::new();

    for slug in slugs {
        if mistakes
            .iter()
            .any(|m| matches!(m, Mistake::QuotedParameter { slug: s } if s == slug))
        {
            continue;
        }
        let quoted = quoted_parameter_re(slug).is_some_and(|re| re.is_match(sql));
        if quoted {
            mistakes.push(Mistake::QuotedParameter {
                slug: slug.to_string(),
            });
        }
    }

    if case_when_quoted_re().is_match(sql) {
        mistakes.push(Mistake::QuotedCaseWhen);
    }

    mistakes
}

#[cfg(test)]
#[path = "mistakes_test.rs"]
mod tests;
