//! Parameter processor
//!
//! Turns caller-supplied parameter records into persisted
//! [`ParameterRecord`]s and the matching template tags. Field filters
//! (`string/=`, `date/range`, ...) bind to a database field through a
//! `dimension` tag; simple filters (`category`, `number/=`, `date/single`,
//! `text`) bind to a plain variable tag.

use cs_core::{ParameterRecord, RawParameter, TemplateTag, TemplateTags};
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::OnceLock;
use uuid::Uuid;

/// Simple filter types and the template-tag type each maps to
const SIMPLE_TYPES: &[(&str, &str)] = &[
    ("category", "text"),
    ("number/=", "number"),
    ("date/single", "date"),
    ("text", "text"),
];

const FIELD_FILTER_TYPES: &[&str] = &[
    "string/=",
    "string/!=",
    "string/contains",
    "string/does-not-contain",
    "string/starts-with",
    "string/ends-with",
    "number/!=",
    "number/between",
    "number/>=",
    "number/<=",
    "date/range",
    "date/relative",
    "date/month-year",
    "date/quarter-year",
    "date/all-options",
    "id",
];

const VALUES_SOURCE_TYPES: &[&str] = &["static-list", "card"];
const VALUES_QUERY_TYPES: &[&str] = &["list", "search", "none"];

fn slug_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"))
}

/// Result of processing a parameter set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessedParameters {
    pub parameters: Vec<ParameterRecord>,
    /// Template tags keyed by slug, for native queries
    pub template_tags: TemplateTags,
    pub errors: Vec<String>,
}

impl ProcessedParameters {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Declared slugs in parameter order
    pub fn slugs(&self) -> impl Iterator<Item = &str> {
        self.parameters.iter().map(|p| p.slug.as_str())
    }
}

/// Lowercase a display name into a template-tag slug
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.trim().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('_') {
            slug.push('_');
        }
    }
    slug.trim_matches('_').to_string()
}

/// Process an ordered list of raw parameter records.
///
/// Every record is checked; errors are collected across the whole set as
/// `Parameter N ('name'): message` with 1-based `N`. When any error is
/// reported the parameters and template tags must not be persisted.
pub fn process_parameters(records: &[RawParameter]) -> ProcessedParameters {
    let mut processed = ProcessedParameters::default();
    let mut seen = HashSet::new();

    for (index, raw) in records.iter().enumerate() {
        let label = raw
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or("unnamed");
        match process_one(raw) {
            Ok((record, tag)) => {
                if !seen.insert(record.slug.clone()) {
                    processed.errors.push(format!(
                        "Parameter {} ('{}'): duplicate slug '{}'",
                        index + 1,
                        label,
                        record.slug
                    ));
                    continue;
                }
                processed
                    .template_tags
                    .insert(record.slug.clone(), Value::from(tag));
                processed.parameters.push(record);
            }
            Err(messages) => {
                for message in messages {
                    processed
                        .errors
                        .push(format!("Parameter {} ('{}'): {}", index + 1, label, message));
                }
            }
        }
    }

    if !processed.errors.is_empty() {
        log::debug!(
            "Parameter processing rejected {} record(s) with {} error(s)",
            records.len(),
            processed.errors.len()
        );
    }
    processed
}

fn process_one(raw: &RawParameter) -> Result<(ParameterRecord, TemplateTag), Vec<String>> {
    let mut errors = Vec::new();

    let name = match raw.get("name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.clone(),
        Some(Value::String(_)) | None => {
            errors.push("'name' is required".to_string());
            String::new()
        }
        Some(_) => {
            errors.push("'name' must be a string".to_string());
            String::new()
        }
    };

    let param_type = match raw.get("type").and_then(Value::as_str) {
        Some(t) if is_supported_type(t) => Some(t.to_string()),
        Some(t) => {
            errors.push(format!(
                "unsupported type '{}'. Supported types: {}",
                t,
                supported_types().join(", ")
            ));
            None
        }
        None => {
            errors.push("'type' is required".to_string());
            None
        }
    };

    let slug = match raw.get("slug") {
        Some(Value::String(slug)) => slug.clone(),
        Some(_) => {
            errors.push("'slug' must be a string".to_string());
            String::new()
        }
        None => slugify(&name),
    };
    if (!name.is_empty() || raw.contains_key("slug")) && !slug_regex().is_match(&slug) {
        errors.push(format!(
            "invalid slug '{}': must start with a letter or underscore and contain only letters, digits and underscores",
            slug
        ));
    }

    let id = match raw.get("id") {
        Some(Value::String(id)) if !id.is_empty() => id.clone(),
        Some(Value::Null) | None => Uuid::new_v4().to_string(),
        Some(_) => {
            errors.push("'id' must be a non-empty string".to_string());
            String::new()
        }
    };

    let field_id = match (param_type.as_deref(), raw.get("field_id")) {
        (Some(t), field) if is_field_filter(t) => match field.and_then(Value::as_i64) {
            Some(id) => Some(id),
            None => {
                errors.push(format!("field filter type '{}' requires an integer 'field_id'", t));
                None
            }
        },
        _ => None,
    };

    let default = raw.get("default").filter(|v| !v.is_null()).cloned();
    let required = match raw.get("required") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            errors.push("'required' must be a boolean".to_string());
            false
        }
    };
    if required && default.is_none() {
        errors.push("required parameters must have a 'default' value".to_string());
    }

    let values_source_type = raw.get("values_source_type").and_then(Value::as_str);
    let values_source_config = raw.get("values_source_config");
    if let Some(message) = check_values_source(
        raw.get("values_source_type"),
        values_source_type,
        values_source_config,
    ) {
        errors.push(message);
    }

    let values_query_type = match raw.get("values_query_type") {
        None | Some(Value::Null) => None,
        Some(Value::String(q)) if VALUES_QUERY_TYPES.contains(&q.as_str()) => Some(q.clone()),
        Some(_) => {
            errors.push(format!(
                "'values_query_type' must be one of: {}",
                VALUES_QUERY_TYPES.join(", ")
            ));
            None
        }
    };

    let param_type = match param_type {
        Some(t) if errors.is_empty() => t,
        _ => return Err(errors),
    };

    let (target, tag) = match field_id {
        Some(field_id) => (
            json!(["dimension", ["template-tag", slug]]),
            TemplateTag {
                id: id.clone(),
                name: slug.clone(),
                display_name: name.clone(),
                tag_type: "dimension".to_string(),
                default: default.clone(),
                required,
                dimension: Some(json!(["field", field_id, null])),
                widget_type: Some(param_type.clone()),
            },
        ),
        None => (
            json!(["variable", ["template-tag", slug]]),
            TemplateTag {
                id: id.clone(),
                name: slug.clone(),
                display_name: name.clone(),
                tag_type: simple_tag_type(&param_type).to_string(),
                default: default.clone(),
                required,
                dimension: None,
                widget_type: None,
            },
        ),
    };

    let record = ParameterRecord {
        id,
        name,
        slug,
        param_type,
        target: Some(target),
        default,
        required,
        values_source_type: values_source_type.map(str::to_string),
        values_source_config: values_source_config.filter(|v| !v.is_null()).cloned(),
        values_query_type,
    };
    Ok((record, tag))
}

fn check_values_source(
    raw_type: Option<&Value>,
    source_type: Option<&str>,
    config: Option<&Value>,
) -> Option<String> {
    match (raw_type, source_type) {
        (None | Some(Value::Null), _) => None,
        (Some(_), Some("static-list")) => {
            let has_values = config
                .and_then(|c| c.get("values"))
                .is_some_and(Value::is_array);
            (!has_values).then(|| {
                "values_source_type 'static-list' requires values_source_config.values to be a list"
                    .to_string()
            })
        }
        (Some(_), Some("card")) => {
            let has_card = config
                .and_then(|c| c.get("card_id"))
                .and_then(Value::as_i64)
                .is_some();
            (!has_card).then(|| {
                "values_source_type 'card' requires an integer values_source_config.card_id"
                    .to_string()
            })
        }
        (Some(_), _) => Some(format!(
            "'values_source_type' must be one of: {}",
            VALUES_SOURCE_TYPES.join(", ")
        )),
    }
}

fn is_field_filter(param_type: &str) -> bool {
    FIELD_FILTER_TYPES.contains(&param_type)
}

fn is_supported_type(param_type: &str) -> bool {
    is_field_filter(param_type) || SIMPLE_TYPES.iter().any(|(t, _)| *t == param_type)
}

fn simple_tag_type(param_type: &str) -> &'static str {
    SIMPLE_TYPES
        .iter()
        .find(|(t, _)| *t == param_type)
        .map(|(_, tag)| *tag)
        .unwrap_or("text")
}

fn supported_types() -> Vec<&'static str> {
    SIMPLE_TYPES
        .iter()
        .map(|(t, _)| *t)
        .chain(FIELD_FILTER_TYPES.iter().copied())
        .collect()
}

#[cfg(test)]
#[path = "parameters_test.rs"]
mod tests;
