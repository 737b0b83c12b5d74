//! Visualization-settings validation against a display mode

use cs_core::ValidationOutcome;
use serde_json::{Map, Value};

/// Known display modes
pub const DISPLAY_TYPES: &[&str] = &[
    "table",
    "bar",
    "line",
    "area",
    "row",
    "combo",
    "pie",
    "scalar",
    "smartscalar",
    "gauge",
    "progress",
    "funnel",
    "scatter",
    "waterfall",
    "map",
    "pivot",
    "object",
];

const CHART_DISPLAYS: &[&str] = &["bar", "line", "area", "row", "combo", "scatter", "waterfall"];

/// Top-level keys accepted for every display
const UNIVERSAL_KEYS: &[&str] = &["column_settings", "series_settings", "click_behavior"];

const STACK_TYPES: &[&str] = &["stacked", "normalized"];
const X_AXIS_SCALES: &[&str] = &["timeseries", "linear", "pow", "log", "ordinal", "histogram"];

fn namespaces_for(display: &str) -> &'static [&'static str] {
    match display {
        d if CHART_DISPLAYS.contains(&d) => &["graph.", "stackable."],
        "pie" => &["pie."],
        "scalar" | "smartscalar" => &["scalar."],
        "gauge" => &["gauge."],
        "progress" => &["progress."],
        "funnel" => &["funnel.", "graph."],
        "map" => &["map."],
        "pivot" => &["pivot_table.", "table."],
        "table" | "object" => &["table."],
        _ => &[],
    }
}

/// Validate visualization settings for a display mode.
///
/// Setting keys must belong to a namespace valid for the display, or be
/// one of the universal keys (`card.*`, `column_settings`,
/// `series_settings`, `click_behavior`).
pub fn validate_visualization_settings(display: &str, settings: &Value) -> ValidationOutcome {
    let mut outcome = ValidationOutcome::ok();

    if !DISPLAY_TYPES.contains(&display) {
        outcome.push(format!(
            "Unknown display type '{}'. Must be one of: {}",
            display,
            DISPLAY_TYPES.join(", ")
        ));
        return outcome;
    }

    let Value::Object(settings) = settings else {
        outcome.push("visualization_settings must be an object");
        return outcome;
    };

    let namespaces = namespaces_for(display);
    for key in settings.keys() {
        let allowed = key.starts_with("card.")
            || UNIVERSAL_KEYS.contains(&key.as_str())
            || namespaces.iter().any(|ns| key.starts_with(ns));
        if !allowed {
            outcome.push(format!(
                "Setting '{}' is not valid for display '{}'",
                key, display
            ));
        }
    }

    check_types(settings, &mut outcome);
    outcome
}

fn check_types(settings: &Map<String, Value>, outcome: &mut ValidationOutcome) {
    for key in ["graph.dimensions", "graph.metrics"] {
        if let Some(value) = settings.get(key) {
            let strings = value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string));
            if !strings {
                outcome.push(format!("'{}' must be a list of column names", key));
            }
        }
    }

    if let Some(value) = settings.get("stackable.stack_type") {
        let valid = match value {
            Value::Null => true,
            Value::String(s) => STACK_TYPES.contains(&s.as_str()),
            _ => false,
        };
        if !valid {
            outcome.push("'stackable.stack_type' must be null, \"stacked\" or \"normalized\"");
        }
    }

    if let Some(value) = settings.get("graph.x_axis.scale") {
        if !value.as_str().is_some_and(|s| X_AXIS_SCALES.contains(&s)) {
            outcome.push(format!(
                "'graph.x_axis.scale' must be one of: {}",
                X_AXIS_SCALES.join(", ")
            ));
        }
    }

    if let Some(value) = settings.get("graph.show_values") {
        if !value.is_boolean() {
            outcome.push("'graph.show_values' must be a boolean");
        }
    }

    if let Some(value) = settings.get("series_settings") {
        if !value.is_object() {
            outcome.push("'series_settings' must be an object");
        }
    }
}

#[cfg(test)]
#[path = "visualization_test.rs"]
mod tests;
