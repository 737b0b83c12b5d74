//! Structural validation of MBQL query trees
//!
//! Checks the shape of a legacy MBQL inner query (the contents of
//! `dataset_query.query`): a source, and well-formed optional clauses.
//! Errors are prefixed with a path such as `query.breakout[0]`.

use cs_core::ValidationOutcome;
use serde_json::{Map, Value};
use std::collections::BTreeSet;

const TOP_LEVEL_KEYS: &[&str] = &[
    "source-table",
    "source-query",
    "aggregation",
    "breakout",
    "filter",
    "order-by",
    "limit",
    "expressions",
    "joins",
    "fields",
    "page",
];

const AGGREGATION_OPS: &[&str] = &[
    "count",
    "cum-count",
    "sum",
    "cum-sum",
    "avg",
    "distinct",
    "min",
    "max",
    "stddev",
    "var",
    "median",
    "percentile",
    "share",
    "count-where",
    "sum-where",
    "distinct-where",
    "aggregation-options",
    "metric",
    "offset",
];

const FILTER_OPS: &[&str] = &[
    "=",
    "!=",
    "<",
    "<=",
    ">",
    ">=",
    "between",
    "inside",
    "is-null",
    "not-null",
    "is-empty",
    "not-empty",
    "contains",
    "does-not-contain",
    "starts-with",
    "ends-with",
    "time-interval",
    "during",
    "relative-time-interval",
    "segment",
    "and",
    "or",
    "not",
];

const JOIN_KEYS: &[&str] = &[
    "source-table",
    "source-query",
    "condition",
    "alias",
    "fields",
    "strategy",
];

const JOIN_STRATEGIES: &[&str] = &["left-join", "right-join", "inner-join", "full-join"];

/// Validate an MBQL query tree.
///
/// The root must be an object naming exactly one of `source-table` or
/// `source-query`. Nested `source-query` stages are validated recursively,
/// each with its own `expressions` scope.
pub fn validate_mbql_query(query: &Value) -> ValidationOutcome {
    let mut checker = Checker::default();
    match query {
        Value::Object(map) => checker.stage(map, "query"),
        _ => checker.error("query", "MBQL query must be an object"),
    }
    ValidationOutcome::from_errors(checker.errors)
}

#[derive(Default)]
struct Checker {
    errors: Vec<String>,
}

/// Names visible to references within one query stage
struct Scope {
    expressions: BTreeSet<String>,
    aggregations: usize,
}

impl Checker {
    fn error(&mut self, path: &str, message: impl AsRef<str>) {
        self.errors.push(format!("{}: {}", path, message.as_ref()));
    }

    fn stage(&mut self, query: &Map<String, Value>, path: &str) {
        for key in query.keys() {
            if !TOP_LEVEL_KEYS.contains(&key.as_str()) {
                self.error(path, format!("unknown MBQL clause '{}'", key));
            }
        }

        self.source(query, path);

        let expressions = self.expressions(query.get("expressions"), path);
        let aggregations = match query.get("aggregation") {
            Some(Value::Array(clauses)) => clauses.len(),
            _ => 0,
        };
        let scope = Scope {
            expressions,
            aggregations,
        };

        if let Some(aggregation) = query.get("aggregation") {
            self.aggregation(aggregation, &format!("{}.aggregation", path), &scope);
        }
        if let Some(breakout) = query.get("breakout") {
            self.reference_list(breakout, &format!("{}.breakout", path), &scope);
        }
        if let Some(fields) = query.get("fields") {
            self.reference_list(fields, &format!("{}.fields", path), &scope);
        }
        if let Some(filter) = query.get("filter") {
            self.filter(filter, &format!("{}.filter", path), &scope);
        }
        if let Some(order_by) = query.get("order-by") {
            self.order_by(order_by, &format!("{}.order-by", path), &scope);
        }
        if let Some(limit) = query.get("limit") {
            if !is_positive_int(limit) {
                self.error(&format!("{}.limit", path), "limit must be a positive integer");
            }
        }
        if let Some(page) = query.get("page") {
            self.page(page, &format!("{}.page", path));
        }
        if let Some(joins) = query.get("joins") {
            self.joins(joins, &format!("{}.joins", path), &scope);
        }
    }

    fn source(&mut self, query: &Map<String, Value>, path: &str) {
        match (query.get("source-table"), query.get("source-query")) {
            (None, None) => self.error(
                path,
                "missing required 'source-table' (or 'source-query' for nested queries)",
            ),
            (Some(_), Some(_)) => self.error(
                path,
                "'source-table' and 'source-query' are mutually exclusive",
            ),
            (Some(table), None) => {
                if !is_source_table(table) {
                    self.error(
                        &format!("{}.source-table", path),
                        "source-table must be a positive table id or \"card__<id>\"",
                    );
                }
            }
            (None, Some(Value::Object(nested))) => {
                self.stage(nested, &format!("{}.source-query", path));
            }
            (None, Some(_)) => self.error(
                &format!("{}.source-query", path),
                "source-query must be an object",
            ),
        }
    }

    fn expressions(&mut self, value: Option<&Value>, path: &str) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        let Some(value) = value else {
            return names;
        };
        let path = format!("{}.expressions", path);
        let Value::Object(map) = value else {
            self.error(&path, "expressions must be an object of name -> expression");
            return names;
        };
        for (name, expr) in map {
            if !is_clause(expr) && !expr.is_number() && !expr.is_string() {
                self.error(
                    &format!("{}.{}", path, name),
                    "expression must be a clause such as [\"+\", a, b]",
                );
            }
            names.insert(name.clone());
        }
        // References between expressions resolve against the full set
        let scope = Scope {
            expressions: names.clone(),
            aggregations: 0,
        };
        for (name, expr) in map {
            self.nested_references(expr, &format!("{}.{}", path, name), &scope);
        }
        names
    }

    fn aggregation(&mut self, value: &Value, path: &str, scope: &Scope) {
        let Value::Array(clauses) = value else {
            self.error(path, "aggregation must be a list of aggregation clauses");
            return;
        };
        for (i, clause) in clauses.iter().enumerate() {
            let clause_path = format!("{}[{}]", path, i);
            match clause_head(clause) {
                Some(op) if AGGREGATION_OPS.contains(&op) => {
                    self.nested_references(clause, &clause_path, scope);
                }
                Some(op) => self.error(
                    &clause_path,
                    format!("unknown aggregation operator '{}'", op),
                ),
                None => self.error(
                    &clause_path,
                    "aggregation must be a clause such as [\"count\"] or [\"sum\", field]",
                ),
            }
        }
    }

    fn reference_list(&mut self, value: &Value, path: &str, scope: &Scope) {
        let Value::Array(refs) = value else {
            self.error(path, "expected a list of field references");
            return;
        };
        for (i, reference) in refs.iter().enumerate() {
            self.reference(reference, &format!("{}[{}]", path, i), scope);
        }
    }

    fn reference(&mut self, value: &Value, path: &str, scope: &Scope) {
        let Some(items) = value.as_array() else {
            self.error(path, "expected a reference such as [\"field\", 10, null]");
            return;
        };
        match clause_head(value) {
            Some("field") => self.field_ref(items, path),
            Some("expression") => {
                match items.get(1).and_then(Value::as_str) {
                    Some(name) if scope.expressions.contains(name) => {}
                    Some(name) => self.error(
                        path,
                        format!("expression '{}' is not defined in 'expressions'", name),
                    ),
                    None => self.error(path, "expression reference needs a name"),
                }
                self.ref_options(items.get(2), path);
            }
            Some("aggregation") => {
                match items.get(1).and_then(Value::as_u64) {
                    Some(index) if (index as usize) < scope.aggregations => {}
                    Some(index) => self.error(
                        path,
                        format!("aggregation index {} is out of range", index),
                    ),
                    None => self.error(path, "aggregation reference needs an index"),
                }
                self.ref_options(items.get(2), path);
            }
            Some(other) => self.error(
                path,
                format!(
                    "expected a field, expression or aggregation reference, found '{}'",
                    other
                ),
            ),
            None => self.error(path, "expected a reference such as [\"field\", 10, null]"),
        }
    }

    fn field_ref(&mut self, items: &[Value], path: &str) {
        match items.get(1) {
            Some(id) if is_positive_int(id) => {}
            Some(Value::String(_)) => {
                let has_base_type = items
                    .get(2)
                    .and_then(Value::as_object)
                    .is_some_and(|opts| opts.contains_key("base-type"));
                if !has_base_type {
                    self.error(
                        path,
                        "field reference by name requires {\"base-type\": ...} options",
                    );
                }
            }
            _ => self.error(path, "field reference needs a positive field id or a name"),
        }
        self.ref_options(items.get(2), path);
    }

    fn ref_options(&mut self, options: Option<&Value>, path: &str) {
        match options {
            None | Some(Value::Null) | Some(Value::Object(_)) => {}
            Some(_) => self.error(path, "reference options must be null or an object"),
        }
    }

    fn filter(&mut self, value: &Value, path: &str, scope: &Scope) {
        let Some(items) = value.as_array() else {
            self.error(path, "filter must be a clause such as [\"=\", field, value]");
            return;
        };
        match clause_head(value) {
            Some(op @ ("and" | "or")) => {
                if items.len() < 3 {
                    self.error(path, format!("'{}' needs at least two clauses", op));
                }
                for (i, clause) in items.iter().enumerate().skip(1) {
                    self.filter(clause, &format!("{}[{}]", path, i), scope);
                }
            }
            Some("not") => match items.get(1) {
                Some(clause) if items.len() == 2 => {
                    self.filter(clause, &format!("{}[1]", path), scope)
                }
                _ => self.error(path, "'not' takes exactly one clause"),
            },
            Some("segment") => {
                if items.len() != 2 {
                    self.error(path, "'segment' takes exactly one segment id");
                }
            }
            Some(op) if FILTER_OPS.contains(&op) => {
                if items.len() < 2 {
                    self.error(path, format!("'{}' needs an argument", op));
                }
                self.nested_references(value, path, scope);
            }
            Some(op) => self.error(path, format!("unknown filter operator '{}'", op)),
            None => self.error(path, "filter must be a clause such as [\"=\", field, value]"),
        }
    }

    fn order_by(&mut self, value: &Value, path: &str, scope: &Scope) {
        let Value::Array(clauses) = value else {
            self.error(path, "order-by must be a list of [\"asc\"|\"desc\", reference]");
            return;
        };
        for (i, clause) in clauses.iter().enumerate() {
            let clause_path = format!("{}[{}]", path, i);
            match (clause_head(clause), clause.as_array().map(Vec::len)) {
                (Some("asc" | "desc"), Some(2)) => {
                    if let Some(reference) = clause.get(1) {
                        self.reference(reference, &clause_path, scope);
                    }
                }
                _ => self.error(
                    &clause_path,
                    "order-by clause must be [\"asc\"|\"desc\", reference]",
                ),
            }
        }
    }

    fn page(&mut self, value: &Value, path: &str) {
        let valid = value.as_object().is_some_and(|page| {
            page.get("page").is_some_and(is_positive_int)
                && page.get("items").is_some_and(is_positive_int)
        });
        if !valid {
            self.error(path, "page must be {\"page\": n, \"items\": n} with positive integers");
        }
    }

    fn joins(&mut self, value: &Value, path: &str, scope: &Scope) {
        let Value::Array(joins) = value else {
            self.error(path, "joins must be a list of join objects");
            return;
        };
        for (i, join) in joins.iter().enumerate() {
            let join_path = format!("{}[{}]", path, i);
            let Value::Object(join) = join else {
                self.error(&join_path, "join must be an object");
                continue;
            };
            for key in join.keys() {
                if !JOIN_KEYS.contains(&key.as_str()) {
                    self.error(&join_path, format!("unknown join key '{}'", key));
                }
            }
            self.source(join, &join_path);
            match join.get("condition") {
                Some(condition) => {
                    self.filter(condition, &format!("{}.condition", join_path), scope)
                }
                None => self.error(&join_path, "join needs a 'condition'"),
            }
            if let Some(alias) = join.get("alias") {
                if !alias.as_str().is_some_and(|a| !a.is_empty()) {
                    self.error(&join_path, "join alias must be a non-empty string");
                }
            }
            match join.get("fields") {
                None => {}
                Some(Value::String(s)) if s == "all" || s == "none" => {}
                Some(fields @ Value::Array(_)) => {
                    self.reference_list(fields, &format!("{}.fields", join_path), scope)
                }
                Some(_) => self.error(
                    &join_path,
                    "join fields must be \"all\", \"none\" or a list of references",
                ),
            }
            if let Some(strategy) = join.get("strategy") {
                if !strategy
                    .as_str()
                    .is_some_and(|s| JOIN_STRATEGIES.contains(&s))
                {
                    self.error(
                        &join_path,
                        format!("join strategy must be one of: {}", JOIN_STRATEGIES.join(", ")),
                    );
                }
            }
        }
    }

    /// Validate every reference nested anywhere inside a clause's arguments
    fn nested_references(&mut self, value: &Value, path: &str, scope: &Scope) {
        let Some(items) = value.as_array() else {
            return;
        };
        for (i, arg) in items.iter().enumerate().skip(1) {
            let arg_path = format!("{}[{}]", path, i);
            match clause_head(arg) {
                Some("field" | "expression" | "aggregation") => {
                    self.reference(arg, &arg_path, scope)
                }
                Some(_) => self.nested_references(arg, &arg_path, scope),
                None => {}
            }
        }
    }
}

fn clause_head(value: &Value) -> Option<&str> {
    value.as_array()?.first()?.as_str()
}

fn is_clause(value: &Value) -> bool {
    clause_head(value).is_some()
}

fn is_positive_int(value: &Value) -> bool {
    value.as_u64().is_some_and(|n| n > 0)
}

fn is_source_table(value: &Value) -> bool {
    match value {
        Value::String(s) => s
            .strip_prefix("card__")
            .is_some_and(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit())),
        other => is_positive_int(other),
    }
}

#[cfg(test)]
#[path = "mbql_test.rs"]
mod tests;
