use super::*;

#[test]
fn test_quoted_placeholder_detected() {
    let sql = "SELECT * FROM orders WHERE status = '{{status}}'";
    let mistakes = detect_parameter_mistakes(sql, ["status"]);
    assert_eq!(
        mistakes,
        vec![Mistake::QuotedParameter {
            slug: "status".to_string()
        }]
    );
}

#[test]
fn test_unquoted_placeholder_not_flagged() {
    let sql = "SELECT * FROM orders WHERE status = {{status}}";
    assert!(detect_parameter_mistakes(sql, ["status"]).is_empty());
}

#[test]
fn test_quoted_placeholder_with_inner_whitespace() {
    let sql = "WHERE status = '{{ status }}'";
    assert_eq!(detect_parameter_mistakes(sql, ["status"]).len(), 1);
}

#[test]
fn test_only_declared_slugs_are_checked() {
    let sql = "WHERE a = '{{a}}' AND b = {{b}}";
    let mistakes = detect_parameter_mistakes(sql, ["b"]);
    assert!(mistakes.is_empty());
}

#[test]
fn test_slug_with_regex_metacharacters() {
    let sql = "WHERE x = '{{a.b}}' AND y = '{{aXb}}'";
    let mistakes = detect_parameter_mistakes(sql, ["a.b"]);
    assert_eq!(mistakes.len(), 1);

    let sql = "WHERE y = '{{aXb}}'";
    assert!(detect_parameter_mistakes(sql, ["a.b"]).is_empty());
}

#[test]
fn test_duplicate_slugs_reported_once() {
    let sql = "WHERE status = '{{status}}'";
    assert_eq!(detect_parameter_mistakes(sql, ["status", "status"]).len(), 1);
}

#[test]
fn test_case_when_quoted_detected_without_declared_slug() {
    let sql = "SELECT CASE WHEN '{{metric}}' = 'spend' THEN 1 END FROM t";
    let mistakes = detect_parameter_mistakes(sql, std::iter::empty());
    assert_eq!(mistakes, vec![Mistake::QuotedCaseWhen]);
}

#[test]
fn test_case_when_is_case_insensitive() {
    let sql = "select case\n  when '{{metric}}' = 'spend' then 1 end";
    assert!(detect_parameter_mistakes(sql, std::iter::empty()).contains(&Mistake::QuotedCaseWhen));
}

#[test]
fn test_case_when_and_quoted_slug_both_reported() {
    let sql = "SELECT CASE WHEN '{{metric}}' = 'spend' THEN 1 END";
    let mistakes = detect_parameter_mistakes(sql, ["metric"]);
    assert_eq!(mistakes.len(), 2);
}

#[test]
fn test_quoted_parameter_lines_reference_slug() {
    let lines = Mistake::QuotedParameter {
        slug: "status".to_string(),
    }
    .to_lines();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("'status'"));
    assert_eq!(lines[1], "  WRONG: WHERE column = '{{status}}'");
    assert_eq!(lines[2], "  CORRECT: WHERE column = {{status}}");
}
