// tests/convert_tests.rs

use pretty_assertions::assert_eq;
use serde_json::json;
use soql_model::{
    ErrorType, SELECT_COUNT, ToolingModel, UnsupportedReason,
    model::{
        AndOr, CompareValue, Condition, FieldRef, LiteralType, Nulls, Operator, Order,
        OrderByExpression,
    },
    to_flat_model, to_structural_model, to_text,
    tooling_model::{UnsupportedItem, WhereCondition, WhereModel},
};

fn condition(field: &str, value_type: LiteralType, value: &str) -> Condition {
    Condition {
        field: FieldRef::new(field),
        operator: Operator::Eq,
        compare_value: CompareValue {
            value_type,
            value: value.to_string(),
        },
    }
}

fn model_one() -> ToolingModel {
    ToolingModel {
        sobject: "Account".into(),
        fields: vec!["Name".into(), "Id".into()],
        where_clause: WhereModel {
            conditions: vec![
                WhereCondition {
                    condition: condition("Name", LiteralType::String, "'pwt'"),
                    index: 0,
                },
                WhereCondition {
                    condition: condition("Id", LiteralType::Number, "123456"),
                    index: 1,
                },
            ],
            and_or: Some(AndOr::And),
        },
        order_by: vec![OrderByExpression {
            field: "Name".into(),
            order: Some(Order::Asc),
            nulls: Some(Nulls::First),
        }],
        limit: "11".into(),
        ..ToolingModel::template()
    }
}

fn model_count() -> ToolingModel {
    ToolingModel {
        sobject: "Account".into(),
        fields: vec![SELECT_COUNT.into()],
        ..ToolingModel::template()
    }
}

const SOQL_ONE: &str = "Select Name, Id from Account WHERE Name = 'pwt' AND Id = 123456 \
                        ORDER BY Name ASC NULLS FIRST LIMIT 11";

// ============================================================================
// Text to flat model
// ============================================================================

#[test]
fn test_text_to_flat_model() {
    assert_eq!(to_flat_model(SOQL_ONE), model_one());
}

#[test]
fn test_flat_model_json_shape() {
    let value = serde_json::to_value(to_flat_model(SOQL_ONE)).unwrap();
    assert_eq!(
        value,
        json!({
            "sObject": "Account",
            "fields": ["Name", "Id"],
            "where": {
                "conditions": [
                    {
                        "condition": {
                            "field": { "fieldName": "Name" },
                            "operator": "=",
                            "compareValue": { "type": "STRING", "value": "'pwt'" }
                        },
                        "index": 0
                    },
                    {
                        "condition": {
                            "field": { "fieldName": "Id" },
                            "operator": "=",
                            "compareValue": { "type": "NUMBER", "value": "123456" }
                        },
                        "index": 1
                    }
                ],
                "andOr": "AND"
            },
            "orderBy": [{ "field": "Name", "order": "ASC", "nulls": "NULLS FIRST" }],
            "limit": "11",
            "errors": [],
            "unsupported": [],
            "originalSoqlStatement": ""
        })
    );
}

#[test]
fn test_select_count_to_flat_model() {
    assert_eq!(to_flat_model("SELECT COUNT() FROM Account"), model_count());
}

#[test]
fn test_header_comments_to_flat_model() {
    let expected = ToolingModel {
        header_comments: Some("// Comments here\n".into()),
        sobject: "Foo".into(),
        fields: vec!["Id".into()],
        ..ToolingModel::template()
    };
    assert_eq!(to_flat_model("// Comments here\nSELECT Id FROM Foo"), expected);
}

#[test]
fn test_complex_where_is_unsupported() {
    let model = to_flat_model(
        "Select Name, Id from Account WHERE (Name = 'pwt' AND Id = 123456) OR Id = 654321 \
         ORDER BY Name ASC NULLS FIRST LIMIT 11",
    );
    assert!(model.where_clause.conditions.is_empty());
    assert_eq!(
        model.unsupported,
        vec![UnsupportedItem {
            unmodeled_syntax: "WHERE (Name = 'pwt' AND Id = 123456) OR Id = 654321".into(),
            reason: UnsupportedReason::ComplexGroup,
        }]
    );
    assert_eq!(model.limit, "11");
    assert_eq!(model.order_by.len(), 1);
}

#[test]
fn test_syntax_error_is_isolated() {
    let model = to_flat_model("Select Name from Account GROUP BY");
    assert_eq!(model.sobject, "Account");
    assert_eq!(model.fields, vec!["Name".to_string()]);
    assert_eq!(model.errors.len(), 1);
    assert_eq!(model.errors[0].error_type, ErrorType::UnexpectedEof);
    assert_eq!(
        model.unsupported,
        vec![UnsupportedItem {
            unmodeled_syntax: "GROUP BY".into(),
            reason: UnsupportedReason::GroupBy,
        }]
    );
}

#[test]
fn test_error_positions() {
    let model = to_flat_model("SELECT Id\nFROM Account\nLIMIT");
    assert_eq!(model.errors.len(), 1);
    assert_eq!(model.errors[0].error_type, ErrorType::UnexpectedEof);
    assert_eq!(model.errors[0].line_number, 3);
}

#[test]
fn test_unmodelable_text_keeps_only_errors() {
    let model = to_flat_model("// header\nUPDATE Account");
    assert_eq!(model.header_comments.as_deref(), Some("// header\n"));
    assert!(model.sobject.is_empty());
    assert!(model.fields.is_empty());
    assert_eq!(model.errors[0].error_type, ErrorType::NoSelect);
}

#[test]
fn test_unmodeled_select_and_from() {
    let model = to_flat_model("SELECT Id, Id, Name n, COUNT(Id) FROM Account a USING SCOPE mine");
    assert_eq!(model.fields, vec!["Id".to_string(), "Name".to_string()]);
    let unsupported: Vec<(&str, UnsupportedReason)> = model
        .unsupported
        .iter()
        .map(|u| (u.unmodeled_syntax.as_str(), u.reason))
        .collect();
    assert_eq!(
        unsupported,
        vec![
            ("a", UnsupportedReason::From),
            ("USING SCOPE mine", UnsupportedReason::From),
            ("n", UnsupportedReason::Select),
            ("COUNT(Id)", UnsupportedReason::Select),
        ]
    );
}

#[test]
fn test_verbatim_clause_reasons() {
    let model = to_flat_model(
        "SELECT Id FROM Account WITH SECURITY_ENFORCED GROUP BY Id \
         LIMIT :max OFFSET 5 FOR VIEW",
    );
    let reasons: Vec<UnsupportedReason> = model.unsupported.iter().map(|u| u.reason).collect();
    assert_eq!(
        reasons,
        vec![
            UnsupportedReason::Limit,
            UnsupportedReason::With,
            UnsupportedReason::GroupBy,
            UnsupportedReason::Offset,
            UnsupportedReason::RecordTracking,
        ]
    );
    assert!(model.limit.is_empty());
}

#[test]
fn test_or_conditions() {
    let model = to_flat_model("SELECT Id FROM Account WHERE Name LIKE 'A%' OR Amount >= 10.5");
    assert_eq!(model.where_clause.and_or, Some(AndOr::Or));
    let operators: Vec<Operator> = model
        .where_clause
        .conditions
        .iter()
        .map(|c| c.condition.operator)
        .collect();
    assert_eq!(operators, vec![Operator::Like, Operator::GreaterOrEqual]);
}

// ============================================================================
// Flat model to text
// ============================================================================

#[test]
fn test_flat_model_to_text() {
    assert_eq!(
        to_text(&model_one()),
        "SELECT Name, Id\n  FROM Account\n  WHERE Name = 'pwt' AND Id = 123456\n  \
         ORDER BY Name ASC NULLS FIRST\n  LIMIT 11\n"
    );
}

#[test]
fn test_select_count_to_text() {
    assert!(to_text(&model_count()).contains("SELECT COUNT()"));
}

#[test]
fn test_errors_and_unsupported_are_left_out() {
    let mut model = to_flat_model("Select Name from Account GROUP BY");
    model.original_soql_statement.clear();
    let text = to_text(&model);
    assert!(!text.contains("GROUP BY"));
    assert!(!text.contains("UNEXPECTEDEOF"));
}

#[test]
fn test_header_comments_to_text() {
    let model = ToolingModel {
        header_comments: Some("// Comments here\n".into()),
        sobject: "Foo".into(),
        fields: vec!["Id".into()],
        original_soql_statement: "// Comments here\nSELECT Id FROM Foo".into(),
        ..ToolingModel::template()
    };
    let text = to_text(&model);
    let normalized: String = text
        .lines()
        .map(|line| format!("{}\n", line.trim_start()))
        .collect();
    assert_eq!(normalized, "// Comments here\nSELECT Id\nFROM Foo\n");
}

#[test]
fn test_missing_and_or_joins_with_and() {
    let mut model = model_one();
    model.where_clause.and_or = None;
    assert!(to_text(&model).contains("WHERE Name = 'pwt' AND Id = 123456"));
}

// ============================================================================
// Carrying unmodeled syntax
// ============================================================================

#[test]
fn test_unmodeled_clauses_carry_over() {
    let original = "SELECT Id, Name n, (SELECT Id FROM Contacts) FROM Account a \
                    WHERE Id IN ('1') GROUP BY Id ORDER BY COUNT(Id) LIMIT :max FOR VIEW";
    let mut model = to_flat_model(original);
    model.original_soql_statement = original.into();
    model.fields.push("Industry".into());

    assert_eq!(
        to_text(&model),
        "SELECT Id, Name n, Industry, (SELECT Id FROM Contacts)\n  FROM Account a\n  \
         WHERE Id IN ('1')\n  GROUP BY Id\n  ORDER BY COUNT(Id)\n  LIMIT :max\n  FOR VIEW\n"
    );
}

#[test]
fn test_changed_object_drops_carried_clauses() {
    let original = "SELECT Id FROM Account a GROUP BY Id";
    let mut model = to_flat_model(original);
    model.original_soql_statement = original.into();
    model.sobject = "Contact".into();

    assert_eq!(to_text(&model), "SELECT Id\n  FROM Contact\n");
}

#[test]
fn test_flat_where_replaces_original_where() {
    let original = "SELECT Id FROM Account WHERE Name = 'a'";
    let mut model = to_flat_model(original);
    model.original_soql_statement = original.into();
    model.where_clause.conditions.clear();

    let query = to_structural_model(&model);
    assert!(query.where_clause.is_none());
}

fn regenerated(original: &str) -> (ToolingModel, String) {
    let mut model = to_flat_model(original);
    model.original_soql_statement = original.into();
    let text = to_text(&model);
    (model, text)
}

#[test]
fn test_where_next_to_syntax_error_carries_over() {
    let (model, text) = regenerated("SELECT Id FROM Account WHERE Name = 'x' )");
    assert!(model.where_clause.conditions.is_empty());
    assert_eq!(
        model.unsupported,
        vec![UnsupportedItem {
            unmodeled_syntax: "WHERE Name = 'x'".into(),
            reason: UnsupportedReason::Condition,
        }]
    );
    assert_eq!(text, "SELECT Id\n  FROM Account\n  WHERE Name = 'x'\n");
}

#[test]
fn test_order_by_next_to_syntax_error_carries_over() {
    let (model, text) = regenerated("SELECT Id FROM Account ORDER BY Name )");
    assert!(model.order_by.is_empty());
    assert_eq!(model.unsupported[0].reason, UnsupportedReason::OrderBy);
    assert_eq!(text, "SELECT Id\n  FROM Account\n  ORDER BY Name\n");
}

#[test]
fn test_incomplete_limit_carries_over() {
    let (model, text) = regenerated("SELECT Id FROM Account LIMIT");
    assert!(model.limit.is_empty());
    assert_eq!(
        model.unsupported,
        vec![UnsupportedItem {
            unmodeled_syntax: "LIMIT".into(),
            reason: UnsupportedReason::Limit,
        }]
    );
    assert_eq!(text, "SELECT Id\n  FROM Account\n  LIMIT\n");
}

#[test]
fn test_unsupported_span_survives_clean_original() {
    // After one edit the original is regenerated text that lifts cleanly;
    // the span is still reported unsupported, so it is still emitted.
    let (mut model, text) = regenerated("SELECT Id FROM Account ORDER BY Name )");
    model.original_soql_statement = text;
    model.fields.push("Name".into());
    assert_eq!(
        to_text(&model),
        "SELECT Id, Name\n  FROM Account\n  ORDER BY Name\n"
    );
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_limit_is_canonical() {
    let model = to_flat_model("SELECT Id FROM Account LIMIT 007");
    assert_eq!(model.limit, "7");
    assert_eq!(to_flat_model(&to_text(&model)), model);
}

#[test]
fn test_limit_text_renders_as_written() {
    let model = ToolingModel {
        sobject: "Account".into(),
        fields: vec!["Id".into()],
        limit: "010".into(),
        ..ToolingModel::template()
    };
    assert_eq!(to_text(&model), "SELECT Id\n  FROM Account\n  LIMIT 010\n");
}

#[test]
fn test_model_text_model_is_stable() {
    for text in [
        SOQL_ONE,
        "SELECT COUNT() FROM Account",
        "SELECT Id FROM Contact WHERE CreatedDate > LAST_N_DAYS:7 ORDER BY Name DESC",
        "SELECT Id, Owner.Name FROM Case WHERE IsClosed = false OR Priority = 'High'",
        "SELECT Id FROM Account LIMIT 0050",
    ] {
        let model = to_flat_model(text);
        let again = to_flat_model(&to_text(&model));
        assert_eq!(again, model, "Failed for input: {}", text);
    }
}
