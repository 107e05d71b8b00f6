// tests/deserializer_tests.rs

use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use soql_model::deserializer::{ModelConstructionError, deserialize_text};

fn model_json(text: &str) -> Value {
    let query = deserialize_text(text).unwrap();
    serde_json::to_value(&query).unwrap()
}

fn select_expressions() -> Vec<Value> {
    vec![
        json!({ "fieldName": "field1" }),
        json!({ "fieldName": "field2" }),
        json!({ "fieldName": "field3", "alias": { "unmodeledSyntax": "alias3" } }),
        json!({ "unmodeledSyntax": "(SELECT fieldA FROM objectA)" }),
        json!({ "unmodeledSyntax": "TYPEOF obj WHEN typeX THEN fieldX ELSE fieldY END" }),
    ]
}

// ============================================================================
// SELECT and FROM
// ============================================================================

#[test]
fn test_supported_syntax_is_modeled() {
    assert_eq!(
        model_json("SELECT field1, field2 FROM object1"),
        json!({
            "select": { "selectExpressions": &select_expressions()[..2] },
            "from": { "sobjectName": "object1" }
        })
    );
}

#[test]
fn test_from_as_and_using_are_unmodeled() {
    assert_eq!(
        model_json("SELECT field1, field2 FROM object1 AS objectAs USING SCOPE everything"),
        json!({
            "select": { "selectExpressions": &select_expressions()[..2] },
            "from": {
                "sobjectName": "object1",
                "as": { "unmodeledSyntax": "AS objectAs" },
                "using": { "unmodeledSyntax": "USING SCOPE everything" }
            }
        })
    );
}

#[test]
fn test_bare_from_alias_is_unmodeled() {
    assert_eq!(
        model_json("SELECT Id FROM Account acct")["from"],
        json!({ "sobjectName": "Account", "as": { "unmodeledSyntax": "acct" } })
    );
}

#[test]
fn test_subqueries_typeof_and_aliases_are_unmodeled() {
    assert_eq!(
        model_json(
            "SELECT field1, field2, field3 alias3, (SELECT fieldA FROM objectA), \
             TYPEOF obj WHEN typeX THEN fieldX ELSE fieldY END FROM object1"
        ),
        json!({
            "select": { "selectExpressions": select_expressions() },
            "from": { "sobjectName": "object1" }
        })
    );
}

#[test]
fn test_function_calls_are_unmodeled() {
    assert_eq!(
        model_json("SELECT COUNT(Id) total, Name FROM Account")["select"],
        json!({
            "selectExpressions": [
                { "unmodeledSyntax": "COUNT(Id) total" },
                { "fieldName": "Name" }
            ]
        })
    );
}

#[test]
fn test_select_count_is_unmodeled() {
    assert_eq!(
        model_json("SELECT COUNT() FROM object1"),
        json!({
            "select": { "unmodeledSyntax": "SELECT COUNT()" },
            "from": { "sobjectName": "object1" }
        })
    );
}

// ============================================================================
// Remaining clauses
// ============================================================================

#[test]
fn test_all_other_clauses_are_unmodeled() {
    let text = "SELECT field1, field2, field3 alias3, (SELECT fieldA FROM objectA), \
                TYPEOF obj WHEN typeX THEN fieldX ELSE fieldY END FROM object1 \
                WHERE field1 = 5 WITH DATA CATEGORY cat__c AT val__c GROUP BY field1 \
                ORDER BY field2 DESC NULLS LAST LIMIT 20 OFFSET 2 BIND field1 = 5 \
                FOR VIEW UPDATE TRACKING";
    assert_eq!(
        model_json(text),
        json!({
            "select": { "selectExpressions": select_expressions() },
            "from": { "sobjectName": "object1" },
            "where": { "unmodeledSyntax": "WHERE field1 = 5" },
            "with": { "unmodeledSyntax": "WITH DATA CATEGORY cat__c AT val__c" },
            "groupBy": { "unmodeledSyntax": "GROUP BY field1" },
            "orderBy": { "unmodeledSyntax": "ORDER BY field2 DESC NULLS LAST" },
            "limit": { "unmodeledSyntax": "LIMIT 20" },
            "offset": { "unmodeledSyntax": "OFFSET 2" },
            "bind": { "unmodeledSyntax": "BIND field1 = 5" },
            "recordTrackingType": { "unmodeledSyntax": "FOR VIEW" },
            "update": { "unmodeledSyntax": "UPDATE TRACKING" }
        })
    );
}

#[test]
fn test_captured_text_is_exact_source() {
    let json = model_json("select Id from Account where  Name   =   'a  b'\n  order by Name");
    assert_eq!(json["where"]["unmodeledSyntax"], "where  Name   =   'a  b'");
    assert_eq!(json["orderBy"]["unmodeledSyntax"], "order by Name");
}

#[test]
fn test_incomplete_clause_still_models_the_rest() {
    let json = model_json("SELECT Name FROM Account GROUP BY");
    assert_eq!(json["from"]["sobjectName"], "Account");
    assert_eq!(json["groupBy"]["unmodeledSyntax"], "GROUP BY");
}

// ============================================================================
// Construction errors
// ============================================================================

#[test]
fn test_missing_select() {
    assert_eq!(
        deserialize_text("FROM Account").unwrap_err(),
        ModelConstructionError::NoSelect
    );
}

#[test]
fn test_missing_from() {
    assert_eq!(
        deserialize_text("SELECT Id").unwrap_err(),
        ModelConstructionError::NoFrom
    );
}

#[test]
fn test_multiple_from_objects() {
    assert_eq!(
        deserialize_text("SELECT Id FROM Account, Contact").unwrap_err(),
        ModelConstructionError::MultipleFrom(2)
    );
}
