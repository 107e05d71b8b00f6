// tests/parser_tests.rs

use soql_model::ast::{ClauseKind, ErrorType, SelectClauseNode, SelectExprNode, SyntaxTree};
use soql_model::parser::Parser;

fn error_types(tree: &SyntaxTree) -> Vec<ErrorType> {
    tree.errors.iter().map(|e| e.error_type).collect()
}

// ============================================================================
// SELECT
// ============================================================================

#[test]
fn test_select_expressions() {
    let tree = Parser::parse("SELECT Id, Owner.Name, COUNT(Id) total FROM Account");
    assert!(!tree.has_errors());

    let query = tree.query.as_ref().unwrap();
    let Some(SelectClauseNode::Exprs { exprs, .. }) = &query.select else {
        panic!("Expected select expressions");
    };
    let texts: Vec<&str> = exprs.iter().map(|e| tree.text(e.range())).collect();
    assert_eq!(texts, vec!["Id", "Owner.Name", "COUNT(Id) total"]);

    match &exprs[2] {
        SelectExprNode::Column { field, alias, .. } => {
            assert_eq!(tree.text(*field), "COUNT(Id)");
            assert_eq!(alias.map(|a| tree.text(a)), Some("total"));
        }
        _ => panic!("Expected column"),
    }
}

#[test]
fn test_select_count() {
    let tree = Parser::parse("SELECT COUNT() FROM Account");
    let query = tree.query.as_ref().unwrap();
    match &query.select {
        Some(SelectClauseNode::Count { range }) => assert_eq!(tree.text(*range), "SELECT COUNT()"),
        _ => panic!("Expected COUNT()"),
    }
}

#[test]
fn test_subquery_and_typeof() {
    let tree = Parser::parse(
        "SELECT (SELECT Id FROM Contacts), TYPEOF What WHEN Account THEN Name END FROM Event",
    );
    assert!(!tree.has_errors());
    let query = tree.query.as_ref().unwrap();
    let Some(SelectClauseNode::Exprs { exprs, .. }) = &query.select else {
        panic!("Expected select expressions");
    };
    assert!(matches!(exprs[0], SelectExprNode::Subquery { .. }));
    assert!(matches!(exprs[1], SelectExprNode::TypeOf { .. }));
    assert_eq!(
        tree.text(exprs[1].range()),
        "TYPEOF What WHEN Account THEN Name END"
    );
}

#[test]
fn test_missing_select() {
    let tree = Parser::parse("FROM Account");
    assert!(tree.query.is_none());
    assert_eq!(error_types(&tree), vec![ErrorType::NoSelect]);
}

#[test]
fn test_no_selections() {
    let tree = Parser::parse("SELECT FROM Account");
    assert_eq!(error_types(&tree), vec![ErrorType::NoSelections]);
}

// ============================================================================
// FROM
// ============================================================================

#[test]
fn test_from_alias_and_scope() {
    let tree = Parser::parse("SELECT Id FROM Account AS a USING SCOPE mine");
    assert!(!tree.has_errors());
    let from = tree.query.as_ref().unwrap().from.as_ref().unwrap();
    let expr = &from.exprs[0];
    assert_eq!(tree.text(expr.object), "Account");
    assert!(expr.as_keyword.is_some());
    assert_eq!(expr.alias.map(|a| tree.text(a)), Some("a"));
    assert_eq!(expr.using.map(|u| tree.text(u)), Some("USING SCOPE mine"));
}

#[test]
fn test_missing_from() {
    let tree = Parser::parse("SELECT Id");
    assert_eq!(error_types(&tree), vec![ErrorType::NoFrom]);
}

#[test]
fn test_incomplete_from() {
    let tree = Parser::parse("SELECT Id FROM");
    assert_eq!(error_types(&tree), vec![ErrorType::UnexpectedEof]);
    let tree = Parser::parse("SELECT Id FROM WHERE Id = '1'");
    assert_eq!(error_types(&tree), vec![ErrorType::IncompleteFrom]);
}

// ============================================================================
// Trailing clauses
// ============================================================================

#[test]
fn test_clause_ranges() {
    let tree = Parser::parse(
        "SELECT Id FROM Account WHERE (A = 1 OR B = 2) AND C IN (SELECT Id FROM X) \
         GROUP BY Id ORDER BY Id DESC LIMIT 10 OFFSET 5",
    );
    assert!(!tree.has_errors());
    let query = tree.query.as_ref().unwrap();
    let text = |kind| tree.text(query.clause(kind).unwrap().range);
    assert_eq!(
        text(ClauseKind::Where),
        "WHERE (A = 1 OR B = 2) AND C IN (SELECT Id FROM X)"
    );
    assert_eq!(text(ClauseKind::GroupBy), "GROUP BY Id");
    assert_eq!(text(ClauseKind::OrderBy), "ORDER BY Id DESC");
    assert_eq!(text(ClauseKind::Limit), "LIMIT 10");
    assert_eq!(text(ClauseKind::Offset), "OFFSET 5");
}

#[test]
fn test_record_tracking_and_update() {
    let tree = Parser::parse("SELECT Id FROM Account FOR REFERENCE");
    let query = tree.query.as_ref().unwrap();
    assert_eq!(
        tree.text(query.clause(ClauseKind::RecordTracking).unwrap().range),
        "FOR REFERENCE"
    );

    let tree = Parser::parse("SELECT Id FROM Knowledge__kav UPDATE VIEWSTAT");
    let query = tree.query.as_ref().unwrap();
    assert_eq!(
        tree.text(query.clause(ClauseKind::Update).unwrap().range),
        "UPDATE VIEWSTAT"
    );
}

#[test]
fn test_incomplete_clause_keeps_node() {
    let tree = Parser::parse("Select Name from Account GROUP BY");
    assert_eq!(error_types(&tree), vec![ErrorType::UnexpectedEof]);
    let clause = tree
        .query
        .as_ref()
        .unwrap()
        .clause(ClauseKind::GroupBy)
        .unwrap();
    assert!(!clause.complete);
    assert_eq!(tree.text(clause.range), "GROUP BY");
}

#[test]
fn test_incomplete_limit() {
    let tree = Parser::parse("SELECT Id FROM Account LIMIT OFFSET 5");
    assert_eq!(error_types(&tree), vec![ErrorType::IncompleteLimit]);
}

#[test]
fn test_out_of_order_clause() {
    let tree = Parser::parse("SELECT Id FROM Account LIMIT 5 WHERE Id = '1'");
    assert_eq!(error_types(&tree), vec![ErrorType::UnexpectedToken]);
}

#[test]
fn test_error_location() {
    let tree = Parser::parse("SELECT Id\nFROM Account\nWHERE");
    let error = &tree.errors[0];
    assert_eq!(error.error_type, ErrorType::UnexpectedEof);
    assert_eq!(error.line, 3);
    assert_eq!(error.column, 5);
}

#[test]
fn test_unterminated_string_is_reported() {
    let tree = Parser::parse("SELECT Id FROM Account WHERE Name = 'abc");
    assert!(error_types(&tree).contains(&ErrorType::UnterminatedString));
}
