//! Structural model of a SOQL query.
//!
//! Every clause is either modeled (typed fields) or unmodeled (the verbatim
//! source text of the construct). A value built by the deserializer is never
//! mutated afterwards; converters build new values instead.
//!
//! The serde representation matches the JSON the editor tooling exchanges:
//!
//! ```text
//! { "select": { "selectExpressions": [ { "fieldName": "Name" } ] },
//!   "from": { "sobjectName": "Account" },
//!   "where": { "unmodeledSyntax": "WHERE Name = 'x'" } }
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Verbatim source text of a construct outside the modeled subset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmodeledSyntax {
    pub unmodeled_syntax: String,
}

impl UnmodeledSyntax {
    pub fn new(text: impl Into<String>) -> Self {
        UnmodeledSyntax {
            unmodeled_syntax: text.into(),
        }
    }

    pub fn text(&self) -> &str {
        &self.unmodeled_syntax
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub select: Select,
    pub from: FromClause,
    #[serde(rename = "where", skip_serializing_if = "Option::is_none")]
    pub where_clause: Option<Where>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with: Option<UnmodeledSyntax>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_by: Option<UnmodeledSyntax>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderBy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<Limit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<UnmodeledSyntax>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bind: Option<UnmodeledSyntax>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_tracking_type: Option<UnmodeledSyntax>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<UnmodeledSyntax>,
}

impl Query {
    /// Query with the given SELECT and FROM and no other clause.
    pub fn new(select: Select, from: FromClause) -> Self {
        Query {
            select,
            from,
            where_clause: None,
            with: None,
            group_by: None,
            order_by: None,
            limit: None,
            offset: None,
            bind: None,
            record_tracking_type: None,
            update: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Select {
    Exprs(SelectExprs),
    /// Whole clause kept as text, as for `SELECT COUNT()`
    Unmodeled(UnmodeledSyntax),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectExprs {
    pub select_expressions: Vec<SelectExpression>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SelectExpression {
    Field(FieldRef),
    /// Function calls, subqueries, `TYPEOF`
    Unmodeled(UnmodeledSyntax),
}

/// Reference to a field, possibly through relationships (`Owner.Name`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldRef {
    pub field_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<UnmodeledSyntax>,
}

impl FieldRef {
    pub fn new(field_name: impl Into<String>) -> Self {
        FieldRef {
            field_name: field_name.into(),
            alias: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FromClause {
    pub sobject_name: String,
    /// `[AS] alias`, kept as text
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub alias: Option<UnmodeledSyntax>,
    /// `USING SCOPE name`, kept as text
    #[serde(skip_serializing_if = "Option::is_none")]
    pub using: Option<UnmodeledSyntax>,
}

impl FromClause {
    pub fn new(sobject_name: impl Into<String>) -> Self {
        FromClause {
            sobject_name: sobject_name.into(),
            alias: None,
            using: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Where {
    Modeled(WhereExpr),
    Unmodeled(UnmodeledSyntax),
}

/// Comparisons joined by a single boolean operator.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhereExpr {
    pub conditions: Vec<Condition>,
    pub and_or: AndOr,
}

/// `field operator value`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    pub field: FieldRef,
    pub operator: Operator,
    pub compare_value: CompareValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareValue {
    #[serde(rename = "type")]
    pub value_type: LiteralType,
    /// Literal as written in SOQL; string values keep their quotes
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LiteralType {
    String,
    Number,
    Boolean,
    Null,
    Date,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    #[serde(rename = "=")]
    Eq,
    #[serde(rename = "!=")]
    NotEq,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "LIKE")]
    Like,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::NotEq => "!=",
            Operator::LessThan => "<",
            Operator::LessOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AndOr {
    And,
    Or,
}

impl AndOr {
    pub fn as_str(&self) -> &'static str {
        match self {
            AndOr::And => "AND",
            AndOr::Or => "OR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrderBy {
    Modeled(Vec<OrderByExpression>),
    Unmodeled(UnmodeledSyntax),
}

/// `field [ASC|DESC] [NULLS FIRST|NULLS LAST]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderByExpression {
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nulls: Option<Nulls>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Nulls {
    #[serde(rename = "NULLS FIRST")]
    First,
    #[serde(rename = "NULLS LAST")]
    Last,
}

impl Nulls {
    pub fn as_str(&self) -> &'static str {
        match self {
            Nulls::First => "NULLS FIRST",
            Nulls::Last => "NULLS LAST",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Limit {
    Modeled(u64),
    Unmodeled(UnmodeledSyntax),
}
