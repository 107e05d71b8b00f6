//! Flat, UI-facing query model.
//!
//! Only strings and arrays at the top level; this is the shape edit operations
//! act on, the shape persisted as view state, and the shape sent to the
//! editor UI. Equality is plain structural comparison.

use serde::{Deserialize, Serialize};

use crate::{
    ast::ErrorType,
    literal,
    model::{AndOr, Condition, LiteralType, OrderByExpression},
};

/// Sentinel field standing for `SELECT COUNT()`.
pub const SELECT_COUNT: &str = "COUNT()";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolingModel {
    /// Comment lines preceding the query, emitted verbatim before it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header_comments: Option<String>,
    #[serde(rename = "sObject")]
    pub sobject: String,
    pub fields: Vec<String>,
    #[serde(rename = "where")]
    pub where_clause: WhereModel,
    pub order_by: Vec<OrderByExpression>,
    pub limit: String,
    pub errors: Vec<ErrorItem>,
    pub unsupported: Vec<UnsupportedItem>,
    pub original_soql_statement: String,
}

impl ToolingModel {
    /// The empty model every session starts from.
    pub fn template() -> Self {
        ToolingModel::default()
    }

    /// A model selecting [`SELECT_COUNT`] renders as `SELECT COUNT()` and
    /// nothing else in the select list.
    pub fn is_select_count(&self) -> bool {
        self.fields.iter().any(|f| f == SELECT_COUNT)
    }

    /// Rewrite edited values into the form converting the generated text
    /// back would produce: string display values become quoted literals,
    /// conditions are renumbered in index order, a lone condition has no
    /// joining operator and a count limit drops leading zeros.
    pub fn normalize(&mut self) {
        let conditions = &mut self.where_clause.conditions;
        conditions.sort_by_key(|c| c.index);
        for (index, item) in conditions.iter_mut().enumerate() {
            item.index = index;
            let value = &mut item.condition.compare_value;
            if value.value_type == LiteralType::String && !literal::is_quoted(&value.value) {
                value.value = literal::encode(&value.value);
            }
        }
        if conditions.len() < 2 {
            self.where_clause.and_or = None;
        }

        let limit = self.limit.trim();
        if limit.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(count) = limit.parse::<u64>() {
                self.limit = count.to_string();
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WhereModel {
    pub conditions: Vec<WhereCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub and_or: Option<AndOr>,
}

/// A condition plus the index it keeps for updates in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhereCondition {
    pub condition: Condition,
    pub index: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorItem {
    #[serde(rename = "type")]
    pub error_type: ErrorType,
    pub message: String,
    pub line_number: usize,
    pub char_in_line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsupportedItem {
    pub unmodeled_syntax: String,
    pub reason: UnsupportedReason,
}

/// Why a construct that parsed could not be lifted into the flat model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsupportedReason {
    #[serde(rename = "UNMODELED_SELECT")]
    Select,
    #[serde(rename = "UNMODELED_FROM")]
    From,
    /// Parenthesized groups or mixed `AND`/`OR`
    #[serde(rename = "UNMODELED_COMPLEXGROUP")]
    ComplexGroup,
    /// `NOT`, `IN`, `INCLUDES`, functions, bind variables and the like
    #[serde(rename = "UNMODELED_CONDITION")]
    Condition,
    #[serde(rename = "UNMODELED_WITH")]
    With,
    #[serde(rename = "UNMODELED_GROUPBY")]
    GroupBy,
    #[serde(rename = "UNMODELED_ORDERBY")]
    OrderBy,
    #[serde(rename = "UNMODELED_LIMIT")]
    Limit,
    #[serde(rename = "UNMODELED_OFFSET")]
    Offset,
    #[serde(rename = "UNMODELED_BIND")]
    Bind,
    #[serde(rename = "UNMODELED_RECORDTRACKING")]
    RecordTracking,
    #[serde(rename = "UNMODELED_UPDATE")]
    Update,
}

impl UnsupportedReason {
    pub fn code(&self) -> &'static str {
        match self {
            UnsupportedReason::Select => "UNMODELED_SELECT",
            UnsupportedReason::From => "UNMODELED_FROM",
            UnsupportedReason::ComplexGroup => "UNMODELED_COMPLEXGROUP",
            UnsupportedReason::Condition => "UNMODELED_CONDITION",
            UnsupportedReason::With => "UNMODELED_WITH",
            UnsupportedReason::GroupBy => "UNMODELED_GROUPBY",
            UnsupportedReason::OrderBy => "UNMODELED_ORDERBY",
            UnsupportedReason::Limit => "UNMODELED_LIMIT",
            UnsupportedReason::Offset => "UNMODELED_OFFSET",
            UnsupportedReason::Bind => "UNMODELED_BIND",
            UnsupportedReason::RecordTracking => "UNMODELED_RECORDTRACKING",
            UnsupportedReason::Update => "UNMODELED_UPDATE",
        }
    }
}
