//! Conversion between query text, the structural [`Query`] and the flat
//! [`ToolingModel`] the editor UI works with.

mod clauses;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::{
    ast::{ClauseKind, ErrorType, QueryNode, SyntaxError},
    deserializer::{ModelConstructionError, ModelDeserializer},
    model::{
        AndOr, FieldRef, FromClause, Limit, OrderBy, Query, Select, SelectExpression,
        SelectExprs, UnmodeledSyntax, Where, WhereExpr,
    },
    parser::Parser,
    tooling_model::{
        ErrorItem, SELECT_COUNT, ToolingModel, UnsupportedItem, UnsupportedReason, WhereCondition,
        WhereModel,
    },
};

use clauses::{interpret_limit, interpret_order_by, interpret_where};

/// Leading blank lines and `//` comment lines, up to the first token.
static HEADER_COMMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\A(?:[ \t]*(?://[^\n]*)?\n)*(?:[ \t]*//[^\n]*\z)?")
        .expect("header comment pattern is valid")
});

const SELECT_COUNT_CLAUSE: &str = "SELECT COUNT()";

/// Comment block that precedes the query, if it holds any comment.
pub fn header_comments(text: &str) -> Option<String> {
    HEADER_COMMENTS
        .find(text)
        .map(|m| m.as_str())
        .filter(|block| block.contains("//"))
        .map(str::to_string)
}

/// Parse `text` into the flat model.
///
/// Never fails: syntax errors land in `errors`, parsed constructs outside
/// the modeled subset land in `unsupported`. `originalSoqlStatement` is left
/// empty.
pub fn to_flat_model(text: &str) -> ToolingModel {
    let mut model = ToolingModel::template();
    model.header_comments = header_comments(text);

    let tree = Parser::parse(text);
    model.errors = tree.errors.iter().map(error_item).collect();

    let query = match ModelDeserializer::new(&tree).deserialize() {
        Ok(query) => query,
        Err(e) => {
            debug!(error = %e, "query text could not be modeled");
            add_construction_error(&mut model, &e);
            return model;
        }
    };

    let node = tree.query.clone().unwrap_or_default();
    FlatModelBuilder::new(&mut model, &node).build(&query);
    debug!(
        sobject = %model.sobject,
        fields = model.fields.len(),
        unsupported = model.unsupported.len(),
        errors = model.errors.len(),
        "converted query text to flat model"
    );
    model
}

fn error_item(error: &SyntaxError) -> ErrorItem {
    ErrorItem {
        error_type: error.error_type,
        message: error.message.clone(),
        line_number: error.line,
        char_in_line: error.column,
    }
}

fn add_construction_error(model: &mut ToolingModel, error: &ModelConstructionError) {
    let error_type = match error {
        ModelConstructionError::NoSelect => ErrorType::NoSelect,
        ModelConstructionError::NoFrom | ModelConstructionError::MultipleFrom(_) => {
            ErrorType::NoFrom
        }
    };
    let reported = model.errors.iter().any(|e| {
        e.error_type == error_type
            || (error_type == ErrorType::NoFrom && e.error_type == ErrorType::IncompleteFrom)
    });
    if !reported {
        model.errors.push(ErrorItem {
            error_type,
            message: error.to_string(),
            line_number: 1,
            char_in_line: 0,
        });
    }
}

/// Fills a template model from a deserialized query.
struct FlatModelBuilder<'m> {
    model: &'m mut ToolingModel,
    node: &'m QueryNode,
}

impl<'m> FlatModelBuilder<'m> {
    fn new(model: &'m mut ToolingModel, node: &'m QueryNode) -> Self {
        FlatModelBuilder { model, node }
    }

    fn build(mut self, query: &Query) {
        self.from(&query.from);
        self.select(&query.select);

        if let Some(where_clause) = &query.where_clause {
            self.where_clause(where_clause);
        }
        if let Some(order_by) = &query.order_by {
            self.order_by(order_by);
        }
        if let Some(limit) = &query.limit {
            self.limit(limit);
        }

        let verbatim = [
            (&query.with, UnsupportedReason::With),
            (&query.group_by, UnsupportedReason::GroupBy),
            (&query.offset, UnsupportedReason::Offset),
            (&query.bind, UnsupportedReason::Bind),
            (&query.record_tracking_type, UnsupportedReason::RecordTracking),
            (&query.update, UnsupportedReason::Update),
        ];
        for (clause, reason) in verbatim {
            if let Some(syntax) = clause {
                self.unsupported(syntax.text(), reason);
            }
        }
    }

    fn unsupported(&mut self, syntax: &str, reason: UnsupportedReason) {
        self.model.unsupported.push(UnsupportedItem {
            unmodeled_syntax: syntax.to_string(),
            reason,
        });
    }

    fn complete(&self, kind: ClauseKind) -> bool {
        self.node.clause(kind).is_none_or(|clause| clause.complete)
    }

    fn from(&mut self, from: &FromClause) {
        self.model.sobject = from.sobject_name.clone();
        for syntax in [&from.alias, &from.using].into_iter().flatten() {
            self.unsupported(syntax.text(), UnsupportedReason::From);
        }
    }

    fn select(&mut self, select: &Select) {
        match select {
            Select::Unmodeled(_) => self.model.fields = vec![SELECT_COUNT.to_string()],
            Select::Exprs(exprs) => {
                for expr in &exprs.select_expressions {
                    match expr {
                        SelectExpression::Field(field) => {
                            if !self.model.fields.contains(&field.field_name) {
                                self.model.fields.push(field.field_name.clone());
                            }
                            if let Some(alias) = &field.alias {
                                self.unsupported(alias.text(), UnsupportedReason::Select);
                            }
                        }
                        SelectExpression::Unmodeled(syntax) => {
                            self.unsupported(syntax.text(), UnsupportedReason::Select)
                        }
                    }
                }
            }
        }
    }

    fn where_clause(&mut self, where_clause: &Where) {
        let syntax = match where_clause {
            Where::Unmodeled(syntax) => syntax.text(),
            Where::Modeled(expr) => {
                self.model.where_clause = flat_where(expr);
                return;
            }
        };

        if !self.complete(ClauseKind::Where) {
            self.unsupported(syntax, UnsupportedReason::Condition);
            return;
        }

        match interpret_where(syntax) {
            Ok((conditions, and_or)) => {
                self.model.where_clause = WhereModel {
                    conditions: conditions
                        .into_iter()
                        .enumerate()
                        .map(|(index, condition)| WhereCondition { condition, index })
                        .collect(),
                    and_or,
                };
            }
            Err(reason) => self.unsupported(syntax, reason),
        }
    }

    fn order_by(&mut self, order_by: &OrderBy) {
        match order_by {
            OrderBy::Modeled(items) => self.model.order_by = items.clone(),
            OrderBy::Unmodeled(syntax) => {
                let items = self
                    .complete(ClauseKind::OrderBy)
                    .then(|| interpret_order_by(syntax.text()))
                    .flatten();
                match items {
                    Some(items) => self.model.order_by = items,
                    None => self.unsupported(syntax.text(), UnsupportedReason::OrderBy),
                }
            }
        }
    }

    fn limit(&mut self, limit: &Limit) {
        match limit {
            Limit::Modeled(count) => self.model.limit = count.to_string(),
            Limit::Unmodeled(syntax) => {
                let count = self
                    .complete(ClauseKind::Limit)
                    .then(|| interpret_limit(syntax.text()))
                    .flatten();
                match count {
                    Some(count) => self.model.limit = count,
                    None => self.unsupported(syntax.text(), UnsupportedReason::Limit),
                }
            }
        }
    }
}

fn flat_where(expr: &WhereExpr) -> WhereModel {
    WhereModel {
        conditions: expr
            .conditions
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, condition)| WhereCondition { condition, index })
            .collect(),
        and_or: (expr.conditions.len() > 1).then_some(expr.and_or),
    }
}

/// Build the structural model for a flat model.
///
/// Comparisons, order items and the limit come from the flat fields. When
/// `originalSoqlStatement` still models, the verbatim pieces the flat model
/// cannot hold are carried over from it where they still apply. A WHERE,
/// ORDER BY or LIMIT clause is carried only while it is an unsupported span,
/// so a clause the user cleared stays cleared.
pub fn to_structural_model(flat: &ToolingModel) -> Query {
    let original = Original::parse(flat);
    let same_object = original
        .as_ref()
        .is_some_and(|o| o.query.from.sobject_name.eq_ignore_ascii_case(&flat.sobject));
    let carried = original.as_ref().filter(|_| same_object).map(|o| &o.query);

    let select = if flat.is_select_count() {
        Select::Unmodeled(UnmodeledSyntax::new(SELECT_COUNT_CLAUSE))
    } else {
        structural_select(flat, original.as_ref().map(|o| &o.query), carried)
    };

    let mut from = FromClause::new(flat.sobject.clone());
    if let Some(original) = carried {
        from.alias = original.from.alias.clone();
        from.using = original.from.using.clone();
    }

    let mut query = Query::new(select, from);

    query.where_clause = if flat.where_clause.conditions.is_empty() {
        original.as_ref().and_then(|o| {
            o.query
                .where_clause
                .as_ref()
                .filter(|w| unmodeled_text(w).is_some_and(|t| o.is_unsupported(flat, t)))
                .cloned()
        })
    } else {
        let mut conditions = flat.where_clause.conditions.clone();
        conditions.sort_by_key(|c| c.index);
        Some(Where::Modeled(WhereExpr {
            conditions: conditions.into_iter().map(|c| c.condition).collect(),
            and_or: flat.where_clause.and_or.unwrap_or(AndOr::And),
        }))
    };

    query.order_by = if flat.order_by.is_empty() {
        original.as_ref().and_then(|o| {
            o.query
                .order_by
                .as_ref()
                .filter(|order_by| match order_by {
                    OrderBy::Unmodeled(syntax) => o.is_unsupported(flat, syntax.text()),
                    OrderBy::Modeled(_) => false,
                })
                .cloned()
        })
    } else {
        Some(OrderBy::Modeled(flat.order_by.clone()))
    };

    let limit = flat.limit.trim();
    query.limit = if limit.is_empty() {
        original.as_ref().and_then(|o| {
            o.query
                .limit
                .as_ref()
                .filter(|l| match l {
                    Limit::Unmodeled(syntax) => o.is_unsupported(flat, syntax.text()),
                    Limit::Modeled(_) => false,
                })
                .cloned()
        })
    } else {
        // Anything but a canonical count is rendered as written.
        match limit.parse::<u64>() {
            Ok(count) if count.to_string() == limit => Some(Limit::Modeled(count)),
            _ => Some(Limit::Unmodeled(UnmodeledSyntax::new(format!(
                "LIMIT {}",
                limit
            )))),
        }
    };

    if let Some(original) = carried {
        query.with = original.with.clone();
        query.group_by = original.group_by.clone();
        query.offset = original.offset.clone();
        query.bind = original.bind.clone();
        query.record_tracking_type = original.record_tracking_type.clone();
        query.update = original.update.clone();
    }

    query
}

/// The query held in `originalSoqlStatement`, with the spans its own
/// conversion reports as unsupported.
struct Original {
    query: Query,
    unsupported: Vec<UnsupportedItem>,
}

impl Original {
    fn parse(flat: &ToolingModel) -> Option<Self> {
        if flat.original_soql_statement.trim().is_empty() {
            return None;
        }
        let tree = Parser::parse(&flat.original_soql_statement);
        let query = ModelDeserializer::new(&tree).deserialize().ok()?;

        let mut lifted = ToolingModel::template();
        let node = tree.query.clone().unwrap_or_default();
        FlatModelBuilder::new(&mut lifted, &node).build(&query);
        Some(Original {
            query,
            unsupported: lifted.unsupported,
        })
    }

    /// Whether `text` is a span the flat model could not hold, either as the
    /// flat model reports it or as converting the original text reports it.
    fn is_unsupported(&self, flat: &ToolingModel, text: &str) -> bool {
        flat.unsupported
            .iter()
            .chain(&self.unsupported)
            .any(|item| item.unmodeled_syntax == text)
    }
}

fn unmodeled_text(where_clause: &Where) -> Option<&str> {
    match where_clause {
        Where::Unmodeled(syntax) => Some(syntax.text()),
        Where::Modeled(_) => None,
    }
}

fn structural_select(
    flat: &ToolingModel,
    original: Option<&Query>,
    carried: Option<&Query>,
) -> Select {
    let original_fields: Vec<&FieldRef> = match original.map(|q| &q.select) {
        Some(Select::Exprs(exprs)) => exprs
            .select_expressions
            .iter()
            .filter_map(|e| match e {
                SelectExpression::Field(field) => Some(field),
                SelectExpression::Unmodeled(_) => None,
            })
            .collect(),
        _ => Vec::new(),
    };

    let mut select_expressions: Vec<SelectExpression> = flat
        .fields
        .iter()
        .map(|name| {
            let alias = original_fields
                .iter()
                .find(|f| &f.field_name == name)
                .and_then(|f| f.alias.clone());
            SelectExpression::Field(FieldRef {
                field_name: name.clone(),
                alias,
            })
        })
        .collect();

    if let Some(Select::Exprs(exprs)) = carried.map(|q| &q.select) {
        select_expressions.extend(
            exprs
                .select_expressions
                .iter()
                .filter(|e| matches!(e, SelectExpression::Unmodeled(_)))
                .cloned(),
        );
    }

    Select::Exprs(SelectExprs { select_expressions })
}
