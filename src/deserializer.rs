use thiserror::Error;
use tracing::trace;

use crate::{
    ast::{
        ClauseKind, FromExprNode, SelectClauseNode, SelectExprNode, SyntaxTree, TokenRange,
    },
    model::{
        FieldRef, FromClause, Limit, OrderBy, Query, Select, SelectExpression, SelectExprs,
        UnmodeledSyntax, Where,
    },
    parser::Parser,
};

/// The syntax tree lacks a part every query must have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelConstructionError {
    #[error("could not generate query model: no SELECT clause")]
    NoSelect,

    #[error("could not generate query model: no FROM clause")]
    NoFrom,

    #[error("FROM clause is incorrectly specified: expected one object, found {0}")]
    MultipleFrom(usize),
}

/// Builds the structural [`Query`] from a syntax tree.
///
/// `SELECT` and `FROM` are modeled; every other clause is captured as the
/// exact source text between its first and last token.
pub struct ModelDeserializer<'t> {
    tree: &'t SyntaxTree,
}

impl<'t> ModelDeserializer<'t> {
    pub fn new(tree: &'t SyntaxTree) -> Self {
        ModelDeserializer { tree }
    }

    pub fn deserialize(&self) -> Result<Query, ModelConstructionError> {
        let node = self.tree.query.as_ref().ok_or(ModelConstructionError::NoSelect)?;
        let select = node
            .select
            .as_ref()
            .ok_or(ModelConstructionError::NoSelect)?;
        let from = node.from.as_ref().ok_or(ModelConstructionError::NoFrom)?;

        let from_expr = match from.exprs.as_slice() {
            [] => return Err(ModelConstructionError::NoFrom),
            [single] => single,
            many => return Err(ModelConstructionError::MultipleFrom(many.len())),
        };

        let mut query = Query::new(self.select(select), self.from(from_expr));

        let clause = |kind: ClauseKind| {
            node.clause(kind)
                .map(|clause| self.unmodeled(clause.range))
        };
        query.where_clause = clause(ClauseKind::Where).map(Where::Unmodeled);
        query.with = clause(ClauseKind::With);
        query.group_by = clause(ClauseKind::GroupBy);
        query.order_by = clause(ClauseKind::OrderBy).map(OrderBy::Unmodeled);
        query.limit = clause(ClauseKind::Limit).map(Limit::Unmodeled);
        query.offset = clause(ClauseKind::Offset);
        query.bind = clause(ClauseKind::Bind);
        query.record_tracking_type = clause(ClauseKind::RecordTracking);
        query.update = clause(ClauseKind::Update);

        trace!(sobject = %query.from.sobject_name, "deserialized query model");
        Ok(query)
    }

    fn unmodeled(&self, range: TokenRange) -> UnmodeledSyntax {
        UnmodeledSyntax::new(self.tree.text(range))
    }

    fn select(&self, node: &SelectClauseNode) -> Select {
        match node {
            SelectClauseNode::Count { range } => Select::Unmodeled(self.unmodeled(*range)),
            SelectClauseNode::Exprs { exprs, .. } => Select::Exprs(SelectExprs {
                select_expressions: exprs.iter().map(|e| self.select_expression(e)).collect(),
            }),
        }
    }

    fn select_expression(&self, node: &SelectExprNode) -> SelectExpression {
        match node {
            SelectExprNode::Column { range, field, alias } => {
                let field_text = self.tree.text(*field);
                // function calls are recognized by their parentheses
                if field_text.contains('(') {
                    SelectExpression::Unmodeled(self.unmodeled(*range))
                } else {
                    SelectExpression::Field(FieldRef {
                        field_name: field_text.to_string(),
                        alias: alias.map(|a| self.unmodeled(a)),
                    })
                }
            }
            SelectExprNode::Subquery { range } | SelectExprNode::TypeOf { range } => {
                SelectExpression::Unmodeled(self.unmodeled(*range))
            }
        }
    }

    fn from(&self, node: &FromExprNode) -> FromClause {
        let sobject_name = self.tree.text(node.object).to_string();

        let alias = match (node.as_keyword, node.alias) {
            (Some(as_index), Some(alias)) => {
                Some(self.unmodeled(TokenRange::new(as_index, alias.stop)))
            }
            (Some(as_index), None) => Some(self.unmodeled(TokenRange::single(as_index))),
            (None, Some(alias)) => Some(self.unmodeled(alias)),
            (None, None) => None,
        };

        FromClause {
            sobject_name,
            alias,
            using: node.using.map(|range| self.unmodeled(range)),
        }
    }
}

/// Parse `text` and build its structural model.
pub fn deserialize_text(text: &str) -> Result<Query, ModelConstructionError> {
    let tree = Parser::parse(text);
    ModelDeserializer::new(&tree).deserialize()
}
