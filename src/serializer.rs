//! Query text generation.
//!
//! The serializer renders a structural [`Query`] one clause per line in
//! canonical order. The first line starts at column zero and every following
//! line is indented; each line ends with a newline. Clauses with nothing to
//! show are omitted.
//!
//! ```
//! use soql_model::serializer::to_text;
//! use soql_model::tooling_model::ToolingModel;
//!
//! let mut model = ToolingModel::template();
//! model.sobject = "Account".to_string();
//! model.fields = vec!["Id".to_string(), "Name".to_string()];
//! assert_eq!(to_text(&model), "SELECT Id, Name\n  FROM Account\n");
//! ```

use crate::{
    convert::to_structural_model,
    literal,
    model::{
        Condition, LiteralType, Limit, OrderBy, OrderByExpression, Query, Select,
        SelectExpression, Where,
    },
    tooling_model::ToolingModel,
};

/// Layout settings for generated text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatOptions {
    /// Spaces before every clause after the first
    pub indent: usize,
}

impl Default for FormatOptions {
    fn default() -> Self {
        FormatOptions { indent: 2 }
    }
}

/// Render the flat model as query text with default formatting.
pub fn to_text(flat: &ToolingModel) -> String {
    to_text_with(flat, &FormatOptions::default())
}

/// Render the flat model as query text, header comments first.
pub fn to_text_with(flat: &ToolingModel, options: &FormatOptions) -> String {
    let query = to_structural_model(flat);
    let mut text = flat.header_comments.clone().unwrap_or_default();
    text.push_str(&render_query(&query, options));
    text
}

/// Render a structural model as query text.
pub fn render_query(query: &Query, options: &FormatOptions) -> String {
    QueryPrinter::new(options).print(query)
}

pub struct QueryPrinter<'o> {
    options: &'o FormatOptions,
}

impl<'o> QueryPrinter<'o> {
    pub fn new(options: &'o FormatOptions) -> Self {
        QueryPrinter { options }
    }

    pub fn print(&self, query: &Query) -> String {
        let lines = self.clauses(query);
        let indent = " ".repeat(self.options.indent);

        let mut result = String::new();
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                result.push_str(&indent);
            }
            result.push_str(line);
            result.push('\n');
        }
        result
    }

    fn clauses(&self, query: &Query) -> Vec<String> {
        let mut lines = Vec::new();

        if let Some(select) = self.print_select(&query.select) {
            lines.push(select);
        }

        if !query.from.sobject_name.is_empty() {
            let mut from = format!("FROM {}", query.from.sobject_name);
            for syntax in [&query.from.alias, &query.from.using].into_iter().flatten() {
                from.push(' ');
                from.push_str(syntax.text());
            }
            lines.push(from);
        }

        if let Some(where_clause) = query.where_clause.as_ref().and_then(print_where) {
            lines.push(where_clause);
        }
        lines.extend(query.with.as_ref().map(|s| s.text().to_string()));
        lines.extend(query.group_by.as_ref().map(|s| s.text().to_string()));
        if let Some(order_by) = query.order_by.as_ref().and_then(print_order_by) {
            lines.push(order_by);
        }
        lines.extend(query.limit.as_ref().map(|limit| match limit {
            Limit::Modeled(count) => format!("LIMIT {}", count),
            Limit::Unmodeled(syntax) => syntax.text().to_string(),
        }));

        let trailing = [
            &query.offset,
            &query.bind,
            &query.record_tracking_type,
            &query.update,
        ];
        lines.extend(
            trailing
                .into_iter()
                .flatten()
                .map(|syntax| syntax.text().to_string()),
        );

        lines
    }

    fn print_select(&self, select: &Select) -> Option<String> {
        match select {
            Select::Unmodeled(syntax) => Some(syntax.text().to_string()),
            Select::Exprs(exprs) if exprs.select_expressions.is_empty() => None,
            Select::Exprs(exprs) => {
                let items: Vec<String> = exprs
                    .select_expressions
                    .iter()
                    .map(|expr| match expr {
                        SelectExpression::Field(field) => match &field.alias {
                            Some(alias) => format!("{} {}", field.field_name, alias.text()),
                            None => field.field_name.clone(),
                        },
                        SelectExpression::Unmodeled(syntax) => syntax.text().to_string(),
                    })
                    .collect();
                Some(format!("SELECT {}", items.join(", ")))
            }
        }
    }
}

fn print_where(where_clause: &Where) -> Option<String> {
    match where_clause {
        Where::Unmodeled(syntax) => Some(syntax.text().to_string()),
        Where::Modeled(expr) if expr.conditions.is_empty() => None,
        Where::Modeled(expr) => {
            let separator = format!(" {} ", expr.and_or.as_str());
            let conditions: Vec<String> = expr.conditions.iter().map(print_condition).collect();
            Some(format!("WHERE {}", conditions.join(&separator)))
        }
    }
}

/// `field operator value`; string values that are not yet literals get quoted
/// and escaped.
pub fn print_condition(condition: &Condition) -> String {
    let value = &condition.compare_value;
    let rendered = match value.value_type {
        LiteralType::String if !literal::is_quoted(&value.value) => literal::encode(&value.value),
        _ => value.value.clone(),
    };
    format!(
        "{} {} {}",
        condition.field.field_name, condition.operator, rendered
    )
}

fn print_order_by(order_by: &OrderBy) -> Option<String> {
    match order_by {
        OrderBy::Unmodeled(syntax) => Some(syntax.text().to_string()),
        OrderBy::Modeled(items) if items.is_empty() => None,
        OrderBy::Modeled(items) => {
            let items: Vec<String> = items.iter().map(print_order_by_item).collect();
            Some(format!("ORDER BY {}", items.join(", ")))
        }
    }
}

fn print_order_by_item(item: &OrderByExpression) -> String {
    let mut text = item.field.clone();
    if let Some(order) = item.order {
        text.push(' ');
        text.push_str(order.as_str());
    }
    if let Some(nulls) = item.nulls {
        text.push(' ');
        text.push_str(nulls.as_str());
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CompareValue, FieldRef, Operator};
    use pretty_assertions::assert_eq;

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

    #[test]
    fn quoted_string_values_are_kept() {
        let c = condition("Name", LiteralType::String, "'pwt'");
        assert_eq!(print_condition(&c), "Name = 'pwt'");
    }

    #[test]
    fn bare_string_values_are_encoded() {
        let c = condition("Name", LiteralType::String, "it's");
        assert_eq!(print_condition(&c), r"Name = 'it\'s'");
    }

    #[test]
    fn other_values_are_verbatim() {
        let c = condition("CloseDate", LiteralType::Date, "LAST_N_DAYS:30");
        assert_eq!(print_condition(&c), "CloseDate = LAST_N_DAYS:30");
    }

    #[test]
    fn custom_indent() {
        let mut model = ToolingModel::template();
        model.sobject = "Contact".into();
        model.fields = vec!["Id".into()];
        model.limit = "5".into();
        let text = to_text_with(&model, &FormatOptions { indent: 4 });
        assert_eq!(text, "SELECT Id\n    FROM Contact\n    LIMIT 5\n");
    }

    #[test]
    fn structural_query_keeps_verbatim_clauses() {
        let query = crate::deserializer::deserialize_text(
            "SELECT Id, Name n FROM Account a GROUP BY Id LIMIT :max",
        )
        .unwrap();
        assert_eq!(
            render_query(&query, &FormatOptions { indent: 1 }),
            "SELECT Id, Name n\n FROM Account a\n GROUP BY Id\n LIMIT :max\n"
        );
    }
}
