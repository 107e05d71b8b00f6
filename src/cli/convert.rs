//! Conversions between query text and the JSON models

use super::CliError;
use crate::{
    convert::to_flat_model,
    deserializer::deserialize_text,
    serializer::{FormatOptions, to_text_with},
    tooling_model::ToolingModel,
};

/// Options shared by the text-to-JSON commands
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// The query text
    pub query: String,
    /// Pretty-print the output
    pub pretty: bool,
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String, CliError> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(json)
}

/// Query text to flat model JSON
pub fn execute_convert(options: &ConvertOptions) -> Result<String, CliError> {
    to_json(&to_flat_model(&options.query), options.pretty)
}

/// Query text to structural model JSON
pub fn execute_model(options: &ConvertOptions) -> Result<String, CliError> {
    let query = deserialize_text(&options.query)?;
    to_json(&query, options.pretty)
}

/// Flat model JSON to query text
pub fn execute_format(json: &str, format: &FormatOptions) -> Result<String, CliError> {
    let model: ToolingModel = serde_json::from_str(json)?;
    Ok(to_text_with(&model, format))
}

/// Query text regenerated through the flat model; unmodeled clauses are kept
pub fn execute_normalize(query: &str, format: &FormatOptions) -> String {
    let mut model = to_flat_model(query);
    model.original_soql_statement = query.to_string();
    to_text_with(&model, format)
}
