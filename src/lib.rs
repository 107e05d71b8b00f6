//! Query model for a visual SOQL builder.
//!
//! Query text is parsed into a [`SyntaxTree`](ast::SyntaxTree), deserialized
//! into the structural [`Query`](model::Query), and flattened into the
//! [`ToolingModel`] the builder UI edits. Edits go back to text through the
//! [`serializer`]; the [`ToolingModelService`] keeps the canonical model and
//! talks to the host over a [`MessageService`].
//!
//! ```
//! use soql_model::{to_flat_model, to_text};
//!
//! let model = to_flat_model("SELECT Name, Id FROM Account WHERE Name = 'pwt' LIMIT 11");
//! assert_eq!(model.sobject, "Account");
//! assert_eq!(model.fields, vec!["Name", "Id"]);
//! assert_eq!(model.limit, "11");
//! assert_eq!(
//!     to_text(&model),
//!     "SELECT Name, Id\n  FROM Account\n  WHERE Name = 'pwt'\n  LIMIT 11\n"
//! );
//! ```

pub mod ast;
pub mod convert;
pub mod deserializer;
pub mod lexer;
pub mod literal;
pub mod message;
pub mod model;
pub mod parser;
pub mod serializer;
pub mod service;
pub mod tooling_model;

#[cfg(feature = "cli")]
pub mod cli;

pub use ast::{ErrorType, SyntaxError, SyntaxTree, Token};
pub use convert::{to_flat_model, to_structural_model};
pub use deserializer::{ModelConstructionError, ModelDeserializer, deserialize_text};
pub use lexer::{LexError, Lexer, Position};
pub use message::{MessageError, MessageService, SoqlEditorEvent, StandaloneMessageService};
pub use model::Query;
pub use parser::Parser;
pub use serializer::{FormatOptions, to_text, to_text_with};
pub use service::{SubscriptionId, ToolingModelService};
pub use tooling_model::{SELECT_COUNT, ToolingModel, UnsupportedReason};
