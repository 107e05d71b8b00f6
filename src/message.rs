//! Message channel between the model service and its host.
//!
//! Events travel as JSON objects tagged by `type`:
//!
//! ```text
//! { "type": "text_soql_changed", "payload": "SELECT Id FROM Account" }
//! { "type": "ui_activated" }
//! ```

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::tooling_model::ToolingModel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum SoqlEditorEvent {
    /// Query text edited outside the builder
    TextSoqlChanged(String),
    /// Query text regenerated from the builder model
    UiSoqlChanged(String),
    /// Builder became visible
    UiActivated,
}

#[derive(Debug, Error)]
pub enum MessageError {
    #[error("failed to encode message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("host rejected message: {0}")]
    Transport(String),
}

/// Host side of the channel: outbound events plus persisted view state.
pub trait MessageService {
    fn send_message(&self, event: &SoqlEditorEvent) -> Result<(), MessageError>;

    fn set_state(&self, model: &ToolingModel) -> Result<(), MessageError>;

    /// Last persisted model, if one was stored and still reads back.
    fn get_state(&self) -> Option<ToolingModel>;
}

/// In-memory host used when the builder runs on its own and in tests.
///
/// State is held as JSON text, as a real host would persist it.
#[derive(Debug, Default)]
pub struct StandaloneMessageService {
    state: RefCell<Option<String>>,
    sent: RefCell<Vec<SoqlEditorEvent>>,
}

impl StandaloneMessageService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `raw` as the stored state, whatever it contains.
    pub fn with_raw_state(raw: impl Into<String>) -> Self {
        StandaloneMessageService {
            state: RefCell::new(Some(raw.into())),
            sent: RefCell::default(),
        }
    }

    /// Every event sent so far, oldest first.
    pub fn sent_messages(&self) -> Vec<SoqlEditorEvent> {
        self.sent.borrow().clone()
    }

    pub fn raw_state(&self) -> Option<String> {
        self.state.borrow().clone()
    }
}

impl MessageService for StandaloneMessageService {
    fn send_message(&self, event: &SoqlEditorEvent) -> Result<(), MessageError> {
        self.sent.borrow_mut().push(event.clone());
        Ok(())
    }

    fn set_state(&self, model: &ToolingModel) -> Result<(), MessageError> {
        let json = serde_json::to_string(model)?;
        *self.state.borrow_mut() = Some(json);
        Ok(())
    }

    fn get_state(&self) -> Option<ToolingModel> {
        let raw = self.state.borrow().clone()?;
        match serde_json::from_str(&raw) {
            Ok(model) => Some(model),
            Err(e) => {
                warn!(error = %e, "discarding unreadable view state");
                self.state.replace(None);
                None
            }
        }
    }
}
