//! Reactive holder of the canonical flat model.
//!
//! Every edit replaces the model wholesale, notifies subscribers, sends the
//! regenerated text to the host and persists the new model. Text arriving
//! from the host is converted and applied only when it differs from the
//! current model, so the host echoing our own text back is a no-op.

use std::collections::BTreeMap;

use tracing::{debug, error};

use crate::{
    convert::to_flat_model,
    message::{MessageService, SoqlEditorEvent},
    model::{AndOr, Condition, OrderByExpression},
    serializer::{FormatOptions, to_text_with},
    tooling_model::{SELECT_COUNT, ToolingModel, WhereCondition},
};

pub type SubscriptionId = u64;

type Listener = Box<dyn FnMut(&ToolingModel)>;

pub struct ToolingModelService<M: MessageService> {
    model: ToolingModel,
    message_service: M,
    format: FormatOptions,
    next_listener_id: SubscriptionId,
    listeners: BTreeMap<SubscriptionId, Listener>,
}

impl<M: MessageService> ToolingModelService<M> {
    pub fn new(message_service: M) -> Self {
        Self::with_format(message_service, FormatOptions::default())
    }

    pub fn with_format(message_service: M, format: FormatOptions) -> Self {
        ToolingModelService {
            model: ToolingModel::template(),
            message_service,
            format,
            next_listener_id: 1,
            listeners: BTreeMap::new(),
        }
    }

    pub fn model(&self) -> &ToolingModel {
        &self.model
    }

    pub fn message_service(&self) -> &M {
        &self.message_service
    }

    /// Register `listener`; it is called right away with the current model
    /// and again after every replacement.
    pub fn subscribe<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(&ToolingModel) + 'static,
    {
        listener(&self.model);
        let id = self.next_listener_id;
        self.next_listener_id = self.next_listener_id.saturating_add(1);
        self.listeners.insert(id, Box::new(listener));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Select a new object. Clears every other selection.
    pub fn set_sobject(&mut self, sobject: &str) {
        let model = ToolingModel {
            sobject: sobject.to_string(),
            ..ToolingModel::template()
        };
        self.change_model(model);
    }

    /// Select `field`. Selecting [`SELECT_COUNT`] replaces the select list,
    /// and selecting any other field drops the count.
    pub fn add_field(&mut self, field: &str) {
        let mut model = self.model.clone();
        if field == SELECT_COUNT {
            model.fields = vec![SELECT_COUNT.to_string()];
        } else {
            model.fields.retain(|f| f != SELECT_COUNT);
            if !model.fields.iter().any(|f| f == field) {
                model.fields.push(field.to_string());
            }
        }
        self.change_model(model);
    }

    pub fn remove_field(&mut self, field: &str) {
        let mut model = self.model.clone();
        model.fields.retain(|f| f != field);
        self.change_model(model);
    }

    /// Replace the item for the same field, or append.
    pub fn upsert_order_by(&mut self, item: OrderByExpression) {
        let mut model = self.model.clone();
        match model.order_by.iter().position(|o| o.field == item.field) {
            Some(existing) => model.order_by[existing] = item,
            None => model.order_by.push(item),
        }
        self.change_model(model);
    }

    pub fn remove_order_by(&mut self, field: &str) {
        let mut model = self.model.clone();
        model.order_by.retain(|o| o.field != field);
        self.change_model(model);
    }

    /// Replace the condition on the same field, keeping its index, or append
    /// it with the next free index. `and_or` overrides the joining operator;
    /// without it, two or more conditions are joined with `AND` unless an
    /// operator was already chosen.
    pub fn upsert_where(&mut self, condition: Condition, and_or: Option<AndOr>) {
        let mut model = self.model.clone();
        let conditions = &mut model.where_clause.conditions;

        let existing = conditions
            .iter()
            .position(|c| c.condition.field.field_name == condition.field.field_name);
        match existing {
            Some(position) => conditions[position].condition = condition,
            None => {
                let index = conditions.iter().map(|c| c.index + 1).max().unwrap_or(0);
                conditions.push(WhereCondition { condition, index });
            }
        }

        let joined = conditions.len() > 1;
        model.where_clause.and_or = match and_or {
            Some(and_or) => Some(and_or),
            None if joined => Some(model.where_clause.and_or.unwrap_or(AndOr::And)),
            None => model.where_clause.and_or,
        };
        self.change_model(model);
    }

    pub fn set_limit(&mut self, limit: &str) {
        let model = ToolingModel {
            limit: limit.trim().to_string(),
            ..self.model.clone()
        };
        self.change_model(model);
    }

    /// Handle a raw message from the host. Anything that is not a known event
    /// is ignored.
    pub fn on_message(&mut self, message: &serde_json::Value) {
        match serde_json::from_value::<SoqlEditorEvent>(message.clone()) {
            Ok(event) => self.handle_event(event),
            Err(e) => debug!(error = %e, "ignoring unrecognized message"),
        }
    }

    pub fn handle_event(&mut self, event: SoqlEditorEvent) {
        match event {
            SoqlEditorEvent::TextSoqlChanged(text) => {
                let mut model = to_flat_model(&text);
                model.original_soql_statement = text;

                if model != self.model {
                    self.model = model;
                    self.publish();
                    self.save_view_state();
                } else {
                    debug!("incoming query text matches current model");
                }
            }
            SoqlEditorEvent::UiSoqlChanged(_) | SoqlEditorEvent::UiActivated => {}
        }
    }

    /// Load the persisted model, or the template when none is stored, and
    /// publish it.
    pub fn restore_view_state(&mut self) {
        self.model = self
            .message_service
            .get_state()
            .unwrap_or_else(ToolingModel::template);
        self.publish();
    }

    /// The model is normalized and the generated text becomes its original
    /// statement, so the host's echo of that text converts to an equal model.
    fn change_model(&mut self, mut model: ToolingModel) {
        model.normalize();
        let text = to_text_with(&model, &self.format);
        model.original_soql_statement = text.clone();
        self.model = model;
        self.publish();
        self.send_message_to_backend(text);
        self.save_view_state();
    }

    fn publish(&mut self) {
        for listener in self.listeners.values_mut() {
            listener(&self.model);
        }
    }

    fn send_message_to_backend(&self, text: String) {
        let event = SoqlEditorEvent::UiSoqlChanged(text);
        if let Err(e) = self.message_service.send_message(&event) {
            error!(error = %e, "failed to send query text to host");
        }
    }

    fn save_view_state(&self) {
        if let Err(e) = self.message_service.set_state(&self.model) {
            error!(error = %e, "failed to save view state");
        }
    }
}
