//! The engine context: variable store, type registry and change events.
//!
//! One `Engine` owns everything a session needs. Reads and mutations fail
//! with `NotReady` until declarations have been loaded.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::codec::{self, decode_response, encode_response, ResponseElement};
use crate::config::EngineConfig;
use crate::declarations::Declarations;
use crate::error::{Result, VariableError};
use crate::literal::{create_composite_identifier, CompositeIdentifier};
use crate::model::{Cardinality, Value, VariableKind};
use crate::registry::TypeRegistry;
use crate::state::StateValue;
use crate::status::{aggregate_status, response_status, ResponseStatus};
use crate::variable::{ValueChange, Variable, VariableSpec};

/// A change notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum EngineEvent {
    ChangeResponseVariable(ValueChange),
    ChangeState { identifier: CompositeIdentifier },
}

impl EngineEvent {
    /// Event name as seen by the rendering layer.
    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::ChangeResponseVariable(_) => "changeResponseVariable",
            EngineEvent::ChangeState { .. } => "changeState",
        }
    }
}

/// Fire-and-forget receiver of engine events.
pub trait EventSink {
    fn notify(&self, event: &EngineEvent);
}

/// Discards every event.
pub struct NoopSink;

impl EventSink for NoopSink {
    fn notify(&self, _: &EngineEvent) {}
}

/// Logs every event at debug level.
pub struct TracingSink;

impl EventSink for TracingSink {
    fn notify(&self, event: &EngineEvent) {
        match event {
            EngineEvent::ChangeResponseVariable(change) => tracing::debug!(
                event = event.name(),
                identifier = %change.identifier,
                "response variable changed"
            ),
            EngineEvent::ChangeState { identifier } => {
                tracing::debug!(event = event.name(), %identifier, "state changed")
            }
        }
    }
}

type Listener = Box<dyn Fn(&ValueChange)>;

/// Outcome of restoring a recovery payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RestoreSummary {
    pub restored: Vec<CompositeIdentifier>,
    /// Elements naming variables the store does not hold.
    pub skipped: Vec<String>,
}

/// Owns the variable store and everything operations on it need.
pub struct Engine {
    config: EngineConfig,
    registry: TypeRegistry,
    variables: Vec<Variable>,
    index: HashMap<CompositeIdentifier, usize>,
    ready: bool,
    sink: Box<dyn EventSink>,
    listeners: HashMap<String, Vec<Listener>>,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            registry: TypeRegistry::new(),
            variables: Vec::new(),
            index: HashMap::new(),
            ready: false,
            sink: Box::new(NoopSink),
            listeners: HashMap::new(),
        }
    }

    /// Replace the event sink.
    pub fn with_sink(mut self, sink: impl EventSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    pub fn register_custom_response(&mut self, type_name: impl Into<String>) {
        self.registry.register_custom_response(type_name);
    }

    /// Add a variable to the store.
    pub fn insert(&mut self, spec: VariableSpec) -> Result<()> {
        if self.index.contains_key(&spec.identifier) {
            return Err(VariableError::DuplicateIdentifier(spec.identifier.to_string()));
        }
        let variable = Variable::create(spec, &self.registry)?;
        tracing::debug!(identifier = %variable.identifier(), "variable inserted");
        self.index
            .insert(variable.identifier().clone(), self.variables.len());
        self.variables.push(variable);
        Ok(())
    }

    /// Populate the store from a declarations document, then mark ready.
    ///
    /// Nothing is inserted unless every declaration is valid.
    pub fn load_declarations(&mut self, declarations: &Declarations) -> Result<()> {
        let mut registry = self.registry.clone();
        for name in &declarations.custom_responses {
            registry.register_custom_response(name.clone());
        }

        let specs = declarations.variable_specs(self.config.directed_pair_delimiter)?;
        let mut created = Vec::with_capacity(specs.len());
        let mut seen = HashSet::new();
        for spec in specs {
            if self.index.contains_key(&spec.identifier) || !seen.insert(spec.identifier.clone()) {
                return Err(VariableError::DuplicateIdentifier(spec.identifier.to_string()));
            }
            created.push(Variable::create(spec, &registry)?);
        }

        self.registry = registry;
        for variable in created {
            self.index
                .insert(variable.identifier().clone(), self.variables.len());
            self.variables.push(variable);
        }
        self.mark_ready();
        tracing::info!(
            source = %declarations.source.display(),
            items = declarations.items.len(),
            variables = declarations.variable_count(),
            "declarations loaded"
        );
        Ok(())
    }

    pub fn mark_ready(&mut self) {
        self.ready = true;
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(VariableError::NotReady)
        }
    }

    fn position(&self, item: &str, local: &str) -> Result<usize> {
        self.ensure_ready()?;
        let identifier = create_composite_identifier(item, local)?;
        self.index
            .get(&identifier)
            .copied()
            .ok_or_else(|| VariableError::UnknownVariable(identifier.to_string()))
    }

    /// Look up a variable by local and item identifier.
    pub fn get_variable(&self, local: &str, item: &str) -> Result<&Variable> {
        let pos = self.position(item, local)?;
        Ok(&self.variables[pos])
    }

    /// Every variable in declaration order.
    pub fn variables(&self) -> Result<impl Iterator<Item = &Variable>> {
        self.ensure_ready()?;
        Ok(self.variables.iter())
    }

    /// Variables of one item, in declaration order.
    pub fn variables_for_item(&self, item: &str) -> Result<Vec<&Variable>> {
        self.ensure_ready()?;
        Ok(self
            .variables
            .iter()
            .filter(|v| v.identifier().item() == item)
            .collect())
    }

    /// Distinct item identifiers in declaration order.
    pub fn items(&self) -> Result<Vec<&str>> {
        self.ensure_ready()?;
        let mut items: Vec<&str> = Vec::new();
        for variable in &self.variables {
            let item = variable.identifier().item();
            if !items.contains(&item) {
                items.push(item);
            }
        }
        Ok(items)
    }

    /// Register a listener for value changes of every variable with this
    /// local identifier.
    pub fn add_listener(
        &mut self,
        local: impl Into<String>,
        listener: impl Fn(&ValueChange) + 'static,
    ) {
        self.listeners
            .entry(local.into())
            .or_default()
            .push(Box::new(listener));
    }

    /// Assign a value and notify listeners.
    ///
    /// Parameters change silently; responses emit `changeResponseVariable`.
    pub fn set_value(
        &mut self,
        item: &str,
        local: &str,
        value: Option<Value>,
    ) -> Result<ValueChange> {
        let pos = self.position(item, local)?;
        let variable = &mut self.variables[pos];
        let change = variable.set_value(value, &self.registry)?;
        tracing::debug!(
            identifier = %change.identifier,
            value = ?change.current,
            "value assigned"
        );

        if change.kind == VariableKind::Response {
            self.sink
                .notify(&EngineEvent::ChangeResponseVariable(change.clone()));
            if let Some(listeners) = self.listeners.get(local) {
                for listener in listeners {
                    listener(&change);
                }
            }
        }
        Ok(change)
    }

    /// Assign interaction state and emit `changeState`.
    pub fn set_state(&mut self, item: &str, local: &str, state: Option<StateValue>) -> Result<()> {
        let pos = self.position(item, local)?;
        let variable = &mut self.variables[pos];
        variable.set_state(state)?;
        tracing::debug!(identifier = %variable.identifier(), "state assigned");
        self.sink.notify(&EngineEvent::ChangeState {
            identifier: variable.identifier().clone(),
        });
        Ok(())
    }

    pub fn response_status(&self, item: &str, local: &str) -> Result<ResponseStatus> {
        Ok(response_status(self.get_variable(local, item)?))
    }

    /// Combined status of the response variables of one item.
    pub fn item_status(&self, item: &str) -> Result<ResponseStatus> {
        let responses = self
            .variables_for_item(item)?
            .into_iter()
            .filter(|v| v.kind() == VariableKind::Response);
        Ok(aggregate_status(responses))
    }

    pub fn encode_response(&self, item: &str, local: &str) -> Result<ResponseElement> {
        encode_response(self.get_variable(local, item)?, &self.config)
    }

    /// Wire elements for every response variable of an item.
    pub fn encode_item(&self, item: &str) -> Result<Vec<ResponseElement>> {
        self.variables_for_item(item)?
            .into_iter()
            .filter(|v| v.kind() == VariableKind::Response)
            .map(|v| encode_response(v, &self.config))
            .collect()
    }

    /// A `<responses>` document holding every response variable.
    pub fn encode_document(&self) -> Result<String> {
        let elements = self
            .variables()?
            .filter(|v| v.kind() == VariableKind::Response)
            .map(|v| encode_response(v, &self.config))
            .collect::<Result<Vec<_>>>()?;
        Ok(codec::render_response_document(&elements, &self.config))
    }

    /// Decode a wire element against its declaration without touching the store.
    ///
    /// Returns the store position and the variable as it would look after the
    /// restore.
    fn stage_restore(&self, element: &ResponseElement) -> Result<(usize, Variable)> {
        let pos = self.position(&element.item_identifier, &element.response_identifier)?;
        let variable = &self.variables[pos];

        if element.base_type != variable.base_type() {
            return Err(VariableError::MalformedResponse(format!(
                "{}: declared {} but element carries {}",
                variable.identifier(),
                variable.base_type(),
                element.base_type
            )));
        }

        let collapsed = element.cardinality == Cardinality::Single
            && variable.cardinality().is_container()
            && variable.identifier().local() == self.config.candidate_information_identifier;
        let decoded = if collapsed {
            let expanded = ResponseElement {
                cardinality: variable.cardinality(),
                ..element.clone()
            };
            decode_response(&expanded, &self.config)?
        } else if element.cardinality == variable.cardinality() {
            decode_response(element, &self.config)?
        } else {
            return Err(VariableError::MalformedResponse(format!(
                "{}: declared {} but element carries {}",
                variable.identifier(),
                variable.cardinality(),
                element.cardinality
            )));
        };

        let mut staged = variable.clone();
        staged.set_state(decoded.state)?;
        staged.set_value(decoded.value, &self.registry)?;
        Ok((pos, staged))
    }

    /// Assign value and state from a wire element without notifying.
    ///
    /// The variable is left unchanged when the element does not decode.
    pub fn restore_response(&mut self, element: &ResponseElement) -> Result<CompositeIdentifier> {
        let (pos, staged) = self.stage_restore(element)?;
        let identifier = staged.identifier().clone();
        self.variables[pos] = staged;
        tracing::debug!(%identifier, "response restored");
        Ok(identifier)
    }

    /// Restore every element of a recovery payload.
    ///
    /// Elements for unknown variables are skipped with a warning. Any other
    /// failure aborts the restore before a single variable is assigned.
    pub fn restore_document(&mut self, text: &str) -> Result<RestoreSummary> {
        self.ensure_ready()?;
        let mut summary = RestoreSummary::default();
        let mut staged = Vec::new();
        for element in codec::parse_response_document(text)? {
            match self.stage_restore(&element) {
                Ok(entry) => staged.push(entry),
                Err(VariableError::UnknownVariable(identifier)) => {
                    tracing::warn!(%identifier, "skipping response for unknown variable");
                    summary.skipped.push(identifier);
                }
                Err(e) => return Err(e),
            }
        }

        for (pos, variable) in staged {
            summary.restored.push(variable.identifier().clone());
            self.variables[pos] = variable;
        }
        tracing::info!(
            restored = summary.restored.len(),
            skipped = summary.skipped.len(),
            "recovery payload restored"
        );
        Ok(summary)
    }
}
