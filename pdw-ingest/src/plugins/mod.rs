//! Source plugins
//!
//! One plugin per upstream system. Each maps its system's payload field
//! names onto the uniform production event shape consumed by
//! [`RawProductionEvent::from_shape`](crate::models::RawProductionEvent::from_shape).
//!
//! # Plugins
//! 1. **pork_erp** - `PORK_ERP`, flat ERP records
//! 2. **beef_wms** - `BEEF_WMS`, warehouse naming (`ts`, `warehouse`, `sku`, `produced`, `scrap`)
//! 3. **poultry_mes** - `POULTRY_MES`, nested `material` and `quantities` objects

pub mod beef_wms;
pub mod pork_erp;
pub mod poultry_mes;

pub use beef_wms::BeefWmsPlugin;
pub use pork_erp::PorkErpPlugin;
pub use poultry_mes::PoultryMesPlugin;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Open-ended key-value payload as received from a source
pub type Payload = Map<String, Value>;

/// Upstream system adapter
///
/// Plugins are stateless and shared across concurrent ingest calls.
pub trait SourcePlugin: Send + Sync {
    /// Stable identifier, used as the registry key
    fn source_system(&self) -> &'static str;

    /// Map a raw payload onto the production event shape
    ///
    /// # Errors
    /// [`TransformError`] when the payload violates the source contract
    /// (missing event id, unreadable timestamp).
    fn transform(&self, payload: &Payload) -> Result<Payload, TransformError>;
}

/// Source payload contract violation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("payload is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("field '{field}' is not an ISO-8601 timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// No plugin registered for a source system
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("No plugin registered for source_system: {source_system:?}")]
pub struct PluginNotFoundError {
    pub source_system: String,
}

/// Source system → plugin map
///
/// Filled once at startup, then shared read-only behind an `Arc`.
#[derive(Default, Clone)]
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn SourcePlugin>>,
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the PORK_ERP, BEEF_WMS and POULTRY_MES plugins
    pub fn with_builtin_plugins() -> Self {
        let mut registry = Self::new();
        registry.register(PorkErpPlugin);
        registry.register(BeefWmsPlugin);
        registry.register(PoultryMesPlugin);
        registry
    }

    /// Register under the plugin's own identifier; replaces any earlier plugin for it
    pub fn register<P: SourcePlugin + 'static>(&mut self, plugin: P) {
        self.register_arc(Arc::new(plugin));
    }

    pub fn register_arc(&mut self, plugin: Arc<dyn SourcePlugin>) {
        self.plugins
            .insert(plugin.source_system().to_string(), plugin);
    }

    pub fn resolve(&self, source_system: &str) -> Result<Arc<dyn SourcePlugin>, PluginNotFoundError> {
        self.plugins
            .get(source_system)
            .cloned()
            .ok_or_else(|| PluginNotFoundError {
                source_system: source_system.to_string(),
            })
    }

    /// Registered identifiers, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.plugins.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("sources", &self.keys())
            .finish()
    }
}

// ============================================================================
// Field helpers shared by plugins
// ============================================================================

/// First of `keys` holding a non-null value
pub(crate) fn first_present<'a>(
    payload: &'a Payload,
    keys: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|key| match payload.get(*key) {
            Some(Value::Null) | None => None,
            Some(value) => Some((*key, value)),
        })
}

/// Non-empty object stored under `key`
pub(crate) fn nested_object<'a>(payload: &'a Payload, key: &str) -> Option<&'a Payload> {
    match payload.get(key) {
        Some(Value::Object(map)) if !map.is_empty() => Some(map),
        _ => None,
    }
}

/// Event identifier; numeric ids are carried as their decimal text
pub(crate) fn source_event_id(payload: &Payload) -> Result<Value, TransformError> {
    match payload.get("source_event_id") {
        Some(Value::String(s)) => Ok(Value::String(s.clone())),
        Some(Value::Number(n)) => Ok(Value::String(n.to_string())),
        Some(Value::Null) | None => Err(TransformError::MissingField("source_event_id")),
        Some(other) => Ok(other.clone()),
    }
}

/// Event timestamp from the first present of `keys`
///
/// Text is parsed as a local ISO-8601 timestamp and re-emitted in canonical
/// form. Other JSON types pass through for shape validation to reject.
pub(crate) fn event_timestamp(
    payload: &Payload,
    keys: &[&'static str],
) -> Result<Option<Value>, TransformError> {
    match first_present(payload, keys) {
        Some((field, Value::String(text))) => {
            let ts = parse_local_timestamp(text).ok_or_else(|| TransformError::InvalidTimestamp {
                field,
                value: text.clone(),
            })?;
            Ok(Some(Value::String(
                ts.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
            )))
        }
        Some((_, other)) => Ok(Some(other.clone())),
        None => Ok(None),
    }
}

/// Parse an ISO-8601 timestamp without timezone normalization
///
/// Accepts `T` or space separators, optional fractional seconds, a bare date
/// (midnight), and an explicit offset, which is dropped as-is.
pub fn parse_local_timestamp(text: &str) -> Option<NaiveDateTime> {
    const FORMATS: [&str; 4] = [
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ];

    let text = text.trim();

    if let Ok(with_offset) = DateTime::parse_from_rfc3339(text) {
        return Some(with_offset.naive_local());
    }

    for format in FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(text, format) {
            return Some(ts);
        }
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Builder for the uniform event shape; absent and null values are skipped
pub(crate) struct EventShape {
    fields: Payload,
}

impl EventShape {
    pub(crate) fn new(source_system: &'static str, source_event_id: Value) -> Self {
        let mut fields = Payload::new();
        fields.insert(
            "source_system".to_string(),
            Value::String(source_system.to_string()),
        );
        fields.insert("source_event_id".to_string(), source_event_id);
        Self { fields }
    }

    pub(crate) fn field(mut self, key: &str, value: Option<Value>) -> Self {
        match value {
            Some(Value::Null) | None => {}
            Some(value) => {
                self.fields.insert(key.to_string(), value);
            }
        }
        self
    }

    pub(crate) fn build(self) -> Payload {
        self.fields
    }
}

/// Owned copy of the first present of `keys`
pub(crate) fn pick(payload: &Payload, keys: &[&'static str]) -> Option<Value> {
    first_present(payload, keys).map(|(_, value)| value.clone())
}

/// [`pick`], falling back to `default` when every key is absent
pub(crate) fn pick_or(payload: &Payload, keys: &[&'static str], default: Value) -> Value {
    pick(payload, keys).unwrap_or(default)
}

#[cfg(test)]
pub(crate) fn payload(value: Value) -> Payload {
    match value {
        Value::Object(map) => map,
        other => panic!("test payload must be an object, got {}", other),
    }
}
