//! Loadable validation settings.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::Result;
use crate::messages::MessageTemplates;
use crate::registry::Registry;
use crate::validation::Validation;

/// Settings for building a [`Validation`] context.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
/// use tagvalid::{MessageTemplates, Registry, ValidationConfig};
///
/// let config = ValidationConfig::from_json(
///     r#"{"required_first": true, "skippable": ["Url"], "messages": {"Url": "链接无效"}}"#,
/// )
/// .unwrap();
///
/// let registry = Arc::new(Registry::new());
/// let messages = Arc::new(MessageTemplates::new());
/// let v = config.apply(registry.clone(), messages.clone());
///
/// assert!(v.is_required_first());
/// assert!(registry.is_skippable("Url"));
/// assert_eq!(messages.get("Url"), "链接无效");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Skip allowlisted rules on empty optional fields
    pub required_first: bool,
    /// Extra rule names for the skip-allowlist
    pub skippable: Vec<String>,
    /// One-time template overrides, by rule name
    pub messages: HashMap<String, String>,
}

impl ValidationConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Apply the settings and create a context bound to `registry` and
    /// `messages`.
    ///
    /// Template overrides follow the first-writer-wins rule of
    /// [`MessageTemplates::set_defaults`].
    pub fn apply(&self, registry: Arc<Registry>, messages: Arc<MessageTemplates>) -> Validation {
        for name in &self.skippable {
            registry.mark_skippable(name.as_str());
        }
        messages.set_defaults(self.messages.clone());

        Validation::new()
            .required_first(self.required_first)
            .with_registry(registry)
            .with_messages(messages)
    }
}
