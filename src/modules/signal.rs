// Activation signals - the external requests that bring the browser to the front.
// Pure data, no I/O.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved extra selecting private browsing. Consumed by the mode resolver.
pub const EXTRA_PRIVATE_BROWSING_MODE: &str = "private_browsing_mode";
pub const EXTRA_CRASH_ID: &str = "crash_id";
pub const EXTRA_SPEECH_PROCESSING: &str = "speech_processing";
pub const EXTRA_OPEN_TO_SEARCH: &str = "open_to_search";
pub const EXTRA_SEARCH_SOURCE: &str = "search_source";
pub const EXTRA_OPEN_TO_BROWSER: &str = "open_to_browser";
pub const EXTRA_SESSION_ID: &str = "active_session_id";

pub const ACTION_CRASH_REPORT: &str = "crash_report";
pub const ACTION_SPEECH_PROCESSING: &str = "speech_processing";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalAction {
    /// Launcher icon.
    Main,
    /// Another app asked us to view a URL.
    View,
    Custom(String),
}

impl Default for SignalAction {
    fn default() -> Self {
        Self::Main
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Bool(bool),
    Text(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivationSignal {
    pub action: SignalAction,
    /// URL carried by a `View` action.
    pub data: Option<String>,
    pub extras: HashMap<String, ExtraValue>,
    /// Package or bundle id of the app that sent the signal, when known.
    pub origin_app: Option<String>,
}

impl ActivationSignal {
    pub fn new(action: SignalAction) -> Self {
        Self {
            action,
            ..Self::default()
        }
    }

    pub fn view(url: impl Into<String>) -> Self {
        Self {
            action: SignalAction::View,
            data: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<ExtraValue>) -> Self {
        self.extras.insert(key.to_string(), value.into());
        self
    }

    pub fn with_origin_app(mut self, app: impl Into<String>) -> Self {
        self.origin_app = Some(app.into());
        self
    }

    pub fn is_custom(&self, tag: &str) -> bool {
        matches!(&self.action, SignalAction::Custom(t) if t == tag)
    }

    pub fn has_extra(&self, key: &str) -> bool {
        self.extras.contains_key(key)
    }

    /// Boolean extra; a text extra under the same key reads as absent.
    pub fn bool_extra(&self, key: &str) -> Option<bool> {
        match self.extras.get(key) {
            Some(ExtraValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    pub fn text_extra(&self, key: &str) -> Option<&str> {
        match self.extras.get(key) {
            Some(ExtraValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Removes and returns a boolean extra.
    pub fn take_bool_extra(&mut self, key: &str) -> Option<bool> {
        match self.extras.remove(key) {
            Some(ExtraValue::Bool(b)) => Some(b),
            Some(other) => {
                // Wrong type: leave it for whoever owns that key.
                self.extras.insert(key.to_string(), other);
                None
            }
            None => None,
        }
    }

    pub fn remove_extra(&mut self, key: &str) {
        self.extras.remove(key);
    }
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Bool(value)
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Text(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_bool_extra_consumes_once() {
        let mut signal = ActivationSignal::new(SignalAction::Main)
            .with_extra(EXTRA_PRIVATE_BROWSING_MODE, true);
        assert_eq!(signal.take_bool_extra(EXTRA_PRIVATE_BROWSING_MODE), Some(true));
        assert_eq!(signal.take_bool_extra(EXTRA_PRIVATE_BROWSING_MODE), None);
        assert!(!signal.has_extra(EXTRA_PRIVATE_BROWSING_MODE));
    }

    #[test]
    fn take_bool_extra_leaves_wrong_type_in_place() {
        let mut signal = ActivationSignal::default().with_extra("flag", "yes");
        assert_eq!(signal.take_bool_extra("flag"), None);
        assert_eq!(signal.text_extra("flag"), Some("yes"));
    }

    #[test]
    fn deserializes_from_json() {
        let json = r#"{
            "action": "view",
            "data": "https://example.com",
            "extras": { "private_browsing_mode": true, "search_source": "widget" },
            "origin_app": "org.example.mail"
        }"#;
        let signal: ActivationSignal = serde_json::from_str(json).unwrap();
        assert_eq!(signal.action, SignalAction::View);
        assert_eq!(signal.bool_extra(EXTRA_PRIVATE_BROWSING_MODE), Some(true));
        assert_eq!(signal.text_extra(EXTRA_SEARCH_SOURCE), Some("widget"));
        assert_eq!(signal.origin_app.as_deref(), Some("org.example.mail"));
    }

    #[test]
    fn custom_action_round_trips_from_json() {
        let signal: ActivationSignal =
            serde_json::from_str(r#"{"action": {"custom": "crash_report"}}"#).unwrap();
        assert!(signal.is_custom(ACTION_CRASH_REPORT));
        assert!(signal.extras.is_empty());
    }
}
