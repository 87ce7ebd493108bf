//! User-input events reported by the host.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{ElementId, SessionId};

/// What kind of interaction produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A button was pressed.
    ButtonClick,
    /// A text field's value changed.
    InputChange,
    /// A checkbox was toggled.
    CheckboxChange,
    /// A form was submitted.
    FormSubmit,
}

impl EventKind {
    /// Whether this kind carries a field value edit.
    ///
    /// Value edits arrive in noisy bursts (one per keystroke) and are
    /// debounced by the dispatcher; everything else runs immediately.
    #[must_use]
    pub fn is_value_edit(self) -> bool {
        matches!(self, Self::InputChange | Self::CheckboxChange)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ButtonClick => write!(f, "button_click"),
            Self::InputChange => write!(f, "input_change"),
            Self::CheckboxChange => write!(f, "checkbox_change"),
            Self::FormSubmit => write!(f, "form_submit"),
        }
    }
}

/// Value carried by an edit event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// Text input.
    Text(String),
    /// Checkbox state.
    Bool(bool),
}

impl InputValue {
    /// The text value, if this is text input.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }

    /// The boolean value, if this is checkbox input.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }
}

impl From<&str> for InputValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for InputValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for InputValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// A single user interaction with an element of the confirmation UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInputEvent {
    /// Element the interaction happened on.
    pub element_id: ElementId,
    /// Interaction kind.
    pub kind: EventKind,
    /// New value for edit events.
    pub value: Option<InputValue>,
}

impl UserInputEvent {
    /// A button press.
    #[must_use]
    pub fn button_click(element_id: impl Into<ElementId>) -> Self {
        Self {
            element_id: element_id.into(),
            kind: EventKind::ButtonClick,
            value: None,
        }
    }

    /// A text field edit.
    #[must_use]
    pub fn input_change(element_id: impl Into<ElementId>, value: impl Into<InputValue>) -> Self {
        Self {
            element_id: element_id.into(),
            kind: EventKind::InputChange,
            value: Some(value.into()),
        }
    }

    /// A checkbox toggle.
    #[must_use]
    pub fn checkbox_change(element_id: impl Into<ElementId>, checked: bool) -> Self {
        Self {
            element_id: element_id.into(),
            kind: EventKind::CheckboxChange,
            value: Some(InputValue::Bool(checked)),
        }
    }

    /// A form submission.
    #[must_use]
    pub fn form_submit(element_id: impl Into<ElementId>) -> Self {
        Self {
            element_id: element_id.into(),
            kind: EventKind::FormSubmit,
            value: None,
        }
    }
}

/// A host-level notification: an input event plus the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostNotification {
    /// Session the event was raised in.
    pub session_id: SessionId,
    /// The event.
    pub event: UserInputEvent,
}

impl HostNotification {
    /// Create a notification.
    #[must_use]
    pub fn new(session_id: SessionId, event: UserInputEvent) -> Self {
        Self { session_id, event }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_edit_kinds() {
        assert!(EventKind::InputChange.is_value_edit());
        assert!(EventKind::CheckboxChange.is_value_edit());
        assert!(!EventKind::ButtonClick.is_value_edit());
        assert!(!EventKind::FormSubmit.is_value_edit());
    }

    #[test]
    fn test_constructors() {
        let edit = UserInputEvent::input_change("amount", "42");
        assert_eq!(edit.kind, EventKind::InputChange);
        assert_eq!(edit.value.as_ref().and_then(InputValue::as_text), Some("42"));

        let toggle = UserInputEvent::checkbox_change("recurring", true);
        assert_eq!(toggle.value.as_ref().and_then(InputValue::as_bool), Some(true));

        let click = UserInputEvent::button_click("grant");
        assert!(click.value.is_none());
    }

    #[test]
    fn test_input_value_untagged() {
        let text: InputValue = serde_json::from_str("\"5\"").unwrap();
        assert_eq!(text, InputValue::Text("5".to_string()));
        let flag: InputValue = serde_json::from_str("false").unwrap();
        assert_eq!(flag, InputValue::Bool(false));
    }
}
