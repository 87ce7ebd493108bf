//! The UI element tree exchanged with the host.
//!
//! Concrete widgets and layout belong to whoever renders a permission type;
//! this tree is only rich enough for the confirmation flow to compose a
//! dialog frame around rendered content and for tests to inspect it.

use serde::{Deserialize, Serialize};

use crate::types::ElementId;

/// A node in the confirmation UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiElement {
    /// Vertical stack of children.
    Container {
        /// Child elements.
        children: Vec<UiElement>,
    },
    /// Titled group of children.
    Section {
        /// Optional section title.
        title: Option<String>,
        /// Child elements.
        children: Vec<UiElement>,
    },
    /// Heading text.
    Heading {
        /// Heading content.
        text: String,
    },
    /// Plain text.
    Text {
        /// Text content.
        text: String,
    },
    /// Placeholder shown while data is still loading.
    Skeleton,
    /// Editable text field.
    Field {
        /// Element identifier reported back in input events.
        id: ElementId,
        /// Field label.
        label: String,
        /// Current display value.
        value: String,
        /// Validation message to show under the field.
        error: Option<String>,
        /// Whether the field accepts input.
        disabled: bool,
    },
    /// Boolean toggle.
    Checkbox {
        /// Element identifier reported back in input events.
        id: ElementId,
        /// Checkbox label.
        label: String,
        /// Current state.
        checked: bool,
        /// Whether the checkbox accepts input.
        disabled: bool,
    },
    /// Clickable button.
    Button {
        /// Element identifier reported back in input events.
        id: ElementId,
        /// Button label.
        label: String,
        /// Whether the button accepts clicks.
        disabled: bool,
    },
    /// Dialog footer holding the action buttons.
    Footer {
        /// Child elements.
        children: Vec<UiElement>,
    },
}

impl UiElement {
    /// Create a container.
    #[must_use]
    pub fn container(children: Vec<UiElement>) -> Self {
        Self::Container { children }
    }

    /// Create a titled section.
    #[must_use]
    pub fn section(title: impl Into<String>, children: Vec<UiElement>) -> Self {
        Self::Section {
            title: Some(title.into()),
            children,
        }
    }

    /// Create a heading.
    #[must_use]
    pub fn heading(text: impl Into<String>) -> Self {
        Self::Heading { text: text.into() }
    }

    /// Create a text node.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create an enabled field with no error.
    #[must_use]
    pub fn field(id: impl Into<ElementId>, label: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Field {
            id: id.into(),
            label: label.into(),
            value: value.into(),
            error: None,
            disabled: false,
        }
    }

    /// Create an enabled checkbox.
    #[must_use]
    pub fn checkbox(id: impl Into<ElementId>, label: impl Into<String>, checked: bool) -> Self {
        Self::Checkbox {
            id: id.into(),
            label: label.into(),
            checked,
            disabled: false,
        }
    }

    /// Create a button.
    #[must_use]
    pub fn button(id: impl Into<ElementId>, label: impl Into<String>, disabled: bool) -> Self {
        Self::Button {
            id: id.into(),
            label: label.into(),
            disabled,
        }
    }

    /// Attach a validation message. No-op on anything but a field.
    #[must_use]
    pub fn with_error(mut self, message: Option<String>) -> Self {
        if let Self::Field { error, .. } = &mut self {
            *error = message;
        }
        self
    }

    /// Mark a field or checkbox as read-only. No-op on other elements.
    #[must_use]
    pub fn read_only(mut self, read_only: bool) -> Self {
        match &mut self {
            Self::Field { disabled, .. } | Self::Checkbox { disabled, .. } => {
                *disabled = read_only;
            },
            _ => {},
        }
        self
    }

    /// Direct children of this element.
    #[must_use]
    pub fn children(&self) -> &[UiElement] {
        match self {
            Self::Container { children }
            | Self::Section { children, .. }
            | Self::Footer { children } => children,
            _ => &[],
        }
    }

    /// The element ID of interactive elements.
    #[must_use]
    pub fn id(&self) -> Option<&ElementId> {
        match self {
            Self::Field { id, .. } | Self::Checkbox { id, .. } | Self::Button { id, .. } => {
                Some(id)
            },
            _ => None,
        }
    }

    /// Depth-first search for an interactive element by ID.
    #[must_use]
    pub fn find(&self, target: &ElementId) -> Option<&UiElement> {
        if self.id() == Some(target) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(target))
    }

    /// Whether any node in the tree is a skeleton placeholder.
    #[must_use]
    pub fn contains_skeleton(&self) -> bool {
        matches!(self, Self::Skeleton) || self.children().iter().any(Self::contains_skeleton)
    }

    /// Whether the tree contains a text node with exactly this content.
    #[must_use]
    pub fn contains_text(&self, needle: &str) -> bool {
        match self {
            Self::Text { text } | Self::Heading { text } => text == needle,
            _ => self.children().iter().any(|c| c.contains_text(needle)),
        }
    }

    /// Disabled state of a button, if the button exists.
    #[must_use]
    pub fn button_disabled(&self, target: &ElementId) -> Option<bool> {
        match self.find(target)? {
            Self::Button { disabled, .. } => Some(*disabled),
            _ => None,
        }
    }

    /// Current value of a field, if the field exists.
    #[must_use]
    pub fn field_value(&self, target: &ElementId) -> Option<&str> {
        match self.find(target)? {
            Self::Field { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Validation message currently shown on a field.
    #[must_use]
    pub fn field_error(&self, target: &ElementId) -> Option<&str> {
        match self.find(target)? {
            Self::Field { error, .. } => error.as_deref(),
            _ => None,
        }
    }
}
