#![forbid(unsafe_code)]

//! Option records.
//!
//! The engine never depends on a concrete option type. Everything it needs
//! is the [`OptionLike`] capability: text to match against, a value to
//! submit, and the three state flags (`selected`, `current`, `focusable`).
//! Two implementations ship with the crate:
//!
//! - [`OptionRecord`]: a plain attribute-bearing record, the common case.
//! - [`InteractiveOption`]: a richer entry with a separate display label, a
//!   description, and a disabled state that keeps it out of keyboard
//!   traversal.
//!
//! Hosts with their own item types implement [`OptionLike`] directly.

use std::fmt;

/// Stable identifier of an option.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OptionId(String);

impl OptionId {
    /// Wrap a caller-provided identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for OptionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for OptionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Capability every option source must provide.
///
/// The flags are the single source of truth for option state; the store
/// derives everything else (selected list, value, current option) from them.
pub trait OptionLike {
    /// Identifier, if one has been provided or assigned.
    fn id(&self) -> Option<&OptionId>;

    /// Give the option an identifier.
    ///
    /// The store only calls this on options whose [`id`](Self::id) is `None`.
    fn assign_id(&mut self, id: OptionId);

    /// Plain-text label used for matching and type-ahead.
    fn content(&self) -> &str;

    /// Text shown in the trigger when selected.
    fn display_value(&self) -> &str {
        self.content()
    }

    /// Value submitted with the form.
    fn value(&self) -> &str;

    /// Whether the option is part of the selection.
    fn is_selected(&self) -> bool;

    /// Set the selection flag.
    fn set_selected(&mut self, selected: bool);

    /// Whether keyboard focus logically rests on this option.
    fn is_current(&self) -> bool;

    /// Set the current flag.
    fn set_current(&mut self, current: bool);

    /// Whether the option takes part in keyboard traversal.
    fn is_focusable(&self) -> bool;

    /// Set the focusable flag.
    fn set_focusable(&mut self, focusable: bool);

    /// Whether the last filter pass kept this option, regardless of
    /// `disabled`.
    fn matches_filter(&self) -> bool {
        self.is_focusable()
    }

    /// Disabled options are never focusable, whatever the filter says.
    fn is_disabled(&self) -> bool {
        false
    }

    /// Build an engine-owned entry, used for the "Add option" custom entry.
    fn synthesize(content: &str, label: &str) -> Self
    where
        Self: Sized;
}

// ---------------------------------------------------------------------------
// OptionRecord
// ---------------------------------------------------------------------------

/// A plain option record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionRecord {
    id: Option<OptionId>,
    content: String,
    label: Option<String>,
    value: Option<String>,
    selected: bool,
    current: bool,
    focusable: bool,
}

impl OptionRecord {
    /// Create an option whose value and display text equal `content`.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: None,
            content: content.into(),
            label: None,
            value: None,
            selected: false,
            current: false,
            focusable: true,
        }
    }

    /// Set an explicit identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<OptionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Set an explicit submitted value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set the text shown in the trigger when selected.
    #[must_use]
    pub fn with_display(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Start out selected.
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

impl OptionLike for OptionRecord {
    fn id(&self) -> Option<&OptionId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: OptionId) {
        self.id = Some(id);
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn display_value(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.content)
    }

    fn value(&self) -> &str {
        self.value.as_deref().unwrap_or(&self.content)
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn is_current(&self) -> bool {
        self.current
    }

    fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    fn is_focusable(&self) -> bool {
        self.focusable
    }

    fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
    }

    fn synthesize(content: &str, label: &str) -> Self {
        Self::new(content).with_display(label)
    }
}

impl From<&str> for OptionRecord {
    fn from(content: &str) -> Self {
        Self::new(content)
    }
}

impl From<String> for OptionRecord {
    fn from(content: String) -> Self {
        Self::new(content)
    }
}

// ---------------------------------------------------------------------------
// InteractiveOption
// ---------------------------------------------------------------------------

/// An option with a display label, a description, and a disabled state.
///
/// Matching runs against `content`; the label is what a rendering layer
/// shows in the list and in the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveOption {
    id: Option<OptionId>,
    content: String,
    label: String,
    value: String,
    description: Option<String>,
    disabled: bool,
    selected: bool,
    current: bool,
    focusable: bool,
}

impl InteractiveOption {
    /// Create an option with a submitted value and a visible label.
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        let label = label.into();
        Self {
            id: None,
            content: label.clone(),
            label,
            value: value.into(),
            description: None,
            disabled: false,
            selected: false,
            current: false,
            focusable: true,
        }
    }

    /// Set an explicit identifier.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<OptionId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Match against `content` instead of the label.
    #[must_use]
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Attach secondary text.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Mark as disabled.
    #[must_use]
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Start out selected.
    #[must_use]
    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    /// The visible label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Secondary text, if any.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Enable or disable the option.
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
    }
}

impl OptionLike for InteractiveOption {
    fn id(&self) -> Option<&OptionId> {
        self.id.as_ref()
    }

    fn assign_id(&mut self, id: OptionId) {
        self.id = Some(id);
    }

    fn content(&self) -> &str {
        &self.content
    }

    fn display_value(&self) -> &str {
        &self.label
    }

    fn value(&self) -> &str {
        &self.value
    }

    fn is_selected(&self) -> bool {
        self.selected
    }

    fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    fn is_current(&self) -> bool {
        self.current
    }

    fn set_current(&mut self, current: bool) {
        self.current = current;
    }

    fn is_focusable(&self) -> bool {
        self.focusable && !self.disabled
    }

    fn set_focusable(&mut self, focusable: bool) {
        self.focusable = focusable;
    }

    fn matches_filter(&self) -> bool {
        self.focusable
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }

    fn synthesize(content: &str, label: &str) -> Self {
        Self::new(content, label).with_content(content)
    }
}

// ---------------------------------------------------------------------------
// Selected snapshots
// ---------------------------------------------------------------------------

/// A snapshot of one entry in the selected list.
///
/// Entries without an id are synthetic: typed tokens that matched no option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedOption {
    /// Identifier of the backing option; `None` for synthetic entries.
    pub id: Option<OptionId>,
    /// Matching text.
    pub content: String,
    /// Trigger text.
    pub display_value: String,
    /// Submitted value.
    pub value: String,
}

impl SelectedOption {
    /// Snapshot a live option.
    #[must_use]
    pub fn of<O: OptionLike>(option: &O) -> Self {
        Self {
            id: option.id().cloned(),
            content: option.content().to_owned(),
            display_value: option.display_value().to_owned(),
            value: option.value().to_owned(),
        }
    }

    /// A synthetic entry carrying `text` as content, label, and value.
    #[must_use]
    pub fn synthetic(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: None,
            content: text.clone(),
            display_value: text.clone(),
            value: text,
        }
    }

    /// Whether this entry has no backing option.
    #[must_use]
    pub fn is_synthetic(&self) -> bool {
        self.id.is_none()
    }

    /// Identity used for diffing: the id when present, the text otherwise.
    pub(crate) fn same_entry(&self, other: &Self) -> bool {
        match (&self.id, &other.id) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.content == other.content,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Id allocation
// ---------------------------------------------------------------------------

/// Hands out `"{prefix}-option-{n}"` identifiers.
#[derive(Debug, Clone)]
pub(crate) struct IdAllocator {
    prefix: String,
    next: u64,
}

impl IdAllocator {
    pub(crate) fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
        }
    }

    /// Next identifier for which `taken` is false.
    pub(crate) fn allocate(&mut self, taken: impl Fn(&str) -> bool) -> OptionId {
        loop {
            let candidate = format!("{}-option-{}", self.prefix, self.next);
            self.next = self.next.saturating_add(1);
            if !taken(&candidate) {
                return OptionId(candidate);
            }
        }
    }
}
