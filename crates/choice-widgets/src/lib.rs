#![forbid(unsafe_code)]

//! Selection and keyboard-interaction engine.
//!
//! This crate holds the headless state behind listbox, select, and combobox
//! widgets. It never renders. Hosts feed it structural changes and input
//! events and read back derived state: the current option, the selected
//! options, the computed form value, and the open state of the popup.
//!
//! # Layers
//!
//! - [`option`]: the [`OptionLike`](option::OptionLike) capability and the
//!   two shipped option types.
//! - [`store`]: the ordered option collection, id assignment, filtering,
//!   and the selected-options cache.
//! - Selection and focus movement are methods on
//!   [`OptionStore`](store::OptionStore).
//! - [`search`] and [`autocomplete`]: type-ahead and free-text resolution.
//! - [`controller`]: the open/closed state machine that routes key, pointer,
//!   and text input to the layers above and owns the timers.
//! - [`tabs`]: tab/panel pairing for tablists.

pub mod autocomplete;
pub mod config;
pub mod controller;
pub mod dispatcher;
pub mod events;
mod navigation;
pub mod option;
pub mod search;
mod selection;
pub mod store;
pub mod tabs;
pub mod value;

pub use config::{
    AutocompleteMode, ConfigError, MultipleSelectionType, SelectConfig, ValueType, WidgetKind,
};
pub use controller::{
    OptionAttributes, PointerTarget, SelectController, TimerKey, WidgetAttributes,
};
pub use dispatcher::{OutsideClickDispatcher, SharedDispatcher, WidgetId};
pub use events::{Propagation, WidgetEvent};
pub use option::{InteractiveOption, OptionId, OptionLike, OptionRecord, SelectedOption};
pub use selection::SelectionTarget;
pub use store::{OptionStore, StructuralChange};
pub use tabs::{Activation, TablistState};
pub use value::{FormData, WidgetValue};

/// Case-insensitive `starts_with`.
pub(crate) fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    if prefix.is_empty() {
        return true;
    }
    // Fast path for ASCII
    if haystack.is_ascii() && prefix.is_ascii() {
        let haystack_bytes = haystack.as_bytes();
        let prefix_bytes = prefix.as_bytes();
        if prefix_bytes.len() > haystack_bytes.len() {
            return false;
        }
        return haystack_bytes[..prefix_bytes.len()].eq_ignore_ascii_case(prefix_bytes);
    }
    // Fallback for Unicode (allocates, but correct)
    haystack.to_lowercase().starts_with(&prefix.to_lowercase())
}

/// Case-insensitive equality.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    if a.is_ascii() && b.is_ascii() {
        return a.eq_ignore_ascii_case(b);
    }
    a.to_lowercase() == b.to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_ascii() {
        assert!(starts_with_ignore_case("Option 1", "opt"));
        assert!(starts_with_ignore_case("Option 1", ""));
        assert!(!starts_with_ignore_case("Option 1", "tion"));
        assert!(!starts_with_ignore_case("Op", "Option"));
    }

    #[test]
    fn prefix_unicode() {
        assert!(starts_with_ignore_case("Éclair", "éc"));
        assert!(!starts_with_ignore_case("Crème brûlée", "brû"));
    }

    #[test]
    fn equality() {
        assert!(eq_ignore_case("Apple", "aPPLE"));
        assert!(eq_ignore_case("Öl", "öl"));
        assert!(!eq_ignore_case("Apple", "Apples"));
    }
}
