#![forbid(unsafe_code)]

//! Events emitted for the rendering, positioning, and form collaborators.
//!
//! Events are queued in emission order and drained by the host with
//! `take_events`. Only [`WidgetEvent::ItemChosen`] can influence the engine,
//! and it does so synchronously through a [`ChosenHandler`] rather than
//! through the queue.

use std::fmt;

use crate::autocomplete::TriggerText;
use crate::option::{OptionId, SelectedOption};
use crate::value::WidgetValue;

/// Something the engine wants its collaborators to know about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetEvent {
    /// An option (or synthetic entry) was selected.
    Selected(SelectedOption),
    /// An option (or synthetic entry) was deselected. Also emitted for
    /// deselect requests that changed nothing.
    Deselected(SelectedOption),
    /// A selectable action resolved to a concrete item.
    ItemChosen(SelectedOption),
    /// The value changed (input semantics).
    Input(WidgetValue),
    /// The value changed (change semantics). Always follows `Input`.
    Change(WidgetValue),
    /// The popup opened.
    Opened,
    /// The popup closed.
    Closed,
    /// One rendering turn passed after opening; the popup can be anchored.
    PositionPopup,
    /// One rendering turn passed after closing; the popup can be hidden.
    PopupHidden,
    /// The option should be scrolled into view.
    ScrollIntoView(OptionId),
    /// The trigger text (and its selected range) changed.
    TriggerTextChanged(TriggerText),
}

/// Whether the default action of a cancelable event should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    /// Run the default action.
    #[default]
    Continue,
    /// Veto the default action.
    PreventDefault,
}

impl Propagation {
    /// Whether the default action was vetoed.
    #[must_use]
    pub const fn is_prevented(self) -> bool {
        matches!(self, Self::PreventDefault)
    }
}

/// Listener for item-chosen events.
///
/// Returning [`Propagation::PreventDefault`] keeps a single-select popup open
/// after the pick.
pub struct ChosenHandler(Box<dyn FnMut(&SelectedOption) -> Propagation + Send>);

impl ChosenHandler {
    /// Wrap a listener closure.
    pub fn new(handler: impl FnMut(&SelectedOption) -> Propagation + Send + 'static) -> Self {
        Self(Box::new(handler))
    }

    pub(crate) fn call(&mut self, chosen: &SelectedOption) -> Propagation {
        (self.0)(chosen)
    }
}

impl fmt::Debug for ChosenHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChosenHandler").finish_non_exhaustive()
    }
}
