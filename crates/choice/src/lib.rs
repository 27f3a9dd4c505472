#![forbid(unsafe_code)]

//! choice public facade crate.
//!
//! This crate provides the stable surface area for hosts. It re-exports the
//! input types from `choice-core` and the engine from `choice-widgets`, and
//! offers a prelude for day-to-day usage.
//!
//! ```
//! use choice::prelude::*;
//!
//! let options = ["Apple", "Banana", "Cherry"].map(OptionRecord::from).to_vec();
//! let mut select: SelectController = SelectController::new(SelectConfig::select(), options);
//! let now = Instant::now();
//!
//! select.handle_event(&Event::Key(KeyEvent::new(KeyCode::Down)), now);
//! select.handle_event(&Event::Key(KeyEvent::new(KeyCode::Enter)), now);
//! assert_eq!(select.value(), &WidgetValue::Scalar("Apple".to_owned()));
//! ```

// --- Core re-exports -------------------------------------------------------

pub use choice_core::event::{
    Event, InputEvent, InputKind, KeyCode, KeyEvent, KeyEventKind, ModifierKey, Modifiers,
    PointerButton, PointerEvent, PointerEventKind,
};
pub use choice_core::platform::Platform;
pub use choice_core::timer::TimerSet;
pub use web_time::{Duration, Instant};

// --- Engine re-exports -----------------------------------------------------

pub use choice_widgets::autocomplete::TriggerText;
pub use choice_widgets::{
    Activation, AutocompleteMode, ConfigError, FormData, InteractiveOption,
    MultipleSelectionType, OptionAttributes, OptionId, OptionLike, OptionRecord, OptionStore,
    OutsideClickDispatcher, PointerTarget, Propagation, SelectConfig, SelectController,
    SelectedOption, SelectionTarget, SharedDispatcher, StructuralChange, TablistState, TimerKey,
    ValueType, WidgetAttributes, WidgetEvent, WidgetId, WidgetKind, WidgetValue,
};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Event, InputEvent, Instant, KeyCode, KeyEvent, Modifiers, OptionId, OptionLike,
        OptionRecord, PointerEvent, PointerTarget, Propagation, SelectConfig, SelectController,
        StructuralChange, WidgetEvent, WidgetValue,
    };

    pub use crate::{core, widgets};
}

pub use choice_core as core;
pub use choice_widgets as widgets;
