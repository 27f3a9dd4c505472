#![forbid(unsafe_code)]

//! Canonical input/event types.
//!
//! This module defines the input vocabulary consumed by the selection
//! engine: key presses and releases, pointer activity, and text edits on an
//! editable trigger. All events derive `Clone`, `PartialEq`, and `Eq` for use
//! in tests and pattern matching.
//!
//! # Design Notes
//!
//! - Pointer events carry no coordinates. Hit testing belongs to the
//!   rendering collaborator, which reports *what* was hit alongside the event.
//! - `KeyEventKind` defaults to `Press`; `Release` is only interesting for
//!   modifier keys (the Shift release refreshes the range anchor).
//! - Text edits report the full trigger text *after* the edit plus the kind
//!   of edit, mirroring the `inputType` of a DOM `input` event.

use bitflags::bitflags;

use crate::platform::Platform;

/// Canonical input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A keyboard event.
    Key(KeyEvent),

    /// A pointer event.
    Pointer(PointerEvent),

    /// Text in an editable trigger changed.
    Input(InputEvent),

    /// Focus gained or lost.
    ///
    /// `true` = focus gained, `false` = focus lost.
    Focus(bool),
}

/// A keyboard event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// The key code that was pressed.
    pub code: KeyCode,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,

    /// The type of key event (press, repeat, or release).
    pub kind: KeyEventKind,
}

impl KeyEvent {
    /// Create a new key event with default modifiers and Press kind.
    #[must_use]
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::NONE,
            kind: KeyEventKind::Press,
        }
    }

    /// Create a key event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Create a key event with a specific kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: KeyEventKind) -> Self {
        self.kind = kind;
        self
    }

    /// Check if this is a specific character key.
    #[must_use]
    pub fn is_char(&self, c: char) -> bool {
        matches!(self.code, KeyCode::Char(ch) if ch == c)
    }

    /// Check if Ctrl modifier is held.
    #[must_use]
    pub const fn ctrl(&self) -> bool {
        self.modifiers.contains(Modifiers::CTRL)
    }

    /// Check if Alt modifier is held.
    #[must_use]
    pub const fn alt(&self) -> bool {
        self.modifiers.contains(Modifiers::ALT)
    }

    /// Check if Shift modifier is held.
    #[must_use]
    pub const fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Check if Super/Meta/Cmd modifier is held.
    #[must_use]
    pub const fn super_key(&self) -> bool {
        self.modifiers.contains(Modifiers::SUPER)
    }

    /// Check if the platform's primary shortcut modifier is held.
    ///
    /// That is Command on macOS and Ctrl everywhere else.
    #[must_use]
    pub const fn primary(&self, platform: Platform) -> bool {
        self.modifiers.contains(platform.primary_modifier())
    }

    /// True for presses and auto-repeats, false for releases.
    #[must_use]
    pub const fn is_press(&self) -> bool {
        !matches!(self.kind, KeyEventKind::Release)
    }
}

/// Key codes for keyboard events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A regular character key. Space is `Char(' ')`.
    Char(char),

    /// Enter/Return key.
    Enter,

    /// Escape key.
    Escape,

    /// Backspace key.
    Backspace,

    /// Tab key.
    Tab,

    /// Shift+Tab (back-tab).
    BackTab,

    /// Delete key.
    Delete,

    /// Home key.
    Home,

    /// End key.
    End,

    /// Page Up key.
    PageUp,

    /// Page Down key.
    PageDown,

    /// Up arrow key.
    Up,

    /// Down arrow key.
    Down,

    /// Left arrow key.
    Left,

    /// Right arrow key.
    Right,

    /// A bare modifier key (reported on press and release).
    Modifier(ModifierKey),
}

/// Modifier keys that can be reported as key codes in their own right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModifierKey {
    /// Either Shift key.
    Shift,
    /// Either Control key.
    Control,
    /// Alt/Option key.
    Alt,
    /// Super/Meta/Command key.
    Super,
}

/// The type of key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum KeyEventKind {
    /// Key was pressed (default when not distinguishable).
    #[default]
    Press,

    /// Key is being held (repeat event).
    Repeat,

    /// Key was released.
    Release,
}

bitflags! {
    /// Modifier keys that can be held during a key or pointer event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// No modifiers.
        const NONE  = 0b0000;
        /// Shift key.
        const SHIFT = 0b0001;
        /// Alt/Option key.
        const ALT   = 0b0010;
        /// Control key.
        const CTRL  = 0b0100;
        /// Super/Meta/Command key.
        const SUPER = 0b1000;
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// A pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointerEvent {
    /// The type of pointer event.
    pub kind: PointerEventKind,

    /// Modifier keys held during the event.
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Create a new pointer event.
    #[must_use]
    pub const fn new(kind: PointerEventKind) -> Self {
        Self {
            kind,
            modifiers: Modifiers::NONE,
        }
    }

    /// Primary-button press, the usual "click".
    #[must_use]
    pub const fn click() -> Self {
        Self::new(PointerEventKind::Down(PointerButton::Primary))
    }

    /// Pointer moved (hover).
    #[must_use]
    pub const fn moved() -> Self {
        Self::new(PointerEventKind::Moved)
    }

    /// Create a pointer event with modifiers.
    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Whether this is a primary-button press.
    #[must_use]
    pub const fn is_primary_down(&self) -> bool {
        matches!(self.kind, PointerEventKind::Down(PointerButton::Primary))
    }
}

/// The type of pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// Button pressed down.
    Down(PointerButton),

    /// Button released.
    Up(PointerButton),

    /// Pointer moved (no button pressed).
    Moved,

    /// Pointer left the hit target.
    Left,
}

/// Pointer button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Primary button (usually left).
    Primary,

    /// Secondary button (usually right).
    Secondary,

    /// Auxiliary button (wheel click).
    Auxiliary,
}

/// A text edit on an editable trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEvent {
    /// The full trigger text after the edit was applied.
    pub text: String,

    /// What kind of edit produced the text.
    pub kind: InputKind,
}

impl InputEvent {
    /// Create a new input event.
    #[must_use]
    pub fn new(text: impl Into<String>, kind: InputKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// Text inserted by typing (the common case).
    #[must_use]
    pub fn insert(text: impl Into<String>) -> Self {
        Self::new(text, InputKind::InsertText)
    }

    /// Text shortened by Backspace.
    #[must_use]
    pub fn delete_backward(text: impl Into<String>) -> Self {
        Self::new(text, InputKind::DeleteBackward)
    }
}

/// Kind of text edit, after the DOM `inputType` taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputKind {
    /// Characters typed.
    #[default]
    InsertText,
    /// Text pasted.
    InsertFromPaste,
    /// Backspace.
    DeleteBackward,
    /// Delete (forward).
    DeleteForward,
    /// Cut to clipboard.
    DeleteByCut,
    /// Text replaced wholesale (e.g. by the host).
    Replace,
}

impl InputKind {
    /// Whether this edit removed text before the caret.
    #[must_use]
    pub const fn is_backward_delete(self) -> bool {
        matches!(self, Self::DeleteBackward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_event_is_char() {
        let event = KeyEvent::new(KeyCode::Char('q'));
        assert!(event.is_char('q'));
        assert!(!event.is_char('x'));
    }

    #[test]
    fn key_event_modifiers() {
        let event = KeyEvent::new(KeyCode::Char('a')).with_modifiers(Modifiers::CTRL);
        assert!(event.ctrl());
        assert!(!event.alt());
        assert!(!event.shift());
        assert!(!event.super_key());
    }

    #[test]
    fn key_event_combined_modifiers() {
        let event =
            KeyEvent::new(KeyCode::Home).with_modifiers(Modifiers::CTRL | Modifiers::SHIFT);
        assert!(event.ctrl());
        assert!(event.shift());
        assert!(!event.alt());
    }

    #[test]
    fn primary_modifier_follows_platform() {
        let cmd_a = KeyEvent::new(KeyCode::Char('a')).with_modifiers(Modifiers::SUPER);
        let ctrl_a = KeyEvent::new(KeyCode::Char('a')).with_modifiers(Modifiers::CTRL);

        assert!(cmd_a.primary(Platform::MacOs));
        assert!(!ctrl_a.primary(Platform::MacOs));
        assert!(ctrl_a.primary(Platform::Linux));
        assert!(!cmd_a.primary(Platform::Windows));
    }

    #[test]
    fn key_event_kind() {
        let press = KeyEvent::new(KeyCode::Enter);
        assert_eq!(press.kind, KeyEventKind::Press);
        assert!(press.is_press());

        let release = press.with_kind(KeyEventKind::Release);
        assert_eq!(release.kind, KeyEventKind::Release);
        assert!(!release.is_press());

        assert!(press.with_kind(KeyEventKind::Repeat).is_press());
    }

    #[test]
    fn pointer_event_helpers() {
        assert!(PointerEvent::click().is_primary_down());
        assert!(!PointerEvent::moved().is_primary_down());
        let secondary = PointerEvent::new(PointerEventKind::Down(PointerButton::Secondary));
        assert!(!secondary.is_primary_down());
    }

    #[test]
    fn pointer_event_with_modifiers() {
        let event = PointerEvent::click().with_modifiers(Modifiers::SHIFT);
        assert_eq!(event.modifiers, Modifiers::SHIFT);
    }

    #[test]
    fn input_event_kinds() {
        assert!(InputEvent::delete_backward("Op").kind.is_backward_delete());
        assert!(!InputEvent::insert("Opt").kind.is_backward_delete());
        assert!(!InputKind::DeleteForward.is_backward_delete());
        assert_eq!(InputKind::default(), InputKind::InsertText);
    }

    #[test]
    fn modifiers_default() {
        assert_eq!(Modifiers::default(), Modifiers::NONE);
    }

    #[test]
    fn event_is_clone_and_eq() {
        let event = Event::Input(InputEvent::insert("x"));
        let cloned = event.clone();
        assert_eq!(event, cloned);
        let _key = Event::Key(KeyEvent::new(KeyCode::Modifier(ModifierKey::Shift)));
        let _pointer = Event::Pointer(PointerEvent::click());
        let _focus = Event::Focus(true);
    }
}
