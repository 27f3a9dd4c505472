#![no_main]

use arbitrary::Arbitrary;
use choice_core::event::{
    Event, InputEvent, InputKind, KeyCode, KeyEvent, KeyEventKind, ModifierKey, Modifiers,
    PointerEvent,
};
use choice_widgets::{
    MultipleSelectionType, OptionLike, OptionRecord, PointerTarget, SelectConfig,
    SelectController, StructuralChange,
};
use libfuzzer_sys::fuzz_target;
use web_time::{Duration, Instant};

#[derive(Debug, Arbitrary)]
enum Widget {
    Listbox,
    Select,
    Combobox,
}

#[derive(Debug, Arbitrary)]
enum Key {
    Up,
    Down,
    Home,
    End,
    PageUp,
    PageDown,
    Enter,
    Space,
    Escape,
    Tab,
    Backspace,
    Char(u8),
    ShiftRelease,
}

#[derive(Debug, Arbitrary)]
enum Step {
    Key { key: Key, shift: bool, ctrl: bool },
    Type { text: String, backward: bool },
    ClickOption(u8),
    HoverOption(u8),
    ClickTrigger,
    Add(u8),
    Remove(u8),
    OutsideClick,
    Blur,
    Advance(u16),
}

#[derive(Debug, Arbitrary)]
struct Input {
    widget: Widget,
    multiple: bool,
    manual: bool,
    custom_values: bool,
    filter: bool,
    wrap: bool,
    options: u8,
    steps: Vec<Step>,
}

fn key_event(key: &Key, shift: bool, ctrl: bool) -> KeyEvent {
    let code = match key {
        Key::Up => KeyCode::Up,
        Key::Down => KeyCode::Down,
        Key::Home => KeyCode::Home,
        Key::End => KeyCode::End,
        Key::PageUp => KeyCode::PageUp,
        Key::PageDown => KeyCode::PageDown,
        Key::Enter => KeyCode::Enter,
        Key::Space => KeyCode::Char(' '),
        Key::Escape => KeyCode::Escape,
        Key::Tab => KeyCode::Tab,
        Key::Backspace => KeyCode::Backspace,
        Key::Char(byte) => KeyCode::Char(char::from(b'a' + byte % 26)),
        Key::ShiftRelease => {
            return KeyEvent::new(KeyCode::Modifier(ModifierKey::Shift))
                .with_kind(KeyEventKind::Release);
        }
    };
    let mut modifiers = Modifiers::NONE;
    if shift {
        modifiers |= Modifiers::SHIFT;
    }
    if ctrl {
        modifiers |= Modifiers::CTRL;
    }
    KeyEvent::new(code).with_modifiers(modifiers)
}

fuzz_target!(|input: Input| {
    let base = match input.widget {
        Widget::Listbox => SelectConfig::listbox(),
        Widget::Select => SelectConfig::select(),
        Widget::Combobox => SelectConfig::combobox(),
    };
    let policy = if input.manual {
        MultipleSelectionType::Manual
    } else {
        MultipleSelectionType::Automatic
    };
    let config = base
        .with_multiple(input.multiple)
        .with_multiple_selection_type(policy)
        .with_allow_custom_values(input.custom_values)
        .with_filter_results(input.filter)
        .with_wrap_selection(input.wrap);
    let options = (0..input.options % 16)
        .map(|n| OptionRecord::new(format!("Option {n}")))
        .collect();
    let mut widget: SelectController = SelectController::new(config, options)
        .with_dispatcher(choice_widgets::dispatcher::shared());

    let mut now = Instant::now();
    let mut added = 0u32;
    for step in input.steps.iter().take(256) {
        match step {
            Step::Key { key, shift, ctrl } => {
                widget.handle_event(&Event::Key(key_event(key, *shift, *ctrl)), now);
            }
            Step::Type { text, backward } => {
                let kind = if *backward {
                    InputKind::DeleteBackward
                } else {
                    InputKind::InsertText
                };
                widget.handle_event(&Event::Input(InputEvent::new(text.as_str(), kind)), now);
            }
            Step::ClickOption(index) | Step::HoverOption(index) => {
                let len = widget.store().len();
                if len == 0 {
                    continue;
                }
                let Some(id) = widget.store().options()[usize::from(*index) % len].id().cloned()
                else {
                    continue;
                };
                let event = if matches!(step, Step::ClickOption(_)) {
                    PointerEvent::click()
                } else {
                    PointerEvent::moved()
                };
                widget.handle_pointer(&PointerTarget::Option(id), &event, now);
            }
            Step::ClickTrigger => {
                widget.handle_pointer(&PointerTarget::Trigger, &PointerEvent::click(), now);
            }
            Step::Add(index) => {
                added += 1;
                widget.notify_structure_changed(
                    StructuralChange::Added {
                        index: usize::from(*index),
                        option: OptionRecord::new(format!("Added {added}")),
                    },
                    now,
                );
            }
            Step::Remove(index) => {
                let len = widget.store().len();
                if len == 0 {
                    continue;
                }
                if let Some(id) = widget.store().options()[usize::from(*index) % len].id().cloned() {
                    widget.notify_structure_changed(StructuralChange::Removed(id), now);
                }
            }
            Step::OutsideClick => {
                widget.handle_document_pointer(&[], now);
            }
            Step::Blur => {
                widget.handle_event(&Event::Focus(false), now);
            }
            Step::Advance(ms) => {
                now += Duration::from_millis(u64::from(*ms));
                widget.tick(now);
            }
        }

        let store = widget.store();
        let selected_flags = store.options().iter().filter(|o| o.is_selected()).count();
        let current = store.options().iter().filter(|o| o.is_current()).count();
        if !input.multiple {
            assert!(selected_flags <= 1, "single select has {selected_flags} selected");
        }
        assert!(current <= 1, "{current} current options");
        if let Some(option) = store.current() {
            assert!(option.is_focusable(), "current option is not focusable");
        }
        let live = widget
            .selected_options()
            .iter()
            .filter(|entry| !entry.is_synthetic())
            .count();
        assert_eq!(live, selected_flags, "selected cache out of step");
        let _ = widget.take_events();
    }
});
