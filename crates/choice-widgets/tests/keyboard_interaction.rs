#![forbid(unsafe_code)]

//! Keyboard and pointer interaction tests driven through `handle_event`.
//!
//! Proves that:
//! 1. Arrow keys open a closed popup without moving, then move
//! 2. Enter chooses, Escape closes without touching the selection
//! 3. Pre-selected options drive the initial value and the focus on open
//! 4. Shift+Arrow range extension shrinks instead of accumulating
//! 5. Delimited multi-value text resolves confirmed tokens and leaves the
//!    in-progress token alone until it is committed
//! 6. Outside clicks close only the widgets they miss
//!
//! Run:
//!   cargo test -p choice-widgets --test keyboard_interaction

use std::time::Duration;

use choice_core::event::{Event, InputEvent, KeyCode, KeyEvent, Modifiers, PointerEvent};
use choice_core::platform::Platform;
use choice_widgets::dispatcher;
use choice_widgets::{
    MultipleSelectionType, OptionLike, OptionRecord, PointerTarget, SelectConfig,
    SelectController, WidgetEvent, WidgetValue,
};
use web_time::Instant;

fn press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code))
}

fn shift_press(code: KeyCode) -> Event {
    Event::Key(KeyEvent::new(code).with_modifiers(Modifiers::SHIFT))
}

fn ten_options() -> Vec<OptionRecord> {
    (1..=10)
        .map(|n| OptionRecord::new(format!("Option {n}")).with_value(format!("{n}")))
        .collect()
}

fn widget(config: SelectConfig, options: Vec<OptionRecord>) -> SelectController {
    SelectController::new(config, options)
        .with_platform(Platform::Windows)
        .with_dispatcher(dispatcher::shared())
}

fn contents(controller: &SelectController) -> Vec<String> {
    controller
        .selected_options()
        .iter()
        .map(|entry| entry.content.clone())
        .collect()
}

// ============================================================================
// 1. Basic single-select flow
// ============================================================================

#[test]
fn down_opens_enter_selects_escape_closes() {
    let now = Instant::now();
    let mut select = widget(SelectConfig::select(), ten_options());
    select.on_item_chosen(|_| choice_widgets::Propagation::PreventDefault);

    assert!(select.handle_event(&press(KeyCode::Down), now));
    assert!(select.is_open());
    let current = select.current_option().expect("current option");
    assert_eq!(current.content(), "Option 1");
    assert!(!current.is_selected());

    assert!(select.handle_event(&press(KeyCode::Enter), now));
    let current = select.current_option().expect("current option");
    assert_eq!(current.content(), "Option 1");
    assert!(current.is_selected());
    assert_eq!(select.value(), &WidgetValue::Scalar("1".to_owned()));

    assert!(select.handle_event(&press(KeyCode::Escape), now));
    assert!(!select.is_open());
    assert_eq!(contents(&select), vec!["Option 1"]);
    assert_eq!(select.value(), &WidgetValue::Scalar("1".to_owned()));
}

#[test]
fn second_arrow_press_moves() {
    let now = Instant::now();
    let mut select = widget(SelectConfig::select(), ten_options());
    select.handle_event(&press(KeyCode::Up), now);
    assert_eq!(select.store().current_index(), Some(0));
    select.handle_event(&press(KeyCode::Down), now);
    select.handle_event(&press(KeyCode::Down), now);
    assert_eq!(select.store().current_index(), Some(2));
}

#[test]
fn enter_and_space_open_a_closed_select() {
    let now = Instant::now();
    let mut select = widget(SelectConfig::select(), ten_options());
    assert!(select.handle_event(&press(KeyCode::Enter), now));
    assert!(select.is_open());
    assert!(select.selected_options().is_empty());

    select.close(now);
    assert!(select.handle_event(&press(KeyCode::Char(' ')), now));
    assert!(select.is_open());
    assert!(select.selected_options().is_empty());
}

#[test]
fn value_events_come_in_input_change_pairs() {
    let now = Instant::now();
    let mut select = widget(SelectConfig::select(), ten_options());
    select.handle_event(&press(KeyCode::Down), now);
    select.take_events();
    select.handle_event(&press(KeyCode::Enter), now);

    let events = select.take_events();
    let input = events
        .iter()
        .position(|event| matches!(event, WidgetEvent::Input(_)))
        .expect("input event");
    assert!(matches!(&events[input + 1], WidgetEvent::Change(v) if v.as_text() == Some("1")));
    assert!(events.iter().any(|event| matches!(event, WidgetEvent::Selected(e) if e.value == "1")));
    assert!(events.iter().any(|event| matches!(event, WidgetEvent::ItemChosen(_))));
    assert_eq!(events.last(), Some(&WidgetEvent::Closed));
}

// ============================================================================
// 2. Pre-selected option
// ============================================================================

#[test]
fn preselected_option_is_value_and_focus_target() {
    let now = Instant::now();
    let mut options = ten_options();
    options[3] = options[3].clone().with_selected(true);
    let mut select = widget(SelectConfig::select(), options);

    assert_eq!(select.value(), &WidgetValue::Scalar("4".to_owned()));
    select.handle_event(&press(KeyCode::Down), now);
    assert_eq!(
        select.current_option().map(OptionLike::content),
        Some("Option 4")
    );
}

// ============================================================================
// 3. Range extension
// ============================================================================

#[test]
fn shift_arrow_range_shrinks_back() {
    let now = Instant::now();
    let mut listbox = widget(SelectConfig::listbox().with_multiple(true), ten_options());
    listbox.focus_at(0);
    for _ in 0..3 {
        listbox.handle_event(&shift_press(KeyCode::Down), now);
    }
    assert_eq!(listbox.store().selected_indices(), vec![0, 1, 2, 3]);
    listbox.handle_event(&shift_press(KeyCode::Up), now);
    assert_eq!(listbox.store().selected_indices(), vec![0, 1, 2]);
}

#[test]
fn shift_arrow_without_anchor_ranges_from_first_option() {
    let now = Instant::now();
    let mut listbox = widget(SelectConfig::listbox().with_multiple(true), ten_options());
    for _ in 0..3 {
        listbox.handle_event(&press(KeyCode::Down), now);
    }
    assert_eq!(listbox.store().anchor(), None);
    listbox.handle_event(&shift_press(KeyCode::Down), now);
    assert_eq!(listbox.store().selected_indices(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn shift_space_extends_from_closest_selected() {
    let now = Instant::now();
    let mut listbox = widget(SelectConfig::listbox().with_multiple(true), ten_options());
    listbox.focus_at(1);
    listbox.handle_event(&press(KeyCode::Char(' ')), now);
    listbox.focus_at(4);
    listbox.handle_event(&shift_press(KeyCode::Char(' ')), now);
    assert_eq!(listbox.store().selected_indices(), vec![1, 2, 3, 4]);
}

#[test]
fn multi_select_popup_stays_open_on_choice() {
    let now = Instant::now();
    let mut select = widget(SelectConfig::select().with_multiple(true), ten_options());
    select.handle_event(&press(KeyCode::Down), now);
    select.handle_event(&press(KeyCode::Enter), now);
    select.handle_event(&press(KeyCode::Down), now);
    select.handle_event(&press(KeyCode::Enter), now);
    assert!(select.is_open());
    assert_eq!(select.value(), &WidgetValue::Joined("1,2".to_owned()));

    // Enter again toggles off.
    select.handle_event(&press(KeyCode::Enter), now);
    assert_eq!(select.value(), &WidgetValue::Joined("1".to_owned()));
}

// ============================================================================
// 4. Delimited multi-value text
// ============================================================================

#[test]
fn delimited_text_confirms_matching_tokens() {
    let now = Instant::now();
    let config = SelectConfig::combobox().with_multiple(true);
    let mut combo = widget(config, ten_options());

    combo.handle_event(
        &Event::Input(InputEvent::insert("Option 1, Option 2, App")),
        now,
    );
    assert_eq!(contents(&combo), vec!["Option 1", "Option 2"]);

    combo.handle_event(&press(KeyCode::Enter), now);
    assert_eq!(contents(&combo), vec!["Option 1", "Option 2"]);
}

#[test]
fn manual_policy_commits_tokens_on_enter() {
    let now = Instant::now();
    let config = SelectConfig::combobox()
        .with_multiple(true)
        .with_multiple_selection_type(MultipleSelectionType::Manual)
        .with_allow_custom_values(true);
    let mut combo = widget(config, ten_options());

    combo.handle_event(
        &Event::Input(InputEvent::insert("Option 1, Option 2, App")),
        now,
    );
    assert!(combo.selected_options().is_empty(), "manual waits for commit");
    assert!(combo.store().custom_entry().is_some());

    combo.close(now);
    combo.handle_event(&press(KeyCode::Enter), now);
    assert_eq!(contents(&combo), vec!["Option 1", "Option 2", "App"]);
    assert!(combo.selected_options()[2].is_synthetic());
    assert!(combo.trigger_text().is_empty());
    assert!(combo.store().custom_entry().is_none());
}

#[test]
fn select_all_shortcut_is_skipped_while_typing() {
    let now = Instant::now();
    let config = SelectConfig::combobox().with_multiple(true);
    let mut combo = widget(config, ten_options());
    combo.handle_event(&Event::Input(InputEvent::insert("Opt")), now);
    let ctrl_a = KeyEvent::new(KeyCode::Char('a')).with_modifiers(Modifiers::CTRL);
    assert!(!combo.handle_event(&Event::Key(ctrl_a), now));
}

// ============================================================================
// 5. Pointer and outside clicks
// ============================================================================

#[test]
fn shift_click_selects_range_from_anchor() {
    let now = Instant::now();
    let mut listbox = widget(SelectConfig::listbox().with_multiple(true), ten_options());
    let ids: Vec<_> = listbox
        .store()
        .options()
        .iter()
        .filter_map(|option| option.id().cloned())
        .collect();

    listbox.handle_pointer(&PointerTarget::Option(ids[2].clone()), &PointerEvent::click(), now);
    let shift_click = PointerEvent::click().with_modifiers(Modifiers::SHIFT);
    listbox.handle_pointer(&PointerTarget::Option(ids[5].clone()), &shift_click, now);
    assert_eq!(listbox.store().selected_indices(), vec![2, 3, 4, 5]);
}

#[test]
fn outside_click_closes_only_missed_widgets() {
    let now = Instant::now();
    let shared = dispatcher::shared();
    let mut first = SelectController::<OptionRecord>::new(SelectConfig::select(), ten_options())
        .with_dispatcher(shared.clone());
    let mut second = SelectController::<OptionRecord>::new(SelectConfig::select(), ten_options())
        .with_dispatcher(shared.clone());

    first.handle_pointer(&PointerTarget::Trigger, &PointerEvent::click(), now);
    second.handle_pointer(&PointerTarget::Trigger, &PointerEvent::click(), now);

    let path = [second.id()];
    assert!(first.handle_document_pointer(&path, now));
    assert!(!second.handle_document_pointer(&path, now));
    assert!(!first.is_open());
    assert!(second.is_open());

    second.handle_event(&Event::Focus(false), now + Duration::from_millis(1));
    assert!(!second.is_open());
}
