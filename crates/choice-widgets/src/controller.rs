#![forbid(unsafe_code)]

//! Keyboard and pointer interaction controller.
//!
//! [`SelectController`] is the state machine behind listbox, select, and
//! combobox widgets. It has two super-states, closed and open, and routes
//! every input to the option store, the type-ahead buffer, or the
//! autocomplete resolver.
//!
//! # Time
//!
//! The controller never reads the clock. Every entry point that can arm a
//! timer takes `now`, and the host calls [`SelectController::tick`] with the
//! current time to fire expired timers. [`SelectController::next_deadline`]
//! tells the host when the next wake-up is due.
//!
//! | Timer | Armed by | Fires |
//! |-------|----------|-------|
//! | `RebuildOptions` | structural change | applies queued changes |
//! | `ClearSearchBuffer` | type-ahead keystroke | empties the buffer |
//! | `PositionPopup` | open | emits `PositionPopup` |
//! | `Teardown` | close | emits `PopupHidden` |
//!
//! # Key Bindings (open popup)
//!
//! | Key | Action |
//! |-----|--------|
//! | Up / Down | Move current option |
//! | Home / End | First / last option |
//! | PageUp / PageDown | Move by `page_size` |
//! | Enter / Space | Choose the current option |
//! | Escape | Close |
//! | Tab | Accept ghost completion, close, not consumed |
//! | Shift+Up / Shift+Down | Extend range from the anchor (multi) |
//! | Shift+Space / Shift+Enter | Extend from the closest selected (multi) |
//! | Primary+A | Select all / deselect all (multi) |
//! | Primary+Shift+Home / End | Select to first / last (multi) |
//!
//! Primary is Command on macOS and Ctrl elsewhere.

use choice_core::event::{
    Event, InputEvent, KeyCode, KeyEvent, KeyEventKind, ModifierKey, Modifiers, PointerButton,
    PointerEvent, PointerEventKind,
};
use choice_core::platform::Platform;
use choice_core::timer::TimerSet;
use web_time::Instant;

use crate::autocomplete::{
    join_tokens, parse_tokens, resolve_tokens, should_select_suggested_option, suggest,
    TriggerText,
};
use crate::config::{AutocompleteMode, MultipleSelectionType, SelectConfig};
use crate::dispatcher::{self, SharedDispatcher, WidgetId};
use crate::events::{ChosenHandler, Propagation, WidgetEvent};
use crate::option::{OptionId, OptionLike, OptionRecord, SelectedOption};
use crate::search::SearchBuffer;
use crate::selection::SelectionTarget;
use crate::starts_with_ignore_case;
use crate::store::{OptionStore, StructuralChange};
use crate::value::WidgetValue;

/// Named timers owned by a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKey {
    /// Debounced application of queued structural changes.
    RebuildOptions,
    /// Type-ahead buffer reset.
    ClearSearchBuffer,
    /// One rendering turn after opening.
    PositionPopup,
    /// One rendering turn after closing.
    Teardown,
}

/// What a pointer event hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PointerTarget {
    /// The trigger (button or text field).
    Trigger,
    /// An option in the list.
    Option(OptionId),
}

/// Presentation attributes of one option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionAttributes {
    /// Option id.
    pub id: OptionId,
    /// Part of the selection.
    pub selected: bool,
    /// Keyboard focus rests here.
    pub current: bool,
    /// Hidden by the filter.
    pub hidden: bool,
}

/// Presentation attributes of the whole widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetAttributes {
    /// Popup state; `None` for widgets without a popup.
    pub expanded: Option<bool>,
    /// More than one option may be selected.
    pub multiselectable: bool,
    /// Current option while the list is presented.
    pub active_descendant: Option<OptionId>,
    /// Per-option attributes in collection order.
    pub options: Vec<OptionAttributes>,
}

/// Interaction state machine for one widget instance.
#[derive(Debug)]
pub struct SelectController<O: OptionLike = OptionRecord> {
    config: SelectConfig,
    platform: Platform,
    id: WidgetId,
    store: OptionStore<O>,
    search: SearchBuffer,
    timers: TimerSet<TimerKey>,
    pending: Vec<StructuralChange<O>>,
    trigger: TriggerText,
    suggestion_pending: bool,
    open: bool,
    mounted: bool,
    value: WidgetValue,
    dispatcher: SharedDispatcher,
    on_chosen: Option<ChosenHandler>,
}

impl<O: OptionLike> SelectController<O> {
    /// Create a controller over `options`.
    ///
    /// The configuration is validated first. Options that start selected
    /// determine the initial value; no events are emitted for them.
    #[must_use]
    pub fn new(config: SelectConfig, options: Vec<O>) -> Self {
        let config = config.validated();
        let mut store = OptionStore::from_config(&config);
        store.rebuild(options, "");
        store.take_events();
        let open = !config.kind.has_popup();
        let mut controller = Self {
            config,
            platform: Platform::from_env(),
            id: WidgetId::next(),
            store,
            search: SearchBuffer::new(),
            timers: TimerSet::new(),
            pending: Vec::new(),
            trigger: TriggerText::default(),
            suggestion_pending: false,
            open,
            mounted: true,
            value: WidgetValue::Empty,
            dispatcher: dispatcher::global(),
            on_chosen: None,
        };
        if controller.config.is_editable() {
            controller.trigger = TriggerText::plain(controller.selection_text());
        }
        controller.value = controller.compute_value();
        controller
    }

    /// Use `platform` for the primary shortcut modifier.
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Register with `dispatcher` instead of the process-wide one.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: SharedDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Install the item-chosen listener.
    pub fn on_item_chosen(
        &mut self,
        handler: impl FnMut(&SelectedOption) -> Propagation + Send + 'static,
    ) {
        self.on_chosen = Some(ChosenHandler::new(handler));
    }

    // -----------------------------------------------------------------------
    // Derived state
    // -----------------------------------------------------------------------

    /// The configuration in effect.
    #[must_use]
    pub fn config(&self) -> &SelectConfig {
        &self.config
    }

    /// The option store.
    #[must_use]
    pub fn store(&self) -> &OptionStore<O> {
        &self.store
    }

    /// Identity used with the outside-click dispatcher.
    #[must_use]
    pub fn id(&self) -> WidgetId {
        self.id
    }

    /// Whether the list is presented. Always true for a listbox.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The popup state for presentation; `None` without a popup.
    #[must_use]
    pub fn expanded(&self) -> Option<bool> {
        self.config.kind.has_popup().then_some(self.open)
    }

    /// The form value.
    #[must_use]
    pub fn value(&self) -> &WidgetValue {
        &self.value
    }

    /// Selected entries in selection order.
    #[must_use]
    pub fn selected_options(&self) -> &[SelectedOption] {
        self.store.selected_options()
    }

    /// The current option.
    #[must_use]
    pub fn current_option(&self) -> Option<&O> {
        self.store.current()
    }

    /// Id of the current option.
    #[must_use]
    pub fn current_id(&self) -> Option<&OptionId> {
        self.store.current_id()
    }

    /// Text in the trigger.
    #[must_use]
    pub fn trigger_text(&self) -> &TriggerText {
        &self.trigger
    }

    /// Whether a ghost completion is waiting to be accepted or overwritten.
    #[must_use]
    pub fn has_pending_suggestion(&self) -> bool {
        self.suggestion_pending
    }

    /// The type-ahead buffer.
    #[must_use]
    pub fn search_buffer(&self) -> &str {
        self.search.as_str()
    }

    /// Whether a timer is armed.
    #[must_use]
    pub fn is_timer_pending(&self, key: TimerKey) -> bool {
        self.timers.is_pending(key)
    }

    /// When the host should next call [`tick`](Self::tick).
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.next_deadline()
    }

    /// Events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        self.store.take_events()
    }

    /// Attributes for the rendering layer.
    #[must_use]
    pub fn attributes(&self) -> WidgetAttributes {
        WidgetAttributes {
            expanded: self.expanded(),
            multiselectable: self.config.multiple,
            active_descendant: if self.open {
                self.store.current_id().cloned()
            } else {
                None
            },
            options: self
                .store
                .options()
                .iter()
                .filter_map(|option| {
                    Some(OptionAttributes {
                        id: option.id()?.clone(),
                        selected: option.is_selected(),
                        current: option.is_current(),
                        hidden: !option.matches_filter(),
                    })
                })
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Open the popup.
    ///
    /// The first selected option becomes current; without one the current
    /// option is kept, falling back to the first option. Returns `false` if
    /// there is no popup or it is already open.
    pub fn open(&mut self, now: Instant) -> bool {
        if !self.mounted || !self.config.kind.has_popup() || self.open {
            return false;
        }
        self.open = true;
        self.timers.cancel(TimerKey::Teardown);
        self.timers
            .arm(TimerKey::PositionPopup, now, self.config.render_turn);

        let first_selected = self
            .store
            .selected_indices()
            .into_iter()
            .find(|&index| self.store.options()[index].is_focusable());
        match first_selected.or(self.store.current_index()) {
            Some(index) => {
                self.store.set_current_index(index);
            }
            None => {
                self.store.focus_first();
            }
        }

        dispatcher::lock(&self.dispatcher).register(self.id);
        self.store.push_event(WidgetEvent::Opened);
        tracing::debug!(
            message = "select.open",
            widget = self.id.get(),
            current = self.store.current_index()
        );
        true
    }

    /// Close the popup.
    ///
    /// Cancels the type-ahead timer and applies any queued structural
    /// changes right away. Returns `false` if nothing was open.
    pub fn close(&mut self, now: Instant) -> bool {
        if !self.config.kind.has_popup() || !self.open {
            return false;
        }
        self.open = false;
        self.timers.cancel(TimerKey::ClearSearchBuffer);
        self.search.clear();
        if self.timers.cancel(TimerKey::RebuildOptions) {
            self.flush_pending();
        }
        self.timers.cancel(TimerKey::PositionPopup);
        self.timers.arm(TimerKey::Teardown, now, self.config.render_turn);
        dispatcher::lock(&self.dispatcher).unregister(self.id);

        // Whatever was typed is settled; the next open shows every option.
        let filter_text = self.store.filter().text.clone();
        self.store.set_filter(&filter_text, true);

        self.store.push_event(WidgetEvent::Closed);
        tracing::debug!(
            message = "select.close",
            widget = self.id.get(),
            selected = self.store.selected_options().len()
        );
        true
    }

    /// Tear the widget down: cancel every timer, drop queued changes, and
    /// leave the dispatcher. Later input is ignored.
    pub fn unmount(&mut self) {
        self.timers.cancel_all();
        self.pending.clear();
        self.search.clear();
        dispatcher::lock(&self.dispatcher).unregister(self.id);
        if self.config.kind.has_popup() {
            self.open = false;
        }
        self.mounted = false;
    }

    /// Queue a structural change; it is applied when the rebuild debounce
    /// expires (or immediately on close).
    pub fn notify_structure_changed(&mut self, change: StructuralChange<O>, now: Instant) {
        if !self.mounted {
            return;
        }
        self.pending.push(change);
        self.timers
            .arm(TimerKey::RebuildOptions, now, self.config.rebuild_debounce);
    }

    /// Fire every timer due at `now`. Returns `true` if any fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self.timers.take_expired(now);
        for key in &expired {
            match key {
                TimerKey::RebuildOptions => self.flush_pending(),
                TimerKey::ClearSearchBuffer => self.search.clear(),
                TimerKey::PositionPopup => {
                    if self.open {
                        self.store.push_event(WidgetEvent::PositionPopup);
                    }
                }
                TimerKey::Teardown => {
                    if !self.open {
                        self.store.push_event(WidgetEvent::PopupHidden);
                    }
                }
            }
        }
        !expired.is_empty()
    }

    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        let changes = std::mem::take(&mut self.pending);
        self.store.apply(changes);
        self.sync_value();
    }

    // -----------------------------------------------------------------------
    // Input routing
    // -----------------------------------------------------------------------

    /// Handle one input event. Returns `true` if it was consumed.
    ///
    /// Pointer events without a target are treated as hitting the trigger.
    pub fn handle_event(&mut self, event: &Event, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        match event {
            Event::Key(key) => self.handle_key(key, now),
            Event::Pointer(pointer) => self.handle_pointer(&PointerTarget::Trigger, pointer, now),
            Event::Input(input) => self.handle_input(input, now),
            Event::Focus(false) => {
                self.close(now);
                false
            }
            Event::Focus(true) => false,
        }
    }

    /// Handle a key event. Returns `true` if it was consumed.
    pub fn handle_key(&mut self, key: &KeyEvent, now: Instant) -> bool {
        if !self.mounted {
            return false;
        }
        if key.kind == KeyEventKind::Release {
            if key.code == KeyCode::Modifier(ModifierKey::Shift) {
                let current = self.store.current_id().cloned();
                self.store.set_anchor(current);
            }
            return false;
        }

        let primary = key.primary(self.platform);
        let shift = key.shift();
        let popup = self.config.kind.has_popup();
        let editable = self.config.is_editable();
        let multiple = self.config.multiple;

        match key.code {
            KeyCode::Down | KeyCode::Up => {
                if popup && !self.open {
                    // The first arrow press only opens.
                    self.open(now);
                    return true;
                }
                let delta = if key.code == KeyCode::Down { 1 } else { -1 };
                if multiple && shift {
                    // With no anchor the range starts at the first option.
                    self.store.focus_by(delta, self.config.wrap_selection);
                    self.store.select_from_range_start_to_current();
                    self.after_selection_change();
                } else {
                    self.store.focus_by(delta, self.config.wrap_selection);
                }
                true
            }
            KeyCode::Home | KeyCode::End => {
                let to_end = key.code == KeyCode::End;
                if multiple && primary && shift && self.open {
                    let Some(current) = self.store.current_index() else {
                        return false;
                    };
                    if to_end {
                        self.store.select_range(current, usize::MAX);
                        self.store.focus_last();
                    } else {
                        self.store.select_range(0, current);
                        self.store.focus_first();
                    }
                    self.after_selection_change();
                    return true;
                }
                if editable {
                    return false;
                }
                if popup && !self.open {
                    self.open(now);
                }
                if to_end {
                    self.store.focus_last();
                } else {
                    self.store.focus_first();
                }
                true
            }
            KeyCode::PageUp | KeyCode::PageDown => {
                if !self.open {
                    return false;
                }
                let page = isize::try_from(self.config.page_size).unwrap_or(isize::MAX);
                let delta = if key.code == KeyCode::PageDown { page } else { -page };
                self.store.focus_by(delta, false);
                true
            }
            KeyCode::Enter => {
                if !self.open {
                    if popup && !editable {
                        self.open(now);
                        return true;
                    }
                    if editable && multiple {
                        return self.commit_in_progress();
                    }
                    return false;
                }
                if multiple && shift {
                    self.store.select_from_closest_selected_to_current();
                    self.after_selection_change();
                } else {
                    self.accept_current(now);
                }
                true
            }
            KeyCode::Char(' ') if !primary => {
                if editable {
                    return false;
                }
                if !self.search.is_empty() {
                    self.type_ahead(' ', now);
                    return true;
                }
                if popup && !self.open {
                    self.open(now);
                    return true;
                }
                if multiple && shift {
                    self.store.select_from_closest_selected_to_current();
                    self.after_selection_change();
                } else {
                    self.accept_current(now);
                }
                true
            }
            KeyCode::Char(ch) if primary && ch.eq_ignore_ascii_case(&'a') => {
                if !multiple || !self.open || (editable && !self.trigger.is_empty()) {
                    return false;
                }
                if self.store.is_all_selected() {
                    self.store.deselect_all();
                } else {
                    self.store.select_all();
                }
                self.after_selection_change();
                true
            }
            KeyCode::Char(ch) if !key.ctrl() && !key.super_key() => {
                if editable {
                    return false;
                }
                self.type_ahead(ch, now);
                true
            }
            KeyCode::Escape => {
                if popup && self.open {
                    self.close(now);
                    return true;
                }
                if editable && (!self.value.is_empty() || !self.trigger.is_empty()) {
                    self.reset();
                    return true;
                }
                false
            }
            KeyCode::Tab | KeyCode::BackTab => {
                if popup && self.open {
                    self.accept_suggestion();
                    self.close(now);
                }
                false
            }
            KeyCode::Backspace => {
                // Backspace in an empty manual multi-value field removes the
                // last chip.
                if !(editable
                    && multiple
                    && self.config.multiple_selection_type == MultipleSelectionType::Manual
                    && self.trigger.is_empty())
                {
                    return false;
                }
                let Some(last) = self.store.selected_options().last().cloned() else {
                    return false;
                };
                self.remove_selected(&last);
                true
            }
            _ => false,
        }
    }

    /// Handle a pointer event on `target`. Returns `true` if consumed.
    pub fn handle_pointer(
        &mut self,
        target: &PointerTarget,
        event: &PointerEvent,
        now: Instant,
    ) -> bool {
        if !self.mounted {
            return false;
        }
        match (target, event.kind) {
            (PointerTarget::Trigger, PointerEventKind::Down(PointerButton::Primary)) => {
                if !self.config.kind.has_popup() {
                    return false;
                }
                if self.config.is_editable() || !self.open {
                    self.open(now);
                } else {
                    self.close(now);
                }
                true
            }
            (PointerTarget::Option(id), PointerEventKind::Down(PointerButton::Primary)) => {
                if !self.store.get(id).is_some_and(OptionLike::is_focusable) {
                    return false;
                }
                self.store.hover(id);
                if self.store.is_custom(id) {
                    self.commit_custom(now);
                    return true;
                }
                if self.config.multiple {
                    if event.modifiers.contains(Modifiers::SHIFT) {
                        self.store.select_from_range_start_to_current();
                    } else {
                        self.store.toggle_selected(id);
                        self.store.set_anchor(Some(id.clone()));
                    }
                    self.rewrite_trigger_from_selection();
                    self.after_selection_change();
                    self.choose(id, now);
                } else {
                    self.commit_single(id, now);
                }
                true
            }
            (PointerTarget::Option(id), PointerEventKind::Moved) => self.store.hover(id),
            _ => false,
        }
    }

    /// Handle a document-level pointer-down whose event path contains the
    /// widgets in `path`. Closes this widget if it is open and not on the
    /// path. Returns `true` if it closed.
    pub fn handle_document_pointer(&mut self, path: &[WidgetId], now: Instant) -> bool {
        let outside = dispatcher::lock(&self.dispatcher)
            .dispatch(path)
            .contains(&self.id);
        outside && self.close(now)
    }

    /// Handle a text edit on an editable trigger. Returns `true` if consumed.
    pub fn handle_input(&mut self, input: &InputEvent, now: Instant) -> bool {
        if !self.mounted || !self.config.is_editable() {
            return false;
        }
        if self.config.kind.has_popup() && !self.open {
            self.open(now);
        }
        self.suggestion_pending = false;
        if self.config.multiple {
            self.multi_input(input);
        } else {
            self.single_input(input);
        }
        self.sync_value();
        true
    }

    // -----------------------------------------------------------------------
    // Programmatic selection
    // -----------------------------------------------------------------------

    /// Select an option.
    pub fn select(&mut self, id: &OptionId) -> bool {
        let done = self.store.select(id);
        self.after_programmatic_change();
        done
    }

    /// Deselect an option.
    pub fn deselect(&mut self, id: &OptionId) -> bool {
        let done = self.store.deselect(id);
        self.after_programmatic_change();
        done
    }

    /// Toggle an option.
    pub fn toggle_selected(&mut self, id: &OptionId) -> bool {
        let done = self.store.toggle_selected(id);
        self.after_programmatic_change();
        done
    }

    /// Select every option (multi-select).
    pub fn select_all(&mut self) {
        self.store.select_all();
        self.after_programmatic_change();
    }

    /// Deselect every option (multi-select).
    pub fn deselect_all(&mut self) {
        self.store.deselect_all();
        self.after_programmatic_change();
    }

    /// Select exactly `from..=to` (multi-select).
    pub fn select_range(&mut self, from: usize, to: usize) {
        self.store.select_range(from, to);
        self.after_programmatic_change();
    }

    /// Remove one selected entry, as a chip's remove button does.
    pub fn remove_selected(&mut self, entry: &SelectedOption) -> bool {
        let done = self.store.remove_selected(entry);
        self.after_programmatic_change();
        done
    }

    /// Move the current option to the `position`-th focusable option.
    pub fn focus_at(&mut self, position: isize) -> Option<usize> {
        self.store.focus_at(position, self.config.wrap_selection)
    }

    fn after_programmatic_change(&mut self) {
        self.rewrite_trigger_from_selection();
        self.sync_value();
    }

    fn after_selection_change(&mut self) {
        self.sync_value();
    }

    // -----------------------------------------------------------------------
    // Commit paths
    // -----------------------------------------------------------------------

    fn type_ahead(&mut self, ch: char, now: Instant) {
        if self.config.kind.has_popup() && !self.open {
            self.open(now);
        }
        self.search.append_key(ch, &mut self.store);
        self.timers.arm(
            TimerKey::ClearSearchBuffer,
            now,
            self.config.search_buffer_delay,
        );
    }

    /// Act on the current option (Enter, Space).
    fn accept_current(&mut self, now: Instant) {
        let Some(id) = self.store.current_id().cloned() else {
            if self.config.is_editable() && self.config.multiple {
                self.commit_in_progress();
            } else if self.config.is_editable() {
                self.close(now);
            }
            return;
        };
        if self.store.is_custom(&id) {
            self.commit_custom(now);
            return;
        }
        if self.config.is_editable() && self.config.multiple {
            let tokens = parse_tokens(
                &self.trigger.text,
                &self.config.delimiter,
                &self.config.spacer,
            );
            let token = tokens.in_progress.trim();
            let matches_token = self
                .store
                .get(&id)
                .is_some_and(|option| starts_with_ignore_case(option.content(), token));
            if !token.is_empty() && !matches_token {
                self.commit_in_progress();
                return;
            }
        }

        if !self.config.multiple {
            if self.config.is_editable() && !self.suggestion_pending && !self.trigger.is_empty() {
                let matches_text = self.store.get(&id).is_some_and(|option| {
                    starts_with_ignore_case(option.content(), &self.trigger.text)
                });
                if !matches_text {
                    // Literal text that matches nothing stays the value.
                    self.close(now);
                    return;
                }
            }
            let already = self.store.get(&id).is_some_and(OptionLike::is_selected);
            if already && !self.suggestion_pending {
                // Enter on the chosen value clears it.
                self.store.deselect(&id);
                self.store.set_anchor(Some(id));
                if self.config.is_editable() {
                    self.set_trigger(TriggerText::default());
                    self.store.set_filter("", false);
                }
                self.sync_value();
                return;
            }
            self.commit_single(&id, now);
            return;
        }

        let policy = self.config.multiple_selection_type;
        if self.config.is_editable() && self.suggestion_pending {
            match policy {
                // The suggestion is already folded into the selection.
                MultipleSelectionType::Automatic => {
                    self.store.select(&id);
                }
                MultipleSelectionType::Manual => {
                    self.store.toggle_selected(&id);
                }
            }
        } else {
            self.store.toggle_selected(&id);
        }
        self.store.set_anchor(Some(id.clone()));

        if self.config.is_editable() {
            match policy {
                MultipleSelectionType::Automatic => {
                    self.suggestion_pending = false;
                    self.rewrite_trigger_from_selection();
                    self.store.set_filter("", false);
                }
                MultipleSelectionType::Manual => {
                    if !self.suggestion_pending {
                        self.set_trigger(TriggerText::default());
                        self.store.set_filter("", false);
                    }
                }
            }
        }
        self.sync_value();
        self.choose(&id, now);
    }

    /// Select `id` as the single value and close unless the listener objects.
    fn commit_single(&mut self, id: &OptionId, now: Instant) {
        if !self.store.select(id) {
            return;
        }
        self.suggestion_pending = false;
        self.store.set_anchor(Some(id.clone()));
        if self.config.is_editable() {
            let text = self.selection_text();
            self.store.set_filter(&text, true);
            self.set_trigger(TriggerText::plain(text));
        }
        self.sync_value();
        self.choose(id, now);
    }

    /// Emit `ItemChosen`; a single-select popup closes unless prevented.
    fn choose(&mut self, id: &OptionId, now: Instant) {
        let Some(chosen) = self.store.get(id).map(SelectedOption::of) else {
            return;
        };
        self.emit_chosen(chosen, now);
    }

    fn emit_chosen(&mut self, chosen: SelectedOption, now: Instant) {
        let propagation = match self.on_chosen.as_mut() {
            Some(handler) => handler.call(&chosen),
            None => Propagation::Continue,
        };
        self.store.push_event(WidgetEvent::ItemChosen(chosen));
        if !self.config.multiple && !propagation.is_prevented() {
            self.close(now);
        }
    }

    /// Turn the injected custom entry into a synthetic selection.
    fn commit_custom(&mut self, now: Instant) {
        let Some(text) = self.store.custom_text().map(str::to_owned) else {
            return;
        };
        self.store.set_custom_entry(None);
        self.store.select_synthetic(&text);
        self.suggestion_pending = false;
        self.set_trigger(TriggerText::default());
        self.store.set_filter("", false);
        self.rewrite_trigger_from_selection();
        self.sync_value();
        self.emit_chosen(SelectedOption::synthetic(text), now);
    }

    /// Commit typed tokens of an editable multi-value field.
    ///
    /// Exact matches are selected. Other text becomes a synthetic entry when
    /// custom values are allowed and is dropped otherwise. In manual mode the
    /// confirmed tokens are committed too.
    fn commit_in_progress(&mut self) -> bool {
        if self.trigger.is_empty() {
            return false;
        }
        let tokens = parse_tokens(
            &self.trigger.text,
            &self.config.delimiter,
            &self.config.spacer,
        );
        if self.config.multiple_selection_type == MultipleSelectionType::Manual {
            for token in &tokens.confirmed {
                self.commit_token(token);
            }
        }
        let token = tokens.in_progress.trim();
        if !token.is_empty() {
            self.commit_token(token);
        }
        self.suggestion_pending = false;
        self.store.set_custom_entry(None);
        self.store.set_filter("", false);
        self.set_trigger(TriggerText::default());
        self.rewrite_trigger_from_selection();
        self.sync_value();
        true
    }

    fn commit_token(&mut self, token: &str) {
        if let Some(index) = self.store.exact_match(token) {
            if let Some(id) = self.store.options()[index].id().cloned() {
                self.store.select(&id);
            }
        } else if self.config.allow_custom_values {
            self.store.select_synthetic(token);
        } else {
            tracing::debug!(message = "select.selection", action = "drop_token", token);
        }
    }

    /// Accept a pending ghost completion as typed text.
    fn accept_suggestion(&mut self) {
        if !self.suggestion_pending {
            return;
        }
        self.suggestion_pending = false;
        if self.config.multiple
            && self.config.multiple_selection_type == MultipleSelectionType::Automatic
        {
            self.rewrite_trigger_from_selection();
            self.store.set_filter("", false);
        } else {
            let text = self.trigger.text.clone();
            if !self.config.multiple {
                self.store.set_filter(&text, true);
            }
            self.set_trigger(TriggerText::plain(text));
        }
        self.sync_value();
    }

    /// Escape on a closed editable trigger: drop text and selection.
    fn reset(&mut self) {
        self.store.clear_selection();
        self.store.set_custom_entry(None);
        self.store.set_filter("", false);
        self.suggestion_pending = false;
        self.set_trigger(TriggerText::default());
        self.sync_value();
    }

    // -----------------------------------------------------------------------
    // Free text
    // -----------------------------------------------------------------------

    fn single_input(&mut self, input: &InputEvent) {
        let text = input.text.as_str();
        self.store.set_filter(text, false);
        let mut trigger = TriggerText::plain(text);

        if should_select_suggested_option(self.config.autocomplete, text, input.kind) {
            if let Some(suggestion) = suggest(&self.store, "", text) {
                self.store.set_current_index(suggestion.index);
                if let Some(id) = self.store.options()[suggestion.index].id().cloned() {
                    self.store.select(&id);
                }
                trigger = suggestion.trigger;
                self.suggestion_pending = true;
            }
        }

        if !self.suggestion_pending {
            let exact = self
                .store
                .exact_match(text)
                .and_then(|index| self.store.options()[index].id().cloned());
            match exact {
                Some(id) => {
                    if !self.store.get(&id).is_some_and(OptionLike::is_selected) {
                        self.store.select(&id);
                    }
                    self.store.set_current(&id);
                }
                None => {
                    if !self.store.selected_options().is_empty() {
                        self.store.clear_selection();
                    }
                    self.highlight_prefix_match(text);
                }
            }
        }

        self.set_trigger(trigger);
    }

    fn multi_input(&mut self, input: &InputEvent) {
        let text = input.text.as_str();
        let tokens = parse_tokens(text, &self.config.delimiter, &self.config.spacer);
        let head = tokens.head(text).to_owned();
        let token = tokens.in_progress.as_str();
        let policy = self.config.multiple_selection_type;

        self.store.set_filter(token, false);
        if policy == MultipleSelectionType::Manual {
            let trimmed = token.trim();
            let wants_custom = self.config.allow_custom_values
                && !trimmed.is_empty()
                && self.store.exact_match(trimmed).is_none();
            self.store.set_custom_entry(wants_custom.then_some(trimmed));
        }

        let mut trigger = TriggerText::plain(text);
        let mut suggested = None;
        if should_select_suggested_option(self.config.autocomplete, token, input.kind) {
            if let Some(suggestion) = suggest(&self.store, &head, token) {
                self.store.set_current_index(suggestion.index);
                suggested = self.store.options()[suggestion.index].id().cloned();
                trigger = suggestion.trigger;
                self.suggestion_pending = true;
            }
        }
        if !self.suggestion_pending {
            self.highlight_prefix_match(token);
        }

        if policy == MultipleSelectionType::Automatic {
            let mut targets = resolve_tokens(&self.store, &tokens.confirmed);
            if !self.config.allow_custom_values {
                targets.retain(|target| matches!(target, SelectionTarget::Option(_)));
            }
            if let Some(id) = suggested {
                targets.push(SelectionTarget::Option(id));
            }
            self.store.apply_targets(&targets);
        }

        self.set_trigger(trigger);
    }

    /// In list-suggesting modes, move the current option to the first prefix
    /// match without selecting it.
    fn highlight_prefix_match(&mut self, token: &str) {
        if self.config.autocomplete == AutocompleteMode::Off || token.is_empty() {
            return;
        }
        if let Some(index) = self.store.first_prefix_match(token) {
            self.store.set_current_index(index);
        }
    }

    // -----------------------------------------------------------------------
    // Derived text and value
    // -----------------------------------------------------------------------

    /// Trigger text that reflects the selection.
    fn selection_text(&self) -> String {
        let selected = self.store.selected_options();
        if self.config.multiple {
            let trailing = self.config.is_editable();
            join_tokens(
                selected.iter().map(|entry| entry.content.as_str()),
                &self.config.delimiter,
                &self.config.spacer,
                trailing,
            )
        } else {
            selected
                .first()
                .map(|entry| entry.display_value.clone())
                .unwrap_or_default()
        }
    }

    /// In automatic multi-value mode the trigger text mirrors the selection.
    fn rewrite_trigger_from_selection(&mut self) {
        if self.config.is_editable()
            && self.config.multiple
            && self.config.multiple_selection_type == MultipleSelectionType::Automatic
        {
            let text = self.selection_text();
            self.set_trigger(TriggerText::plain(text));
        }
    }

    fn set_trigger(&mut self, trigger: TriggerText) {
        if self.trigger != trigger {
            self.trigger = trigger.clone();
            self.store
                .push_event(WidgetEvent::TriggerTextChanged(trigger));
        }
    }

    fn compute_value(&self) -> WidgetValue {
        let value = WidgetValue::from_selection(self.store.selected_options(), &self.config);
        if value.is_empty()
            && self.config.is_editable()
            && !self.config.multiple
            && !self.trigger.is_empty()
        {
            return WidgetValue::Scalar(self.trigger.text.clone());
        }
        value
    }

    fn sync_value(&mut self) {
        let next = self.compute_value();
        if next != self.value {
            self.value = next.clone();
            self.store.push_event(WidgetEvent::Input(next.clone()));
            self.store.push_event(WidgetEvent::Change(next));
        }
    }
}

impl<O: OptionLike> Drop for SelectController<O> {
    fn drop(&mut self) {
        dispatcher::lock(&self.dispatcher).unregister(self.id);
    }
}
