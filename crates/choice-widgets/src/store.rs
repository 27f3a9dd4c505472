#![forbid(unsafe_code)]

//! The option collection.
//!
//! [`OptionStore`] owns the ordered options of one widget. It assigns ids,
//! applies the filter, keeps exactly zero or one option current, and keeps
//! the selected-options cache in step with the per-option `selected` flags.
//!
//! Structural changes arrive as [`StructuralChange`] messages. The store
//! applies a batch of them and then reconciles once, so a burst of additions
//! costs a single pass.
//!
//! Selection operations live in `selection.rs` and focus movement in
//! `navigation.rs`; both are further `impl` blocks on [`OptionStore`].

use ahash::AHashSet;

use crate::config::SelectConfig;
use crate::events::WidgetEvent;
use crate::option::{IdAllocator, OptionId, OptionLike, OptionRecord, SelectedOption};
use crate::{eq_ignore_case, starts_with_ignore_case};

/// Label prefix of the injected custom-value entry.
pub const CUSTOM_OPTION_LABEL: &str = "Add option: ";

/// A structural change to the option collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralChange<O> {
    /// Insert an option at `index` (clamped to the collection length).
    Added {
        /// Insertion position.
        index: usize,
        /// The new option.
        option: O,
    },
    /// Remove the option with this id.
    Removed(OptionId),
    /// Replace the option with this id. The replacement keeps the id unless
    /// it carries its own.
    Updated(OptionId, O),
    /// Replace the whole collection.
    Reset(Vec<O>),
}

/// The text the filter compares options against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    /// Typed prefix of the token being composed.
    pub text: String,
    /// The typed text was accepted as the final value, so nothing is hidden.
    pub committed: bool,
}

/// Ordered option collection with derived selection state.
#[derive(Debug, Clone)]
pub struct OptionStore<O = OptionRecord> {
    pub(crate) options: Vec<O>,
    ids: IdAllocator,
    pub(crate) multiple: bool,
    filter_results: bool,
    filter: FilterQuery,
    pub(crate) selected: Vec<SelectedOption>,
    pub(crate) anchor: Option<OptionId>,
    custom: Option<OptionId>,
    events: Vec<WidgetEvent>,
}

impl<O: OptionLike> OptionStore<O> {
    /// Create an empty store.
    #[must_use]
    pub fn new(multiple: bool) -> Self {
        Self {
            options: Vec::new(),
            ids: IdAllocator::new("choice"),
            multiple,
            filter_results: false,
            filter: FilterQuery::default(),
            selected: Vec::new(),
            anchor: None,
            custom: None,
            events: Vec::new(),
        }
    }

    /// Create an empty store for a widget configuration.
    #[must_use]
    pub fn from_config(config: &SelectConfig) -> Self {
        Self::new(config.multiple)
            .with_filter_results(config.filter_results)
            .with_id_prefix(config.id_prefix.clone())
    }

    /// Hide options that do not start with the filter text.
    #[must_use]
    pub fn with_filter_results(mut self, filter: bool) -> Self {
        self.filter_results = filter;
        self
    }

    /// Prefix for assigned ids.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ids = IdAllocator::new(prefix);
        self
    }

    /// Replace the collection with `candidates`, filtered by `input_text`.
    pub fn rebuild(&mut self, candidates: Vec<O>, input_text: &str) -> &[O] {
        self.options = candidates;
        self.custom = None;
        self.filter = FilterQuery {
            text: input_text.to_owned(),
            committed: false,
        };
        self.reconcile();
        &self.options
    }

    /// Apply a batch of structural changes and reconcile once.
    ///
    /// Changes naming ids that are not present are skipped.
    pub fn apply<I>(&mut self, changes: I)
    where
        I: IntoIterator<Item = StructuralChange<O>>,
    {
        let mut applied = 0usize;
        for change in changes {
            if self.apply_one(change) {
                applied += 1;
            }
        }
        self.reconcile();
        tracing::debug!(
            message = "select.rebuild",
            applied,
            options = self.options.len(),
            selected = self.selected.len()
        );
    }

    fn apply_one(&mut self, change: StructuralChange<O>) -> bool {
        match change {
            StructuralChange::Added { index, option } => {
                let index = index.min(self.options.len());
                self.options.insert(index, option);
                true
            }
            StructuralChange::Removed(id) => match self.index_of(&id) {
                Some(index) => {
                    self.options.remove(index);
                    true
                }
                None => false,
            },
            StructuralChange::Updated(id, mut option) => match self.index_of(&id) {
                Some(index) => {
                    if option.id().is_none() {
                        option.assign_id(id);
                    }
                    self.options[index] = option;
                    true
                }
                None => false,
            },
            StructuralChange::Reset(options) => {
                self.options = options;
                self.custom = None;
                true
            }
        }
    }

    /// Change the filter text and re-apply the filter.
    pub fn set_filter(&mut self, text: &str, committed: bool) {
        if self.filter.text == text && self.filter.committed == committed {
            return;
        }
        self.filter = FilterQuery {
            text: text.to_owned(),
            committed,
        };
        self.reconcile();
    }

    /// Bring every derived piece of state back in line with the options.
    pub(crate) fn reconcile(&mut self) {
        self.assign_missing_ids();

        if !self.multiple {
            // Several selected flags in single mode: the last one wins.
            if let Some(last) = self.options.iter().rposition(OptionLike::is_selected) {
                for (index, option) in self.options.iter_mut().enumerate() {
                    if index != last && option.is_selected() {
                        option.set_selected(false);
                    }
                }
            }
        }

        self.apply_filter();
        self.reconcile_current();
        self.refresh_selected();

        if let Some(anchor) = &self.anchor {
            if self.index_of(anchor).is_none() {
                self.anchor = None;
            }
        }
        if let Some(custom) = &self.custom {
            if self.index_of(custom).is_none() {
                self.custom = None;
            }
        }
    }

    fn assign_missing_ids(&mut self) {
        if self.options.iter().all(|option| option.id().is_some()) {
            return;
        }
        let mut taken: AHashSet<String> = self
            .options
            .iter()
            .filter_map(|option| option.id().map(|id| id.as_str().to_owned()))
            .collect();
        for option in &mut self.options {
            if option.id().is_none() {
                let id = self.ids.allocate(|candidate| taken.contains(candidate));
                taken.insert(id.as_str().to_owned());
                option.assign_id(id);
            }
        }
    }

    fn apply_filter(&mut self) {
        let show_all =
            !self.filter_results || self.filter.text.is_empty() || self.filter.committed;
        let text = self.filter.text.as_str();
        let custom = self.custom.as_ref();
        for option in &mut self.options {
            let is_custom = custom.is_some() && option.id() == custom;
            let matches = show_all
                || is_custom
                || starts_with_ignore_case(option.content(), text)
                || starts_with_ignore_case(option.value(), text);
            option.set_focusable(matches);
        }
    }

    fn reconcile_current(&mut self) {
        let previous = self.options.iter().position(OptionLike::is_current);
        for option in &mut self.options {
            option.set_current(false);
        }
        let target = previous
            .filter(|&index| self.options[index].is_focusable())
            .or_else(|| self.options.iter().position(OptionLike::is_focusable));
        if let Some(index) = target {
            self.options[index].set_current(true);
        }
    }

    /// Rebuild the selected-options cache from the flags.
    ///
    /// Entries keep their previous order; newly selected options are
    /// appended in collection order. Synthetic entries are kept as they are.
    pub(crate) fn refresh_selected(&mut self) {
        let mut next: Vec<SelectedOption> = Vec::with_capacity(self.selected.len());
        let previous = std::mem::take(&mut self.selected);
        for entry in previous {
            match &entry.id {
                None => {
                    if self.multiple && !next.iter().any(|kept| kept.same_entry(&entry)) {
                        next.push(entry);
                    }
                }
                Some(id) => {
                    let live = self
                        .options
                        .iter()
                        .find(|option| option.id() == Some(id) && option.is_selected());
                    if let Some(option) = live {
                        if !next.iter().any(|kept| kept.id.as_ref() == Some(id)) {
                            next.push(SelectedOption::of(option));
                        }
                    }
                }
            }
        }
        for option in self.options.iter().filter(|option| option.is_selected()) {
            if !next.iter().any(|kept| kept.id.as_ref() == option.id()) {
                next.push(SelectedOption::of(option));
            }
        }
        self.selected = next;
    }

    // -----------------------------------------------------------------------
    // Custom entry
    // -----------------------------------------------------------------------

    /// Show, replace, or remove the injected "Add option: <text>" entry.
    ///
    /// The entry is placed first and is never hidden by the filter.
    pub fn set_custom_entry(&mut self, text: Option<&str>) {
        let wanted = text.map(str::trim).filter(|text| !text.is_empty());
        if let Some(existing) = self.custom_text() {
            if Some(existing) == wanted {
                return;
            }
        }
        let was_current = self
            .custom
            .as_ref()
            .is_some_and(|id| self.current_id() == Some(id));
        if let Some(id) = self.custom.take() {
            if let Some(index) = self.index_of(&id) {
                self.options.remove(index);
            }
        }
        if let Some(text) = wanted {
            let label = format!("{CUSTOM_OPTION_LABEL}{text}");
            let mut entry = O::synthesize(text, &label);
            entry.set_current(was_current);
            self.options.insert(0, entry);
            self.assign_missing_ids();
            self.custom = self.options[0].id().cloned();
        }
        self.reconcile();
    }

    /// Id of the injected custom entry, if shown.
    #[must_use]
    pub fn custom_entry(&self) -> Option<&OptionId> {
        self.custom.as_ref()
    }

    /// Typed text carried by the custom entry.
    #[must_use]
    pub fn custom_text(&self) -> Option<&str> {
        let id = self.custom.as_ref()?;
        self.get(id).map(OptionLike::content)
    }

    /// Whether `id` is the injected custom entry.
    #[must_use]
    pub fn is_custom(&self, id: &OptionId) -> bool {
        self.custom.as_ref() == Some(id)
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All options in collection order.
    #[must_use]
    pub fn options(&self) -> &[O] {
        &self.options
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the collection is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Whether more than one option may be selected.
    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.multiple
    }

    /// The active filter.
    #[must_use]
    pub fn filter(&self) -> &FilterQuery {
        &self.filter
    }

    /// Look up an option by id.
    #[must_use]
    pub fn get(&self, id: &OptionId) -> Option<&O> {
        self.options.iter().find(|option| option.id() == Some(id))
    }

    /// Collection index of an option.
    #[must_use]
    pub fn index_of(&self, id: &OptionId) -> Option<usize> {
        self.options.iter().position(|option| option.id() == Some(id))
    }

    /// Collection index of the current option.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.options.iter().position(OptionLike::is_current)
    }

    /// The current option.
    #[must_use]
    pub fn current(&self) -> Option<&O> {
        self.options.iter().find(|option| option.is_current())
    }

    /// Id of the current option.
    #[must_use]
    pub fn current_id(&self) -> Option<&OptionId> {
        self.current().and_then(OptionLike::id)
    }

    /// Make the option with `id` current.
    ///
    /// Returns `false` (and changes nothing) if the id is stale or the option
    /// is not focusable.
    pub fn set_current(&mut self, id: &OptionId) -> bool {
        match self.index_of(id) {
            Some(index) => self.set_current_index(index),
            None => false,
        }
    }

    /// Make the option current without a scroll request, as pointer hover
    /// does.
    pub fn hover(&mut self, id: &OptionId) -> bool {
        match self.index_of(id) {
            Some(index) => self.move_current(index, false),
            None => false,
        }
    }

    pub(crate) fn set_current_index(&mut self, index: usize) -> bool {
        self.move_current(index, true)
    }

    fn move_current(&mut self, index: usize, scroll: bool) -> bool {
        if !self.options.get(index).is_some_and(OptionLike::is_focusable) {
            return false;
        }
        for (i, option) in self.options.iter_mut().enumerate() {
            option.set_current(i == index);
        }
        if scroll {
            if let Some(id) = self.options[index].id().cloned() {
                self.events.push(WidgetEvent::ScrollIntoView(id));
            }
        }
        true
    }

    /// The selected entries in selection order.
    #[must_use]
    pub fn selected_options(&self) -> &[SelectedOption] {
        &self.selected
    }

    /// Collection indices of selected options, ascending.
    #[must_use]
    pub fn selected_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_selected())
            .map(|(index, _)| index)
            .collect()
    }

    /// Collection indices of focusable options, ascending.
    #[must_use]
    pub fn focusable_indices(&self) -> Vec<usize> {
        self.options
            .iter()
            .enumerate()
            .filter(|(_, option)| option.is_focusable())
            .map(|(index, _)| index)
            .collect()
    }

    /// The range anchor.
    #[must_use]
    pub fn anchor(&self) -> Option<&OptionId> {
        self.anchor.as_ref()
    }

    /// Set or clear the range anchor. Stale ids clear it.
    pub fn set_anchor(&mut self, id: Option<OptionId>) {
        self.anchor = id.filter(|id| self.index_of(id).is_some());
    }

    /// First focusable option whose content starts with `prefix`,
    /// ignoring case.
    #[must_use]
    pub fn first_prefix_match(&self, prefix: &str) -> Option<usize> {
        if prefix.is_empty() {
            return None;
        }
        self.options.iter().position(|option| {
            option.is_focusable()
                && !self.is_custom_option(option)
                && starts_with_ignore_case(option.content(), prefix)
        })
    }

    /// Option whose content equals `text`, ignoring case.
    #[must_use]
    pub fn exact_match(&self, text: &str) -> Option<usize> {
        self.options.iter().position(|option| {
            !self.is_custom_option(option) && eq_ignore_case(option.content(), text)
        })
    }

    fn is_custom_option(&self, option: &O) -> bool {
        self.custom.is_some() && option.id() == self.custom.as_ref()
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub(crate) fn push_event(&mut self, event: WidgetEvent) {
        self.events.push(event);
    }

    /// Events emitted since the last call, oldest first.
    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn log_selection_change(&self, action: &str) {
        tracing::debug!(
            message = "select.selection",
            action,
            selected_count = self.selected.len(),
            current = self.current_index(),
            multiple = self.multiple
        );
    }
}

impl<O: OptionLike> Default for OptionStore<O> {
    fn default() -> Self {
        Self::new(false)
    }
}
