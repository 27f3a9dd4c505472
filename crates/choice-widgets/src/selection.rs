#![forbid(unsafe_code)]

//! Selection operations on [`OptionStore`].
//!
//! Every operation addresses options by id through the live collection, so
//! an id left over from before a rebuild simply finds nothing to do.

use crate::events::WidgetEvent;
use crate::option::{OptionId, OptionLike, SelectedOption};
use crate::store::OptionStore;

/// One wanted entry of the selected list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionTarget {
    /// An existing option.
    Option(OptionId),
    /// A synthetic entry for typed text that matched no option.
    Synthetic(String),
}

impl SelectionTarget {
    fn matches(&self, entry: &SelectedOption) -> bool {
        match self {
            Self::Option(id) => entry.id.as_ref() == Some(id),
            Self::Synthetic(text) => entry.is_synthetic() && entry.content == *text,
        }
    }
}

impl<O: OptionLike> OptionStore<O> {
    /// Select the option with `id`.
    ///
    /// In single-select mode every other option is deselected first. A
    /// `Selected` event is emitted even if the option was already selected.
    pub fn select(&mut self, id: &OptionId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if !self.multiple {
            for other in 0..self.options.len() {
                if other != index && self.options[other].is_selected() {
                    self.options[other].set_selected(false);
                    let snapshot = SelectedOption::of(&self.options[other]);
                    self.push_event(WidgetEvent::Deselected(snapshot));
                }
            }
        }
        self.options[index].set_selected(true);
        self.refresh_selected();
        let snapshot = SelectedOption::of(&self.options[index]);
        self.push_event(WidgetEvent::Selected(snapshot));
        self.log_selection_change("select");
        true
    }

    /// Deselect the option with `id`.
    ///
    /// The `Deselected` event fires even when the option was not selected,
    /// so "remove" gestures always reach listeners.
    pub fn deselect(&mut self, id: &OptionId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        self.options[index].set_selected(false);
        self.refresh_selected();
        let snapshot = SelectedOption::of(&self.options[index]);
        self.push_event(WidgetEvent::Deselected(snapshot));
        self.log_selection_change("deselect");
        true
    }

    /// Deselect if selected, select otherwise.
    pub fn toggle_selected(&mut self, id: &OptionId) -> bool {
        match self.get(id).map(OptionLike::is_selected) {
            Some(true) => self.deselect(id),
            Some(false) => self.select(id),
            None => false,
        }
    }

    /// Whether every option (the custom entry aside) is selected.
    #[must_use]
    pub fn is_all_selected(&self) -> bool {
        let mut any = false;
        for option in &self.options {
            if option.id().is_some_and(|id| self.is_custom(id)) {
                continue;
            }
            if !option.is_selected() {
                return false;
            }
            any = true;
        }
        any
    }

    /// Select every option. Multi-select only.
    pub fn select_all(&mut self) {
        if !self.multiple {
            return;
        }
        for index in 0..self.options.len() {
            self.set_flag(index, true);
        }
        self.refresh_selected();
        self.log_selection_change("select_all");
    }

    /// Deselect every option and drop synthetic entries. Multi-select only.
    pub fn deselect_all(&mut self) {
        if self.multiple {
            self.clear_selection();
        }
    }

    /// Deselect everything in either mode.
    pub fn clear_selection(&mut self) {
        for index in 0..self.options.len() {
            self.set_flag(index, false);
        }
        let synthetic: Vec<SelectedOption> = self
            .selected
            .iter()
            .filter(|entry| entry.is_synthetic())
            .cloned()
            .collect();
        for entry in synthetic {
            self.selected.retain(|kept| !kept.same_entry(&entry));
            self.push_event(WidgetEvent::Deselected(entry));
        }
        self.refresh_selected();
        self.log_selection_change("clear");
    }

    /// Select exactly the options with collection index in `from..=to`.
    ///
    /// Options outside the range are deselected, so re-applying a range
    /// never accumulates. Bounds are swapped if reversed and clamped to the
    /// collection. Synthetic entries are left alone. Multi-select only.
    pub fn select_range(&mut self, from: usize, to: usize) {
        if !self.multiple || self.options.is_empty() {
            return;
        }
        let last = self.options.len() - 1;
        let (from, to) = if from <= to { (from, to) } else { (to, from) };
        let (from, to) = (from.min(last), to.min(last));
        for index in 0..self.options.len() {
            self.set_flag(index, (from..=to).contains(&index));
        }
        self.refresh_selected();
        self.log_selection_change("range");
    }

    /// Range-select from the anchor to the current option.
    ///
    /// Without an anchor the range starts at index 0.
    pub fn select_from_range_start_to_current(&mut self) {
        let Some(current) = self.current_index() else {
            return;
        };
        let start = self
            .anchor
            .as_ref()
            .and_then(|id| self.index_of(id))
            .unwrap_or(0);
        self.select_range(start, current);
    }

    /// Add the options from the nearest selected one before the current
    /// option through the current option.
    ///
    /// The scan starts at index 0 if nothing before the current option is
    /// selected. Nothing outside the range is deselected.
    pub fn select_from_closest_selected_to_current(&mut self) {
        if !self.multiple {
            return;
        }
        let Some(current) = self.current_index() else {
            return;
        };
        let start = (0..current)
            .rev()
            .find(|&index| self.options[index].is_selected())
            .unwrap_or(0);
        for index in start..=current {
            self.set_flag(index, true);
        }
        self.refresh_selected();
        self.log_selection_change("extend_from_closest");
    }

    /// Add a synthetic entry for `text`. Multi-select only.
    ///
    /// Returns `false` if the text is empty or already present.
    pub fn select_synthetic(&mut self, text: &str) -> bool {
        let entry = SelectedOption::synthetic(text);
        if !self.multiple
            || text.is_empty()
            || self.selected.iter().any(|kept| kept.same_entry(&entry))
        {
            return false;
        }
        self.selected.push(entry.clone());
        self.push_event(WidgetEvent::Selected(entry));
        self.log_selection_change("select_synthetic");
        true
    }

    /// Remove the synthetic entry for `text`. Always emits `Deselected`.
    pub fn deselect_synthetic(&mut self, text: &str) {
        let entry = SelectedOption::synthetic(text);
        self.selected.retain(|kept| !kept.same_entry(&entry));
        self.push_event(WidgetEvent::Deselected(entry));
        self.log_selection_change("deselect_synthetic");
    }

    /// Remove one entry of the selected list, as a chip's remove button does.
    pub fn remove_selected(&mut self, entry: &SelectedOption) -> bool {
        match &entry.id {
            Some(id) => self.deselect(id),
            None => {
                self.deselect_synthetic(&entry.content);
                true
            }
        }
    }

    /// Make the selected list equal `targets`, in `targets` order.
    ///
    /// Only differences are applied: entries already selected stay selected
    /// without events. Targets naming stale ids are skipped.
    pub fn apply_targets(&mut self, targets: &[SelectionTarget]) {
        let stale: Vec<SelectedOption> = self
            .selected
            .iter()
            .filter(|entry| !targets.iter().any(|target| target.matches(entry)))
            .cloned()
            .collect();
        for entry in stale {
            match &entry.id {
                Some(id) => {
                    if let Some(index) = self.index_of(id) {
                        self.set_flag(index, false);
                    }
                }
                None => {
                    self.selected.retain(|kept| !kept.same_entry(&entry));
                    self.push_event(WidgetEvent::Deselected(entry));
                }
            }
        }

        for target in targets {
            if self.selected.iter().any(|entry| target.matches(entry)) {
                continue;
            }
            match target {
                SelectionTarget::Option(id) => {
                    if let Some(index) = self.index_of(id) {
                        if !self.multiple {
                            self.clear_others(index);
                        }
                        self.set_flag(index, true);
                        self.refresh_selected();
                    }
                }
                SelectionTarget::Synthetic(text) => {
                    if self.multiple && !text.is_empty() {
                        let entry = SelectedOption::synthetic(text.as_str());
                        self.selected.push(entry.clone());
                        self.push_event(WidgetEvent::Selected(entry));
                    }
                }
            }
        }

        self.refresh_selected();
        self.selected.sort_by_key(|entry| {
            targets
                .iter()
                .position(|target| target.matches(entry))
                .unwrap_or(usize::MAX)
        });
        self.log_selection_change("apply_targets");
    }

    /// Set one option's flag, emitting an event only if it changed.
    fn set_flag(&mut self, index: usize, selected: bool) {
        if self.options[index].is_selected() == selected {
            return;
        }
        if selected && self.options[index].id().is_some_and(|id| self.is_custom(id)) {
            return;
        }
        self.options[index].set_selected(selected);
        let snapshot = SelectedOption::of(&self.options[index]);
        self.push_event(if selected {
            WidgetEvent::Selected(snapshot)
        } else {
            WidgetEvent::Deselected(snapshot)
        });
    }

    fn clear_others(&mut self, keep: usize) {
        for index in 0..self.options.len() {
            if index != keep {
                self.set_flag(index, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionRecord;

    fn store(multiple: bool, count: usize) -> OptionStore {
        let mut store = OptionStore::new(multiple);
        store.rebuild(
            (1..=count)
                .map(|n| OptionRecord::new(format!("Option {n}")).with_id(format!("o{n}")))
                .collect(),
            "",
        );
        store.take_events();
        store
    }

    fn id(n: usize) -> OptionId {
        OptionId::new(format!("o{n}"))
    }

    fn selected_values(store: &OptionStore) -> Vec<String> {
        store
            .selected_options()
            .iter()
            .map(|entry| entry.value.clone())
            .collect()
    }

    #[test]
    fn single_select_replaces() {
        let mut store = store(false, 3);
        assert!(store.select(&id(1)));
        assert!(store.select(&id(2)));
        assert_eq!(store.selected_indices(), vec![1]);
        let events = store.take_events();
        assert!(matches!(&events[1], WidgetEvent::Deselected(e) if e.value == "Option 1"));
        assert!(matches!(&events[2], WidgetEvent::Selected(e) if e.value == "Option 2"));
    }

    #[test]
    fn reselect_in_single_mode_still_notifies() {
        let mut store = store(false, 3);
        store.select(&id(2));
        store.take_events();
        store.select(&id(2));
        assert_eq!(store.take_events().len(), 1);
        assert_eq!(store.selected_indices(), vec![1]);
    }

    #[test]
    fn deselect_notifies_even_without_change() {
        let mut store = store(true, 3);
        assert!(store.deselect(&id(3)));
        assert!(matches!(
            store.take_events().as_slice(),
            [WidgetEvent::Deselected(_)]
        ));
    }

    #[test]
    fn stale_ids_are_noops() {
        let mut store = store(true, 2);
        assert!(!store.select(&OptionId::new("gone")));
        assert!(!store.deselect(&OptionId::new("gone")));
        assert!(!store.toggle_selected(&OptionId::new("gone")));
        assert!(store.take_events().is_empty());
    }

    #[test]
    fn multi_keeps_insertion_order() {
        let mut store = store(true, 4);
        store.select(&id(3));
        store.select(&id(1));
        store.select(&id(3));
        assert_eq!(selected_values(&store), vec!["Option 3", "Option 1"]);
    }

    #[test]
    fn toggle_flips() {
        let mut store = store(true, 2);
        store.toggle_selected(&id(1));
        assert_eq!(store.selected_indices(), vec![0]);
        store.toggle_selected(&id(1));
        assert!(store.selected_indices().is_empty());
    }

    #[test]
    fn select_all_and_deselect_all_are_multi_only() {
        let mut single = store(false, 3);
        single.select_all();
        assert!(single.selected_indices().is_empty());

        let mut multi = store(true, 3);
        multi.select_all();
        assert!(multi.is_all_selected());
        multi.select_synthetic("Typed");
        multi.deselect_all();
        assert!(multi.selected_options().is_empty());
    }

    #[test]
    fn range_is_absolute() {
        let mut store = store(true, 6);
        store.select_range(1, 4);
        assert_eq!(store.selected_indices(), vec![1, 2, 3, 4]);
        store.select_range(3, 2);
        assert_eq!(store.selected_indices(), vec![2, 3]);
        store.select_range(4, 99);
        assert_eq!(store.selected_indices(), vec![4, 5]);
    }

    #[test]
    fn range_from_anchor_defaults_to_zero() {
        let mut store = store(true, 5);
        store.set_current(&id(3));
        store.select_from_range_start_to_current();
        assert_eq!(store.selected_indices(), vec![0, 1, 2]);

        store.set_anchor(Some(id(5)));
        store.select_from_range_start_to_current();
        assert_eq!(store.selected_indices(), vec![2, 3, 4]);
    }

    #[test]
    fn closest_selected_is_additive() {
        let mut store = store(true, 8);
        store.select(&id(2));
        store.select(&id(8));
        store.set_current(&id(5));
        store.select_from_closest_selected_to_current();
        assert_eq!(store.selected_indices(), vec![1, 2, 3, 4, 7]);
    }

    #[test]
    fn closest_selected_without_any_starts_at_zero() {
        let mut store = store(true, 4);
        store.set_current(&id(3));
        store.select_from_closest_selected_to_current();
        assert_eq!(store.selected_indices(), vec![0, 1, 2]);
    }

    #[test]
    fn synthetic_entries() {
        let mut store = store(true, 2);
        assert!(store.select_synthetic("Kiwi"));
        assert!(!store.select_synthetic("Kiwi"));
        store.select(&id(1));
        assert_eq!(selected_values(&store), vec!["Kiwi", "Option 1"]);
        let kiwi = store.selected_options()[0].clone();
        assert!(store.remove_selected(&kiwi));
        assert_eq!(selected_values(&store), vec!["Option 1"]);

        let mut single = self::store(false, 2);
        assert!(!single.select_synthetic("Kiwi"));
    }

    #[test]
    fn apply_targets_diffs_and_orders() {
        let mut store = store(true, 4);
        store.select(&id(1));
        store.select(&id(2));
        store.take_events();

        store.apply_targets(&[
            SelectionTarget::Option(id(3)),
            SelectionTarget::Synthetic("Kiwi".to_owned()),
            SelectionTarget::Option(id(2)),
        ]);
        assert_eq!(selected_values(&store), vec!["Option 3", "Kiwi", "Option 2"]);

        let events = store.take_events();
        assert_eq!(events.len(), 3, "option 2 untouched: {events:?}");
        assert!(matches!(&events[0], WidgetEvent::Deselected(e) if e.value == "Option 1"));
    }

    #[test]
    fn apply_targets_replaces_stale_synthetic_text() {
        let mut store = store(true, 2);
        store.apply_targets(&[SelectionTarget::Synthetic("Kiw".to_owned())]);
        store.apply_targets(&[SelectionTarget::Synthetic("Kiwi".to_owned())]);
        assert_eq!(selected_values(&store), vec!["Kiwi"]);
    }
}
