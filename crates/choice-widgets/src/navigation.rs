#![forbid(unsafe_code)]

//! Focus movement over focusable options.
//!
//! Positions are counted over focusable options only, so filtered-out and
//! disabled entries are skipped. Movement past either end wraps or clamps.

use crate::option::OptionLike;
use crate::store::OptionStore;

impl<O: OptionLike> OptionStore<O> {
    /// Move to the next focusable option. Returns the new collection index.
    pub fn focus_next(&mut self, wrap: bool) -> Option<usize> {
        self.focus_by(1, wrap)
    }

    /// Move to the previous focusable option.
    pub fn focus_previous(&mut self, wrap: bool) -> Option<usize> {
        self.focus_by(-1, wrap)
    }

    /// Move to the first focusable option.
    pub fn focus_first(&mut self) -> Option<usize> {
        self.focus_at(0, false)
    }

    /// Move to the last focusable option.
    pub fn focus_last(&mut self) -> Option<usize> {
        self.focus_at(isize::MAX, false)
    }

    /// Move to the `position`-th focusable option.
    ///
    /// Out-of-range positions wrap around when `wrap` is set and clamp to
    /// the nearest end otherwise.
    pub fn focus_at(&mut self, position: isize, wrap: bool) -> Option<usize> {
        let focusable = self.focusable_indices();
        if focusable.is_empty() {
            return None;
        }
        let len = focusable.len() as isize;
        let position = if wrap {
            position.rem_euclid(len)
        } else {
            position.clamp(0, len - 1)
        };
        let index = focusable[position as usize];
        self.set_current_index(index);
        Some(index)
    }

    /// Move `delta` focusable options away from the current one.
    ///
    /// With no current option a forward move lands on the first option and
    /// a backward move on the last.
    pub fn focus_by(&mut self, delta: isize, wrap: bool) -> Option<usize> {
        let focusable = self.focusable_indices();
        if focusable.is_empty() {
            return None;
        }
        let len = focusable.len() as isize;
        let current = self
            .current_index()
            .and_then(|index| focusable.iter().position(|&i| i == index));
        let target = match current {
            Some(position) => {
                let target = (position as isize).saturating_add(delta);
                if wrap && !(0..len).contains(&target) {
                    // Wrapping only ever jumps from one end to the other.
                    if target < 0 { len - 1 } else { 0 }
                } else {
                    target
                }
            }
            None if delta >= 0 => 0,
            None => len - 1,
        };
        self.focus_at(target, false)
    }
}
