#![forbid(unsafe_code)]

//! Tablist state: which tab is focused, which is active, and how keys move
//! between them.
//!
//! Tabs and panels are separate collections owned by the host. Every
//! operation takes both counts; when they disagree the operation logs a
//! `tablist.mismatch` warning and leaves the state untouched.

use choice_core::event::{KeyCode, KeyEvent, PointerEvent};

/// When a focused tab shows its panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Activation {
    /// Moving focus activates the tab.
    #[default]
    Automatic,
    /// Focus moves freely; Enter or Space activates.
    Manual,
}

/// State for a tablist.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablistState {
    /// Tab whose panel is shown.
    pub active: usize,
    /// Tab with keyboard focus.
    pub focused: usize,
    /// Activation policy.
    pub activation: Activation,
    /// Arrow keys wrap at the ends.
    pub wrap: bool,
}

impl TablistState {
    /// Create a state with the given activation policy.
    #[must_use]
    pub fn new(activation: Activation) -> Self {
        Self {
            activation,
            ..Self::default()
        }
    }

    /// Wrap arrow-key movement at the ends.
    #[must_use]
    pub fn with_wrap(mut self, wrap: bool) -> Self {
        self.wrap = wrap;
        self
    }

    /// Activate a specific tab (and focus it).
    ///
    /// Out-of-range indices clamp to the last tab. Returns `true` if the
    /// active tab changed.
    pub fn select(&mut self, index: usize, tab_count: usize, panel_count: usize) -> bool {
        if !Self::paired(tab_count, panel_count) {
            return false;
        }
        if tab_count == 0 {
            self.active = 0;
            self.focused = 0;
            return false;
        }
        let next = index.min(tab_count - 1);
        self.focused = next;
        if self.active == next {
            return false;
        }
        let old = self.active;
        self.active = next;
        Self::log_switch("select", old, next);
        true
    }

    /// Move focus to a tab. Under automatic activation this also activates
    /// it. Returns `true` if focus or activation changed.
    pub fn focus(&mut self, index: usize, tab_count: usize, panel_count: usize) -> bool {
        if !Self::paired(tab_count, panel_count) || tab_count == 0 {
            return false;
        }
        let next = index.min(tab_count - 1);
        match self.activation {
            Activation::Automatic => {
                let moved = self.focused != next;
                self.select(next, tab_count, panel_count) || moved
            }
            Activation::Manual => {
                if self.focused == next {
                    return false;
                }
                self.focused = next;
                true
            }
        }
    }

    /// Focus the next tab.
    pub fn next(&mut self, tab_count: usize, panel_count: usize) -> bool {
        if tab_count == 0 {
            return false;
        }
        let target = if self.focused + 1 < tab_count {
            self.focused + 1
        } else if self.wrap {
            0
        } else {
            tab_count - 1
        };
        self.focus(target, tab_count, panel_count)
    }

    /// Focus the previous tab.
    pub fn previous(&mut self, tab_count: usize, panel_count: usize) -> bool {
        if tab_count == 0 {
            return false;
        }
        let target = match self.focused.checked_sub(1) {
            Some(target) => target,
            None if self.wrap => tab_count - 1,
            None => 0,
        };
        self.focus(target, tab_count, panel_count)
    }

    /// Handle keyboard navigation.
    ///
    /// Supported:
    /// - `Left` / `Right`
    /// - `Home` / `End`
    /// - `Enter` / `Space` (manual activation)
    pub fn handle_key(&mut self, key: &KeyEvent, tab_count: usize, panel_count: usize) -> bool {
        if !key.is_press() {
            return false;
        }
        match key.code {
            KeyCode::Left => self.previous(tab_count, panel_count),
            KeyCode::Right => self.next(tab_count, panel_count),
            KeyCode::Home => self.focus(0, tab_count, panel_count),
            KeyCode::End => self.focus(tab_count.saturating_sub(1), tab_count, panel_count),
            KeyCode::Enter | KeyCode::Char(' ') => {
                self.select(self.focused, tab_count, panel_count)
            }
            _ => false,
        }
    }

    /// Handle a pointer event on the tab at `index`.
    pub fn handle_pointer(
        &mut self,
        event: &PointerEvent,
        index: usize,
        tab_count: usize,
        panel_count: usize,
    ) -> bool {
        if !event.is_primary_down() || index >= tab_count {
            return false;
        }
        self.select(index, tab_count, panel_count)
    }

    fn paired(tab_count: usize, panel_count: usize) -> bool {
        if tab_count != panel_count {
            tracing::warn!(message = "tablist.mismatch", tab_count, panel_count);
            return false;
        }
        true
    }

    fn log_switch(reason: &str, from: usize, to: usize) {
        tracing::debug!(message = "tablist.switch", reason, from, to);
    }
}
