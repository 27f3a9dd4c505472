#![forbid(unsafe_code)]

//! Type-ahead search buffer.
//!
//! Typed characters accumulate in a [`SearchBuffer`] and the buffer is
//! matched as a case-insensitive prefix against option content. The buffer
//! itself has no clock: the controller re-arms its `ClearSearchBuffer` timer
//! after every keystroke and calls [`SearchBuffer::clear`] when it fires.

use crate::option::OptionLike;
use crate::store::OptionStore;

/// Accumulated type-ahead text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchBuffer {
    buffer: String,
}

impl SearchBuffer {
    /// Create an empty buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a character and return the whole buffer.
    pub fn push(&mut self, ch: char) -> &str {
        self.buffer.push(ch);
        &self.buffer
    }

    /// Forget everything typed so far.
    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    /// The buffer contents.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    /// Whether nothing has been typed since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Append `ch` and move the current option to the first match.
    ///
    /// Returns the collection index of the match. Without a match the
    /// current option is left alone.
    pub fn append_key<O: OptionLike>(&mut self, ch: char, store: &mut OptionStore<O>) -> Option<usize> {
        let query = self.push(ch);
        let found = store.first_prefix_match(query)?;
        store.set_current_index(found);
        tracing::debug!(
            message = "select.typeahead",
            query = self.buffer.as_str(),
            matched = found
        );
        Some(found)
    }
}
