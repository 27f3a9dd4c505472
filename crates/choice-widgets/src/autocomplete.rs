#![forbid(unsafe_code)]

//! Free-text resolution for editable triggers.
//!
//! This module turns trigger text into selection intent:
//!
//! - [`parse_tokens`] splits delimited multi-value text into confirmed
//!   tokens and the token still being typed.
//! - [`suggest`] finds the ghost completion for a token: the typed text
//!   stays literal and the rest of the suggested option's content is added
//!   as a selected range the next keystroke overwrites.
//! - [`resolve_tokens`] maps confirmed tokens to options or synthetic
//!   entries for the automatic commit policy.
//!
//! All text positions exposed here are in chars, not bytes.

use std::ops::Range;

use choice_core::event::InputKind;

use crate::config::AutocompleteMode;
use crate::option::OptionLike;
use crate::selection::SelectionTarget;
use crate::store::OptionStore;

/// Text shown in an editable trigger, with an optional selected range.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerText {
    /// Full text.
    pub text: String,
    /// Selected char range, used for the suggested part of a completion.
    pub selection: Option<Range<usize>>,
}

impl TriggerText {
    /// Text without a selected range.
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selection: None,
        }
    }

    /// Whether the text is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The text the user typed, without the suggested remainder.
    #[must_use]
    pub fn typed(&self) -> &str {
        match &self.selection {
            Some(range) => {
                let end = self
                    .text
                    .char_indices()
                    .nth(range.start)
                    .map_or(self.text.len(), |(byte, _)| byte);
                &self.text[..end]
            }
            None => &self.text,
        }
    }
}

/// Multi-value text split into tokens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    /// Non-empty tokens followed by a delimiter, trimmed.
    pub confirmed: Vec<String>,
    /// Text after the last delimiter; may be empty.
    pub in_progress: String,
}

impl Tokens {
    /// The text in front of the in-progress token.
    ///
    /// The in-progress token is always a suffix of the text it was parsed
    /// from, so this is a plain slice.
    #[must_use]
    pub fn head<'a>(&self, text: &'a str) -> &'a str {
        let cut = text.len().saturating_sub(self.in_progress.len());
        text.get(..cut).unwrap_or("")
    }
}

/// Split `text` on `delimiter`, ignoring a `spacer` that follows it.
///
/// ```
/// use choice_widgets::autocomplete::parse_tokens;
///
/// let tokens = parse_tokens("Option 1, Option 2, App", ",", " ");
/// assert_eq!(tokens.confirmed, vec!["Option 1", "Option 2"]);
/// assert_eq!(tokens.in_progress, "App");
/// ```
#[must_use]
pub fn parse_tokens(text: &str, delimiter: &str, spacer: &str) -> Tokens {
    if delimiter.is_empty() {
        return Tokens {
            confirmed: Vec::new(),
            in_progress: text.trim_start().to_owned(),
        };
    }
    let normalized = if spacer.is_empty() {
        text.to_owned()
    } else {
        text.replace(&format!("{delimiter}{spacer}"), delimiter)
    };
    let mut parts: Vec<&str> = normalized.split(delimiter).collect();
    let last = parts.pop().unwrap_or("");
    Tokens {
        confirmed: parts
            .into_iter()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(str::to_owned)
            .collect(),
        in_progress: last.trim_start().to_owned(),
    }
}

/// Join tokens for display, with a trailing separator when `trailing`.
#[must_use]
pub fn join_tokens<'a, I>(tokens: I, delimiter: &str, spacer: &str, trailing: bool) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let separator = format!("{delimiter}{spacer}");
    let mut text = tokens.into_iter().collect::<Vec<_>>().join(&separator);
    if trailing && !text.is_empty() {
        text.push_str(&separator);
    }
    text
}

/// Whether a typed token may receive a suggestion.
///
/// Never after a backward delete, so removing characters does not bring
/// the removed text straight back.
#[must_use]
pub fn should_select_suggested_option(mode: AutocompleteMode, token: &str, edit: InputKind) -> bool {
    !edit.is_backward_delete() && mode.suggests_inline() && !token.is_empty()
}

/// `typed` followed by the part of `content` beyond `typed`'s length.
#[must_use]
pub fn ghost_completion(typed: &str, content: &str) -> String {
    let mut text = typed.to_owned();
    text.extend(content.chars().skip(typed.chars().count()));
    text
}

/// A completion for the in-progress token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    /// Collection index of the suggested option.
    pub index: usize,
    /// Trigger text with the suggested remainder selected.
    pub trigger: TriggerText,
}

/// Suggest the first focusable option whose content starts with `token`.
///
/// `head` is the text in front of the token (confirmed multi-value tokens)
/// and is kept as it is.
#[must_use]
pub fn suggest<O: OptionLike>(store: &OptionStore<O>, head: &str, token: &str) -> Option<Suggestion> {
    let index = store.first_prefix_match(token)?;
    let content = store.options()[index].content();
    let text = format!("{head}{}", ghost_completion(token, content));
    let start = head.chars().count() + token.chars().count();
    let end = text.chars().count();
    Some(Suggestion {
        index,
        trigger: TriggerText {
            text,
            selection: (start < end).then_some(start..end),
        },
    })
}

/// Map tokens to selection targets: exact content matches become options,
/// everything else a synthetic entry.
#[must_use]
pub fn resolve_tokens<O: OptionLike>(store: &OptionStore<O>, tokens: &[String]) -> Vec<SelectionTarget> {
    tokens
        .iter()
        .map(|token| {
            store
                .exact_match(token)
                .and_then(|index| store.options()[index].id().cloned())
                .map_or_else(
                    || SelectionTarget::Synthetic(token.clone()),
                    SelectionTarget::Option,
                )
        })
        .collect()
}
