#![forbid(unsafe_code)]

//! Widget configuration.
//!
//! [`SelectConfig`] carries every flag the engine recognizes. Start from the
//! constructor for the widget kind ([`SelectConfig::listbox`],
//! [`SelectConfig::select`], [`SelectConfig::combobox`]) and adjust with the
//! `with_*` builders.
//!
//! # Timing Defaults
//!
//! | Setting | Listbox | Select / Combobox | Range |
//! |---------|---------|-------------------|-------|
//! | `search_buffer_delay` | 1000ms | 600ms | 100-5000ms |
//! | `rebuild_debounce` | 5ms | 5ms | 0-50ms |
//! | `render_turn` | 16ms | 16ms | 0-100ms |
//! | `page_size` | 10 | 10 | 1-10000 |
//!
//! # Environment Variables
//!
//! | Variable | Type | Description |
//! |----------|------|-------------|
//! | `CHOICE_SEARCH_BUFFER_DELAY_MS` | u64 | Type-ahead reset delay |
//! | `CHOICE_REBUILD_DEBOUNCE_MS` | u64 | Structural rebuild coalescing window |
//! | `CHOICE_WRAP_SELECTION` | bool | Wrap focus at the list ends |
//! | `CHOICE_AUTOCOMPLETE` | `off\|inline\|list\|both` | Autocomplete mode |
//! | `CHOICE_VALUE_TYPE` | `string\|structured` | Multi-select value shape |
//! | `CHOICE_DELIMITER` | string | Multi-value separator |
//! | `CHOICE_SPACER` | string | Padding after the separator |

use std::fmt;
use std::str::FromStr;

use thiserror::Error;
use web_time::Duration;

/// Default type-ahead reset delay for popup widgets.
pub const DEFAULT_SEARCH_BUFFER_DELAY_MS: u64 = 600;

/// Default type-ahead reset delay for a plain listbox.
pub const DEFAULT_LISTBOX_SEARCH_BUFFER_DELAY_MS: u64 = 1000;

/// Minimum allowed type-ahead reset delay.
pub const MIN_SEARCH_BUFFER_DELAY_MS: u64 = 100;

/// Maximum allowed type-ahead reset delay.
pub const MAX_SEARCH_BUFFER_DELAY_MS: u64 = 5000;

/// Default structural rebuild debounce.
pub const DEFAULT_REBUILD_DEBOUNCE_MS: u64 = 5;

/// Maximum allowed structural rebuild debounce.
pub const MAX_REBUILD_DEBOUNCE_MS: u64 = 50;

/// Default length of one rendering turn.
pub const DEFAULT_RENDER_TURN_MS: u64 = 16;

/// Maximum allowed rendering turn.
pub const MAX_RENDER_TURN_MS: u64 = 100;

/// Default number of options skipped by PageUp/PageDown.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Largest page step accepted by [`SelectConfig::validated`].
pub const MAX_PAGE_SIZE: usize = 10_000;

/// Errors from parsing configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A value could not be parsed for the given key.
    #[error("invalid value {value:?} for {key}")]
    InvalidValue {
        /// Configuration key (or environment variable).
        key: &'static str,
        /// The rejected text.
        value: String,
    },
    /// A numeric value fell outside its allowed range.
    #[error("{key} = {value} is outside {min}..={max}")]
    OutOfRange {
        /// Configuration key (or environment variable).
        key: &'static str,
        /// The rejected number.
        value: u64,
        /// Lower bound.
        min: u64,
        /// Upper bound.
        max: u64,
    },
}

/// Which widget the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum WidgetKind {
    /// An always-visible list; there is no popup to open or close.
    Listbox,
    /// A non-editable trigger with a popup list.
    #[default]
    Select,
    /// An editable trigger with a popup list.
    Combobox,
}

impl WidgetKind {
    /// Whether the widget has a popup that opens and closes.
    #[must_use]
    pub const fn has_popup(self) -> bool {
        !matches!(self, Self::Listbox)
    }
}

/// How an editable trigger suggests options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum AutocompleteMode {
    /// No suggestions.
    #[default]
    Off,
    /// Ghost completion in the trigger text only.
    Inline,
    /// Suggestions in the list only.
    List,
    /// Ghost completion and list suggestions.
    Both,
}

impl AutocompleteMode {
    /// Whether typed text is completed inline (ghost completion).
    #[must_use]
    pub const fn suggests_inline(self) -> bool {
        matches!(self, Self::Inline | Self::Both)
    }
}

/// Shape of the multi-select value handed to the form layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum ValueType {
    /// Values joined with the delimiter.
    #[default]
    String,
    /// One form entry per value.
    Structured,
}

/// When typed multi-value text turns into selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MultipleSelectionType {
    /// Every keystroke re-derives the selection from the text.
    #[default]
    Automatic,
    /// Only Enter or chip removal changes the selection.
    Manual,
}

macro_rules! impl_keyword_enum {
    ($ty:ty, $key:literal, { $($text:literal => $variant:path),+ $(,)? }) => {
        impl FromStr for $ty {
            type Err = ConfigError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($text => Ok($variant),)+
                    _ => Err(ConfigError::InvalidValue {
                        key: $key,
                        value: s.to_owned(),
                    }),
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                let text = match self {
                    $($variant => $text,)+
                };
                f.write_str(text)
            }
        }
    };
}

impl_keyword_enum!(WidgetKind, "kind", {
    "listbox" => WidgetKind::Listbox,
    "select" => WidgetKind::Select,
    "combobox" => WidgetKind::Combobox,
});

impl_keyword_enum!(AutocompleteMode, "autocomplete", {
    "off" => AutocompleteMode::Off,
    "inline" => AutocompleteMode::Inline,
    "list" => AutocompleteMode::List,
    "both" => AutocompleteMode::Both,
});

impl_keyword_enum!(ValueType, "value_type", {
    "string" => ValueType::String,
    "structured" => ValueType::Structured,
});

impl_keyword_enum!(MultipleSelectionType, "multiple_selection_type", {
    "automatic" => MultipleSelectionType::Automatic,
    "manual" => MultipleSelectionType::Manual,
});

/// Configuration for one widget instance.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct SelectConfig {
    /// Widget kind.
    pub kind: WidgetKind,
    /// Allow more than one selected option.
    pub multiple: bool,
    /// Whether the trigger accepts free text.
    pub editable: bool,
    /// Suggestion behaviour of an editable trigger.
    pub autocomplete: AutocompleteMode,
    /// Hide options that do not start with the typed text.
    pub filter_results: bool,
    /// Wrap focus from the last option to the first and back.
    pub wrap_selection: bool,
    /// Multi-select value shape.
    pub value_type: ValueType,
    /// Separator between values in multi-value text.
    pub delimiter: String,
    /// Padding typed after the separator; stripped before splitting.
    pub spacer: String,
    /// Commit policy for editable multi-select.
    pub multiple_selection_type: MultipleSelectionType,
    /// Accept typed values that match no option.
    pub allow_custom_values: bool,
    /// Type-ahead buffer reset delay.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub search_buffer_delay: Duration,
    /// Window in which structural changes are coalesced into one rebuild.
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub rebuild_debounce: Duration,
    /// Length of one rendering turn (popup positioning and teardown wait).
    #[cfg_attr(feature = "serde", serde(with = "duration_ms"))]
    pub render_turn: Duration,
    /// Options skipped by PageUp/PageDown.
    pub page_size: usize,
    /// Form field name used for structured values.
    pub name: Option<String>,
    /// Prefix for engine-assigned option ids.
    pub id_prefix: String,
}

impl Default for SelectConfig {
    fn default() -> Self {
        Self {
            kind: WidgetKind::Select,
            multiple: false,
            editable: false,
            autocomplete: AutocompleteMode::Off,
            filter_results: false,
            wrap_selection: false,
            value_type: ValueType::String,
            delimiter: ",".to_owned(),
            spacer: " ".to_owned(),
            multiple_selection_type: MultipleSelectionType::Automatic,
            allow_custom_values: false,
            search_buffer_delay: Duration::from_millis(DEFAULT_SEARCH_BUFFER_DELAY_MS),
            rebuild_debounce: Duration::from_millis(DEFAULT_REBUILD_DEBOUNCE_MS),
            render_turn: Duration::from_millis(DEFAULT_RENDER_TURN_MS),
            page_size: DEFAULT_PAGE_SIZE,
            name: None,
            id_prefix: "choice".to_owned(),
        }
    }
}

impl SelectConfig {
    /// An always-visible listbox.
    #[must_use]
    pub fn listbox() -> Self {
        Self {
            kind: WidgetKind::Listbox,
            search_buffer_delay: Duration::from_millis(DEFAULT_LISTBOX_SEARCH_BUFFER_DELAY_MS),
            ..Self::default()
        }
    }

    /// A non-editable select with a popup.
    #[must_use]
    pub fn select() -> Self {
        Self::default()
    }

    /// An editable combobox with inline and list suggestions.
    #[must_use]
    pub fn combobox() -> Self {
        Self {
            kind: WidgetKind::Combobox,
            editable: true,
            autocomplete: AutocompleteMode::Both,
            ..Self::default()
        }
    }

    /// Allow multiple selections.
    #[must_use]
    pub fn with_multiple(mut self, multiple: bool) -> Self {
        self.multiple = multiple;
        self
    }

    /// Set the autocomplete mode.
    #[must_use]
    pub fn with_autocomplete(mut self, mode: AutocompleteMode) -> Self {
        self.autocomplete = mode;
        self
    }

    /// Hide options that do not match the typed text.
    #[must_use]
    pub fn with_filter_results(mut self, filter: bool) -> Self {
        self.filter_results = filter;
        self
    }

    /// Wrap focus at the list ends.
    #[must_use]
    pub fn with_wrap_selection(mut self, wrap: bool) -> Self {
        self.wrap_selection = wrap;
        self
    }

    /// Set the multi-select value shape.
    #[must_use]
    pub fn with_value_type(mut self, value_type: ValueType) -> Self {
        self.value_type = value_type;
        self
    }

    /// Set the multi-value delimiter and spacer.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: impl Into<String>, spacer: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self.spacer = spacer.into();
        self
    }

    /// Set the editable multi-select commit policy.
    #[must_use]
    pub fn with_multiple_selection_type(mut self, policy: MultipleSelectionType) -> Self {
        self.multiple_selection_type = policy;
        self
    }

    /// Accept typed values that match no option.
    #[must_use]
    pub fn with_allow_custom_values(mut self, allow: bool) -> Self {
        self.allow_custom_values = allow;
        self
    }

    /// Set the type-ahead reset delay.
    #[must_use]
    pub fn with_search_buffer_delay(mut self, delay: Duration) -> Self {
        self.search_buffer_delay = delay;
        self
    }

    /// Set the structural rebuild debounce.
    #[must_use]
    pub fn with_rebuild_debounce(mut self, debounce: Duration) -> Self {
        self.rebuild_debounce = debounce;
        self
    }

    /// Set the form field name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the prefix for engine-assigned option ids.
    #[must_use]
    pub fn with_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.id_prefix = prefix.into();
        self
    }

    /// Whether the trigger is editable free text.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.editable || self.kind == WidgetKind::Combobox
    }

    /// Overlay environment variables on `self`, ignoring unparsable values.
    ///
    /// Values are clamped to valid ranges afterwards.
    #[must_use]
    pub fn overlay_env(mut self) -> Self {
        let _ = self.apply_env(false);
        self.validated()
    }

    /// Default select configuration overlaid with environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// Like [`from_env`](Self::from_env), but any unparsable or out-of-range
    /// variable is an error.
    pub fn try_from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env(true)?;
        Ok(config.validated())
    }

    fn apply_env(&mut self, strict: bool) -> Result<(), ConfigError> {
        let outcome = |result: Result<(), ConfigError>| -> Result<(), ConfigError> {
            match result {
                Err(err) if strict => Err(err),
                _ => Ok(()),
            }
        };

        if let Ok(val) = std::env::var("CHOICE_SEARCH_BUFFER_DELAY_MS") {
            outcome(
                parse_millis(
                    "CHOICE_SEARCH_BUFFER_DELAY_MS",
                    &val,
                    MIN_SEARCH_BUFFER_DELAY_MS,
                    MAX_SEARCH_BUFFER_DELAY_MS,
                    strict,
                )
                .map(|delay| self.search_buffer_delay = delay),
            )?;
        }

        if let Ok(val) = std::env::var("CHOICE_REBUILD_DEBOUNCE_MS") {
            outcome(
                parse_millis(
                    "CHOICE_REBUILD_DEBOUNCE_MS",
                    &val,
                    0,
                    MAX_REBUILD_DEBOUNCE_MS,
                    strict,
                )
                .map(|debounce| self.rebuild_debounce = debounce),
            )?;
        }

        if let Ok(val) = std::env::var("CHOICE_WRAP_SELECTION") {
            outcome(
                parse_bool("CHOICE_WRAP_SELECTION", &val).map(|wrap| self.wrap_selection = wrap),
            )?;
        }

        if let Ok(val) = std::env::var("CHOICE_AUTOCOMPLETE") {
            outcome(val.parse().map(|mode| self.autocomplete = mode))?;
        }

        if let Ok(val) = std::env::var("CHOICE_VALUE_TYPE") {
            outcome(val.parse().map(|value_type| self.value_type = value_type))?;
        }

        if let Ok(val) = std::env::var("CHOICE_DELIMITER") {
            self.delimiter = val;
        }

        if let Ok(val) = std::env::var("CHOICE_SPACER") {
            self.spacer = val;
        }

        Ok(())
    }

    /// Clamp values to safe ranges.
    ///
    /// Returns a config with:
    /// - `search_buffer_delay` clamped to 100-5000ms
    /// - `rebuild_debounce` capped at 50ms
    /// - `render_turn` capped at 100ms
    /// - `page_size` clamped to 1-10000
    /// - an empty `delimiter` replaced by `","`
    /// - a `spacer` equal to the delimiter cleared
    ///
    /// # Example
    ///
    /// ```
    /// use choice_widgets::config::SelectConfig;
    /// use web_time::Duration;
    ///
    /// let config = SelectConfig::listbox()
    ///     .with_search_buffer_delay(Duration::from_millis(20))
    ///     .validated();
    /// assert_eq!(config.search_buffer_delay.as_millis(), 100);
    /// ```
    #[must_use]
    pub fn validated(mut self) -> Self {
        let delay_ms = self.search_buffer_delay.as_millis() as u64;
        self.search_buffer_delay = Duration::from_millis(
            delay_ms.clamp(MIN_SEARCH_BUFFER_DELAY_MS, MAX_SEARCH_BUFFER_DELAY_MS),
        );

        let debounce_ms = self.rebuild_debounce.as_millis() as u64;
        self.rebuild_debounce = Duration::from_millis(debounce_ms.min(MAX_REBUILD_DEBOUNCE_MS));

        let turn_ms = self.render_turn.as_millis() as u64;
        self.render_turn = Duration::from_millis(turn_ms.min(MAX_RENDER_TURN_MS));

        self.page_size = self.page_size.clamp(1, MAX_PAGE_SIZE);

        if self.delimiter.is_empty() {
            self.delimiter = ",".to_owned();
        }
        if self.spacer == self.delimiter {
            self.spacer.clear();
        }

        self
    }
}

fn parse_millis(
    key: &'static str,
    val: &str,
    min: u64,
    max: u64,
    strict: bool,
) -> Result<Duration, ConfigError> {
    let ms = val
        .trim()
        .parse::<u64>()
        .map_err(|_| ConfigError::InvalidValue {
            key,
            value: val.to_owned(),
        })?;
    if strict && !(min..=max).contains(&ms) {
        return Err(ConfigError::OutOfRange {
            key,
            value: ms,
            min,
            max,
        });
    }
    Ok(Duration::from_millis(ms))
}

fn parse_bool(key: &'static str, val: &str) -> Result<bool, ConfigError> {
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidValue {
            key,
            value: val.to_owned(),
        }),
    }
}

#[cfg(feature = "serde")]
mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use web_time::Duration;

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis() as u64)
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_defaults() {
        assert_eq!(
            SelectConfig::listbox().search_buffer_delay,
            Duration::from_millis(1000)
        );
        assert_eq!(
            SelectConfig::select().search_buffer_delay,
            Duration::from_millis(600)
        );
        let combo = SelectConfig::combobox();
        assert!(combo.is_editable());
        assert_eq!(combo.autocomplete, AutocompleteMode::Both);
        assert!(!SelectConfig::select().is_editable());
        assert!(!WidgetKind::Listbox.has_popup());
        assert!(WidgetKind::Combobox.has_popup());
    }

    #[test]
    fn keyword_round_trip() {
        for mode in [
            AutocompleteMode::Off,
            AutocompleteMode::Inline,
            AutocompleteMode::List,
            AutocompleteMode::Both,
        ] {
            assert_eq!(mode.to_string().parse::<AutocompleteMode>(), Ok(mode));
        }
        assert_eq!("Structured".parse::<ValueType>(), Ok(ValueType::Structured));
        assert_eq!(
            " manual ".parse::<MultipleSelectionType>(),
            Ok(MultipleSelectionType::Manual)
        );
        assert_eq!(WidgetKind::Combobox.to_string(), "combobox");
    }

    #[test]
    fn keyword_errors_name_the_key() {
        let err = "sometimes".parse::<AutocompleteMode>().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue {
                key: "autocomplete",
                value: "sometimes".to_owned()
            }
        );
        assert_eq!(
            err.to_string(),
            "invalid value \"sometimes\" for autocomplete"
        );
    }

    #[test]
    fn inline_suggestion_modes() {
        assert!(AutocompleteMode::Inline.suggests_inline());
        assert!(AutocompleteMode::Both.suggests_inline());
        assert!(!AutocompleteMode::List.suggests_inline());
        assert!(!AutocompleteMode::Off.suggests_inline());
    }

    #[test]
    fn validated_clamps() {
        let config = SelectConfig {
            search_buffer_delay: Duration::from_millis(60_000),
            rebuild_debounce: Duration::from_millis(500),
            render_turn: Duration::from_secs(1),
            page_size: 0,
            delimiter: String::new(),
            spacer: ",".to_owned(),
            ..SelectConfig::default()
        }
        .validated();
        assert_eq!(config.search_buffer_delay, Duration::from_millis(5000));
        assert_eq!(config.rebuild_debounce, Duration::from_millis(50));
        assert_eq!(config.render_turn, Duration::from_millis(100));
        assert_eq!(config.page_size, 1);
        assert_eq!(config.delimiter, ",");
        assert!(config.spacer.is_empty());

        let huge = SelectConfig {
            page_size: usize::MAX,
            ..SelectConfig::default()
        }
        .validated();
        assert_eq!(huge.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn parse_helpers() {
        assert_eq!(parse_bool("k", "TRUE"), Ok(true));
        assert_eq!(parse_bool("k", "off"), Ok(false));
        assert!(parse_bool("k", "maybe").is_err());
        assert_eq!(
            parse_millis("k", "250", 100, 5000, true),
            Ok(Duration::from_millis(250))
        );
        assert_eq!(
            parse_millis("k", "20", 100, 5000, true),
            Err(ConfigError::OutOfRange {
                key: "k",
                value: 20,
                min: 100,
                max: 5000
            })
        );
        assert_eq!(
            parse_millis("k", "20", 100, 5000, false),
            Ok(Duration::from_millis(20))
        );
        assert!(parse_millis("k", "soon", 0, 1, false).is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_uses_milliseconds_and_lowercase() {
        let json = r#"{"kind":"combobox","multiple":true,"autocomplete":"inline","search_buffer_delay":250}"#;
        let config: SelectConfig = serde_json::from_str(json).expect("config parses");
        assert_eq!(config.kind, WidgetKind::Combobox);
        assert!(config.multiple);
        assert_eq!(config.autocomplete, AutocompleteMode::Inline);
        assert_eq!(config.search_buffer_delay, Duration::from_millis(250));
        assert_eq!(config.delimiter, ",");

        let back = serde_json::to_value(&config).expect("config serializes");
        assert_eq!(back["search_buffer_delay"], 250);
        assert_eq!(back["value_type"], "string");
    }
}
