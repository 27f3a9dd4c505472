#![forbid(unsafe_code)]

//! The computed form value.

use crate::config::{SelectConfig, ValueType};
use crate::option::SelectedOption;

/// Structured multi-value form data: one entry per selected value, all under
/// the same field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    /// Field name, if the widget has one.
    pub name: Option<String>,
    /// Submitted values in selection order.
    pub values: Vec<String>,
}

impl FormData {
    /// `(name, value)` pairs as a form submission would list them.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        let name = self.name.as_deref().unwrap_or("");
        self.values.iter().map(move |value| (name, value.as_str()))
    }
}

/// The value a widget hands to the form layer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WidgetValue {
    /// Nothing selected and no literal text.
    #[default]
    Empty,
    /// Single-select value, or the literal text of an editable trigger.
    Scalar(String),
    /// Multi-select values joined with the delimiter.
    Joined(String),
    /// Multi-select values as form data.
    Structured(FormData),
}

impl WidgetValue {
    /// Derive the value from the selected list.
    #[must_use]
    pub fn from_selection(selected: &[SelectedOption], config: &SelectConfig) -> Self {
        if selected.is_empty() {
            return Self::Empty;
        }
        if !config.multiple {
            return Self::Scalar(selected[0].value.clone());
        }
        match config.value_type {
            ValueType::String => Self::Joined(
                selected
                    .iter()
                    .map(|entry| entry.value.as_str())
                    .collect::<Vec<_>>()
                    .join(&config.delimiter),
            ),
            ValueType::Structured => Self::Structured(FormData {
                name: config.name.clone(),
                values: selected.iter().map(|entry| entry.value.clone()).collect(),
            }),
        }
    }

    /// Whether there is nothing to submit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Scalar(text) | Self::Joined(text) => text.is_empty(),
            Self::Structured(data) => data.values.is_empty(),
        }
    }

    /// Text form of a scalar or joined value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Scalar(text) | Self::Joined(text) => Some(text),
            Self::Empty | Self::Structured(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn picked(values: &[&str]) -> Vec<SelectedOption> {
        values.iter().map(|v| SelectedOption::synthetic(*v)).collect()
    }

    #[test]
    fn empty_selection_is_empty() {
        let config = SelectConfig::select().with_multiple(true);
        assert_eq!(WidgetValue::from_selection(&[], &config), WidgetValue::Empty);
        assert!(WidgetValue::Empty.is_empty());
    }

    #[test]
    fn single_is_scalar() {
        let value = WidgetValue::from_selection(&picked(&["b"]), &SelectConfig::select());
        assert_eq!(value, WidgetValue::Scalar("b".to_owned()));
        assert_eq!(value.as_text(), Some("b"));
    }

    #[test]
    fn multi_string_joins_with_delimiter() {
        let config = SelectConfig::select()
            .with_multiple(true)
            .with_delimiter(";", " ");
        let value = WidgetValue::from_selection(&picked(&["a", "b", "c"]), &config);
        assert_eq!(value, WidgetValue::Joined("a;b;c".to_owned()));
    }

    #[test]
    fn multi_structured_uses_field_name() {
        let config = SelectConfig::select()
            .with_multiple(true)
            .with_value_type(ValueType::Structured)
            .with_name("fruit");
        let value = WidgetValue::from_selection(&picked(&["a", "b"]), &config);
        let WidgetValue::Structured(data) = value else {
            panic!("expected structured value");
        };
        assert_eq!(
            data.entries().collect::<Vec<_>>(),
            vec![("fruit", "a"), ("fruit", "b")]
        );
        assert_eq!(WidgetValue::Structured(data).as_text(), None);
    }
}
