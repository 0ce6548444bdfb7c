//! Typed form model: the ordered set of fields a task or start event asks of a person.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// An ordered form; field order drives rendering order.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Form {
    pub fields: Vec<FormField>,
}

impl Form {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }
}

/// A single typed form field.
///
/// Every field kind is a distinct variant so rendering and extraction match
/// exhaustively instead of branching on a runtime type tag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormField {
    String(StringField),
    Long(LongField),
    Boolean(BooleanField),
    Date(DateField),
    Enum(EnumField),
}

impl FormField {
    /// Field id, unique within its form; doubles as the engine variable name.
    pub fn id(&self) -> &str {
        match self {
            FormField::String(f) => &f.id,
            FormField::Long(f) => &f.id,
            FormField::Boolean(f) => &f.id,
            FormField::Date(f) => &f.id,
            FormField::Enum(f) => &f.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FormField::String(f) => &f.label,
            FormField::Long(f) => &f.label,
            FormField::Boolean(f) => &f.label,
            FormField::Date(f) => &f.label,
            FormField::Enum(f) => &f.label,
        }
    }

    pub fn required(&self) -> bool {
        match self {
            FormField::String(f) => f.required,
            FormField::Long(f) => f.required,
            FormField::Boolean(f) => f.required,
            FormField::Date(f) => f.required,
            FormField::Enum(f) => f.required,
        }
    }

    pub fn hint(&self) -> Option<&str> {
        match self {
            FormField::String(f) => f.hint.as_deref(),
            FormField::Long(f) => f.hint.as_deref(),
            FormField::Boolean(f) => f.hint.as_deref(),
            FormField::Date(f) => f.hint.as_deref(),
            FormField::Enum(f) => f.hint.as_deref(),
        }
    }
}

/// Free-text field, single or multi line.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StringField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub multiline: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl StringField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }
}

/// Whole-number field with an inclusive minimum and an exclusive maximum.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LongField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    /// Inclusive lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,
    /// Exclusive upper bound as configured on the engine side; users see and
    /// are validated against `max - 1`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl LongField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }

    /// The largest accepted value, derived from the exclusive stored bound.
    pub fn max_inclusive(&self) -> Option<i64> {
        self.max.map(|max| max - 1)
    }
}

/// Yes/no field with optional label overrides for the two choices.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct BooleanField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_label: Option<String>,
}

impl BooleanField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }
}

/// Calendar-date field.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DateField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl DateField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }
}

/// Single-choice field over an ordered key -> option map.
///
/// Invariant: when `value` is set it names a key of `values`. The engine
/// schema mapper enforces this; renderers tolerate violations by leaving the
/// choice unselected.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct EnumField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub values: IndexMap<String, EnumValue>,
}

impl EnumField {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            ..Default::default()
        }
    }
}

/// Display side of one enum option.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EnumValue {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EnumValue {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: None,
        }
    }

    pub fn with_description(text: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            description: Some(description.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_accessors() {
        let field = FormField::Long(LongField {
            required: true,
            hint: Some("Whole numbers only".to_string()),
            ..LongField::new("rating", "Rating")
        });
        assert_eq!(field.id(), "rating");
        assert_eq!(field.label(), "Rating");
        assert!(field.required());
        assert_eq!(field.hint(), Some("Whole numbers only"));
    }

    #[test]
    fn test_max_is_presented_inclusive() {
        let field = LongField {
            max: Some(11),
            ..LongField::new("rating", "Rating")
        };
        assert_eq!(field.max_inclusive(), Some(10));
    }

    #[test]
    fn test_field_tag_round_trip() {
        let field = FormField::Boolean(BooleanField::new("approve", "Approve?"));
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "boolean");
        let back: FormField = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }

    #[test]
    fn test_enum_values_keep_order() {
        let mut field = EnumField::new("genre", "Genre");
        field.values.insert("b".to_string(), EnumValue::new("B"));
        field.values.insert("a".to_string(), EnumValue::new("A"));
        let keys: Vec<&str> = field.values.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["b", "a"]);
    }
}
