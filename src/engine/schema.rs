//! Mapping from the engine's wire-level field schema to the typed form model.
//!
//! Engine adapters convert whatever their API returns into [`FieldDefinition`]s
//! and run them through this mapping once, at form load time, so broken field
//! configuration fails before any message or modal is built from it.

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::model::{
    BooleanField, DateField, EnumField, EnumValue, Form, FormField, LongField, StringField,
    ENGINE_DATE_FORMAT,
};

/// Presence alone makes a field mandatory; any config is ignored.
pub const CONSTRAINT_REQUIRED: &str = "required";
pub const CONSTRAINT_MIN_LENGTH: &str = "minlength";
pub const CONSTRAINT_MAX_LENGTH: &str = "maxlength";
/// Inclusive lower bound on long fields.
pub const CONSTRAINT_MIN: &str = "min";
/// Exclusive upper bound on long fields, kept raw on [`LongField`].
pub const CONSTRAINT_MAX: &str = "max";

pub const PROPERTY_MULTILINE: &str = "chat-multiline";
pub const PROPERTY_PLACEHOLDER: &str = "chat-placeholder";
pub const PROPERTY_HINT: &str = "chat-hint";
pub const PROPERTY_TRUE_LABEL: &str = "chat-true-label";
pub const PROPERTY_FALSE_LABEL: &str = "chat-false-label";
/// Prefix for per-option descriptions on enum fields, suffixed with the option key.
pub const PROPERTY_DESCRIPTION_PREFIX: &str = "chat-description-";

/// One form field as the engine describes it on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldDefinition {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<FieldConstraint>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, String>,
    /// Option key to display text, for `enum` fields.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub options: IndexMap<String, String>,
}

/// A named validation constraint with optional configuration value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FieldConstraint {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<String>,
}

impl FieldConstraint {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: None,
        }
    }

    pub fn with_config(name: impl Into<String>, config: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            config: Some(config.into()),
        }
    }
}

/// Convert a whole set of definitions into a typed form, failing on the first
/// misconfigured field.
pub fn form_from_definitions(definitions: Vec<FieldDefinition>) -> Result<Form> {
    let fields = definitions
        .into_iter()
        .map(form_field_from_definition)
        .collect::<Result<Vec<_>>>()?;
    Ok(Form::new(fields))
}

/// Convert a single definition, dispatching on the engine's type tag.
pub fn form_field_from_definition(definition: FieldDefinition) -> Result<FormField> {
    match definition.kind.as_str() {
        "string" => string_field(&definition).map(FormField::String),
        "long" => long_field(&definition).map(FormField::Long),
        "boolean" => boolean_field(&definition).map(FormField::Boolean),
        "date" => date_field(&definition).map(FormField::Date),
        "enum" => enum_field(&definition).map(FormField::Enum),
        other => Err(Error::field_config(
            &definition.id,
            format!("Unknown field type `{other}`"),
        )),
    }
}

fn string_field(definition: &FieldDefinition) -> Result<StringField> {
    Ok(StringField {
        required: has_constraint(definition, CONSTRAINT_REQUIRED),
        hint: property(definition, PROPERTY_HINT),
        value: string_value(definition)?,
        multiline: property(definition, PROPERTY_MULTILINE).as_deref() == Some("true"),
        min_length: numeric_constraint(definition, CONSTRAINT_MIN_LENGTH)?.map(|n| n as u32),
        max_length: numeric_constraint(definition, CONSTRAINT_MAX_LENGTH)?.map(|n| n as u32),
        placeholder: property(definition, PROPERTY_PLACEHOLDER),
        ..StringField::new(&definition.id, &definition.label)
    })
}

fn long_field(definition: &FieldDefinition) -> Result<LongField> {
    let value = match &definition.value {
        None => None,
        Some(Value::Number(number)) => Some(number.as_i64().ok_or_else(|| {
            Error::field_config(&definition.id, format!("Value `{number}` is not a long"))
        })?),
        Some(other) => {
            return Err(Error::field_config(
                &definition.id,
                format!("Value `{other}` is not a long"),
            ))
        }
    };
    Ok(LongField {
        required: has_constraint(definition, CONSTRAINT_REQUIRED),
        hint: property(definition, PROPERTY_HINT),
        value,
        min: numeric_constraint(definition, CONSTRAINT_MIN)?,
        max: numeric_constraint(definition, CONSTRAINT_MAX)?,
        placeholder: property(definition, PROPERTY_PLACEHOLDER),
        ..LongField::new(&definition.id, &definition.label)
    })
}

fn boolean_field(definition: &FieldDefinition) -> Result<BooleanField> {
    let value = match &definition.value {
        None => None,
        Some(Value::Bool(value)) => Some(*value),
        Some(other) => {
            return Err(Error::field_config(
                &definition.id,
                format!("Value `{other}` is not a boolean"),
            ))
        }
    };
    Ok(BooleanField {
        required: has_constraint(definition, CONSTRAINT_REQUIRED),
        hint: property(definition, PROPERTY_HINT),
        value,
        true_label: property(definition, PROPERTY_TRUE_LABEL),
        false_label: property(definition, PROPERTY_FALSE_LABEL),
        ..BooleanField::new(&definition.id, &definition.label)
    })
}

fn date_field(definition: &FieldDefinition) -> Result<DateField> {
    let value = match string_value(definition)? {
        None => None,
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, ENGINE_DATE_FORMAT).map_err(|err| {
                Error::field_config(&definition.id, format!("Date value `{raw}`: {err}"))
            })?,
        ),
    };
    Ok(DateField {
        required: has_constraint(definition, CONSTRAINT_REQUIRED),
        hint: property(definition, PROPERTY_HINT),
        value,
        placeholder: property(definition, PROPERTY_PLACEHOLDER),
        ..DateField::new(&definition.id, &definition.label)
    })
}

fn enum_field(definition: &FieldDefinition) -> Result<EnumField> {
    let values: IndexMap<String, EnumValue> = definition
        .options
        .iter()
        .map(|(key, text)| {
            let description = property(definition, &format!("{PROPERTY_DESCRIPTION_PREFIX}{key}"));
            let value = match description {
                Some(description) => EnumValue::with_description(text, description),
                None => EnumValue::new(text),
            };
            (key.clone(), value)
        })
        .collect();

    let value = string_value(definition)?;
    if let Some(selected) = &value {
        if !values.contains_key(selected) {
            return Err(Error::field_config(
                &definition.id,
                format!("Value `{selected}` is not one of the options"),
            ));
        }
    }

    Ok(EnumField {
        required: has_constraint(definition, CONSTRAINT_REQUIRED),
        hint: property(definition, PROPERTY_HINT),
        value,
        values,
        ..EnumField::new(&definition.id, &definition.label)
    })
}

fn string_value(definition: &FieldDefinition) -> Result<Option<String>> {
    match &definition.value {
        None => Ok(None),
        Some(Value::String(value)) => Ok(Some(value.clone())),
        Some(other) => Err(Error::field_config(
            &definition.id,
            format!("Value `{other}` is not a string"),
        )),
    }
}

fn has_constraint(definition: &FieldDefinition, name: &str) -> bool {
    definition.constraints.iter().any(|c| c.name == name)
}

/// A numeric constraint must carry a parseable config when present at all.
fn numeric_constraint(definition: &FieldDefinition, name: &str) -> Result<Option<i64>> {
    let Some(constraint) = definition.constraints.iter().find(|c| c.name == name) else {
        return Ok(None);
    };
    let config = constraint.config.as_deref().ok_or_else(|| {
        Error::field_config(
            &definition.id,
            format!("Constraint `{name}` is missing its configuration"),
        )
    })?;
    config.parse::<i64>().map(Some).map_err(|_| {
        Error::field_config(
            &definition.id,
            format!("Constraint `{name}` config `{config}` is not a number"),
        )
    })
}

fn property(definition: &FieldDefinition, name: &str) -> Option<String> {
    definition.properties.get(name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_maps_string_field_with_properties() {
        let mut definition = definition("review", "Review", "string");
        definition.value = Some(json!("Great movie"));
        definition.constraints = vec![
            FieldConstraint::new(CONSTRAINT_REQUIRED),
            FieldConstraint::with_config(CONSTRAINT_MAX_LENGTH, "200"),
        ];
        definition
            .properties
            .insert(PROPERTY_MULTILINE.to_string(), "true".to_string());
        definition
            .properties
            .insert(PROPERTY_PLACEHOLDER.to_string(), "Your thoughts".to_string());

        let field = form_field_from_definition(definition).unwrap();
        let FormField::String(field) = field else {
            panic!("expected a string field");
        };
        assert!(field.required);
        assert!(field.multiline);
        assert_eq!(field.value.as_deref(), Some("Great movie"));
        assert_eq!(field.max_length, Some(200));
        assert_eq!(field.min_length, None);
        assert_eq!(field.placeholder.as_deref(), Some("Your thoughts"));
    }

    #[test]
    fn test_keeps_long_max_exclusive() {
        let mut definition = definition("rating", "Rating", "long");
        definition.constraints = vec![
            FieldConstraint::with_config(CONSTRAINT_MIN, "0"),
            FieldConstraint::with_config(CONSTRAINT_MAX, "11"),
        ];
        let FormField::Long(field) = form_field_from_definition(definition).unwrap() else {
            panic!("expected a long field");
        };
        assert_eq!(field.min, Some(0));
        assert_eq!(field.max, Some(11));
        assert_eq!(field.max_inclusive(), Some(10));
    }

    #[test]
    fn test_numeric_constraint_without_config_fails() {
        let mut definition = definition("rating", "Rating", "long");
        definition.constraints = vec![FieldConstraint::new(CONSTRAINT_MIN)];
        let err = form_field_from_definition(definition).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration for field `rating`: Constraint `min` is missing its configuration"
        );
    }

    #[test]
    fn test_maps_boolean_labels_and_value() {
        let mut definition = definition("approved", "Approved", "boolean");
        definition.value = Some(json!(true));
        definition
            .properties
            .insert(PROPERTY_TRUE_LABEL.to_string(), "Yep".to_string());
        definition
            .properties
            .insert(PROPERTY_FALSE_LABEL.to_string(), "Nope".to_string());
        let FormField::Boolean(field) = form_field_from_definition(definition).unwrap() else {
            panic!("expected a boolean field");
        };
        assert_eq!(field.value, Some(true));
        assert_eq!(field.true_label.as_deref(), Some("Yep"));
        assert_eq!(field.false_label.as_deref(), Some("Nope"));
    }

    #[test]
    fn test_parses_date_value_in_engine_format() {
        let mut definition = definition("when", "When", "date");
        definition.value = Some(json!("08/04/2020"));
        let FormField::Date(field) = form_field_from_definition(definition).unwrap() else {
            panic!("expected a date field");
        };
        assert_eq!(field.value, NaiveDate::from_ymd_opt(2020, 4, 8));

        let mut bad = definition_with_id("when");
        bad.value = Some(json!("2020-04-08"));
        assert!(form_field_from_definition(bad).is_err());
    }

    #[test]
    fn test_enum_options_keep_order_and_pick_up_descriptions() {
        let mut definition = definition("genre", "Genre", "enum");
        definition.options.insert("scifi".to_string(), "Sci-Fi".to_string());
        definition.options.insert("drama".to_string(), "Drama".to_string());
        definition.properties.insert(
            format!("{PROPERTY_DESCRIPTION_PREFIX}drama"),
            "Serious stuff".to_string(),
        );
        let FormField::Enum(field) = form_field_from_definition(definition).unwrap() else {
            panic!("expected an enum field");
        };
        let keys: Vec<&str> = field.values.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["scifi", "drama"]);
        assert_eq!(field.values["scifi"], EnumValue::new("Sci-Fi"));
        assert_eq!(
            field.values["drama"],
            EnumValue::with_description("Drama", "Serious stuff")
        );
    }

    #[test]
    fn test_enum_value_must_be_an_option_key() {
        let mut definition = definition("genre", "Genre", "enum");
        definition.options.insert("drama".to_string(), "Drama".to_string());
        definition.value = Some(json!("comedy"));
        let err = form_field_from_definition(definition).unwrap_err();
        assert!(err.to_string().contains("not one of the options"));
    }

    #[test]
    fn test_unknown_kind_fails() {
        let definition = definition("blob", "Blob", "bytes");
        assert!(form_field_from_definition(definition).is_err());
    }

    fn definition(id: &str, label: &str, kind: &str) -> FieldDefinition {
        FieldDefinition {
            id: id.to_string(),
            label: label.to_string(),
            kind: kind.to_string(),
            ..FieldDefinition::default()
        }
    }

    fn definition_with_id(id: &str) -> FieldDefinition {
        definition(id, "When", "date")
    }
}
