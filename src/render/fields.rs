//! Per-type mapping between form fields and chat input widgets.
//!
//! Each field renders as one input block whose block id, element action id,
//! and state key are all the field id plus a type suffix, so every widget of
//! a view lives in one flat state map. Extraction reverses the mapping and
//! reports problems as user-facing per-field messages, never as crate errors.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::chat::blocks::{Block, Element, OptionItem, Text};
use crate::chat::view::{ViewState, WidgetState};
use crate::model::{
    BooleanField, DateField, EnumField, Form, FormField, LongField, StringField, VariableValue,
    CHAT_DATE_FORMAT,
};

pub const SUFFIX_TEXT: &str = "_text";
pub const SUFFIX_LONG: &str = "_long";
pub const SUFFIX_BOOLEAN: &str = "_boolean";
pub const SUFFIX_DATE: &str = "_date";
pub const SUFFIX_ENUM: &str = "_enum";

/// Suffixed id shared by a field's input block, its element, and its state entry.
pub fn state_key(field: &FormField) -> String {
    let suffix = match field {
        FormField::String(_) => SUFFIX_TEXT,
        FormField::Long(_) => SUFFIX_LONG,
        FormField::Boolean(_) => SUFFIX_BOOLEAN,
        FormField::Date(_) => SUFFIX_DATE,
        FormField::Enum(_) => SUFFIX_ENUM,
    };
    format!("{}{}", field.id(), suffix)
}

/// Render one field as an input block.
pub fn render(field: &FormField) -> Block {
    let key = state_key(field);
    let element = match field {
        FormField::String(f) => string_element(f, &key),
        FormField::Long(f) => long_element(f, &key),
        FormField::Boolean(f) => boolean_element(f, &key),
        FormField::Date(f) => date_element(f, &key),
        FormField::Enum(f) => enum_element(f, &key),
    };
    Block::Input {
        block_id: key,
        label: Text::plain(field.label()),
        element,
        optional: !field.required(),
        hint: field.hint().map(Text::plain),
    }
}

/// Pull one field's value out of the submitted state.
///
/// `Ok(None)` means the widget was left untouched; required-ness is the
/// platform's concern, not re-checked here.
pub fn extract(field: &FormField, state: &ViewState) -> Result<Option<VariableValue>, String> {
    let widget = state.get(&state_key(field));
    match field {
        FormField::String(_) => Ok(widget
            .and_then(|w| w.value.clone())
            .filter(|value| !value.is_empty())
            .map(VariableValue::String)),
        FormField::Long(f) => extract_long(f, widget),
        FormField::Boolean(_) => match widget.and_then(|w| w.selected_option.as_ref()) {
            None => Ok(None),
            Some(option) => match option.value.as_str() {
                "true" => Ok(Some(VariableValue::Boolean(true))),
                "false" => Ok(Some(VariableValue::Boolean(false))),
                _ => Err("Invalid selection".to_string()),
            },
        },
        FormField::Date(_) => match widget.and_then(|w| w.selected_date.as_deref()) {
            None => Ok(None),
            Some(raw) => NaiveDate::parse_from_str(raw, CHAT_DATE_FORMAT)
                .map(|date| Some(VariableValue::Date(date)))
                .map_err(|_| "Failed to parse date".to_string()),
        },
        FormField::Enum(_) => Ok(widget
            .and_then(|w| w.selected_option.as_ref())
            .map(|option| VariableValue::String(option.value.clone()))),
    }
}

/// Extract every field of a form.
///
/// Success collects values by field id in form order; any failure collects
/// every per-field message keyed by the suffixed block id instead, so the
/// platform can mark all offending inputs at once.
pub fn extract_all(
    form: &Form,
    state: &ViewState,
) -> Result<IndexMap<String, VariableValue>, IndexMap<String, String>> {
    let mut values = IndexMap::new();
    let mut errors = IndexMap::new();
    for field in &form.fields {
        match extract(field, state) {
            Ok(Some(value)) => {
                values.insert(field.id().to_string(), value);
            }
            Ok(None) => {}
            Err(message) => {
                errors.insert(state_key(field), message);
            }
        }
    }
    if errors.is_empty() {
        Ok(values)
    } else {
        Err(errors)
    }
}

fn string_element(field: &StringField, key: &str) -> Element {
    Element::PlainTextInput {
        action_id: key.to_string(),
        multiline: field.multiline,
        initial_value: field.value.clone(),
        min_length: field.min_length,
        max_length: field.max_length,
        placeholder: field.placeholder.clone().map(Text::plain),
    }
}

fn long_element(field: &LongField, key: &str) -> Element {
    Element::PlainTextInput {
        action_id: key.to_string(),
        multiline: false,
        initial_value: field.value.map(|value| value.to_string()),
        min_length: None,
        max_length: None,
        placeholder: field.placeholder.clone().map(Text::plain),
    }
}

fn boolean_element(field: &BooleanField, key: &str) -> Element {
    // Label overrides may carry markdown; the bare defaults stay plain.
    let true_text = match &field.true_label {
        Some(label) => Text::mrkdwn(label.clone()),
        None => Text::plain("Yes"),
    };
    let false_text = match &field.false_label {
        Some(label) => Text::mrkdwn(label.clone()),
        None => Text::plain("No"),
    };
    let options = vec![
        OptionItem::new(true_text, "true"),
        OptionItem::new(false_text, "false"),
    ];
    let initial_option = field
        .value
        .map(|value| options[if value { 0 } else { 1 }].clone());
    Element::RadioButtons {
        action_id: key.to_string(),
        options,
        initial_option,
    }
}

fn date_element(field: &DateField, key: &str) -> Element {
    Element::Datepicker {
        action_id: key.to_string(),
        initial_date: field
            .value
            .map(|date| date.format(CHAT_DATE_FORMAT).to_string()),
        placeholder: field.placeholder.clone().map(Text::plain),
    }
}

fn enum_element(field: &EnumField, key: &str) -> Element {
    let options: Vec<OptionItem> = field
        .values
        .iter()
        .map(|(value, display)| OptionItem {
            text: Text::plain(display.text.clone()),
            value: value.clone(),
            description: display.description.clone().map(Text::plain),
        })
        .collect();
    // A stored value outside the option set renders unselected.
    let initial_option = field
        .value
        .as_ref()
        .and_then(|selected| options.iter().find(|o| &o.value == selected).cloned());
    Element::RadioButtons {
        action_id: key.to_string(),
        options,
        initial_option,
    }
}

fn extract_long(field: &LongField, widget: Option<&WidgetState>) -> Result<Option<VariableValue>, String> {
    let Some(raw) = widget.and_then(|w| w.value.as_deref()) else {
        return Ok(None);
    };
    let value: i64 = raw.parse().map_err(|_| "Invalid number".to_string())?;
    if let Some(min) = field.min {
        if value < min {
            return Err(format!("Minimum value is {min}"));
        }
    }
    if let Some(max) = field.max_inclusive() {
        if value > max {
            return Err(format!("Maximum value is {max}"));
        }
    }
    Ok(Some(VariableValue::Long(value)))
}
