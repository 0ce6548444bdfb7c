//! Layout blocks, elements, and text objects, serialized to the chat
//! platform's block JSON.

use serde::{Deserialize, Serialize};

/// A text object, plain or markdown-formatted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Text {
    PlainText { text: String },
    Mrkdwn { text: String },
}

impl Text {
    pub fn plain(text: impl Into<String>) -> Self {
        Text::PlainText { text: text.into() }
    }

    pub fn mrkdwn(text: impl Into<String>) -> Self {
        Text::Mrkdwn { text: text.into() }
    }
}

/// A message or modal layout block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<Text>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<Text>>,
    },
    Divider,
    Context {
        elements: Vec<Text>,
    },
    Actions {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        block_id: Option<String>,
        elements: Vec<Element>,
    },
    Input {
        block_id: String,
        label: Text,
        element: Element,
        #[serde(default)]
        optional: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        hint: Option<Text>,
    },
}

impl Block {
    /// Section holding a single text object.
    pub fn section(text: Text) -> Self {
        Block::Section {
            block_id: None,
            text: Some(text),
            fields: None,
        }
    }

    /// Section presenting side-by-side field texts instead of one body.
    pub fn section_fields(fields: Vec<Text>) -> Self {
        Block::Section {
            block_id: None,
            text: None,
            fields: Some(fields),
        }
    }

    pub fn divider() -> Self {
        Block::Divider
    }

    pub fn context(elements: Vec<Text>) -> Self {
        Block::Context { elements }
    }

    pub fn actions(block_id: impl Into<String>, elements: Vec<Element>) -> Self {
        Block::Actions {
            block_id: Some(block_id.into()),
            elements,
        }
    }
}

/// An interactive element inside an actions or input block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Element {
    Button {
        action_id: String,
        text: Text,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    PlainTextInput {
        action_id: String,
        #[serde(default)]
        multiline: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_length: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max_length: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Text>,
    },
    RadioButtons {
        action_id: String,
        options: Vec<OptionItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_option: Option<OptionItem>,
    },
    Datepicker {
        action_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        initial_date: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        placeholder: Option<Text>,
    },
}

impl Element {
    pub fn button(action_id: impl Into<String>, text: Text) -> Self {
        Element::Button {
            action_id: action_id.into(),
            text,
            value: None,
        }
    }

    pub fn button_with_value(
        action_id: impl Into<String>,
        text: Text,
        value: impl Into<String>,
    ) -> Self {
        Element::Button {
            action_id: action_id.into(),
            text,
            value: Some(value.into()),
        }
    }
}

/// One selectable option of a radio-button group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptionItem {
    pub text: Text,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Text>,
}

impl OptionItem {
    pub fn new(text: Text, value: impl Into<String>) -> Self {
        Self {
            text,
            value: value.into(),
            description: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_wire_shapes() {
        assert_eq!(
            serde_json::to_value(Text::plain("Yes")).unwrap(),
            json!({"type": "plain_text", "text": "Yes"})
        );
        assert_eq!(
            serde_json::to_value(Text::mrkdwn("*bold*")).unwrap(),
            json!({"type": "mrkdwn", "text": "*bold*"})
        );
    }

    #[test]
    fn test_divider_serializes_to_type_only() {
        assert_eq!(
            serde_json::to_value(Block::divider()).unwrap(),
            json!({"type": "divider"})
        );
    }

    #[test]
    fn test_actions_block_wire_shape() {
        let block = Block::actions(
            "approved",
            vec![Element::button_with_value("inline-task/t1/1", Text::plain("Yes"), "true")],
        );
        assert_eq!(
            serde_json::to_value(block).unwrap(),
            json!({
                "type": "actions",
                "block_id": "approved",
                "elements": [{
                    "type": "button",
                    "action_id": "inline-task/t1/1",
                    "text": {"type": "plain_text", "text": "Yes"},
                    "value": "true"
                }]
            })
        );
    }

    #[test]
    fn test_input_block_wire_shape() {
        let block = Block::Input {
            block_id: "review_text".to_string(),
            label: Text::plain("Review"),
            element: Element::PlainTextInput {
                action_id: "review_text".to_string(),
                multiline: true,
                initial_value: None,
                min_length: None,
                max_length: Some(200),
                placeholder: None,
            },
            optional: false,
            hint: None,
        };
        assert_eq!(
            serde_json::to_value(block).unwrap(),
            json!({
                "type": "input",
                "block_id": "review_text",
                "label": {"type": "plain_text", "text": "Review"},
                "element": {
                    "type": "plain_text_input",
                    "action_id": "review_text",
                    "multiline": true,
                    "max_length": 200
                },
                "optional": false
            })
        );
    }

    #[test]
    fn test_radio_buttons_round_trip() {
        let element = Element::RadioButtons {
            action_id: "genre_enum".to_string(),
            options: vec![
                OptionItem::new(Text::plain("Drama"), "drama"),
                OptionItem {
                    description: Some(Text::plain("Not serious")),
                    ..OptionItem::new(Text::plain("Comedy"), "comedy")
                },
            ],
            initial_option: Some(OptionItem::new(Text::plain("Drama"), "drama")),
        };
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["type"], "radio_buttons");
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }
}
