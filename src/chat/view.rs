//! Modal view chrome and the state a submitted view carries back.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::blocks::{Block, Text};

/// A modal dialog, ready to open or to return as a submission reply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModalView {
    #[serde(rename = "type")]
    pub view_type: String,
    pub callback_id: String,
    pub title: Text,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submit: Option<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<Text>,
    #[serde(default)]
    pub notify_on_close: bool,
}

impl ModalView {
    /// Standard form-modal chrome around the given blocks.
    pub fn modal(
        callback_id: impl Into<String>,
        title: impl Into<String>,
        blocks: Vec<Block>,
    ) -> Self {
        Self {
            view_type: "modal".to_string(),
            callback_id: callback_id.into(),
            title: Text::plain(title),
            blocks,
            submit: Some(Text::plain("Submit")),
            close: Some(Text::plain("Cancel")),
            notify_on_close: false,
        }
    }
}

/// Entered values of one submitted view, keyed by suffixed block id.
///
/// Input blocks use the same suffixed field id for `block_id` and element
/// `action_id`, so one flat map addresses every widget in the view.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ViewState {
    #[serde(default)]
    pub values: IndexMap<String, WidgetState>,
}

impl ViewState {
    pub fn get(&self, key: &str) -> Option<&WidgetState> {
        self.values.get(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, state: WidgetState) {
        self.values.insert(key.into(), state);
    }
}

/// What one widget carried at submission time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WidgetState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_option: Option<SelectedOption>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_date: Option<String>,
}

impl WidgetState {
    /// State of a text input holding `value`.
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// State of a radio group with the option `value` selected.
    pub fn option(value: impl Into<String>) -> Self {
        Self {
            selected_option: Some(SelectedOption {
                value: value.into(),
            }),
            ..Self::default()
        }
    }

    /// State of a date picker with a chosen date.
    pub fn date(value: impl Into<String>) -> Self {
        Self {
            selected_date: Some(value.into()),
            ..Self::default()
        }
    }
}

/// Chosen option of a select-like widget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectedOption {
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_chrome_defaults() {
        let view = ModalView::modal("modal-task-submit/t1", "Review movie", vec![]);
        assert_eq!(view.view_type, "modal");
        assert_eq!(view.callback_id, "modal-task-submit/t1");
        assert_eq!(view.title, Text::plain("Review movie"));
        assert_eq!(view.submit, Some(Text::plain("Submit")));
        assert_eq!(view.close, Some(Text::plain("Cancel")));
        assert!(!view.notify_on_close);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["type"], "modal");
    }

    #[test]
    fn test_view_state_lookup() {
        let mut state = ViewState::default();
        state.insert("rating_long", WidgetState::text("8"));
        state.insert("approved_boolean", WidgetState::option("true"));
        assert_eq!(
            state.get("rating_long").and_then(|w| w.value.as_deref()),
            Some("8")
        );
        assert_eq!(
            state
                .get("approved_boolean")
                .and_then(|w| w.selected_option.as_ref())
                .map(|o| o.value.as_str()),
            Some("true")
        );
        assert!(state.get("missing").is_none());
    }
}
