//! Core data model shared by the engine, render, and dispatch layers.

mod form;

pub use form::{
    BooleanField, DateField, EnumField, EnumValue, Form, FormField, LongField, StringField,
};

use chrono::NaiveDate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Text pattern the engine uses for date-valued variables.
pub const ENGINE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Native format of the chat platform's date picker.
pub const CHAT_DATE_FORMAT: &str = "%Y-%m-%d";

/// A unit of human work emitted by the process engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    pub id: String,
    pub name: String,
    /// Optional presentation override; fall back to `name` via [`Task::display_title`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub assignee: String,
    pub process_instance_id: String,
    pub process_definition_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Message from a failed earlier attempt at this task, surfaced to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(default)]
    pub show_variables: ShowVariables,
}

impl Task {
    /// Title to show in messages and modals.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.name)
    }
}

/// Which process variables to display alongside a task.
///
/// Parsed once when the task is loaded so a malformed directive fails before
/// anything is rendered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum ShowVariables {
    /// No directive configured; show nothing.
    Hidden,
    /// Directive present without a value; show every variable.
    All,
    /// Show this subset, in the order given.
    Named(Vec<String>),
}

impl Default for ShowVariables {
    fn default() -> Self {
        Self::Hidden
    }
}

impl ShowVariables {
    /// Parse the raw directive value as configured on a task definition.
    ///
    /// `None` means the directive is absent; an empty value requests all
    /// variables; otherwise the value is a comma-separated name list.
    pub fn parse(raw: Option<&str>) -> Result<Self> {
        match raw {
            None => Ok(ShowVariables::Hidden),
            Some(value) if value.trim().is_empty() => Ok(ShowVariables::All),
            Some(value) => {
                let names: Vec<String> = value.split(',').map(|n| n.trim().to_string()).collect();
                if names.iter().any(String::is_empty) {
                    return Err(Error::ShowVariables(format!(
                        "Empty variable name in `{value}`"
                    )));
                }
                Ok(ShowVariables::Named(names))
            }
        }
    }
}

/// A startable process definition, as listed to a user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Process {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Start-event details of one process definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StartEvent {
    pub process_definition_id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Engine-declared variable to populate with the starting user's identity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initiator_variable_name: Option<String>,
}

/// Pointer to one posted chat message, kept to update it later.
///
/// Stored on the task as a JSON array under a single string-typed variable;
/// the serialized shape is shared state and must not drift.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageRef {
    pub channel: String,
    pub ts: String,
}

impl MessageRef {
    pub fn new(channel: impl Into<String>, ts: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            ts: ts.into(),
        }
    }
}

/// A typed engine variable value.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableValue {
    String(String),
    Long(i64),
    Boolean(bool),
    Date(NaiveDate),
}

impl VariableValue {
    /// Engine-facing JSON; dates use the engine's text pattern.
    pub fn to_engine_json(&self) -> serde_json::Value {
        match self {
            VariableValue::String(value) => serde_json::Value::String(value.clone()),
            VariableValue::Long(value) => serde_json::Value::from(*value),
            VariableValue::Boolean(value) => serde_json::Value::Bool(*value),
            VariableValue::Date(value) => {
                serde_json::Value::String(value.format(ENGINE_DATE_FORMAT).to_string())
            }
        }
    }
}

/// Values extracted from one submission, ready for the engine.
///
/// Every renderer's submission path produces this, and the dispatcher's
/// submit step consumes nothing else.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskResult {
    pub task_id: String,
    pub variables: IndexMap<String, VariableValue>,
}

impl TaskResult {
    pub fn new(task_id: impl Into<String>, variables: IndexMap<String, VariableValue>) -> Self {
        Self {
            task_id: task_id.into(),
            variables,
        }
    }
}

/// How the user interaction currently being handled reached us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    /// A button click in a posted message; carries the short-lived modal trigger.
    ActionClick { trigger_id: String },
    /// A submission from an already-open modal.
    ModalSubmission,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_falls_back_to_name() {
        let mut task = sample_task();
        assert_eq!(task.display_title(), "Review movie");
        task.title = Some("Weekly review".to_string());
        assert_eq!(task.display_title(), "Weekly review");
    }

    #[test]
    fn test_show_variables_parse() {
        assert_eq!(ShowVariables::parse(None).unwrap(), ShowVariables::Hidden);
        assert_eq!(ShowVariables::parse(Some("")).unwrap(), ShowVariables::All);
        assert_eq!(
            ShowVariables::parse(Some("movie, rating")).unwrap(),
            ShowVariables::Named(vec!["movie".to_string(), "rating".to_string()])
        );
        assert!(ShowVariables::parse(Some("movie,,rating")).is_err());
    }

    #[test]
    fn test_message_ref_wire_format_is_stable() {
        let refs = vec![
            MessageRef::new("C123", "1616512345.000100"),
            MessageRef::new("D456", "1616512399.000200"),
        ];
        let json = serde_json::to_string(&refs).unwrap();
        assert_eq!(
            json,
            r#"[{"channel":"C123","ts":"1616512345.000100"},{"channel":"D456","ts":"1616512399.000200"}]"#
        );
        let back: Vec<MessageRef> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, refs);
    }

    #[test]
    fn test_variable_value_engine_json() {
        assert_eq!(
            VariableValue::Long(8).to_engine_json(),
            serde_json::json!(8)
        );
        assert_eq!(
            VariableValue::Boolean(true).to_engine_json(),
            serde_json::json!(true)
        );
        let date = NaiveDate::from_ymd_opt(2010, 3, 15).unwrap();
        assert_eq!(
            VariableValue::Date(date).to_engine_json(),
            serde_json::json!("15/03/2010")
        );
    }

    fn sample_task() -> Task {
        Task {
            id: "task-1".to_string(),
            name: "Review movie".to_string(),
            title: None,
            assignee: "john@example.com".to_string(),
            process_instance_id: "pi-1".to_string(),
            process_definition_id: "movie-review:1:abc".to_string(),
            description: None,
            error_message: None,
            show_variables: ShowVariables::default(),
        }
    }
}
