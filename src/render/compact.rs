//! Single-message renderer for trivial confirm-style tasks.

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;

use super::components;
use super::{ActionOutcome, TaskRenderer};
use crate::chat::blocks::{Block, Element, Text};
use crate::chat::{ActionInvocation, MessagePayload};
use crate::engine::SharedTaskService;
use crate::error::{Error, Result};
use crate::model::{BooleanField, Form, FormField, Task, TaskResult, VariableValue};

/// Renders a one-required-boolean form as two buttons right in the message,
/// so the assignee finishes the task with a single click.
pub struct CompactTaskRenderer {
    task_service: SharedTaskService,
    action_pattern: Regex,
}

impl CompactTaskRenderer {
    pub fn new(task_service: SharedTaskService) -> Self {
        Self {
            task_service,
            action_pattern: Regex::new(r"^inline-task/([a-z0-9\-]+)/[0-9]+$").unwrap(),
        }
    }

    fn single_boolean_field<'a>(&self, task: &Task, form: &'a Form) -> Result<&'a BooleanField> {
        match form.fields.as_slice() {
            [FormField::Boolean(field)] if field.required => Ok(field),
            _ => Err(Error::RendererMismatch {
                renderer: self.name(),
                task_id: task.id.clone(),
            }),
        }
    }

    fn field_header(&self, field: &BooleanField) -> Block {
        let text = match &field.hint {
            Some(hint) => format!("*{}*\n_{hint}_", field.label),
            None => format!("*{}*", field.label),
        };
        Block::section(Text::mrkdwn(text))
    }

    fn buttons(&self, task: &Task, field: &BooleanField) -> Block {
        let true_text = Text::plain(field.true_label.clone().unwrap_or_else(|| "Yes".to_string()));
        let false_text = Text::plain(field.false_label.clone().unwrap_or_else(|| "No".to_string()));
        Block::actions(
            field.id.clone(),
            vec![
                Element::button_with_value(action_id(&task.id, 1), true_text, "true"),
                Element::button_with_value(action_id(&task.id, 2), false_text, "false"),
            ],
        )
    }
}

fn action_id(task_id: &str, index: u8) -> String {
    format!("inline-task/{task_id}/{index}")
}

#[async_trait]
impl TaskRenderer for CompactTaskRenderer {
    fn name(&self) -> &'static str {
        "compact"
    }

    fn can_render(&self, form: &Form) -> bool {
        matches!(form.fields.as_slice(), [FormField::Boolean(field)] if field.required)
    }

    async fn initial_message(&self, task: &Task, form: &Form) -> Result<MessagePayload> {
        let field = self.single_boolean_field(task, form)?;

        let mut blocks = vec![
            Block::section(Text::mrkdwn(format!(
                "You have a new task: *{}*",
                task.display_title()
            ))),
            Block::divider(),
        ];
        if let Some(description) = components::description_block(task) {
            blocks.push(description);
        }
        blocks.extend(components::variables_blocks(self.task_service.as_ref(), task).await?);
        blocks.push(self.field_header(field));
        blocks.push(self.buttons(task, field));

        Ok(MessagePayload::new(format!("Task: {}", task.name), blocks))
    }

    fn action_pattern(&self) -> &Regex {
        &self.action_pattern
    }

    async fn on_action(&self, invocation: &ActionInvocation) -> Result<ActionOutcome> {
        let captures = self
            .action_pattern
            .captures(&invocation.action_id)
            .ok_or_else(|| Error::unrouted("action", invocation.action_id.clone()))?;
        let task_id = captures[1].to_string();

        let value = match invocation.value.as_deref() {
            Some("true") => true,
            Some("false") => false,
            Some(other) => {
                return Err(Error::InvalidPayloadPart {
                    part: "button value",
                    value: other.to_string(),
                })
            }
            None => return Err(Error::MissingPayloadPart("button value")),
        };

        tracing::debug!(task_id = %task_id, value = value, "Button click completes task");
        let mut variables = IndexMap::new();
        variables.insert(invocation.block_id.clone(), VariableValue::Boolean(value));
        Ok(ActionOutcome::Submit(TaskResult::new(task_id, variables)))
    }
}
