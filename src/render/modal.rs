//! Modal dialog rendering: the shared view builder and the task renderer
//! that is always capable of representing a form.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;

use super::{components, fields, ActionOutcome, SubmissionOutcome, TaskRenderer};
use crate::chat::blocks::{Block, Element, Text};
use crate::chat::view::ModalView;
use crate::chat::{with_timeout, ActionInvocation, MessagePayload, SharedChatClient, ViewSubmission};
use crate::engine::{SharedFormService, SharedTaskService};
use crate::error::{Error, Result};
use crate::model::{Form, StartEvent, Task, TaskResult};

/// Builds modal views for tasks and for process start events.
pub struct ModalRenderer {
    task_service: SharedTaskService,
}

impl ModalRenderer {
    pub fn new(task_service: SharedTaskService) -> Self {
        Self { task_service }
    }

    /// Modal presenting a task's form, block order: error, description,
    /// variables, then one input per field.
    pub async fn build_task_modal(
        &self,
        task: &Task,
        form: &Form,
        callback_id: impl Into<String>,
    ) -> Result<ModalView> {
        let mut blocks = Vec::new();
        if let Some(error) = components::error_block(task) {
            blocks.push(error);
        }
        if let Some(description) = components::description_block(task) {
            blocks.push(description);
        }
        blocks.extend(components::variables_blocks(self.task_service.as_ref(), task).await?);
        blocks.extend(form.fields.iter().map(fields::render));
        Ok(ModalView::modal(
            callback_id,
            task.display_title(),
            blocks,
        ))
    }

    /// Modal presenting a process definition's start form.
    pub fn build_start_modal(
        &self,
        start_event: &StartEvent,
        form: &Form,
        callback_id: impl Into<String>,
    ) -> ModalView {
        let mut blocks = Vec::new();
        if let Some(description) = start_event.description.as_deref() {
            blocks.push(Block::section(Text::mrkdwn(description)));
        }
        blocks.extend(form.fields.iter().map(fields::render));
        ModalView::modal(callback_id, start_event.title.clone(), blocks)
    }
}

/// Announces a task with an Open button and carries its form in a modal.
pub struct ModalTaskRenderer {
    modal: ModalRenderer,
    task_service: SharedTaskService,
    form_service: SharedFormService,
    chat: SharedChatClient,
    request_timeout: Duration,
    open_pattern: Regex,
    submit_pattern: Regex,
}

impl ModalTaskRenderer {
    pub fn new(
        task_service: SharedTaskService,
        form_service: SharedFormService,
        chat: SharedChatClient,
        request_timeout: Duration,
    ) -> Self {
        Self {
            modal: ModalRenderer::new(task_service.clone()),
            task_service,
            form_service,
            chat,
            request_timeout,
            open_pattern: Regex::new(r"^modal-task-open/([a-z0-9\-]+)$").unwrap(),
            submit_pattern: Regex::new(r"^modal-task-submit/([a-z0-9\-]+)$").unwrap(),
        }
    }

    /// The modal carrying a task's form, also used to chain follow-up tasks.
    pub async fn build_modal(&self, task: &Task, form: &Form) -> Result<ModalView> {
        self.modal
            .build_task_modal(task, form, submit_callback_id(&task.id))
            .await
    }

    async fn task_form(&self, task_id: &str) -> Result<Form> {
        self.form_service
            .task_form(task_id)
            .await?
            .ok_or_else(|| Error::MissingTaskForm(task_id.to_string()))
    }
}

fn open_action_id(task_id: &str) -> String {
    format!("modal-task-open/{task_id}")
}

fn submit_callback_id(task_id: &str) -> String {
    format!("modal-task-submit/{task_id}")
}

#[async_trait]
impl TaskRenderer for ModalTaskRenderer {
    fn name(&self) -> &'static str {
        "modal"
    }

    /// The modal form can hold any combination of fields.
    fn can_render(&self, _form: &Form) -> bool {
        true
    }

    async fn initial_message(&self, task: &Task, _form: &Form) -> Result<MessagePayload> {
        let blocks = vec![
            Block::section(Text::mrkdwn(format!(
                "You have a new task:\n*{}*",
                task.display_title()
            ))),
            Block::actions(
                "accept",
                vec![Element::button(open_action_id(&task.id), Text::plain("Open"))],
            ),
        ];
        Ok(MessagePayload::new(format!("Task: {}", task.name), blocks))
    }

    fn action_pattern(&self) -> &Regex {
        &self.open_pattern
    }

    fn callback_pattern(&self) -> Option<&Regex> {
        Some(&self.submit_pattern)
    }

    async fn on_action(&self, invocation: &ActionInvocation) -> Result<ActionOutcome> {
        let captures = self
            .open_pattern
            .captures(&invocation.action_id)
            .ok_or_else(|| Error::unrouted("action", invocation.action_id.clone()))?;
        let task_id = &captures[1];

        let task = self.task_service.task_by_id(task_id).await?;
        let form = self.task_form(&task.id).await?;
        let view = self.build_modal(&task, &form).await?;

        let trigger_id = invocation
            .trigger_id
            .as_deref()
            .ok_or(Error::MissingPayloadPart("trigger id"))?;
        with_timeout(
            self.request_timeout,
            "views.open",
            self.chat.open_modal(trigger_id, &view),
        )
        .await?;
        tracing::debug!(task_id = %task.id, "Opened task modal");
        Ok(ActionOutcome::Handled)
    }

    async fn on_view_submission(&self, submission: &ViewSubmission) -> Result<SubmissionOutcome> {
        let captures = self
            .submit_pattern
            .captures(&submission.callback_id)
            .ok_or_else(|| Error::unrouted("callback", submission.callback_id.clone()))?;
        let task_id = captures[1].to_string();

        // The form is re-fetched so extraction always follows the current
        // definition, not the one the modal was built from.
        let form = self.task_form(&task_id).await?;
        match fields::extract_all(&form, &submission.state) {
            Err(errors) => Ok(SubmissionOutcome::Errors(errors)),
            Ok(variables) => {
                tracing::debug!(task_id = %task_id, "Submitting task form");
                Ok(SubmissionOutcome::Submit(TaskResult::new(
                    task_id, variables,
                )))
            }
        }
    }
}
