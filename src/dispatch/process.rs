//! Starting processes from chat: the start-button flow, start-form modals,
//! and the startable-process overview blocks.

use std::sync::Arc;

use indexmap::IndexMap;
use regex::Regex;
use serde_json::Value;

use super::TaskDispatcher;
use crate::chat::blocks::{Block, Element, Text};
use crate::chat::{
    with_timeout, ActionInvocation, InteractionReply, SharedChatClient, ViewSubmission,
};
use crate::config::DispatcherConfig;
use crate::engine::{SharedFormService, SharedProcessService, SharedTaskService};
use crate::error::{Error, Result};
use crate::identity::SharedUserResolver;
use crate::model::{InteractionKind, StartEvent};
use crate::render::fields;
use crate::render::modal::ModalRenderer;

/// Handles the start-process surface: listing startable processes, opening
/// start forms, and launching instances.
pub struct ProcessDispatcher {
    process_service: SharedProcessService,
    form_service: SharedFormService,
    chat: SharedChatClient,
    resolver: SharedUserResolver,
    modal: ModalRenderer,
    tasks: Arc<TaskDispatcher>,
    config: DispatcherConfig,
    start_pattern: Regex,
    submit_pattern: Regex,
}

impl ProcessDispatcher {
    pub fn new(
        process_service: SharedProcessService,
        task_service: SharedTaskService,
        form_service: SharedFormService,
        chat: SharedChatClient,
        resolver: SharedUserResolver,
        tasks: Arc<TaskDispatcher>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            process_service,
            form_service,
            chat,
            resolver,
            modal: ModalRenderer::new(task_service),
            tasks,
            config,
            start_pattern: Regex::new(r"^process-start/(.+)$").unwrap(),
            submit_pattern: Regex::new(r"^process-submit/(.+)$").unwrap(),
        }
    }

    /// Overview blocks listing every process the user may start.
    pub async fn process_list_blocks(&self, chat_user_id: &str) -> Result<Vec<Block>> {
        let engine_user_id = self.resolver.engine_user_id(chat_user_id).await?;
        let processes = self
            .process_service
            .startable_processes(&engine_user_id)
            .await?;

        let mut blocks = vec![
            Block::section(Text::mrkdwn("*Processes you can start*")),
            Block::divider(),
        ];
        for process in &processes {
            blocks.push(Block::section(Text::mrkdwn(format!("*{}*", process.name))));
            blocks.push(Block::actions(
                format!("process/{}", process.id),
                vec![Element::button(
                    format!("process-start/{}", process.id),
                    Text::plain("Start"),
                )],
            ));
            blocks.push(Block::divider());
        }
        Ok(blocks)
    }

    /// A Start button click: open the start form if the definition has one,
    /// otherwise launch the instance right away.
    pub async fn handle_action(&self, invocation: &ActionInvocation) -> Result<InteractionReply> {
        let captures = self
            .start_pattern
            .captures(&invocation.action_id)
            .ok_or_else(|| Error::unrouted("action", invocation.action_id.clone()))?;
        let process_definition_id = captures[1].to_string();

        let start_event = self.process_service.start_event(&process_definition_id).await?;
        match self.form_service.start_form(&process_definition_id).await? {
            Some(form) => {
                let view = self.modal.build_start_modal(
                    &start_event,
                    &form,
                    submit_callback_id(&process_definition_id),
                );
                let trigger_id = invocation
                    .trigger_id
                    .as_deref()
                    .ok_or(Error::MissingPayloadPart("trigger id"))?;
                with_timeout(
                    self.config.request_timeout,
                    "views.open",
                    self.chat.open_modal(trigger_id, &view),
                )
                .await?;
                Ok(InteractionReply::Ack)
            }
            None => {
                let engine_user_id = self.resolver.engine_user_id(&invocation.user_id).await?;
                let trigger_id = invocation
                    .trigger_id
                    .clone()
                    .ok_or(Error::MissingPayloadPart("trigger id"))?;
                self.start_process(
                    &start_event,
                    IndexMap::new(),
                    &engine_user_id,
                    InteractionKind::ActionClick { trigger_id },
                )
                .await
            }
        }
    }

    /// A submitted start form: validate, launch, and chain into the first
    /// follow-up task.
    pub async fn handle_view_submission(
        &self,
        submission: &ViewSubmission,
    ) -> Result<InteractionReply> {
        let captures = self
            .submit_pattern
            .captures(&submission.callback_id)
            .ok_or_else(|| Error::unrouted("callback", submission.callback_id.clone()))?;
        let process_definition_id = captures[1].to_string();

        let form = self
            .form_service
            .start_form(&process_definition_id)
            .await?
            .ok_or_else(|| Error::MissingStartForm(process_definition_id.clone()))?;
        match fields::extract_all(&form, &submission.state) {
            Err(errors) => Ok(InteractionReply::Errors(errors)),
            Ok(values) => {
                let start_event = self.process_service.start_event(&process_definition_id).await?;
                let engine_user_id = self.resolver.engine_user_id(&submission.user_id).await?;
                let variables = values
                    .into_iter()
                    .map(|(name, value)| (name, value.to_engine_json()))
                    .collect();
                self.start_process(
                    &start_event,
                    variables,
                    &engine_user_id,
                    InteractionKind::ModalSubmission,
                )
                .await
            }
        }
    }

    /// Launches the instance with the initiator variable folded in. The
    /// initiator value wins over a form field of the same name.
    async fn start_process(
        &self,
        start_event: &StartEvent,
        form_variables: IndexMap<String, Value>,
        engine_user_id: &str,
        kind: InteractionKind,
    ) -> Result<InteractionReply> {
        let had_form_variables = !form_variables.is_empty();
        let mut variables = form_variables;
        if let Some(name) = &start_event.initiator_variable_name {
            variables.insert(name.clone(), Value::from(engine_user_id));
        }

        tracing::info!(
            process_definition_id = %start_event.process_definition_id,
            "Starting process with variables {:?}", variables
        );
        let process_instance_id = if had_form_variables {
            self.process_service
                .start_process_with_form(&start_event.process_definition_id, variables)
                .await?
        } else {
            self.process_service
                .start_process(&start_event.process_definition_id, variables)
                .await?
        };

        self.tasks
            .show_follow_up_task(kind, &process_instance_id, engine_user_id)
            .await
    }
}

fn submit_callback_id(process_definition_id: &str) -> String {
    format!("process-submit/{process_definition_id}")
}
