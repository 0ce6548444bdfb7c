//! Task lifecycle fan-out: assignment notifications, interaction routing,
//! submissions, and completion updates.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde_json::Value;

use crate::chat::blocks::{Block, Text};
use crate::chat::{
    with_timeout, ActionInvocation, InteractionReply, MessagePayload, SharedChatClient,
    ViewSubmission,
};
use crate::config::DispatcherConfig;
use crate::engine::{SharedFormService, SharedTaskService};
use crate::error::{Error, Result};
use crate::identity::SharedUserResolver;
use crate::model::{Form, InteractionKind, MessageRef, Task, TaskResult};
use crate::render::compact::CompactTaskRenderer;
use crate::render::components;
use crate::render::modal::ModalTaskRenderer;
use crate::render::{ActionOutcome, SubmissionOutcome, TaskRenderer};

pub mod process;

/// Routes task events to renderers and renderer outcomes back to the engine.
///
/// State is immutable after construction; every inbound callback is handled
/// as one independent invocation.
pub struct TaskDispatcher {
    task_service: SharedTaskService,
    form_service: SharedFormService,
    chat: SharedChatClient,
    resolver: SharedUserResolver,
    renderers: Vec<Arc<dyn TaskRenderer>>,
    fallback: Arc<ModalTaskRenderer>,
    config: DispatcherConfig,
}

impl TaskDispatcher {
    /// Wires the renderer chain: compact first, the modal renderer as the
    /// fallback that accepts any form.
    pub fn new(
        task_service: SharedTaskService,
        form_service: SharedFormService,
        chat: SharedChatClient,
        resolver: SharedUserResolver,
        config: DispatcherConfig,
    ) -> Self {
        let renderers: Vec<Arc<dyn TaskRenderer>> =
            vec![Arc::new(CompactTaskRenderer::new(task_service.clone()))];
        let fallback = Arc::new(ModalTaskRenderer::new(
            task_service.clone(),
            form_service.clone(),
            chat.clone(),
            config.request_timeout,
        ));
        for renderer in renderers
            .iter()
            .map(|renderer| renderer.as_ref())
            .chain([fallback.as_ref() as &dyn TaskRenderer])
        {
            tracing::info!(renderer = renderer.name(), "Registered task renderer");
        }
        Self {
            task_service,
            form_service,
            chat,
            resolver,
            renderers,
            fallback,
            config,
        }
    }

    fn all_renderers(&self) -> impl Iterator<Item = &dyn TaskRenderer> + '_ {
        self.renderers
            .iter()
            .map(|renderer| renderer.as_ref())
            .chain([self.fallback.as_ref() as &dyn TaskRenderer])
    }

    /// First renderer that accepts the form; the modal fallback makes the
    /// selection total.
    fn select_renderer(&self, form: &Form) -> &dyn TaskRenderer {
        self.renderers
            .iter()
            .find(|renderer| renderer.can_render(form))
            .map(|renderer| renderer.as_ref())
            .unwrap_or(self.fallback.as_ref() as &dyn TaskRenderer)
    }

    async fn task_form(&self, task_id: &str) -> Result<Form> {
        self.form_service
            .task_form(task_id)
            .await?
            .ok_or_else(|| Error::MissingTaskForm(task_id.to_string()))
    }

    /// Announces a newly assigned task to its assignee and records where the
    /// announcements landed.
    ///
    /// Posting is best effort per destination. The surviving message refs are
    /// written to the engine only after every post has returned, so a fast
    /// reply can race the stored refs.
    pub async fn notify_task_assignment(&self, task: &Task) -> Result<()> {
        let form = self.task_form(&task.id).await?;
        let renderer = self.select_renderer(&form);
        let payload = renderer.initial_message(task, &form).await?;

        let destinations = match self.resolver.chat_user_id(&task.assignee).await {
            Ok(user_id) => vec![user_id],
            Err(e) => {
                tracing::warn!(
                    assignee = %task.assignee,
                    "Skipping notification, assignee cannot be resolved: {}", e
                );
                return Ok(());
            }
        };
        if destinations.is_empty() {
            tracing::debug!(assignee = %task.assignee, "No chat destinations for assignee");
            return Ok(());
        }

        self.post_and_store_refs(task, &payload, &destinations).await
    }

    /// Posts the payload to every destination concurrently and stores the
    /// refs of the posts that went through. Errors only when none did.
    async fn post_and_store_refs(
        &self,
        task: &Task,
        payload: &MessagePayload,
        destinations: &[String],
    ) -> Result<()> {
        let posts = destinations.iter().map(|destination| {
            with_timeout(
                self.config.request_timeout,
                "chat.postMessage",
                self.chat.post_message(destination, payload),
            )
        });
        let mut refs = Vec::new();
        for (destination, result) in destinations.iter().zip(join_all(posts).await) {
            match result {
                Ok(posted) => refs.push(MessageRef::new(posted.channel, posted.ts)),
                Err(e) => tracing::warn!(
                    destination = %destination,
                    task_id = %task.id,
                    "Dropping failed notification post: {}", e
                ),
            }
        }
        if refs.is_empty() {
            return Err(Error::chat_api(
                "chat.postMessage",
                format!("no notification for task {} could be delivered", task.id),
            ));
        }

        let serialized = serde_json::to_string(&refs)?;
        tracing::debug!(task_id = %task.id, refs = %serialized, "Storing message refs");
        self.task_service
            .set_variable(
                &task.id,
                &self.config.message_refs_variable,
                Value::from(serialized),
            )
            .await
    }

    /// Replaces every announcement of a completed task with a summary line.
    ///
    /// Runs after the engine transition, so nothing here fails the
    /// completion; unusable refs are logged and skipped.
    pub async fn notify_task_completion(&self, task: &Task) -> Result<()> {
        let stored = self
            .task_service
            .variable(&task.id, &self.config.message_refs_variable)
            .await?;
        let Some(value) = stored else {
            tracing::debug!(task_id = %task.id, "No message refs stored, nothing to update");
            return Ok(());
        };
        let Some(json) = value.as_str() else {
            tracing::warn!(task_id = %task.id, "Message refs variable is not a string");
            return Ok(());
        };
        let refs: Vec<MessageRef> = match serde_json::from_str(json) {
            Ok(refs) => refs,
            Err(e) => {
                tracing::warn!(task_id = %task.id, "Unreadable message refs: {}", e);
                return Ok(());
            }
        };

        let actor = match self.resolver.chat_user_id(&task.assignee).await {
            Ok(user_id) => format!("<@{user_id}>"),
            Err(e) => {
                tracing::warn!(
                    assignee = %task.assignee,
                    "Cannot resolve completing user, using the engine id: {}", e
                );
                task.assignee.clone()
            }
        };
        let summary = components::completion_summary(&task.name, &actor, Utc::now());
        let payload = MessagePayload::new(
            summary.clone(),
            vec![Block::context(vec![Text::mrkdwn(summary)])],
        );

        let updates = refs.iter().map(|message_ref| {
            with_timeout(
                self.config.request_timeout,
                "chat.update",
                self.chat.update_message(message_ref, &payload),
            )
        });
        for (message_ref, result) in refs.iter().zip(join_all(updates).await) {
            if let Err(e) = result {
                tracing::warn!(
                    channel = %message_ref.channel,
                    ts = %message_ref.ts,
                    "Failed to update completed task message: {}", e
                );
            }
        }
        Ok(())
    }

    /// Routes a button click to the renderer owning its action id.
    pub async fn handle_action(&self, invocation: &ActionInvocation) -> Result<InteractionReply> {
        let renderer = self
            .all_renderers()
            .find(|renderer| renderer.action_pattern().is_match(&invocation.action_id))
            .ok_or_else(|| Error::unrouted("action", invocation.action_id.clone()))?;
        match renderer.on_action(invocation).await? {
            ActionOutcome::Handled => Ok(InteractionReply::Ack),
            ActionOutcome::Submit(result) => {
                let trigger_id = invocation
                    .trigger_id
                    .clone()
                    .ok_or(Error::MissingPayloadPart("trigger id"))?;
                self.submit_and_show_next(result, InteractionKind::ActionClick { trigger_id })
                    .await
            }
        }
    }

    /// Routes a modal submission to the renderer owning its callback id.
    pub async fn handle_view_submission(
        &self,
        submission: &ViewSubmission,
    ) -> Result<InteractionReply> {
        let renderer = self
            .all_renderers()
            .find(|renderer| {
                renderer
                    .callback_pattern()
                    .is_some_and(|pattern| pattern.is_match(&submission.callback_id))
            })
            .ok_or_else(|| Error::unrouted("callback", submission.callback_id.clone()))?;
        match renderer.on_view_submission(submission).await? {
            SubmissionOutcome::Errors(errors) => Ok(InteractionReply::Errors(errors)),
            SubmissionOutcome::Submit(result) => {
                self.submit_and_show_next(result, InteractionKind::ModalSubmission)
                    .await
            }
        }
    }

    /// Submits extracted variables, then chains straight into the assignee's
    /// next task if there is one.
    ///
    /// The task is loaded before submission while the engine still knows it.
    async fn submit_and_show_next(
        &self,
        result: TaskResult,
        kind: InteractionKind,
    ) -> Result<InteractionReply> {
        let task = self.task_service.task_by_id(&result.task_id).await?;
        self.form_service.submit_task_form(&result).await?;
        self.show_follow_up_task(kind, &task.process_instance_id, &task.assignee)
            .await
    }

    /// Presents the assignee's next task in the same process instance, in a
    /// modal opened or updated depending on where the interaction came from.
    pub async fn show_follow_up_task(
        &self,
        kind: InteractionKind,
        process_instance_id: &str,
        assignee: &str,
    ) -> Result<InteractionReply> {
        let Some(next) = self
            .task_service
            .follow_up_task(process_instance_id, assignee)
            .await?
        else {
            return Ok(InteractionReply::Ack);
        };
        let form = self.task_form(&next.id).await?;
        let view = self.fallback.build_modal(&next, &form).await?;
        match kind {
            InteractionKind::ActionClick { trigger_id } => {
                with_timeout(
                    self.config.request_timeout,
                    "views.open",
                    self.chat.open_modal(&trigger_id, &view),
                )
                .await?;
                Ok(InteractionReply::Ack)
            }
            InteractionKind::ModalSubmission => Ok(InteractionReply::UpdateModal(view)),
        }
    }
}
