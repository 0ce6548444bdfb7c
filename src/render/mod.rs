//! Task renderers: how a task appears in chat and how its interactions come back.

pub mod compact;
pub mod components;
pub mod fields;
pub mod modal;

use async_trait::async_trait;
use indexmap::IndexMap;
use regex::Regex;

use crate::chat::{ActionInvocation, MessagePayload, ViewSubmission};
use crate::error::{Error, Result};
use crate::model::{Form, Task, TaskResult};

/// What handling a button click amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    /// The click itself completes the task with these values.
    Submit(TaskResult),
    /// The renderer handled the click some other way, e.g. by opening a modal.
    Handled,
}

/// What handling a modal submission amounted to.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    Submit(TaskResult),
    /// Keep the modal open, marking these inputs (keyed by suffixed block id).
    Errors(IndexMap<String, String>),
}

/// One way of representing a task in chat.
///
/// Renderers mint their own action and callback ids and parse them back, so
/// a dispatcher can route any inbound interaction purely by pattern match.
#[async_trait]
pub trait TaskRenderer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether this renderer can represent a task with the given form.
    fn can_render(&self, form: &Form) -> bool;

    /// The message announcing the task to its assignee.
    async fn initial_message(&self, task: &Task, form: &Form) -> Result<MessagePayload>;

    /// Matches the action ids this renderer minted into its messages.
    fn action_pattern(&self) -> &Regex;

    /// Matches the callback ids of modals this renderer opens, if any.
    fn callback_pattern(&self) -> Option<&Regex> {
        None
    }

    async fn on_action(&self, invocation: &ActionInvocation) -> Result<ActionOutcome>;

    async fn on_view_submission(&self, submission: &ViewSubmission) -> Result<SubmissionOutcome> {
        Err(Error::unrouted("callback", submission.callback_id.clone()))
    }
}
