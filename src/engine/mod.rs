//! Process-engine service traits.
//!
//! The dispatchers only ever talk to the engine through these traits, so a
//! deployment can plug in a REST client, an embedded engine, or a test double
//! without touching the chat side.

pub mod schema;

use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::Result;
use crate::model::{Form, Process, StartEvent, Task, TaskResult};

/// Task queries and variable access.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn task_by_id(&self, task_id: &str) -> Result<Task>;

    /// The next task in the given process instance already assigned to the
    /// same user, if the engine produced one synchronously.
    async fn follow_up_task(
        &self,
        process_instance_id: &str,
        assignee: &str,
    ) -> Result<Option<Task>>;

    /// All variables visible on the task, in engine order.
    async fn variables(&self, task_id: &str) -> Result<IndexMap<String, Value>>;

    /// The named subset of the task's variables; missing names are skipped.
    async fn variables_by_name(
        &self,
        task_id: &str,
        names: &[String],
    ) -> Result<IndexMap<String, Value>>;

    async fn variable(&self, task_id: &str, name: &str) -> Result<Option<Value>> {
        let mut values = self
            .variables_by_name(task_id, &[name.to_string()])
            .await?;
        Ok(values.swap_remove(name))
    }

    async fn set_variable(&self, task_id: &str, name: &str, value: Value) -> Result<()> {
        let mut variables = IndexMap::new();
        variables.insert(name.to_string(), value);
        self.set_variables(task_id, variables).await
    }

    async fn set_variables(&self, task_id: &str, variables: IndexMap<String, Value>)
        -> Result<()>;
}

/// Form lookup and submission.
#[async_trait]
pub trait FormService: Send + Sync {
    /// The task's form, or `None` when the task has no form attached.
    async fn task_form(&self, task_id: &str) -> Result<Option<Form>>;

    /// The start form of a process definition, or `None` when starting
    /// requires no input.
    async fn start_form(&self, process_definition_id: &str) -> Result<Option<Form>>;

    async fn submit_task_form(&self, result: &TaskResult) -> Result<()>;

    /// Start a process by submitting its start form; returns the new process
    /// instance id.
    async fn submit_start_form(
        &self,
        process_definition_id: &str,
        variables: IndexMap<String, Value>,
    ) -> Result<String>;
}

/// Process-definition listing and starting.
#[async_trait]
pub trait ProcessService: Send + Sync {
    /// Definitions the given engine user may start.
    async fn startable_processes(&self, engine_user_id: &str) -> Result<Vec<Process>>;

    async fn start_event(&self, process_definition_id: &str) -> Result<StartEvent>;

    /// Start without a form; returns the new process instance id.
    async fn start_process(
        &self,
        process_definition_id: &str,
        variables: IndexMap<String, Value>,
    ) -> Result<String>;

    /// Start through the definition's start form; returns the new process
    /// instance id.
    async fn start_process_with_form(
        &self,
        process_definition_id: &str,
        variables: IndexMap<String, Value>,
    ) -> Result<String>;
}

pub type SharedTaskService = Arc<dyn TaskService>;
pub type SharedFormService = Arc<dyn FormService>;
pub type SharedProcessService = Arc<dyn ProcessService>;
