//! Message blocks shared by every task renderer.

use chrono::{DateTime, SecondsFormat, Utc};
use indexmap::IndexMap;
use serde_json::Value;

use crate::chat::blocks::{Block, Text};
use crate::engine::TaskService;
use crate::error::Result;
use crate::model::{ShowVariables, Task};

/// Section surfacing a failed earlier attempt, when the task carries one.
pub fn error_block(task: &Task) -> Option<Block> {
    task.error_message
        .as_deref()
        .map(|message| Block::section(Text::mrkdwn(format!("*{message}*"))))
}

/// Section with the task's configured description, when present.
pub fn description_block(task: &Task) -> Option<Block> {
    task.description
        .as_deref()
        .map(|description| Block::section(Text::mrkdwn(description)))
}

/// Blocks displaying process variables per the task's show-variables directive.
///
/// A directive resolving to zero variables emits no block; the two ways that
/// happens are kept apart in the logs because one of them is almost always a
/// misconfigured directive value.
pub async fn variables_blocks(task_service: &dyn TaskService, task: &Task) -> Result<Vec<Block>> {
    let variables = match &task.show_variables {
        ShowVariables::Hidden => return Ok(vec![]),
        ShowVariables::All => task_service.variables(&task.id).await?,
        ShowVariables::Named(names) => {
            let mut found = task_service.variables_by_name(&task.id, names).await?;
            let mut ordered = IndexMap::new();
            for name in names {
                if let Some(value) = found.swap_remove(name) {
                    ordered.insert(name.clone(), value);
                }
            }
            ordered
        }
    };

    if variables.is_empty() {
        if task.show_variables == ShowVariables::Named(vec!["true".to_string()]) {
            tracing::warn!(
                task_id = %task.id,
                "Show-variables directive is set to 'true', which selects a variable named \
                 `true`; leave the value empty to show all variables, or list the variable \
                 names to display"
            );
        } else {
            tracing::warn!(
                task_id = %task.id,
                task_name = %task.name,
                "Show-variables directive is set, but no matching variables were found"
            );
        }
        return Ok(vec![]);
    }

    Ok(vec![Block::section_fields(variables_fields(&variables))])
}

fn variables_fields(variables: &IndexMap<String, Value>) -> Vec<Text> {
    variables
        .iter()
        .map(|(name, value)| Text::mrkdwn(format!("*{name}:*\n{}", display_value(value))))
        .collect()
}

/// Strings render bare; everything else falls back to its JSON form.
fn display_value(value: &Value) -> String {
    match value.as_str() {
        Some(text) => text.to_string(),
        None => value.to_string(),
    }
}

/// Markdown line replacing a task's messages once the task is done.
///
/// Uses the platform's localized date markup with the ISO timestamp as the
/// fallback for surfaces that cannot render it.
pub fn completion_summary(
    task_name: &str,
    actor_mention: &str,
    completed_at: DateTime<Utc>,
) -> String {
    let unix = completed_at.timestamp();
    let fallback = completed_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    format!(
        "Task *{task_name}* <!date^{unix}^completed {{date_short_pretty}} at {{time}}|{fallback}> \
         by {actor_mention}"
    )
}
