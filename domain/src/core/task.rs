//! Task value object
//!
//! A [`Task`] is the immutable input of one orchestration run: the free-text
//! goal, any attached context blobs, and an optional reference to a prior
//! conversation. It is created once per user request and never mutated.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

static TASK_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Identifier of a task, used to key traces and transcripts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a process-unique id from the wall clock and a counter
    pub fn generate() -> Self {
        let millis = chrono::Utc::now().timestamp_millis();
        let seq = TASK_COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("task-{:x}-{}", millis, seq))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A named piece of context attached to a task (file contents, logs, notes)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextBlob {
    /// Where the blob came from (file path, "inline", ...)
    pub label: String,
    pub content: String,
}

impl ContextBlob {
    pub fn new(label: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            content: content.into(),
        }
    }
}

/// Reference to an earlier exchange that this task continues
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationRef {
    /// Task the conversation continues from
    pub previous_task: TaskId,
    /// Short summary (usually the previously accepted solution)
    pub summary: String,
}

/// Immutable task input (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    goal: String,
    context: Vec<ContextBlob>,
    conversation: Option<ConversationRef>,
}

impl Task {
    /// Create a task with a generated id
    pub fn new(goal: impl Into<String>) -> Result<Self, DomainError> {
        Self::with_id(TaskId::generate(), goal)
    }

    /// Create a task with an explicit id
    pub fn with_id(id: TaskId, goal: impl Into<String>) -> Result<Self, DomainError> {
        let goal = goal.into();
        if goal.trim().is_empty() {
            return Err(DomainError::InvalidTask(
                "task goal cannot be empty".to_string(),
            ));
        }
        Ok(Self {
            id,
            goal,
            context: Vec::new(),
            conversation: None,
        })
    }

    pub fn with_context(mut self, blob: ContextBlob) -> Self {
        self.context.push(blob);
        self
    }

    pub fn with_conversation(mut self, conversation: ConversationRef) -> Self {
        self.conversation = Some(conversation);
        self
    }

    pub fn id(&self) -> &TaskId {
        &self.id
    }

    pub fn goal(&self) -> &str {
        &self.goal
    }

    pub fn context(&self) -> &[ContextBlob] {
        &self.context
    }

    pub fn conversation(&self) -> Option<&ConversationRef> {
        self.conversation.as_ref()
    }

    pub fn has_context(&self) -> bool {
        !self.context.is_empty()
    }

    /// All context blobs joined into one document, labelled per blob
    pub fn joined_context(&self) -> String {
        self.context
            .iter()
            .map(|blob| format!("--- {} ---\n{}", blob.label, blob.content))
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// Content fingerprint, independent of the task id.
    ///
    /// Two tasks with the same goal, context and conversation share a
    /// fingerprint; used to key cached results.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.goal.hash(&mut hasher);
        self.context.hash(&mut hasher);
        self.conversation.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_goal_rejected() {
        let result = Task::new("   ");
        assert!(matches!(result, Err(DomainError::InvalidTask(_))));
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let a = TaskId::generate();
        let b = TaskId::generate();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("task-"));
    }

    #[test]
    fn test_fingerprint_ignores_id() {
        let a = Task::with_id(TaskId::new("a"), "Refactor the parser")
            .unwrap()
            .with_context(ContextBlob::new("lib.rs", "fn main() {}"));
        let b = Task::with_id(TaskId::new("b"), "Refactor the parser")
            .unwrap()
            .with_context(ContextBlob::new("lib.rs", "fn main() {}"));
        let c = Task::with_id(TaskId::new("c"), "Refactor the lexer").unwrap();

        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
    }

    #[test]
    fn test_joined_context_labels_blobs() {
        let task = Task::new("Summarise")
            .unwrap()
            .with_context(ContextBlob::new("a.txt", "alpha"))
            .with_context(ContextBlob::new("b.txt", "beta"));

        let joined = task.joined_context();
        assert!(joined.contains("--- a.txt ---\nalpha"));
        assert!(joined.contains("--- b.txt ---\nbeta"));
        assert!(task.has_context());
    }
}
