//! Character-count size estimation

use tandem_application::ContextSizer;
use tandem_domain::Task;

/// Characters assumed per context unit
pub const CHARS_PER_UNIT: u64 = 4;

/// Estimates size as `ceil(chars / 4)` over everything an agent could be
/// shown: the goal, each context blob (label included) and the
/// conversation summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicSizer;

impl HeuristicSizer {
    pub fn new() -> Self {
        Self
    }

    fn units(chars: usize) -> u64 {
        (chars as u64).div_ceil(CHARS_PER_UNIT)
    }
}

impl ContextSizer for HeuristicSizer {
    fn estimate(&self, task: &Task) -> u64 {
        let blobs: usize = task
            .context()
            .iter()
            .map(|blob| blob.label.chars().count() + blob.content.chars().count())
            .sum();
        let summary = task
            .conversation()
            .map(|c| c.summary.chars().count())
            .unwrap_or(0);

        Self::units(task.goal().chars().count() + blobs + summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_domain::{ContextBlob, ConversationRef, TaskId};

    #[test]
    fn test_goal_only_rounds_up() {
        let task = Task::new("abcde").unwrap();
        assert_eq!(HeuristicSizer.estimate(&task), 2);
    }

    #[test]
    fn test_counts_context_and_summary() {
        let task = Task::new("goal")
            .unwrap()
            .with_context(ContextBlob::new("a.rs", "x".repeat(4_000)))
            .with_conversation(ConversationRef {
                previous_task: TaskId::new("prev"),
                summary: "y".repeat(400),
            });

        // 4 + 4 + 4000 + 400 chars
        assert_eq!(HeuristicSizer.estimate(&task), 1_102);
    }

    #[test]
    fn test_multibyte_text_counts_chars() {
        let task = Task::new("日本語のタスク").unwrap();
        assert_eq!(HeuristicSizer.estimate(&task), 2);
    }
}
