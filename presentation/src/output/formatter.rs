//! Output formatter trait

use tandem_domain::WorkflowResult;

/// Trait for formatting workflow results
pub trait OutputFormatter {
    /// Format the complete result
    fn format(&self, result: &WorkflowResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &WorkflowResult) -> String;

    /// Format the solution only (REPL output)
    fn format_brief(&self, result: &WorkflowResult) -> String;
}
