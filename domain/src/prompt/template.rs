//! Prompt templates for every agent capability
//!
//! Each template ends with the exact JSON shape the response parsers in
//! [`crate::parsing`] accept.

use crate::core::role::AgentRole;
use crate::core::task::Task;
use crate::debate::DebateTranscript;
use crate::evaluation::Criterion;
use crate::solution::{
    Critique, CritiqueContext, CritiqueFocus, ProposalContext, ProposalStage, Solution,
};

/// Characters of context shown to an agent that does not hold the full bundle
pub const CONTEXT_PREVIEW_CHARS: usize = 2_000;

const SOLUTION_FORMAT: &str = r#"Respond with a JSON object:
{"solution": "<the complete solution text>"}"#;

const CRITIQUE_FORMAT: &str = r#"Respond with a JSON object:
{
  "summary": "<one or two sentences>",
  "issues": [{"description": "<what is wrong>", "severity": "blocking" | "advisory"}],
  "alternative": "<a complete competing solution, or null>"
}
Only mark an issue blocking if the solution must not be accepted without fixing it.
Only offer an alternative if you believe a fundamentally different approach is better."#;

const ARGUMENT_FORMAT: &str = r#"Respond with a JSON object:
{
  "claim": "<your position in one sentence>",
  "evidence": ["<supporting point>", "..."],
  "reasoning": "<why the evidence supports the claim>",
  "confidence": <number between 0.0 and 1.0>
}
Lower your confidence if the opponent has convinced you."#;

const SCORE_FORMAT: &str = r#"Respond with a JSON object:
{"score": <number between 0.0 and 1.0>, "reasoning": "<why>", "evidence": ["<observation>", "..."]}"#;

/// Templates for generating prompts at each step
pub struct PromptTemplate;

impl PromptTemplate {
    /// System prompt for an agent in the given role
    pub fn system(role: AgentRole) -> &'static str {
        match role {
            AgentRole::Primary => {
                r#"You are the primary agent of a two-agent team. You orchestrate the work:
you draft, plan, direct and validate, and you always have the final word on quality.
Be precise and concise. Follow the requested response format exactly."#
            }
            AgentRole::Auxiliary => {
                r#"You are the auxiliary agent of a two-agent team. You hold a large context window
and are asked for full-context analysis and rigorous review.
Ground every statement in the provided context. Follow the requested response format exactly."#
            }
        }
    }

    /// Task goal plus context, either full or a preview
    pub fn task_section(task: &Task, full_context: bool) -> String {
        let mut section = format!("Task:\n{}\n", task.goal());

        if let Some(conversation) = task.conversation() {
            section.push_str(&format!(
                "\nThis continues an earlier exchange ({}):\n{}\n",
                conversation.previous_task, conversation.summary
            ));
        }

        if task.has_context() {
            let context = task.joined_context();
            if full_context || context.chars().count() <= CONTEXT_PREVIEW_CHARS {
                section.push_str(&format!("\nContext:\n{}\n", context));
            } else {
                let preview: String = context.chars().take(CONTEXT_PREVIEW_CHARS).collect();
                section.push_str(&format!(
                    "\nContext (preview; the full context is held by your collaborator):\n{}\n[...]\n",
                    preview
                ));
            }
        }

        section
    }

    pub fn propose(task: &Task, ctx: &ProposalContext) -> String {
        let task_section = Self::task_section(task, ctx.full_context);
        let instruction = match &ctx.stage {
            ProposalStage::Draft => {
                "Produce a complete solution to the task.".to_string()
            }
            ProposalStage::Plan => {
                "Break the task down into a plan: the sub-problems, what must be \
                 looked up in the full context, and how the parts fit together. \
                 A collaborator with the full context will analyse it against your plan."
                    .to_string()
            }
            ProposalStage::Analysis { plan } => format!(
                "Analyse the full context against this plan from your collaborator and \
                 report every finding relevant to solving the task.\n\nPlan:\n{}",
                plan.content()
            ),
            ProposalStage::Direction => {
                "The context is too large for you to process directly. Set the direction \
                 for the analysis: the questions to answer, what to look for and what \
                 output you need back."
                    .to_string()
            }
            ProposalStage::HeavyAnalysis { direction } => format!(
                "Carry out this analysis over the full context exactly as directed and \
                 produce a complete solution from it.\n\nDirection:\n{}",
                direction.content()
            ),
        };

        format!("{}\n{}\n\n{}", task_section, instruction, SOLUTION_FORMAT)
    }

    pub fn critique(task: &Task, solution: &Solution, ctx: &CritiqueContext) -> String {
        let task_section = Self::task_section(task, ctx.full_context);
        let instruction = match &ctx.focus {
            CritiqueFocus::Review => {
                "Review the solution below for correctness, completeness and fitness \
                 for the task."
                    .to_string()
            }
            CritiqueFocus::Validation => {
                "Validate the analysis below. Check that it follows your direction, \
                 answers the task and does not overreach what the context supports."
                    .to_string()
            }
            CritiqueFocus::SynthesisCheck { concerns } => {
                let list = concerns
                    .iter()
                    .map(|c| format!("- {}", c))
                    .collect::<Vec<_>>()
                    .join("\n");
                format!(
                    "The solution below synthesises two debated positions. Check that it \
                     addresses every concern raised in the debate:\n{}",
                    list
                )
            }
        };

        format!(
            "{}\n{}\n\nSolution (iteration {}):\n{}\n\n{}",
            task_section,
            instruction,
            solution.provenance().iteration,
            solution.content(),
            CRITIQUE_FORMAT
        )
    }

    pub fn refine(
        task: &Task,
        solution: &Solution,
        critique: &Critique,
        full_context: bool,
    ) -> String {
        format!(
            "{}\nRevise the solution below so that every blocking issue is resolved. \
             Keep what already works.\n\nCurrent solution:\n{}\n\nReview summary: {}\nIssues:\n{}\n\n{}",
            Self::task_section(task, full_context),
            solution.content(),
            critique.summary,
            critique.render_issues(),
            SOLUTION_FORMAT
        )
    }

    pub fn argue(
        task: &Task,
        own: &Solution,
        opponent: &Solution,
        transcript: &DebateTranscript,
        full_context: bool,
    ) -> String {
        format!(
            "{}\nYou are defending your solution against a competing one. \
             Argue for the better approach; concede points the opponent has won.\n\n\
             Your solution:\n{}\n\nOpponent's solution:\n{}\n\nDebate so far:\n{}\n\n{}",
            Self::task_section(task, full_context),
            own.content(),
            opponent.content(),
            transcript.render(),
            ARGUMENT_FORMAT
        )
    }

    /// Synthesis of two debated solutions. With an empty transcript this is
    /// a composition of a plan and its analysis.
    pub fn synthesize(
        task: &Task,
        a: &Solution,
        b: &Solution,
        transcript: &DebateTranscript,
    ) -> String {
        let body = if transcript.is_empty() {
            format!(
                "Compose the final solution from your plan and your collaborator's \
                 full-context analysis.\n\nPlan:\n{}\n\nAnalysis:\n{}",
                a.content(),
                b.content()
            )
        } else {
            format!(
                "Two solutions were debated. Produce one final solution that takes the \
                 best of both, and state explicitly what was taken from each side and why. \
                 If one side is right on every point, keep it unchanged.\n\n\
                 Solution A:\n{}\n\nSolution B:\n{}\n\nDebate transcript:\n{}",
                a.content(),
                b.content(),
                transcript.render()
            )
        };

        format!(
            "{}\n{}\n\n{}",
            Self::task_section(task, false),
            body,
            SOLUTION_FORMAT
        )
    }

    /// Self-contained scoring prompt for one criterion
    pub fn score(task: &Task, solution: &Solution, criterion: Criterion) -> String {
        format!(
            "Task:\n{}\n\nScore the solution below on {} only.\n{}\n\nSolution:\n{}\n\n{}",
            task.goal(),
            criterion,
            criterion.description(),
            solution.content(),
            SCORE_FORMAT
        )
    }
}
