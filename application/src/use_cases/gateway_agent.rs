//! Agent backed by a language model gateway
//!
//! Renders each capability with [`PromptTemplate`], sends it through an
//! [`LlmGateway`] and parses the answer into domain types. Nothing here
//! retries: the use cases own the retry and timeout discipline.

use crate::ports::agent::{Agent, AgentError};
use crate::ports::llm_gateway::{GatewayInfo, LlmGateway};
use async_trait::async_trait;
use std::sync::Arc;
use tandem_domain::{
    AgentRole, Argument, Criterion, Critique, CritiqueContext, DebateTranscript, EvaluationScore,
    PromptTemplate, ProposalContext, ProposalStage, Provenance, Solution, SolutionOrigin, Task,
    parse_argument, parse_critique, parse_score, parse_solution,
};
use tracing::debug;

fn stage_origin(stage: &ProposalStage) -> SolutionOrigin {
    match stage {
        ProposalStage::Draft => SolutionOrigin::Proposal,
        ProposalStage::Plan | ProposalStage::Direction => SolutionOrigin::Plan,
        ProposalStage::Analysis { .. } | ProposalStage::HeavyAnalysis { .. } => {
            SolutionOrigin::Analysis
        }
    }
}

pub struct GatewayAgent {
    role: AgentRole,
    name: String,
    gateway: Arc<dyn LlmGateway>,
}

impl GatewayAgent {
    /// Create an agent named after the gateway's model
    pub fn new(role: AgentRole, gateway: Arc<dyn LlmGateway>) -> Self {
        let name = gateway.describe().model;
        Self {
            role,
            name,
            gateway,
        }
    }

    pub fn info(&self) -> GatewayInfo {
        self.gateway.describe()
    }

    /// The auxiliary agent is the one that holds the whole context whenever
    /// it is asked to rework something
    fn holds_full_context(&self) -> bool {
        self.role == AgentRole::Auxiliary
    }

    async fn ask(&self, capability: &str, prompt: String) -> Result<String, AgentError> {
        debug!(
            "{} agent ({}) {}: {} prompt chars",
            self.role,
            self.name,
            capability,
            prompt.len()
        );
        let answer = self
            .gateway
            .complete(PromptTemplate::system(self.role), &prompt)
            .await?;
        debug!("{} agent answered {}: {} chars", self.role, capability, answer.len());
        Ok(answer)
    }

    fn solution(&self, content: String, iteration: usize, origin: SolutionOrigin) -> Solution {
        Solution::new(
            content,
            Provenance {
                author: self.role,
                iteration,
                origin,
            },
        )
    }
}

#[async_trait]
impl Agent for GatewayAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    fn name(&self) -> &str {
        &self.name
    }

    async fn propose(&self, task: &Task, ctx: &ProposalContext) -> Result<Solution, AgentError> {
        let answer = self
            .ask(ctx.stage.as_str(), PromptTemplate::propose(task, ctx))
            .await?;
        let content = parse_solution(&answer)?;
        Ok(self.solution(content, ctx.iteration, stage_origin(&ctx.stage)))
    }

    async fn critique(
        &self,
        task: &Task,
        solution: &Solution,
        ctx: &CritiqueContext,
    ) -> Result<Critique, AgentError> {
        let answer = self
            .ask("critique", PromptTemplate::critique(task, solution, ctx))
            .await?;
        Ok(parse_critique(&answer, solution, self.role)?)
    }

    async fn refine(
        &self,
        task: &Task,
        solution: &Solution,
        critique: &Critique,
    ) -> Result<Solution, AgentError> {
        let prompt = PromptTemplate::refine(task, solution, critique, self.holds_full_context());
        let answer = self.ask("refine", prompt).await?;
        let content = parse_solution(&answer)?;
        Ok(self.solution(
            content,
            solution.provenance().iteration + 1,
            SolutionOrigin::Refinement,
        ))
    }

    async fn argue(
        &self,
        task: &Task,
        own: &Solution,
        opponent: &Solution,
        transcript: &DebateTranscript,
    ) -> Result<Argument, AgentError> {
        let prompt =
            PromptTemplate::argue(task, own, opponent, transcript, self.holds_full_context());
        let answer = self.ask("argue", prompt).await?;
        Ok(parse_argument(&answer)?)
    }

    async fn synthesize(
        &self,
        task: &Task,
        a: &Solution,
        b: &Solution,
        transcript: &DebateTranscript,
    ) -> Result<Solution, AgentError> {
        let answer = self
            .ask("synthesize", PromptTemplate::synthesize(task, a, b, transcript))
            .await?;
        let content = parse_solution(&answer)?;
        let origin = if transcript.is_empty() {
            SolutionOrigin::Proposal
        } else {
            SolutionOrigin::Synthesis
        };
        let iteration = a.provenance().iteration.max(b.provenance().iteration);
        Ok(self.solution(content, iteration, origin))
    }

    async fn score(
        &self,
        task: &Task,
        solution: &Solution,
        criterion: Criterion,
    ) -> Result<EvaluationScore, AgentError> {
        let answer = self
            .ask("score", PromptTemplate::score(task, solution, criterion))
            .await?;
        Ok(parse_score(&answer, criterion)?)
    }

    async fn health(&self) -> Result<(), AgentError> {
        self.gateway.health().await
    }
}
