//! Scripted agents for use case tests

use crate::ports::agent::{Agent, AgentError};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tandem_domain::{
    AgentRole, Argument, Criterion, Critique, CritiqueContext, CritiqueFocus, DebateTranscript,
    EvaluationScore, Issue, ProposalContext, ProposalStage, Provenance, Solution, SolutionOrigin,
    Task,
};

/// One scripted answer, consumed in order regardless of which method asks
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    /// Solution text for propose / refine / synthesize
    Solution(&'static str),
    /// Critique without findings
    Approve,
    /// Critique with one blocking issue and no alternative
    Block(&'static str),
    /// Blocking issue plus a counter-proposal
    Disagree {
        issue: &'static str,
        alternative: &'static str,
    },
    Argue {
        claim: &'static str,
        confidence: f64,
    },
    Score(f64),
    Fail(AgentError),
    /// Never answers
    Hang,
}

pub(crate) struct ScriptedAgent {
    role: AgentRole,
    replies: Mutex<VecDeque<Reply>>,
    calls: Mutex<Vec<String>>,
    shared_log: Option<Arc<Mutex<Vec<String>>>>,
}

impl ScriptedAgent {
    pub(crate) fn new(role: AgentRole, replies: Vec<Reply>) -> Self {
        Self {
            role,
            replies: Mutex::new(replies.into()),
            calls: Mutex::new(Vec::new()),
            shared_log: None,
        }
    }

    /// Also append `"<role>:<call>"` to a log shared with the other agent
    pub(crate) fn with_log(mut self, log: Arc<Mutex<Vec<String>>>) -> Self {
        self.shared_log = Some(log);
        self
    }

    /// Calls made so far, e.g. `"propose:plan"`, `"critique:review"`, `"score"`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }

    async fn next(&self, call: String) -> Result<Reply, AgentError> {
        if let Some(log) = &self.shared_log {
            log.lock().unwrap().push(format!("{}:{}", self.role, call));
        }
        self.calls.lock().unwrap().push(call.clone());

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("{} agent has no reply scripted for {}", self.role, call));
        match reply {
            Reply::Fail(err) => Err(err),
            Reply::Hang => std::future::pending().await,
            other => Ok(other),
        }
    }

    fn solution(&self, reply: Reply, iteration: usize, origin: SolutionOrigin) -> Solution {
        match reply {
            Reply::Solution(text) => Solution::new(
                text,
                Provenance {
                    author: self.role,
                    iteration,
                    origin,
                },
            ),
            other => panic!("expected a solution reply, got {:?}", other),
        }
    }
}

fn stage_origin(stage: &ProposalStage) -> SolutionOrigin {
    match stage {
        ProposalStage::Draft => SolutionOrigin::Proposal,
        ProposalStage::Plan | ProposalStage::Direction => SolutionOrigin::Plan,
        ProposalStage::Analysis { .. } | ProposalStage::HeavyAnalysis { .. } => {
            SolutionOrigin::Analysis
        }
    }
}

fn focus_name(focus: &CritiqueFocus) -> &'static str {
    match focus {
        CritiqueFocus::Review => "review",
        CritiqueFocus::Validation => "validation",
        CritiqueFocus::SynthesisCheck { .. } => "synthesis_check",
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn role(&self) -> AgentRole {
        self.role
    }

    fn name(&self) -> &str {
        "scripted"
    }

    async fn propose(&self, _task: &Task, ctx: &ProposalContext) -> Result<Solution, AgentError> {
        let reply = self.next(format!("propose:{}", ctx.stage.as_str())).await?;
        Ok(self.solution(reply, ctx.iteration, stage_origin(&ctx.stage)))
    }

    async fn critique(
        &self,
        _task: &Task,
        solution: &Solution,
        ctx: &CritiqueContext,
    ) -> Result<Critique, AgentError> {
        let reply = self
            .next(format!("critique:{}", focus_name(&ctx.focus)))
            .await?;
        let critique = match reply {
            Reply::Approve => Critique::approval(solution, self.role),
            Reply::Block(issue) => Critique::new(solution, self.role, "changes needed")
                .with_issue(Issue::blocking(issue)),
            Reply::Disagree { issue, alternative } => {
                Critique::new(solution, self.role, "different approach")
                    .with_issue(Issue::blocking(issue))
                    .with_alternative(Solution::new(
                        alternative,
                        Provenance {
                            author: self.role,
                            iteration: solution.provenance().iteration,
                            origin: SolutionOrigin::Alternative,
                        },
                    ))
            }
            other => panic!("expected a critique reply, got {:?}", other),
        };
        Ok(critique)
    }

    async fn refine(
        &self,
        _task: &Task,
        solution: &Solution,
        _critique: &Critique,
    ) -> Result<Solution, AgentError> {
        let reply = self.next("refine".to_string()).await?;
        Ok(self.solution(
            reply,
            solution.provenance().iteration + 1,
            SolutionOrigin::Refinement,
        ))
    }

    async fn argue(
        &self,
        _task: &Task,
        _own: &Solution,
        _opponent: &Solution,
        _transcript: &DebateTranscript,
    ) -> Result<Argument, AgentError> {
        match self.next("argue".to_string()).await? {
            Reply::Argue { claim, confidence } => Ok(Argument::new(
                claim,
                vec![format!("{} evidence", claim)],
                "scripted reasoning",
                confidence,
            )),
            other => panic!("expected an argument reply, got {:?}", other),
        }
    }

    async fn synthesize(
        &self,
        _task: &Task,
        a: &Solution,
        _b: &Solution,
        transcript: &DebateTranscript,
    ) -> Result<Solution, AgentError> {
        let call = if transcript.is_empty() {
            "compose"
        } else {
            "synthesize"
        };
        let reply = self.next(call.to_string()).await?;
        let origin = if transcript.is_empty() {
            SolutionOrigin::Proposal
        } else {
            SolutionOrigin::Synthesis
        };
        Ok(self.solution(reply, a.provenance().iteration, origin))
    }

    async fn score(
        &self,
        _task: &Task,
        _solution: &Solution,
        criterion: Criterion,
    ) -> Result<EvaluationScore, AgentError> {
        match self.next("score".to_string()).await? {
            Reply::Score(value) => Ok(EvaluationScore::new(
                criterion,
                value,
                "scripted",
                Vec::new(),
            )),
            other => panic!("expected a score reply, got {:?}", other),
        }
    }

    async fn health(&self) -> Result<(), AgentError> {
        Ok(())
    }
}
