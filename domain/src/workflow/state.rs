//! Working record of one workflow run

use super::outcome::WorkflowOutcome;
use crate::routing::RoutingTier;
use crate::solution::{Critique, Solution};

/// State of a single `process` call.
///
/// Owned by exactly one run and dropped when it completes; a cancelled run
/// discards it without persisting anything.
#[derive(Debug, Clone)]
pub struct WorkflowState {
    mode: RoutingTier,
    current: Option<Solution>,
    critiques: Vec<Critique>,
    iteration: usize,
    outcome: Option<WorkflowOutcome>,
}

impl WorkflowState {
    pub fn new(mode: RoutingTier) -> Self {
        Self {
            mode,
            current: None,
            critiques: Vec::new(),
            iteration: 0,
            outcome: None,
        }
    }

    pub fn mode(&self) -> RoutingTier {
        self.mode
    }

    /// Install a new candidate. The first candidate starts iteration 1,
    /// each later one advances the count. The candidate's provenance is
    /// stamped with the iteration it now belongs to.
    pub fn set_candidate(&mut self, solution: Solution) -> &Solution {
        self.iteration += 1;
        self.current.insert(solution.at_iteration(self.iteration))
    }

    pub fn current(&self) -> Option<&Solution> {
        self.current.as_ref()
    }

    pub fn record_critique(&mut self, critique: Critique) {
        self.critiques.push(critique);
    }

    /// Critique history, oldest first
    pub fn critiques(&self) -> &[Critique] {
        &self.critiques
    }

    pub fn last_critique(&self) -> Option<&Critique> {
        self.critiques.last()
    }

    /// 1-based iteration of the current candidate; 0 before the first
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn finish(&mut self, outcome: WorkflowOutcome) {
        self.outcome = Some(outcome);
    }

    pub fn outcome(&self) -> Option<WorkflowOutcome> {
        self.outcome
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Take the current candidate, leaving the state without one
    pub fn take_current(&mut self) -> Option<Solution> {
        self.current.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::role::AgentRole;

    #[test]
    fn test_iterations_advance_with_candidates() {
        let mut state = WorkflowState::new(RoutingTier::Bounded);
        assert_eq!(state.iteration(), 0);
        assert!(state.current().is_none());

        state.set_candidate(Solution::proposal("v1", AgentRole::Primary, 1));
        state.set_candidate(Solution::proposal("v2", AgentRole::Primary, 2));
        assert_eq!(state.iteration(), 2);
        assert_eq!(state.current().unwrap().content(), "v2");

        assert!(!state.is_finished());
        state.finish(WorkflowOutcome::Exhausted);
        assert_eq!(state.outcome(), Some(WorkflowOutcome::Exhausted));
        assert_eq!(state.take_current().unwrap().content(), "v2");
        assert!(state.current().is_none());
    }

    #[test]
    fn test_candidate_provenance_follows_state_iteration() {
        let mut state = WorkflowState::new(RoutingTier::Delegated);
        // Produced two agent steps deep inside iteration 1
        let v1 = Solution::proposal("v1", AgentRole::Primary, 3);
        let id = v1.id().clone();
        let installed = state.set_candidate(v1);
        assert_eq!(installed.provenance().iteration, 1);
        assert_eq!(installed.id(), &id);

        let installed = state.set_candidate(Solution::proposal("v2", AgentRole::Primary, 0));
        assert_eq!(installed.provenance().iteration, 2);
        assert_eq!(state.iteration(), 2);
    }

    #[test]
    fn test_critique_history_is_ordered() {
        let mut state = WorkflowState::new(RoutingTier::Collaborative);
        let solution = Solution::proposal("draft", AgentRole::Primary, 1);
        state.record_critique(Critique::new(&solution, AgentRole::Auxiliary, "first"));
        state.record_critique(Critique::new(&solution, AgentRole::Auxiliary, "second"));
        assert_eq!(state.critiques()[0].summary, "first");
        assert_eq!(state.last_critique().unwrap().summary, "second");
    }
}
