//! Primary-brackets-auxiliary protocol for delegated mode.
//!
//! The auxiliary agent's heavy analysis is only ever accepted as a
//! candidate when the primary agent directed it beforehand and validated it
//! afterwards. Each state can only be built from the one before it plus a
//! result authored by the expected agent:
//!
//! ```text
//! Directed
//!   └─(auxiliary analysis)─> HeavyLifted
//!                              └─(primary validation)─┬─> Validated
//!                                                     └─> Correcting ─(primary fix)─> Validated
//! ```

use tandem_domain::{AgentRole, Critique, Solution};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub(crate) enum BracketError {
    #[error("{step} must come from the {expected} agent, got {actual}")]
    WrongAuthor {
        step: &'static str,
        expected: AgentRole,
        actual: AgentRole,
    },

    #[error("validation reviewed solution {reviewed}, not the analysis")]
    UnrelatedValidation { reviewed: String },
}

impl BracketError {
    /// The agent whose result broke the protocol
    pub(crate) fn offender(&self) -> AgentRole {
        match self {
            BracketError::WrongAuthor { actual, .. } => *actual,
            BracketError::UnrelatedValidation { .. } => AgentRole::Primary,
        }
    }
}

fn expect_author(
    step: &'static str,
    expected: AgentRole,
    actual: AgentRole,
) -> Result<(), BracketError> {
    if expected == actual {
        Ok(())
    } else {
        Err(BracketError::WrongAuthor {
            step,
            expected,
            actual,
        })
    }
}

/// The primary agent has set the direction
#[derive(Debug)]
pub(crate) struct Directed {
    direction: Solution,
}

impl Directed {
    pub(crate) fn new(direction: Solution) -> Result<Self, BracketError> {
        expect_author("direction", AgentRole::Primary, direction.author())?;
        Ok(Self { direction })
    }

    pub(crate) fn direction(&self) -> &Solution {
        &self.direction
    }

    pub(crate) fn heavy_lifted(self, analysis: Solution) -> Result<HeavyLifted, BracketError> {
        expect_author("heavy analysis", AgentRole::Auxiliary, analysis.author())?;
        Ok(HeavyLifted { analysis })
    }
}

/// The auxiliary agent has analysed the full context as directed
#[derive(Debug)]
pub(crate) struct HeavyLifted {
    analysis: Solution,
}

impl HeavyLifted {
    pub(crate) fn analysis(&self) -> &Solution {
        &self.analysis
    }

    pub(crate) fn validate(self, validation: Critique) -> Result<Validation, BracketError> {
        expect_author("validation", AgentRole::Primary, validation.reviewer)?;
        if validation.solution_id() != self.analysis.id() {
            return Err(BracketError::UnrelatedValidation {
                reviewed: validation.solution_id().to_string(),
            });
        }

        if validation.has_blocking_issues() {
            Ok(Validation::Correcting(Correcting {
                analysis: self.analysis,
                validation,
            }))
        } else {
            Ok(Validation::Validated(Validated {
                candidate: self.analysis,
            }))
        }
    }
}

/// Result of the primary agent's validation
#[derive(Debug)]
pub(crate) enum Validation {
    Validated(Validated),
    /// The primary found blocking problems and must correct the analysis
    Correcting(Correcting),
}

#[derive(Debug)]
pub(crate) struct Correcting {
    analysis: Solution,
    validation: Critique,
}

impl Correcting {
    pub(crate) fn analysis(&self) -> &Solution {
        &self.analysis
    }

    pub(crate) fn validation(&self) -> &Critique {
        &self.validation
    }

    pub(crate) fn correct(self, corrected: Solution) -> Result<Validated, BracketError> {
        expect_author("correction", AgentRole::Primary, corrected.author())?;
        Ok(Validated {
            candidate: corrected,
        })
    }
}

/// A candidate that has been through the whole bracket
#[derive(Debug)]
pub(crate) struct Validated {
    candidate: Solution,
}

impl Validated {
    pub(crate) fn into_candidate(self) -> Solution {
        self.candidate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_domain::{Issue, Provenance, SolutionOrigin};

    fn by(author: AgentRole, origin: SolutionOrigin, content: &str) -> Solution {
        Solution::new(
            content,
            Provenance {
                author,
                iteration: 1,
                origin,
            },
        )
    }

    #[test]
    fn test_full_bracket() {
        let directed =
            Directed::new(by(AgentRole::Primary, SolutionOrigin::Plan, "look for X")).unwrap();
        let lifted = directed
            .heavy_lifted(by(AgentRole::Auxiliary, SolutionOrigin::Analysis, "X is in module a"))
            .unwrap();
        let approval = Critique::approval(lifted.analysis(), AgentRole::Primary);

        let Validation::Validated(validated) = lifted.validate(approval).unwrap() else {
            panic!("expected validated");
        };
        assert_eq!(validated.into_candidate().content(), "X is in module a");
    }

    #[test]
    fn test_blocking_validation_requires_primary_correction() {
        let directed =
            Directed::new(by(AgentRole::Primary, SolutionOrigin::Plan, "look for X")).unwrap();
        let lifted = directed
            .heavy_lifted(by(AgentRole::Auxiliary, SolutionOrigin::Analysis, "X is nowhere"))
            .unwrap();
        let rejection = Critique::new(lifted.analysis(), AgentRole::Primary, "wrong")
            .with_issue(Issue::blocking("X is in module a"));

        let Validation::Correcting(correcting) = lifted.validate(rejection).unwrap() else {
            panic!("expected correcting");
        };
        assert!(correcting.validation().has_blocking_issues());

        let err = correcting
            .correct(by(AgentRole::Auxiliary, SolutionOrigin::Refinement, "fixed"))
            .unwrap_err();
        assert_eq!(err.offender(), AgentRole::Auxiliary);
    }

    #[test]
    fn test_authors_are_enforced() {
        assert!(Directed::new(by(AgentRole::Auxiliary, SolutionOrigin::Plan, "d")).is_err());

        let directed = Directed::new(by(AgentRole::Primary, SolutionOrigin::Plan, "d")).unwrap();
        assert!(
            directed
                .heavy_lifted(by(AgentRole::Primary, SolutionOrigin::Analysis, "a"))
                .is_err()
        );
    }

    #[test]
    fn test_validation_must_review_the_analysis() {
        let directed = Directed::new(by(AgentRole::Primary, SolutionOrigin::Plan, "d")).unwrap();
        let lifted = directed
            .heavy_lifted(by(AgentRole::Auxiliary, SolutionOrigin::Analysis, "a"))
            .unwrap();
        let elsewhere = by(AgentRole::Auxiliary, SolutionOrigin::Analysis, "other");
        let err = lifted
            .validate(Critique::approval(&elsewhere, AgentRole::Primary))
            .unwrap_err();
        assert!(matches!(err, BracketError::UnrelatedValidation { .. }));
    }
}
