//! Debate rounds and the append-only transcript

use super::argument::Argument;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two positions in a debate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DebateSide {
    /// Defends the original candidate (argued by the primary agent)
    A,
    /// Defends the alternative (argued by the auxiliary agent)
    B,
}

impl fmt::Display for DebateSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DebateSide::A => write!(f, "A"),
            DebateSide::B => write!(f, "B"),
        }
    }
}

/// Both sides' arguments for one round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DebateRound {
    /// 1-based
    pub round_number: usize,
    pub side_a: Argument,
    pub side_b: Argument,
}

impl DebateRound {
    pub fn argument(&self, side: DebateSide) -> &Argument {
        match side {
            DebateSide::A => &self.side_a,
            DebateSide::B => &self.side_b,
        }
    }
}

/// Ordered record of debate rounds.
///
/// Append-only: rounds can be pushed and read, never removed or edited, so
/// the round count never decreases over the life of a debate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DebateTranscript {
    rounds: Vec<DebateRound>,
}

impl DebateTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append the next round. Returns the round number assigned.
    pub fn push(&mut self, side_a: Argument, side_b: Argument) -> usize {
        let round_number = self.rounds.len() + 1;
        self.rounds.push(DebateRound {
            round_number,
            side_a,
            side_b,
        });
        round_number
    }

    pub fn rounds(&self) -> &[DebateRound] {
        &self.rounds
    }

    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn last(&self) -> Option<&DebateRound> {
        self.rounds.last()
    }

    /// All claims and evidence raised so far, for synthesis validation
    pub fn raised_concerns(&self) -> Vec<String> {
        let mut concerns = Vec::new();
        for round in &self.rounds {
            for arg in [&round.side_a, &round.side_b] {
                concerns.push(arg.claim().to_string());
                concerns.extend(arg.evidence().iter().cloned());
            }
        }
        concerns
    }

    /// Render the transcript as text (used in prompts)
    pub fn render(&self) -> String {
        if self.rounds.is_empty() {
            return "(no prior rounds)".to_string();
        }
        let mut out = String::new();
        for round in &self.rounds {
            out.push_str(&format!("## Round {}\n", round.round_number));
            for (side, arg) in [(DebateSide::A, &round.side_a), (DebateSide::B, &round.side_b)] {
                out.push_str(&format!(
                    "Side {} (confidence {:.2}): {}\n",
                    side,
                    arg.confidence(),
                    arg.claim()
                ));
                for item in arg.evidence() {
                    out.push_str(&format!("  - {}\n", item));
                }
                if !arg.reasoning().is_empty() {
                    out.push_str(&format!("  Reasoning: {}\n", arg.reasoning()));
                }
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(claim: &str) -> Argument {
        Argument::new(claim, vec![format!("{} evidence", claim)], "because", 0.7)
    }

    #[test]
    fn test_round_numbers_are_sequential() {
        let mut transcript = DebateTranscript::new();
        assert_eq!(transcript.push(arg("a1"), arg("b1")), 1);
        assert_eq!(transcript.push(arg("a2"), arg("b2")), 2);
        assert_eq!(transcript.rounds()[1].round_number, 2);
        assert_eq!(transcript.last().unwrap().side_b.claim(), "b2");
    }

    #[test]
    fn test_transcript_never_shrinks() {
        let mut transcript = DebateTranscript::new();
        let mut previous = transcript.len();
        for i in 0..5 {
            transcript.push(arg(&format!("a{}", i)), arg(&format!("b{}", i)));
            assert!(transcript.len() > previous);
            previous = transcript.len();
        }
    }

    #[test]
    fn test_raised_concerns_and_render() {
        let mut transcript = DebateTranscript::new();
        assert_eq!(transcript.render(), "(no prior rounds)");
        transcript.push(arg("keep the cache"), arg("drop the cache"));

        let concerns = transcript.raised_concerns();
        assert_eq!(concerns.len(), 4);
        assert!(concerns.contains(&"drop the cache evidence".to_string()));

        let rendered = transcript.render();
        assert!(rendered.contains("## Round 1"));
        assert!(rendered.contains("Side B (confidence 0.70): drop the cache"));
    }

    #[test]
    fn test_argument_by_side() {
        let mut transcript = DebateTranscript::new();
        transcript.push(arg("left"), arg("right"));
        let round = &transcript.rounds()[0];
        assert_eq!(round.argument(DebateSide::A).claim(), "left");
        assert_eq!(round.argument(DebateSide::B).claim(), "right");
    }
}
