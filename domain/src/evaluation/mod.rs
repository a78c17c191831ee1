//! Solution evaluation
//!
//! Criteria, per-criterion scores and weighted comparison. Scoring itself
//! (one agent call per criterion) happens in the application layer; this
//! module only aggregates and classifies.

pub mod criterion;
pub mod score;
pub mod weights;

pub use criterion::Criterion;
pub use score::{EvaluationScore, ScoreSet};
pub use weights::{ComparisonResult, CriterionWeights, Verdict, WEIGHT_SUM_EPSILON};
