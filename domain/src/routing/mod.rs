//! Context routing
//!
//! Decides how a task is processed from its estimated context size.
//!
//! ```text
//!   0 ───────── t_small ───────────── t_large ──────────▶ size
//!   │  Bounded   │    Collaborative    │     Delegated
//! ```
//!
//! Thresholds are configuration; the router rejects `t_small >= t_large`
//! (or a zero `t_small`) when it is constructed.

pub mod router;
pub mod tier;

pub use router::{
    ContextBundle, ContextRouter, RoutingDecision, RoutingThresholds, SplitRange, SplitRanges,
};
pub use tier::{RoutingTier, TierRoles};
