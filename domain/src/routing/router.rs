//! Context router
//!
//! Classifies a task's estimated context size into a [`RoutingTier`].
//! The router is a pure function of the size and two thresholds, so it is
//! freely shared across concurrent tasks.

use super::tier::RoutingTier;
use crate::core::error::DomainError;
use crate::core::task::Task;
use serde::{Deserialize, Serialize};

/// Routing thresholds in context units (tokens)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingThresholds {
    pub t_small: u64,
    pub t_large: u64,
}

impl RoutingThresholds {
    pub fn new(t_small: u64, t_large: u64) -> Self {
        Self { t_small, t_large }
    }

    /// Check `0 < t_small < t_large`
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.t_small == 0 {
            return Err(DomainError::configuration(
                "routing.t_small must be greater than 0",
            ));
        }
        if self.t_small >= self.t_large {
            return Err(DomainError::configuration(format!(
                "routing.t_small ({}) must be less than routing.t_large ({})",
                self.t_small, self.t_large
            )));
        }
        Ok(())
    }
}

impl Default for RoutingThresholds {
    fn default() -> Self {
        Self {
            t_small: 8_000,
            t_large: 100_000,
        }
    }
}

/// Routing decision: the tier plus the size that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub tier: RoutingTier,
    pub size: u64,
}

/// A task together with its estimated size
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextBundle {
    pub task: Task,
    pub size: u64,
    /// The bundle exceeds what a single collaborator call can hold
    pub requires_split: bool,
}

/// Half-open range `[start, end)` of context units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitRange {
    pub start: u64,
    pub end: u64,
}

impl SplitRange {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Size-based router
#[derive(Debug, Clone)]
pub struct ContextRouter {
    thresholds: RoutingThresholds,
}

impl ContextRouter {
    /// Create a router, rejecting invalid thresholds up front
    pub fn new(thresholds: RoutingThresholds) -> Result<Self, DomainError> {
        thresholds.validate()?;
        Ok(Self { thresholds })
    }

    pub fn thresholds(&self) -> RoutingThresholds {
        self.thresholds
    }

    /// Route a size. `t_small` itself belongs to `Collaborative`,
    /// `t_large` itself to `Delegated`.
    pub fn route(&self, size: u64) -> RoutingDecision {
        let tier = if size < self.thresholds.t_small {
            RoutingTier::Bounded
        } else if size < self.thresholds.t_large {
            RoutingTier::Collaborative
        } else {
            RoutingTier::Delegated
        };
        RoutingDecision { tier, size }
    }

    /// Bundle a task with its size
    pub fn bundle(&self, task: Task, size: u64, max_unit_size: u64) -> ContextBundle {
        ContextBundle {
            task,
            size,
            requires_split: size > max_unit_size,
        }
    }

    /// Advisory split of `size` units into chunks of at most `max_unit_size`.
    ///
    /// The ranges are contiguous and cover `[0, size)`. They are produced
    /// lazily, so any size is accepted. The caller decides whether to act on
    /// them.
    pub fn recommend_split(
        &self,
        size: u64,
        max_unit_size: u64,
    ) -> Result<SplitRanges, DomainError> {
        if max_unit_size == 0 {
            return Err(DomainError::configuration(
                "max_unit_size must be greater than 0",
            ));
        }
        Ok(SplitRanges {
            next: 0,
            size,
            max_unit_size,
        })
    }
}

/// Lazy sequence of [`SplitRange`]s returned by
/// [`ContextRouter::recommend_split`]
#[derive(Debug, Clone)]
pub struct SplitRanges {
    next: u64,
    size: u64,
    max_unit_size: u64,
}

impl SplitRanges {
    /// Number of ranges not yet yielded
    pub fn chunk_count(&self) -> u64 {
        (self.size - self.next).div_ceil(self.max_unit_size)
    }
}

impl Iterator for SplitRanges {
    type Item = SplitRange;

    fn next(&mut self) -> Option<SplitRange> {
        if self.next >= self.size {
            return None;
        }
        let start = self.next;
        let end = self.size.min(start.saturating_add(self.max_unit_size));
        self.next = end;
        Some(SplitRange { start, end })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.chunk_count();
        match usize::try_from(remaining) {
            Ok(n) => (n, Some(n)),
            Err(_) => (usize::MAX, None),
        }
    }
}
