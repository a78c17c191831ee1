//! Use cases
//!
//! Application-level operations that orchestrate domain logic.

pub mod debate;
pub mod evaluate;
pub mod gateway_agent;
pub mod health;
pub mod orchestrate;
pub(crate) mod shared;
#[cfg(test)]
pub(crate) mod test_support;
