//! Core domain concepts shared across all subdomains.
//!
//! - [`task::Task`]: the immutable input of one orchestration run
//! - [`role::AgentRole`]: primary vs auxiliary collaborator
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod role;
pub mod task;
