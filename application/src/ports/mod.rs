//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod agent;
pub mod budget;
pub mod context_sizer;
pub mod llm_gateway;
pub mod progress;
pub mod result_cache;
pub mod trace_sink;
