//! Prompt domain
//!
//! Templates for generating the prompt of every agent capability.

mod template;

pub use template::{CONTEXT_PREVIEW_CHARS, PromptTemplate};
