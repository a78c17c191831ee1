//! Task context adapters
//!
//! - [`HeuristicSizer`] estimates a task's context size without a tokenizer
//! - [`AttachmentLoader`] turns `--file` arguments into context blobs

mod attachments;
mod sizer;

pub use attachments::{AttachmentFailure, AttachmentLoader, Attachments};
pub use sizer::{CHARS_PER_UNIT, HeuristicSizer};
