//! Interactive chat module
//!
//! Provides a readline-based REPL that solves one task per line.

mod repl;

pub use repl::ChatRepl;
