//! Result, trace and report formatting

pub mod console;
pub mod formatter;
