//! Logging infrastructure: machine-readable trace persistence.
//!
//! Provides [`JsonlTraceSink`], a JSONL file writer that implements the
//! [`TraceSink`](tandem_application::TraceSink) port.

mod jsonl_trace_sink;

pub use jsonl_trace_sink::JsonlTraceSink;
