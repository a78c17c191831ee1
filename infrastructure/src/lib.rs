//! Infrastructure layer for tandem
//!
//! Adapters for the ports defined in the application layer: configuration
//! loading, the OpenAI-compatible model gateway, trace persistence, budget
//! accounting, result caching and context sizing.

pub mod config;
pub mod context;
pub mod logging;
pub mod providers;
pub mod runtime;

// Re-export commonly used types
pub use config::{
    ConfigLoader, ConfigSource, FileAgentEndpoint, FileAgentsConfig, FileConfig,
    FileOutputConfig, FileOutputFormat, FileReplConfig,
};
pub use context::{AttachmentFailure, AttachmentLoader, Attachments, HeuristicSizer};
pub use logging::JsonlTraceSink;
pub use providers::{GatewayBuildError, OpenAiCompatibleGateway};
pub use runtime::{MemoryResultCache, SharedBudgetTracker};
