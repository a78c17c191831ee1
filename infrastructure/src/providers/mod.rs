//! Model provider adapters implementing the [`LlmGateway`] port
//!
//! [`LlmGateway`]: tandem_application::LlmGateway

mod openai_compatible;

pub use openai_compatible::{GatewayBuildError, OpenAiCompatibleGateway};
