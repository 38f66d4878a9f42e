pub mod client;
pub mod error;
pub mod prompt;

pub use client::{ChatCompletion, ChatMessage, ChatRole, OpenAiClient};
pub use error::*;
pub use prompt::build_system_prompt;
