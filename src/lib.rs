pub mod agent;
pub mod catalog;
pub mod config;
pub mod context;
pub mod error;
pub mod graph;
pub mod http;
pub mod llm;
pub mod tools;

#[cfg(test)]
pub(crate) mod test_support;

pub use agent::{ChatResult, ChatStatus, ConversationAgent};
pub use config::Config;
pub use context::AppContext;
pub use error::{GraphChatError, Result};
