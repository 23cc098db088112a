//! Tool registry: the fixed capability set the conversation agent can call.

mod registry;
mod types;

pub use registry::ToolRegistry;
pub use types::{ToolInvocation, ToolResult, ToolStatus};
