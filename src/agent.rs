//! Conversation agent: drives the model's tool-calling loop for one chat turn.
//!
//! Per turn: reasoning -> (tool call -> observation)* -> answer. Tool calls
//! within a turn run sequentially because later calls usually depend on
//! earlier observations (a name lookup before an id-based query).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::llm::{ChatMessage, ChatModel, ModelTurn, ToolDefinition};
use crate::tools::{ToolInvocation, ToolRegistry, ToolResult, ToolStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatStatus {
    Success,
    Error,
}

/// Record of one tool call made while answering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolTrace {
    pub tool: String,
    pub arguments: Value,
    pub status: ToolStatus,
}

/// Result of one user turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResult {
    pub status: ChatStatus,
    pub response: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolTrace>,
}

impl ChatResult {
    fn success(query: &str, response: String, tool_calls: Vec<ToolTrace>) -> Self {
        Self {
            status: ChatStatus::Success,
            response,
            query: query.to_string(),
            tool_calls,
        }
    }

    fn error(query: &str, response: String, tool_calls: Vec<ToolTrace>) -> Self {
        Self {
            status: ChatStatus::Error,
            response,
            query: query.to_string(),
            tool_calls,
        }
    }
}

pub struct ConversationAgent {
    model: Arc<dyn ChatModel>,
    registry: ToolRegistry,
    tools: Vec<ToolDefinition>,
    system_prompt: String,
    max_iterations: usize,
}

impl ConversationAgent {
    pub fn new(model: Arc<dyn ChatModel>, registry: ToolRegistry, max_iterations: usize) -> Self {
        let tools = registry.definitions();
        Self {
            model,
            registry,
            tools,
            system_prompt: system_prompt(),
            max_iterations: max_iterations.max(1),
        }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Answer one user message.
    ///
    /// Each turn starts from a fresh history, so concurrent users never see
    /// each other's conversation. Never fails: model errors and running out
    /// of iterations both produce an error `ChatResult`.
    pub async fn chat(&self, user_message: &str) -> ChatResult {
        let mut messages = vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(user_message),
        ];
        let mut trace = Vec::new();

        for iteration in 0..self.max_iterations {
            let turn = match self.model.complete(&messages, &self.tools).await {
                Ok(turn) => turn,
                Err(e) => {
                    log::error!("Error in chat: {}", e);
                    return ChatResult::error(
                        user_message,
                        format!("I encountered an error while processing your request: {}", e),
                        trace,
                    );
                }
            };

            match turn {
                ModelTurn::Answer(text) => {
                    log::debug!("Answered after {} reasoning step(s)", iteration + 1);
                    return ChatResult::success(user_message, text, trace);
                }
                ModelTurn::ToolCalls { content, calls } => {
                    messages.push(ChatMessage::assistant_tool_calls(content, calls.clone()));
                    for call in calls {
                        let (invocation, result) = self.run_tool_call(&call.function.name, &call.function.arguments).await;
                        trace.push(ToolTrace {
                            tool: invocation.name,
                            arguments: invocation.arguments,
                            status: result.status(),
                        });
                        messages.push(ChatMessage::tool(call.id, result.to_observation()));
                    }
                }
            }
        }

        log::warn!(
            "Chat turn stopped after {} reasoning steps without an answer",
            self.max_iterations
        );
        ChatResult::error(
            user_message,
            format!(
                "I wasn't able to complete an answer within {} reasoning steps. Please try rephrasing or narrowing your question.",
                self.max_iterations
            ),
            trace,
        )
    }

    /// Decode the model's JSON argument string and invoke the tool
    async fn run_tool_call(&self, name: &str, raw_arguments: &str) -> (ToolInvocation, ToolResult) {
        let arguments = if raw_arguments.trim().is_empty() {
            Ok(Value::Null)
        } else {
            serde_json::from_str::<Value>(raw_arguments)
        };

        match arguments {
            Ok(arguments) => {
                let invocation = ToolInvocation::new(name, arguments);
                let result = self.registry.invoke(&invocation).await;
                (invocation, result)
            }
            Err(e) => {
                log::warn!("Model sent malformed arguments for {}: {}", name, e);
                (
                    ToolInvocation::new(name, Value::String(raw_arguments.to_string())),
                    ToolResult::error(format!("Arguments for {} are not valid JSON: {}", name, e)),
                )
            }
        }
    }
}

const KNOWN_COMPANIES: &str =
    "TechCorp, DataSystems, CloudVentures, StartupX, FinanceHub, MobileApps Inc, CyberSecurity Pro";

/// Domain description and disambiguation rules given to the model
pub fn system_prompt() -> String {
    format!(
        r#"You are a helpful AI assistant that helps users explore and analyze a social network stored in a TigerGraph database.

The social network contains:
- People with their personal and professional information
- Companies where people work
- Cities where people and companies are located
- Friendship connections between people
- Work relationships between people and companies
- Professional following relationships

Available capabilities:
1. get_person_info: Get detailed info about a specific person (requires a person ID like person_001)
2. find_connections: Find how two people are connected through friendships or work
3. get_company_employees: List employees at a company, optionally filtered by department
4. find_top_influencers: Find the most influential/connected people in the network
5. get_network_analytics: Get overall network statistics and metrics
6. list_available_people: See all people in the database
7. list_available_companies: See all companies in the database

When users ask questions:
1. If they mention specific people by name (like "John Smith"), first use list_available_people to find their person ID, then call get_person_info or find_connections with that ID
2. If they mention company names, you can use them directly
3. Explain the results in natural language
4. If a tool reports an error, explain it conversationally instead of repeating raw error text
5. If you need more information, ask clarifying questions
6. Suggest related queries that might be interesting

People IDs are in format: person_001, person_002, etc.
Company names include: {}

Be conversational and helpful. Explain results clearly and suggest interesting follow-up questions."#,
        KNOWN_COMPANIES
    )
}
