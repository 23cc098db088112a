//! Process-wide application context, built once at startup.

use anyhow::{Context as _, Result};
use regex::Regex;
use std::sync::Arc;

use crate::agent::ConversationAgent;
use crate::config::Config;
use crate::graph::{GraphBackend, TigerGraphClient};
use crate::llm::{AzureOpenAiClient, ChatModel};
use crate::tools::ToolRegistry;

/// Everything a request handler needs, shared behind an `Arc`.
///
/// The graph client pools its HTTP connections, so concurrent chat turns
/// share it without extra locking.
pub struct AppContext {
    pub config: Config,
    pub graph: Arc<dyn GraphBackend>,
    pub agent: ConversationAgent,
}

impl AppContext {
    /// Connect to the graph, build the model client and the agent.
    ///
    /// Fails if the graph's echo check or a one-line model completion fails.
    pub async fn initialize(config: Config) -> Result<Self> {
        let credentials = config.graph_credentials()?;
        let graph = TigerGraphClient::connect(&config.graph, credentials)
            .await
            .context("Failed to connect to TigerGraph")?;
        log::info!("Connected to TigerGraph graph {}", graph.graph_name());

        let model = AzureOpenAiClient::new(config.llm_endpoint()?, config.llm_api_key()?, &config.llm)
            .context("Failed to create Azure OpenAI client")?;
        model
            .ping()
            .await
            .with_context(|| format!("Azure OpenAI deployment {} is not reachable", config.llm.deployment))?;
        log::info!("Using Azure OpenAI deployment {}", config.llm.deployment);

        Self::from_parts(config, Arc::new(graph), Arc::new(model))
    }

    /// Assemble a context from already-built backends
    pub fn from_parts(config: Config, graph: Arc<dyn GraphBackend>, model: Arc<dyn ChatModel>) -> Result<Self> {
        let mut registry = ToolRegistry::new(graph.clone());
        if config.agent.resolve_names {
            let pattern = Regex::new(&config.agent.person_id_pattern)
                .with_context(|| format!("Invalid agent.person_id_pattern: {}", config.agent.person_id_pattern))?;
            registry = registry.with_name_resolution(pattern);
        }

        let agent = ConversationAgent::new(model, registry, config.agent.max_iterations);
        Ok(Self { config, graph, agent })
    }

    pub fn shutdown(&self) {
        log::info!("Shutting down graphchat, releasing TigerGraph connection pool");
    }
}
