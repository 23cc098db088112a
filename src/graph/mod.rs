//! Graph engine adapter: the single point of contact with TigerGraph.
//!
//! `GraphBackend` is the seam the tool registry depends on; `TigerGraphClient`
//! implements it over the REST++ and GSQL HTTP interfaces.

mod client;

pub use client::TigerGraphClient;

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::error::Result;

/// Vertex id to attribute mapping, as returned by a full vertex scan.
pub type Vertices = BTreeMap<String, Map<String, Value>>;

/// Credentials read from the environment at startup.
#[derive(Clone)]
pub struct GraphCredentials {
    pub username: String,
    pub password: String,
    /// REST++ bearer token; basic auth is used when absent.
    pub token: Option<String>,
}

impl std::fmt::Debug for GraphCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Remote-procedure interface of the graph engine.
///
/// Every failure crosses this boundary as a `GraphChatError` value
/// (`QueryExecution` for query and scan failures), never as a panic.
#[async_trait]
pub trait GraphBackend: Send + Sync {
    /// Liveness ping; returns the engine's echo message.
    async fn echo(&self) -> Result<String>;

    /// Invoke a pre-installed named query. Returns the raw list of result
    /// blocks; each block is an object that may hold an aggregation key such
    /// as `@@result` or `@@paths`.
    async fn run_installed_query(&self, name: &str, params: &Map<String, Value>) -> Result<Vec<Value>>;

    /// Fetch every vertex of a type.
    ///
    /// Full scan with no pagination or filtering: cost grows with the size of
    /// the graph, so this is only suitable for small demo datasets.
    async fn get_vertices(&self, vertex_type: &str) -> Result<Vertices>;

    /// Names of the queries installed on the graph.
    async fn installed_queries(&self) -> Result<Vec<String>>;

    /// Vertex type names in the graph schema.
    async fn vertex_types(&self) -> Result<Vec<String>>;
}
