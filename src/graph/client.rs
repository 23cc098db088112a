use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::{Map, Value};
use std::time::Duration;
use url::Url;

use super::{GraphBackend, GraphCredentials, Vertices};
use crate::config::GraphConfig;
use crate::error::{GraphChatError, Result};

/// TigerGraph client over REST++ (queries, vertices, echo) and the GSQL
/// server (schema).
///
/// `reqwest::Client` pools connections internally and is safe to share, so a
/// single instance serves all concurrent requests.
pub struct TigerGraphClient {
    client: Client,
    restpp_base: Url,
    gsql_base: Url,
    graph_name: String,
    credentials: GraphCredentials,
}

impl std::fmt::Debug for TigerGraphClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TigerGraphClient")
            .field("restpp_base", &self.restpp_base.as_str())
            .field("gsql_base", &self.gsql_base.as_str())
            .field("graph_name", &self.graph_name)
            .finish()
    }
}

impl TigerGraphClient {
    /// Build a client without contacting the engine
    pub fn new(config: &GraphConfig, credentials: GraphCredentials) -> Result<Self> {
        let host = Url::parse(&config.host)
            .map_err(|e| GraphChatError::Config(format!("Invalid graph host {}: {}", config.host, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GraphChatError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            restpp_base: with_port(&host, config.restpp_port)?,
            gsql_base: with_port(&host, config.gsql_port)?,
            graph_name: config.graph_name.clone(),
            credentials,
        })
    }

    /// Build a client and verify it with an echo call.
    ///
    /// Any failure is a `Connection` error; the caller must not enter serving
    /// state without a verified connection.
    pub async fn connect(config: &GraphConfig, credentials: GraphCredentials) -> Result<Self> {
        let client = Self::new(config, credentials)?;
        log::info!(
            "Testing TigerGraph connection to {} (graph {})...",
            client.restpp_base,
            client.graph_name
        );
        let echo = client.echo().await.map_err(|e| {
            GraphChatError::Connection(format!(
                "Cannot reach TigerGraph at {}: {}",
                client.restpp_base, e
            ))
        })?;
        log::info!("TigerGraph connection successful: {}", echo);
        Ok(client)
    }

    pub fn graph_name(&self) -> &str {
        &self.graph_name
    }

    fn restpp_url(&self, segments: &[&str]) -> Result<Url> {
        join_segments(&self.restpp_base, segments)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials.token {
            Some(token) => request.bearer_auth(token),
            None => request.basic_auth(&self.credentials.username, Some(&self.credentials.password)),
        }
    }

    /// GET a REST++ style endpoint and return its decoded body
    async fn get_json(&self, url: Url, query: &[(String, String)]) -> Result<Value> {
        log::debug!("GET {}", url);
        let response = self
            .authorize(self.client.get(url.clone()).query(query))
            .send()
            .await
            .map_err(|e| GraphChatError::QueryExecution(format!("Request to {} failed: {}", url, e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GraphChatError::QueryExecution(format!("Failed to read response from {}: {}", url, e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<Value>(&body)
                .ok()
                .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
                .unwrap_or(body);
            return Err(GraphChatError::QueryExecution(format!(
                "TigerGraph returned {}: {}",
                status, detail
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            GraphChatError::QueryExecution(format!("Malformed response from {}: {}", url, e))
        })
    }
}

#[async_trait]
impl GraphBackend for TigerGraphClient {
    async fn echo(&self) -> Result<String> {
        let body = self.get_json(self.restpp_url(&["echo"])?, &[]).await?;
        parse_envelope(&body)?;
        Ok(body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Hello GSQL")
            .to_string())
    }

    async fn run_installed_query(&self, name: &str, params: &Map<String, Value>) -> Result<Vec<Value>> {
        let url = self.restpp_url(&["query", &self.graph_name, name])?;
        let query = query_pairs(params);
        let body = self.get_json(url, &query).await?;
        match parse_envelope(&body)? {
            Value::Array(blocks) => Ok(blocks),
            Value::Null => Ok(Vec::new()),
            other => Err(GraphChatError::QueryExecution(format!(
                "Unexpected result shape from {}: {}",
                name, other
            ))),
        }
    }

    async fn get_vertices(&self, vertex_type: &str) -> Result<Vertices> {
        let url = self.restpp_url(&["graph", &self.graph_name, "vertices", vertex_type])?;
        let body = self.get_json(url, &[]).await?;
        parse_vertices(parse_envelope(&body)?)
    }

    async fn installed_queries(&self) -> Result<Vec<String>> {
        let url = self.restpp_url(&["endpoints", &self.graph_name])?;
        let body = self
            .get_json(url, &[("dynamic".to_string(), "true".to_string())])
            .await?;
        Ok(parse_installed_queries(&body, &self.graph_name))
    }

    async fn vertex_types(&self) -> Result<Vec<String>> {
        let url = join_segments(&self.gsql_base, &["gsqlserver", "gsql", "schema"])?;
        let body = self
            .get_json(url, &[("graph".to_string(), self.graph_name.clone())])
            .await?;
        Ok(parse_vertex_types(&parse_envelope(&body)?))
    }
}

fn with_port(host: &Url, port: u16) -> Result<Url> {
    let mut url = host.clone();
    url.set_port(Some(port))
        .map_err(|_| GraphChatError::Config(format!("Cannot set port {} on {}", port, host)))?;
    Ok(url)
}

fn join_segments(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| GraphChatError::Config(format!("Graph host cannot be a base URL: {}", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Flatten query parameters into REST++ query-string pairs
fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            (k.clone(), value)
        })
        .collect()
}

/// Unwrap a REST++ envelope `{error, message, results}`.
///
/// Returns the `results` value, or a `QueryExecution` error carrying the
/// engine's message when `error` is true.
fn parse_envelope(body: &Value) -> Result<Value> {
    if body.get("error").and_then(Value::as_bool).unwrap_or(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown TigerGraph error");
        return Err(GraphChatError::QueryExecution(message.to_string()));
    }
    Ok(body.get("results").cloned().unwrap_or(Value::Null))
}

/// Convert a vertex listing (`[{v_id, v_type, attributes}]`) into an id map
fn parse_vertices(results: Value) -> Result<Vertices> {
    let items = match results {
        Value::Array(items) => items,
        Value::Null => return Ok(Vertices::new()),
        other => {
            return Err(GraphChatError::QueryExecution(format!(
                "Unexpected vertex listing shape: {}",
                other
            )))
        }
    };

    let mut vertices = Vertices::new();
    for item in items {
        let Some(id) = item.get("v_id").and_then(Value::as_str) else {
            log::warn!("Skipping vertex without v_id: {}", item);
            continue;
        };
        let attributes = item
            .get("attributes")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        vertices.insert(id.to_string(), attributes);
    }
    Ok(vertices)
}

/// Extract query names from a dynamic endpoint listing, whose keys look like
/// `GET /query/<graph>/<QueryName>`.
fn parse_installed_queries(endpoints: &Value, graph_name: &str) -> Vec<String> {
    let listing = endpoints.get("results").unwrap_or(endpoints);
    let prefix = format!("/query/{}/", graph_name);
    let mut names: Vec<String> = listing
        .as_object()
        .map(|map| {
            map.keys()
                .filter_map(|key| {
                    let path = key.split_once(' ').map_or(key.as_str(), |(_, p)| p);
                    path.strip_prefix(&prefix).map(str::to_string)
                })
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names.dedup();
    names
}

/// Vertex type names from a GSQL schema response
fn parse_vertex_types(schema: &Value) -> Vec<String> {
    schema
        .get("VertexTypes")
        .and_then(Value::as_array)
        .map(|types| {
            types
                .iter()
                .filter_map(|t| t.get("Name").and_then(Value::as_str).map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
