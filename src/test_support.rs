//! In-crate fakes for the graph engine and the hosted model.

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use crate::error::{GraphChatError, Result};
use crate::graph::{GraphBackend, Vertices};
use crate::llm::{ChatMessage, ChatModel, ModelTurn, ToolDefinition};

/// Graph backend with canned responses that records every query call.
#[derive(Default)]
pub struct FakeGraph {
    queries: HashMap<String, Vec<Value>>,
    vertices: HashMap<String, Vertices>,
    /// Simulate a transport fault on every call
    pub fail: bool,
    pub calls: Mutex<Vec<(String, Map<String, Value>)>>,
}

impl FakeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Answer `name` with a single result block `{key: value}`
    pub fn with_query(mut self, name: &str, key: &str, value: Value) -> Self {
        let mut block = Map::new();
        block.insert(key.to_string(), value);
        self.queries.insert(name.to_string(), vec![Value::Object(block)]);
        self
    }

    pub fn with_vertices(mut self, vertex_type: &str, entries: &[(&str, Value)]) -> Self {
        let vertices = entries
            .iter()
            .map(|(id, attrs)| (id.to_string(), attrs.as_object().cloned().unwrap_or_default()))
            .collect();
        self.vertices.insert(vertex_type.to_string(), vertices);
        self
    }

    /// The demo people used across tests
    pub fn with_demo_people(self) -> Self {
        self.with_vertices(
            "Person",
            &[
                ("person_001", json!({"first_name": "John", "last_name": "Smith", "job_title": "Engineer", "age": 34})),
                ("person_002", json!({"first_name": "Sarah", "last_name": "Johnson", "job_title": "Designer", "age": 29})),
                ("person_003", json!({"first_name": "Mike", "last_name": "Brown", "job_title": "Manager", "age": 41})),
            ],
        )
    }

    pub fn recorded_calls(&self) -> Vec<(String, Map<String, Value>)> {
        self.calls.lock().unwrap().clone()
    }

    fn fault(&self) -> GraphChatError {
        GraphChatError::QueryExecution("connection reset by peer".to_string())
    }
}

#[async_trait]
impl GraphBackend for FakeGraph {
    async fn echo(&self) -> Result<String> {
        if self.fail {
            return Err(self.fault());
        }
        Ok("Hello GSQL".to_string())
    }

    async fn run_installed_query(&self, name: &str, params: &Map<String, Value>) -> Result<Vec<Value>> {
        self.calls.lock().unwrap().push((name.to_string(), params.clone()));
        if self.fail {
            return Err(self.fault());
        }
        Ok(self.queries.get(name).cloned().unwrap_or_default())
    }

    async fn get_vertices(&self, vertex_type: &str) -> Result<Vertices> {
        if self.fail {
            return Err(self.fault());
        }
        Ok(self.vertices.get(vertex_type).cloned().unwrap_or_default())
    }

    async fn installed_queries(&self) -> Result<Vec<String>> {
        if self.fail {
            return Err(self.fault());
        }
        Ok(self.queries.keys().cloned().collect())
    }

    async fn vertex_types(&self) -> Result<Vec<String>> {
        if self.fail {
            return Err(self.fault());
        }
        Ok(self.vertices.keys().cloned().collect())
    }
}

/// Model that replays a fixed script of turns and records what it was sent.
pub struct ScriptedModel {
    turns: Mutex<VecDeque<Result<ModelTurn>>>,
    /// Turn returned once the script runs out
    fallback: Option<ModelTurn>,
    pub requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(turns: Vec<Result<ModelTurn>>) -> Self {
        Self {
            turns: Mutex::new(turns.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// A model that never stops asking for the same tool
    pub fn looping(turn: ModelTurn) -> Self {
        Self {
            turns: Mutex::new(VecDeque::new()),
            fallback: Some(turn),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage], _tools: &[ToolDefinition]) -> Result<ModelTurn> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if let Some(turn) = self.turns.lock().unwrap().pop_front() {
            return turn;
        }
        self.fallback
            .clone()
            .ok_or_else(|| GraphChatError::Llm("script exhausted".to_string()))
    }
}
