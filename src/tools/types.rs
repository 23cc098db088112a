use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

/// Outcome tag of a tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    NotFound,
    Error,
}

/// A tool call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInvocation {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }
}

/// Uniform envelope returned by every tool.
///
/// The payload is only reachable through `success`, so a `not_found` or
/// `error` result can never carry a data key.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    status: ToolStatus,
    message: String,
    payload: Option<Payload>,
}

/// Payload keys whose envelope also reports an item `count`
const COUNTED_KEYS: [&str; 4] = ["employees", "influencers", "people", "companies"];

#[derive(Debug, Clone, PartialEq)]
struct Payload {
    key: &'static str,
    data: Value,
}

impl ToolResult {
    pub fn success(key: &'static str, data: Value, message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Success,
            message: message.into(),
            payload: Some(Payload { key, data }),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::NotFound,
            message: message.into(),
            payload: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: ToolStatus::Error,
            message: message.into(),
            payload: None,
        }
    }

    pub fn status(&self) -> ToolStatus {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Data key of a success result (`person`, `connections`, ...)
    pub fn payload_key(&self) -> Option<&'static str> {
        self.payload.as_ref().map(|p| p.key)
    }

    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref().map(|p| &p.data)
    }

    /// Number of items for the roster and ranking payloads
    pub fn count(&self) -> Option<usize> {
        let payload = self.payload.as_ref()?;
        if !COUNTED_KEYS.contains(&payload.key) {
            return None;
        }
        payload.data.as_array().map(Vec::len)
    }

    /// JSON text fed back to the model as a tool observation
    pub fn to_observation(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| {
            format!(r#"{{"status": "error", "message": "{}"}}"#, self.message.replace('"', "'"))
        })
    }
}

impl Serialize for ToolResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry("status", &self.status)?;
        if let Some(payload) = &self.payload {
            map.serialize_entry(payload.key, &payload.data)?;
        }
        if let Some(count) = self.count() {
            map.serialize_entry("count", &count)?;
        }
        map.serialize_entry("message", &self.message)?;
        map.end()
    }
}
