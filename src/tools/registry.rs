use regex::Regex;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;

use super::types::{ToolInvocation, ToolResult};
use crate::catalog::{self, DEFAULT_LIMIT_COUNT, DEFAULT_MAX_HOPS};
use crate::error::GraphChatError;
use crate::graph::GraphBackend;
use crate::llm::ToolDefinition;

const PERSON_VERTEX: &str = "Person";
const COMPANY_VERTEX: &str = "Company";

#[derive(Debug, Deserialize)]
struct PersonInfoArgs {
    person_id: String,
}

// Optional parameters accept both an absent key and an explicit null.
#[derive(Debug, Deserialize)]
struct ConnectionArgs {
    source_person: String,
    target_person: String,
    #[serde(default)]
    max_hops: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CompanyEmployeesArgs {
    company_name: String,
    #[serde(default)]
    department: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InfluencerArgs {
    #[serde(default)]
    limit_count: Option<i64>,
}

/// Binds every catalog entry to a graph-backed operation.
///
/// No operation returns `Err`: backend failures become `status: error`
/// envelopes and empty results become `status: not_found`.
pub struct ToolRegistry {
    graph: Arc<dyn GraphBackend>,
    /// When set, person references that do not match are treated as display
    /// names and resolved against the Person vertices.
    person_id_pattern: Option<Regex>,
}

impl ToolRegistry {
    pub fn new(graph: Arc<dyn GraphBackend>) -> Self {
        Self {
            graph,
            person_id_pattern: None,
        }
    }

    /// Enable server-side name to id resolution for id-based tools
    pub fn with_name_resolution(mut self, person_id_pattern: Regex) -> Self {
        self.person_id_pattern = Some(person_id_pattern);
        self
    }

    /// Tool descriptors handed to the model, in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        catalog::list_all()
            .iter()
            .map(ToolDefinition::from_descriptor)
            .collect()
    }

    /// Dispatch one invocation to its operation
    pub async fn invoke(&self, invocation: &ToolInvocation) -> ToolResult {
        let name = invocation.name.as_str();
        let result = match name {
            catalog::GET_PERSON_INFO => match parse_args::<PersonInfoArgs>(name, &invocation.arguments) {
                Ok(args) => self.get_person_info(&args.person_id).await,
                Err(result) => result,
            },
            catalog::FIND_CONNECTIONS => match parse_args::<ConnectionArgs>(name, &invocation.arguments) {
                Ok(args) => {
                    self.find_connections(
                        &args.source_person,
                        &args.target_person,
                        Some(args.max_hops.unwrap_or(DEFAULT_MAX_HOPS)),
                    )
                        .await
                }
                Err(result) => result,
            },
            catalog::GET_COMPANY_EMPLOYEES => {
                match parse_args::<CompanyEmployeesArgs>(name, &invocation.arguments) {
                    Ok(args) => {
                        self.get_company_employees(&args.company_name, Some(args.department.as_deref().unwrap_or("")))
                            .await
                    }
                    Err(result) => result,
                }
            }
            catalog::FIND_TOP_INFLUENCERS => match parse_args::<InfluencerArgs>(name, &invocation.arguments) {
                Ok(args) => {
                    self.find_top_influencers(Some(args.limit_count.unwrap_or(DEFAULT_LIMIT_COUNT)))
                        .await
                }
                Err(result) => result,
            },
            catalog::GET_NETWORK_ANALYTICS => self.get_network_analytics().await,
            catalog::LIST_AVAILABLE_PEOPLE => self.list_available_people().await,
            catalog::LIST_AVAILABLE_COMPANIES => self.list_available_companies().await,
            _ => ToolResult::error(format!("Unknown tool: {}", name)),
        };

        log::info!("Tool {} -> {:?}: {}", name, result.status(), result.message());
        result
    }

    pub async fn get_person_info(&self, person_id: &str) -> ToolResult {
        let person_id = self.resolve_person(person_id).await;
        let mut params = Map::new();
        params.insert("person_id".to_string(), json!(person_id));

        let blocks = match self.run("GetPersonInfo", &params).await {
            Ok(blocks) => blocks,
            Err(e) => return ToolResult::error(format!("Error retrieving person info: {}", e)),
        };

        let person = match aggregate(&blocks, "@@result") {
            Some(Value::Array(items)) => non_empty(items.first()),
            other => non_empty(other),
        };

        match person {
            Some(person) => {
                let name = display_name(person.as_object()).unwrap_or_else(|| person_id.clone());
                ToolResult::success("person", person, format!("Found information for {}", name))
            }
            None => ToolResult::not_found(format!("No person found with ID: {}", person_id)),
        }
    }

    pub async fn find_connections(
        &self,
        source_person: &str,
        target_person: &str,
        max_hops: Option<i64>,
    ) -> ToolResult {
        let max_hops = max_hops.unwrap_or(DEFAULT_MAX_HOPS);
        let source_person = self.resolve_person(source_person).await;
        let target_person = self.resolve_person(target_person).await;

        let mut params = Map::new();
        params.insert("source_person".to_string(), json!(source_person));
        params.insert("target_person".to_string(), json!(target_person));
        params.insert("max_hops".to_string(), json!(max_hops));

        let blocks = match self.run("FindConnections", &params).await {
            Ok(blocks) => blocks,
            Err(e) => return ToolResult::error(format!("Error finding connections: {}", e)),
        };

        match non_empty(aggregate(&blocks, "@@paths")) {
            Some(paths) => {
                let n = item_count(&paths);
                ToolResult::success(
                    "connections",
                    paths,
                    format!(
                        "Found {} connection(s) between {} and {}",
                        n, source_person, target_person
                    ),
                )
            }
            None => ToolResult::not_found(format!(
                "No connections found between {} and {} within {} hops",
                source_person, target_person, max_hops
            )),
        }
    }

    pub async fn get_company_employees(&self, company_name: &str, department: Option<&str>) -> ToolResult {
        let department = department.unwrap_or("");
        let mut params = Map::new();
        params.insert("company_name".to_string(), json!(company_name));
        params.insert("department".to_string(), json!(department));

        let blocks = match self.run("GetCompanyEmployees", &params).await {
            Ok(blocks) => blocks,
            Err(e) => return ToolResult::error(format!("Error retrieving company employees: {}", e)),
        };

        let dept_text = if department.is_empty() {
            String::new()
        } else {
            format!(" in {} department", department)
        };

        match non_empty(aggregate(&blocks, "@@employees")) {
            Some(employees) => {
                let n = item_count(&employees);
                ToolResult::success(
                    "employees",
                    employees,
                    format!("Found {} employee(s) at {}{}", n, company_name, dept_text),
                )
            }
            None => ToolResult::not_found(format!("No employees found at {}{}", company_name, dept_text)),
        }
    }

    /// The limit is forwarded to the query as-is; the result is never truncated here.
    pub async fn find_top_influencers(&self, limit_count: Option<i64>) -> ToolResult {
        let mut params = Map::new();
        params.insert(
            "limit_count".to_string(),
            json!(limit_count.unwrap_or(DEFAULT_LIMIT_COUNT)),
        );

        let blocks = match self.run("FindTopInfluencers", &params).await {
            Ok(blocks) => blocks,
            Err(e) => return ToolResult::error(format!("Error finding top influencers: {}", e)),
        };

        match non_empty(aggregate(&blocks, "@@influencers")) {
            Some(influencers) => {
                let n = item_count(&influencers);
                ToolResult::success(
                    "influencers",
                    influencers,
                    format!("Found top {} influencer(s) in the network", n),
                )
            }
            None => ToolResult::not_found("No influencers found in the network"),
        }
    }

    pub async fn get_network_analytics(&self) -> ToolResult {
        let blocks = match self.run("GetNetworkAnalytics", &Map::new()).await {
            Ok(blocks) => blocks,
            Err(e) => return ToolResult::error(format!("Error retrieving network analytics: {}", e)),
        };

        match non_empty(aggregate(&blocks, "@@metrics")) {
            Some(metrics) => ToolResult::success("metrics", metrics, "Network analytics retrieved successfully"),
            None => ToolResult::not_found("No network analytics available"),
        }
    }

    pub async fn list_available_people(&self) -> ToolResult {
        let vertices = match self.graph.get_vertices(PERSON_VERTEX).await {
            Ok(vertices) => vertices,
            Err(e) => return ToolResult::error(format!("Error listing people: {}", e)),
        };
        if vertices.is_empty() {
            return ToolResult::not_found("No people found in the database");
        }

        let people: Vec<Value> = vertices
            .iter()
            .map(|(id, attrs)| {
                json!({
                    "id": id,
                    "name": display_name(Some(attrs)).unwrap_or_default(),
                    "job_title": attrs.get("job_title").cloned().unwrap_or_else(|| json!("")),
                    "age": attrs.get("age").cloned().unwrap_or_else(|| json!(0)),
                })
            })
            .collect();
        let n = people.len();
        ToolResult::success("people", Value::Array(people), format!("Found {} people in the database", n))
    }

    pub async fn list_available_companies(&self) -> ToolResult {
        let vertices = match self.graph.get_vertices(COMPANY_VERTEX).await {
            Ok(vertices) => vertices,
            Err(e) => return ToolResult::error(format!("Error listing companies: {}", e)),
        };
        if vertices.is_empty() {
            return ToolResult::not_found("No companies found in the database");
        }

        let companies: Vec<Value> = vertices
            .iter()
            .map(|(id, attrs)| {
                let field = |name: &str| attrs.get(name).cloned().unwrap_or_else(|| json!(""));
                json!({
                    "id": id,
                    "name": field("name"),
                    "industry": field("industry"),
                    "size": field("size"),
                })
            })
            .collect();
        let n = companies.len();
        ToolResult::success(
            "companies",
            Value::Array(companies),
            format!("Found {} companies in the database", n),
        )
    }

    async fn run(&self, query: &str, params: &Map<String, Value>) -> Result<Vec<Value>, GraphChatError> {
        log::debug!("Running installed query {} with {:?}", query, params);
        self.graph.run_installed_query(query, params).await
    }

    /// Map a display name to a person id when it does not already look like one.
    ///
    /// Only a unique case-insensitive full-name match is substituted; anything
    /// else is passed through for the query to report as not found.
    async fn resolve_person(&self, reference: &str) -> String {
        let Some(pattern) = &self.person_id_pattern else {
            return reference.to_string();
        };
        if pattern.is_match(reference) {
            return reference.to_string();
        }

        let people = match self.graph.get_vertices(PERSON_VERTEX).await {
            Ok(people) => people,
            Err(e) => {
                log::warn!("Name resolution for '{}' skipped: {}", reference, e);
                return reference.to_string();
            }
        };

        let wanted = normalize_name(reference);
        let matches: Vec<&String> = people
            .iter()
            .filter(|(_, attrs)| {
                display_name(Some(attrs)).map_or(false, |name| normalize_name(&name) == wanted)
            })
            .map(|(id, _)| id)
            .collect();

        match matches.as_slice() {
            [id] => {
                log::info!("Resolved person '{}' to {}", reference, id);
                (*id).clone()
            }
            [] => reference.to_string(),
            _ => {
                log::debug!("'{}' matches {} people, leaving unresolved", reference, matches.len());
                reference.to_string()
            }
        }
    }
}

/// Decode tool arguments, treating a missing argument object as empty
fn parse_args<T: serde::de::DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T, ToolResult> {
    let arguments = if arguments.is_null() {
        Value::Object(Map::new())
    } else {
        arguments.clone()
    };
    serde_json::from_value(arguments)
        .map_err(|e| ToolResult::error(format!("Invalid arguments for {}: {}", tool, e)))
}

/// Find an aggregation key in the first result block that carries it
fn aggregate<'a>(blocks: &'a [Value], key: &str) -> Option<&'a Value> {
    blocks.iter().find_map(|block| block.get(key))
}

fn non_empty(value: Option<&Value>) -> Option<Value> {
    match value? {
        Value::Null => None,
        Value::Array(items) if items.is_empty() => None,
        Value::Object(map) if map.is_empty() => None,
        other => Some(other.clone()),
    }
}

fn item_count(value: &Value) -> usize {
    match value {
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        _ => 1,
    }
}

/// "first last" from vertex or query attributes
fn display_name(attrs: Option<&Map<String, Value>>) -> Option<String> {
    let attrs = attrs?;
    let part = |key: &str| attrs.get(key).and_then(Value::as_str).unwrap_or("").trim().to_string();
    let name = format!("{} {}", part("first_name"), part("last_name"));
    let name = name.trim();
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

fn normalize_name(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeGraph;
    use crate::tools::ToolStatus;

    const ALL_TOOLS: [&str; 7] = [
        catalog::GET_PERSON_INFO,
        catalog::FIND_CONNECTIONS,
        catalog::GET_COMPANY_EMPLOYEES,
        catalog::FIND_TOP_INFLUENCERS,
        catalog::GET_NETWORK_ANALYTICS,
        catalog::LIST_AVAILABLE_PEOPLE,
        catalog::LIST_AVAILABLE_COMPANIES,
    ];

    const PAYLOAD_KEYS: [&str; 7] = [
        "person",
        "connections",
        "employees",
        "influencers",
        "metrics",
        "people",
        "companies",
    ];

    fn minimal_args(tool: &str) -> Value {
        match tool {
            catalog::GET_PERSON_INFO => json!({"person_id": "person_001"}),
            catalog::FIND_CONNECTIONS => json!({"source_person": "person_001", "target_person": "person_003"}),
            catalog::GET_COMPANY_EMPLOYEES => json!({"company_name": "TechCorp"}),
            _ => json!({}),
        }
    }

    fn registry(graph: FakeGraph) -> (ToolRegistry, Arc<FakeGraph>) {
        let graph = Arc::new(graph);
        (ToolRegistry::new(graph.clone()), graph)
    }

    fn assert_no_payload_keys(result: &ToolResult) {
        let value = serde_json::to_value(result).unwrap();
        for key in PAYLOAD_KEYS {
            assert!(value.get(key).is_none(), "unexpected {} in {}", key, value);
        }
    }

    #[tokio::test]
    async fn test_missing_aggregation_is_not_found_for_every_tool() {
        let (registry, _) = registry(FakeGraph::new());
        for tool in ALL_TOOLS {
            let result = registry.invoke(&ToolInvocation::new(tool, minimal_args(tool))).await;
            assert_eq!(result.status(), ToolStatus::NotFound, "{}", tool);
            assert!(result.payload().is_none());
            assert_no_payload_keys(&result);
        }
    }

    #[tokio::test]
    async fn test_empty_aggregation_is_not_found() {
        let graph = FakeGraph::new()
            .with_query("GetPersonInfo", "@@result", json!([]))
            .with_query("FindConnections", "@@paths", json!([]))
            .with_query("GetCompanyEmployees", "@@employees", json!([]))
            .with_query("FindTopInfluencers", "@@influencers", json!([]))
            .with_query("GetNetworkAnalytics", "@@metrics", json!({}))
            .with_vertices("Person", &[])
            .with_vertices("Company", &[]);
        let (registry, _) = registry(graph);
        for tool in ALL_TOOLS {
            let result = registry.invoke(&ToolInvocation::new(tool, minimal_args(tool))).await;
            assert_eq!(result.status(), ToolStatus::NotFound, "{}", tool);
            assert_no_payload_keys(&result);
        }
    }

    #[tokio::test]
    async fn test_backend_fault_is_error_for_every_tool() {
        let (registry, _) = registry(FakeGraph::failing());
        for tool in ALL_TOOLS {
            let result = registry.invoke(&ToolInvocation::new(tool, minimal_args(tool))).await;
            assert_eq!(result.status(), ToolStatus::Error, "{}", tool);
            assert!(!result.message().is_empty());
            assert!(result.message().contains("connection reset"));
            assert_no_payload_keys(&result);
        }
    }

    #[tokio::test]
    async fn test_success_carries_payload_key_for_every_tool() {
        let graph = FakeGraph::new()
            .with_query("GetPersonInfo", "@@result", json!([{"first_name": "John", "last_name": "Smith"}]))
            .with_query("FindConnections", "@@paths", json!([["person_001", "person_002", "person_003"]]))
            .with_query("GetCompanyEmployees", "@@employees", json!([{"id": "person_001"}]))
            .with_query("FindTopInfluencers", "@@influencers", json!([{"id": "person_002", "score": 12}]))
            .with_query("GetNetworkAnalytics", "@@metrics", json!({"total_people": 10}))
            .with_demo_people()
            .with_vertices("Company", &[("company_001", json!({"name": "TechCorp", "industry": "Software", "size": "Large"}))]);
        let (registry, _) = registry(graph);
        for (tool, key) in ALL_TOOLS.iter().zip(PAYLOAD_KEYS) {
            let result = registry.invoke(&ToolInvocation::new(*tool, minimal_args(tool))).await;
            assert_eq!(result.status(), ToolStatus::Success, "{}", tool);
            assert_eq!(result.payload_key(), Some(key));
            assert!(serde_json::to_value(&result).unwrap().get(key).is_some());
        }
    }

    #[tokio::test]
    async fn test_person_info_message_names_the_person() {
        let graph = FakeGraph::new().with_query(
            "GetPersonInfo",
            "@@result",
            json!([{"first_name": "John", "last_name": "Smith", "job_title": "Engineer"}]),
        );
        let (registry, graph) = registry(graph);
        let result = registry.get_person_info("person_001").await;
        assert_eq!(result.status(), ToolStatus::Success);
        assert!(result.message().contains("John Smith"));
        assert_eq!(result.payload().unwrap()["job_title"], "Engineer");
        assert_eq!(graph.recorded_calls()[0].1["person_id"], "person_001");
    }

    #[tokio::test]
    async fn test_max_hops_defaults_to_three() {
        let (registry, graph) = registry(FakeGraph::new());
        let omitted = registry
            .invoke(&ToolInvocation::new(
                catalog::FIND_CONNECTIONS,
                json!({"source_person": "person_001", "target_person": "person_003"}),
            ))
            .await;
        let explicit = registry
            .invoke(&ToolInvocation::new(
                catalog::FIND_CONNECTIONS,
                json!({"source_person": "person_001", "target_person": "person_003", "max_hops": 3}),
            ))
            .await;

        assert_eq!(omitted, explicit);
        let calls = graph.recorded_calls();
        assert_eq!(calls[0].1, calls[1].1);
        assert_eq!(calls[0].1["max_hops"], 3);
        assert!(omitted.message().contains("within 3 hops"));
    }

    #[tokio::test]
    async fn test_empty_department_same_as_omitted() {
        let graph = FakeGraph::new().with_query(
            "GetCompanyEmployees",
            "@@employees",
            json!([{"id": "person_001"}, {"id": "person_004"}]),
        );
        let (registry, graph) = registry(graph);

        let omitted = registry.get_company_employees("TechCorp", None).await;
        let empty = registry.get_company_employees("TechCorp", Some("")).await;
        assert_eq!(omitted, empty);
        assert_eq!(omitted.message(), "Found 2 employee(s) at TechCorp");
        assert!(!omitted.message().contains("department"));

        let calls = graph.recorded_calls();
        assert_eq!(calls[0].1, calls[1].1);

        let filtered = registry.get_company_employees("TechCorp", Some("Engineering")).await;
        assert_eq!(filtered.message(), "Found 2 employee(s) at TechCorp in Engineering department");
    }

    #[tokio::test]
    async fn test_department_clause_in_not_found_message() {
        let (registry, _) = registry(FakeGraph::new());
        let result = registry.get_company_employees("StartupX", Some("Legal")).await;
        assert_eq!(result.message(), "No employees found at StartupX in Legal department");
        let result = registry.get_company_employees("StartupX", Some("")).await;
        assert_eq!(result.message(), "No employees found at StartupX");
    }

    #[tokio::test]
    async fn test_influencer_limit_defaults_and_passes_through() {
        let twelve: Vec<Value> = (0..12).map(|i| json!({"id": format!("person_{:03}", i)})).collect();
        let graph = FakeGraph::new().with_query("FindTopInfluencers", "@@influencers", json!(twelve));
        let (registry, graph) = registry(graph);

        let result = registry
            .invoke(&ToolInvocation::new(catalog::FIND_TOP_INFLUENCERS, json!({})))
            .await;
        assert_eq!(graph.recorded_calls()[0].1["limit_count"], 10);
        // The backend over-delivered; nothing is truncated locally.
        assert_eq!(result.count(), Some(12));
        assert_eq!(result.message(), "Found top 12 influencer(s) in the network");
    }

    #[tokio::test]
    async fn test_list_people_shapes_entries() {
        let (registry, _) = registry(FakeGraph::new().with_demo_people());
        let result = registry.list_available_people().await;
        assert_eq!(result.message(), "Found 3 people in the database");
        let first = &result.payload().unwrap()[0];
        assert_eq!(first["id"], "person_001");
        assert_eq!(first["name"], "John Smith");
        assert_eq!(first["job_title"], "Engineer");
        assert_eq!(first["age"], 34);
    }

    #[tokio::test]
    async fn test_unknown_tool_and_bad_arguments_are_errors() {
        let (registry, graph) = registry(FakeGraph::new());
        let result = registry.invoke(&ToolInvocation::new("drop_graph", json!({}))).await;
        assert_eq!(result.status(), ToolStatus::Error);
        assert!(result.message().contains("Unknown tool"));

        let result = registry
            .invoke(&ToolInvocation::new(catalog::GET_PERSON_INFO, json!({"id": "person_001"})))
            .await;
        assert_eq!(result.status(), ToolStatus::Error);
        assert!(result.message().contains("person_id"));
        assert!(graph.recorded_calls().is_empty());
    }

    #[tokio::test]
    async fn test_no_argument_tools_accept_null_arguments() {
        let graph = FakeGraph::new().with_query("GetNetworkAnalytics", "@@metrics", json!([{"total_people": 10}]));
        let (registry, _) = registry(graph);
        let result = registry
            .invoke(&ToolInvocation::new(catalog::GET_NETWORK_ANALYTICS, Value::Null))
            .await;
        assert_eq!(result.status(), ToolStatus::Success);
    }

    #[tokio::test]
    async fn test_null_optional_arguments_use_defaults() {
        let (registry, graph) = registry(FakeGraph::new());
        let with_null = registry
            .invoke(&ToolInvocation::new(
                catalog::FIND_CONNECTIONS,
                json!({"source_person": "person_001", "target_person": "person_002", "max_hops": null}),
            ))
            .await;
        assert_eq!(with_null.status(), ToolStatus::NotFound);
        assert!(with_null.message().contains("within 3 hops"));

        let employees = registry
            .invoke(&ToolInvocation::new(
                catalog::GET_COMPANY_EMPLOYEES,
                json!({"company_name": "TechCorp", "department": null}),
            ))
            .await;
        assert_eq!(employees.message(), "No employees found at TechCorp");

        let influencers = registry
            .invoke(&ToolInvocation::new(catalog::FIND_TOP_INFLUENCERS, json!({"limit_count": null})))
            .await;
        assert_eq!(influencers.status(), ToolStatus::NotFound);

        let calls = graph.recorded_calls();
        assert_eq!(calls[0].1["max_hops"], 3);
        assert_eq!(calls[1].1["department"], "");
        assert_eq!(calls[2].1["limit_count"], 10);
    }

    #[tokio::test]
    async fn test_blank_person_record_is_not_found() {
        for record in [json!([null]), json!([{}]), json!({})] {
            let (registry, _) = registry(FakeGraph::new().with_query("GetPersonInfo", "@@result", record.clone()));
            let result = registry.get_person_info("person_001").await;
            assert_eq!(result.status(), ToolStatus::NotFound, "{}", record);
            assert_eq!(result.message(), "No person found with ID: person_001");
            assert_no_payload_keys(&result);
        }
    }

    #[tokio::test]
    async fn test_display_name_resolved_to_id() {
        let graph = Arc::new(FakeGraph::new().with_demo_people());
        let registry = ToolRegistry::new(graph.clone()).with_name_resolution(Regex::new(r"^person_\d+$").unwrap());

        registry.find_connections("john  smith", "person_002", None).await;
        registry.get_person_info("Nobody Here").await;

        let calls = graph.recorded_calls();
        assert_eq!(calls[0].1["source_person"], "person_001");
        assert_eq!(calls[0].1["target_person"], "person_002");
        assert_eq!(calls[1].1["person_id"], "Nobody Here");
    }

    #[tokio::test]
    async fn test_ambiguous_name_left_unresolved() {
        let graph = Arc::new(FakeGraph::new().with_vertices(
            "Person",
            &[
                ("person_001", json!({"first_name": "Alex", "last_name": "Lee"})),
                ("person_007", json!({"first_name": "Alex", "last_name": "Lee"})),
            ],
        ));
        let registry = ToolRegistry::new(graph.clone()).with_name_resolution(Regex::new(r"^person_\d+$").unwrap());
        registry.get_person_info("Alex Lee").await;
        assert_eq!(graph.recorded_calls()[0].1["person_id"], "Alex Lee");
    }

    #[test]
    fn test_definitions_cover_catalog() {
        let registry = ToolRegistry::new(Arc::new(FakeGraph::new()));
        let names: Vec<String> = registry.definitions().into_iter().map(|d| d.function.name).collect();
        assert_eq!(names, ALL_TOOLS.iter().map(|s| s.to_string()).collect::<Vec<_>>());
    }
}
