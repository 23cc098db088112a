//! Static catalog of the operations exposed to the conversation agent.
//!
//! Five entries are backed by installed queries on the graph engine; the two
//! listing helpers are backed by vertex scans.

use serde_json::{json, Map, Value};

/// JSON type of a tool parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    String,
    Integer,
}

impl ParamKind {
    fn schema_type(self) -> &'static str {
        match self {
            ParamKind::String => "string",
            ParamKind::Integer => "integer",
        }
    }
}

/// Default value of an optional parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Int(i64),
    Str(&'static str),
}

impl ParamDefault {
    fn to_value(self) -> Value {
        match self {
            ParamDefault::Int(n) => json!(n),
            ParamDefault::Str(s) => json!(s),
        }
    }
}

/// One formal parameter of an operation
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub description: &'static str,
    /// `None` means the parameter is required
    pub default: Option<ParamDefault>,
}

impl ParamSpec {
    pub fn is_optional(&self) -> bool {
        self.default.is_some()
    }

    /// Introspection form: `{name, type, optional, default?}`
    pub fn to_json(&self) -> Value {
        let mut param = json!({
            "name": self.name,
            "type": self.kind.schema_type(),
            "optional": self.is_optional(),
        });
        if let Some(default) = self.default {
            param["default"] = default.to_value();
        }
        param
    }
}

/// Immutable description of one operation
#[derive(Debug, Clone, Copy)]
pub struct QueryDescriptor {
    /// Name the agent calls the tool by
    pub tool_name: &'static str,
    /// Installed query on the graph engine; `None` for listing helpers
    pub installed_query: Option<&'static str>,
    pub description: &'static str,
    pub params: &'static [ParamSpec],
    pub example_questions: &'static [&'static str],
}

impl QueryDescriptor {
    pub fn is_domain_query(&self) -> bool {
        self.installed_query.is_some()
    }

    /// JSON Schema for the tool's arguments in OpenAI function-calling form
    pub fn input_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.params {
            let mut prop = json!({
                "type": param.kind.schema_type(),
                "description": param.description,
            });
            if let Some(default) = param.default {
                prop["default"] = default.to_value();
            }
            properties.insert(param.name.to_string(), prop);
        }
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| !p.is_optional())
            .map(|p| p.name)
            .collect();

        json!({
            "type": "object",
            "properties": properties,
            "required": required,
        })
    }
}

pub const GET_PERSON_INFO: &str = "get_person_info";
pub const FIND_CONNECTIONS: &str = "find_connections";
pub const GET_COMPANY_EMPLOYEES: &str = "get_company_employees";
pub const FIND_TOP_INFLUENCERS: &str = "find_top_influencers";
pub const GET_NETWORK_ANALYTICS: &str = "get_network_analytics";
pub const LIST_AVAILABLE_PEOPLE: &str = "list_available_people";
pub const LIST_AVAILABLE_COMPANIES: &str = "list_available_companies";

pub const DEFAULT_MAX_HOPS: i64 = 3;
pub const DEFAULT_LIMIT_COUNT: i64 = 10;

static CATALOG: [QueryDescriptor; 7] = [
    QueryDescriptor {
        tool_name: GET_PERSON_INFO,
        installed_query: Some("GetPersonInfo"),
        description: "Get detailed information about a specific person including their job, company, and location. Requires a person ID (e.g., person_001, person_002).",
        params: &[ParamSpec {
            name: "person_id",
            kind: ParamKind::String,
            description: "Person identifier, e.g. person_001",
            default: None,
        }],
        example_questions: &[
            "Tell me about person_001",
            "What information do you have on John Smith?",
            "Show me details for person_005",
        ],
    },
    QueryDescriptor {
        tool_name: FIND_CONNECTIONS,
        installed_query: Some("FindConnections"),
        description: "Find how two people are connected through friendships or work relationships",
        params: &[
            ParamSpec {
                name: "source_person",
                kind: ParamKind::String,
                description: "Person identifier to start from",
                default: None,
            },
            ParamSpec {
                name: "target_person",
                kind: ParamKind::String,
                description: "Person identifier to reach",
                default: None,
            },
            ParamSpec {
                name: "max_hops",
                kind: ParamKind::Integer,
                description: "Maximum path length to search",
                default: Some(ParamDefault::Int(DEFAULT_MAX_HOPS)),
            },
        ],
        example_questions: &[
            "How is person_001 connected to person_003?",
            "Find the connection between John and Sarah",
            "What's the relationship path between person_002 and person_008?",
        ],
    },
    QueryDescriptor {
        tool_name: GET_COMPANY_EMPLOYEES,
        installed_query: Some("GetCompanyEmployees"),
        description: "Get all employees working at a specific company, optionally filtered by department",
        params: &[
            ParamSpec {
                name: "company_name",
                kind: ParamKind::String,
                description: "Company name, e.g. TechCorp",
                default: None,
            },
            ParamSpec {
                name: "department",
                kind: ParamKind::String,
                description: "Department filter; empty for all departments",
                default: Some(ParamDefault::Str("")),
            },
        ],
        example_questions: &[
            "Who works at TechCorp?",
            "Show me all employees at DataSystems",
            "List engineering department employees at CloudVentures",
        ],
    },
    QueryDescriptor {
        tool_name: FIND_TOP_INFLUENCERS,
        installed_query: Some("FindTopInfluencers"),
        description: "Find the most influential people in the network based on connections and followers",
        params: &[ParamSpec {
            name: "limit_count",
            kind: ParamKind::Integer,
            description: "How many influencers to return",
            default: Some(ParamDefault::Int(DEFAULT_LIMIT_COUNT)),
        }],
        example_questions: &[
            "Who are the top influencers?",
            "Show me the 5 most connected people",
            "Find the most influential people in the network",
        ],
    },
    QueryDescriptor {
        tool_name: GET_NETWORK_ANALYTICS,
        installed_query: Some("GetNetworkAnalytics"),
        description: "Get overall statistics and analytics about the social network",
        params: &[],
        example_questions: &[
            "What are the network statistics?",
            "Give me an overview of the social network",
            "Show me network analytics",
        ],
    },
    QueryDescriptor {
        tool_name: LIST_AVAILABLE_PEOPLE,
        installed_query: None,
        description: "List all people in the database with their basic information (id, name, job title, age)",
        params: &[],
        example_questions: &["Who is in the network?"],
    },
    QueryDescriptor {
        tool_name: LIST_AVAILABLE_COMPANIES,
        installed_query: None,
        description: "List all companies in the database",
        params: &[],
        example_questions: &["Which companies are in the database?"],
    },
];

/// Look up an operation by tool name
pub fn describe(name: &str) -> Option<&'static QueryDescriptor> {
    CATALOG.iter().find(|d| d.tool_name == name)
}

/// All operations in a fixed order
pub fn list_all() -> &'static [QueryDescriptor] {
    &CATALOG
}

/// The operations backed by installed queries
pub fn domain_queries() -> impl Iterator<Item = &'static QueryDescriptor> {
    CATALOG.iter().filter(|d| d.is_domain_query())
}

/// Installed query names the graph must provide
pub fn installed_query_names() -> Vec<&'static str> {
    domain_queries().filter_map(|d| d.installed_query).collect()
}

/// Payload for the introspection endpoint: domain queries keyed by installed
/// name, plus static hints about the demo dataset.
pub fn introspection() -> Value {
    let mut queries = Map::new();
    for descriptor in domain_queries() {
        let Some(installed) = descriptor.installed_query else {
            continue;
        };
        queries.insert(
            installed.to_string(),
            json!({
                "tool": descriptor.tool_name,
                "description": descriptor.description,
                "parameters": descriptor.params.iter().map(ParamSpec::to_json).collect::<Vec<_>>(),
                "example_questions": descriptor.example_questions,
            }),
        );
    }

    json!({
        "queries": queries,
        "sample_data": {
            "people": [
                "person_001 (John Smith)",
                "person_002 (Sarah Johnson)",
                "person_003 (Mike Brown)"
            ],
            "companies": ["TechCorp", "DataSystems", "CloudVentures", "StartupX", "FinanceHub"]
        }
    })
}
