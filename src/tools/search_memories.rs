//! MCP `search_memories` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `search_memories` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SearchMemoriesParams {
    /// Natural language description of what to look for.
    #[schemars(
        description = "Search query string describing what you're looking for. Can be natural language."
    )]
    pub query: String,

    /// Maximum results. Defaults to 3.
    #[serde(default)]
    #[schemars(
        description = "Maximum number of results to return (default: 3). Values below 1 are treated as 1 and values above 100 as 100."
    )]
    pub limit: Option<i64>,

    #[serde(default)]
    #[schemars(
        description = "Optional explicit user identifier. Leave empty to use automatic detection."
    )]
    pub user_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_description_states_the_accepted_range() {
        let schema = serde_json::to_value(schemars::schema_for!(SearchMemoriesParams)).unwrap();
        let description = schema["properties"]["limit"]["description"]
            .as_str()
            .unwrap();
        assert!(description.contains("default: 3"));
        assert!(description.contains("below 1 are treated as 1"));
        assert!(description.contains("above 100 as 100"));
    }
}
