//! MCP `save_memory` tool parameter definition.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Parameters for the `save_memory` MCP tool.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct SaveMemoryParams {
    /// Content to store.
    #[schemars(
        description = "The content to store in memory, including any relevant details and context"
    )]
    pub text: String,

    /// Explicit user, overriding header-based detection.
    #[serde(default)]
    #[schemars(
        description = "Optional explicit user identifier. Leave empty to use automatic detection."
    )]
    pub user_id: Option<String>,
}
