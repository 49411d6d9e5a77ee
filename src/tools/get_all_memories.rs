use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct GetAllMemoriesParams {
    #[serde(default)]
    #[schemars(
        description = "Optional explicit user identifier. Leave empty to use automatic detection."
    )]
    pub user_id: Option<String>,
}
