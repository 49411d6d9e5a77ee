use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Serialize, Deserialize, JsonSchema)]
pub struct DeleteAllMemoriesParams {
    #[serde(default)]
    #[schemars(
        description = "Must be set to true to confirm deletion. Safety guard against accidental deletion."
    )]
    pub confirm: bool,

    #[serde(default)]
    #[schemars(
        description = "Optional explicit user identifier. Leave empty to use automatic detection."
    )]
    pub user_id: Option<String>,
}
