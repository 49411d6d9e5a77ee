pub mod delete_all_memories;
pub mod get_all_memories;
pub mod save_memory;
pub mod search_memories;
pub mod service;

use delete_all_memories::DeleteAllMemoriesParams;
use get_all_memories::GetAllMemoriesParams;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::service::{RequestContext, RoleServer};
use rmcp::{tool, tool_handler, tool_router, ServerHandler};
use save_memory::SaveMemoryParams;
use search_memories::SearchMemoriesParams;

pub use service::MemoryService;

use crate::identity::RequestIdentityContext;

/// The MCP tool handler. Each tool pulls the calling request's identity context out of
/// the MCP request context and hands off to [`MemoryService`].
///
/// One instance is created per MCP session; all of them share the same backend.
#[derive(Clone)]
pub struct MemoryTools {
    tool_router: ToolRouter<Self>,
    service: MemoryService,
}

#[tool_router]
impl MemoryTools {
    pub fn new(service: MemoryService) -> Self {
        Self {
            tool_router: Self::tool_router(),
            service,
        }
    }

    #[tool(description = "Save information to long-term memory for the current user. Stores any type of information with semantic indexing for later retrieval. The user is detected automatically in multi-user deployments.")]
    async fn save_memory(
        &self,
        Parameters(params): Parameters<SaveMemoryParams>,
        ctx: RequestContext<RoleServer>,
    ) -> String {
        let identity = RequestIdentityContext::from_request(&ctx);
        self.service
            .save(params.text, params.user_id.as_deref(), &identity)
            .await
    }

    #[tool(description = "Get all stored memories for the current user. Returns a JSON list of memory texts.")]
    async fn get_all_memories(
        &self,
        Parameters(params): Parameters<GetAllMemoriesParams>,
        ctx: RequestContext<RoleServer>,
    ) -> String {
        let identity = RequestIdentityContext::from_request(&ctx);
        self.service
            .get_all(params.user_id.as_deref(), &identity)
            .await
    }

    #[tool(description = "Search the current user's memories with semantic search. Returns a JSON list of memory texts ranked by relevance.")]
    async fn search_memories(
        &self,
        Parameters(params): Parameters<SearchMemoriesParams>,
        ctx: RequestContext<RoleServer>,
    ) -> String {
        let identity = RequestIdentityContext::from_request(&ctx);
        self.service
            .search(params.query, params.limit, params.user_id.as_deref(), &identity)
            .await
    }

    #[tool(description = "Delete all stored memories for the current user. Requires confirm=true; this cannot be undone.")]
    async fn delete_all_memories(
        &self,
        Parameters(params): Parameters<DeleteAllMemoriesParams>,
        ctx: RequestContext<RoleServer>,
    ) -> String {
        let identity = RequestIdentityContext::from_request(&ctx);
        self.service
            .delete_all(params.confirm, params.user_id.as_deref(), &identity)
            .await
    }
}

#[tool_handler]
impl ServerHandler for MemoryTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Per-user long-term memory. Use save_memory to store facts, search_memories \
                 to recall them, get_all_memories to list everything, and delete_all_memories \
                 (with confirm=true) to wipe the current user's memories."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .build(),
            ..Default::default()
        }
    }
}
