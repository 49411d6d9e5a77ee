//! Request-scoped identity slot.
//!
//! A [`RequestIdentityContext`] is created fresh for each inbound HTTP request by the
//! header middleware and inserted into that request's extensions. The streamable HTTP
//! transport hands the request [`Parts`] to the MCP request context, so a tool reads the
//! slot belonging to *its* request via [`RequestIdentityContext::from_request`]. Nothing
//! is stored in thread-locals or globals; the slot is dropped with the request.

use std::sync::{Arc, OnceLock};

use axum::http::request::Parts;
use rmcp::service::{RequestContext, RoleServer};

use super::UserId;

/// Write-once, read-many identity holder for a single request.
///
/// Clones share the same slot, so a value set by the middleware is visible to every
/// layer that receives a clone of that request's context, and to nothing else.
#[derive(Debug, Clone, Default)]
pub struct RequestIdentityContext {
    slot: Arc<OnceLock<UserId>>,
}

impl RequestIdentityContext {
    /// A fresh, unset context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the request's identity. Returns `false` (and keeps the first value) if the
    /// slot was already set.
    pub fn set(&self, user_id: UserId) -> bool {
        match self.slot.set(user_id) {
            Ok(()) => true,
            Err(rejected) => {
                tracing::warn!(
                    rejected = %rejected,
                    "request identity already set, keeping first value"
                );
                false
            }
        }
    }

    pub fn get(&self) -> Option<UserId> {
        self.slot.get().cloned()
    }

    /// The context attached to the HTTP request behind `parts`, or an unset one.
    pub fn from_parts(parts: &Parts) -> Self {
        parts.extensions.get::<Self>().cloned().unwrap_or_default()
    }

    /// The context of the HTTP request that carried this MCP call.
    ///
    /// Transports without an HTTP surface (stdio) carry no request parts, which yields an
    /// unset context and resolution falls through to the process default.
    pub fn from_request(ctx: &RequestContext<RoleServer>) -> Self {
        ctx.extensions
            .get::<Parts>()
            .map(Self::from_parts)
            .unwrap_or_default()
    }
}
