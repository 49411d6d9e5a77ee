//! Per-request user identity.
//!
//! Every tool call works on exactly one [`UserId`], picked by [`resolve`] from three
//! sources in strict priority order:
//!
//! | Priority | Source | Where it comes from |
//! |----------|--------|---------------------|
//! | 1 | [`IdentitySource::ExplicitParameter`] | the tool's `user_id` argument |
//! | 2 | [`IdentitySource::TransportHeader`] | [`RequestIdentityContext`], filled by [`middleware`] |
//! | 3 | [`IdentitySource::ProcessDefault`] | `server.default_user_id` in the config |
//!
//! The header-derived identity travels with its own request (HTTP extensions, then the
//! MCP request context), so concurrent requests never share a slot.

pub mod context;
pub mod middleware;

pub use context::RequestIdentityContext;

use serde::Serialize;

/// An opaque, non-empty, whitespace-trimmed user identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Trim `raw` and wrap it. Empty or all-whitespace input is absent, never an identity.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Where a resolved identity came from. Used for diagnostics only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
    ExplicitParameter,
    TransportHeader,
    ProcessDefault,
}

impl IdentitySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExplicitParameter => "explicit_parameter",
            Self::TransportHeader => "transport_header",
            Self::ProcessDefault => "process_default",
        }
    }
}

impl std::fmt::Display for IdentitySource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The identity a single tool invocation runs under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub user_id: UserId,
    pub source: IdentitySource,
}

/// Pick the effective user: explicit parameter, then header context, then process default.
///
/// Pure apart from a debug trace. Blank values at any level fall through to the next one.
pub fn resolve(
    explicit: Option<&str>,
    context_value: Option<&str>,
    process_default: &UserId,
) -> ResolvedIdentity {
    let resolved = if let Some(user_id) = explicit.and_then(UserId::parse) {
        ResolvedIdentity {
            user_id,
            source: IdentitySource::ExplicitParameter,
        }
    } else if let Some(user_id) = context_value.and_then(UserId::parse) {
        ResolvedIdentity {
            user_id,
            source: IdentitySource::TransportHeader,
        }
    } else {
        ResolvedIdentity {
            user_id: process_default.clone(),
            source: IdentitySource::ProcessDefault,
        }
    };

    tracing::debug!(
        user_id = %resolved.user_id,
        source = %resolved.source,
        "resolved user identity"
    );

    resolved
}
