//! Per-user long-term memory for AI assistants over MCP.
//!
//! One server process serves many end-users. Every tool call is pinned to exactly one
//! user, chosen in strict priority order:
//!
//! 1. the tool's explicit `user_id` argument,
//! 2. an identity header on the HTTP request (`x-user-id`, `x-user-email`,
//!    `x-librechat-user-id`, first non-empty wins),
//! 3. the configured process default.
//!
//! The header identity travels with its own request from the axum middleware down to the
//! tool, so concurrent requests can never see each other's identity.
//!
//! # Modules
//!
//! - [`identity`] — identity resolution, the request-scoped context, and the header middleware
//! - [`tools`] — the MCP tool surface (`save_memory`, `get_all_memories`, `search_memories`, `delete_all_memories`)
//! - [`memory`] — the per-user storage capability and its SQLite implementation
//! - [`embedding`] — local ONNX or OpenAI-compatible embeddings
//! - [`server`] — backend lifecycle and the stdio / HTTP transports
//! - [`config`] — TOML + environment configuration

pub mod config;
pub mod db;
pub mod embedding;
pub mod identity;
pub mod memory;
pub mod server;
pub mod tools;
