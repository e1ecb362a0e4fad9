//! Agent Console - a self-hosted console for managing and chatting with
//! hierarchical AI agents.

pub mod agent;
pub mod build_info;
pub mod config;
pub mod handlers;
pub mod llm;
pub mod response;
pub mod runtime;
pub mod server;
pub mod store;
