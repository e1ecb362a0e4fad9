//! V1 API handlers.

mod agents;
mod chat;

pub use agents::{
    create_agent, delete_agent, find_delegation_chain, get_agent, get_agent_tree, list_agents,
    update_agent,
};
pub use chat::chat_agent;
