//! Common test utilities.

use std::sync::Arc;

use axum::Router;

use agent_console::agent::AgentRegistry;
use agent_console::config::AgentDefaults;
use agent_console::llm::{Provider, ProviderRegistry};
use agent_console::runtime::AgentRuntime;
use agent_console::server::{self, AppState};
use agent_console::store::file::FileRecordStore;

/// Create a test app backed by a temp registry directory.
pub fn test_app() -> Router {
    use tempfile::TempDir;

    let tmp = TempDir::new().unwrap();

    // Leak the TempDir so it doesn't get cleaned up during the test.
    // This is fine for tests - the OS will clean up on process exit.
    let tmp = Box::leak(Box::new(tmp));
    let registry_dir = tmp.path().join("agents");

    let store = FileRecordStore::new(registry_dir);
    let registry = AgentRegistry::new(Arc::new(store), AgentDefaults::default());

    // No provider credentials: chat degrades to the offline stream.
    let runtime = AgentRuntime::new(ProviderRegistry::new(), Provider::OpenAI, None);

    let state = AppState {
        registry,
        runtime,
        idle_timeout_seconds: 60,
        keep_alive_interval_seconds: 15,
    };

    server::build_app(state, 30)
}
