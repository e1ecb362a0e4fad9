use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::Deserialize;

// -----------------------------------------------------------------------------
// Config (root)
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default = "default_registry_dir")]
    pub registry_dir: PathBuf,
    #[serde(default)]
    pub defaults: AgentDefaults,
    #[serde(default)]
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            registry_dir: default_registry_dir(),
            defaults: AgentDefaults::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let path = Path::new(path);
        let contents = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        serde_saphyr::from_str(&contents).map_err(ConfigError::Yaml)
    }
}

fn default_registry_dir() -> PathBuf {
    PathBuf::from(".agent-console/agents")
}

/// Resolve `registry_dir` to an absolute (or at least fully joined) path.
///
/// If `registry_dir` is relative, it is resolved relative to the config file directory.
pub fn resolve_registry_dir(config_path: &Path, registry_dir: &Path) -> PathBuf {
    if registry_dir.is_absolute() {
        return registry_dir.to_path_buf();
    }

    let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    config_dir.join(registry_dir)
}

// -----------------------------------------------------------------------------
// ServerConfig
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval_seconds: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            request_timeout_seconds: default_request_timeout(),
            idle_timeout_seconds: default_idle_timeout(),
            keep_alive_interval_seconds: default_keep_alive_interval(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_request_timeout() -> u64 {
    300
}

fn default_idle_timeout() -> u64 {
    60
}

fn default_keep_alive_interval() -> u64 {
    15
}

// -----------------------------------------------------------------------------
// AgentDefaults
// -----------------------------------------------------------------------------

/// Fill-in values for agent records created without the corresponding field.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentDefaults {
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

impl Default for AgentDefaults {
    fn default() -> Self {
        Self {
            model: default_model(),
            system_prompt: default_system_prompt(),
        }
    }
}

fn default_model() -> String {
    "gpt-4.1-mini".to_string()
}

fn default_system_prompt() -> String {
    "You are a helpful assistant.".to_string()
}

// -----------------------------------------------------------------------------
// LlmConfig
// -----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
        }
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

// -----------------------------------------------------------------------------
// ConfigError
// -----------------------------------------------------------------------------

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Yaml(serde_saphyr::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "failed to read config file: {e}"),
            ConfigError::Yaml(e) => write!(f, "failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Yaml(e) => Some(e),
        }
    }
}

// -----------------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout_seconds, 300);
        assert_eq!(config.server.idle_timeout_seconds, 60);
        assert_eq!(config.server.keep_alive_interval_seconds, 15);
        assert_eq!(config.registry_dir, PathBuf::from(".agent-console/agents"));
        assert_eq!(config.defaults.model, "gpt-4.1-mini");
        assert_eq!(config.defaults.system_prompt, "You are a helpful assistant.");
        assert_eq!(config.llm.provider, "openai");
        assert!(config.llm.base_url.is_none());
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let tmp_dir = TempDir::new().unwrap();
        let missing_path = tmp_dir.path().join("missing-config.yaml");
        let config = Config::load(missing_path.to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_valid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 3000
  request_timeout_seconds: 60
registry_dir: ".agent-console/registry-custom"
defaults:
  model: "gpt-4.1"
llm:
  provider: "openrouter"
  base_url: "http://localhost:4000/v1"
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_seconds, 60);
        assert_eq!(
            config.registry_dir,
            PathBuf::from(".agent-console/registry-custom")
        );
        assert_eq!(config.defaults.model, "gpt-4.1");
        assert_eq!(config.defaults.system_prompt, "You are a helpful assistant."); // default
        assert_eq!(config.llm.provider, "openrouter");
        assert_eq!(config.llm.base_url.as_deref(), Some("http://localhost:4000/v1"));
    }

    #[test]
    fn test_load_partial_yaml_uses_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
server:
  port: 9000
"#
        )
        .unwrap();

        let config = Config::load(file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.server.host, "0.0.0.0"); // default
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.idle_timeout_seconds, 60); // default
        assert_eq!(config.registry_dir, PathBuf::from(".agent-console/agents")); // default
    }

    #[test]
    fn test_load_invalid_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(file.path().to_str().unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_registry_dir_relative() {
        let resolved = resolve_registry_dir(
            Path::new("/etc/agent-console/config.yaml"),
            Path::new("agents"),
        );
        assert_eq!(resolved, PathBuf::from("/etc/agent-console/agents"));
    }

    #[test]
    fn test_resolve_registry_dir_absolute() {
        let resolved = resolve_registry_dir(
            Path::new("/etc/agent-console/config.yaml"),
            Path::new("/var/lib/agents"),
        );
        assert_eq!(resolved, PathBuf::from("/var/lib/agents"));
    }
}
