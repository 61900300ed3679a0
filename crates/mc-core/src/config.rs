//! Configuration management
//!
//! 設定は以下の優先順位で読み込まれます:
//! 1. 環境変数
//! 2. mistral-chat.toml 設定ファイル
//! 3. デフォルト値
//!
//! 設定ファイル内では `${VAR_NAME}` 形式で環境変数を展開できます。

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Error;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "mistral-chat.toml";

/// Ollama endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model to use
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling probability mass
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Per-request timeout in seconds (None = wait indefinitely)
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            request_timeout_secs: None,
        }
    }
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,

    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Sessions idle longer than this are dropped; 0 keeps them until closed
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

/// Prompt configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptConfig {
    /// Custom prompt template; must contain `{history}` and `{human_input}`
    pub template: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_model() -> String {
    "mistral".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_session_idle_secs() -> u64 {
    3600
}

/// Main configuration for mistral-chat
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Ollama endpoint configuration
    #[serde(default)]
    pub ollama: OllamaConfig,

    /// Web server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Prompt configuration
    #[serde(default)]
    pub prompt: PromptConfig,
}

impl Config {
    /// 設定ファイルから環境変数を展開する
    ///
    /// `${VAR_NAME}` 形式の文字列を環境変数の値に置換します。
    /// 環境変数が存在しない場合は空文字列になります。
    fn expand_env_vars(value: &str) -> String {
        let mut result = String::with_capacity(value.len());
        let mut chars = value.chars().peekable();

        while let Some(c) = chars.next() {
            if c == '$' && chars.peek() == Some(&'{') {
                chars.next(); // '{' を消費

                let mut var_name = String::new();
                for c in chars.by_ref() {
                    if c == '}' {
                        break;
                    }
                    var_name.push(c);
                }

                if let Ok(env_value) = std::env::var(&var_name) {
                    result.push_str(&env_value);
                }
            } else {
                result.push(c);
            }
        }

        result
    }

    /// TOML 設定ファイルから設定を読み込む
    ///
    /// 設定ファイル内の `${VAR_NAME}` は環境変数の値に置換され、
    /// その後に環境変数による上書きが適用されます。
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();

        let toml_content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {}: {}", path.display(), e)))?;

        let mut cfg = Self::from_toml_str(&toml_content)?;
        cfg.apply_env_overrides();

        Ok(cfg)
    }

    /// TOML 文字列から設定を構築する（環境変数による上書きなし）
    pub fn from_toml_str(content: &str) -> crate::Result<Self> {
        let expanded_content = Self::expand_env_vars(content);

        let toml: TomlConfig = toml::from_str(&expanded_content)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;

        Ok(Self::from_toml_config(toml))
    }

    /// デフォルトパスから設定を読み込む
    ///
    /// 1. `path` が指定されていればそのファイル
    /// 2. `./mistral-chat.toml`
    /// 3. 見つからない場合はデフォルト値 + 環境変数
    pub fn load(path: Option<&Path>) -> crate::Result<Self> {
        if let Some(path) = path {
            return Self::from_toml_file(path);
        }

        if Path::new(DEFAULT_CONFIG_FILE).exists() {
            return Self::from_toml_file(DEFAULT_CONFIG_FILE);
        }

        Ok(Self::from_env())
    }

    /// Load configuration from defaults and environment variables
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.apply_env_overrides();
        cfg
    }

    /// TOML 構造から Config を構築
    fn from_toml_config(toml: TomlConfig) -> Self {
        let ollama = toml.ollama.unwrap_or_default();
        let server = toml.server.unwrap_or_default();
        let prompt = toml.prompt.unwrap_or_default();

        Config {
            ollama: OllamaConfig {
                base_url: ollama.base_url.unwrap_or_else(default_base_url),
                model: ollama.model.unwrap_or_else(default_model),
                temperature: ollama.temperature.unwrap_or_else(default_temperature),
                top_p: ollama.top_p.unwrap_or_else(default_top_p),
                request_timeout_secs: ollama.request_timeout_secs,
            },
            server: ServerConfig {
                host: server.host.unwrap_or_else(default_host),
                port: server.port.unwrap_or_else(default_port),
                session_idle_secs: server
                    .session_idle_secs
                    .unwrap_or_else(default_session_idle_secs),
            },
            prompt: PromptConfig {
                template: prompt.template,
            },
        }
    }

    /// 環境変数で設定を上書きする
    fn apply_env_overrides(&mut self) {
        // Ollama 設定の上書き
        if let Some(url) = non_empty_var("OLLAMA_BASE_URL") {
            self.ollama.base_url = url;
        }
        if let Some(model) = non_empty_var("OLLAMA_MODEL") {
            self.ollama.model = model;
        }
        if let Some(t) = non_empty_var("OLLAMA_TEMPERATURE").and_then(|v| v.parse().ok()) {
            self.ollama.temperature = t;
        }
        if let Some(p) = non_empty_var("OLLAMA_TOP_P").and_then(|v| v.parse().ok()) {
            self.ollama.top_p = p;
        }
        if let Some(secs) = non_empty_var("OLLAMA_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.ollama.request_timeout_secs = Some(secs);
        }

        // サーバー設定の上書き
        if let Some(host) = non_empty_var("CHAT_HOST") {
            self.server.host = host;
        }
        if let Some(port) = non_empty_var("CHAT_PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(secs) = non_empty_var("CHAT_SESSION_IDLE_SECS").and_then(|v| v.parse().ok()) {
            self.server.session_idle_secs = secs;
        }

        // プロンプト設定の上書き
        if let Some(template) = non_empty_var("CHAT_PROMPT_TEMPLATE") {
            self.prompt.template = Some(template);
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

// ============================================================================
// TOML 構造体定義（ファイル解析用）
// ============================================================================

/// TOML ファイル用のトップレベル構造
#[derive(Debug, Deserialize)]
struct TomlConfig {
    /// Ollama 設定
    ollama: Option<TomlOllamaConfig>,
    /// Web サーバー設定
    server: Option<TomlServerConfig>,
    /// プロンプト設定
    prompt: Option<TomlPromptConfig>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlOllamaConfig {
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    temperature: Option<f32>,
    #[serde(default)]
    top_p: Option<f32>,
    #[serde(default)]
    request_timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlServerConfig {
    #[serde(default)]
    host: Option<String>,
    #[serde(default)]
    port: Option<u16>,
    #[serde(default)]
    session_idle_secs: Option<u64>,
}

#[derive(Debug, Deserialize, Default)]
struct TomlPromptConfig {
    #[serde(default)]
    template: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_ollama_config_default() {
        let config = OllamaConfig::default();
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.model, "mistral");
        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.top_p, 0.9);
        assert!(config.request_timeout_secs.is_none());
    }

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8501);
        assert_eq!(config.session_idle_secs, 3600);
    }

    #[test]
    fn test_expand_env_vars() {
        // テスト用環境変数を設定
        unsafe {
            std::env::set_var("MISTRAL_CHAT_TEST_VAR", "test_value");
        }

        let result = Config::expand_env_vars("prefix_${MISTRAL_CHAT_TEST_VAR}_suffix");
        assert_eq!(result, "prefix_test_value_suffix");

        // 存在しない環境変数
        let result = Config::expand_env_vars("prefix_${MISTRAL_CHAT_NONEXISTENT}_suffix");
        assert_eq!(result, "prefix__suffix");

        unsafe {
            std::env::remove_var("MISTRAL_CHAT_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_env_vars_leaves_plain_text() {
        assert_eq!(Config::expand_env_vars("no_vars_here"), "no_vars_here");
        assert_eq!(Config::expand_env_vars("cost: $5 {braces}"), "cost: $5 {braces}");
        assert_eq!(Config::expand_env_vars("${}_content"), "_content");
    }

    #[test]
    fn test_toml_config_parsing() {
        let toml_content = r#"
[ollama]
base_url = "http://gpu-box:11434"
model = "mistral:7b-instruct"
temperature = 0.2
top_p = 0.5
request_timeout_secs = 30

[server]
host = "0.0.0.0"
port = 9000
session_idle_secs = 600

[prompt]
template = "H: {history}\nQ: {human_input}\nA:"
"#;

        let config = Config::from_toml_str(toml_content).unwrap();

        assert_eq!(config.ollama.base_url, "http://gpu-box:11434");
        assert_eq!(config.ollama.model, "mistral:7b-instruct");
        assert_eq!(config.ollama.temperature, 0.2);
        assert_eq!(config.ollama.top_p, 0.5);
        assert_eq!(config.ollama.request_timeout_secs, Some(30));
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.session_idle_secs, 600);
        assert_eq!(
            config.prompt.template.as_deref(),
            Some("H: {history}\nQ: {human_input}\nA:")
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str("[ollama]\nmodel = \"llama3\"\n").unwrap();

        assert_eq!(config.ollama.model, "llama3");
        assert_eq!(config.ollama.base_url, "http://localhost:11434");
        assert_eq!(config.server, ServerConfig::default());
        assert!(config.prompt.template.is_none());
    }

    #[test]
    fn test_example_config_matches_defaults() {
        let example = include_str!("../../../mistral-chat.toml.example");
        let config = Config::from_toml_str(example).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = Config::from_toml_str("[ollama\nmodel = ").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[server]\nport = 8600").unwrap();

        let config = Config::from_toml_file(file.path()).unwrap();
        assert_eq!(config.ollama.model, "mistral");
        assert_eq!(config.server.port, 8600);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = Config::from_toml_file("/definitely/not/here/mistral-chat.toml").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
