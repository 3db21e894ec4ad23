//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `TOPICMAP_WORK_DIR` and `TOPICMAP_LOG_LEVEL` env overrides.
//! The LLM API key never comes from TOML.

use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::error::AppError;

/// OpenAI / OpenAI-compatible provider configuration.
/// Populated from `[llm.openai]` in the TOML. The model is a user setting,
/// not config.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// LLM configuration.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    /// Which provider is active (`"openai"` or `"dummy"`).
    /// Maps to `default` in `[llm]`.
    pub provider: String,
    pub openai: OpenAiConfig,
}

/// Fully-resolved application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub app_name: String,
    /// Directory for `graph-store.json`, `settings.json`, and exports
    /// (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Prompt template directory. Relative paths resolve against the
    /// current working directory.
    pub prompts_dir: PathBuf,
    /// Quiet period after the last change before the graph is auto-saved.
    pub autosave_debounce: Duration,
    pub llm: LlmConfig,
    /// API key from `LLM_API_KEY` or `OPENAI_API_KEY`. Used when the
    /// settings store has none.
    pub llm_api_key: Option<String>,
}

/// Raw TOML shape, deserialized before resolution.
#[derive(Deserialize)]
struct RawConfig {
    app: RawApp,
    #[serde(default)]
    llm: RawLlm,
    #[serde(default)]
    prompts: RawPrompts,
    #[serde(default)]
    autosave: RawAutosave,
}

#[derive(Deserialize)]
struct RawApp {
    #[serde(default = "default_app_name")]
    name: String,
    work_dir: String,
    log_level: String,
}

#[derive(Deserialize)]
struct RawLlm {
    #[serde(rename = "default", default = "default_llm_provider")]
    provider: String,
    #[serde(default)]
    openai: RawOpenAiConfig,
}

impl Default for RawLlm {
    fn default() -> Self {
        Self { provider: default_llm_provider(), openai: RawOpenAiConfig::default() }
    }
}

#[derive(Deserialize)]
struct RawOpenAiConfig {
    #[serde(default = "default_openai_api_base_url")]
    api_base_url: String,
    #[serde(default = "default_openai_timeout_seconds")]
    timeout_seconds: u64,
}

impl Default for RawOpenAiConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            timeout_seconds: default_openai_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
struct RawPrompts {
    #[serde(default = "default_prompts_dir")]
    dir: String,
}

impl Default for RawPrompts {
    fn default() -> Self {
        Self { dir: default_prompts_dir() }
    }
}

#[derive(Deserialize)]
struct RawAutosave {
    #[serde(default = "default_debounce_ms")]
    debounce_ms: u64,
}

impl Default for RawAutosave {
    fn default() -> Self {
        Self { debounce_ms: default_debounce_ms() }
    }
}

fn default_app_name() -> String { "topicmap".to_string() }
fn default_llm_provider() -> String { "openai".to_string() }
fn default_openai_api_base_url() -> String { "https://api.openai.com/v1/chat/completions".to_string() }
fn default_openai_timeout_seconds() -> u64 { 60 }
fn default_prompts_dir() -> String { "config/prompts".to_string() }
fn default_debounce_ms() -> u64 { 2000 }

pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Load config from `config_path` (default `config/default.toml`), then
/// apply env-var overrides.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let work_dir_override = env::var("TOPICMAP_WORK_DIR").ok();
    let log_level_override = env::var("TOPICMAP_LOG_LEVEL").ok();
    let mut cfg = load_from(
        Path::new(config_path.unwrap_or(DEFAULT_CONFIG_PATH)),
        work_dir_override.as_deref(),
        log_level_override.as_deref(),
    )?;
    cfg.llm_api_key = env::var("LLM_API_KEY")
        .or_else(|_| env::var("OPENAI_API_KEY"))
        .ok()
        .filter(|k| !k.trim().is_empty());
    Ok(cfg)
}

/// Loader behind [`load`]: explicit path, optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    work_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let a = parsed.app;
    let work_dir = expand_home(work_dir_override.unwrap_or(&a.work_dir));
    let log_level = log_level_override.unwrap_or(&a.log_level).to_string();

    if parsed.autosave.debounce_ms == 0 {
        return Err(AppError::Config("autosave.debounce_ms must be greater than zero".into()));
    }

    Ok(Config {
        app_name: a.name,
        work_dir,
        log_level,
        prompts_dir: expand_home(&parsed.prompts.dir),
        autosave_debounce: Duration::from_millis(parsed.autosave.debounce_ms),
        llm: LlmConfig {
            provider: parsed.llm.provider,
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
        },
        llm_api_key: None,
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

// ── test helpers ──────────────────────────────────────────────────────────────

impl Config {
    /// `Config` for tests: dummy LLM, no API key, no network.
    pub fn test_default(work_dir: &Path) -> Self {
        Self {
            app_name: "test".into(),
            work_dir: work_dir.to_path_buf(),
            log_level: "info".into(),
            prompts_dir: work_dir.join("prompts"),
            autosave_debounce: Duration::from_millis(default_debounce_ms()),
            llm: LlmConfig {
                provider: "dummy".into(),
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    timeout_seconds: 1,
                },
            },
            llm_api_key: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const MINIMAL_TOML: &str = r#"
[app]
work_dir = "~/.topicmap"
log_level = "info"
"#;

    fn write_toml(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f
    }

    #[test]
    fn parse_minimal_config_fills_defaults() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.app_name, "topicmap");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.llm.provider, "openai");
        assert_eq!(cfg.autosave_debounce, Duration::from_millis(2000));
        assert_eq!(cfg.prompts_dir, PathBuf::from("config/prompts"));
        assert!(cfg.llm_api_key.is_none());
    }

    #[test]
    fn parse_full_config() {
        let f = write_toml(
            r#"
[app]
name = "maps"
work_dir = "/srv/maps"
log_level = "debug"

[llm]
default = "dummy"

[llm.openai]
api_base_url = "http://localhost:11434/v1/chat/completions"
timeout_seconds = 5

[prompts]
dir = "/etc/maps/prompts"

[autosave]
debounce_ms = 500
"#,
        );
        let cfg = load_from(f.path(), None, None).unwrap();
        assert_eq!(cfg.app_name, "maps");
        assert_eq!(cfg.llm.provider, "dummy");
        assert_eq!(cfg.llm.openai.timeout_seconds, 5);
        assert_eq!(cfg.prompts_dir, PathBuf::from("/etc/maps/prompts"));
        assert_eq!(cfg.autosave_debounce, Duration::from_millis(500));
    }

    #[test]
    fn zero_debounce_is_rejected() {
        let f = write_toml(&format!("{MINIMAL_TOML}\n[autosave]\ndebounce_ms = 0\n"));
        let err = load_from(f.path(), None, None).unwrap_err();
        assert!(err.to_string().contains("debounce_ms"));
    }

    #[test]
    fn tilde_expands_to_home() {
        let home = dirs::home_dir().expect("home dir must exist in test env");
        let expanded = expand_home("~/.topicmap");
        assert!(expanded.starts_with(&home));
        assert!(expanded.ends_with(".topicmap"));
    }

    #[test]
    fn absolute_path_unchanged() {
        assert_eq!(expand_home("/absolute/path"), PathBuf::from("/absolute/path"));
    }

    #[test]
    fn relative_path_unchanged() {
        assert_eq!(expand_home("relative/path"), PathBuf::from("relative/path"));
    }

    #[test]
    fn missing_file_errors() {
        let result = load_from(Path::new("/nonexistent/config.toml"), None, None);
        let msg = result.unwrap_err().to_string();
        assert!(msg.contains("config error"));
    }

    #[test]
    fn env_work_dir_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), Some("/tmp/test-override"), None).unwrap();
        assert_eq!(cfg.work_dir, PathBuf::from("/tmp/test-override"));
    }

    #[test]
    fn env_log_level_override() {
        let f = write_toml(MINIMAL_TOML);
        let cfg = load_from(f.path(), None, Some("debug")).unwrap();
        assert_eq!(cfg.log_level, "debug");
    }
}
