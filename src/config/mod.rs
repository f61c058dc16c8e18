use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credential::TokenRule;

const APP_DIR: &str = "gemini-cli";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemma-3-27b-it:generateContent";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_LOG_DIR: &str = "~/.gemini_logs";
const DEFAULT_TOKEN_PATHS: [&str; 3] = ["./.geminitoken", "~/.geminitoken", "~/.config/geminitoken"];

/// On-disk layout of `config.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    token: TokenSection,
    #[serde(default)]
    logs: LogsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiSection {
    url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TokenSection {
    paths: Option<Vec<String>>,
    min_len: Option<usize>,
    max_len: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LogsSection {
    dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub timeout: Duration,
    /// Candidate token locations as written by the user, `~` unexpanded.
    pub token_paths: Vec<String>,
    pub token_rule: TokenRule,
    pub log_dir: PathBuf,
    pub scratch_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            token_paths: DEFAULT_TOKEN_PATHS.iter().map(|p| p.to_string()).collect(),
            token_rule: TokenRule::default(),
            log_dir: expand_home(DEFAULT_LOG_DIR),
            scratch_dir: scratch_dir_from_env(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        match Self::get_config_dir() {
            Some(dir) => Self::load_from(&dir.join(CONFIG_FILE)),
            None => Ok(Self::default()),
        }
    }

    pub fn get_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR))
    }

    pub fn load_from(config_file: &Path) -> Result<Self> {
        let mut config = Self::default();
        if !config_file.exists() {
            tracing::debug!(path = %config_file.display(), "no config file, using defaults");
            return Ok(config);
        }

        let content = fs::read_to_string(config_file)
            .with_context(|| format!("Failed to read config file {}", config_file.display()))?;
        let file: ConfigFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", config_file.display()))?;

        if let Some(url) = file.api.url {
            config.set_api_url(&url)?;
        }
        if let Some(secs) = file.api.timeout_secs {
            ensure!(secs > 0, "api.timeout_secs must be greater than zero");
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(paths) = file.token.paths {
            ensure!(!paths.is_empty(), "token.paths must list at least one location");
            config.token_paths = paths;
        }
        if let Some(min_len) = file.token.min_len {
            config.token_rule.min_len = min_len;
        }
        if let Some(max_len) = file.token.max_len {
            config.token_rule.max_len = max_len;
        }
        ensure!(
            config.token_rule.min_len <= config.token_rule.max_len,
            "token.min_len ({}) is greater than token.max_len ({})",
            config.token_rule.min_len,
            config.token_rule.max_len
        );
        if let Some(dir) = file.logs.dir {
            config.log_dir = expand_home(&dir);
        }

        tracing::debug!(path = %config_file.display(), "loaded config file");
        Ok(config)
    }

    pub fn set_api_url(&mut self, raw: &str) -> Result<()> {
        url::Url::parse(raw).with_context(|| format!("Invalid API URL: {}", raw))?;
        self.api_url = raw.to_string();
        Ok(())
    }

    /// Candidate token locations with `~` expanded, in lookup order.
    pub fn token_candidates(&self) -> Vec<PathBuf> {
        self.token_paths.iter().map(|p| expand_home(p)).collect()
    }
}

/// Expands a leading `~` to the home directory. Paths without one are returned as-is.
pub fn expand_home(raw: &str) -> PathBuf {
    let rest = if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    };

    match (rest, dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}

fn scratch_dir_from_env() -> PathBuf {
    env::var_os("TMPDIR")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("/tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_from(&temp_dir.path().join("config.toml")).unwrap();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(
            config.token_paths,
            vec!["./.geminitoken", "~/.geminitoken", "~/.config/geminitoken"]
        );
        assert_eq!(config.token_rule, TokenRule { min_len: 39, max_len: 40 });
    }

    #[test]
    fn test_file_overrides() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(
            &config_file,
            r#"
[api]
url = "http://localhost:8080/generate"
timeout_secs = 5

[token]
paths = ["/etc/gemini/token"]
min_len = 10
max_len = 12

[logs]
dir = "/var/log/gemini"
"#,
        )
        .unwrap();

        let config = Config::load_from(&config_file).unwrap();
        assert_eq!(config.api_url, "http://localhost:8080/generate");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.token_candidates(), vec![PathBuf::from("/etc/gemini/token")]);
        assert_eq!(config.token_rule, TokenRule { min_len: 10, max_len: 12 });
        assert_eq!(config.log_dir, PathBuf::from("/var/log/gemini"));
    }

    #[test]
    fn test_rejects_inverted_length_rule() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        fs::write(&config_file, "[token]\nmin_len = 41\n").unwrap();

        let err = Config::load_from(&config_file).unwrap_err();
        assert!(err.to_string().contains("min_len"));
    }

    #[test]
    fn test_rejects_bad_url_and_unknown_keys() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");

        fs::write(&config_file, "[api]\nurl = \"not a url\"\n").unwrap();
        assert!(Config::load_from(&config_file).is_err());

        fs::write(&config_file, "[api]\nmodel = \"gemini-pro\"\n").unwrap();
        assert!(Config::load_from(&config_file).is_err());
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("./.geminitoken"), PathBuf::from("./.geminitoken"));
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/.geminitoken"), home.join(".geminitoken"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
