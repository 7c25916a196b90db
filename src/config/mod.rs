mod api;
mod defaults;
mod validation;

use crate::cli::Args;
use crate::models::Provider;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub use api::{ApiConfig, ApiKeys, Endpoints};
pub use defaults::{
    default_max_iterations, default_stream_timeout, DEFAULT_GEMINI_BASE_URL,
    DEFAULT_OPENAI_BASE_URL, DEFAULT_SERPAPI_BASE_URL, DEFAULT_TAVILY_BASE_URL,
};
pub use validation::{expand_env_var_in_string, normalize_base_url};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SessionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verbose: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ModelConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<Provider>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AgentConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_iterations: Option<usize>,
}

/// On-disk configuration. Every field is optional; missing values fall back
/// to environment variables and built-in defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub model: String,
    pub keys: ApiKeys,
    pub endpoints: Endpoints,
    pub stream_timeout: u64,
    pub max_iterations: usize,
    pub verbose: bool,
}

impl Config {
    pub fn from_env_and_args(args: &Args) -> Result<Self> {
        let file_config = FileConfig::load()?;
        Self::resolve(args, &file_config, |name| env::var(name).ok())
    }

    /// Merge CLI args > environment > config file > defaults.
    pub fn resolve<F>(args: &Args, file: &FileConfig, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = match args.provider {
            Some(p) => p,
            None => match lookup("FACTCHECK_PROVIDER") {
                Some(raw) => raw
                    .parse::<Provider>()
                    .map_err(anyhow::Error::msg)
                    .context("Invalid FACTCHECK_PROVIDER")?,
                None => file.model.provider.unwrap_or_default(),
            },
        };

        let model = args
            .model
            .clone()
            .or_else(|| lookup("FACTCHECK_MODEL"))
            .or_else(|| file.model.default_model.clone())
            .unwrap_or_else(|| provider.default_model().to_string());

        let stream_timeout = match lookup("FACTCHECK_STREAM_TIMEOUT") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .context("Invalid FACTCHECK_STREAM_TIMEOUT")?,
            ),
            None => None,
        }
        .or(file.api.stream_timeout)
        .unwrap_or_else(default_stream_timeout);
        if stream_timeout == 0 {
            anyhow::bail!("stream_timeout must be at least 1 second");
        }

        let max_iterations = match (args.max_iterations, lookup("FACTCHECK_MAX_ITERATIONS")) {
            (Some(n), _) => Some(n),
            (None, Some(raw)) => Some(
                raw.trim()
                    .parse::<usize>()
                    .context("Invalid FACTCHECK_MAX_ITERATIONS")?,
            ),
            (None, None) => None,
        }
        .or(file.agent.max_iterations)
        .unwrap_or_else(default_max_iterations);
        if max_iterations == 0 {
            anyhow::bail!("max_iterations must be at least 1");
        }

        let verbose = args.verbose
            || lookup("FACTCHECK_VERBOSE")
                .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
                .or(file.session.verbose)
                .unwrap_or(false);

        let endpoint = |env_name: &str, from_file: &Option<String>, default: &str| {
            let raw = lookup(env_name)
                .or_else(|| from_file.clone())
                .unwrap_or_else(|| default.to_string());
            normalize_base_url(&expand_env_var_in_string(&raw, &lookup))
        };
        let endpoints = Endpoints {
            openai: endpoint("OPENAI_BASE_URL", &file.api.openai_base_url, DEFAULT_OPENAI_BASE_URL),
            gemini: endpoint("GEMINI_BASE_URL", &file.api.gemini_base_url, DEFAULT_GEMINI_BASE_URL),
            tavily: endpoint("TAVILY_BASE_URL", &file.api.tavily_base_url, DEFAULT_TAVILY_BASE_URL),
            serpapi: endpoint(
                "SERPAPI_BASE_URL",
                &file.api.serpapi_base_url,
                DEFAULT_SERPAPI_BASE_URL,
            ),
        };

        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let keys = ApiKeys {
            openai: non_empty("OPENAI_API_KEY"),
            google: non_empty("GOOGLE_API_KEY"),
            serpapi: non_empty("SERPAPI_API_KEY"),
            tavily: non_empty("TAVILY_API_KEY"),
        };

        Ok(Config {
            provider,
            model,
            keys,
            endpoints,
            stream_timeout,
            max_iterations,
            verbose,
        })
    }

    pub fn get_current_date() -> String {
        chrono::Local::now().format("%A, %B %d, %Y").to_string()
    }
}

impl FileConfig {
    pub fn load() -> Result<Self> {
        for path in Self::get_config_paths() {
            if path.exists() {
                return Self::load_from(&path);
            }
        }
        Ok(FileConfig::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|s| s.to_str()),
            Some("yaml") | Some("yml")
        );
        let config = if is_yaml {
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Failed to parse YAML config file: {}", path.display()))?
        } else {
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse JSON config file: {}", path.display()))?
        };
        Ok(config)
    }

    pub fn get_config_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from(".factcheck.yaml"),
            PathBuf::from(".factcheck.yml"),
            PathBuf::from(".factcheck.json"),
        ];

        if let Some(config_dir) = dirs::config_dir() {
            let dir = config_dir.join("factcheck");
            paths.push(dir.join("factcheck.yaml"));
            paths.push(dir.join("factcheck.yml"));
            paths.push(dir.join("factcheck.json"));
        }

        paths
    }

    /// A fully populated example, written by `--config-init`.
    pub fn example() -> Self {
        FileConfig {
            api: ApiConfig {
                openai_base_url: Some(DEFAULT_OPENAI_BASE_URL.to_string()),
                gemini_base_url: Some(DEFAULT_GEMINI_BASE_URL.to_string()),
                tavily_base_url: Some(DEFAULT_TAVILY_BASE_URL.to_string()),
                serpapi_base_url: Some(DEFAULT_SERPAPI_BASE_URL.to_string()),
                stream_timeout: Some(default_stream_timeout()),
            },
            model: ModelConfig {
                provider: Some(Provider::OpenAi),
                default_model: Some(Provider::OpenAi.default_model().to_string()),
            },
            agent: AgentConfig {
                max_iterations: Some(default_max_iterations()),
            },
            session: SessionConfig {
                verbose: Some(false),
            },
        }
    }

    /// Write [`FileConfig::example`] as YAML, refusing to overwrite an existing file.
    pub fn write_example(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists: {}", path.display());
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(&Self::example())?;
        fs::write(path, yaml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
