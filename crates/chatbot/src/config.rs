//! Configuration: API keys, endpoints, model, and the memory database path.
//!
//! **Interaction**: Used by the binaries to build `ChatOpenAI` and `TavilySearch`.
//! Loads from environment and CLI args via `Config::from_env_and_args`.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chatgraph::llm::DEFAULT_BASE_URL;
use chatgraph::tool_source::TAVILY_DEFAULT_BASE_URL;
use chatgraph::{OpenAiConfig, TavilySearch};

/// Resolved configuration for one chatbot program.
#[derive(Clone, Debug)]
pub struct Config {
    pub api_key: String,
    pub api_base: String,
    pub model: String,
    /// `--temperature`; the API default applies when unset.
    pub temperature: Option<f32>,
    /// Present when the program binds the search tool.
    pub tavily_api_key: Option<String>,
    pub tavily_api_base: String,
    /// `CHATBOT_SQLITE_PATH`; the memory program persists sessions there when set.
    pub sqlite_path: Option<PathBuf>,
}

impl Config {
    /// Resolves config from the process environment. Caller should run
    /// `dotenv::dotenv().ok()` before this.
    pub fn from_env_and_args(
        model: String,
        temperature: Option<f32>,
        require_search: bool,
    ) -> Result<Self> {
        Self::from_lookup(model, temperature, require_search, |key| {
            std::env::var(key).ok()
        })
    }

    /// Same as `from_env_and_args` with an explicit variable lookup.
    pub fn from_lookup(
        model: String,
        temperature: Option<f32>,
        require_search: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let api_key = lookup("OPENAI_API_KEY")
            .context("OPENAI_API_KEY not set (put it in .env or environment)")?
            .trim()
            .to_string();
        if api_key.is_empty() {
            bail!("OPENAI_API_KEY is empty (check .env: no spaces, whole key on one line)");
        }
        let api_base = lookup("OPENAI_API_BASE")
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let tavily_api_key = lookup("TAVILY_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        if require_search && tavily_api_key.is_none() {
            bail!("TAVILY_API_KEY not set (the search tool needs it; put it in .env or environment)");
        }
        let tavily_api_base = lookup("TAVILY_API_BASE")
            .map(|b| b.trim().to_string())
            .filter(|b| !b.is_empty())
            .unwrap_or_else(|| TAVILY_DEFAULT_BASE_URL.to_string());

        let sqlite_path = lookup("CHATBOT_SQLITE_PATH")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            api_key,
            api_base,
            model,
            temperature,
            tavily_api_key,
            tavily_api_base,
            sqlite_path,
        })
    }

    pub fn openai(&self) -> OpenAiConfig {
        let config = OpenAiConfig::new(self.api_key.clone())
            .with_base_url(self.api_base.clone())
            .with_model(self.model.clone());
        match self.temperature {
            Some(t) => config.with_temperature(t),
            None => config,
        }
    }

    /// The search tool, or `None` when no Tavily key is configured.
    pub fn tavily(&self) -> Option<TavilySearch> {
        self.tavily_api_key
            .as_ref()
            .map(|key| TavilySearch::new(key.clone()).with_base_url(self.tavily_api_base.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_only_the_key_is_set() {
        let cfg = Config::from_lookup(
            "gpt-4.1".into(),
            None,
            false,
            env(&[("OPENAI_API_KEY", " sk-1 ")]),
        )
        .unwrap();
        assert_eq!(cfg.api_key, "sk-1");
        assert_eq!(cfg.api_base, DEFAULT_BASE_URL);
        assert_eq!(cfg.tavily_api_base, TAVILY_DEFAULT_BASE_URL);
        assert!(cfg.tavily().is_none());
        assert!(cfg.sqlite_path.is_none());
        assert_eq!(cfg.openai().model, "gpt-4.1");
        assert_eq!(cfg.openai().temperature, None);
    }

    #[test]
    fn missing_or_empty_openai_key_is_an_error() {
        assert!(Config::from_lookup("m".into(), None, false, env(&[])).is_err());
        let err = Config::from_lookup("m".into(), None, false, env(&[("OPENAI_API_KEY", "  ")]))
            .unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn search_programs_require_the_tavily_key() {
        let err = Config::from_lookup("m".into(), None, true, env(&[("OPENAI_API_KEY", "sk")]))
            .unwrap_err();
        assert!(err.to_string().contains("TAVILY_API_KEY"));

        let cfg = Config::from_lookup(
            "m".into(),
            Some(0.2),
            true,
            env(&[
                ("OPENAI_API_KEY", "sk"),
                ("OPENAI_API_BASE", "http://localhost:8080/v1/"),
                ("TAVILY_API_KEY", "tvly"),
                ("CHATBOT_SQLITE_PATH", "/tmp/chat.db"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.openai().base_url, "http://localhost:8080/v1");
        assert_eq!(cfg.openai().temperature, Some(0.2));
        assert!(cfg.tavily().is_some());
        assert_eq!(cfg.sqlite_path, Some(PathBuf::from("/tmp/chat.db")));
    }
}
