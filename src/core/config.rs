use std::env;

use anyhow::{Result, anyhow, bail};

use crate::line::LINE_API_URL;

const DEFAULT_LLM_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";
const DEFAULT_LLM_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_SEARXNG_API_URL: &str = "http://127.0.0.1:8080";
const DEFAULT_SYSTEM_MESSAGE: &str = "你是一位樂於助人且富有創意的 AI 助理，專精於提供即時且準確的資訊，並能夠從網路搜尋結果中整合資訊進行回答。";
const DEFAULT_SEARCH_RESULTS: usize = 3;

/// Which search engine backs the web search step.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchBackend {
    Searxng {
        api_url: String,
    },
    Google {
        api_key: String,
        cx_id: String,
    },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub llm_api_url: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub system_message: String,
    pub streaming: bool,
    pub search_results: usize,
    pub search_backend: SearchBackend,
    pub line_api_url: String,
    pub line_channel_secret: String,
    pub line_channel_access_token: String,
}

impl AppConfig {
    /// Reads the configuration from the process environment.
    ///
    /// All required secrets are checked up front and reported together so
    /// a misconfigured deployment fails once with the full list.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty strings are as useless as unset variables
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let required = [
            "GOOGLE_API_KEY",
            "LINE_CHANNEL_SECRET",
            "LINE_CHANNEL_ACCESS_TOKEN",
        ];
        let missing: Vec<&str> = required
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            bail!("Missing required env vars: {}", missing.join(", "));
        }

        let streaming = match get("LINEBOT_STREAMING") {
            Some(v) => parse_bool(&v)
                .ok_or_else(|| anyhow!("LINEBOT_STREAMING must be true or false, got {}", v))?,
            None => false,
        };
        let search_results = match get("LINEBOT_SEARCH_RESULTS") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .map_err(|e| anyhow!("LINEBOT_SEARCH_RESULTS must be a number: {}", e))?,
            None => DEFAULT_SEARCH_RESULTS,
        };
        if search_results == 0 {
            bail!("LINEBOT_SEARCH_RESULTS must be at least 1");
        }
        let search_backend = match (
            get("LINEBOT_GOOGLE_SEARCH_API_KEY"),
            get("LINEBOT_GOOGLE_SEARCH_CX_ID"),
        ) {
            (Some(api_key), Some(cx_id)) => SearchBackend::Google { api_key, cx_id },
            _ => SearchBackend::Searxng {
                api_url: get("LINEBOT_SEARXNG_API_URL")
                    .unwrap_or_else(|| DEFAULT_SEARXNG_API_URL.to_string()),
            },
        };

        Ok(Self {
            llm_api_url: get("LINEBOT_LLM_API_URL")
                .unwrap_or_else(|| DEFAULT_LLM_API_URL.to_string()),
            llm_api_key: get("GOOGLE_API_KEY").unwrap_or_default(),
            llm_model: get("LINEBOT_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            system_message: get("LINEBOT_SYSTEM_MESSAGE")
                .unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string()),
            streaming,
            search_results,
            search_backend,
            line_api_url: get("LINEBOT_LINE_API_URL")
                .unwrap_or_else(|| LINE_API_URL.to_string()),
            line_channel_secret: get("LINE_CHANNEL_SECRET").unwrap_or_default(),
            line_channel_access_token: get("LINE_CHANNEL_ACCESS_TOKEN").unwrap_or_default(),
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("GOOGLE_API_KEY", "test-key"),
        ("LINE_CHANNEL_SECRET", "test-secret"),
        ("LINE_CHANNEL_ACCESS_TOKEN", "test-token"),
    ];

    #[test]
    fn test_defaults_with_required_vars() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();
        assert_eq!(config.llm_api_key, "test-key");
        assert_eq!(config.llm_model, "gemini-2.0-flash");
        assert_eq!(config.search_results, 3);
        assert!(!config.streaming);
        assert_eq!(
            config.search_backend,
            SearchBackend::Searxng {
                api_url: String::from("http://127.0.0.1:8080")
            }
        );
    }

    #[test]
    fn test_missing_vars_are_all_reported() {
        let err = AppConfig::from_lookup(lookup(&[("GOOGLE_API_KEY", "k")])).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("LINE_CHANNEL_SECRET"));
        assert!(msg.contains("LINE_CHANNEL_ACCESS_TOKEN"));
        assert!(!msg.contains("GOOGLE_API_KEY"));
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let vars = [
            ("GOOGLE_API_KEY", "  "),
            ("LINE_CHANNEL_SECRET", "s"),
            ("LINE_CHANNEL_ACCESS_TOKEN", "t"),
        ];
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());
    }

    #[test]
    fn test_google_backend_requires_both_vars() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("LINEBOT_GOOGLE_SEARCH_API_KEY", "gkey"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(matches!(config.search_backend, SearchBackend::Searxng { .. }));

        vars.push(("LINEBOT_GOOGLE_SEARCH_CX_ID", "cx"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert_eq!(
            config.search_backend,
            SearchBackend::Google {
                api_key: String::from("gkey"),
                cx_id: String::from("cx"),
            }
        );
    }

    #[test]
    fn test_invalid_optional_values() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("LINEBOT_STREAMING", "maybe"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = REQUIRED.to_vec();
        vars.push(("LINEBOT_SEARCH_RESULTS", "three"));
        assert!(AppConfig::from_lookup(lookup(&vars)).is_err());

        let mut vars = REQUIRED.to_vec();
        vars.push(("LINEBOT_SEARCH_RESULTS", "0"));
        let err = AppConfig::from_lookup(lookup(&vars)).unwrap_err();
        assert!(err.to_string().contains("at least 1"));

        let mut vars = REQUIRED.to_vec();
        vars.push(("LINEBOT_STREAMING", "TRUE"));
        vars.push(("LINEBOT_SEARCH_RESULTS", "5"));
        let config = AppConfig::from_lookup(lookup(&vars)).unwrap();
        assert!(config.streaming);
        assert_eq!(config.search_results, 5);
    }
}
