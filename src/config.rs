use std::env;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

const DEFAULT_MODEL: &str = "qwen-plus";
const DEFAULT_GENERATION_URL: &str =
    "https://dashscope.aliyuncs.com/api/v1/services/aigc/text-generation/generation";
const DEFAULT_OUTPUT_FILENAME: &str = "daily_blockchain_paper.md";
const DEFAULT_SCHEDULE_TIME: &str = "09:00";
const DEFAULT_CATEGORIES: &[&str] = &["cs.CR", "cs.DC", "cs.NI"];
const DEFAULT_KEYWORDS: &[&str] = &[
    "blockchain",
    "smart contract",
    "consensus",
    "distributed ledger",
    "ethereum",
    "bitcoin",
    "defi",
];
const DEFAULT_MAX_RESULTS_PER_KEYWORD: usize = 100;
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Credential values that mean "no credential configured".
const PLACEHOLDER_KEYS: &[&str] = &["YOUR_DASHSCOPE_API_KEY_HERE", "your-actual-api-key-here"];

/// Runtime configuration, resolved once at startup and passed by reference
/// into every component. Resolution order per field: default, then the YAML
/// config file (if present), then the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: String,
    pub generation_url: String,
    pub output_filename: String,
    pub schedule_time: String,
    pub categories: Vec<String>,
    pub keywords: Vec<String>,
    pub max_results_per_keyword: usize,
    pub lookback_days: i64,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    api_key: Option<String>,
    model: Option<String>,
    generation_url: Option<String>,
    output_filename: Option<String>,
    schedule_time: Option<String>,
    categories: Option<Vec<String>>,
    keywords: Option<Vec<String>>,
    max_results_per_keyword: Option<usize>,
    lookback_days: Option<i64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            generation_url: DEFAULT_GENERATION_URL.to_string(),
            output_filename: DEFAULT_OUTPUT_FILENAME.to_string(),
            schedule_time: DEFAULT_SCHEDULE_TIME.to_string(),
            categories: DEFAULT_CATEGORIES.iter().map(|s| s.to_string()).collect(),
            keywords: DEFAULT_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            max_results_per_keyword: DEFAULT_MAX_RESULTS_PER_KEYWORD,
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let file = if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("read config {}", path.display()))?;
            serde_yaml::from_str(&raw).context("parse config yaml")?
        } else {
            ConfigFile::default()
        };
        let mut config = Self::default().apply_file(file);
        config.apply_env();
        Ok(config)
    }

    fn apply_file(mut self, file: ConfigFile) -> Self {
        if let Some(value) = file.api_key {
            self.api_key = Some(value);
        }
        if let Some(value) = file.model {
            self.model = value;
        }
        if let Some(value) = file.generation_url {
            self.generation_url = value;
        }
        if let Some(value) = file.output_filename {
            self.output_filename = value;
        }
        if let Some(value) = file.schedule_time {
            self.schedule_time = value;
        }
        if let Some(value) = file.categories {
            self.categories = value;
        }
        if let Some(value) = file.keywords {
            self.keywords = value;
        }
        if let Some(value) = file.max_results_per_keyword {
            self.max_results_per_keyword = value;
        }
        if let Some(value) = file.lookback_days {
            self.lookback_days = value;
        }
        self
    }

    fn apply_env(&mut self) {
        if let Some(value) = env_string("DASHSCOPE_API_KEY") {
            self.api_key = Some(value);
        }
        if let Some(value) = env_string("MODEL_NAME") {
            self.model = value;
        }
        if let Some(value) = env_string("GENERATION_URL") {
            self.generation_url = value;
        }
        if let Some(value) = env_string("OUTPUT_FILENAME") {
            self.output_filename = value;
        }
        if let Some(value) = env_string("SCHEDULE_TIME") {
            self.schedule_time = value;
        }
        if let Some(value) = env_list("ARXIV_CATEGORIES") {
            self.categories = value;
        }
        if let Some(value) = env_list("SEARCH_KEYWORDS") {
            self.keywords = value;
        }
        if let Some(value) = env_parse::<usize>("MAX_RESULTS_PER_KEYWORD") {
            self.max_results_per_keyword = value;
        }
        if let Some(value) = env_parse::<i64>("DAYS_TO_LOOK_BACK") {
            self.lookback_days = value;
        }
    }

    /// The configured model credential, or `None` when the system should run
    /// in simulated mode (unset, empty, or a known placeholder value).
    pub fn credential(&self) -> Option<&str> {
        match self.api_key.as_deref() {
            Some(key) if !key.trim().is_empty() && !PLACEHOLDER_KEYS.contains(&key) => Some(key),
            _ => None,
        }
    }
}

fn env_string(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    env_string(name).and_then(|value| value.trim().parse().ok())
}

fn env_list(name: &str) -> Option<Vec<String>> {
    env_string(name).map(|value| parse_list(&value))
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_shipped_values() {
        let config = Config::default();
        assert_eq!(config.model, "qwen-plus");
        assert_eq!(config.output_filename, "daily_blockchain_paper.md");
        assert_eq!(config.schedule_time, "09:00");
        assert_eq!(config.keywords.len(), 7);
        assert_eq!(config.max_results_per_keyword, 100);
        assert_eq!(config.lookback_days, 30);
        assert!(config.credential().is_none());
    }

    #[test]
    fn file_overlays_defaults() {
        let file: ConfigFile = serde_yaml::from_str(
            "model: qwen-max\nkeywords:\n  - rollup\nlookback_days: 7\n",
        )
        .unwrap();
        let config = Config::default().apply_file(file);
        assert_eq!(config.model, "qwen-max");
        assert_eq!(config.keywords, vec!["rollup".to_string()]);
        assert_eq!(config.lookback_days, 7);
        // untouched fields keep their defaults
        assert_eq!(config.schedule_time, "09:00");
    }

    #[test]
    fn placeholder_credentials_mean_simulated_mode() {
        let mut config = Config::default();
        config.api_key = Some("YOUR_DASHSCOPE_API_KEY_HERE".to_string());
        assert!(config.credential().is_none());
        config.api_key = Some("  ".to_string());
        assert!(config.credential().is_none());
        config.api_key = Some("sk-real".to_string());
        assert_eq!(config.credential(), Some("sk-real"));
    }

    #[test]
    fn comma_lists_are_trimmed() {
        assert_eq!(
            parse_list("blockchain, smart contract ,,defi"),
            vec![
                "blockchain".to_string(),
                "smart contract".to_string(),
                "defi".to_string()
            ]
        );
    }
}
