use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;

use crate::phrases::{Clock, FixedClock, Lang, PhraseError, PhraseResolver, PhraseStore, SystemClock};
use crate::services::llm_provider::normalize_endpoint;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_EXPLAIN_BASE_URL: &str = "http://127.0.0.1:3000";
const DEFAULT_EXPLAIN_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_LLM_MODEL: &str = "gpt-4o-mini";
const DEFAULT_LLM_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_LLM_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_LOG_DIR: &str = "./logs";

/// Where, if anywhere, log lines are mirrored to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: String,
    /// `None` keeps logging on stdout only.
    pub file_dir: Option<PathBuf>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        let level = env_string("RUST_LOG").unwrap_or_else(|| "info".to_string());
        let file_dir = env_bool("ENABLE_FILE_LOGS")
            .unwrap_or(false)
            .then(|| PathBuf::from(env_string("LOG_DIR").unwrap_or_else(|| DEFAULT_LOG_DIR.to_string())));
        Self { level, file_dir }
    }
}

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
    /// Serve canned explanations when no API key is configured.
    pub mock: bool,
}

impl LlmSettings {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("LLM_API_KEY"),
            model: env_string("LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string()),
            api_endpoint: normalize_endpoint(
                &env_string("LLM_API_ENDPOINT")
                    .or_else(|| env_string("LLM_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_LLM_ENDPOINT.to_string()),
            ),
            timeout: Duration::from_millis(env_u64("LLM_TIMEOUT").unwrap_or(DEFAULT_LLM_TIMEOUT_MS)),
            mock: env_bool("LLM_MOCK").unwrap_or(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub log: LogSettings,
    pub catalog_path: Option<PathBuf>,
    pub explanations_path: Option<PathBuf>,
    /// Pins "today" instead of reading the system clock.
    pub pinned_date: Option<NaiveDate>,
    /// Language the terminal screen starts in.
    pub target_lang: Lang,
    pub explain_base_url: String,
    pub explain_timeout: Duration,
    pub llm: LlmSettings,
}

impl Config {
    pub fn from_env() -> Self {
        let port = env_string("PORT")
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);

        let host = env_string("HOST")
            .and_then(|value| value.parse::<IpAddr>().ok())
            .unwrap_or(IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0)));

        let pinned_date = env_string("PHRASE_DATE").and_then(|value| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map_err(|err| eprintln!("ignoring PHRASE_DATE={value}: {err}"))
                .ok()
        });

        let target_lang = env_string("PHRASE_LANG")
            .and_then(|value| {
                value
                    .parse::<Lang>()
                    .map_err(|err| eprintln!("ignoring PHRASE_LANG: {err}"))
                    .ok()
            })
            .unwrap_or(Lang::En);

        Self {
            host,
            port,
            log: LogSettings::from_env(),
            catalog_path: env_string("PHRASE_CATALOG_PATH").map(PathBuf::from),
            explanations_path: env_string("PHRASE_EXPLANATIONS_PATH").map(PathBuf::from),
            pinned_date,
            target_lang,
            explain_base_url: env_string("EXPLAIN_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_EXPLAIN_BASE_URL.to_string()),
            explain_timeout: Duration::from_millis(
                env_u64("EXPLAIN_TIMEOUT_MS").unwrap_or(DEFAULT_EXPLAIN_TIMEOUT_MS),
            ),
            llm: LlmSettings::from_env(),
        }
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// "Today" as configured: the pinned date if set, else the local date.
    pub fn clock(&self) -> Arc<dyn Clock> {
        match self.pinned_date {
            Some(date) => Arc::new(FixedClock::new(date)),
            None => Arc::new(SystemClock),
        }
    }

    /// Loads the phrase data and pairs it with the configured clock.
    pub fn resolver(&self) -> Result<PhraseResolver, PhraseError> {
        let store = PhraseStore::load(self.catalog_path.as_deref(), self.explanations_path.as_deref())?;
        if let Some(date) = self.pinned_date {
            tracing::info!(%date, "using pinned date");
        }
        Ok(PhraseResolver::new(store, self.clock()))
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.trim().parse().ok()
}

fn env_bool(key: &str) -> Option<bool> {
    parse_bool(&env_string(key)?)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Some(true),
        "0" | "false" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}
