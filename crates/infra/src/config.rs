use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Port for the application to run on
    pub port: u16,
    pub environment: Environment,
    /// IANA timezone assigned to auto-provisioned users
    pub default_timezone: String,
    /// When absent the process runs on the in-memory repositories, which is
    /// only acceptable during development and testing
    pub postgres_dsn: Option<String>,
    pub provider: ProviderConfig,
    pub llm: LlmKeys,
    /// Inbound messages accepted per sender number per minute
    pub rate_limit_per_minute: u32,
    /// Interval between reminder worker ticks
    pub reminder_tick: Duration,
}

/// Messaging provider credentials (outbound send API + webhook secret)
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub sender: String,
    /// Empty secret disables webhook signature verification (dev mode)
    pub webhook_secret: String,
}

#[derive(Debug, Clone, Default)]
pub struct LlmKeys {
    pub anthropic_api_key: Option<String>,
    pub openai_api_key: Option<String>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let default_port = "8080";
        let port = std::env::var("PORT").unwrap_or_else(|_| default_port.into());
        let port = match port.parse::<u16>() {
            Ok(port) => port,
            Err(_) => {
                warn!(
                    "The given PORT: {} is not valid, falling back to the default port: {}.",
                    port, default_port
                );
                default_port.parse::<u16>().unwrap()
            }
        };

        let environment = parse_environment(
            &std::env::var("ENV").unwrap_or_else(|_| "development".into()),
        );
        let default_timezone = std::env::var("TIMEZONE_DEFAULT").unwrap_or_else(|_| "UTC".into());
        let postgres_dsn = std::env::var("POSTGRES_DSN").ok();

        let base_url = require_env("PROVIDER_BASE_URL")?;
        let api_key = require_env("PROVIDER_API_KEY")?;
        let sender = require_env("PROVIDER_SENDER")?;
        let webhook_secret = std::env::var("PROVIDER_WEBHOOK_SECRET").unwrap_or_default();
        if webhook_secret.is_empty() {
            warn!("PROVIDER_WEBHOOK_SECRET is not set. Accepting all webhook payloads.");
        }

        Ok(Self {
            port,
            environment,
            default_timezone,
            postgres_dsn,
            provider: ProviderConfig {
                base_url,
                api_key,
                sender,
                webhook_secret,
            },
            llm: LlmKeys {
                anthropic_api_key: std::env::var("ANTHROPIC_API_KEY").ok(),
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
            },
            rate_limit_per_minute: env_as_u32_or("RATE_LIMIT_PER_MINUTE", 30),
            reminder_tick: Duration::from_secs(env_as_u32_or("REMINDER_TICK_SECONDS", 30) as u64),
        })
    }
}

/// Development defaults, used by tests and the in-memory context
impl Default for Config {
    fn default() -> Self {
        Self {
            port: 0,
            environment: Environment::Development,
            default_timezone: "UTC".into(),
            postgres_dsn: None,
            provider: ProviderConfig {
                base_url: "https://api.infobip.com".into(),
                api_key: String::new(),
                sender: String::new(),
                webhook_secret: String::new(),
            },
            llm: LlmKeys::default(),
            rate_limit_per_minute: 30,
            reminder_tick: Duration::from_secs(30),
        }
    }
}

fn parse_environment(value: &str) -> Environment {
    match value {
        "production" => Environment::Production,
        _ => Environment::Development,
    }
}

fn require_env(key: &str) -> anyhow::Result<String> {
    match std::env::var(key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => anyhow::bail!("{} is required", key),
    }
}

fn env_as_u32_or(key: &str, default: u32) -> u32 {
    match std::env::var(key) {
        Ok(value) => match value.parse::<u32>() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(
                    "The given {}: {} is not valid, falling back to the default: {}.",
                    key, value, default
                );
                default
            }
        },
        Err(_) => default,
    }
}
