// Application configuration loaded from the environment

use std::time::Duration;

/// Errors raised while reading configuration at startup
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set in environment")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Evolution API (WhatsApp gateway) settings
#[derive(Debug, Clone)]
pub struct EvolutionConfig {
    pub base_url: String,
    pub api_key: String,
    /// Public base URL of this service, used to point instance webhooks back at us
    pub webhook_base_url: Option<String>,
}

/// LLM chat-completion settings
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

/// Abandoned-conversation sweep settings
#[derive(Debug, Clone)]
pub struct FollowUpConfig {
    pub interval: Duration,
    pub abandoned_after_hours: i64,
    pub discount_percent: u32,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub http_timeout: Duration,
    pub evolution: EvolutionConfig,
    pub openai: OpenAiConfig,
    pub follow_up: FollowUpConfig,
}

impl AppConfig {
    /// Reads the configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str, default: &str| -> String {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let port = parse_number::<u16>("PORT", &optional("PORT", "8080"))?;
        let timeout_secs = parse_number::<u64>("HTTP_TIMEOUT_SECS", &optional("HTTP_TIMEOUT_SECS", "30"))?;
        let interval_minutes = parse_number::<u64>(
            "FOLLOW_UP_INTERVAL_MINUTES",
            &optional("FOLLOW_UP_INTERVAL_MINUTES", "10"),
        )?;
        if interval_minutes == 0 {
            return Err(ConfigError::Invalid {
                name: "FOLLOW_UP_INTERVAL_MINUTES",
                value: interval_minutes.to_string(),
            });
        }
        let abandoned_after_hours = parse_number::<i64>(
            "ABANDONED_AFTER_HOURS",
            &optional("ABANDONED_AFTER_HOURS", "3"),
        )?;
        let discount_percent = parse_number::<u32>(
            "FOLLOW_UP_DISCOUNT_PERCENT",
            &optional("FOLLOW_UP_DISCOUNT_PERCENT", "10"),
        )?;
        if abandoned_after_hours <= 0 {
            return Err(ConfigError::Invalid {
                name: "ABANDONED_AFTER_HOURS",
                value: abandoned_after_hours.to_string(),
            });
        }
        if discount_percent == 0 || discount_percent > 100 {
            return Err(ConfigError::Invalid {
                name: "FOLLOW_UP_DISCOUNT_PERCENT",
                value: discount_percent.to_string(),
            });
        }

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: optional("HOST", "0.0.0.0"),
            port,
            http_timeout: Duration::from_secs(timeout_secs),
            evolution: EvolutionConfig {
                base_url: trim_slash(required("EVOLUTION_API_URL")?),
                api_key: required("EVOLUTION_API_KEY")?,
                webhook_base_url: lookup("WEBHOOK_BASE_URL")
                    .filter(|v| !v.trim().is_empty())
                    .map(trim_slash),
            },
            openai: OpenAiConfig {
                api_key: required("OPENAI_API_KEY")?,
                base_url: trim_slash(optional("OPENAI_BASE_URL", "https://api.openai.com/v1")),
                model: optional("OPENAI_MODEL", "gpt-4o-mini"),
            },
            follow_up: FollowUpConfig {
                interval: Duration::from_secs(interval_minutes * 60),
                abandoned_after_hours,
                discount_percent,
            },
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse::<T>().map_err(|_| ConfigError::Invalid {
        name,
        value: value.to_string(),
    })
}

fn trim_slash(url: String) -> String {
    url.trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("DATABASE_URL", "postgresql://localhost/restaurants"),
            ("EVOLUTION_API_URL", "http://evolution.local/"),
            ("EVOLUTION_API_KEY", "evo-key"),
            ("OPENAI_API_KEY", "sk-test"),
        ])
    }

    fn load(env: &HashMap<&'static str, &'static str>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(|name| env.get(name).map(|v| v.to_string()))
    }

    #[test]
    fn test_defaults_applied() {
        let config = load(&base_env()).unwrap();
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.evolution.base_url, "http://evolution.local");
        assert_eq!(config.evolution.webhook_base_url, None);
        assert_eq!(config.openai.model, "gpt-4o-mini");
        assert_eq!(config.follow_up.interval, Duration::from_secs(600));
        assert_eq!(config.follow_up.abandoned_after_hours, 3);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_missing_secret_is_an_error() {
        let mut env = base_env();
        env.remove("EVOLUTION_API_KEY");
        let err = load(&env).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("EVOLUTION_API_KEY")));
    }

    #[test]
    fn test_blank_secret_counts_as_missing() {
        let mut env = base_env();
        env.insert("OPENAI_API_KEY", "   ");
        assert!(matches!(load(&env), Err(ConfigError::Missing("OPENAI_API_KEY"))));
    }

    #[test]
    fn test_invalid_port_rejected() {
        let mut env = base_env();
        env.insert("PORT", "eighty");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { name: "PORT", .. })
        ));
    }

    #[test]
    fn test_zero_follow_up_interval_rejected() {
        let mut env = base_env();
        env.insert("FOLLOW_UP_INTERVAL_MINUTES", "0");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { name: "FOLLOW_UP_INTERVAL_MINUTES", .. })
        ));
    }

    #[test]
    fn test_non_positive_abandoned_window_rejected() {
        let mut env = base_env();
        env.insert("ABANDONED_AFTER_HOURS", "0");
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { name: "ABANDONED_AFTER_HOURS", .. })
        ));
    }

    #[test]
    fn test_discount_percent_bounds() {
        let mut env = base_env();
        env.insert("FOLLOW_UP_DISCOUNT_PERCENT", "150");
        assert!(load(&env).is_err());
    }
}
