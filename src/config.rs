use std::time::Duration;

use anyhow::Context;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub fetch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .context("DATABASE_URL must be set to a production Postgres instance")?;
        Self::from_parts(
            database_url,
            std::env::var("GRADES_MAX_CONNECTIONS").ok(),
            std::env::var("GRADES_FETCH_TIMEOUT_SECS").ok(),
        )
    }

    fn from_parts(
        database_url: String,
        max_connections: Option<String>,
        fetch_timeout_secs: Option<String>,
    ) -> anyhow::Result<Self> {
        let max_connections = match max_connections {
            Some(value) => value
                .parse()
                .with_context(|| format!("GRADES_MAX_CONNECTIONS is not a number: {value}"))?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let fetch_timeout_secs = match fetch_timeout_secs {
            Some(value) => value
                .parse()
                .with_context(|| format!("GRADES_FETCH_TIMEOUT_SECS is not a number: {value}"))?,
            None => DEFAULT_FETCH_TIMEOUT_SECS,
        };

        Ok(Self {
            database_url,
            max_connections,
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = Config::from_parts("postgres://localhost/grades".to_string(), None, None)
            .unwrap();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.fetch_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_parts(
            "postgres://localhost/grades".to_string(),
            Some("12".to_string()),
            Some("3".to_string()),
        )
        .unwrap();
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.fetch_timeout, Duration::from_secs(3));
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = Config::from_parts(
            "postgres://localhost/grades".to_string(),
            Some("many".to_string()),
            None,
        )
        .unwrap_err();
        assert!(err.to_string().contains("GRADES_MAX_CONNECTIONS"));
    }
}
