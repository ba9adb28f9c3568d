use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Which `DocumentStore` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    MongoDB,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mongodb" | "mongo" => Ok(StoreBackend::MongoDB),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(()),
        }
    }
}

/// What filing a report does when the reported survey does not exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSurveyPolicy {
    /// Keep the report, skip the counter increment.
    Ignore,
    /// Fail the whole operation and persist nothing.
    Reject,
}

impl FromStr for MissingSurveyPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(MissingSurveyPolicy::Ignore),
            "reject" => Ok(MissingSurveyPolicy::Reject),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub database_name: String,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub stripe_secret_key: Option<String>,
    pub payment_currency: String,
    pub missing_survey_policy: MissingSurveyPolicy,
    /// Empty means any origin is accepted.
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup so tests never touch the process env.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match var("PORT") {
            Some(p) => p.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: p,
            })?,
            None => 5001,
        };

        let store_backend = match var("STORE_BACKEND") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "STORE_BACKEND",
                value: v,
            })?,
            None => StoreBackend::MongoDB,
        };

        let database_url = var("DATABASE_URL");
        if store_backend == StoreBackend::MongoDB && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let missing_survey_policy = match var("REPORT_MISSING_SURVEY") {
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                key: "REPORT_MISSING_SURVEY",
                value: v,
            })?,
            None => MissingSurveyPolicy::Ignore,
        };

        let cors_origins = var("CORS_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            store_backend,
            database_url,
            database_name: var("DATABASE_NAME").unwrap_or_else(|| "SurveyAtlas".to_string()),
            jwt_secret: var("ACCESS_TOKEN_SECRET").ok_or(ConfigError::Missing("ACCESS_TOKEN_SECRET"))?,
            jwt_issuer: var("JWT_ISSUER").unwrap_or_else(|| "survey-service".to_string()),
            stripe_secret_key: var("STRIPE_SECRET_KEY"),
            payment_currency: var("PAYMENT_CURRENCY")
                .unwrap_or_else(|| "usd".to_string())
                .to_ascii_lowercase(),
            missing_survey_policy,
            cors_origins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "mongodb://localhost:27017"),
            ("ACCESS_TOKEN_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.port, 5001);
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.database_name, "SurveyAtlas");
        assert_eq!(config.store_backend, StoreBackend::MongoDB);
        assert_eq!(config.payment_currency, "usd");
        assert_eq!(config.missing_survey_policy, MissingSurveyPolicy::Ignore);
        assert!(config.stripe_secret_key.is_none());
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn test_token_secret_is_required() {
        let err = Config::from_lookup(lookup(&[("STORE_BACKEND", "memory")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("ACCESS_TOKEN_SECRET")));
    }

    #[test]
    fn test_database_url_only_required_for_mongodb() {
        let err = Config::from_lookup(lookup(&[("ACCESS_TOKEN_SECRET", "s")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("DATABASE_URL")));

        let config = Config::from_lookup(lookup(&[
            ("ACCESS_TOKEN_SECRET", "s"),
            ("STORE_BACKEND", "memory"),
            ("REPORT_MISSING_SURVEY", "reject"),
            ("CORS_ORIGINS", "http://localhost:5173, https://surveyatlas.app"),
        ]))
        .unwrap();
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert_eq!(config.missing_survey_policy, MissingSurveyPolicy::Reject);
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup(&[
            ("ACCESS_TOKEN_SECRET", "s"),
            ("STORE_BACKEND", "memory"),
            ("PORT", "eighty"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));
    }
}
