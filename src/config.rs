use anyhow::Context;
use serde::Deserialize;

use crate::appointments::availability::StatusPolicy;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt: JwtConfig,
    /// Statuses that free the barber's slot (e.g. "cancelled").
    pub inactive_statuses: Vec<String>,
    pub seed_static_data: bool,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(get: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = get("DATABASE_URL").context("DATABASE_URL is not set")?;
        let jwt = JwtConfig {
            secret: get("JWT_SECRET").context("JWT_SECRET is not set")?,
            issuer: get("JWT_ISSUER").unwrap_or_else(|| "barbershop".into()),
            audience: get("JWT_AUDIENCE").unwrap_or_else(|| "barbershop-users".into()),
            ttl_minutes: get("JWT_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60),
            refresh_ttl_minutes: get("JWT_REFRESH_TTL_MINUTES")
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(60 * 24 * 14),
        };
        let db_max_connections = get("DB_MAX_CONNECTIONS")
            .and_then(|v| v.parse::<u32>().ok())
            .unwrap_or(10);
        let inactive_statuses = get("INACTIVE_STATUSES")
            .map(|v| parse_status_list(&v))
            .unwrap_or_else(|| vec![crate::appointments::STATUS_CANCELLED.to_string()]);
        let seed_static_data = get("SEED_STATIC_DATA")
            .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(true);

        Ok(Self {
            database_url,
            db_max_connections,
            jwt,
            inactive_statuses,
            seed_static_data,
        })
    }

    pub fn status_policy(&self) -> StatusPolicy {
        StatusPolicy::new(self.inactive_statuses.iter().cloned())
    }
}

fn parse_status_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
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
    fn defaults_applied_when_optional_vars_missing() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/barbershop"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .expect("config should load");

        assert_eq!(cfg.db_max_connections, 10);
        assert_eq!(cfg.jwt.issuer, "barbershop");
        assert_eq!(cfg.jwt.audience, "barbershop-users");
        assert_eq!(cfg.jwt.ttl_minutes, 60);
        assert_eq!(cfg.jwt.refresh_ttl_minutes, 60 * 24 * 14);
        assert_eq!(cfg.inactive_statuses, vec!["cancelled".to_string()]);
        assert!(cfg.seed_static_data);
    }

    #[test]
    fn missing_database_url_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("JWT_SECRET", "x")])).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn missing_jwt_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("DATABASE_URL", "postgres://x")])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn inactive_statuses_are_normalized() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "x"),
            ("INACTIVE_STATUSES", " Cancelled, no-show ,,"),
            ("SEED_STATIC_DATA", "false"),
        ]))
        .unwrap();

        assert_eq!(cfg.inactive_statuses, vec!["cancelled", "no-show"]);
        assert!(!cfg.seed_static_data);
        assert!(!cfg.status_policy().occupies("no-show"));
        assert!(cfg.status_policy().occupies("pending"));
    }

    #[test]
    fn unparsable_numbers_fall_back_to_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://x"),
            ("JWT_SECRET", "x"),
            ("JWT_TTL_MINUTES", "soon"),
            ("DB_MAX_CONNECTIONS", "-3"),
        ]))
        .unwrap();

        assert_eq!(cfg.jwt.ttl_minutes, 60);
        assert_eq!(cfg.db_max_connections, 10);
    }
}
