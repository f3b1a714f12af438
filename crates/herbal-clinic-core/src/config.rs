//! Runtime configuration.

use std::time::Duration;

pub const PRODUCTION_API_URL: &str = "https://web-production-6a494.up.railway.app";
pub const DEVELOPMENT_API_URL: &str = "http://localhost:8000";

/// Notification polling interval.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(15);

/// How long a transient notice stays visible.
pub const DEFAULT_NOTICE_DURATION: Duration = Duration::from_millis(4000);

pub const DEFAULT_SESSION_DB: &str = "herbal_clinic_session.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicConfig {
    pub api_base_url: String,
    pub notification_poll_interval: Duration,
    pub notice_duration: Duration,
    pub session_db_path: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEVELOPMENT_API_URL.to_string(),
            notification_poll_interval: DEFAULT_POLL_INTERVAL,
            notice_duration: DEFAULT_NOTICE_DURATION,
            session_db_path: DEFAULT_SESSION_DB.to_string(),
        }
    }
}

impl ClinicConfig {
    /// Read configuration from the process environment, after loading a
    /// `.env` file if one exists.
    ///
    /// - `CLINIC_IS_PRODUCTION=true` selects the production backend
    /// - `CLINIC_API_URL` overrides the backend URL
    /// - `CLINIC_POLL_SECONDS` sets the notification poll interval
    /// - `CLINIC_SESSION_DB` sets the session database path
    pub fn from_env() -> Self {
        if let Ok(path) = dotenvy::dotenv() {
            log::info!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if lookup("CLINIC_IS_PRODUCTION").as_deref() == Some("true") {
            config.api_base_url = PRODUCTION_API_URL.to_string();
        }
        if let Some(url) = lookup("CLINIC_API_URL").filter(|u| !u.trim().is_empty()) {
            config.api_base_url = url.trim().trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup("CLINIC_POLL_SECONDS") {
            match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.notification_poll_interval = Duration::from_secs(secs),
                _ => log::warn!("Ignoring invalid CLINIC_POLL_SECONDS={:?}", raw),
            }
        }
        if let Some(path) = lookup("CLINIC_SESSION_DB").filter(|p| !p.trim().is_empty()) {
            config.session_db_path = path;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ClinicConfig::from_lookup(lookup(&[]));
        assert_eq!(config.api_base_url, DEVELOPMENT_API_URL);
        assert_eq!(config.notification_poll_interval, Duration::from_secs(15));
    }

    #[test]
    fn test_production_switch_and_override() {
        let config = ClinicConfig::from_lookup(lookup(&[("CLINIC_IS_PRODUCTION", "true")]));
        assert_eq!(config.api_base_url, PRODUCTION_API_URL);

        let config = ClinicConfig::from_lookup(lookup(&[
            ("CLINIC_IS_PRODUCTION", "true"),
            ("CLINIC_API_URL", "http://10.0.0.5:8000/"),
        ]));
        assert_eq!(config.api_base_url, "http://10.0.0.5:8000");
    }

    #[test]
    fn test_invalid_poll_seconds_ignored() {
        let config = ClinicConfig::from_lookup(lookup(&[("CLINIC_POLL_SECONDS", "0")]));
        assert_eq!(config.notification_poll_interval, DEFAULT_POLL_INTERVAL);

        let config = ClinicConfig::from_lookup(lookup(&[("CLINIC_POLL_SECONDS", "30")]));
        assert_eq!(config.notification_poll_interval, Duration::from_secs(30));
    }
}
