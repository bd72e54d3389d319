use anyhow::{Context, Result};
use dotenvy::dotenv;
use product_scraper::{RendererConfig, SiteProfile};
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Optional JSON site profile; the built-in profile is used when unset
    pub site_profile_path: Option<String>,
    pub render_timeout_secs: u64,
    pub user_agent: Option<String>,
    pub job_retention_days: i64,
    pub housekeeping_interval_secs: u64,
    pub estimated_completion_secs: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            port: parse_var("PORT", 8080)?,
            site_profile_path: env::var("SITE_PROFILE_PATH").ok(),
            render_timeout_secs: parse_var("RENDER_TIMEOUT_SECS", 30)?,
            user_agent: env::var("USER_AGENT").ok(),
            job_retention_days: parse_var("JOB_RETENTION_DAYS", 7)?,
            housekeeping_interval_secs: parse_var("HOUSEKEEPING_INTERVAL_SECS", 3600)?,
            estimated_completion_secs: parse_var("ESTIMATED_COMPLETION_SECS", 300)?,
        })
    }

    pub fn renderer_config(&self) -> RendererConfig {
        let config =
            RendererConfig::default().with_timeout(Duration::from_secs(self.render_timeout_secs));
        match &self.user_agent {
            Some(user_agent) => config.with_user_agent(user_agent.clone()),
            None => config,
        }
    }

    /// The configured site profile, read from `SITE_PROFILE_PATH` when set.
    pub fn site_profile(&self) -> Result<SiteProfile> {
        let Some(path) = &self.site_profile_path else {
            return Ok(SiteProfile::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read site profile {}", path))?;
        SiteProfile::from_json(&json).with_context(|| format!("Invalid site profile {}", path))
    }

    pub fn job_retention(&self) -> chrono::Duration {
        chrono::Duration::days(self.job_retention_days)
    }

    pub fn housekeeping_interval(&self) -> Duration {
        Duration::from_secs(self.housekeeping_interval_secs)
    }

    pub fn estimated_completion(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.estimated_completion_secs)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{} must be a valid number", name)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> Config {
        Config {
            port: 8080,
            site_profile_path: None,
            render_timeout_secs: 30,
            user_agent: None,
            job_retention_days: 7,
            housekeeping_interval_secs: 3600,
            estimated_completion_secs: 300,
        }
    }

    #[test]
    fn test_parse_var_default_and_invalid() {
        assert_eq!(parse_var::<u16>("SCRAPE_SERVER_TEST_UNSET_VAR", 8080).unwrap(), 8080);

        env::set_var("SCRAPE_SERVER_TEST_BAD_PORT", "eighty");
        assert!(parse_var::<u16>("SCRAPE_SERVER_TEST_BAD_PORT", 8080).is_err());
        env::remove_var("SCRAPE_SERVER_TEST_BAD_PORT");
    }

    #[test]
    fn test_derived_durations() {
        let config = defaults();
        assert_eq!(config.job_retention(), chrono::Duration::days(7));
        assert_eq!(config.housekeeping_interval(), Duration::from_secs(3600));
        assert_eq!(config.estimated_completion(), chrono::Duration::minutes(5));
        assert_eq!(config.renderer_config().timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_site_profile_defaults_and_missing_file() {
        let config = defaults();
        assert_eq!(config.site_profile().unwrap(), SiteProfile::default());

        let missing = Config {
            site_profile_path: Some("/nonexistent/profile.json".to_string()),
            ..defaults()
        };
        assert!(missing.site_profile().is_err());
    }
}
