use crate::{
    constants::{DEFAULT_QUERY_TIMEOUT_SECS, DEFAULT_REALM_CACHE_SIZE, DEFAULT_TORII_SQL_URL},
    decoding::Calibration,
};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Query service
    pub torii_sql_url: String,
    pub query_timeout_secs: u64,

    // Decoding
    pub realm_cache_size: usize,
    pub calibration_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            torii_sql_url: env::var("TORII_SQL_URL")
                .unwrap_or_else(|_| DEFAULT_TORII_SQL_URL.to_string()),
            query_timeout_secs: env::var("QUERY_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_QUERY_TIMEOUT_SECS.to_string())
                .parse()?,

            realm_cache_size: env::var("REALM_CACHE_SIZE")
                .unwrap_or_else(|_| DEFAULT_REALM_CACHE_SIZE.to_string())
                .parse()?,
            calibration_path: env::var("CALIBRATION_PATH")
                .ok()
                .filter(|path| !path.trim().is_empty())
                .map(PathBuf::from),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.torii_sql_url.trim().is_empty() {
            anyhow::bail!("TORII_SQL_URL is empty");
        }
        url::Url::parse(&self.torii_sql_url)
            .map_err(|e| anyhow::anyhow!("TORII_SQL_URL is not a valid URL: {e}"))?;
        if self.query_timeout_secs == 0 {
            anyhow::bail!("QUERY_TIMEOUT_SECS must be at least 1");
        }

        if self.torii_sql_url.starts_with("http://") && self.is_production() {
            tracing::warn!("Torii SQL endpoint is not using TLS in production");
        }
        if self.realm_cache_size == 0 {
            tracing::warn!("Realm cache disabled (REALM_CACHE_SIZE=0)");
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    /// Built-in calibration unless `CALIBRATION_PATH` points at a JSON override.
    pub fn load_calibration(&self) -> anyhow::Result<Calibration> {
        match &self.calibration_path {
            Some(path) => Calibration::from_file(path),
            None => Ok(Calibration::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: "development".to_string(),
            torii_sql_url: DEFAULT_TORII_SQL_URL.to_string(),
            query_timeout_secs: DEFAULT_QUERY_TIMEOUT_SECS,
            realm_cache_size: DEFAULT_REALM_CACHE_SIZE,
            calibration_path: None,
        }
    }

    #[test]
    fn defaults_validate() {
        assert!(config().validate().is_ok());
        assert_eq!(config().query_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn rejects_bad_endpoint() {
        let mut cfg = config();
        cfg.torii_sql_url = "torii sql".to_string();
        assert!(cfg.validate().is_err());

        cfg.torii_sql_url = "  ".to_string();
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_zero_timeout() {
        let mut cfg = config();
        cfg.query_timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn missing_calibration_file_is_an_error() {
        let mut cfg = config();
        assert!(cfg.load_calibration().is_ok());

        cfg.calibration_path = Some(PathBuf::from("/nonexistent/calibration.json"));
        assert!(cfg.load_calibration().is_err());
    }
}
