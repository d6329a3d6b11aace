//! API configuration.

use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    pub rate_limit_rps: u32,
    pub request_timeout: Duration,
    /// Max request body size; multipart uploads must fit under this.
    pub max_body_size: usize,
    pub environment: String,
    /// HS256 signing secret for bearer tokens.
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub jwt_expiry_hours: i64,
    /// Base URL used in password-reset links.
    pub frontend_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            rate_limit_rps: 10,
            request_timeout: Duration::from_secs(30),
            max_body_size: 10 * 1024 * 1024,
            environment: "development".to_string(),
            jwt_secret: String::new(),
            jwt_expiry_hours: 24,
            frontend_url: "http://localhost:3000".to_string(),
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("API_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_else(|_| vec!["*".to_string()]),
            rate_limit_rps: std::env::var("RATE_LIMIT_RPS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
            request_timeout: Duration::from_secs(
                std::env::var("REQUEST_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            max_body_size: std::env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10 * 1024 * 1024),
            environment: std::env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string()),
            jwt_secret: std::env::var("JWT_SECRET").unwrap_or_default(),
            jwt_expiry_hours: std::env::var("JWT_EXPIRY_HOURS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(24),
            frontend_url: std::env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:3000".to_string()),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment.to_lowercase() == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn from_env_falls_back_to_defaults() {
        for var in [
            "API_HOST",
            "API_PORT",
            "CORS_ORIGINS",
            "JWT_EXPIRY_HOURS",
            "ENVIRONMENT",
        ] {
            std::env::remove_var(var);
        }
        let config = ApiConfig::from_env();
        assert_eq!(config.port, 8000);
        assert_eq!(config.jwt_expiry_hours, 24);
        assert!(!config.is_production());
    }

    #[test]
    #[serial]
    fn production_flag_is_case_insensitive() {
        std::env::set_var("ENVIRONMENT", "Production");
        let config = ApiConfig::from_env();
        assert!(config.is_production());
        std::env::remove_var("ENVIRONMENT");
    }
}
