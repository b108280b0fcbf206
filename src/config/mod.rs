use anyhow::Result;
use dotenvy::dotenv;
use serde::Deserialize;

use crate::models::UserType;

fn default_session_path() -> String {
    ".billed-session.json".to_string()
}

fn default_user_type() -> UserType {
    UserType::Employee
}

fn default_modal_width() -> u32 {
    800
}

/// Configuration for the application
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Database connection URL. Without it the demo bills are served from memory.
    pub database_url: Option<String>,
    /// File the session record is persisted to
    #[serde(default = "default_session_path")]
    pub session_path: String,
    /// Seeds the session when none has been stored yet
    pub user_email: Option<String>,
    #[serde(default = "default_user_type")]
    pub user_type: UserType,
    /// Width in pixels of the receipt preview modal
    #[serde(default = "default_modal_width")]
    pub modal_width: u32,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Variables from a `.env` file are loaded first when it exists.
    pub fn load() -> Result<Self> {
        dotenv().ok();

        let config = envy::from_env::<Config>()?;

        Ok(config)
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
}

/// Initialize environment variables and load configuration
pub fn init() -> Result<Config> {
    Config::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_variables_are_missing() {
        let vars: Vec<(String, String)> = Vec::new();

        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.database_url(), None);
        assert_eq!(config.session_path, ".billed-session.json");
        assert_eq!(config.user_type, UserType::Employee);
        assert_eq!(config.modal_width, 800);
    }

    #[test]
    fn variables_override_defaults() {
        let vars = vec![
            ("DATABASE_URL".to_string(), "postgres://localhost/billed".to_string()),
            ("USER_EMAIL".to_string(), "a@a".to_string()),
            ("USER_TYPE".to_string(), "Admin".to_string()),
            ("MODAL_WIDTH".to_string(), "1200".to_string()),
        ];

        let config: Config = envy::from_iter(vars).unwrap();

        assert_eq!(config.database_url(), Some("postgres://localhost/billed"));
        assert_eq!(config.user_email.as_deref(), Some("a@a"));
        assert_eq!(config.user_type, UserType::Admin);
        assert_eq!(config.modal_width, 1200);
    }
}
