// common/src/config.rs
use config::{Config as ConfigFile, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Central configuration for the portal core
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the backend REST API
    pub api_base_url: String,
    /// Directory holding the persisted session keys
    pub storage_dir: String,
    /// Preconfigured credential shortcuts offered on the login screen
    pub demo_accounts: Vec<DemoAccount>,
}

/// A demo profile that prefills the login form. Not a separate
/// authentication mechanism; it goes through the same endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoAccount {
    pub id: String,
    pub label: String,
    pub role: String,
    pub role_label: String,
    pub username_or_email: String,
    pub password: String,
    pub description: String,
    /// Skips the forced password change even when the backend requests one
    pub skip_password_prompt: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080/api".to_string(),
            storage_dir: "./.portal-session".to_string(),
            demo_accounts: vec![
                DemoAccount {
                    id: "admin".to_string(),
                    label: "Administrator".to_string(),
                    role: "admin".to_string(),
                    role_label: "Administrator".to_string(),
                    username_or_email: "admin@example.com".to_string(),
                    password: "Admin@123".to_string(),
                    description: "Full access to manage students, fee plans, and payments."
                        .to_string(),
                    skip_password_prompt: true,
                },
                DemoAccount {
                    id: "student-aditi".to_string(),
                    label: "Aditi Sharma".to_string(),
                    role: "student".to_string(),
                    role_label: "Student - Computer Science Engineering".to_string(),
                    username_or_email: "aditi.sharma@example.com".to_string(),
                    password: "Student1@123".to_string(),
                    description: "Computer Science Engineering student, academic year 2021-2025."
                        .to_string(),
                    skip_password_prompt: true,
                },
                DemoAccount {
                    id: "student-rahul".to_string(),
                    label: "Rahul Desai".to_string(),
                    role: "student".to_string(),
                    role_label: "Student - Business Administration".to_string(),
                    username_or_email: "rahul.desai@example.com".to_string(),
                    password: "Student2@123".to_string(),
                    description: "Business Administration student, academic year 2023-2027."
                        .to_string(),
                    skip_password_prompt: true,
                },
                DemoAccount {
                    id: "student-sofia".to_string(),
                    label: "Sofia Fernandes".to_string(),
                    role: "student".to_string(),
                    role_label: "Student - Mechanical Engineering".to_string(),
                    username_or_email: "sofia.fernandes@example.com".to_string(),
                    password: "Student3@123".to_string(),
                    description: "Mechanical Engineering student, academic year 2022-2026."
                        .to_string(),
                    skip_password_prompt: true,
                },
            ],
        }
    }
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        // Get the run mode, defaulting to "development"
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        // Locate the config directory
        let config_dir = env::var("CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                // Check if we're in the project root or a subcrate
                let mut path = PathBuf::from("./config");
                if !path.exists() {
                    path = PathBuf::from("../config");
                }
                path
            });

        tracing::info!("Loading configuration from {}", config_dir.display());
        tracing::info!("Using run mode: {}", run_mode);

        // Build configuration
        let config = ConfigFile::builder()
            // Start with defaults
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Add environment specific config
            .add_source(File::from(config_dir.join(format!("{}.toml", run_mode))).required(false))
            // Add a local config file for local overrides
            .add_source(File::from(config_dir.join("local.toml")).required(false))
            // Add environment variables with prefix "APP"
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Build and deserialize
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Load from environment variables directly (backward compatibility)
    pub fn from_env() -> Self {
        // Try to load from file first
        match Self::load() {
            Ok(config) => {
                tracing::info!("Configuration loaded from files and environment");
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load configuration from files: {}", e);
                tracing::info!("Falling back to environment variables only");

                let mut config = Self::default();

                if let Ok(api_base_url) = env::var("API_BASE_URL") {
                    config.api_base_url = api_base_url;
                }

                if let Ok(storage_dir) = env::var("SESSION_STORAGE_DIR") {
                    config.storage_dir = storage_dir;
                }

                // Demo credentials can be pointed at a seeded backend
                config.override_account("admin", "DEMO_ADMIN_EMAIL", "DEMO_ADMIN_PASSWORD");
                config.override_account(
                    "student-aditi",
                    "DEMO_STUDENT_EMAIL",
                    "DEMO_STUDENT_PASSWORD",
                );
                config.override_account(
                    "student-rahul",
                    "DEMO_STUDENT_EMAIL_2",
                    "DEMO_STUDENT_PASSWORD_2",
                );
                config.override_account(
                    "student-sofia",
                    "DEMO_STUDENT_EMAIL_3",
                    "DEMO_STUDENT_PASSWORD_3",
                );

                config
            }
        }
    }

    /// Look up a demo account by its identifier
    pub fn find_account(&self, id: &str) -> Option<&DemoAccount> {
        self.demo_accounts.iter().find(|account| account.id == id)
    }

    fn override_account(&mut self, id: &str, email_var: &str, password_var: &str) {
        if let Some(account) = self.demo_accounts.iter_mut().find(|a| a.id == id) {
            if let Ok(email) = env::var(email_var) {
                account.username_or_email = email;
            }
            if let Ok(password) = env::var(password_var) {
                account.password = password;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalogue_has_admin_and_students() {
        let config = Config::default();
        assert_eq!(config.demo_accounts.len(), 4);
        assert!(config.find_account("admin").is_some());
        assert_eq!(
            config.find_account("student-aditi").map(|a| a.role.as_str()),
            Some("student")
        );
        assert!(config.find_account("missing").is_none());
    }
}
