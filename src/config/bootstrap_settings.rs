use std::sync::Arc;

use crate::config::errors::ConfigError;
use crate::config::EnvironmentProvider;

/// Bootstrap settings for infrastructure configuration
pub struct BootstrapSettings {
    database_url: String,
    audit_database_url: String,
    document_store_dir: String,
    server_host: String,
    server_port: u16,
}

impl BootstrapSettings {
    /// Load bootstrap settings from environment variables
    pub fn from_env_provider(
        env: Arc<dyn EnvironmentProvider + Send + Sync>,
    ) -> Result<Self, ConfigError> {
        let database_url = env
            .get_var("DATABASE_URL")
            .unwrap_or_else(|| "sqlite://labtrack.db?mode=rwc".to_string());

        let audit_database_url = env
            .get_var("AUDIT_DATABASE_URL")
            .unwrap_or_else(|| "sqlite://audit.db?mode=rwc".to_string());

        let document_store_dir = env
            .get_var("DOCUMENT_STORE_DIR")
            .unwrap_or_else(|| "./documents".to_string());

        let server_host = env
            .get_var("HOST")
            .unwrap_or_else(|| "0.0.0.0".to_string());

        let port_value = env.get_var("PORT").unwrap_or_else(|| "3000".to_string());
        let server_port: u16 = port_value
            .parse()
            .map_err(|_| ConfigError::invalid("PORT", format!("not a port number: {}", port_value)))?;
        if server_port == 0 {
            return Err(ConfigError::invalid("PORT", "port 0 is not usable"));
        }

        Ok(Self {
            database_url,
            audit_database_url,
            document_store_dir,
            server_host,
            server_port,
        })
    }

    /// Convenience method that uses the system environment provider
    pub fn from_env() -> Result<Self, ConfigError> {
        use crate::config::SystemEnvironment;
        Self::from_env_provider(Arc::new(SystemEnvironment))
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }
    pub fn audit_database_url(&self) -> &str {
        &self.audit_database_url
    }
    pub fn document_store_dir(&self) -> &str {
        &self.document_store_dir
    }
    pub fn server_host(&self) -> &str {
        &self.server_host
    }
    pub fn server_port(&self) -> u16 {
        self.server_port
    }
}
