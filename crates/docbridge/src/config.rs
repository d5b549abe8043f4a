use std::{env, time::Duration};

/// Connector configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string (default: "mongodb://localhost:27017")
    pub mongodb_uri: String,
    /// Database to operate on (default: "docbridge")
    pub database: String,
    /// Application name reported to the server (default: "docbridge")
    pub app_name: String,
    /// Connect and server-selection timeout in milliseconds (default: 10,000)
    pub connect_timeout_ms: u64,
    /// Write-concern timeout for inserts and deletes in milliseconds (default: 1,000)
    pub write_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `MONGODB_URI` - Connection string (default: "mongodb://localhost:27017")
    /// - `MONGODB_DATABASE` - Database name (default: "docbridge")
    /// - `MONGODB_APP_NAME` - Application name (default: "docbridge")
    /// - `MONGODB_CONNECT_TIMEOUT_MS` - Connect timeout (default: 10,000)
    /// - `MONGODB_WRITE_TIMEOUT_MS` - Write-concern timeout (default: 1,000)
    pub fn from_env() -> Self {
        Self {
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            database: env::var("MONGODB_DATABASE").unwrap_or_else(|_| "docbridge".to_string()),
            app_name: env::var("MONGODB_APP_NAME").unwrap_or_else(|_| "docbridge".to_string()),
            connect_timeout_ms: env::var("MONGODB_CONNECT_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000),
            write_timeout_ms: env::var("MONGODB_WRITE_TIMEOUT_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(1_000),
        }
    }

    /// Replace the connection string and database with explicit values,
    /// keeping the environment values for whatever is `None`.
    pub fn with_overrides(mut self, uri: Option<String>, database: Option<String>) -> Self {
        if let Some(uri) = uri {
            self.mongodb_uri = uri;
        }
        if let Some(database) = database {
            self.database = database;
        }
        self
    }

    /// Get the connect timeout as a Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Get the write-concern timeout as a Duration.
    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
