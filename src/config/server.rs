use std::net::SocketAddr;
use std::path::PathBuf;

use chrono::Duration;

/// Process-wide immutable configuration, built once at startup and passed
/// explicitly into the token verifier and store constructors.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub data_dir: PathBuf,
    /// Hours an issued access token stays valid.
    pub token_ttl_hours: i64,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("collabsphere.db")
    }

    /// Location of the JWT signing secret, created by `admin init`.
    #[must_use]
    pub fn secret_path(&self) -> PathBuf {
        self.data_dir.join(".jwt_secret")
    }

    #[must_use]
    pub fn token_ttl(&self) -> Duration {
        Duration::hours(self.token_ttl_hours)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            token_ttl_hours: 12,
        }
    }
}
