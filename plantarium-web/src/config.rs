//! Environment configuration
//!
//! Every deployment knob is resolved once at startup into a [`Config`]
//! that is passed into construction. A feature whose credential is
//! missing fails loudly at first use instead of degrading silently.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::{info, warn};

use plantarium_common::{Error, Result};

/// Resolved service configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Data directory holding the database and the photo store
    pub root_folder: PathBuf,
    /// Socket address the HTTP server binds
    pub bind_addr: SocketAddr,
    /// Base prepended to served photo paths; empty means same-origin
    pub public_base_url: String,
    /// Trefle API token, required for Trefle search
    pub trefle_api_key: Option<String>,
    /// Perenual API key, required for Perenual search and care guides
    pub perenual_api_key: Option<String>,
    /// Identity-provider secret for session token verification
    pub session_secret: Option<String>,
}

impl Config {
    /// Resolve configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let root_folder = env_var("PLANTARIUM_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./data"));

        let bind_addr = match env_var("PLANTARIUM_BIND") {
            Some(raw) => raw.parse().map_err(|e| {
                Error::Config(format!("PLANTARIUM_BIND is not a socket address: {}", e))
            })?,
            None => SocketAddr::from(([127, 0, 0, 1], 8720)),
        };

        let public_base_url = env_var("PLANTARIUM_PUBLIC_URL")
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_default();

        let trefle_api_key = env_var("PLANTARIUM_TREFLE_API_KEY");
        let perenual_api_key = env_var("PLANTARIUM_PERENUAL_API_KEY");
        let session_secret = env_var("PLANTARIUM_SESSION_SECRET");

        report_key("Trefle API key", trefle_api_key.is_some(), "search");
        report_key("Perenual API key", perenual_api_key.is_some(), "search and care guides");
        report_key("Session secret", session_secret.is_some(), "write endpoints");

        Ok(Self {
            root_folder,
            bind_addr,
            public_base_url,
            trefle_api_key,
            perenual_api_key,
            session_secret,
        })
    }

    /// Path of the SQLite database inside the data directory
    pub fn database_path(&self) -> PathBuf {
        self.root_folder.join("plantarium.db")
    }

    /// Directory of the photo object store inside the data directory
    pub fn photos_dir(&self) -> PathBuf {
        self.root_folder.join("photos")
    }
}

/// Read an env var, treating unset and blank values as absent
fn env_var(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn report_key(name: &str, configured: bool, feature: &str) {
    if configured {
        info!("{} configured", name);
    } else {
        warn!("{} not configured; {} will report a server error", name, feature);
    }
}
