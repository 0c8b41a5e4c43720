// Persisted Launchpad credentials.
// An OAuth token pair stored as JSON at a fixed path under the lptools cachedir.

use std::fs;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Serialized proof of an authenticated Launchpad session.
///
/// Held in memory for the process lifetime; never refreshed or invalidated
/// here. Contents are not validated on load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    /// The consumer identity the user authorized.
    pub consumer_key: String,
    /// OAuth access token.
    pub access_token: String,
    /// Secret paired with the access token.
    pub access_secret: String,
}

impl Credentials {
    /// Load credentials from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let credentials = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), "loaded credentials");
        Ok(credentials)
    }

    /// Save credentials to a file, creating parent directories as needed.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self)?;

        // Write atomically via temp file
        let temp_path = path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        fs::rename(&temp_path, path)?;

        debug!(path = %path.display(), "saved credentials");
        Ok(())
    }
}
