// lptools: configuration and authentication glue for Launchpad CLI tools.
// Resolves per-app cache directories and a shared, disk-cached Launchpad login.

pub mod config;
pub mod credentials;
pub mod error;
pub mod launchpad;

pub use config::{
    CONSUMER_KEY, SessionProvider, cache_root, credentials_path, ensure_dir, get_session,
};
pub use credentials::Credentials;
pub use error::{LptoolsError, Result};
pub use launchpad::{ConsoleLogin, LoginFlow, SERVICE_ROOT, Session, WEB_ROOT};
