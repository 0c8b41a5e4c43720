// Session provisioning glue for lptools.
// Resolves per-app cache directories and the shared credentials file, and
// hands back a logged-in Launchpad session.

use std::fs;
use std::path::{Path, PathBuf};

use directories::BaseDirs;
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::error::{LptoolsError, Result};
use crate::launchpad::{ConsoleLogin, LoginFlow, SERVICE_ROOT, Session};

/// OAuth consumer identity shared by all lptools apps.
///
/// The credentials file is shared across apps, so the identity the user
/// authorizes is the shared one rather than a per-app name.
pub const CONSUMER_KEY: &str = "lptools";

const LPTOOLS_DIR: &str = "lptools";
const CREDENTIALS_FILE: &str = "credentials";

/// Session provisioner with an explicit cache-home root and login flow.
///
/// Not safe for concurrent use across processes: two provisioners racing on
/// a missing credentials file may both run the interactive login, and the
/// last write wins.
pub struct SessionProvider<L: LoginFlow> {
    cache_home: PathBuf,
    login: L,
}

impl<L: LoginFlow> SessionProvider<L> {
    /// Create a provisioner rooted at the given cache home.
    pub fn new(cache_home: impl Into<PathBuf>, login: L) -> Self {
        Self {
            cache_home: cache_home.into(),
            login,
        }
    }

    /// Get a logged-in Launchpad session for the named app.
    ///
    /// Creates `<cache-home>/<app_name>` for the app's response caching,
    /// then loads the shared credentials file, or runs the login flow once
    /// and persists the result. The app name is not validated; a path-unsafe
    /// name propagates into path construction.
    pub fn get_session(&self, app_name: &str) -> Result<Session> {
        let cachedir = self.cache_home.join(app_name);
        ensure_dir(&cachedir)?;

        let credspath = self.credentials_path()?;
        let credentials = if credspath.exists() {
            debug!(path = %credspath.display(), "using stored credentials");
            Credentials::load(&credspath)?
        } else {
            info!(consumer_key = CONSUMER_KEY, "no stored credentials, logging in");
            let credentials = self.login.login(CONSUMER_KEY)?;
            credentials.save(&credspath)?;
            credentials
        };

        Session::new(credentials, SERVICE_ROOT, &cachedir)
    }

    /// The cachedir for common lptools things: `<cache-home>/lptools`,
    /// created if absent.
    pub fn cache_root(&self) -> Result<PathBuf> {
        let dir = self.cache_home.join(LPTOOLS_DIR);
        ensure_dir(&dir)?;
        Ok(dir)
    }

    /// Path to the shared credentials file. Its containing directory exists
    /// by the time this returns.
    pub fn credentials_path(&self) -> Result<PathBuf> {
        Ok(self.cache_root()?.join(CREDENTIALS_FILE))
    }
}

/// Ensure that `dir` exists.
pub fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)?;
    Ok(())
}

fn user_cache_home() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .ok_or(LptoolsError::NoCacheHome)
}

/// Get a logged-in Launchpad session for the named app, rooted at the user's
/// cache home and using the interactive console login.
pub fn get_session(app_name: &str) -> Result<Session> {
    SessionProvider::new(user_cache_home()?, ConsoleLogin::new()).get_session(app_name)
}

/// Return the cachedir for common lptools things, created if absent.
pub fn cache_root() -> Result<PathBuf> {
    let dir = user_cache_home()?.join(LPTOOLS_DIR);
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Return the path to the lptools credentials file, ensuring its containing
/// directory exists.
pub fn credentials_path() -> Result<PathBuf> {
    Ok(cache_root()?.join(CREDENTIALS_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use tempfile::TempDir;

    fn fake_credentials() -> Credentials {
        Credentials {
            consumer_key: CONSUMER_KEY.to_string(),
            access_token: "abc".to_string(),
            access_secret: "shhh".to_string(),
        }
    }

    /// Succeeds and counts how many times it was invoked.
    struct CountingLogin {
        calls: Cell<u32>,
    }

    impl CountingLogin {
        fn new() -> Self {
            Self { calls: Cell::new(0) }
        }
    }

    impl LoginFlow for CountingLogin {
        fn login(&self, consumer_key: &str) -> Result<Credentials> {
            assert_eq!(consumer_key, CONSUMER_KEY);
            self.calls.set(self.calls.get() + 1);
            Ok(fake_credentials())
        }
    }

    /// Fails the test if the provisioner attempts a login.
    struct PanicLogin;

    impl LoginFlow for PanicLogin {
        fn login(&self, _consumer_key: &str) -> Result<Credentials> {
            panic!("login flow invoked with stored credentials present");
        }
    }

    /// Always fails, standing in for a rejected token exchange.
    struct FailingLogin;

    impl LoginFlow for FailingLogin {
        fn login(&self, _consumer_key: &str) -> Result<Credentials> {
            Err(LptoolsError::TokenExchange("rejected".to_string()))
        }
    }

    #[test]
    fn test_app_cachedir_created_even_when_login_fails() {
        let temp_dir = TempDir::new().unwrap();
        let provider = SessionProvider::new(temp_dir.path(), FailingLogin);

        let result = provider.get_session("recipe-status");

        assert!(matches!(result, Err(LptoolsError::TokenExchange(_))));
        assert!(temp_dir.path().join("recipe-status").is_dir());
    }

    #[test]
    fn test_credentials_path_parent_exists_and_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let provider = SessionProvider::new(temp_dir.path(), PanicLogin);

        let first = provider.credentials_path().unwrap();
        assert!(first.parent().unwrap().is_dir());

        let second = provider.credentials_path().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_stored_credentials_skip_login() {
        let temp_dir = TempDir::new().unwrap();
        let credspath = temp_dir.path().join("lptools").join("credentials");
        fake_credentials().save(&credspath).unwrap();

        let provider = SessionProvider::new(temp_dir.path(), PanicLogin);
        let session = provider.get_session("recipe-status").unwrap();

        assert_eq!(session.credentials(), &fake_credentials());
    }

    #[test]
    fn test_missing_credentials_trigger_one_login_and_one_file() {
        let temp_dir = TempDir::new().unwrap();
        let provider = SessionProvider::new(temp_dir.path(), CountingLogin::new());

        provider.get_session("recipe-status").unwrap();

        assert_eq!(provider.login.calls.get(), 1);
        let credspath = temp_dir.path().join("lptools").join("credentials");
        assert!(credspath.is_file());
    }

    #[test]
    fn test_second_call_reuses_stored_credentials() {
        let temp_dir = TempDir::new().unwrap();
        let provider = SessionProvider::new(temp_dir.path(), CountingLogin::new());

        provider.get_session("recipe-status").unwrap();
        provider.get_session("recipe-status").unwrap();

        assert_eq!(provider.login.calls.get(), 1);
    }

    #[test]
    fn test_recipe_status_scenario() {
        let temp_dir = TempDir::new().unwrap();
        let provider = SessionProvider::new(temp_dir.path(), CountingLogin::new());

        let session = provider.get_session("recipe-status").unwrap();

        assert!(temp_dir.path().join("recipe-status").is_dir());
        assert!(temp_dir.path().join("lptools").is_dir());
        assert_eq!(provider.login.calls.get(), 1);

        let stored =
            Credentials::load(&temp_dir.path().join("lptools").join("credentials")).unwrap();
        assert_eq!(stored.access_token, "abc");

        assert_eq!(session.cachedir(), temp_dir.path().join("recipe-status"));
    }

    #[test]
    fn test_malformed_credentials_file_propagates_json_error() {
        let temp_dir = TempDir::new().unwrap();
        let credspath = temp_dir.path().join("lptools").join("credentials");
        fs::create_dir_all(credspath.parent().unwrap()).unwrap();
        fs::write(&credspath, "{ not credentials").unwrap();

        let provider = SessionProvider::new(temp_dir.path(), PanicLogin);
        let result = provider.get_session("recipe-status");

        assert!(matches!(result, Err(LptoolsError::Json(_))));
    }

    #[test]
    fn test_ensure_dir_idempotent() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("a").join("b");

        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();

        assert!(dir.is_dir());
    }
}
