// Launchpad web service module.
// Provides the Session client object and the interactive OAuth login flow.

pub mod login;
pub mod session;

pub use login::{ConsoleLogin, LoginFlow};
pub use session::{SERVICE_ROOT, Session, WEB_ROOT};
