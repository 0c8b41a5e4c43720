// Launchpad API session.
// A client bound to a credential and a per-app cache directory, signing
// requests with OAuth 1.0a PLAINTEXT.

use std::path::{Path, PathBuf};

use chrono::Utc;
use reqwest::{
    StatusCode,
    blocking::{Client, Response},
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use uuid::Uuid;

use crate::credentials::Credentials;
use crate::error::{LptoolsError, Result};

/// Production API root.
pub const SERVICE_ROOT: &str = "https://api.launchpad.net/1.0";

/// Production web root hosting the OAuth endpoints.
pub const WEB_ROOT: &str = "https://launchpad.net";

/// A logged-in Launchpad client.
///
/// Bound to a credential, a service root, and a per-app cache directory the
/// calling tool uses for its own response caching.
pub struct Session {
    client: Client,
    credentials: Credentials,
    service_root: String,
    cachedir: PathBuf,
}

impl Session {
    /// Create a session from explicit credentials, service root, and cache
    /// directory.
    pub fn new(credentials: Credentials, service_root: &str, cachedir: &Path) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("lptools"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(LptoolsError::Api)?;

        Ok(Self {
            client,
            credentials,
            service_root: service_root.trim_end_matches('/').to_string(),
            cachedir: cachedir.to_path_buf(),
        })
    }

    /// The credentials this session is bound to.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// The API root this session talks to.
    pub fn service_root(&self) -> &str {
        &self.service_root
    }

    /// The per-app cache directory this session is bound to.
    pub fn cachedir(&self) -> &Path {
        &self.cachedir
    }

    /// Make a signed GET request against the web service.
    pub fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}/{}", self.service_root, path.trim_start_matches('/'));
        let response = self
            .client
            .get(&url)
            .header(AUTHORIZATION, oauth_header(&self.credentials))
            .send()
            .map_err(LptoolsError::Api)?;

        check_response(response)
    }
}

/// Check response status and convert errors.
fn check_response(response: Response) -> Result<Response> {
    match response.status() {
        StatusCode::UNAUTHORIZED => Err(LptoolsError::Unauthorized),
        StatusCode::NOT_FOUND => {
            let url = response.url().to_string();
            Err(LptoolsError::NotFound(url))
        }
        _ => response.error_for_status().map_err(LptoolsError::Api),
    }
}

/// Authorization header for a request signed with stored access credentials.
fn oauth_header(credentials: &Credentials) -> String {
    signed_header(
        &credentials.consumer_key,
        Some(&credentials.access_token),
        &credentials.access_secret,
    )
}

/// Build an OAuth 1.0a PLAINTEXT Authorization header.
///
/// Launchpad consumers have no consumer secret, so the signature is always
/// `&<token_secret>` (or bare `&` when requesting the initial token).
pub(crate) fn signed_header(consumer_key: &str, token: Option<&str>, token_secret: &str) -> String {
    let mut header = format!(
        "OAuth realm=\"{}\", oauth_version=\"1.0\", oauth_consumer_key=\"{}\", \
         oauth_signature_method=\"PLAINTEXT\", oauth_signature=\"&{}\", \
         oauth_timestamp=\"{}\", oauth_nonce=\"{}\"",
        WEB_ROOT,
        consumer_key,
        token_secret,
        Utc::now().timestamp(),
        Uuid::new_v4().simple(),
    );
    if let Some(token) = token {
        header.push_str(&format!(", oauth_token=\"{}\"", token));
    }
    header
}
