// Interactive Launchpad login.
// Runs the OAuth 1.0a request-token / authorize / access-token exchange,
// blocking on the user while they approve the token in a browser.

use std::io::{self, BufRead, Write};

use reqwest::{blocking::Client, header::AUTHORIZATION};
use tracing::info;

use crate::credentials::Credentials;
use crate::error::{LptoolsError, Result};

use super::session::{WEB_ROOT, signed_header};

/// The interactive step that obtains credentials when none are stored.
///
/// A trait so tests can substitute a stub that never touches the network.
pub trait LoginFlow {
    /// Obtain credentials for the given consumer identity.
    fn login(&self, consumer_key: &str) -> Result<Credentials>;
}

/// Production login flow: prints the authorization URL on stderr and waits
/// for the user to approve the token before completing the exchange.
pub struct ConsoleLogin {
    web_root: String,
}

impl ConsoleLogin {
    pub fn new() -> Self {
        Self::with_web_root(WEB_ROOT)
    }

    /// Target a different web root.
    pub fn with_web_root(web_root: &str) -> Self {
        Self {
            web_root: web_root.trim_end_matches('/').to_string(),
        }
    }

    fn authorize_url(&self, token: &str) -> String {
        format!("{}/+authorize-token?oauth_token={}", self.web_root, token)
    }

    /// Obtain an unauthorized request token from the service.
    fn request_token(&self, client: &Client, consumer_key: &str) -> Result<(String, String)> {
        let url = format!("{}/+request-token", self.web_root);
        let response = client
            .post(&url)
            .header(AUTHORIZATION, signed_header(consumer_key, None, ""))
            .send()
            .map_err(LptoolsError::Api)?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(LptoolsError::TokenExchange(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }
        parse_token_response(&body)
    }

    /// Trade an approved request token for an access token.
    fn access_token(
        &self,
        client: &Client,
        consumer_key: &str,
        request_token: &str,
        request_secret: &str,
    ) -> Result<Credentials> {
        let url = format!("{}/+access-token", self.web_root);
        let response = client
            .post(&url)
            .header(
                AUTHORIZATION,
                signed_header(consumer_key, Some(request_token), request_secret),
            )
            .send()
            .map_err(LptoolsError::Api)?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(LptoolsError::TokenExchange(format!(
                "{} returned {}: {}",
                url, status, body
            )));
        }

        let (access_token, access_secret) = parse_token_response(&body)?;
        Ok(Credentials {
            consumer_key: consumer_key.to_string(),
            access_token,
            access_secret,
        })
    }
}

impl Default for ConsoleLogin {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow for ConsoleLogin {
    fn login(&self, consumer_key: &str) -> Result<Credentials> {
        let client = Client::builder().build().map_err(LptoolsError::Api)?;

        let (token, secret) = self.request_token(&client, consumer_key)?;
        info!(consumer_key, "obtained request token, awaiting authorization");

        let mut stderr = io::stderr();
        writeln!(
            stderr,
            "Open this link in a browser to authorize {}:",
            consumer_key
        )?;
        writeln!(stderr, "    {}", self.authorize_url(&token))?;
        write!(stderr, "Press Enter once the token is authorized: ")?;
        stderr.flush()?;

        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;

        self.access_token(&client, consumer_key, &token, &secret)
    }
}

/// Parse the form-encoded token pair returned by the token endpoints.
fn parse_token_response(body: &str) -> Result<(String, String)> {
    let mut token = None;
    let mut secret = None;
    for pair in body.trim().split('&') {
        match pair.split_once('=') {
            Some(("oauth_token", value)) => token = Some(value.to_string()),
            Some(("oauth_token_secret", value)) => secret = Some(value.to_string()),
            _ => {}
        }
    }
    match (token, secret) {
        (Some(token), Some(secret)) => Ok((token, secret)),
        _ => Err(LptoolsError::TokenExchange(format!(
            "unparseable token response: {}",
            body
        ))),
    }
}
