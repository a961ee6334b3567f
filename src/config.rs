//! Connection configuration.

use crate::error::{QueryError, Result};
use percent_encoding::percent_decode_str;
use std::fmt;
use url::Url;

/// Connection URL used when none is configured.
pub const DEFAULT_URL: &str = "mysql://localhost:3306/eduTasksDB";

/// Username used when neither the command line, the environment nor the URL supply one.
pub const DEFAULT_USER: &str = "username";

/// Password used when neither the command line, the environment nor the URL supply one.
pub const DEFAULT_PASSWORD: &str = "password";

/// Everything a driver needs to open a connection
#[derive(Clone)]
pub struct ConnectConfig {
    url: Url,
    username: String,
    password: String,
}

impl ConnectConfig {
    /// Build a configuration from a URL and optional explicit credentials.
    ///
    /// Explicit credentials win over credentials embedded in the URL, which win
    /// over the defaults. A leading `jdbc:` is accepted and dropped.
    pub fn new(url: &str, username: Option<String>, password: Option<String>) -> Result<Self> {
        let trimmed = url.trim();
        let raw = trimmed.strip_prefix("jdbc:").unwrap_or(trimmed);
        let mut parsed = Url::parse(raw).map_err(|e| QueryError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        let url_user =
            Some(decode_credential(&parsed, parsed.username())?).filter(|u| !u.is_empty());
        let url_password = parsed
            .password()
            .map(|p| decode_credential(&parsed, p))
            .transpose()?;

        if url_user.is_some() || url_password.is_some() {
            // Credentials are kept apart so the URL can be shown in diagnostics.
            // A URL carrying credentials has a host, so both setters succeed.
            let scheme = parsed.scheme().to_string();
            parsed
                .set_password(None)
                .and_then(|()| parsed.set_username(""))
                .map_err(|()| QueryError::InvalidUrl {
                    url: format!("{scheme}://..."),
                    reason: "credentials cannot be removed from this URL".to_string(),
                })?;
        }

        Ok(ConnectConfig {
            url: parsed,
            username: username
                .or(url_user)
                .unwrap_or_else(|| DEFAULT_USER.to_string()),
            password: password
                .or(url_password)
                .unwrap_or_else(|| DEFAULT_PASSWORD.to_string()),
        })
    }

    /// URL scheme, used to pick the driver
    pub fn scheme(&self) -> &str {
        self.url.scheme()
    }

    /// Connection URL without credentials
    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    /// Printable description of the connection target
    pub fn target(&self) -> String {
        format!("{} as {}", self.url, self.username)
    }
}

/// Userinfo in a URL is percent-encoded (`p%40ss` for `p@ss`).
fn decode_credential(url: &Url, raw: &str) -> Result<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .map_err(|e| QueryError::InvalidUrl {
            url: format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default()),
            reason: format!("credentials are not valid UTF-8: {e}"),
        })
}

impl fmt::Debug for ConnectConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectConfig")
            .field("url", &self.url.as_str())
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
