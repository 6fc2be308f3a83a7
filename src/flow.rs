//! Login flow redirect bookkeeping.
//!
//! Login start captures the `next` target (sanitized) and the rest of the
//! query string; the application keeps the resulting [`PendingLogin`] in its
//! session and hands it back on completion to get the final URL.

use log::debug;
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::config::RedirectSettings;
use crate::error::{GuardError, Result};
use crate::sanitize::RedirectSanitizer;

/// Third-party authentication provider, supplied by the application.
pub trait AuthBackend: Send + Sync {
    /// Provider name, for logging
    fn name(&self) -> &str;

    /// Whether login starts with an HTTP redirect (`auth_url`) or an inline
    /// HTML page (`auth_html`, e.g. an auto-submitting form)
    fn uses_redirect(&self) -> bool {
        true
    }

    /// URL of the provider's login page
    fn auth_url(&self) -> Result<String>;

    /// HTML body that starts the login
    fn auth_html(&self) -> Result<String> {
        Err(GuardError::Backend(format!(
            "{} does not support HTML login",
            self.name()
        )))
    }
}

/// How to hand the user over to the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthStart {
    Redirect(String),
    Html(String),
}

/// Redirect state captured at login start, stored in the session until completion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingLogin {
    /// Sanitized redirect target, if a safe one was requested
    pub redirect_to: Option<String>,
    /// Remaining login query parameters, url-encoded
    pub query_string: String,
}

/// Result of the provider handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated { is_new: bool },
    Failed,
}

/// Composes login-flow redirect URLs.
pub struct LoginFlow {
    sanitizer: RedirectSanitizer,
    settings: RedirectSettings,
}

impl LoginFlow {
    pub fn new(settings: RedirectSettings, sanitizer: RedirectSanitizer) -> Self {
        Self {
            sanitizer,
            settings,
        }
    }

    /// Flow over the process-wide suffix list
    pub fn with_settings(settings: RedirectSettings) -> Self {
        Self::new(settings, RedirectSanitizer::with_defaults())
    }

    pub fn settings(&self) -> &RedirectSettings {
        &self.settings
    }

    /// Start a login: capture redirect state and ask the backend how to proceed.
    pub fn begin(
        &self,
        backend: &dyn AuthBackend,
        host: &str,
        query_string: &str,
    ) -> Result<(PendingLogin, AuthStart)> {
        let pending = self.pending(host, query_string);

        let start = if backend.uses_redirect() {
            AuthStart::Redirect(backend.auth_url()?)
        } else {
            AuthStart::Html(backend.auth_html()?)
        };

        debug!(
            "Starting {} login, redirect target {:?}",
            backend.name(),
            pending.redirect_to
        );
        Ok((pending, start))
    }

    /// Capture the sanitized redirect target and the other query parameters.
    ///
    /// Empty parameter values are dropped; when the redirect field repeats,
    /// the last value is used.
    pub fn pending(&self, host: &str, query_string: &str) -> PendingLogin {
        let field = self.settings.redirect_field_name.as_str();
        let mut requested = None;
        let mut kept = form_urlencoded::Serializer::new(String::new());

        let query = query_string.strip_prefix('?').unwrap_or(query_string);
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            if key == field {
                requested = Some(value.into_owned());
            } else if !value.is_empty() {
                kept.append_pair(&key, &value);
            }
        }

        PendingLogin {
            redirect_to: self
                .sanitizer
                .sanitize(host, requested.as_deref())
                .map(str::to_string),
            query_string: kept.finish(),
        }
    }

    /// Final URL once the provider handshake has finished.
    pub fn completion_url(&self, pending: &PendingLogin, outcome: LoginOutcome) -> String {
        let is_new = match outcome {
            LoginOutcome::Failed => return self.settings.login_error_url.clone(),
            LoginOutcome::Authenticated { is_new } => is_new,
        };

        let new_user_redirect = self
            .settings
            .new_user_redirect
            .as_deref()
            .filter(|url| !url.is_empty());

        let url = match (new_user_redirect, &pending.redirect_to) {
            (Some(new_user), Some(next)) if is_new => {
                let pair = form_urlencoded::Serializer::new(String::new())
                    .append_pair(&self.settings.redirect_field_name, next)
                    .finish();
                append_query(new_user, &pair)
            }
            (Some(new_user), None) if is_new => new_user.to_string(),
            (_, Some(next)) => next.clone(),
            (_, None) => self.settings.default_redirect.clone(),
        };

        if pending.query_string.is_empty() {
            url
        } else {
            append_query(&url, &pending.query_string)
        }
    }

    /// URL after associating or disconnecting an account: the requested
    /// target if it is safe, the default redirect otherwise.
    pub fn return_url(&self, host: &str, requested: Option<&str>) -> String {
        self.sanitizer
            .sanitize(host, requested)
            .map(str::to_string)
            .unwrap_or_else(|| self.settings.default_redirect.clone())
    }
}

fn append_query(url: &str, query: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{}{}{}", url, separator, query)
}
