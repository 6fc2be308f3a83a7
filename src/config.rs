//! Sanitizer options and login-flow redirect settings.

use serde::Deserialize;

use crate::error::{GuardError, Result};

/// Default LRU cache size for registrable-domain lookups
pub const DEFAULT_CACHE_SIZE: usize = 1024;

/// Default query/form field carrying the post-login redirect target
pub const DEFAULT_REDIRECT_FIELD_NAME: &str = "next";

fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

fn default_allowed_schemes() -> Vec<String> {
    vec!["http".to_string(), "https".to_string()]
}

fn default_redirect() -> String {
    "/accounts/profile/".to_string()
}

fn default_login_error_url() -> String {
    "/accounts/login/".to_string()
}

fn default_redirect_field_name() -> String {
    DEFAULT_REDIRECT_FIELD_NAME.to_string()
}

/// Redirect sanitizer options.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SanitizerOptions {
    /// LRU cache size for registrable-domain lookups (0 disables the cache)
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,
    /// Schemes an absolute redirect target may use
    #[serde(default = "default_allowed_schemes")]
    pub allowed_schemes: Vec<String>,
}

impl Default for SanitizerOptions {
    fn default() -> Self {
        Self {
            cache_size: DEFAULT_CACHE_SIZE,
            allowed_schemes: default_allowed_schemes(),
        }
    }
}

impl SanitizerOptions {
    /// Create new sanitizer options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set cache size.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }

    /// Replace the allowed schemes (compared case-insensitively).
    pub fn with_allowed_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_schemes = schemes
            .into_iter()
            .map(|s| s.into().to_lowercase())
            .collect();
        self
    }

    pub(crate) fn allows_scheme(&self, scheme: &str) -> bool {
        self.allowed_schemes
            .iter()
            .any(|s| s.eq_ignore_ascii_case(scheme))
    }
}

/// Where the login flow sends users once authentication ends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RedirectSettings {
    /// Fallback after a successful login without a usable `next`
    #[serde(default = "default_redirect")]
    pub default_redirect: String,
    /// Destination for newly created users, if set
    #[serde(default)]
    pub new_user_redirect: Option<String>,
    /// Destination after a failed login
    #[serde(default = "default_login_error_url")]
    pub login_error_url: String,
    /// Query/form field carrying the redirect target
    #[serde(default = "default_redirect_field_name")]
    pub redirect_field_name: String,
}

impl Default for RedirectSettings {
    fn default() -> Self {
        Self {
            default_redirect: default_redirect(),
            new_user_redirect: None,
            login_error_url: default_login_error_url(),
            redirect_field_name: default_redirect_field_name(),
        }
    }
}

impl RedirectSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn with_default_redirect(mut self, url: impl Into<String>) -> Self {
        self.default_redirect = url.into();
        self
    }

    pub fn with_new_user_redirect(mut self, url: impl Into<String>) -> Self {
        self.new_user_redirect = Some(url.into());
        self
    }

    pub fn with_login_error_url(mut self, url: impl Into<String>) -> Self {
        self.login_error_url = url.into();
        self
    }

    pub fn with_redirect_field_name(mut self, name: impl Into<String>) -> Self {
        self.redirect_field_name = name.into();
        self
    }

    /// Reject settings the flow cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.redirect_field_name.trim().is_empty() {
            return Err(GuardError::Config(
                "redirect_field_name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
