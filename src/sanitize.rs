//! Open-redirect sanitization.
//!
//! A redirect target is safe when it is path-relative, or when its host has
//! the same registrable domain as the site serving the request. Every other
//! input, hostile or merely malformed, comes back as `None`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use log::debug;
use lru::LruCache;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde_json::Value;
use url::{Host, ParseError, Url};

use crate::config::SanitizerOptions;
use crate::error::{GuardError, Result};
use crate::suffix::{public_suffixes, SuffixList};
use crate::types::strip_port;

/// Host of the base used to resolve relative references. `.invalid` never resolves.
const RELATIVE_BASE_HOST: &str = "relative.invalid";

static RELATIVE_BASE: Lazy<Url> = Lazy::new(|| {
    Url::parse("http://relative.invalid/").expect("RELATIVE_BASE: hardcoded URL is invalid")
});

static DEFAULT_SANITIZER: Lazy<RedirectSanitizer> = Lazy::new(RedirectSanitizer::with_defaults);

/// Cached lookup result: registrable domain, or `None` for an unknown suffix
type CacheValue = Option<String>;

/// Redirect sanitizer bound to a suffix list, with an optional lookup cache.
pub struct RedirectSanitizer {
    suffixes: Arc<SuffixList>,
    options: SanitizerOptions,
    cache: Option<Mutex<LruCache<String, CacheValue>>>,
}

impl RedirectSanitizer {
    /// Create a sanitizer over `suffixes`.
    pub fn new(suffixes: Arc<SuffixList>, options: SanitizerOptions) -> Self {
        let cache = NonZeroUsize::new(options.cache_size)
            .map(|size| Mutex::new(LruCache::new(size)));
        Self {
            suffixes,
            options,
            cache,
        }
    }

    /// Sanitizer over the process-wide suffix list with default options
    pub fn with_defaults() -> Self {
        Self::new(public_suffixes(), SanitizerOptions::default())
    }

    pub fn options(&self) -> &SanitizerOptions {
        &self.options
    }

    /// Return `candidate` if it is a safe redirect target for `current_host`.
    pub fn sanitize<'a>(&self, current_host: &str, candidate: Option<&'a str>) -> Option<&'a str> {
        match self.check(current_host, candidate) {
            Ok(url) => Some(url),
            Err(e) => {
                debug!(
                    "Rejected redirect target {:?} for host {:?}: {}",
                    candidate, current_host, e
                );
                None
            }
        }
    }

    /// Like [`sanitize`](Self::sanitize) for a structured parameter value.
    /// Only JSON strings can be redirect targets.
    pub fn sanitize_value<'a>(&self, current_host: &str, value: &'a Value) -> Option<&'a str> {
        match value {
            Value::String(s) => self.sanitize(current_host, Some(s.as_str())),
            Value::Null => None,
            other => {
                debug!(
                    "Rejected non-string redirect target for host {:?}: {}",
                    current_host, other
                );
                None
            }
        }
    }

    /// Check a candidate and report why it is unsafe.
    ///
    /// # Errors
    /// - [`GuardError::MalformedCandidate`] for absent, empty or unparseable input
    /// - [`GuardError::DisallowedScheme`] for absolute URLs outside the allowed schemes
    /// - [`GuardError::UnknownSuffix`] when either host has no known public suffix
    /// - [`GuardError::ForeignDomain`] when the registrable domains differ
    pub fn check<'a>(&self, current_host: &str, candidate: Option<&'a str>) -> Result<&'a str> {
        let candidate = match candidate {
            Some(c) if !c.is_empty() => c,
            _ => {
                return Err(GuardError::MalformedCandidate(
                    "empty redirect target".to_string(),
                ))
            }
        };

        match self.target_host(candidate)? {
            None => Ok(candidate),
            Some(target) => {
                self.ensure_same_site(current_host, &target)?;
                Ok(candidate)
            }
        }
    }

    /// Host the browser would be sent to, or `None` for a path-relative reference.
    fn target_host(&self, candidate: &str) -> Result<Option<String>> {
        match Url::parse(candidate) {
            Ok(url) => {
                if !self.options.allows_scheme(url.scheme()) {
                    return Err(GuardError::DisallowedScheme(url.scheme().to_string()));
                }
                match url.host_str() {
                    Some(host) if !host.is_empty() => Ok(Some(host.to_string())),
                    _ => Err(GuardError::MalformedCandidate(
                        "absolute URL without host".to_string(),
                    )),
                }
            }
            Err(ParseError::RelativeUrlWithoutBase) => {
                let resolved = RELATIVE_BASE
                    .join(candidate)
                    .map_err(|e| GuardError::MalformedCandidate(e.to_string()))?;
                let host = resolved.host_str().ok_or_else(|| {
                    GuardError::MalformedCandidate("relative reference without host".to_string())
                })?;
                if host == RELATIVE_BASE_HOST && !is_network_path(candidate) {
                    Ok(None)
                } else {
                    Ok(Some(host.to_string()))
                }
            }
            Err(e) => Err(GuardError::MalformedCandidate(e.to_string())),
        }
    }

    fn ensure_same_site(&self, current_host: &str, target_host: &str) -> Result<()> {
        let site = self.registrable_domain(current_host)?;
        let candidate = self.registrable_domain(target_host)?;
        if site == candidate {
            Ok(())
        } else {
            Err(GuardError::ForeignDomain { candidate, site })
        }
    }

    /// Registrable domain of `host`, served from the cache when enabled.
    ///
    /// Hosts are compared in IDNA ASCII form, which is what URL parsing
    /// yields for redirect targets.
    pub fn registrable_domain(&self, host: &str) -> Result<String> {
        let key = normalize_host(host);
        let Some(cache) = &self.cache else {
            return self.suffixes.registrable_domain(&key);
        };

        let mut cache = cache.lock();

        if let Some(cached) = cache.get(&key) {
            return match cached {
                Some(domain) => Ok(domain.clone()),
                None => Err(GuardError::UnknownSuffix(key.clone())),
            };
        }

        // Lookups are CPU-only, so computing under the lock is acceptable
        let result = self.suffixes.registrable_domain(&key);
        cache.put(key, result.as_ref().ok().cloned());
        result
    }

    /// Clear the lookup cache
    pub fn clear_cache(&self) {
        if let Some(cache) = &self.cache {
            cache.lock().clear();
        }
    }

    #[cfg(test)]
    fn cached_hosts(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.lock().len())
    }
}

/// Lowercased host without port, punycode-encoded when it has non-ASCII labels
fn normalize_host(host: &str) -> String {
    let host = strip_port(host);
    if host.is_ascii() {
        return host.to_ascii_lowercase();
    }
    match Host::parse(host) {
        Ok(Host::Domain(ascii)) => ascii,
        _ => host.to_lowercase(),
    }
}

/// Whether a relative reference carries its own authority (`//host`, `\\host`,
/// `/\host`), after the whitespace and control stripping browsers apply.
fn is_network_path(candidate: &str) -> bool {
    let mut chars = candidate
        .trim_start_matches(|c: char| c <= ' ')
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'));
    let is_slash = |c: Option<char>| matches!(c, Some('/') | Some('\\'));
    is_slash(chars.next()) && is_slash(chars.next())
}

/// Sanitize a redirect target against the process-wide suffix list.
///
/// ```
/// use redirect_guard::sanitize_redirect;
///
/// assert_eq!(sanitize_redirect("myapp.com", Some("/path/")), Some("/path/"));
/// assert_eq!(
///     sanitize_redirect("myapp.com", Some("http://test.myapp.com/path/")),
///     Some("http://test.myapp.com/path/")
/// );
/// assert_eq!(sanitize_redirect("myapp.com", Some("http://notmyapp.com/path/")), None);
/// assert_eq!(sanitize_redirect("myapp.com", None), None);
/// ```
pub fn sanitize_redirect<'a>(current_host: &str, candidate: Option<&'a str>) -> Option<&'a str> {
    DEFAULT_SANITIZER.sanitize(current_host, candidate)
}

/// [`sanitize_redirect`] for a structured parameter value
pub fn sanitize_redirect_value<'a>(current_host: &str, value: &'a Value) -> Option<&'a str> {
    DEFAULT_SANITIZER.sanitize_value(current_host, value)
}
