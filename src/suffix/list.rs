//! Public suffix list storage and registrable-domain lookup.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use url::Host;

use crate::error::{GuardError, Result, SuffixListErrorKind};
use crate::types::{strip_port, SuffixRule, EXCEPTION_PREFIX, WILDCARD_LABEL};

/// Mozilla public suffix list shipped with the crate
static BUNDLED_DATASET: &str = include_str!("../../data/effective_tld_names.dat");

/// Rule counts of a loaded list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleStats {
    pub plain: usize,
    pub wildcard: usize,
    pub exception: usize,
}

impl RuleStats {
    /// Number of dataset rules (IDNA aliases not included)
    pub fn total(&self) -> usize {
        self.plain + self.wildcard + self.exception
    }
}

/// Immutable set of public suffix rules.
///
/// Rules are kept verbatim (`co.uk`, `*.ck`, `!www.ck`) so every lookup is a
/// single hash probe. Non-ASCII rules are also stored in punycode form, since
/// hosts coming out of URL parsing are always ASCII.
#[derive(Debug, Clone, Default)]
pub struct SuffixList {
    rules: HashSet<String>,
    stats: RuleStats,
}

impl SuffixList {
    /// Parse a dataset: one rule per line, `//` comments and blank lines skipped.
    pub fn parse(text: &str) -> Result<Self> {
        let mut rules = HashSet::new();
        let mut stats = RuleStats::default();

        for rule in text.lines().filter_map(SuffixRule::parse) {
            match rule {
                SuffixRule::Plain(_) => stats.plain += 1,
                SuffixRule::Wildcard(_) => stats.wildcard += 1,
                SuffixRule::Exception(_) => stats.exception += 1,
            }

            if !rule.as_str().is_ascii() {
                if let Some(ascii) = rule.map_labels(to_ascii_label) {
                    rules.insert(ascii);
                }
            }

            match rule {
                SuffixRule::Plain(s) | SuffixRule::Wildcard(s) | SuffixRule::Exception(s) => {
                    rules.insert(s);
                }
            }
        }

        if rules.is_empty() {
            return Err(GuardError::suffix_list(
                SuffixListErrorKind::Empty,
                "suffix list contains no rules",
            ));
        }

        Ok(Self { rules, stats })
    }

    /// Load a dataset from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| {
            GuardError::suffix_list(
                SuffixListErrorKind::FileError,
                format!("Failed to read suffix list '{}': {}", path.display(), e),
            )
        })?;
        Self::parse(&text)
    }

    /// The dataset bundled at compile time.
    pub fn bundled() -> Self {
        Self::parse(BUNDLED_DATASET).expect("bundled public suffix list has no rules")
    }

    /// Check whether a rule string (e.g. `*.ck`, `!www.ck`) is in the list
    pub fn contains(&self, rule: &str) -> bool {
        self.rules.contains(rule)
    }

    /// Number of stored rule strings, including IDNA aliases
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn stats(&self) -> RuleStats {
        self.stats
    }

    /// Compute the registrable domain (public suffix plus one label) of a host.
    ///
    /// A `:port` suffix is ignored and matching is case-insensitive. Windows of
    /// trailing labels are tried from the whole host inward and the first rule
    /// hit wins; an exception rule on a window beats a plain or wildcard rule on
    /// the same window.
    ///
    /// # Errors
    /// [`GuardError::UnknownSuffix`] when no window matches any rule, including
    /// for an empty host.
    pub fn registrable_domain(&self, host: &str) -> Result<String> {
        let host = strip_port(host).to_lowercase();
        if host.is_empty() {
            return Err(GuardError::UnknownSuffix(host));
        }

        let labels: Vec<&str> = host.split('.').collect();

        for start in 0..labels.len() {
            let window = &labels[start..];
            let candidate = window.join(".");

            let mut exception = String::with_capacity(candidate.len() + 1);
            exception.push(EXCEPTION_PREFIX);
            exception.push_str(&candidate);
            if self.rules.contains(&exception) {
                return Ok(candidate);
            }

            if self.rules.contains(&candidate) || self.rules.contains(&wildcard_form(window)) {
                // One label wider than the matched suffix, clamped to the host itself
                return Ok(labels[start.saturating_sub(1)..].join("."));
            }
        }

        Err(GuardError::UnknownSuffix(host))
    }
}

/// `*` in place of the window's first label: `["a", "kobe", "jp"]` -> `*.kobe.jp`
fn wildcard_form(window: &[&str]) -> String {
    let mut out = String::from(WILDCARD_LABEL);
    for label in &window[1..] {
        out.push('.');
        out.push_str(label);
    }
    out
}

fn to_ascii_label(label: &str) -> Option<String> {
    if label.is_ascii() {
        return Some(label.to_string());
    }
    match Host::parse(label) {
        Ok(Host::Domain(ascii)) => Some(ascii),
        _ => None,
    }
}
