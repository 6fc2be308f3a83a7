//! Public suffix matching.
//!
//! The process-wide list is loaded once, either from the bundled dataset on
//! first use or from a file supplied by the application at startup, and is
//! never mutated afterwards.
//!
//! ## Example
//!
//! ```
//! use redirect_guard::suffix;
//!
//! assert_eq!(suffix::registrable_domain("abcde.co.uk").unwrap(), "abcde.co.uk");
//! assert_eq!(suffix::registrable_domain("www.myapp.com:8000").unwrap(), "myapp.com");
//! assert!(suffix::registrable_domain("host.notatld").is_err());
//! ```

mod list;

pub use list::{RuleStats, SuffixList};

use std::path::Path;
use std::sync::Arc;

use log::{info, warn};
use once_cell::sync::OnceCell;

use crate::error::{GuardError, Result, SuffixListErrorKind};

static PUBLIC_SUFFIXES: OnceCell<Arc<SuffixList>> = OnceCell::new();

fn global() -> &'static Arc<SuffixList> {
    PUBLIC_SUFFIXES.get_or_init(|| {
        let list = SuffixList::bundled();
        log_loaded("bundled dataset", &list);
        Arc::new(list)
    })
}

fn log_loaded(source: &str, list: &SuffixList) {
    let stats = list.stats();
    info!(
        "Loaded public suffix list from {}: {} rules ({} plain, {} wildcard, {} exception)",
        source,
        stats.total(),
        stats.plain,
        stats.wildcard,
        stats.exception
    );
}

/// The process-wide suffix list, initialized from the bundled dataset if
/// nothing was installed first.
pub fn public_suffixes() -> Arc<SuffixList> {
    Arc::clone(global())
}

/// Install the process-wide suffix list.
///
/// Must be called before the first lookup; fails with
/// [`SuffixListErrorKind::AlreadyInstalled`] otherwise.
pub fn install(list: SuffixList) -> Result<()> {
    let stats = list.stats();
    PUBLIC_SUFFIXES.set(Arc::new(list)).map_err(|_| {
        warn!("Public suffix list already initialized, ignoring install");
        GuardError::suffix_list(
            SuffixListErrorKind::AlreadyInstalled,
            "public suffix list is already initialized",
        )
    })?;
    info!(
        "Installed public suffix list: {} rules ({} plain, {} wildcard, {} exception)",
        stats.total(),
        stats.plain,
        stats.wildcard,
        stats.exception
    );
    Ok(())
}

/// Load a dataset file and install it as the process-wide list.
///
/// Callers should treat an error as fatal at startup: there is no safe
/// degraded mode for a missing suffix list.
pub fn install_from_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let list = SuffixList::from_file(path)?;
    log_loaded(&path.display().to_string(), &list);
    install(list)
}

/// Registrable domain of `host` using the process-wide list.
pub fn registrable_domain(host: &str) -> Result<String> {
    global().registrable_domain(host)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_list_is_shared() {
        let a = public_suffixes();
        let b = public_suffixes();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_install_after_init_fails() {
        let _ = public_suffixes();
        let list = SuffixList::parse("com\n").unwrap();
        let err = install(list).unwrap_err();
        assert!(matches!(
            err,
            GuardError::SuffixList {
                kind: SuffixListErrorKind::AlreadyInstalled,
                ..
            }
        ));
        // The bundled list stays in place
        assert!(public_suffixes().contains("co.uk"));
    }

    #[test]
    fn test_global_registrable_domain() {
        assert_eq!(registrable_domain("abcde.co.uk").unwrap(), "abcde.co.uk");
        assert_eq!(registrable_domain("test.myapp.com").unwrap(), "myapp.com");
        assert!(matches!(
            registrable_domain("myapp.notatld"),
            Err(GuardError::UnknownSuffix(_))
        ));
    }
}
