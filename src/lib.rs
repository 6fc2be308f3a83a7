//! Redirect Guard - open-redirect protection for login flows
//!
//! This library decides whether a caller-supplied "redirect back to" URL is
//! safe to follow after a login:
//! - Public suffix matching (bundled Mozilla public suffix list)
//! - Registrable-domain comparison between the site and the target
//! - Login flow bookkeeping around the `next` parameter
//! - LRU caching of suffix lookups
//!
//! # Example
//!
//! ```rust
//! use redirect_guard::{sanitize_redirect, LoginFlow, LoginOutcome, RedirectSettings};
//!
//! // Path-relative targets and same-site hosts are kept
//! assert_eq!(sanitize_redirect("myapp.com", Some("/path/")), Some("/path/"));
//! assert_eq!(
//!     sanitize_redirect("myapp.com", Some("https://test.myapp.com/path/")),
//!     Some("https://test.myapp.com/path/")
//! );
//!
//! // Anything else is dropped
//! assert_eq!(sanitize_redirect("myapp.com", Some("https://evil.com/")), None);
//! assert_eq!(sanitize_redirect("myapp.com", Some("//evil.com/")), None);
//!
//! // Login flow: capture `next` at start, compose the final URL at completion
//! let flow = LoginFlow::with_settings(RedirectSettings::new().with_default_redirect("/home/"));
//! let pending = flow.pending("myapp.com", "next=%2Finbox%2F&utm=mail");
//! let url = flow.completion_url(&pending, LoginOutcome::Authenticated { is_new: false });
//! assert_eq!(url, "/inbox/?utm=mail");
//! ```
//!
//! # Safety Rules
//!
//! | Candidate | Example | Result |
//! |-----------|---------|--------|
//! | Absent / empty | `None`, `""` | unsafe |
//! | Path-relative | `/path/` | kept |
//! | Same registrable domain | `http://test.myapp.com/` | kept |
//! | Other domain | `http://notmyapp.com/` | unsafe |
//! | Network-path | `//evil.com/`, `/\evil.com` | checked like absolute |
//! | Unknown suffix | `http://host.notatld/` | unsafe |
//! | Other scheme | `javascript:...` | unsafe |

pub mod config;
pub mod error;
pub mod flow;
pub mod sanitize;
pub mod suffix;
pub mod types;

// Re-export commonly used items
pub use config::{RedirectSettings, SanitizerOptions, DEFAULT_CACHE_SIZE};
pub use error::{GuardError, Result, SuffixListErrorKind};
pub use flow::{AuthBackend, AuthStart, LoginFlow, LoginOutcome, PendingLogin};
pub use sanitize::{sanitize_redirect, sanitize_redirect_value, RedirectSanitizer};
pub use suffix::{registrable_domain, RuleStats, SuffixList};
pub use types::SuffixRule;
