/// Marker that replaces the leftmost label of a wildcard rule
pub const WILDCARD_LABEL: &str = "*";

/// Prefix that marks an exception rule
pub const EXCEPTION_PREFIX: char = '!';

/// A single rule from the public suffix dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SuffixRule {
    /// Literal trailing label sequence, e.g. `co.uk`
    Plain(String),
    /// Leftmost label is `*`, e.g. `*.ck`
    Wildcard(String),
    /// Overrides a matching plain/wildcard rule, e.g. `!www.ck`
    Exception(String),
}

impl SuffixRule {
    /// Parse one dataset line.
    ///
    /// Returns `None` for blank lines and `//` comments.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            return None;
        }

        let rule = if line.starts_with(EXCEPTION_PREFIX) {
            SuffixRule::Exception(line.to_string())
        } else if line == WILDCARD_LABEL || line.starts_with("*.") {
            SuffixRule::Wildcard(line.to_string())
        } else {
            SuffixRule::Plain(line.to_string())
        };
        Some(rule)
    }

    /// The rule exactly as it appears in the dataset
    pub fn as_str(&self) -> &str {
        match self {
            SuffixRule::Plain(s) | SuffixRule::Wildcard(s) | SuffixRule::Exception(s) => s,
        }
    }

    /// The rule's domain labels, without the exception prefix
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.as_str()
            .trim_start_matches(EXCEPTION_PREFIX)
            .split('.')
    }

    /// Rebuild the rule with each label mapped through `f`.
    pub(crate) fn map_labels<F>(&self, mut f: F) -> Option<String>
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.as_str().len());
        if matches!(self, SuffixRule::Exception(_)) {
            out.push(EXCEPTION_PREFIX);
        }
        for (i, label) in self.labels().enumerate() {
            if i > 0 {
                out.push('.');
            }
            out.push_str(&f(label)?);
        }
        Some(out)
    }
}

/// Strip a trailing `:port` from a host (everything from the first colon).
pub fn strip_port(host: &str) -> &str {
    match host.find(':') {
        Some(pos) => &host[..pos],
        None => host,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        assert_eq!(SuffixRule::parse(""), None);
        assert_eq!(SuffixRule::parse("   "), None);
        assert_eq!(SuffixRule::parse("// ac : http://nic.ac/rules.htm"), None);
        assert_eq!(SuffixRule::parse("// ===BEGIN ICANN DOMAINS==="), None);
    }

    #[test]
    fn test_parse_variants() {
        assert_eq!(
            SuffixRule::parse("co.uk"),
            Some(SuffixRule::Plain("co.uk".into()))
        );
        assert_eq!(
            SuffixRule::parse("*.ck"),
            Some(SuffixRule::Wildcard("*.ck".into()))
        );
        assert_eq!(
            SuffixRule::parse("!www.ck"),
            Some(SuffixRule::Exception("!www.ck".into()))
        );
    }

    #[test]
    fn test_parse_trims_whitespace() {
        assert_eq!(
            SuffixRule::parse("  com\r"),
            Some(SuffixRule::Plain("com".into()))
        );
    }

    #[test]
    fn test_labels_drop_exception_prefix() {
        let rule = SuffixRule::parse("!city.kobe.jp").unwrap();
        assert_eq!(rule.labels().collect::<Vec<_>>(), vec!["city", "kobe", "jp"]);
        assert_eq!(rule.as_str(), "!city.kobe.jp");
    }

    #[test]
    fn test_map_labels_keeps_prefix() {
        let rule = SuffixRule::parse("!www.ck").unwrap();
        let upper = rule.map_labels(|l| Some(l.to_uppercase())).unwrap();
        assert_eq!(upper, "!WWW.CK");

        let rule = SuffixRule::parse("*.kobe.jp").unwrap();
        assert_eq!(rule.map_labels(|_| None), None);
    }

    #[test]
    fn test_strip_port() {
        assert_eq!(strip_port("myapp.com:8000"), "myapp.com");
        assert_eq!(strip_port("myapp.com"), "myapp.com");
        assert_eq!(strip_port(":80"), "");
        assert_eq!(strip_port(""), "");
    }
}
