//! Wildcard file-name patterns.

use regex::Regex;

/// A compiled `*` wildcard matched against a whole entry name.
///
/// `*` matches zero or more characters; every other character is literal.
/// Directory components are never part of the match.
#[derive(Debug, Clone)]
pub struct WildcardPattern {
    raw: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn compile(pattern: &str) -> crate::Result<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");

        let regex = Regex::new(&format!("(?s)^{body}$")).map_err(|e| {
            crate::Error::InvalidArgument(format!("invalid pattern '{pattern}': {e}"))
        })?;

        Ok(Self {
            raw: pattern.to_string(),
            regex,
        })
    }

    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

impl std::fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}
