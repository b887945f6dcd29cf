//! Identity module - content-addressed identifiers for debate entities
//!
//! Every entity the pipeline persists is keyed by a hash of its normalized
//! content, so re-ingesting the same content always lands on the same record
//! and internal surrogate keys never leave the store.

use std::fmt;
use twox_hash::xxh3;

/// Number of hex characters in an identifier (a 64-bit XXH3 digest)
pub const IDENTIFIER_LEN: usize = 16;

/// Content-derived identifier of a debate, author, statement or component
///
/// Identifiers are lowercase hex renderings of a seeded XXH3-64 digest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Parse an identifier from its hex representation
    ///
    /// # Examples
    ///
    /// ```
    /// use argmine_domain::Identifier;
    ///
    /// let id = Identifier::parse("00ff00ff00ff00ff").unwrap();
    /// assert_eq!(id.as_str(), "00ff00ff00ff00ff");
    /// assert!(Identifier::parse("not-hex").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        if s.len() != IDENTIFIER_LEN {
            return Err(format!(
                "Invalid identifier '{}': expected {} hex characters",
                s, IDENTIFIER_LEN
            ));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("Invalid identifier '{}': not hexadecimal", s));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    /// Get the hex representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_digest(digest: u64) -> Self {
        Self(format!("{:016x}", digest))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Derives identifiers from ordered content parts
///
/// The engine is seeded with one process-wide secret. The same parts under
/// the same seed always produce the same identifier, across runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentityEngine {
    seed: u64,
}

impl IdentityEngine {
    /// Create an engine with the given hash seed
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// The seed this engine hashes with
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Compute the identifier of an ordered list of content parts
    ///
    /// # Examples
    ///
    /// ```
    /// use argmine_domain::IdentityEngine;
    ///
    /// let engine = IdentityEngine::new(42);
    /// let a = engine.identifier(&["Hello, World!", "debate"]);
    /// let b = engine.identifier(&["hello world", "debate"]);
    /// assert_eq!(a, b);
    /// ```
    pub fn identifier<S: AsRef<str>>(&self, parts: &[S]) -> Identifier {
        let key = content_key(parts);
        Identifier::from_digest(xxh3::hash64_with_seed(key.as_bytes(), self.seed))
    }
}

impl Default for IdentityEngine {
    fn default() -> Self {
        Self::new(0)
    }
}

/// Normalized, URL-safe key for a list of parts: the slug of each part joined by `+`
///
/// Two contents are the same entity exactly when their keys are equal.
pub fn content_key<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|part| slugify(part.as_ref()))
        .collect::<Vec<_>>()
        .join("+")
}

/// Lowercase the text, drop punctuation and collapse whitespace and hyphens
/// into single hyphens
///
/// # Examples
///
/// ```
/// use argmine_domain::identity::slugify;
///
/// assert_eq!(slugify("  We must NOT be divided -- on this issue. "), "we-must-not-be-divided-on-this-issue");
/// assert_eq!(slugify("42"), "42");
/// ```
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_hyphen = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_punctuation_and_case() {
        assert_eq!(slugify("Communism is the enemy!"), "communism-is-the-enemy");
        assert_eq!(slugify("a.b"), "ab");
        assert_eq!(slugify("__tail__"), "tail");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_identifier_is_fixed_length_hex() {
        let id = IdentityEngine::new(7).identifier(&["some text"]);
        assert_eq!(id.as_str().len(), IDENTIFIER_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_seed_changes_identifier() {
        let a = IdentityEngine::new(1).identifier(&["same"]);
        let b = IdentityEngine::new(2).identifier(&["same"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_part_boundaries_matter() {
        let engine = IdentityEngine::default();
        let a = engine.identifier(&["we must", "act"]);
        let b = engine.identifier(&["we", "must act"]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_span_offsets_distinguish_identical_text() {
        let engine = IdentityEngine::default();
        let first = engine.identifier(&["we cannot", "0", "9", "abcd"]);
        let second = engine.identifier(&["we cannot", "40", "49", "abcd"]);
        assert_ne!(first, second);
    }

    #[test]
    fn test_parse_round_trip() {
        let id = IdentityEngine::new(3).identifier(&["x"]);
        assert_eq!(Identifier::parse(id.as_str()).unwrap(), id);
        assert!(Identifier::parse("").is_err());
        assert!(Identifier::parse("zzzzzzzzzzzzzzzz").is_err());
    }
}
