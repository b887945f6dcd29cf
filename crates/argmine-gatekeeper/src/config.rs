//! Gatekeeper configuration

/// Configuration for validation rules
///
/// Span bounds and self-relations are always checked; these switches only
/// cover the checks that callers may legitimately relax.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Enable score bounds checking ([0.0, 1.0])
    pub validate_score_bounds: bool,

    /// Require a component's stored fragment to equal the text under its span
    pub validate_fragments: bool,

    /// Enable role checking for statement links (Attack/Support -> Position)
    pub validate_link_roles: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            validate_score_bounds: true,
            validate_fragments: true,
            validate_link_roles: true,
        }
    }
}

impl ValidationConfig {
    /// Create a permissive configuration (structural checks only)
    pub fn permissive() -> Self {
        Self {
            validate_score_bounds: false,
            validate_fragments: false,
            validate_link_roles: true,
        }
    }
}
