//! Argumentative components - labeled spans of a statement

use crate::identity::{content_key, IdentityEngine, Identifier};
use std::fmt;

/// Label of an argumentative component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentLabel {
    /// Something the author asserts
    Claim,

    /// Something offered as a reason for a claim
    Premise,
}

impl ComponentLabel {
    /// Short code used for storage and brat export
    pub fn code(&self) -> &'static str {
        match self {
            ComponentLabel::Claim => "CL",
            ComponentLabel::Premise => "PR",
        }
    }

    /// Human readable name
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentLabel::Claim => "Claim",
            ComponentLabel::Premise => "Premise",
        }
    }

    /// Parse a tagger or storage label, accepting names and codes
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "claim" | "cl" => Some(ComponentLabel::Claim),
            "premise" | "pr" => Some(ComponentLabel::Premise),
            _ => None,
        }
    }
}

impl fmt::Display for ComponentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labeled span `[start, end)` of a statement's text
///
/// Offsets count characters, not bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    /// Content identifier, set once
    pub identifier: Identifier,

    /// Owning statement
    pub statement: Identifier,

    /// First character of the span
    pub start: usize,

    /// One past the last character of the span
    pub end: usize,

    /// Claim or premise
    pub label: ComponentLabel,

    /// Tagger confidence [0.0, 1.0]
    pub score: f64,

    /// The statement text covered by the span
    pub fragment: String,

    /// Set when a human annotated the component
    pub manual_annotation: bool,
}

impl Component {
    /// Normalized content this component's identifier is derived from
    pub fn content_key(&self) -> String {
        component_key(&self.fragment, self.start, self.end, &self.statement)
    }

    /// Whether this component may be the target of a relation under the
    /// claims-only directionality policy
    pub fn is_claim(&self) -> bool {
        self.label == ComponentLabel::Claim
    }
}

/// A component span that has not been assigned an identifier yet
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentDraft {
    /// Owning statement
    pub statement: Identifier,

    /// First character of the span
    pub start: usize,

    /// One past the last character of the span
    pub end: usize,

    /// Claim or premise
    pub label: ComponentLabel,

    /// Tagger confidence [0.0, 1.0]
    pub score: f64,

    /// The statement text covered by the span
    pub fragment: String,
}

impl ComponentDraft {
    /// Derive the identifier from (fragment, start, end, statement)
    ///
    /// The span bounds are part of the key: the same words can recur
    /// within one statement.
    pub fn build_identifier(&self, engine: &IdentityEngine) -> Identifier {
        let start = self.start.to_string();
        let end = self.end.to_string();
        engine.identifier(&[
            self.fragment.as_str(),
            start.as_str(),
            end.as_str(),
            self.statement.as_str(),
        ])
    }

    /// Attach an identifier, producing an automatically annotated component
    pub fn into_component(self, identifier: Identifier) -> Component {
        Component {
            identifier,
            statement: self.statement,
            start: self.start,
            end: self.end,
            label: self.label,
            score: self.score,
            fragment: self.fragment,
            manual_annotation: false,
        }
    }
}

fn component_key(fragment: &str, start: usize, end: usize, statement: &Identifier) -> String {
    content_key(&[
        fragment.to_string(),
        start.to_string(),
        end.to_string(),
        statement.to_string(),
    ])
}

/// Number of characters in `text`
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Slice `text` by character offsets `[start, end)`
///
/// Returns `None` when the range is empty, reversed, or past the end of the text.
///
/// # Examples
///
/// ```
/// use argmine_domain::component::char_slice;
///
/// assert_eq!(char_slice("¿Qué pasa?", 1, 4), Some("Qué"));
/// assert_eq!(char_slice("abc", 2, 2), None);
/// assert_eq!(char_slice("abc", 1, 9), None);
/// ```
pub fn char_slice(text: &str, start: usize, end: usize) -> Option<&str> {
    if start >= end {
        return None;
    }
    let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
    let byte_start = indices.nth(start)?;
    let byte_end = indices.nth(end - start - 1)?;
    Some(&text[byte_start..byte_end])
}

/// Shrink `[start, end)` inward until it neither starts nor ends on whitespace
///
/// Never grows the span. An all-whitespace span collapses to an empty one.
///
/// # Examples
///
/// ```
/// use argmine_domain::component::trim_span;
///
/// assert_eq!(trim_span("  we must act  ", 0, 15), (2, 13));
/// assert_eq!(trim_span("a    b", 1, 5), (5, 5));
/// ```
pub fn trim_span(text: &str, start: usize, end: usize) -> (usize, usize) {
    let chars: Vec<char> = text.chars().skip(start).take(end.saturating_sub(start)).collect();
    let leading = chars.iter().take_while(|c| c.is_whitespace()).count();
    if leading == chars.len() {
        return (start + leading, start + leading);
    }
    let trailing = chars.iter().rev().take_while(|c| c.is_whitespace()).count();
    (start + leading, start + chars.len() - trailing)
}
