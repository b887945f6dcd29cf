//! Argmine Gatekeeper
//!
//! Validates graph entities before they are persisted.
//!
//! The Gatekeeper provides:
//! - Span validation (non-empty, inside the statement text)
//! - Score bounds checking
//! - Self-relation rejection
//! - Statement link role checking (only Attack/Support -> Position)
//!
//! # Examples
//!
//! ```
//! use argmine_gatekeeper::{Gatekeeper, ValidationStatus};
//!
//! let gatekeeper = Gatekeeper::default_config();
//! let result = gatekeeper.validate_span("We must act now.", 3, 99);
//! assert_eq!(result.status, ValidationStatus::Rejected);
//! ```

#![warn(missing_docs)]

mod validator;
mod config;

pub use validator::{Gatekeeper, ValidationResult, ValidationStatus, RejectionReason};
pub use config::ValidationConfig;
