//! Core domain models for vekit
//!
//! This crate contains:
//! - The shared error taxonomy
//! - Storage credentials
//! - Session prefixes and deterministic object-key construction

pub mod credential;
pub mod error;
pub mod object_key;

pub use credential::Credential;
pub use error::{Error, Result};
pub use object_key::{ObjectKey, SessionPrefix, UPLOAD_ROOT};
