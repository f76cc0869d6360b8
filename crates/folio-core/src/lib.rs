//! # Folio Core
//!
//! The domain layer of the Folio blog.
//! This crate contains pure business logic with zero infrastructure dependencies:
//! entities, the authorization rules that gate every post and user operation,
//! and the use-case services that apply them.

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;
pub mod snippet;

pub use error::DomainError;
