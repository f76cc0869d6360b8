//! # Folio Shared
//!
//! Request and response types of the Folio HTTP API.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse};
