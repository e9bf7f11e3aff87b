//! Book Catalog Shared Library
//!
//! This crate contains shared types, models, and validation rules used by
//! the backend and by API clients.

pub mod errors;
pub mod models;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use models::{Book, BookId, Session, SessionId, User, UserId, UserSnapshot};
pub use types::*;
