//! Business logic services
//!
//! Services encapsulate business logic and coordinate between
//! the stores, the token service and the blob uploader.

pub mod book;
pub mod session;
pub mod user;

pub use book::{BookForm, BookLinks, BookService};
pub use session::SessionService;
pub use user::UserService;
