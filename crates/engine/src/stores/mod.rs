//! In-memory state storage modules.
//!
//! Stores manage runtime state that lives only as long as the process:
//! - `SessionStore` - play-through sessions and their ambient emotion

pub mod session;

pub use session::SessionStore;
