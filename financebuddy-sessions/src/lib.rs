//! Session store: CRUD, TTL, and cleanup for tutoring sessions (spec
//! §4.10 / C10).

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{Result, SessionError};
pub use memory::InMemorySessionStore;
pub use traits::{Mutator, SessionStore};
