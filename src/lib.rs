// Roster - student roster store with explicit key-value persistence

pub mod config;
pub mod form;
pub mod models;
pub mod record;
pub mod render;
pub mod storage;
pub mod store;

// Re-export main types for convenience
pub use config::{Backend, Config};
pub use form::{Applied, FormCommand, FormError, FormInput};
pub use models::{Student, StudentFields};
pub use record::Record;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, SqliteStorage};
pub use store::{LoadSource, Store};

/// Roster of students over any storage backend
pub type Roster<S> = Store<Student, S>;
