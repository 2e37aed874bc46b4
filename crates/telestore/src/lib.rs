//! # telestore
//!
//! Database-backed session storage for a messaging client.
//!
//! [`SessionStore`] keeps the client's resume state (data center, auth key,
//! takeout id) in a single persisted row and answers entity, sent-file and
//! update-state lookups from the database. [`MemorySession`] is the
//! non-persistent base it builds on. Both implement [`Session`], the
//! contract a client expects from any pluggable session backend.

pub mod config;
pub mod memory;
pub mod registry;
pub mod session;
pub mod store;

pub use config::StoreConfig;
pub use memory::MemorySession;
pub use registry::{ConnectionRegistry, SharedConnection};
pub use session::Session;
pub use store::SessionStore;

pub use telestore_db::CURRENT_VERSION;

/// Session storage errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Db(#[from] telestore_db::DbError),

    #[error("invalid session data: {0}")]
    Types(#[from] telestore_types::TypesError),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("connection lock poisoned for alias '{0}'")]
    LockPoisoned(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
