//! # telestore-types
//!
//! Protocol-side value types shared across the telestore workspace.
//!
//! - [`auth`]: the 2048-bit authorization key a client negotiates per data center
//! - [`session`]: the persisted session record
//! - [`peer`]: marked peer ids (user, chat, channel encodings)
//! - [`entity`]: entity payloads and their flattening into cache rows
//! - [`file`]: cacheable file references and their kind tags
//! - [`updates`]: update-stream checkpoints

pub mod auth;
pub mod entity;
pub mod file;
pub mod peer;
pub mod session;
pub mod updates;

pub use auth::AuthKey;
pub use entity::{EntityBundle, EntityKey, EntityRow, EntitySource, TlEntity};
pub use file::{FileKind, InputFileRef, InputMedia};
pub use peer::PeerKind;
pub use session::SessionRecord;
pub use updates::UpdateState;

/// `(id, access_hash)` pair identifying a remote entity or file.
pub type IdHash = (i64, i64);

/// Errors raised while building protocol values.
#[derive(Debug, thiserror::Error)]
pub enum TypesError {
    /// Authorization key has the wrong size.
    #[error("invalid auth key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    /// Stored file kind tag is not one we know about.
    #[error("unknown file kind tag: {0}")]
    UnknownFileKind(i64),

    /// Media reference that cannot be stored in the sent-file cache.
    #[error("cannot cache {0} instance")]
    NotCacheable(&'static str),
}

pub type Result<T> = std::result::Result<T, TypesError>;
