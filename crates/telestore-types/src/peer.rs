//! Marked peer ids.
//!
//! Users, basic chats and channels share one numeric id space on the wire.
//! The client disambiguates them by "marking" the id: users keep the bare
//! id, chats are negated and channels are negated after adding a fixed
//! offset. Entity rows are keyed by the marked id.

use serde::{Deserialize, Serialize};

/// Offset added to channel ids before negation.
pub const CHANNEL_ID_OFFSET: i64 = 1_000_000_000_000;

/// Which kind of peer a marked id refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeerKind {
    User,
    Chat,
    Channel,
}

impl PeerKind {
    /// Mark a bare id as this kind of peer.
    ///
    /// Returns `None` when the marked id does not fit in an `i64`.
    pub fn mark(self, id: i64) -> Option<i64> {
        match self {
            PeerKind::User => Some(id),
            PeerKind::Chat => id.checked_neg(),
            PeerKind::Channel => CHANNEL_ID_OFFSET.checked_add(id)?.checked_neg(),
        }
    }
}

/// The user, chat and channel encodings of a bare id, in that order.
///
/// Encodings that overflow are left out.
pub fn canonical_variants(id: i64) -> Vec<i64> {
    [PeerKind::User, PeerKind::Chat, PeerKind::Channel]
        .into_iter()
        .filter_map(|kind| kind.mark(id))
        .collect()
}
