//! Authorization keys.
//!
//! The key material is opaque to this crate: it is stored and reloaded as
//! raw bytes, never derived or used for encryption here.

use std::fmt;

use zeroize::Zeroize;

use crate::{Result, TypesError};

/// Size of an MTProto authorization key in bytes.
pub const AUTH_KEY_LEN: usize = 256;

/// A 2048-bit authorization key shared with one data center.
#[derive(Clone, PartialEq, Eq, Zeroize)]
#[zeroize(drop)]
pub struct AuthKey {
    data: Vec<u8>,
}

impl AuthKey {
    /// Build a key from its raw bytes.
    pub fn from_bytes(data: impl Into<Vec<u8>>) -> Result<Self> {
        let data = data.into();
        if data.len() != AUTH_KEY_LEN {
            return Err(TypesError::InvalidKeyLength {
                expected: AUTH_KEY_LEN,
                actual: data.len(),
            });
        }
        Ok(Self { data })
    }

    /// Rebuild a key from a stored blob. Empty blobs mean "no key".
    pub fn from_stored(data: &[u8]) -> Result<Option<Self>> {
        if data.is_empty() {
            return Ok(None);
        }
        Self::from_bytes(data.to_vec()).map(Some)
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Serialized form used by the session table.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.data.clone()
    }
}

// Never print key material.
impl fmt::Debug for AuthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKey")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

/// Stored form of an optional key: raw bytes, or empty when unset.
pub fn stored_bytes(key: Option<&AuthKey>) -> Vec<u8> {
    key.map(AuthKey::to_bytes).unwrap_or_default()
}
