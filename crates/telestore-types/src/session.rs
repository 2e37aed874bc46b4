//! Persisted session record.

use serde::{Deserialize, Serialize};
use serde_with::{hex::Hex, serde_as};

use crate::auth::AuthKey;
use crate::Result;

/// Data center the client talks to when nothing else is known.
pub const DEFAULT_DC_ID: i32 = 0;

/// Everything needed to resume a connection without logging in again.
#[serde_as]
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub dc_id: i32,
    pub server_address: Option<String>,
    pub port: Option<u16>,
    /// Raw auth key, empty when none has been negotiated.
    #[serde_as(as = "Hex")]
    pub auth_key: Vec<u8>,
    pub takeout_id: Option<i64>,
}

impl SessionRecord {
    /// Decode the stored auth key.
    pub fn auth_key(&self) -> Result<Option<AuthKey>> {
        AuthKey::from_stored(&self.auth_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AUTH_KEY_LEN;

    #[test]
    fn test_auth_key_decoding() {
        let mut record = SessionRecord::default();
        assert!(record.auth_key().expect("empty").is_none());

        record.auth_key = vec![1u8; AUTH_KEY_LEN];
        let key = record.auth_key().expect("decode").expect("present");
        assert_eq!(key.as_bytes(), record.auth_key.as_slice());
    }

    #[test]
    fn test_json_uses_hex() {
        let record = SessionRecord {
            dc_id: 2,
            server_address: Some("149.154.167.51".into()),
            port: Some(443),
            auth_key: vec![0xde, 0xad],
            takeout_id: None,
        };
        let json = serde_json::to_value(&record).expect("serialize");
        assert_eq!(json["auth_key"], "dead");
        let back: SessionRecord = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, record);
    }
}
