//! The contract a client expects from a session backend.

use telestore_types::entity::EntitySource;
use telestore_types::{
    AuthKey, EntityKey, FileKind, IdHash, InputFileRef, InputMedia, SessionRecord, UpdateState,
};

use crate::Result;

/// A pluggable session backend.
///
/// The client reads resume state through the accessors, pushes every change
/// through the setters and consults the entity and file caches before
/// making network requests.
pub trait Session {
    fn dc_id(&self) -> i32;
    fn server_address(&self) -> Option<&str>;
    fn port(&self) -> Option<u16>;
    fn auth_key(&self) -> Option<&AuthKey>;
    fn takeout_id(&self) -> Option<i64>;

    /// Switch data center.
    fn set_dc(&mut self, dc_id: i32, server_address: &str, port: u16) -> Result<()>;
    fn set_auth_key(&mut self, key: Option<AuthKey>) -> Result<()>;
    fn set_takeout_id(&mut self, takeout_id: Option<i64>) -> Result<()>;

    fn get_update_state(&self, entity_id: i64) -> Result<Option<UpdateState>>;
    fn set_update_state(&mut self, entity_id: i64, state: &UpdateState) -> Result<()>;

    /// Cache every usable entity carried by `source`.
    fn process_entities(&mut self, source: &dyn EntitySource) -> Result<()>;

    fn entity_by_phone(&self, phone: &str) -> Result<Option<IdHash>>;
    fn entity_by_username(&self, username: &str) -> Result<Option<IdHash>>;
    fn entity_by_name(&self, name: &str) -> Result<Option<IdHash>>;

    /// Look up by marked id, or by any marking of a bare id when `exact`
    /// is false.
    fn entity_by_id(&self, id: i64, exact: bool) -> Result<Option<IdHash>>;

    /// Resolve any kind of entity key.
    fn find_entity(&self, key: &EntityKey) -> Result<Option<IdHash>> {
        match key {
            EntityKey::Id(id) => self.entity_by_id(*id, false),
            EntityKey::Phone(phone) => self.entity_by_phone(&EntityKey::normalize_phone(phone)),
            EntityKey::Username(username) => {
                self.entity_by_username(&EntityKey::normalize_username(username))
            }
            EntityKey::Name(name) => self.entity_by_name(name),
        }
    }

    fn get_file(
        &self,
        md5_digest: &[u8],
        file_size: i64,
        kind: FileKind,
    ) -> Result<Option<InputFileRef>>;

    /// Remember that `media` is the server-side copy of a local file.
    ///
    /// Fails with [`crate::StoreError::InvalidArgument`] unless `media` is a
    /// document or photo reference.
    fn cache_file(&mut self, md5_digest: &[u8], file_size: i64, media: &InputMedia) -> Result<()>;

    /// Flush pending writes.
    fn save(&mut self) -> Result<()> {
        Ok(())
    }

    /// Release resources.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }

    /// Forget the current login.
    fn delete(&mut self) -> Result<()>;

    fn list_sessions(&self) -> Result<Vec<SessionRecord>>;
}
