//! Non-persistent session.
//!
//! Holds resume state and caches in process memory only. [`SessionStore`]
//! keeps one of these as its in-memory view and mirrors every change to the
//! database.
//!
//! [`SessionStore`]: crate::SessionStore

use std::collections::{BTreeMap, HashMap};

use telestore_types::entity::{entities_to_rows, EntitySource};
use telestore_types::peer::canonical_variants;
use telestore_types::session::DEFAULT_DC_ID;
use telestore_types::{
    AuthKey, EntityRow, FileKind, IdHash, InputFileRef, InputMedia, SessionRecord, UpdateState,
};

use crate::session::Session;
use crate::{Result, StoreError};

type FileKey = (Vec<u8>, i64, FileKind);

#[derive(Clone, Debug)]
pub struct MemorySession {
    dc_id: i32,
    server_address: Option<String>,
    port: Option<u16>,
    auth_key: Option<AuthKey>,
    takeout_id: Option<i64>,
    save_entities: bool,
    entities: BTreeMap<i64, EntityRow>,
    files: HashMap<FileKey, IdHash>,
    update_states: HashMap<i64, UpdateState>,
}

impl Default for MemorySession {
    fn default() -> Self {
        Self {
            dc_id: DEFAULT_DC_ID,
            server_address: None,
            port: None,
            auth_key: None,
            takeout_id: None,
            save_entities: true,
            entities: BTreeMap::new(),
            files: HashMap::new(),
            update_states: HashMap::new(),
        }
    }
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh session carrying only the resume state and entity flag of
    /// `self`. Caches are not copied.
    pub fn clone_state(&self) -> Self {
        Self {
            dc_id: self.dc_id,
            server_address: self.server_address.clone(),
            port: self.port,
            auth_key: self.auth_key.clone(),
            takeout_id: self.takeout_id,
            save_entities: self.save_entities,
            ..Self::default()
        }
    }

    pub fn save_entities(&self) -> bool {
        self.save_entities
    }

    pub fn set_save_entities(&mut self, enabled: bool) {
        self.save_entities = enabled;
    }

    /// Resume state in its persisted shape.
    pub fn to_record(&self) -> SessionRecord {
        SessionRecord {
            dc_id: self.dc_id,
            server_address: self.server_address.clone(),
            port: self.port,
            auth_key: telestore_types::auth::stored_bytes(self.auth_key.as_ref()),
            takeout_id: self.takeout_id,
        }
    }

    /// Adopt the resume state of a stored record.
    pub fn load_record(&mut self, record: &SessionRecord) -> Result<()> {
        self.auth_key = record.auth_key()?;
        self.dc_id = record.dc_id;
        self.server_address = record.server_address.clone();
        self.port = record.port;
        self.takeout_id = record.takeout_id;
        Ok(())
    }

    fn first_entity_where(&self, pred: impl Fn(&EntityRow) -> bool) -> Option<IdHash> {
        self.entities
            .values()
            .find(|row| pred(row))
            .map(EntityRow::id_hash)
    }
}

impl Session for MemorySession {
    fn dc_id(&self) -> i32 {
        self.dc_id
    }

    fn server_address(&self) -> Option<&str> {
        self.server_address.as_deref()
    }

    fn port(&self) -> Option<u16> {
        self.port
    }

    fn auth_key(&self) -> Option<&AuthKey> {
        self.auth_key.as_ref()
    }

    fn takeout_id(&self) -> Option<i64> {
        self.takeout_id
    }

    fn set_dc(&mut self, dc_id: i32, server_address: &str, port: u16) -> Result<()> {
        self.dc_id = dc_id;
        self.server_address = Some(server_address.to_string());
        self.port = Some(port);
        Ok(())
    }

    fn set_auth_key(&mut self, key: Option<AuthKey>) -> Result<()> {
        self.auth_key = key;
        Ok(())
    }

    fn set_takeout_id(&mut self, takeout_id: Option<i64>) -> Result<()> {
        self.takeout_id = takeout_id;
        Ok(())
    }

    fn get_update_state(&self, entity_id: i64) -> Result<Option<UpdateState>> {
        Ok(self.update_states.get(&entity_id).copied())
    }

    fn set_update_state(&mut self, entity_id: i64, state: &UpdateState) -> Result<()> {
        self.update_states.insert(entity_id, *state);
        Ok(())
    }

    fn process_entities(&mut self, source: &dyn EntitySource) -> Result<()> {
        if !self.save_entities {
            return Ok(());
        }
        for row in entities_to_rows(source) {
            self.entities.insert(row.id, row);
        }
        Ok(())
    }

    fn entity_by_phone(&self, phone: &str) -> Result<Option<IdHash>> {
        Ok(self.first_entity_where(|row| row.phone.as_deref() == Some(phone)))
    }

    fn entity_by_username(&self, username: &str) -> Result<Option<IdHash>> {
        Ok(self.first_entity_where(|row| row.username.as_deref() == Some(username)))
    }

    fn entity_by_name(&self, name: &str) -> Result<Option<IdHash>> {
        Ok(self.first_entity_where(|row| row.name.as_deref() == Some(name)))
    }

    fn entity_by_id(&self, id: i64, exact: bool) -> Result<Option<IdHash>> {
        if exact {
            return Ok(self.entities.get(&id).map(EntityRow::id_hash));
        }
        Ok(canonical_variants(id)
            .iter()
            .find_map(|marked| self.entities.get(marked).map(EntityRow::id_hash)))
    }

    fn get_file(
        &self,
        md5_digest: &[u8],
        file_size: i64,
        kind: FileKind,
    ) -> Result<Option<InputFileRef>> {
        let key = (md5_digest.to_vec(), file_size, kind);
        Ok(self
            .files
            .get(&key)
            .map(|&(id, access_hash)| InputFileRef::new(kind, id, access_hash)))
    }

    fn cache_file(&mut self, md5_digest: &[u8], file_size: i64, media: &InputMedia) -> Result<()> {
        let file = InputFileRef::try_from(media)
            .map_err(|e| StoreError::InvalidArgument(e.to_string()))?;
        self.files
            .insert((md5_digest.to_vec(), file_size, file.kind()), file.id_hash());
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        Ok(Vec::new())
    }
}
