//! Database-backed session.

use std::sync::MutexGuard;

use rusqlite::Connection;
use telestore_db::queries::{entities, sent_files, sessions, update_states, version};
use telestore_types::entity::{entities_to_rows, EntitySource};
use telestore_types::peer::canonical_variants;
use telestore_types::{
    AuthKey, FileKind, IdHash, InputFileRef, InputMedia, SessionRecord, UpdateState,
};

use crate::memory::MemorySession;
use crate::registry::{ConnectionRegistry, SharedConnection};
use crate::session::Session;
use crate::{Result, StoreConfig, StoreError};

/// Session whose resume state and caches live in the database.
///
/// Resume state is also kept in memory so the accessors never hit the
/// database; every setter writes the full session row back.
pub struct SessionStore {
    base: MemorySession,
    alias: String,
    conn: SharedConnection,
}

impl SessionStore {
    /// Connect through `registry`, run the version gate and load any
    /// stored session.
    pub fn open(registry: &ConnectionRegistry, config: &StoreConfig) -> Result<Self> {
        let conn = registry.connect(config)?;
        let mut store = Self {
            base: MemorySession::new(),
            alias: config.alias.clone(),
            conn,
        };
        store.base.set_save_entities(config.save_entities);
        store.bootstrap()?;
        Ok(store)
    }

    /// Private in-memory store (for testing).
    pub fn open_memory() -> Result<Self> {
        Self::open(&ConnectionRegistry::new(), &StoreConfig::default())
    }

    fn bootstrap(&mut self) -> Result<()> {
        let stored = {
            let conn = self.lock()?;
            let version = telestore_db::migrations::run(&conn)?;
            tracing::debug!(alias = %self.alias, version, "Schema version checked");
            sessions::first(&conn)?
        };

        if let Some(record) = stored {
            self.base.load_record(&record)?;
            tracing::info!(
                alias = %self.alias,
                dc_id = record.dc_id,
                has_auth_key = !record.auth_key.is_empty(),
                "Loaded stored session"
            );
        }
        Ok(())
    }

    /// Alias of the underlying connection.
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn save_entities(&self) -> bool {
        self.base.save_entities()
    }

    pub fn set_save_entities(&mut self, enabled: bool) {
        self.base.set_save_entities(enabled);
    }

    /// Copy of the resume state, detached from the database.
    pub fn clone_session(&self) -> MemorySession {
        self.base.clone_state()
    }

    /// Highest schema version recorded in the database.
    pub fn schema_version(&self) -> Result<Option<u32>> {
        let conn = self.lock()?;
        Ok(version::current(&conn)?)
    }

    /// Every stored update-state checkpoint.
    pub fn list_update_states(&self) -> Result<Vec<(i64, UpdateState)>> {
        let conn = self.lock()?;
        Ok(update_states::list(&conn)?)
    }

    /// Number of cached entities.
    pub fn entity_count(&self) -> Result<u64> {
        let conn = self.lock()?;
        Ok(entities::count(&conn)?)
    }

    /// Write the in-memory resume state as the single session row.
    pub fn persist_session(&self) -> Result<()> {
        let record = self.base.to_record();
        let conn = self.lock()?;
        sessions::upsert(&conn, &record)?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::LockPoisoned(self.alias.clone()))
    }
}

impl Session for SessionStore {
    fn dc_id(&self) -> i32 {
        self.base.dc_id()
    }

    fn server_address(&self) -> Option<&str> {
        self.base.server_address()
    }

    fn port(&self) -> Option<u16> {
        self.base.port()
    }

    fn auth_key(&self) -> Option<&AuthKey> {
        self.base.auth_key()
    }

    fn takeout_id(&self) -> Option<i64> {
        self.base.takeout_id()
    }

    fn set_dc(&mut self, dc_id: i32, server_address: &str, port: u16) -> Result<()> {
        self.base.set_dc(dc_id, server_address, port)?;
        self.persist_session()?;

        // Re-read the key stored alongside this data center.
        let stored = {
            let conn = self.lock()?;
            sessions::first(&conn)?
        };
        let key = match stored {
            Some(record) => record.auth_key()?,
            None => None,
        };
        self.base.set_auth_key(key)
    }

    fn set_auth_key(&mut self, key: Option<AuthKey>) -> Result<()> {
        self.base.set_auth_key(key)?;
        self.persist_session()
    }

    fn set_takeout_id(&mut self, takeout_id: Option<i64>) -> Result<()> {
        self.base.set_takeout_id(takeout_id)?;
        self.persist_session()
    }

    fn get_update_state(&self, entity_id: i64) -> Result<Option<UpdateState>> {
        let conn = self.lock()?;
        Ok(update_states::get(&conn, entity_id)?)
    }

    fn set_update_state(&mut self, entity_id: i64, state: &UpdateState) -> Result<()> {
        let conn = self.lock()?;
        update_states::set(&conn, entity_id, state)?;
        Ok(())
    }

    fn process_entities(&mut self, source: &dyn EntitySource) -> Result<()> {
        if !self.base.save_entities() {
            return Ok(());
        }

        let rows = entities_to_rows(source);
        if rows.is_empty() {
            return Ok(());
        }

        let conn = self.lock()?;
        entities::insert_many(&conn, &rows)?;
        tracing::debug!(alias = %self.alias, count = rows.len(), "Recorded entities");
        Ok(())
    }

    fn entity_by_phone(&self, phone: &str) -> Result<Option<IdHash>> {
        let conn = self.lock()?;
        Ok(entities::find_by_phone(&conn, phone)?)
    }

    fn entity_by_username(&self, username: &str) -> Result<Option<IdHash>> {
        let conn = self.lock()?;
        Ok(entities::find_by_username(&conn, username)?)
    }

    fn entity_by_name(&self, name: &str) -> Result<Option<IdHash>> {
        let conn = self.lock()?;
        Ok(entities::find_by_name(&conn, name)?)
    }

    fn entity_by_id(&self, id: i64, exact: bool) -> Result<Option<IdHash>> {
        let conn = self.lock()?;
        if exact {
            Ok(entities::find_by_id(&conn, id)?)
        } else {
            Ok(entities::find_by_any_id(&conn, &canonical_variants(id))?)
        }
    }

    fn get_file(
        &self,
        md5_digest: &[u8],
        file_size: i64,
        kind: FileKind,
    ) -> Result<Option<InputFileRef>> {
        let conn = self.lock()?;
        Ok(sent_files::find(&conn, md5_digest, file_size, kind)?)
    }

    fn cache_file(&mut self, md5_digest: &[u8], file_size: i64, media: &InputMedia) -> Result<()> {
        let file = InputFileRef::try_from(media).map_err(|e| {
            tracing::warn!(
                alias = %self.alias,
                kind = media.type_name(),
                "Rejected sent-file cache entry"
            );
            StoreError::InvalidArgument(e.to_string())
        })?;
        let conn = self.lock()?;
        sent_files::insert(&conn, md5_digest, file_size, &file)?;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let Some(key) = self.base.auth_key() else {
            return Ok(());
        };
        let conn = self.lock()?;
        let removed = sessions::delete_by_auth_key(&conn, key.as_bytes())?;
        tracing::info!(alias = %self.alias, removed, "Deleted stored session");
        Ok(())
    }

    fn list_sessions(&self) -> Result<Vec<SessionRecord>> {
        let conn = self.lock()?;
        Ok(sessions::list(&conn)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use telestore_types::auth::AUTH_KEY_LEN;
    use telestore_types::entity::{Channel, Chat, User};
    use telestore_types::{EntityBundle, EntityKey, TlEntity};

    fn key(byte: u8) -> AuthKey {
        AuthKey::from_bytes(vec![byte; AUTH_KEY_LEN]).expect("auth key")
    }

    fn user(id: i64, hash: i64, username: &str) -> TlEntity {
        TlEntity::User(User {
            id,
            access_hash: Some(hash),
            username: Some(username.into()),
            ..Default::default()
        })
    }

    #[test]
    fn test_fresh_store_is_empty() {
        let store = SessionStore::open_memory().expect("open");
        assert_eq!(store.dc_id(), 0);
        assert!(store.auth_key().is_none());
        assert!(store.list_sessions().expect("list").is_empty());
        assert_eq!(store.schema_version().expect("version"), Some(crate::CURRENT_VERSION));
    }

    #[test]
    fn test_mutations_merge_into_one_row() {
        let mut store = SessionStore::open_memory().expect("open");
        store.set_auth_key(Some(key(1))).expect("key");
        store.set_dc(2, "149.154.167.51", 443).expect("dc");
        store.set_takeout_id(Some(77)).expect("takeout");
        store.set_auth_key(Some(key(5))).expect("key");

        let rows = store.list_sessions().expect("list");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].dc_id, 2);
        assert_eq!(rows[0].server_address.as_deref(), Some("149.154.167.51"));
        assert_eq!(rows[0].port, Some(443));
        assert_eq!(rows[0].takeout_id, Some(77));
        assert_eq!(rows[0].auth_key, vec![5u8; AUTH_KEY_LEN]);
    }

    #[test]
    fn test_set_dc_resyncs_auth_key() {
        let mut store = SessionStore::open_memory().expect("open");
        store.set_dc(4, "149.154.167.91", 443).expect("dc");
        assert!(store.auth_key().is_none());

        store.set_auth_key(Some(key(3))).expect("key");
        store.set_dc(2, "149.154.167.51", 443).expect("dc");
        assert_eq!(store.auth_key(), Some(&key(3)));
    }

    #[test]
    fn test_delete_matches_current_key() {
        let mut store = SessionStore::open_memory().expect("open");
        store.delete().expect("delete without key");

        store.set_auth_key(Some(key(8))).expect("key");
        store.delete().expect("delete");
        assert!(store.list_sessions().expect("list").is_empty());
    }

    #[test]
    fn test_update_state_roundtrip() {
        let mut store = SessionStore::open_memory().expect("open");
        assert_eq!(store.get_update_state(0).expect("missing"), None);

        let state = UpdateState::new(10, 2, 1_700_000_000, 3);
        store.set_update_state(0, &state).expect("set");
        store.set_update_state(0, &UpdateState::new(11, 2, 1_700_000_100, 4)).expect("set");

        let stored = store.get_update_state(0).expect("get").expect("row");
        assert_eq!(stored.pts, 11);
        assert_eq!(stored.date, 1_700_000_100);
        assert_eq!(store.list_update_states().expect("list").len(), 1);
    }

    #[test]
    fn test_entity_lookups() {
        let mut store = SessionStore::open_memory().expect("open");
        let bundle = EntityBundle {
            chats: vec![
                TlEntity::Chat(Chat {
                    id: 3,
                    title: "Book club".into(),
                }),
                TlEntity::Channel(Channel {
                    id: 7,
                    access_hash: Some(70),
                    username: Some("News".into()),
                    title: "News".into(),
                    min: false,
                }),
            ],
            users: vec![user(42, 99, "alice")],
        };
        store.process_entities(&bundle).expect("process");

        assert_eq!(store.entity_count().expect("count"), 3);
        assert_eq!(store.entity_by_username("alice").expect("u"), Some((42, 99)));
        assert_eq!(store.entity_by_username("bob").expect("u"), None);
        assert_eq!(store.entity_by_name("Book club").expect("n"), Some((-3, 0)));
        assert_eq!(
            store.find_entity(&EntityKey::Username("@NEWS".into())).expect("key"),
            Some((-1_000_000_000_007, 70))
        );
        assert_eq!(store.entity_by_id(7, true).expect("exact"), None);
        assert_eq!(
            store.entity_by_id(7, false).expect("any"),
            Some((-1_000_000_000_007, 70))
        );
    }

    #[test]
    fn test_extreme_ids_are_misses() {
        let mut store = SessionStore::open_memory().expect("open");
        store.process_entities(&user(42, 99, "alice")).expect("process");

        for id in [i64::MAX, i64::MIN] {
            assert_eq!(store.entity_by_id(id, false).expect("any"), None);
            assert_eq!(store.entity_by_id(id, true).expect("exact"), None);
            assert_eq!(store.find_entity(&EntityKey::Id(id)).expect("key"), None);
        }
    }

    #[test]
    fn test_entity_saving_can_be_disabled() {
        let mut store = SessionStore::open_memory().expect("open");
        store.set_save_entities(false);
        store.process_entities(&user(1, 2, "carol")).expect("process");
        assert_eq!(store.entity_count().expect("count"), 0);
    }

    #[test]
    fn test_file_cache() {
        let mut store = SessionStore::open_memory().expect("open");
        let digest = [0xAA; 16];
        store
            .cache_file(&digest, 2048, &InputMedia::Document { id: 5, access_hash: 77 })
            .expect("cache");

        let hit = store.get_file(&digest, 2048, FileKind::Document).expect("get");
        assert_eq!(hit.map(|f| f.id_hash()), Some((5, 77)));
        assert_eq!(store.get_file(&digest, 2048, FileKind::Photo).expect("get"), None);
    }

    #[test]
    fn test_invalid_cache_input_persists_nothing() {
        let mut store = SessionStore::open_memory().expect("open");
        let media = InputMedia::UploadedFile {
            id: 5,
            parts: 1,
            name: "a.bin".into(),
        };
        let err = store.cache_file(&[1; 16], 10, &media).expect_err("rejected");
        assert!(matches!(err, StoreError::InvalidArgument(_)));

        let count = sent_files::count(&store.lock().expect("lock")).expect("count");
        assert_eq!(count, 0);
    }

    #[test]
    fn test_clone_session_keeps_flag() {
        let mut store = SessionStore::open_memory().expect("open");
        store.set_save_entities(false);
        store.set_takeout_id(Some(9)).expect("takeout");

        let cloned = store.clone_session();
        assert_eq!(cloned.takeout_id(), Some(9));
        assert!(!cloned.save_entities());
    }

    #[test]
    fn test_save_and_close_are_noops() {
        let mut store = SessionStore::open_memory().expect("open");
        store.set_takeout_id(Some(1)).expect("takeout");
        store.save().expect("save");
        store.close().expect("close");
        assert_eq!(store.list_sessions().expect("list").len(), 1);
    }
}
