//! Entity payloads and the rows cached for them.

use serde::{Deserialize, Serialize};

use crate::peer::PeerKind;
use crate::IdHash;

/// A user as delivered by the server.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub access_hash: Option<i64>,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    /// Partial constructor whose access hash cannot be used in requests.
    #[serde(default)]
    pub min: bool,
}

/// A basic group. Chats need no access hash.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    pub title: String,
}

/// A channel or supergroup.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: i64,
    pub access_hash: Option<i64>,
    pub username: Option<String>,
    pub title: String,
    #[serde(default)]
    pub min: bool,
}

/// Any entity that can be cached.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TlEntity {
    User(User),
    Chat(Chat),
    Channel(Channel),
}

/// One row of the entity cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRow {
    /// Marked peer id.
    pub id: i64,
    pub hash: i64,
    pub username: Option<String>,
    pub phone: Option<String>,
    pub name: Option<String>,
}

impl EntityRow {
    pub fn id_hash(&self) -> IdHash {
        (self.id, self.hash)
    }
}

impl TlEntity {
    pub fn kind(&self) -> PeerKind {
        match self {
            TlEntity::User(_) => PeerKind::User,
            TlEntity::Chat(_) => PeerKind::Chat,
            TlEntity::Channel(_) => PeerKind::Channel,
        }
    }

    /// Marked peer id of this entity.
    pub fn marked_id(&self) -> i64 {
        let bare = match self {
            TlEntity::User(u) => u.id,
            TlEntity::Chat(c) => c.id,
            TlEntity::Channel(c) => c.id,
        };
        self.kind().mark(bare)
    }

    /// Human-readable name: "first last" for users, the title otherwise.
    pub fn display_name(&self) -> String {
        match self {
            TlEntity::User(u) => {
                let first = u.first_name.as_deref().unwrap_or("").trim();
                let last = u.last_name.as_deref().unwrap_or("").trim();
                match (first.is_empty(), last.is_empty()) {
                    (false, false) => format!("{first} {last}"),
                    (false, true) => first.to_string(),
                    (true, false) => last.to_string(),
                    (true, true) => String::new(),
                }
            }
            TlEntity::Chat(c) => c.title.clone(),
            TlEntity::Channel(c) => c.title.clone(),
        }
    }

    /// Flatten into a cache row.
    ///
    /// Returns `None` for `min` constructors and for users or channels
    /// without an access hash, since neither can be referenced later.
    pub fn to_row(&self) -> Option<EntityRow> {
        let (hash, username, phone) = match self {
            TlEntity::User(u) => {
                if u.min {
                    return None;
                }
                (u.access_hash?, u.username.as_deref(), u.phone.as_deref())
            }
            TlEntity::Chat(_) => (0, None, None),
            TlEntity::Channel(c) => {
                if c.min {
                    return None;
                }
                (c.access_hash?, c.username.as_deref(), None)
            }
        };

        let name = self.display_name();
        Some(EntityRow {
            id: self.marked_id(),
            hash,
            username: non_empty(username).map(|u| u.to_lowercase()),
            phone: non_empty(phone).map(str::to_string),
            name: non_empty(Some(name.as_str())).map(str::to_string),
        })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Users and chats attached to a server response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityBundle {
    #[serde(default)]
    pub chats: Vec<TlEntity>,
    #[serde(default)]
    pub users: Vec<TlEntity>,
}

/// Anything that carries entities worth caching.
pub trait EntitySource {
    fn entities(&self) -> Vec<&TlEntity>;
}

impl EntitySource for TlEntity {
    fn entities(&self) -> Vec<&TlEntity> {
        vec![self]
    }
}

impl EntitySource for Vec<TlEntity> {
    fn entities(&self) -> Vec<&TlEntity> {
        self.iter().collect()
    }
}

impl EntitySource for EntityBundle {
    fn entities(&self) -> Vec<&TlEntity> {
        self.chats.iter().chain(self.users.iter()).collect()
    }
}

/// Flatten every cacheable entity of `source` into rows.
pub fn entities_to_rows<S: EntitySource + ?Sized>(source: &S) -> Vec<EntityRow> {
    source
        .entities()
        .into_iter()
        .filter_map(TlEntity::to_row)
        .collect()
}

/// How a caller identifies an entity it wants to resolve.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityKey {
    Id(i64),
    Phone(String),
    Username(String),
    Name(String),
}

impl EntityKey {
    /// Normalize a username the way the cache stores it.
    pub fn normalize_username(raw: &str) -> String {
        raw.trim().trim_start_matches('@').to_lowercase()
    }

    /// Normalize a phone number the way the server reports it.
    pub fn normalize_phone(raw: &str) -> String {
        raw.trim()
            .trim_start_matches('+')
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
            .collect()
    }
}
