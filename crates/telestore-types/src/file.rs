//! Cacheable file references.
//!
//! Only documents and photos can be re-sent by reference, so the sent-file
//! cache stores exactly those two kinds, tagged with a stable integer.

use serde::{Deserialize, Serialize};

use crate::{IdHash, Result, TypesError};

/// Kind tag stored in the `type` column of the sent-file cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Document,
    Photo,
}

impl FileKind {
    /// Stable integer tag.
    pub fn tag(self) -> i64 {
        match self {
            FileKind::Document => 0,
            FileKind::Photo => 1,
        }
    }

    /// Parse a tag read back from storage.
    pub fn from_tag(tag: i64) -> Result<Self> {
        match tag {
            0 => Ok(FileKind::Document),
            1 => Ok(FileKind::Photo),
            other => Err(TypesError::UnknownFileKind(other)),
        }
    }
}

/// A reference to a file already stored on the server.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputFileRef {
    Document { id: i64, access_hash: i64 },
    Photo { id: i64, access_hash: i64 },
}

impl InputFileRef {
    pub fn new(kind: FileKind, id: i64, access_hash: i64) -> Self {
        match kind {
            FileKind::Document => InputFileRef::Document { id, access_hash },
            FileKind::Photo => InputFileRef::Photo { id, access_hash },
        }
    }

    pub fn kind(&self) -> FileKind {
        match self {
            InputFileRef::Document { .. } => FileKind::Document,
            InputFileRef::Photo { .. } => FileKind::Photo,
        }
    }

    pub fn id(&self) -> i64 {
        self.id_hash().0
    }

    pub fn access_hash(&self) -> i64 {
        self.id_hash().1
    }

    pub fn id_hash(&self) -> IdHash {
        match *self {
            InputFileRef::Document { id, access_hash }
            | InputFileRef::Photo { id, access_hash } => (id, access_hash),
        }
    }
}

/// Media a caller may hand to the upload path.
///
/// Freshly uploaded files and raw locations have no reusable server-side
/// reference and are rejected by the sent-file cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputMedia {
    Document { id: i64, access_hash: i64 },
    Photo { id: i64, access_hash: i64 },
    UploadedFile { id: i64, parts: i32, name: String },
    FileLocation { volume_id: i64, local_id: i32 },
}

impl InputMedia {
    pub fn type_name(&self) -> &'static str {
        match self {
            InputMedia::Document { .. } => "InputDocument",
            InputMedia::Photo { .. } => "InputPhoto",
            InputMedia::UploadedFile { .. } => "InputFile",
            InputMedia::FileLocation { .. } => "InputFileLocation",
        }
    }
}

impl TryFrom<&InputMedia> for InputFileRef {
    type Error = TypesError;

    fn try_from(media: &InputMedia) -> Result<Self> {
        match *media {
            InputMedia::Document { id, access_hash } => {
                Ok(InputFileRef::Document { id, access_hash })
            }
            InputMedia::Photo { id, access_hash } => Ok(InputFileRef::Photo { id, access_hash }),
            _ => Err(TypesError::NotCacheable(media.type_name())),
        }
    }
}
