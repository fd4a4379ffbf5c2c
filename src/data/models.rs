//! Data models
//!
//! Rust structs representing stored documents.
//! Store-assigned identifiers are ULIDs rendered as strings.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Collections
// =============================================================================

/// A named document collection
///
/// Names match the collections the external record producers write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Users,
    Timelines,
    FileVersions,
    Capsules,
    EbsSnapshots,
    Ec2Instances,
}

impl Collection {
    /// Collections exposed through the read-only view routes
    pub const VIEWABLE: [Collection; 5] = [
        Collection::Timelines,
        Collection::FileVersions,
        Collection::Capsules,
        Collection::EbsSnapshots,
        Collection::Ec2Instances,
    ];

    /// Store-level collection name
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Users => "user-info",
            Collection::Timelines => "active-timelines",
            Collection::FileVersions => "file-versions",
            Collection::Capsules => "capsules",
            Collection::EbsSnapshots => "ebs-snapshots",
            Collection::Ec2Instances => "ec2-instances",
        }
    }

    /// Path segment under `/chrono/view/`, if the collection is viewable
    pub const fn view_segment(self) -> Option<&'static str> {
        match self {
            Collection::Users => None,
            Collection::Timelines => Some("timelines"),
            Collection::FileVersions => Some("file-versions"),
            Collection::Capsules => Some("capsules"),
            Collection::EbsSnapshots => Some("ebs-snapshots"),
            Collection::Ec2Instances => Some("ec2-instances"),
        }
    }

    /// At most one document per username
    pub const fn has_unique_owner(self) -> bool {
        matches!(self, Collection::Users)
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Documents
// =============================================================================

/// Keys owned by the store rather than by the document body
const RESERVED_KEYS: [&str; 2] = ["_id", "username"];

/// A stored document
///
/// Serializes as the flat body object with `_id` and `username`
/// alongside the producer-supplied fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Document {
    /// Assemble a document read back from storage
    pub fn from_parts(id: String, username: String, mut fields: Map<String, Value>) -> Self {
        strip_reserved(&mut fields);
        Self {
            id,
            username,
            fields,
        }
    }
}

/// A document not yet assigned an identifier
#[derive(Debug, Clone, PartialEq)]
pub struct NewDocument {
    pub username: String,
    pub fields: Map<String, Value>,
}

impl NewDocument {
    pub fn new(username: impl Into<String>, mut fields: Map<String, Value>) -> Self {
        strip_reserved(&mut fields);
        Self {
            username: username.into(),
            fields,
        }
    }

    /// Build from a JSON object value; non-objects yield an empty body
    pub fn from_value(username: impl Into<String>, value: Value) -> Self {
        let fields = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::new(username, fields)
    }

    /// Attach a store-assigned identifier
    pub fn with_id(self, id: EntityId) -> Document {
        Document {
            id: id.0,
            username: self.username,
            fields: self.fields,
        }
    }
}

fn strip_reserved(fields: &mut Map<String, Value>) {
    for key in RESERVED_KEYS {
        fields.remove(key);
    }
}

// =============================================================================
// User
// =============================================================================

/// Field under which the password hash is stored in `user-info`
const PASSWORD_FIELD: &str = "password";

/// A registered user
///
/// Never carries the plaintext password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
    pub password_hash: String,
}

impl User {
    pub fn into_document(self) -> NewDocument {
        let mut fields = Map::new();
        fields.insert(
            PASSWORD_FIELD.to_string(),
            Value::String(self.password_hash),
        );
        NewDocument::new(self.username, fields)
    }
}

impl TryFrom<Document> for User {
    type Error = crate::error::AppError;

    fn try_from(document: Document) -> Result<Self, Self::Error> {
        let password_hash = document
            .fields
            .get(PASSWORD_FIELD)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                crate::error::AppError::Store(format!(
                    "user document {} has no password hash",
                    document.id
                ))
            })?
            .to_string();

        Ok(User {
            username: document.username,
            password_hash,
        })
    }
}
