//! Tag Type Entity
//!
//! Tag types group tags (e.g. "REGION", "DOMAIN") and carry a sort weight.
//! The tag type code is matched exactly, after trimming.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagTypeKey {
    pub tag_type_code: String,
}

impl TagTypeKey {
    pub fn new(tag_type_code: impl Into<String>) -> Self {
        Self {
            tag_type_code: tag_type_code.into(),
        }
    }
}

/// A stored tag type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagType {
    pub id: i64,
    pub tag_type_code: String,
    pub display_name: String,
    /// Sort weight used when listing tag types
    pub tag_type_order: i32,
}

impl TagType {
    pub fn key(&self) -> TagTypeKey {
        TagTypeKey::new(self.tag_type_code.clone())
    }
}

impl Entity for TagType {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagTypeCreateRequest {
    pub tag_type_key: TagTypeKey,
    pub display_name: String,
    pub tag_type_order: i32,
}

impl TagTypeCreateRequest {
    pub fn new(code: &str, display_name: &str, tag_type_order: i32) -> Self {
        Self {
            tag_type_key: TagTypeKey::new(code),
            display_name: display_name.to_string(),
            tag_type_order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagTypeUpdateRequest {
    pub display_name: String,
    pub tag_type_order: i32,
}
