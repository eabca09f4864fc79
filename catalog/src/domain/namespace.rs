//! Namespace Entity
//!
//! Top-level scope for business object definition names.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// A namespace; `code` is stored as supplied but unique regardless of case
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    pub id: i64,
    pub code: String,
}

impl Namespace {
    pub fn new(id: i64, code: String) -> Self {
        Self { id, code }
    }
}

impl Entity for Namespace {
    type Id = i64;

    fn id(&self) -> Self::Id {
        self.id
    }
}
