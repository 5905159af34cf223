use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity and creation timestamp shared by every persisted entity
///
/// Entities embed this value object instead of inheriting the fields, and
/// response schemas flatten it into their JSON representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

impl EntityMeta {
    /// Fresh identity stamped with the current time
    ///
    /// The timestamp is cut to microseconds, the precision storage keeps,
    /// so a created entity equals the one read back later.
    pub fn generate() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now().trunc_subsecs(6),
        }
    }

    /// Rebuilds metadata loaded from storage
    pub fn from_persistence(id: Uuid, created_at: DateTime<Utc>) -> Self {
        Self { id, created_at }
    }
}

/// Contract the generic CRUD pipeline and repositories rely on
///
/// `Draft` is validated creation input, `Patch` a validated partial update
/// and `Filter` the list predicates for the entity.
pub trait Entity: Clone + Send + Sync + 'static {
    type Draft: Send;
    type Patch: Send + Sync;
    type Filter: Send + Sync;

    /// Human readable entity name used in error messages
    const KIND: &'static str;

    /// Builds a new entity from its draft and freshly generated metadata
    fn from_draft(meta: EntityMeta, draft: Self::Draft) -> Self;

    fn meta(&self) -> &EntityMeta;

    /// Applies the fields present in `patch`, leaving all others untouched
    fn apply(&mut self, patch: &Self::Patch);

    /// Evaluates the list filter against this entity
    fn matches(&self, filter: &Self::Filter) -> bool;

    /// Normalised values that must be unique across all entities of this kind
    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    fn id(&self) -> Uuid {
        self.meta().id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.meta().created_at
    }
}

/// Case-insensitive substring match used by text filters
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
