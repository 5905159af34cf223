use rust_decimal::Decimal;

use super::value_objects::{validate_description, validate_value, ResourceName};
use crate::domain::entity::{contains_ignore_case, Entity, EntityMeta};
use crate::domain::errors::ValidationError;

/// Example resource aggregate
///
/// # Invariants
/// - Identifier and creation timestamp never change after construction
/// - Name is always a valid `ResourceName`
/// - Value, when present, is non-negative
///
/// # Example
/// ```
/// use keystone_api::domain::entity::{Entity, EntityMeta};
/// use keystone_api::domain::resource::{NewResource, Resource};
///
/// let draft = NewResource::new("Example Item", None, None, None).expect("valid draft");
/// let resource = Resource::from_draft(EntityMeta::generate(), draft);
///
/// assert_eq!(resource.name().as_str(), "Example Item");
/// assert!(resource.is_active());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    meta: EntityMeta,
    name: ResourceName,
    description: Option<String>,
    value: Option<Decimal>,
    is_active: bool,
}

/// Validated creation input for a resource
#[derive(Debug, Clone, PartialEq)]
pub struct NewResource {
    pub name: ResourceName,
    pub description: Option<String>,
    pub value: Option<Decimal>,
    pub is_active: bool,
}

impl NewResource {
    /// Validates raw creation fields
    ///
    /// `is_active` defaults to true when absent.
    pub fn new(
        name: impl AsRef<str>,
        description: Option<String>,
        value: Option<Decimal>,
        is_active: Option<bool>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: ResourceName::new(name)?,
            description: validate_description(description)?,
            value: validate_value(value)?,
            is_active: is_active.unwrap_or(true),
        })
    }
}

/// Partial update for a resource
///
/// `None` leaves a field untouched. For nullable fields `Some(None)` clears
/// the stored value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourcePatch {
    pub name: Option<ResourceName>,
    pub description: Option<Option<String>>,
    pub value: Option<Option<Decimal>>,
    pub is_active: Option<bool>,
}

impl ResourcePatch {
    /// Validates the fields that were supplied
    pub fn new(
        name: Option<String>,
        description: Option<Option<String>>,
        value: Option<Option<Decimal>>,
        is_active: Option<bool>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            name: name.map(ResourceName::new).transpose()?,
            description: description.map(validate_description).transpose()?,
            value: value.map(validate_value).transpose()?,
            is_active,
        })
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// List predicates for resources
#[derive(Debug, Clone, Default)]
pub struct ResourceFilter {
    /// Case-insensitive substring match on the name
    pub name: Option<String>,
    /// Exact match on the active flag
    pub is_active: Option<bool>,
}

impl Resource {
    pub fn name(&self) -> &ResourceName {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn value(&self) -> Option<Decimal> {
        self.value
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// Reconstructs a Resource from persistence layer data
    ///
    /// Only to be used by repository implementations.
    pub fn from_persistence(
        meta: EntityMeta,
        name: ResourceName,
        description: Option<String>,
        value: Option<Decimal>,
        is_active: bool,
    ) -> Self {
        Self {
            meta,
            name,
            description,
            value,
            is_active,
        }
    }
}

impl Entity for Resource {
    type Draft = NewResource;
    type Patch = ResourcePatch;
    type Filter = ResourceFilter;

    const KIND: &'static str = "Resource";

    fn from_draft(meta: EntityMeta, draft: NewResource) -> Self {
        Self {
            meta,
            name: draft.name,
            description: draft.description,
            value: draft.value,
            is_active: draft.is_active,
        }
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn apply(&mut self, patch: &ResourcePatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(value) = patch.value {
            self.value = value;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }

    fn matches(&self, filter: &ResourceFilter) -> bool {
        let name_matches = filter
            .name
            .as_deref()
            .map_or(true, |needle| contains_ignore_case(self.name.as_str(), needle));
        let active_matches = filter.is_active.map_or(true, |flag| flag == self.is_active);

        name_matches && active_matches
    }
}
