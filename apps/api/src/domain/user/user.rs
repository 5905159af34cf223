use super::value_objects::{Email, Username};
use crate::domain::entity::{contains_ignore_case, Entity, EntityMeta};

/// Persisted user account
///
/// The password hash is never part of any response schema.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub meta: EntityMeta,
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub is_active: bool,
    pub is_admin: bool,
}

/// Validated registration data, password already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub email: Email,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Fields a user may change on their own account
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserPatch {
    pub email: Option<Email>,
    pub password_hash: Option<String>,
    pub is_active: Option<bool>,
}

/// Admin list predicates
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub username: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

impl Entity for User {
    type Draft = NewUser;
    type Patch = UserPatch;
    type Filter = UserFilter;

    const KIND: &'static str = "User";

    fn from_draft(meta: EntityMeta, draft: NewUser) -> Self {
        Self {
            meta,
            username: draft.username,
            email: draft.email,
            password_hash: draft.password_hash,
            is_active: true,
            is_admin: draft.is_admin,
        }
    }

    fn meta(&self) -> &EntityMeta {
        &self.meta
    }

    fn apply(&mut self, patch: &UserPatch) {
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(password_hash) = &patch.password_hash {
            self.password_hash = password_hash.clone();
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        let text = |field: &str, needle: &Option<String>| {
            needle
                .as_deref()
                .map_or(true, |needle| contains_ignore_case(field, needle))
        };

        text(self.username.as_str(), &filter.username)
            && text(self.email.as_str(), &filter.email)
            && filter.is_active.map_or(true, |flag| flag == self.is_active)
    }

    fn unique_keys(&self) -> Vec<(&'static str, String)> {
        vec![
            ("username", self.username.as_str().to_lowercase()),
            ("email", self.email.as_str().to_lowercase()),
        ]
    }
}
