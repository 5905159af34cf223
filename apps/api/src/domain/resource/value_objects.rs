use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::errors::ValidationError;

pub const NAME_MAX_LENGTH: usize = 100;
pub const DESCRIPTION_MAX_LENGTH: usize = 500;

/// Resource name value object
///
/// # Invariants
/// - Surrounding whitespace is trimmed
/// - Between 1 and 100 characters after trimming
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceName(String);

impl ResourceName {
    /// Creates a new ResourceName value object
    ///
    /// # Example
    /// ```
    /// use keystone_api::domain::resource::value_objects::ResourceName;
    ///
    /// let name = ResourceName::new("  Example Item ").expect("valid name");
    /// assert_eq!(name.as_str(), "Example Item");
    /// ```
    pub fn new(name: impl AsRef<str>) -> Result<Self, ValidationError> {
        let name = name.as_ref().trim();
        let length = name.chars().count();

        if length == 0 {
            return Err(ValidationError::new("name cannot be empty"));
        }
        if length > NAME_MAX_LENGTH {
            return Err(ValidationError::new(format!(
                "name must be at most {} characters",
                NAME_MAX_LENGTH
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validates an optional description (trimmed, at most 500 characters)
pub fn validate_description(description: Option<String>) -> Result<Option<String>, ValidationError> {
    let Some(description) = description else {
        return Ok(None);
    };

    let description = description.trim().to_string();
    if description.chars().count() > DESCRIPTION_MAX_LENGTH {
        return Err(ValidationError::new(format!(
            "description must be at most {} characters",
            DESCRIPTION_MAX_LENGTH
        )));
    }

    Ok(Some(description))
}

/// Validates an optional numeric value (must not be negative)
pub fn validate_value(value: Option<Decimal>) -> Result<Option<Decimal>, ValidationError> {
    match value {
        Some(v) if v < Decimal::ZERO => {
            Err(ValidationError::new("value must be greater than or equal to 0"))
        }
        other => Ok(other),
    }
}
