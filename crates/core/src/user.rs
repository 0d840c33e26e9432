//! The user record observed by the onboarding pipeline.
//!
//! Users are owned by the user-management subsystem; Roster only reads the
//! fields below when relaying events and building notifications.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

/// A newly created user as announced by the user-management subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UserRecord {
    pub id: DbId,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    /// When the user registered.
    pub created_at: Timestamp,
}

impl UserRecord {
    /// Parse a record from an untyped JSON payload and validate it.
    ///
    /// Missing or mistyped fields are reported as [`CoreError::Validation`]
    /// rather than a deserialization error.
    pub fn from_value(value: serde_json::Value) -> Result<Self, CoreError> {
        let record: Self = serde_json::from_value(value)
            .map_err(|e| CoreError::Validation(format!("malformed user record: {e}")))?;
        record.check()?;
        Ok(record)
    }

    /// Ensure the fields needed downstream are present and well formed.
    pub fn check(&self) -> Result<(), CoreError> {
        self.validate()?;
        if self.name.trim().is_empty() {
            return Err(CoreError::Validation("name must not be blank".to_string()));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
