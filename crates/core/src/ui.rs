//! Wire shapes exchanged with the UI.
//!
//! The JSON produced by these types is what the front end renders. TypeScript
//! declarations are generated from them with `ts-rs` (written to `bindings/`
//! when the crate's tests run).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{DbId, Timestamp};
use crate::user::UserRecord;

/// Group name used for permissions that carry none.
pub const UNGROUPED_PERMISSIONS: &str = "general";

/// An authenticated user as shown in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct User {
    #[ts(type = "number")]
    pub id: DbId,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub avatar: Option<String>,
    pub email_verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub roles: Option<Vec<Role>>,
}

impl From<&UserRecord> for User {
    fn from(record: &UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            email: record.email.clone(),
            avatar: None,
            email_verified_at: None,
            created_at: record.created_at,
            updated_at: record.created_at,
            roles: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Role {
    #[ts(type = "number")]
    pub id: DbId,
    pub name: String,
    pub guard_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub permissions: Option<Vec<Permission>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Permission {
    #[ts(type = "number")]
    pub id: DbId,
    pub name: String,
    pub guard_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub group: Option<String>,
}

/// Permissions bucketed under a display heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PermissionGroup {
    pub name: String,
    pub permissions: Vec<Permission>,
}

impl PermissionGroup {
    /// Bucket permissions by their `group`, ordered by group name.
    ///
    /// Permissions without a group land in [`UNGROUPED_PERMISSIONS`]. Within
    /// a group, permissions are ordered by name.
    pub fn group_permissions(permissions: impl IntoIterator<Item = Permission>) -> Vec<Self> {
        let mut buckets: BTreeMap<String, Vec<Permission>> = BTreeMap::new();
        for permission in permissions {
            let key = permission
                .group
                .clone()
                .unwrap_or_else(|| UNGROUPED_PERMISSIONS.to_string());
            buckets.entry(key).or_default().push(permission);
        }

        buckets
            .into_iter()
            .map(|(name, mut permissions)| {
                permissions.sort_by(|a, b| a.name.cmp(&b.name));
                Self { name, permissions }
            })
            .collect()
    }
}

/// Sidebar navigation entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NavItem {
    pub title: String,
    pub href: String,
    /// Icon identifier resolved by the front end.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub icon: Option<String>,
    #[serde(rename = "isActive")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(rename = "isActive", optional)]
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BreadcrumbItem {
    pub title: String,
    pub href: String,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
