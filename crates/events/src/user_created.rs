//! The "user created" domain event.

use roster_core::user::UserRecord;
use serde::{Deserialize, Serialize};

use crate::bus::Event;

/// Raised by the user-management subsystem after a user is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserCreated {
    pub user: UserRecord,
}

impl Event for UserCreated {
    const NAME: &'static str = "user.created";
}
