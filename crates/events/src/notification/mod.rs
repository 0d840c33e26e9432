//! Notifications and the payloads they render per channel.

pub mod user_registered;

pub use user_registered::{
    BroadcastPayload, DatabasePayload, RegisteredUser, UserRegisteredNotification,
    USER_REGISTERED,
};
