//! Domain types shared by every Roster crate.
//!
//! Holds the user record observed by the onboarding pipeline, the
//! notification channel names, the third-party services settings and the
//! wire shapes exchanged with the UI.

pub mod channels;
pub mod error;
pub mod services;
pub mod types;
pub mod ui;
pub mod user;
