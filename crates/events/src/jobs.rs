//! Job payloads produced by this crate.

use serde::{Deserialize, Serialize};

use crate::queue::Job;

/// Send the welcome email to a newly registered user.
///
/// Carries only what the mailer needs; the rest of the user record stays
/// with the user-management subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WelcomeEmailJob {
    pub recipient_email: String,
    pub recipient_name: String,
}

impl Job for WelcomeEmailJob {
    const NAME: &'static str = "welcome_email";
}
