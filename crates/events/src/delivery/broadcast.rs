//! Push target behind the `broadcast` channel.

use async_trait::async_trait;
use roster_core::types::DbId;

/// Name of the private channel a notifiable's pushes are addressed to.
pub fn private_channel(notifiable_id: DbId) -> String {
    format!("users.{notifiable_id}")
}

/// Realtime push to a notifiable's live connections.
#[async_trait]
pub trait BroadcastSink: Send + Sync {
    /// Push `payload` to every live connection of `notifiable_id`.
    ///
    /// Returns the number of connections reached. Nobody listening is not an
    /// error; the payload is simply dropped.
    async fn push(&self, notifiable_id: DbId, payload: serde_json::Value) -> usize;
}
