//! Outbound user notifications

use async_trait::async_trait;

use crate::api::SlackApiClient;
use crate::error::Result;

/// Sends a message visible only to one user in one channel.
///
/// Delivery is attempted once. Callers log failures and carry on.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, channel_id: &str, user_id: &str, text: &str) -> Result<()>;
}

#[async_trait]
impl Notifier for SlackApiClient {
    async fn notify(&self, channel_id: &str, user_id: &str, text: &str) -> Result<()> {
        self.post_ephemeral(channel_id, user_id, text).await
    }
}
