use async_trait::async_trait;

use crate::{
    domain::{ChatId, MediaRef},
    messaging::types::{AttachmentRef, Keyboard},
    Result,
};

/// Outbound transport port.
///
/// Telegram is the first implementation; the shape leaves room for other chat
/// transports behind the same contract.
#[async_trait]
pub trait OutboundGateway: Send + Sync {
    async fn send_text(&self, chat: ChatId, text: &str, keyboard: Option<Keyboard>) -> Result<()>;

    /// Send a group of stored media objects with an optional caption on the
    /// first item.
    async fn send_media_group(
        &self,
        chat: ChatId,
        media: &[MediaRef],
        caption: Option<&str>,
    ) -> Result<()>;

    /// Fetch the raw bytes of an inbound attachment.
    async fn download_attachment(&self, attachment: &AttachmentRef) -> Result<Vec<u8>>;
}
