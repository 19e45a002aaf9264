//! Telegram adapter (teloxide).
//!
//! This crate implements the `bazaar-core` OutboundGateway over the Telegram
//! Bot API and maps incoming updates into core inbound events.

use std::{
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use teloxide::{
    net::Download,
    prelude::*,
    types::{
        InlineKeyboardButton, InlineKeyboardMarkup, InputFile, InputMedia, InputMediaPhoto,
        InputMediaVideo, KeyboardButton, KeyboardMarkup, ParseMode, ReplyMarkup,
    },
};

use tokio::time::sleep;

use bazaar_core::{
    domain::{ChatId, MediaKind, MediaRef},
    errors::Error,
    messaging::{
        port::OutboundGateway,
        types::{AttachmentRef, InlineKeyboard, Keyboard},
    },
    Result,
};

pub mod handlers;
pub mod router;

static DOWNLOAD_COUNTER: AtomicUsize = AtomicUsize::new(1);

#[derive(Clone)]
pub struct TelegramGateway {
    bot: Bot,
    temp_dir: PathBuf,
}

impl TelegramGateway {
    pub fn new(bot: Bot, temp_dir: PathBuf) -> Self {
        Self { bot, temp_dir }
    }

    fn tg_chat(chat: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat.0)
    }

    fn map_err(e: teloxide::RequestError) -> Error {
        Error::Gateway(format!("telegram error: {e}"))
    }

    async fn with_retry<T, Fut>(&self, mut op: impl FnMut() -> Fut) -> Result<T>
    where
        Fut: std::future::IntoFuture<Output = std::result::Result<T, teloxide::RequestError>>,
        Fut::IntoFuture: Send,
    {
        const MAX_RETRIES: usize = 1;
        let mut attempts = 0usize;
        loop {
            match op().await {
                Ok(v) => return Ok(v),
                Err(e) => match e {
                    teloxide::RequestError::RetryAfter(d) if attempts < MAX_RETRIES => {
                        attempts += 1;
                        sleep(d).await;
                        continue;
                    }
                    other => return Err(Self::map_err(other)),
                },
            }
        }
    }
}

fn to_inline_markup(inline: InlineKeyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(inline.rows.into_iter().map(|row| {
        row.into_iter()
            .map(|b| InlineKeyboardButton::callback(b.label, b.callback_data))
            .collect::<Vec<_>>()
    }))
}

fn to_reply_markup(keyboard: Keyboard) -> ReplyMarkup {
    match keyboard {
        Keyboard::Inline(inline) => ReplyMarkup::InlineKeyboard(to_inline_markup(inline)),
        Keyboard::Reply(reply) => {
            let rows: Vec<Vec<KeyboardButton>> = reply
                .rows
                .into_iter()
                .map(|row| row.into_iter().map(KeyboardButton::new).collect())
                .collect();
            ReplyMarkup::Keyboard(KeyboardMarkup::new(rows).resize_keyboard(true))
        }
    }
}

#[async_trait]
impl OutboundGateway for TelegramGateway {
    async fn send_text(&self, chat: ChatId, text: &str, keyboard: Option<Keyboard>) -> Result<()> {
        let markup = keyboard.map(to_reply_markup);
        self.with_retry(|| {
            let mut req = self
                .bot
                .send_message(Self::tg_chat(chat), text.to_string())
                .parse_mode(ParseMode::Html);
            if let Some(markup) = markup.clone() {
                req = req.reply_markup(markup);
            }
            req
        })
        .await?;
        Ok(())
    }

    async fn send_media_group(
        &self,
        chat: ChatId,
        media: &[MediaRef],
        caption: Option<&str>,
    ) -> Result<()> {
        let mut group: Vec<InputMedia> = Vec::with_capacity(media.len());
        for (index, item) in media.iter().enumerate() {
            let parsed = url::Url::parse(&item.url)
                .map_err(|e| Error::Gateway(format!("bad media url {}: {e}", item.url)))?;
            let file = InputFile::url(parsed);

            // Telegram renders the caption of the first item under the album.
            let caption_here = (index == 0)
                .then(|| caption.map(str::to_string))
                .flatten();

            let input = match item.kind {
                MediaKind::Image => {
                    let mut photo = InputMediaPhoto::new(file);
                    if let Some(c) = caption_here {
                        photo = photo.caption(c).parse_mode(ParseMode::Html);
                    }
                    InputMedia::Photo(photo)
                }
                MediaKind::Video => {
                    let mut video = InputMediaVideo::new(file);
                    if let Some(c) = caption_here {
                        video = video.caption(c).parse_mode(ParseMode::Html);
                    }
                    InputMedia::Video(video)
                }
            };
            group.push(input);
        }

        self.with_retry(|| self.bot.send_media_group(Self::tg_chat(chat), group.clone()))
            .await?;
        Ok(())
    }

    async fn download_attachment(&self, attachment: &AttachmentRef) -> Result<Vec<u8>> {
        let file = self
            .bot
            .get_file(attachment.file_id.clone())
            .await
            .map_err(Self::map_err)?;

        let ts = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let n = DOWNLOAD_COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = self.temp_dir.join(format!("attach_{ts}_{n}.bin"));

        let mut dst = tokio::fs::File::create(&path).await?;
        self.bot
            .download_file(&file.path, &mut dst)
            .await
            .map_err(|e| Error::Gateway(format!("telegram download error: {e}")))?;
        drop(dst);

        let bytes = tokio::fs::read(&path).await?;
        let _ = tokio::fs::remove_file(&path).await;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::messaging::types::{InlineButton, ReplyKeyboard};

    #[test]
    fn inline_keyboards_keep_their_grid() {
        let inline = InlineKeyboard::new(vec![
            vec![
                InlineButton::new("a", "like_1"),
                InlineButton::new("b", "dislike_1"),
            ],
            vec![InlineButton::new("c", "write_1")],
        ]);
        let markup = to_inline_markup(inline);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[1].len(), 1);
    }

    #[test]
    fn reply_keyboards_become_resized_keyboards() {
        let keyboard = Keyboard::Reply(ReplyKeyboard::new(vec![vec!["Browse", "Favorites"]]));
        let ReplyMarkup::Keyboard(markup) = to_reply_markup(keyboard) else {
            panic!("expected a reply keyboard");
        };
        assert_eq!(markup.keyboard.len(), 1);
        assert_eq!(markup.keyboard[0].len(), 2);
        assert_eq!(markup.resize_keyboard, Some(true));
    }
}
