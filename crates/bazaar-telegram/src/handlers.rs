//! Update handlers: map each Telegram update into one core inbound event.

use std::sync::Arc;

use teloxide::{
    prelude::*,
    types::{CallbackQuery, Message},
};
use tracing::warn;

use bazaar_core::{
    domain::{ChatId, MediaKind, UserId},
    messaging::types::{AttachmentRef, InboundEvent},
    ratelimit::RateDecision,
};

use crate::router::AppState;

pub async fn handle_message(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let user_id = UserId(user.id.0 as i64);
    let chat_id = ChatId(msg.chat.id.0);

    {
        let mut limiter = state.rate_limiter.lock().await;
        if let RateDecision::Deny(retry) = limiter.check(user_id) {
            let _ = bot
                .send_message(
                    msg.chat.id,
                    format!(
                        "⏳ Rate limited. Please wait {:.1} seconds.",
                        retry.as_secs_f64()
                    ),
                )
                .await;
            return Ok(());
        }
    }

    let Some(event) = classify_message(&msg) else {
        return Ok(());
    };

    dispatch(bot, &state, user_id, chat_id, event).await
}

pub async fn handle_callback(
    bot: Bot,
    q: CallbackQuery,
    state: Arc<AppState>,
) -> ResponseResult<()> {
    // Always answer the callback query so the button stops spinning.
    let _ = bot.answer_callback_query(q.id.clone()).await;

    let Some(chat) = q.message.as_ref().map(|m| m.chat.id) else {
        return Ok(());
    };
    let data = q.data.clone().unwrap_or_default();
    if data.is_empty() {
        return Ok(());
    }

    let user_id = UserId(q.from.id.0 as i64);
    dispatch(
        bot,
        &state,
        user_id,
        ChatId(chat.0),
        InboundEvent::Callback { data },
    )
    .await
}

/// Classify a message into the core event model: text, accepted media kinds
/// (photo, video), or an unsupported attachment. Service messages yield
/// nothing.
fn classify_message(msg: &Message) -> Option<InboundEvent> {
    if let Some(text) = msg.text() {
        return Some(InboundEvent::Text(text.to_string()));
    }

    if let Some(photos) = msg.photo() {
        let best = photos.last()?;
        return Some(InboundEvent::Media {
            attachment: AttachmentRef {
                file_id: best.file.id.clone(),
            },
            kind: MediaKind::Image,
        });
    }

    if let Some(video) = msg.video() {
        return Some(InboundEvent::Media {
            attachment: AttachmentRef {
                file_id: video.file.id.clone(),
            },
            kind: MediaKind::Video,
        });
    }

    if msg.document().is_some()
        || msg.voice().is_some()
        || msg.audio().is_some()
        || msg.sticker().is_some()
        || msg.video_note().is_some()
    {
        return Some(InboundEvent::UnsupportedAttachment);
    }

    None
}

async fn dispatch(
    bot: Bot,
    state: &AppState,
    user: UserId,
    chat: ChatId,
    event: InboundEvent,
) -> ResponseResult<()> {
    if let Err(err) = state.conversation.handle(user, chat, event).await {
        warn!("conversation handler failed: {err}");
        let _ = bot
            .send_message(
                teloxide::types::ChatId(chat.0),
                "❌ Internal error. Please try again.",
            )
            .await;
    }
    Ok(())
}
