use crate::domain::MediaKind;

/// Cross-transport inbound event model.
///
/// Telegram-specific fields stay in the Telegram adapter; the session engine
/// only ever sees one of these per delivered update.
#[derive(Clone, Debug)]
pub enum InboundEvent {
    Text(String),
    Media {
        attachment: AttachmentRef,
        kind: MediaKind,
    },
    /// An attachment of a kind the bot does not accept (document, voice, ...).
    UnsupportedAttachment,
    Callback {
        data: String,
    },
}

/// Opaque handle to an inbound attachment, resolvable through the gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttachmentRef {
    pub file_id: String,
}

/// Outbound keyboard attached to a text message.
#[derive(Clone, Debug, PartialEq)]
pub enum Keyboard {
    Inline(InlineKeyboard),
    Reply(ReplyKeyboard),
}

/// Inline keyboard (callback buttons).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct InlineKeyboard {
    pub rows: Vec<Vec<InlineButton>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct InlineButton {
    pub label: String,
    pub callback_data: String,
}

impl InlineButton {
    pub fn new(label: impl Into<String>, callback_data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            callback_data: callback_data.into(),
        }
    }
}

impl InlineKeyboard {
    pub fn new(rows: Vec<Vec<InlineButton>>) -> Self {
        Self { rows }
    }

    /// Convenience for "one button per row" layouts.
    pub fn one_per_row(buttons: Vec<InlineButton>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }
}

/// Reply keyboard carrying plain text command labels.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ReplyKeyboard {
    pub rows: Vec<Vec<String>>,
}

impl ReplyKeyboard {
    pub fn new(rows: Vec<Vec<&str>>) -> Self {
        Self {
            rows: rows
                .into_iter()
                .map(|row| row.into_iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }
}
