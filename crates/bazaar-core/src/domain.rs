use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Telegram user id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Telegram chat id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Catalog product id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProductId(pub i64);

/// Catalog category id (numeric).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CategoryId(pub i64);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// Immutable snapshot of a candidate product, shown one at a time while
/// browsing. Media is looked up separately at display time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub name: String,
    pub price_amount: f64,
    pub price_currency: String,
    pub location: Option<String>,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SellerInfo {
    pub id: UserId,
    pub username: Option<String>,
}

/// Stored user profile (the submitted form, not the draft).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub nickname: String,
    pub location: String,
}

/// Sort order for the favorites replay.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    NewestFirst,
    OldestFirst,
}

/// Kind of an inbound or stored media object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn content_type(self) -> &'static str {
        match self {
            MediaKind::Image => "image/jpeg",
            MediaKind::Video => "video/mp4",
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            MediaKind::Image => "jpg",
            MediaKind::Video => "mp4",
        }
    }
}

/// Reference to a stored media object in blob storage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MediaRef {
    pub url: String,
    pub kind: MediaKind,
}

/// Partially filled product listing. Owned by exactly one session; discarded
/// on reset, submitted to the catalog on completion.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProductDraft {
    pub category: Option<CategoryId>,
    pub name: Option<String>,
    pub price_currency: Option<String>,
    /// Raw user input; validated and parsed by the form validator.
    pub price_amount: Option<String>,
    pub description: Option<String>,
}

/// Partially filled user profile.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ProfileDraft {
    pub nickname: Option<String>,
    pub location: Option<String>,
}
