//! Inbound command vocabulary.
//!
//! The exact tokens are configuration, not control flow: keyboards are built
//! from the same labels the parser accepts, and callback data round-trips
//! through `CallbackAction`.

use crate::domain::{CategoryId, ProductId};

/// Button labels used on reply keyboards. The parser also accepts the bare
/// lowercase words so typed commands keep working.
pub mod labels {
    pub const PROFILE: &str = "👤 Profile";
    pub const MY_LISTINGS: &str = "📦 My listings";
    pub const FAVORITES: &str = "❤️ Favorites";
    pub const BROWSE: &str = "🔍 Browse";

    pub const ADD_PRODUCT: &str = "➕ Add product";
    pub const UPDATE_DATA: &str = "✏️ Update data";
    pub const CREATE_ACCOUNT: &str = "🆕 Create account";
    pub const BACK: &str = "⬅️ Back";
}

/// Top-level menu and workflow commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Profile,
    MyListings,
    Favorites,
    Browse,
    AddProduct,
    UpdateData,
    CreateAccount,
    Back,
}

impl Command {
    pub fn parse(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let lower = trimmed.to_lowercase();
        match trimmed {
            labels::PROFILE => return Some(Command::Profile),
            labels::MY_LISTINGS => return Some(Command::MyListings),
            labels::FAVORITES => return Some(Command::Favorites),
            labels::BROWSE => return Some(Command::Browse),
            labels::ADD_PRODUCT => return Some(Command::AddProduct),
            labels::UPDATE_DATA => return Some(Command::UpdateData),
            labels::CREATE_ACCOUNT => return Some(Command::CreateAccount),
            labels::BACK => return Some(Command::Back),
            _ => {}
        }
        match lower.as_str() {
            "profile" | "/profile" => Some(Command::Profile),
            "my listings" | "/mylistings" => Some(Command::MyListings),
            "favorites" | "/favorites" => Some(Command::Favorites),
            "browse" | "/browse" => Some(Command::Browse),
            "add product" | "/add" => Some(Command::AddProduct),
            "update data" => Some(Command::UpdateData),
            "create account" => Some(Command::CreateAccount),
            "back" | "cancel" | "/cancel" => Some(Command::Back),
            _ => None,
        }
    }
}

/// Control words consumed only inside the media step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaControl {
    Resend,
    Done,
}

impl MediaControl {
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim().to_lowercase().as_str() {
            "resend" => Some(MediaControl::Resend),
            "done" => Some(MediaControl::Done),
            _ => None,
        }
    }
}

/// Parsed callback-query payloads.
///
/// Wire format is `<prefix>` or `<prefix>_<numeric id>`; `encode` and `parse`
/// are inverses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackAction {
    Category(CategoryId),
    Like(ProductId),
    Dislike(ProductId),
    DropLiked(ProductId),
    Next,
    Write(ProductId),
    Update(ProductId),
    Delete(ProductId),
    FirstOld,
    FirstNew,
}

impl CallbackAction {
    pub fn encode(&self) -> String {
        match self {
            CallbackAction::Category(id) => format!("category_{}", id.0),
            CallbackAction::Like(id) => format!("like_{}", id.0),
            CallbackAction::Dislike(id) => format!("dislike_{}", id.0),
            CallbackAction::DropLiked(id) => format!("delliked_{}", id.0),
            CallbackAction::Next => "next".to_string(),
            CallbackAction::Write(id) => format!("write_{}", id.0),
            CallbackAction::Update(id) => format!("update_{}", id.0),
            CallbackAction::Delete(id) => format!("delete_{}", id.0),
            CallbackAction::FirstOld => "first_old".to_string(),
            CallbackAction::FirstNew => "first_new".to_string(),
        }
    }

    pub fn parse(data: &str) -> Option<Self> {
        match data {
            "next" => return Some(CallbackAction::Next),
            "first_old" => return Some(CallbackAction::FirstOld),
            "first_new" => return Some(CallbackAction::FirstNew),
            _ => {}
        }

        let (prefix, raw_id) = data.rsplit_once('_')?;
        let id = raw_id.parse::<i64>().ok()?;
        match prefix {
            "category" => Some(CallbackAction::Category(CategoryId(id))),
            "like" => Some(CallbackAction::Like(ProductId(id))),
            "dislike" => Some(CallbackAction::Dislike(ProductId(id))),
            "delliked" => Some(CallbackAction::DropLiked(ProductId(id))),
            "write" => Some(CallbackAction::Write(ProductId(id))),
            "update" => Some(CallbackAction::Update(ProductId(id))),
            "delete" => Some(CallbackAction::Delete(ProductId(id))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_labels_and_bare_words() {
        assert_eq!(Command::parse(labels::ADD_PRODUCT), Some(Command::AddProduct));
        assert_eq!(Command::parse("add product"), Some(Command::AddProduct));
        assert_eq!(Command::parse("  Back  "), Some(Command::Back));
        assert_eq!(Command::parse("cancel"), Some(Command::Back));
        assert_eq!(Command::parse("Bike for sale"), None);
    }

    #[test]
    fn media_control_words() {
        assert_eq!(MediaControl::parse("done"), Some(MediaControl::Done));
        assert_eq!(MediaControl::parse(" RESEND "), Some(MediaControl::Resend));
        assert_eq!(MediaControl::parse("ready"), None);
    }

    #[test]
    fn callback_round_trip() {
        let actions = [
            CallbackAction::Category(CategoryId(3)),
            CallbackAction::Like(ProductId(17)),
            CallbackAction::Dislike(ProductId(17)),
            CallbackAction::DropLiked(ProductId(9)),
            CallbackAction::Next,
            CallbackAction::Write(ProductId(4)),
            CallbackAction::Update(ProductId(4)),
            CallbackAction::Delete(ProductId(4)),
            CallbackAction::FirstOld,
            CallbackAction::FirstNew,
        ];
        for action in actions {
            assert_eq!(CallbackAction::parse(&action.encode()), Some(action));
        }
    }

    #[test]
    fn callback_rejects_garbage() {
        assert_eq!(CallbackAction::parse(""), None);
        assert_eq!(CallbackAction::parse("like_"), None);
        assert_eq!(CallbackAction::parse("like_abc"), None);
        assert_eq!(CallbackAction::parse("unknown_5"), None);
    }
}
