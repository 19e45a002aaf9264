//! Keyboard builders for the conversational flows.

use crate::{
    commands::{labels, CallbackAction},
    domain::{Category, ProductCard, ProductId},
    formatting::{product_summary, truncate_label},
    messaging::types::{InlineButton, InlineKeyboard, Keyboard, ReplyKeyboard},
};

const BUTTON_LABEL_MAX: usize = 28;

/// Persistent main menu shown when no workflow is active.
pub fn main_menu() -> Keyboard {
    Keyboard::Reply(ReplyKeyboard::new(vec![
        vec![labels::BROWSE, labels::FAVORITES],
        vec![labels::ADD_PRODUCT, labels::MY_LISTINGS],
        vec![labels::PROFILE],
    ]))
}

/// Keyboard offered while any multi-step form is active.
pub fn back_only() -> Keyboard {
    Keyboard::Reply(ReplyKeyboard::new(vec![vec![labels::BACK]]))
}

pub fn profile_actions(has_account: bool) -> Keyboard {
    let action = if has_account {
        labels::UPDATE_DATA
    } else {
        labels::CREATE_ACCOUNT
    };
    Keyboard::Reply(ReplyKeyboard::new(vec![vec![action], vec![labels::BACK]]))
}

/// One category per row.
pub fn categories(categories: &[Category]) -> Keyboard {
    let buttons = categories
        .iter()
        .map(|c| {
            InlineButton::new(
                truncate_label(&c.name, BUTTON_LABEL_MAX),
                CallbackAction::Category(c.id).encode(),
            )
        })
        .collect();
    Keyboard::Inline(InlineKeyboard::one_per_row(buttons))
}

/// Swipe actions for a card dequeued from a category browse.
pub fn swipe_actions(product: ProductId) -> Keyboard {
    Keyboard::Inline(InlineKeyboard::new(vec![
        vec![
            InlineButton::new("❤️", CallbackAction::Like(product).encode()),
            InlineButton::new("👎", CallbackAction::Dislike(product).encode()),
        ],
        vec![InlineButton::new(
            "✉️ Seller",
            CallbackAction::Write(product).encode(),
        )],
    ]))
}

/// Actions for a card replayed from the favorites list.
pub fn favorite_actions(product: ProductId) -> Keyboard {
    Keyboard::Inline(InlineKeyboard::new(vec![
        vec![
            InlineButton::new("🗑 Remove", CallbackAction::DropLiked(product).encode()),
            InlineButton::new("➡️ Next", CallbackAction::Next.encode()),
        ],
        vec![InlineButton::new(
            "✉️ Seller",
            CallbackAction::Write(product).encode(),
        )],
        sort_toggle_row(),
    ]))
}

fn sort_toggle_row() -> Vec<InlineButton> {
    vec![
        InlineButton::new("🆕 First new", CallbackAction::FirstNew.encode()),
        InlineButton::new("🗓 First old", CallbackAction::FirstOld.encode()),
    ]
}

/// Edit/delete button pair per listing, summary as the row label.
pub fn my_listings(products: &[ProductCard]) -> Keyboard {
    let rows = products
        .iter()
        .map(|p| {
            let label = truncate_label(&product_summary(p), BUTTON_LABEL_MAX);
            vec![
                InlineButton::new(
                    format!("✏️ {label}"),
                    CallbackAction::Update(p.id).encode(),
                ),
                InlineButton::new("🗑", CallbackAction::Delete(p.id).encode()),
            ]
        })
        .collect();
    Keyboard::Inline(InlineKeyboard::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CategoryId;

    #[test]
    fn category_rows_carry_callback_ids() {
        let keyboard = categories(&[
            Category {
                id: CategoryId(3),
                name: "Bikes".to_string(),
            },
            Category {
                id: CategoryId(5),
                name: "Electronics".to_string(),
            },
        ]);
        let Keyboard::Inline(inline) = keyboard else {
            panic!("expected inline keyboard");
        };
        assert_eq!(inline.rows.len(), 2);
        assert_eq!(inline.rows[0][0].callback_data, "category_3");
        assert_eq!(inline.rows[1][0].callback_data, "category_5");
    }

    #[test]
    fn swipe_keyboard_targets_the_shown_product() {
        let Keyboard::Inline(inline) = swipe_actions(ProductId(17)) else {
            panic!("expected inline keyboard");
        };
        assert_eq!(inline.rows[0][0].callback_data, "like_17");
        assert_eq!(inline.rows[0][1].callback_data, "dislike_17");
        assert_eq!(inline.rows[1][0].callback_data, "write_17");
    }
}
