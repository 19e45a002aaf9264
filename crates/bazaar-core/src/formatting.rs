//! Formatting utilities (Telegram HTML captions, prices).

use crate::domain::{ProductCard, SellerInfo};

/// Escape HTML special characters for Telegram HTML parse mode.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render a price without a trailing `.00` for whole amounts.
pub fn format_price(amount: f64, currency: &str) -> String {
    if amount.fract() == 0.0 {
        format!("{} {currency}", amount as i64)
    } else {
        format!("{amount:.2} {currency}")
    }
}

/// Caption for a browsed product card.
pub fn product_caption(card: &ProductCard) -> String {
    let mut out = format!(
        "<b>{}</b>\n{}",
        escape_html(&card.name),
        format_price(card.price_amount, &escape_html(&card.price_currency)),
    );
    if let Some(location) = card.location.as_deref().filter(|l| !l.trim().is_empty()) {
        out.push_str(&format!("\n📍 {}", escape_html(location)));
    }
    out.push_str(&format!("\n\n{}", escape_html(&card.description)));
    out
}

/// One-line summary used for listing rows and button labels.
pub fn product_summary(card: &ProductCard) -> String {
    format!(
        "{} · {}",
        card.name,
        format_price(card.price_amount, &card.price_currency)
    )
}

pub fn seller_contact_line(seller: &SellerInfo) -> String {
    match seller.username.as_deref().filter(|u| !u.is_empty()) {
        Some(username) => format!("✉️ Contact the seller: @{}", escape_html(username)),
        None => format!("✉️ Seller id: {}", seller.id.0),
    }
}

/// Truncate a button label, keeping it readable.
pub fn truncate_label(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_len.saturating_sub(3)).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ProductId, UserId};
    use chrono::Utc;

    fn card(name: &str, amount: f64) -> ProductCard {
        ProductCard {
            id: ProductId(1),
            name: name.to_string(),
            price_amount: amount,
            price_currency: "€".to_string(),
            location: Some("Berlin".to_string()),
            description: "desc".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn escapes_html_in_captions() {
        let caption = product_caption(&card("<b>Bike & Co", 250.0));
        assert!(caption.contains("&lt;b&gt;Bike &amp; Co"));
        assert!(!caption.contains("<b>Bike"));
    }

    #[test]
    fn whole_prices_drop_decimals() {
        assert_eq!(format_price(250.0, "€"), "250 €");
        assert_eq!(format_price(249.5, "€"), "249.50 €");
    }

    #[test]
    fn labels_are_truncated_with_ellipsis() {
        assert_eq!(truncate_label("short", 20), "short");
        let long = truncate_label("a very long product name", 10);
        assert_eq!(long, "a very ...");
    }

    #[test]
    fn seller_contact_prefers_username() {
        let with_name = SellerInfo {
            id: UserId(7),
            username: Some("alice".to_string()),
        };
        assert!(seller_contact_line(&with_name).contains("@alice"));

        let without = SellerInfo {
            id: UserId(7),
            username: None,
        };
        assert!(seller_contact_line(&without).contains('7'));
    }
}
