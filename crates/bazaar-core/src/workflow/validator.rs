//! Pure form validation: given a partially filled draft, derive the next
//! missing field. No I/O; the controller turns the outcome into a prompt.

use std::sync::OnceLock;

use regex::Regex;

use crate::session::state::{
    ProductForm, ProductIntent, ProductStep, ProfileForm, ProfileStep,
};

/// Outcome of a product-form check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductCheck {
    /// A field is missing or invalid; re-enter this step.
    Ask(ProductStep),
    /// At least one attachment buffered, buffer still open: re-prompt with
    /// the running count instead of submitting.
    MoreMedia(usize),
    /// Update requested without a usable target id; the workflow fails.
    MissingTarget,
    Complete,
}

/// Derive the next missing product field.
///
/// The checks short-circuit in a fixed priority order: category (creation
/// only), target id (update only), name, price currency, price amount,
/// description, media. Whatever was filled out of order, the first gap in
/// this order wins.
pub fn next_missing_step(form: &ProductForm, accepted_currencies: &[String]) -> ProductCheck {
    match form.intent {
        ProductIntent::Create => {
            if form.draft.category.is_none() {
                return ProductCheck::Ask(ProductStep::Category);
            }
        }
        ProductIntent::Update(target) => {
            if target.0 == 0 {
                return ProductCheck::MissingTarget;
            }
        }
    }

    if is_blank(form.draft.name.as_deref()) {
        return ProductCheck::Ask(ProductStep::Name);
    }

    let currency_ok = form
        .draft
        .price_currency
        .as_deref()
        .map(str::trim)
        .is_some_and(|c| accepted_currencies.iter().any(|a| a == c));
    if !currency_ok {
        return ProductCheck::Ask(ProductStep::PriceCurrency);
    }

    let amount_ok = form
        .draft
        .price_amount
        .as_deref()
        .and_then(parse_price)
        .is_some();
    if !amount_ok {
        return ProductCheck::Ask(ProductStep::PriceAmount);
    }

    if is_blank(form.draft.description.as_deref()) {
        return ProductCheck::Ask(ProductStep::Description);
    }

    if form.media.is_empty() {
        return ProductCheck::Ask(ProductStep::Media);
    }
    if form.media.accepting_more() {
        return ProductCheck::MoreMedia(form.media.len());
    }

    ProductCheck::Complete
}

/// Outcome of a profile-form check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileCheck {
    Ask(ProfileStep),
    Complete,
}

/// Next missing profile field, re-derived from the draft on every answer.
pub fn next_missing_profile_step(form: &ProfileForm) -> ProfileCheck {
    if is_blank(form.draft.nickname.as_deref()) {
        return ProfileCheck::Ask(ProfileStep::Nickname);
    }
    if is_blank(form.draft.location.as_deref()) {
        return ProfileCheck::Ask(ProfileStep::Location);
    }
    ProfileCheck::Complete
}

/// Parse a user-entered price: decimal with a dot or comma separator,
/// strictly greater than zero.
pub fn parse_price(raw: &str) -> Option<f64> {
    static PRICE_RE: OnceLock<Regex> = OnceLock::new();
    let re = PRICE_RE.get_or_init(|| {
        Regex::new(r"^\d{1,9}([.,]\d{1,2})?$").expect("valid price regex")
    });

    let trimmed = raw.trim();
    if !re.is_match(trimmed) {
        return None;
    }
    let amount = trimmed.replace(',', ".").parse::<f64>().ok()?;
    (amount > 0.0).then_some(amount)
}

fn is_blank(value: Option<&str>) -> bool {
    value.map(str::trim).map_or(true, str::is_empty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CategoryId, MediaKind, ProductId};
    use crate::session::state::{ProfileForm, ProfileIntent};

    fn currencies() -> Vec<String> {
        ["₽", "$", "€"].iter().map(|s| s.to_string()).collect()
    }

    fn filled_create_form() -> ProductForm {
        let mut form = ProductForm::create();
        form.draft.category = Some(CategoryId(3));
        form.draft.name = Some("Bike".to_string());
        form.draft.price_currency = Some("€".to_string());
        form.draft.price_amount = Some("250".to_string());
        form.draft.description = Some("Fast bike".to_string());
        form.media.append(vec![1], MediaKind::Image);
        form.media.mark_complete();
        form
    }

    #[test]
    fn complete_form_passes() {
        assert_eq!(
            next_missing_step(&filled_create_form(), &currencies()),
            ProductCheck::Complete
        );
    }

    #[test]
    fn first_gap_in_priority_order_wins_regardless_of_fill_order() {
        // Clear one field at a time, front to back; the cleared field must be
        // the one asked for even though everything after it is filled.
        let clears: Vec<(fn(&mut ProductForm), ProductCheck)> = vec![
            (
                |f| f.draft.category = None,
                ProductCheck::Ask(ProductStep::Category),
            ),
            (
                |f| f.draft.name = None,
                ProductCheck::Ask(ProductStep::Name),
            ),
            (
                |f| f.draft.price_currency = None,
                ProductCheck::Ask(ProductStep::PriceCurrency),
            ),
            (
                |f| f.draft.price_amount = None,
                ProductCheck::Ask(ProductStep::PriceAmount),
            ),
            (
                |f| f.draft.description = None,
                ProductCheck::Ask(ProductStep::Description),
            ),
            (
                |f| f.media.clear(),
                ProductCheck::Ask(ProductStep::Media),
            ),
        ];

        for (clear, expected) in clears {
            let mut form = filled_create_form();
            clear(&mut form);
            assert_eq!(next_missing_step(&form, &currencies()), expected);
        }
    }

    #[test]
    fn earlier_gaps_shadow_later_ones() {
        let mut form = filled_create_form();
        form.draft.name = None;
        form.draft.description = None;
        assert_eq!(
            next_missing_step(&form, &currencies()),
            ProductCheck::Ask(ProductStep::Name)
        );
    }

    #[test]
    fn invalid_currency_re_enters_the_currency_step() {
        let mut form = filled_create_form();
        form.draft.price_currency = Some("£".to_string());
        assert_eq!(
            next_missing_step(&form, &currencies()),
            ProductCheck::Ask(ProductStep::PriceCurrency)
        );
    }

    #[test]
    fn unparseable_or_zero_amount_re_enters_the_amount_step() {
        for bad in ["abc", "0", "-5", "1.2.3", ""] {
            let mut form = filled_create_form();
            form.draft.price_amount = Some(bad.to_string());
            assert_eq!(
                next_missing_step(&form, &currencies()),
                ProductCheck::Ask(ProductStep::PriceAmount),
                "amount {bad:?} should not pass"
            );
        }
    }

    #[test]
    fn update_requires_a_target_before_anything_else() {
        let mut form = ProductForm::update(ProductId(0));
        form.draft.name = Some("Bike".to_string());
        assert_eq!(
            next_missing_step(&form, &currencies()),
            ProductCheck::MissingTarget
        );
    }

    #[test]
    fn update_skips_the_category_check() {
        let mut form = filled_create_form();
        form.intent = ProductIntent::Update(ProductId(7));
        form.draft.category = None;
        assert_eq!(
            next_missing_step(&form, &currencies()),
            ProductCheck::Complete
        );
    }

    #[test]
    fn open_buffer_with_items_asks_for_more_with_count() {
        let mut form = filled_create_form();
        form.media.clear();
        form.media.append(vec![1], MediaKind::Image);
        form.media.append(vec![2], MediaKind::Video);
        assert_eq!(
            next_missing_step(&form, &currencies()),
            ProductCheck::MoreMedia(2)
        );
    }

    #[test]
    fn price_parsing_accepts_dot_and_comma() {
        assert_eq!(parse_price("250"), Some(250.0));
        assert_eq!(parse_price("249,50"), Some(249.5));
        assert_eq!(parse_price(" 12.99 "), Some(12.99));
        assert_eq!(parse_price("0"), None);
        assert_eq!(parse_price("0.00"), None);
        assert_eq!(parse_price("12€"), None);
        assert_eq!(parse_price("1 000"), None);
    }

    #[test]
    fn profile_fields_re_derive_in_order() {
        let mut form = ProfileForm::new(ProfileIntent::Register);
        assert_eq!(
            next_missing_profile_step(&form),
            ProfileCheck::Ask(ProfileStep::Nickname)
        );

        // Location filled first: nickname still comes back first.
        form.draft.location = Some("Berlin".to_string());
        assert_eq!(
            next_missing_profile_step(&form),
            ProfileCheck::Ask(ProfileStep::Nickname)
        );

        form.draft.nickname = Some("alice".to_string());
        assert_eq!(next_missing_profile_step(&form), ProfileCheck::Complete);
    }
}
