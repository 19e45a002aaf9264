use crate::domain::{CategoryId, ProductDraft, ProductId, ProfileDraft, SortOrder};
use crate::session::{media::MediaBuffer, queue::BrowseQueue};

/// Per-user conversational state.
///
/// One workflow at a time: the mode is a sum type, so a session can never
/// hold a half-active product form next to a half-active profile form.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub mode: SessionMode,
}

impl Session {
    /// Back to defaults: no workflow, buffers dropped.
    pub fn reset(&mut self) {
        self.mode = SessionMode::Idle;
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionMode {
    #[default]
    Idle,
    Product(ProductForm),
    Profile(ProfileForm),
    Browse(BrowseState),
}

/// Which submission the product form is building toward.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductIntent {
    Create,
    Update(ProductId),
}

/// Steps of the product form; `step` records which prompt was last sent and
/// therefore which answer the next inbound event is expected to carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProductStep {
    Category,
    Name,
    PriceCurrency,
    PriceAmount,
    Description,
    Media,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductForm {
    pub intent: ProductIntent,
    pub draft: ProductDraft,
    pub media: MediaBuffer,
    pub step: Option<ProductStep>,
}

impl ProductForm {
    pub fn create() -> Self {
        Self {
            intent: ProductIntent::Create,
            draft: ProductDraft::default(),
            media: MediaBuffer::default(),
            step: None,
        }
    }

    pub fn update(target: ProductId) -> Self {
        Self {
            intent: ProductIntent::Update(target),
            draft: ProductDraft::default(),
            media: MediaBuffer::default(),
            step: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileIntent {
    Register,
    Update,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProfileStep {
    Nickname,
    Location,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileForm {
    pub intent: ProfileIntent,
    pub draft: ProfileDraft,
    pub step: Option<ProfileStep>,
}

impl ProfileForm {
    pub fn new(intent: ProfileIntent) -> Self {
        Self {
            intent,
            draft: ProfileDraft::default(),
            step: None,
        }
    }
}

/// Swipe-browsing sub-state, independent of the create/update form.
#[derive(Clone, Debug, PartialEq)]
pub enum BrowseState {
    AwaitingCategory,
    Swiping {
        queue: BrowseQueue,
        source: BrowseSource,
    },
}

/// Where the current queue came from; decides the post-exhaustion transition
/// and the per-card keyboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrowseSource {
    Category(CategoryId),
    Favorites(SortOrder),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MediaKind;

    #[test]
    fn reset_returns_every_field_to_defaults() {
        let mut session = Session::default();
        let mut form = ProductForm::create();
        form.draft.name = Some("Bike".to_string());
        form.media.append(vec![1], MediaKind::Image);
        form.step = Some(ProductStep::Media);
        session.mode = SessionMode::Product(form);

        session.reset();
        assert_eq!(session, Session::default());
        assert_eq!(session.mode, SessionMode::Idle);
    }

    #[test]
    fn update_form_starts_with_an_empty_draft() {
        let form = ProductForm::update(ProductId(9));
        assert_eq!(form.intent, ProductIntent::Update(ProductId(9)));
        assert_eq!(form.draft, crate::domain::ProductDraft::default());
        assert!(form.media.is_empty());
    }
}
