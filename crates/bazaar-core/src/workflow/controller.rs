//! The conversation controller: one inbound event in, one outbound action
//! out, session state mutated in between under the per-user lock.

use std::sync::Arc;

use tracing::warn;

use crate::{
    catalog::CatalogService,
    commands::{CallbackAction, Command, MediaControl},
    domain::{CategoryId, ChatId, MediaKind, ProductCard, SortOrder, UserId},
    errors::Error,
    formatting, keyboards,
    messaging::{
        port::OutboundGateway,
        types::{AttachmentRef, InboundEvent, Keyboard},
    },
    session::{
        BrowseQueue, BrowseSource, BrowseState, ProductForm, ProductStep, ProfileForm,
        ProfileIntent, ProfileStep, Session, SessionMode, SessionStore, MEDIA_LIMIT,
    },
    workflow::validator::{self, ProductCheck, ProfileCheck},
    Result,
};

const FAILURE_TEXT: &str = "😔 Something went wrong on our side. Please try again.";
const STALE_BUTTON_TEXT: &str = "⌛ That button is no longer active.";
const END_OF_LIST_TEXT: &str = "📭 End of list.";
const MEDIA_PROMPT: &str =
    "📷 Send up to 5 photos or videos. Reply 'done' when finished or 'resend' to start over.";

fn media_count_line(count: usize) -> String {
    format!("📎 {count}/{MEDIA_LIMIT} attached. Send more or reply 'done'.")
}

/// Drives every user conversation over the catalog and gateway ports.
pub struct Conversation {
    catalog: Arc<dyn CatalogService>,
    gateway: Arc<dyn OutboundGateway>,
    sessions: SessionStore,
    accepted_currencies: Vec<String>,
}

impl Conversation {
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        gateway: Arc<dyn OutboundGateway>,
        accepted_currencies: Vec<String>,
    ) -> Self {
        Self {
            catalog,
            gateway,
            sessions: SessionStore::default(),
            accepted_currencies,
        }
    }

    /// Handle one inbound event for one user.
    ///
    /// The session lock is held for the whole event, so duplicate deliveries
    /// for the same user serialize and no two collaborator calls for one
    /// session are ever in flight together.
    pub async fn handle(&self, user: UserId, chat: ChatId, event: InboundEvent) -> Result<()> {
        let mut session = self.sessions.lock(user).await;
        match event {
            InboundEvent::Text(text) => self.on_text(&mut session, user, chat, text.trim()).await,
            InboundEvent::Media { attachment, kind } => {
                self.on_media(&mut session, chat, &attachment, kind).await
            }
            InboundEvent::UnsupportedAttachment => self.on_unsupported(&session, chat).await,
            InboundEvent::Callback { data } => {
                self.on_callback(&mut session, user, chat, &data).await
            }
        }
    }

    // ---------- text ----------

    async fn on_text(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
        text: &str,
    ) -> Result<()> {
        if let Some(command) = Command::parse(text) {
            return self.on_command(session, user, chat, command).await;
        }

        if matches!(session.mode, SessionMode::Product(_)) {
            return self.on_product_answer(session, user, chat, text).await;
        }
        if matches!(session.mode, SessionMode::Profile(_)) {
            return self.on_profile_answer(session, user, chat, text).await;
        }
        if matches!(session.mode, SessionMode::Browse(_)) {
            return self
                .gateway
                .send_text(chat, "Use the buttons under the last message.", None)
                .await;
        }

        self.gateway
            .send_text(
                chat,
                "👋 This is the flea-market bot. Pick something from the menu below.",
                Some(keyboards::main_menu()),
            )
            .await
    }

    async fn on_command(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
        command: Command,
    ) -> Result<()> {
        match command {
            Command::Back => {
                let was_profile = matches!(session.mode, SessionMode::Profile(_));
                session.reset();
                if was_profile {
                    // Canceling a profile workflow is terminal for the entry.
                    self.sessions.remove(user).await;
                }
                self.gateway
                    .send_text(chat, "🏠 Main menu.", Some(keyboards::main_menu()))
                    .await
            }
            Command::Profile => self.show_profile(chat, user).await,
            Command::MyListings => self.show_my_listings(chat, user).await,
            Command::Favorites => {
                self.start_favorites(session, user, chat, SortOrder::NewestFirst)
                    .await
            }
            Command::Browse => self.start_browse(session, chat).await,
            Command::AddProduct => {
                session.mode = SessionMode::Product(ProductForm::create());
                self.advance_product(session, user, chat).await
            }
            Command::UpdateData => {
                session.mode = SessionMode::Profile(ProfileForm::new(ProfileIntent::Update));
                self.advance_profile(session, user, chat).await
            }
            Command::CreateAccount => {
                session.mode = SessionMode::Profile(ProfileForm::new(ProfileIntent::Register));
                self.advance_profile(session, user, chat).await
            }
        }
    }

    // ---------- menu screens ----------

    async fn show_profile(&self, chat: ChatId, user: UserId) -> Result<()> {
        match self.catalog.fetch_profile(user).await {
            Ok(Some(profile)) => {
                let text = format!(
                    "👤 {}\n📍 {}",
                    formatting::escape_html(&profile.nickname),
                    formatting::escape_html(&profile.location),
                );
                self.gateway
                    .send_text(chat, &text, Some(keyboards::profile_actions(true)))
                    .await
            }
            Ok(None) => {
                self.gateway
                    .send_text(
                        chat,
                        "You don't have an account yet.",
                        Some(keyboards::profile_actions(false)),
                    )
                    .await
            }
            Err(err) => self.fail(chat, "fetch_profile", err).await,
        }
    }

    async fn show_my_listings(&self, chat: ChatId, user: UserId) -> Result<()> {
        match self.catalog.user_products(user).await {
            Ok(products) if products.is_empty() => {
                self.gateway
                    .send_text(
                        chat,
                        "You have no listings yet.",
                        Some(keyboards::main_menu()),
                    )
                    .await
            }
            Ok(products) => {
                self.gateway
                    .send_text(
                        chat,
                        "📦 Your listings: edit or remove",
                        Some(keyboards::my_listings(&products)),
                    )
                    .await
            }
            Err(err) => self.fail(chat, "user_products", err).await,
        }
    }

    // ---------- browsing ----------

    async fn start_browse(&self, session: &mut Session, chat: ChatId) -> Result<()> {
        match self.catalog.list_categories().await {
            Ok(categories) if categories.is_empty() => {
                self.gateway
                    .send_text(chat, "No categories yet, check back later.", None)
                    .await
            }
            Ok(categories) => {
                session.mode = SessionMode::Browse(BrowseState::AwaitingCategory);
                self.gateway
                    .send_text(
                        chat,
                        "🗂 Pick a category to browse:",
                        Some(keyboards::categories(&categories)),
                    )
                    .await
            }
            Err(err) => self.fail(chat, "list_categories", err).await,
        }
    }

    async fn start_favorites(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
        order: SortOrder,
    ) -> Result<()> {
        let cards = match self.catalog.favorites(user, order).await {
            Ok(cards) => cards,
            Err(err) => return self.fail(chat, "favorites", err).await,
        };

        let mut queue = BrowseQueue::filled(cards);
        match queue.pop() {
            Some(card) => {
                session.mode = SessionMode::Browse(BrowseState::Swiping {
                    queue,
                    source: BrowseSource::Favorites(order),
                });
                let keyboard = keyboards::favorite_actions(card.id);
                self.display_card(chat, &card, keyboard).await
            }
            None => {
                session.reset();
                self.gateway
                    .send_text(chat, END_OF_LIST_TEXT, Some(keyboards::main_menu()))
                    .await
            }
        }
    }

    async fn fill_browse_queue(
        &self,
        session: &mut Session,
        chat: ChatId,
        category: CategoryId,
    ) -> Result<()> {
        let cards = match self.catalog.products_by_category(category).await {
            Ok(cards) => cards,
            Err(err) => return self.fail(chat, "products_by_category", err).await,
        };

        let mut queue = BrowseQueue::filled(cards);
        match queue.pop() {
            Some(card) => {
                session.mode = SessionMode::Browse(BrowseState::Swiping {
                    queue,
                    source: BrowseSource::Category(category),
                });
                let keyboard = keyboards::swipe_actions(card.id);
                self.display_card(chat, &card, keyboard).await
            }
            None => {
                session.mode = SessionMode::Browse(BrowseState::AwaitingCategory);
                self.reprompt_categories(chat, "📭 Nothing in this category yet. Try another:")
                    .await
            }
        }
    }

    async fn advance_swipe(&self, session: &mut Session, chat: ChatId) -> Result<()> {
        let popped = {
            let SessionMode::Browse(BrowseState::Swiping { queue, source }) = &mut session.mode
            else {
                return self.gateway.send_text(chat, STALE_BUTTON_TEXT, None).await;
            };
            (queue.pop(), *source)
        };

        match popped {
            (Some(card), source) => {
                let keyboard = match source {
                    BrowseSource::Category(_) => keyboards::swipe_actions(card.id),
                    BrowseSource::Favorites(_) => keyboards::favorite_actions(card.id),
                };
                self.display_card(chat, &card, keyboard).await
            }
            (None, BrowseSource::Category(_)) => {
                session.mode = SessionMode::Browse(BrowseState::AwaitingCategory);
                self.reprompt_categories(chat, "📭 No more items. Pick another category:")
                    .await
            }
            (None, BrowseSource::Favorites(_)) => {
                session.reset();
                self.gateway
                    .send_text(chat, END_OF_LIST_TEXT, Some(keyboards::main_menu()))
                    .await
            }
        }
    }

    async fn reprompt_categories(&self, chat: ChatId, text: &str) -> Result<()> {
        match self.catalog.list_categories().await {
            Ok(categories) => {
                self.gateway
                    .send_text(chat, text, Some(keyboards::categories(&categories)))
                    .await
            }
            Err(err) => self.fail(chat, "list_categories", err).await,
        }
    }

    /// Show one dequeued card. Media is looked up per display and failure
    /// degrades to a text-only caption.
    async fn display_card(
        &self,
        chat: ChatId,
        card: &ProductCard,
        keyboard: Keyboard,
    ) -> Result<()> {
        let caption = formatting::product_caption(card);
        match self.catalog.product_media(card.id).await {
            Ok(media) if !media.is_empty() => {
                self.gateway
                    .send_media_group(chat, &media, Some(&caption))
                    .await?;
                self.gateway
                    .send_text(chat, "Your call:", Some(keyboard))
                    .await
            }
            Ok(_) => self.gateway.send_text(chat, &caption, Some(keyboard)).await,
            Err(err) => {
                warn!("product_media lookup failed: {err}");
                self.gateway.send_text(chat, &caption, Some(keyboard)).await
            }
        }
    }

    // ---------- product form ----------

    async fn on_product_answer(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
        text: &str,
    ) -> Result<()> {
        let SessionMode::Product(form) = &mut session.mode else {
            return Ok(());
        };

        match form.step {
            None => {}
            Some(ProductStep::Category) => {
                return self
                    .gateway
                    .send_text(chat, "Pick a category with the buttons above.", None)
                    .await;
            }
            Some(ProductStep::Name) => form.draft.name = Some(text.to_string()),
            Some(ProductStep::PriceCurrency) => {
                form.draft.price_currency = Some(text.to_string())
            }
            Some(ProductStep::PriceAmount) => form.draft.price_amount = Some(text.to_string()),
            Some(ProductStep::Description) => form.draft.description = Some(text.to_string()),
            Some(ProductStep::Media) => match MediaControl::parse(text) {
                Some(MediaControl::Resend) => {
                    form.media.clear();
                    return self
                        .gateway
                        .send_text(chat, "🧹 Cleared. Send the media again.", None)
                        .await;
                }
                Some(MediaControl::Done) => {
                    if form.media.is_empty() {
                        // "done" with nothing attached re-prompts and changes
                        // nothing, however often it is replayed.
                        return self
                            .gateway
                            .send_text(chat, "Attach at least one photo or video first.", None)
                            .await;
                    }
                    form.media.mark_complete();
                }
                None => {
                    return self.gateway.send_text(chat, MEDIA_PROMPT, None).await;
                }
            },
        }

        self.advance_product(session, user, chat).await
    }

    /// Re-derive the next missing field and act on it: prompt, re-prompt with
    /// media count, abort (lost update target), or submit.
    async fn advance_product(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
    ) -> Result<()> {
        let check = {
            let SessionMode::Product(form) = &session.mode else {
                return Ok(());
            };
            validator::next_missing_step(form, &self.accepted_currencies)
        };

        match check {
            ProductCheck::Ask(ProductStep::Category) => self.prompt_category(session, chat).await,
            ProductCheck::Ask(step) => {
                if let SessionMode::Product(form) = &mut session.mode {
                    form.step = Some(step);
                }
                let prompt = self.step_prompt(step);
                self.gateway
                    .send_text(chat, &prompt, Some(keyboards::back_only()))
                    .await
            }
            ProductCheck::MoreMedia(count) => {
                if let SessionMode::Product(form) = &mut session.mode {
                    form.step = Some(ProductStep::Media);
                }
                self.gateway
                    .send_text(chat, &media_count_line(count), None)
                    .await
            }
            ProductCheck::MissingTarget => {
                session.reset();
                self.gateway
                    .send_text(
                        chat,
                        "⚠️ I lost track of which listing to edit. Open it again from your listings.",
                        Some(keyboards::main_menu()),
                    )
                    .await
            }
            ProductCheck::Complete => self.submit_product(session, user, chat).await,
        }
    }

    async fn prompt_category(&self, session: &mut Session, chat: ChatId) -> Result<()> {
        match self.catalog.list_categories().await {
            Ok(categories) if categories.is_empty() => {
                session.reset();
                self.gateway
                    .send_text(
                        chat,
                        "No categories available yet, so publishing is closed for now.",
                        Some(keyboards::main_menu()),
                    )
                    .await
            }
            Ok(categories) => {
                if let SessionMode::Product(form) = &mut session.mode {
                    form.step = Some(ProductStep::Category);
                }
                self.gateway
                    .send_text(
                        chat,
                        "🗂 Pick a category for your listing:",
                        Some(keyboards::categories(&categories)),
                    )
                    .await
            }
            Err(err) => self.fail(chat, "list_categories", err).await,
        }
    }

    fn step_prompt(&self, step: ProductStep) -> String {
        match step {
            ProductStep::Category => "Pick a category with the buttons above.".to_string(),
            ProductStep::Name => "🏷 What are you selling? Send the listing name.".to_string(),
            ProductStep::PriceCurrency => {
                format!("💱 Which currency? ({})", self.accepted_currencies.join(" "))
            }
            ProductStep::PriceAmount => {
                "💰 What's the price? Numbers only, e.g. 250 or 249.50.".to_string()
            }
            ProductStep::Description => "📝 Describe the item in a few sentences.".to_string(),
            ProductStep::Media => MEDIA_PROMPT.to_string(),
        }
    }

    async fn submit_product(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
    ) -> Result<()> {
        let form = {
            let SessionMode::Product(form) = &session.mode else {
                return Ok(());
            };
            form.clone()
        };

        let (product_id, verb) = match form.intent {
            crate::session::ProductIntent::Create => {
                match self.catalog.create_product(user, &form.draft).await {
                    Ok(id) => (id, "published"),
                    Err(err) => return self.fail(chat, "create_product", err).await,
                }
            }
            crate::session::ProductIntent::Update(id) => {
                if let Err(err) = self.catalog.update_product(id, &form.draft).await {
                    return self.fail(chat, "update_product", err).await;
                }
                // Replace stored media wholesale with the fresh buffer.
                if let Err(err) = self.catalog.delete_media(id).await {
                    return self.fail(chat, "delete_media", err).await;
                }
                (id, "updated")
            }
        };

        for (index, item) in form.media.items().iter().enumerate() {
            let filename = format!(
                "product_{}_{}.{}",
                product_id.0,
                index + 1,
                item.kind.file_extension()
            );
            if let Err(err) = self
                .catalog
                .upload_media(product_id, item.bytes.clone(), &filename, item.kind.content_type())
                .await
            {
                return self.fail(chat, "upload_media", err).await;
            }
        }

        let name = form.draft.name.unwrap_or_default();
        session.reset();
        self.gateway
            .send_text(
                chat,
                &format!("✅ «{}» {verb}.", formatting::escape_html(&name)),
                Some(keyboards::main_menu()),
            )
            .await
    }

    // ---------- profile form ----------

    async fn on_profile_answer(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
        text: &str,
    ) -> Result<()> {
        let SessionMode::Profile(form) = &mut session.mode else {
            return Ok(());
        };
        match form.step {
            Some(ProfileStep::Nickname) => form.draft.nickname = Some(text.to_string()),
            Some(ProfileStep::Location) => form.draft.location = Some(text.to_string()),
            None => {}
        }
        self.advance_profile(session, user, chat).await
    }

    async fn advance_profile(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
    ) -> Result<()> {
        let check = {
            let SessionMode::Profile(form) = &session.mode else {
                return Ok(());
            };
            validator::next_missing_profile_step(form)
        };

        match check {
            ProfileCheck::Ask(step) => {
                if let SessionMode::Profile(form) = &mut session.mode {
                    form.step = Some(step);
                }
                let prompt = match step {
                    ProfileStep::Nickname => "🙋 What should we call you? Send a nickname.",
                    ProfileStep::Location => "📍 Where are you located? Send your city.",
                };
                self.gateway
                    .send_text(chat, prompt, Some(keyboards::back_only()))
                    .await
            }
            ProfileCheck::Complete => self.submit_profile(session, user, chat).await,
        }
    }

    async fn submit_profile(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
    ) -> Result<()> {
        let (intent, draft) = {
            let SessionMode::Profile(form) = &session.mode else {
                return Ok(());
            };
            (form.intent, form.draft.clone())
        };

        let result = match intent {
            ProfileIntent::Register => self.catalog.create_profile(user, &draft).await,
            ProfileIntent::Update => self.catalog.update_profile(user, &draft).await,
        };
        if let Err(err) = result {
            return self.fail(chat, "submit_profile", err).await;
        }

        session.reset();
        // Terminal transition: the entry is dropped, not just reset.
        self.sessions.remove(user).await;

        let text = match intent {
            ProfileIntent::Register => "✅ Account created.",
            ProfileIntent::Update => "✅ Profile updated.",
        };
        self.gateway
            .send_text(chat, text, Some(keyboards::main_menu()))
            .await
    }

    // ---------- media ----------

    async fn on_media(
        &self,
        session: &mut Session,
        chat: ChatId,
        attachment: &AttachmentRef,
        kind: MediaKind,
    ) -> Result<()> {
        let in_media_step = matches!(
            &session.mode,
            SessionMode::Product(form) if form.step == Some(ProductStep::Media)
        );
        if !in_media_step {
            return self
                .gateway
                .send_text(chat, "🤔 I wasn't expecting an attachment here.", None)
                .await;
        }

        let bytes = match self.gateway.download_attachment(attachment).await {
            Ok(bytes) => bytes,
            Err(err) => return self.fail(chat, "download_attachment", err).await,
        };

        let SessionMode::Product(form) = &mut session.mode else {
            return Ok(());
        };
        form.media.append(bytes, kind);
        let count = form.media.len();
        self.gateway
            .send_text(chat, &media_count_line(count), None)
            .await
    }

    async fn on_unsupported(&self, session: &Session, chat: ChatId) -> Result<()> {
        let in_media_step = matches!(
            &session.mode,
            SessionMode::Product(form) if form.step == Some(ProductStep::Media)
        );
        let text = if in_media_step {
            "Only photos and videos can be attached. Reply 'done' or 'resend'."
        } else {
            "🤔 I can't do anything with that attachment."
        };
        self.gateway.send_text(chat, text, None).await
    }

    // ---------- callbacks ----------

    async fn on_callback(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
        data: &str,
    ) -> Result<()> {
        let Some(action) = CallbackAction::parse(data) else {
            warn!("unparseable callback payload: {data:?}");
            return self.gateway.send_text(chat, FAILURE_TEXT, None).await;
        };

        match action {
            CallbackAction::Category(id) => {
                self.on_category_selected(session, user, chat, id).await
            }
            CallbackAction::Like(id) => {
                if let Err(err) = self.catalog.add_favorite(user, id).await {
                    return self.fail(chat, "add_favorite", err).await;
                }
                self.advance_swipe(session, chat).await
            }
            CallbackAction::Dislike(_) | CallbackAction::Next => {
                self.advance_swipe(session, chat).await
            }
            CallbackAction::DropLiked(id) => {
                if let Err(err) = self.catalog.remove_favorite(user, id).await {
                    return self.fail(chat, "remove_favorite", err).await;
                }
                self.advance_swipe(session, chat).await
            }
            CallbackAction::Write(id) => match self.catalog.seller_info(id).await {
                Ok(seller) => {
                    self.gateway
                        .send_text(chat, &formatting::seller_contact_line(&seller), None)
                        .await
                }
                Err(err) => self.fail(chat, "seller_info", err).await,
            },
            CallbackAction::Update(id) => {
                session.mode = SessionMode::Product(ProductForm::update(id));
                self.advance_product(session, user, chat).await
            }
            CallbackAction::Delete(id) => {
                if let Err(err) = self.catalog.delete_product(id).await {
                    return self.fail(chat, "delete_product", err).await;
                }
                self.gateway.send_text(chat, "🗑 Listing deleted.", None).await
            }
            CallbackAction::FirstOld => {
                self.start_favorites(session, user, chat, SortOrder::OldestFirst)
                    .await
            }
            CallbackAction::FirstNew => {
                self.start_favorites(session, user, chat, SortOrder::NewestFirst)
                    .await
            }
        }
    }

    async fn on_category_selected(
        &self,
        session: &mut Session,
        user: UserId,
        chat: ChatId,
        category: CategoryId,
    ) -> Result<()> {
        let picking_for_form = matches!(
            &session.mode,
            SessionMode::Product(form) if form.step == Some(ProductStep::Category)
        );
        if picking_for_form {
            if let SessionMode::Product(form) = &mut session.mode {
                form.draft.category = Some(category);
            }
            return self.advance_product(session, user, chat).await;
        }

        if matches!(session.mode, SessionMode::Browse(_)) {
            return self.fill_browse_queue(session, chat, category).await;
        }

        self.gateway.send_text(chat, STALE_BUTTON_TEXT, None).await
    }

    // ---------- failures ----------

    /// Collaborator failure: tell the user once, keep the session where it
    /// is so the same input can be retried.
    async fn fail(&self, chat: ChatId, context: &str, err: Error) -> Result<()> {
        warn!("{context} failed: {err}");
        self.gateway.send_text(chat, FAILURE_TEXT, None).await
    }
}
