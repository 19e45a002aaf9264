use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};
use tokio::sync::Mutex;
use tracing::info;

use bazaar_core::{
    catalog::CatalogService, config::Config, messaging::port::OutboundGateway,
    ratelimit::RateLimiter, workflow::Conversation,
};

use crate::{handlers, TelegramGateway};

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub conversation: Arc<Conversation>,
    pub rate_limiter: Arc<Mutex<RateLimiter>>,
}

pub async fn run_polling(cfg: Arc<Config>, catalog: Arc<dyn CatalogService>) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    if let Ok(me) = bot.get_me().await {
        info!("bazaar bot started: @{}", me.username());
    }

    let gateway: Arc<dyn OutboundGateway> =
        Arc::new(TelegramGateway::new(bot.clone(), cfg.temp_dir.clone()));
    let conversation = Arc::new(Conversation::new(
        catalog,
        gateway,
        cfg.accepted_currencies.clone(),
    ));

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        conversation,
        rate_limiter: Arc::new(Mutex::new(RateLimiter::new(
            cfg.rate_limit_enabled,
            cfg.rate_limit_requests,
            cfg.rate_limit_window,
        ))),
    });

    let handler = dptree::entry()
        .branch(Update::filter_callback_query().endpoint(handlers::handle_callback))
        .branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
