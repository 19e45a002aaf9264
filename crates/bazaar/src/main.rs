use std::sync::Arc;

use bazaar_catalog::CatalogClient;
use bazaar_core::{catalog::CatalogService, config::Config};

#[tokio::main]
async fn main() -> Result<(), bazaar_core::Error> {
    bazaar_core::logging::init("bazaar");

    let cfg = Arc::new(Config::load()?);

    let catalog: Arc<dyn CatalogService> = Arc::new(CatalogClient::new(
        cfg.catalog_base_url.clone(),
        cfg.catalog_timeout,
    ));

    bazaar_telegram::router::run_polling(cfg, catalog)
        .await
        .map_err(|e| bazaar_core::Error::Gateway(format!("telegram bot failed: {e}")))?;

    Ok(())
}
