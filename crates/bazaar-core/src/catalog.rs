use async_trait::async_trait;

use crate::{
    domain::{
        Category, CategoryId, MediaRef, ProductCard, ProductDraft, ProductId, Profile,
        ProfileDraft, SellerInfo, SortOrder, UserId,
    },
    Result,
};

/// Narrow request/response contract to the persistent catalog service.
///
/// The REST implementation lives in `bazaar-catalog`; the session engine only
/// ever sees this trait, and tests substitute in-memory fakes.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn create_product(&self, owner: UserId, draft: &ProductDraft) -> Result<ProductId>;
    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<()>;
    async fn delete_product(&self, id: ProductId) -> Result<()>;

    async fn list_categories(&self) -> Result<Vec<Category>>;
    async fn products_by_category(&self, category: CategoryId) -> Result<Vec<ProductCard>>;
    async fn user_products(&self, user: UserId) -> Result<Vec<ProductCard>>;

    async fn product_media(&self, id: ProductId) -> Result<Vec<MediaRef>>;
    async fn upload_media(
        &self,
        id: ProductId,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<()>;
    async fn delete_media(&self, id: ProductId) -> Result<()>;

    async fn add_favorite(&self, user: UserId, product: ProductId) -> Result<()>;
    async fn remove_favorite(&self, user: UserId, product: ProductId) -> Result<()>;
    async fn favorites(&self, user: UserId, order: SortOrder) -> Result<Vec<ProductCard>>;

    async fn seller_info(&self, id: ProductId) -> Result<SellerInfo>;

    async fn fetch_profile(&self, user: UserId) -> Result<Option<Profile>>;
    async fn create_profile(&self, user: UserId, draft: &ProfileDraft) -> Result<()>;
    async fn update_profile(&self, user: UserId, draft: &ProfileDraft) -> Result<()>;
}
