//! REST adapter for the catalog service.
//!
//! Implements the `bazaar-core` CatalogService port over plain JSON
//! endpoints, plus multipart for media upload.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use bazaar_core::{
    catalog::CatalogService,
    domain::{
        Category, CategoryId, MediaRef, ProductCard, ProductDraft, ProductId, Profile,
        ProfileDraft, SellerInfo, SortOrder, UserId,
    },
    errors::Error,
    workflow::validator::parse_price,
    Result,
};

#[derive(Clone, Debug)]
pub struct CatalogClient {
    base_url: String,
    http: reqwest::Client,
}

impl CatalogClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build");
        Self {
            base_url: base_url.into(),
            http,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T> {
        let resp = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(request_error)?;
        let resp = check_status(resp, path).await?;
        resp.json::<T>().await.map_err(|e| {
            Error::Catalog(format!("catalog response decode error at {path}: {e}"))
        })
    }

    async fn send_ok(&self, req: reqwest::RequestBuilder, path: &str) -> Result<()> {
        let resp = req.send().await.map_err(request_error)?;
        check_status(resp, path).await?;
        Ok(())
    }
}

fn request_error(e: reqwest::Error) -> Error {
    Error::Catalog(format!("catalog request error: {e}"))
}

async fn check_status(resp: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Catalog(format!(
        "catalog call {context} failed: {status} {}",
        body.chars().take(200).collect::<String>()
    )))
}

fn order_param(order: SortOrder) -> &'static str {
    match order {
        SortOrder::NewestFirst => "new",
        SortOrder::OldestFirst => "old",
    }
}

/// Wire shape of a product submission; the amount goes out parsed.
#[derive(Debug, Serialize)]
struct ProductBody<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    price_currency: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category_id: Option<i64>,
}

impl<'a> ProductBody<'a> {
    fn from_draft(draft: &'a ProductDraft) -> Self {
        Self {
            name: draft.name.as_deref(),
            price_amount: draft.price_amount.as_deref().and_then(parse_price),
            price_currency: draft.price_currency.as_deref(),
            description: draft.description.as_deref(),
            category_id: draft.category.map(|c| c.0),
        }
    }
}

#[derive(Debug, Serialize)]
struct CreateProductBody<'a> {
    owner_id: i64,
    #[serde(flatten)]
    product: ProductBody<'a>,
}

#[derive(Debug, Deserialize)]
struct CreatedProduct {
    id: i64,
}

#[async_trait]
impl CatalogService for CatalogClient {
    async fn create_product(&self, owner: UserId, draft: &ProductDraft) -> Result<ProductId> {
        let path = "/products".to_string();
        let body = CreateProductBody {
            owner_id: owner.0,
            product: ProductBody::from_draft(draft),
        };
        let resp = self
            .http
            .post(self.url(&path))
            .json(&body)
            .send()
            .await
            .map_err(request_error)?;
        let resp = check_status(resp, &path).await?;
        let created: CreatedProduct = resp.json().await.map_err(|e| {
            Error::Catalog(format!("catalog response decode error at {path}: {e}"))
        })?;
        Ok(ProductId(created.id))
    }

    async fn update_product(&self, id: ProductId, draft: &ProductDraft) -> Result<()> {
        let path = format!("/products/{}", id.0);
        let req = self
            .http
            .put(self.url(&path))
            .json(&ProductBody::from_draft(draft));
        self.send_ok(req, &path).await
    }

    async fn delete_product(&self, id: ProductId) -> Result<()> {
        let path = format!("/products/{}", id.0);
        let req = self.http.delete(self.url(&path));
        self.send_ok(req, &path).await
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        self.get_json("/categories").await
    }

    async fn products_by_category(&self, category: CategoryId) -> Result<Vec<ProductCard>> {
        self.get_json(&format!("/categories/{}/products", category.0))
            .await
    }

    async fn user_products(&self, user: UserId) -> Result<Vec<ProductCard>> {
        self.get_json(&format!("/users/{}/products", user.0)).await
    }

    async fn product_media(&self, id: ProductId) -> Result<Vec<MediaRef>> {
        self.get_json(&format!("/products/{}/media", id.0)).await
    }

    async fn upload_media(
        &self,
        id: ProductId,
        bytes: Vec<u8>,
        filename: &str,
        content_type: &str,
    ) -> Result<()> {
        let path = format!("/products/{}/media", id.0);
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| Error::Catalog(format!("catalog multipart error: {e}")))?;
        let form = reqwest::multipart::Form::new().part("file", part);
        let req = self.http.post(self.url(&path)).multipart(form);
        self.send_ok(req, &path).await
    }

    async fn delete_media(&self, id: ProductId) -> Result<()> {
        let path = format!("/products/{}/media", id.0);
        let req = self.http.delete(self.url(&path));
        self.send_ok(req, &path).await
    }

    async fn add_favorite(&self, user: UserId, product: ProductId) -> Result<()> {
        let path = format!("/users/{}/favorites/{}", user.0, product.0);
        let req = self.http.post(self.url(&path));
        self.send_ok(req, &path).await
    }

    async fn remove_favorite(&self, user: UserId, product: ProductId) -> Result<()> {
        let path = format!("/users/{}/favorites/{}", user.0, product.0);
        let req = self.http.delete(self.url(&path));
        self.send_ok(req, &path).await
    }

    async fn favorites(&self, user: UserId, order: SortOrder) -> Result<Vec<ProductCard>> {
        self.get_json(&format!(
            "/users/{}/favorites?order={}",
            user.0,
            order_param(order)
        ))
        .await
    }

    async fn seller_info(&self, id: ProductId) -> Result<SellerInfo> {
        self.get_json(&format!("/products/{}/seller", id.0)).await
    }

    async fn fetch_profile(&self, user: UserId) -> Result<Option<Profile>> {
        let path = format!("/users/{}/profile", user.0);
        let resp = self
            .http
            .get(self.url(&path))
            .send()
            .await
            .map_err(request_error)?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let resp = check_status(resp, &path).await?;
        let profile: Profile = resp.json().await.map_err(|e| {
            Error::Catalog(format!("catalog response decode error at {path}: {e}"))
        })?;
        Ok(Some(profile))
    }

    async fn create_profile(&self, user: UserId, draft: &ProfileDraft) -> Result<()> {
        let path = format!("/users/{}/profile", user.0);
        let req = self.http.post(self.url(&path)).json(draft);
        self.send_ok(req, &path).await
    }

    async fn update_profile(&self, user: UserId, draft: &ProfileDraft) -> Result<()> {
        let path = format!("/users/{}/profile", user.0);
        let req = self.http.put(self.url(&path)).json(draft);
        self.send_ok(req, &path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_join_without_double_slashes() {
        let client = CatalogClient::new("http://catalog.local/api", Duration::from_secs(1));
        assert_eq!(
            client.url("/categories"),
            "http://catalog.local/api/categories"
        );
    }

    #[test]
    fn order_params_match_the_wire_contract() {
        assert_eq!(order_param(SortOrder::NewestFirst), "new");
        assert_eq!(order_param(SortOrder::OldestFirst), "old");
    }

    #[test]
    fn product_body_parses_the_amount_and_skips_missing_fields() {
        let mut draft = ProductDraft::default();
        draft.name = Some("Bike".to_string());
        draft.price_amount = Some("249,50".to_string());

        let body = serde_json::to_value(ProductBody::from_draft(&draft)).unwrap();
        assert_eq!(body["name"], "Bike");
        assert_eq!(body["price_amount"], 249.5);
        assert!(body.get("description").is_none());
        assert!(body.get("category_id").is_none());
    }

    #[test]
    fn create_body_flattens_the_product_fields() {
        let mut draft = ProductDraft::default();
        draft.name = Some("Bike".to_string());

        let body = serde_json::to_value(CreateProductBody {
            owner_id: 7,
            product: ProductBody::from_draft(&draft),
        })
        .unwrap();
        assert_eq!(body["owner_id"], 7);
        assert_eq!(body["name"], "Bike");
    }
}
