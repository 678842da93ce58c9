//! Product catalog store.
//!
//! The catalog is fetched in full once at startup and treated as read-only
//! afterwards, except for review appends which patch the affected product in
//! place. Detail-page lookups go through a by-id cache so revisiting a
//! product never rescans the list.

use denfit_core::{Product, ProductId, Review};
use moka::future::Cache;
use rust_decimal::Decimal;

use crate::api::{ApiError, Backend};

const BY_ID_CACHE_CAPACITY: u64 = 512;

/// Loading state of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    /// Initial fetch has not completed yet.
    Loading,
    /// Catalog is loaded and servable.
    Ready,
    /// Initial fetch failed; the message is user-visible.
    Failed(String),
}

/// Holds the product list and a by-id lookup cache.
pub struct CatalogStore {
    products: Vec<Product>,
    by_id: Cache<ProductId, Product>,
    status: CatalogStatus,
}

impl Default for CatalogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogStore {
    /// Create an empty, not-yet-loaded catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
            by_id: Cache::new(BY_ID_CACHE_CAPACITY),
            status: CatalogStatus::Loading,
        }
    }

    /// Fetch the full catalog from the backend.
    ///
    /// On failure the previous contents (if any) are kept and the status
    /// records the error.
    pub async fn load<B: Backend>(&mut self, backend: &B) -> Result<(), ApiError> {
        match backend.fetch_products().await {
            Ok(products) => {
                self.by_id.invalidate_all();
                self.products = products;
                self.status = CatalogStatus::Ready;
                Ok(())
            }
            Err(e) => {
                self.status = CatalogStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Current loading state.
    #[must_use]
    pub fn status(&self) -> &CatalogStatus {
        &self.status
    }

    /// All products in catalog order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products in a category, optionally narrowed to a sub-category.
    /// Matching is case-insensitive.
    #[must_use]
    pub fn filter(&self, category: &str, sub_category: Option<&str>) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|p| p.category.eq_ignore_ascii_case(category))
            .filter(|p| {
                sub_category.is_none_or(|sub| p.sub_category.eq_ignore_ascii_case(sub))
            })
            .collect()
    }

    /// Look up a product by id, populating the by-id cache on miss.
    pub async fn by_id(&self, id: ProductId) -> Option<Product> {
        if let Some(product) = self.by_id.get(&id).await {
            return Some(product);
        }
        let product = self.products.iter().find(|p| p.id == id)?.clone();
        self.by_id.insert(id, product.clone()).await;
        Some(product)
    }

    /// Patch a product with a freshly accepted review.
    ///
    /// The review is prepended (newest first), the review count incremented,
    /// and the mean rating recomputed from the full embedded set. The by-id
    /// cache entry is refreshed so detail pages see the new review at once.
    pub async fn apply_review(&mut self, product_id: ProductId, review: Review) {
        let Some(product) = self.products.iter_mut().find(|p| p.id == product_id) else {
            return;
        };

        product.reviews.insert(0, review);
        product.num_reviews = i32::try_from(product.reviews.len()).unwrap_or(i32::MAX);
        product.rating = mean_rating(&product.reviews);

        self.by_id.insert(product_id, product.clone()).await;
    }
}

fn mean_rating(reviews: &[Review]) -> Decimal {
    if reviews.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = reviews.iter().map(|r| Decimal::from(r.rating)).sum();
    (sum / Decimal::from(reviews.len())).round_dp(2)
}
