//! Catalog routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use denfit_core::{Product, ProductId, Review};

use crate::db::RepositoryError;
use crate::db::products::{NewProduct, ProductRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireAuth};
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products).post(create_product))
        .route("/products/{id}", get(get_product))
        .route("/products/{id}/reviews", post(create_review))
}

/// GET /products
async fn list_products(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(Json(products))
}

/// GET /products/{id}
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>> {
    let product = ProductRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".to_string()))?;
    Ok(Json(product))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateProductRequest {
    name: String,
    description: String,
    category: String,
    sub_category: String,
    price: Decimal,
    original_price: Option<Decimal>,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    sizes: Vec<String>,
    #[serde(default)]
    colors: Vec<String>,
    stock: i32,
}

/// POST /products (admin)
async fn create_product(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(body): Json<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if body.name.trim().is_empty() {
        return Err(AppError::BadRequest("Product name is required".to_string()));
    }
    if body.price < Decimal::ZERO || body.stock < 0 {
        return Err(AppError::BadRequest(
            "Price and stock must not be negative".to_string(),
        ));
    }

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name: body.name,
            description: body.description,
            category: body.category,
            sub_category: body.sub_category,
            price: body.price,
            original_price: body.original_price,
            images: body.images,
            sizes: body.sizes,
            colors: body.colors,
            stock: body.stock,
        })
        .await?;

    tracing::info!(product_id = %product.id, admin = %admin.id, "Product created");
    Ok((StatusCode::CREATED, Json(product)))
}

#[derive(Debug, Deserialize)]
struct CreateReviewRequest {
    rating: u8,
    comment: String,
}

/// POST /products/{id}/reviews
async fn create_review(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ProductId>,
    Json(body): Json<CreateReviewRequest>,
) -> Result<(StatusCode, Json<Review>)> {
    if !(1..=5).contains(&body.rating) {
        return Err(AppError::BadRequest(
            "Rating must be between 1 and 5".to_string(),
        ));
    }

    let review = ProductRepository::new(state.pool())
        .add_review(id, user.id, &user.name, body.rating, &body.comment)
        .await
        .map_err(|e| match e {
            RepositoryError::NotFound => AppError::NotFound("Product not found".to_string()),
            RepositoryError::Conflict(msg) if msg == "product already reviewed" => {
                AppError::BadRequest("Product already reviewed".to_string())
            }
            other => AppError::Database(other),
        })?;

    Ok((StatusCode::CREATED, Json(review)))
}
