//! Product repository.
//!
//! Products are stored one row per product with embedded collections in
//! JSONB, so a review append is a single-row UPDATE covering the review
//! list, the recomputed mean rating, and the review count together.

use chrono::Utc;
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use denfit_core::{Product, ProductId, Review, ReviewId, UserId};

use super::RepositoryError;

/// Fields for a new catalog product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    pub price: Decimal,
    pub original_price: Option<Decimal>,
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: ProductId,
    name: String,
    description: String,
    category: String,
    sub_category: String,
    price: Decimal,
    original_price: Option<Decimal>,
    images: Json<Vec<String>>,
    sizes: Json<Vec<String>>,
    colors: Json<Vec<String>>,
    stock: i32,
    rating: Decimal,
    num_reviews: i32,
    reviews: Json<Vec<Review>>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            category: row.category,
            sub_category: row.sub_category,
            price: row.price,
            original_price: row.original_price,
            images: row.images.0,
            sizes: row.sizes.0,
            colors: row.colors.0,
            stock: row.stock,
            rating: row.rating,
            num_reviews: row.num_reviews,
            reviews: row.reviews.0,
        }
    }
}

const PRODUCT_COLUMNS: &str = "id, name, description, category, sub_category, price, \
     original_price, images, sizes, colors, stock, rating, num_reviews, reviews";

/// Repository for product database operations.
pub struct ProductRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List the full catalog in id order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products ORDER BY id"
        ))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }

    /// Get a single product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Product::from))
    }

    /// Insert a new catalog product with no reviews.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewProduct) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "INSERT INTO products \
             (name, description, category, sub_category, price, original_price, \
              images, sizes, colors, stock, rating, num_reviews, reviews) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 0, 0, '[]'::jsonb) \
             RETURNING {PRODUCT_COLUMNS}"
        ))
        .bind(&new.name)
        .bind(&new.description)
        .bind(&new.category)
        .bind(&new.sub_category)
        .bind(new.price)
        .bind(new.original_price)
        .bind(Json(&new.images))
        .bind(Json(&new.sizes))
        .bind(Json(&new.colors))
        .bind(new.stock)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Append a review and recompute the aggregate in one write.
    ///
    /// The mean is always derived from the full review set, and the review
    /// list, mean, and count land in a single UPDATE so the row can never
    /// hold a count inconsistent with its reviews. The UPDATE is guarded on
    /// the count read at the start, so a concurrent append from another user
    /// forces a reload instead of silently dropping their review.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Conflict` if this user already reviewed it,
    /// or if contention persists across retries.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_review(
        &self,
        product_id: ProductId,
        user: UserId,
        author_name: &str,
        rating: u8,
        comment: &str,
    ) -> Result<Review, RepositoryError> {
        for _ in 0..3 {
            let product = self.get(product_id).await?.ok_or(RepositoryError::NotFound)?;
            let review = prepare_review(&product.reviews, user, author_name, rating, comment)?;

            // Newest first
            let mut reviews = product.reviews;
            reviews.insert(0, review.clone());
            let mean = mean_rating(&reviews);
            let num_reviews = i32::try_from(reviews.len()).unwrap_or(i32::MAX);

            let result = sqlx::query(
                "UPDATE products SET reviews = $1, rating = $2, num_reviews = $3 \
                 WHERE id = $4 AND num_reviews = $5",
            )
            .bind(Json(&reviews))
            .bind(mean)
            .bind(num_reviews)
            .bind(product_id)
            .bind(product.num_reviews)
            .execute(self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(review);
            }
            // Lost the race against another append; reload and retry.
        }

        Err(RepositoryError::Conflict(
            "review update contention, please retry".to_owned(),
        ))
    }
}

/// Build the next review for a product.
///
/// A user gets one review per product; ids are assigned as one past the
/// current maximum. The existing set is never modified here.
fn prepare_review(
    existing: &[Review],
    user: UserId,
    author_name: &str,
    rating: u8,
    comment: &str,
) -> Result<Review, RepositoryError> {
    if existing.iter().any(|r| r.user == user) {
        return Err(RepositoryError::Conflict(
            "product already reviewed".to_owned(),
        ));
    }

    let next_id = existing.iter().map(|r| r.id.as_i32()).max().unwrap_or(0) + 1;
    Ok(Review {
        id: ReviewId::new(next_id),
        user,
        name: author_name.to_owned(),
        rating,
        comment: comment.to_owned(),
        created_at: Utc::now(),
    })
}

fn mean_rating(reviews: &[Review]) -> Decimal {
    if reviews.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = reviews.iter().map(|r| Decimal::from(r.rating)).sum();
    (sum / Decimal::from(reviews.len())).round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(id: i32, user: i32, rating: u8) -> Review {
        Review {
            id: ReviewId::new(id),
            user: UserId::new(user),
            name: "Ada".to_owned(),
            rating,
            comment: "Nice".to_owned(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mean_rating_empty() {
        assert_eq!(mean_rating(&[]), Decimal::ZERO);
    }

    #[test]
    fn test_mean_rating_rounds_to_two_places() {
        let reviews = [review(1, 1, 5), review(2, 2, 4), review(3, 3, 4)];
        // 13 / 3 = 4.333... -> 4.33
        assert_eq!(mean_rating(&reviews), Decimal::new(433, 2));
    }

    #[test]
    fn test_second_review_by_same_user_rejected() {
        let existing = vec![review(1, 1, 5)];
        let result = prepare_review(&existing, UserId::new(1), "Ada", 3, "Changed my mind");
        assert!(matches!(result, Err(RepositoryError::Conflict(_))));
        // The rejected attempt leaves the review set untouched.
        assert_eq!(existing.len(), 1);
        assert_eq!(existing[0].rating, 5);
    }

    #[test]
    fn test_review_from_new_user_gets_next_id() {
        let existing = vec![review(3, 1, 5), review(7, 2, 4)];
        let review = prepare_review(&existing, UserId::new(3), "Grace", 4, "Solid")
            .expect("new reviewer accepted");
        assert_eq!(review.id, ReviewId::new(8));
        assert_eq!(review.user, UserId::new(3));
    }

    #[test]
    fn test_first_review_gets_id_one() {
        let review = prepare_review(&[], UserId::new(1), "Ada", 5, "Love it").expect("accepted");
        assert_eq!(review.id, ReviewId::new(1));
    }
}
