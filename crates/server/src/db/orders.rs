//! Order repository.
//!
//! An order row holds the immutable line-item snapshots, the shipping
//! address, and the customer contact details as JSONB documents. Later
//! catalog changes never touch placed orders.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;

use denfit_core::{
    CustomerDetails, Order, OrderId, OrderItem, OrderStatus, ShippingAddress, UserId,
};

use super::RepositoryError;

/// Fields for a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub customer: CustomerDetails,
    pub payment_method: String,
    pub total_amount: Decimal,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: OrderId,
    user_id: UserId,
    items: Json<Vec<OrderItem>>,
    shipping_address: Json<ShippingAddress>,
    customer: Json<CustomerDetails>,
    payment_method: String,
    total_amount: Decimal,
    status: String,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let status = self.status.parse::<OrderStatus>().map_err(|_| {
            RepositoryError::DataCorruption(format!("invalid order status: {}", self.status))
        })?;

        Ok(Order {
            id: self.id,
            user: self.user_id,
            items: self.items.0,
            shipping_address: self.shipping_address.0,
            customer: self.customer.0,
            payment_method: self.payment_method,
            total_amount: self.total_amount,
            status,
            delivered_at: self.delivered_at,
            created_at: self.created_at,
        })
    }
}

const ORDER_COLUMNS: &str = "id, user_id, items, shipping_address, customer, payment_method, \
     total_amount, status, delivered_at, created_at";

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Persist a new order as a single row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, new: &NewOrder) -> Result<Order, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "INSERT INTO orders \
             (user_id, items, shipping_address, customer, payment_method, total_amount, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {ORDER_COLUMNS}"
        ))
        .bind(new.user)
        .bind(Json(&new.items))
        .bind(Json(&new.shipping_address))
        .bind(Json(&new.customer))
        .bind(&new.payment_method)
        .bind(new.total_amount)
        .bind(OrderStatus::Confirmed.as_str())
        .fetch_one(self.pool)
        .await?;

        row.into_order()
    }

    /// A user's orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_for_user(&self, user: UserId) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = $1 ORDER BY created_at DESC"
        ))
        .bind(user)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY created_at DESC"
        ))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }

    /// Transition an order's status, stamping the delivery time on entry
    /// into `Delivered`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the order doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<Order, RepositoryError> {
        let sql = if status == OrderStatus::Delivered {
            format!(
                "UPDATE orders SET status = $1, delivered_at = NOW() \
                 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
            )
        } else {
            format!(
                "UPDATE orders SET status = $1 \
                 WHERE id = $2 RETURNING {ORDER_COLUMNS}"
            )
        };

        let row = sqlx::query_as::<_, OrderRow>(&sql)
            .bind(status.as_str())
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)?;

        row.into_order()
    }
}
