//! Wire-format domain records shared by the client and server.
//!
//! These are the JSON shapes exchanged over the REST surface. Embedded
//! collections (product reviews, order line items) travel inline with their
//! parent record; an [`OrderItem`] is an immutable snapshot taken at purchase
//! time, never a live reference to a [`Product`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Email, OrderId, OrderStatus, ProductId, ReviewId, UserId};

/// A customer review embedded in a product record.
///
/// Reviews are ordered newest-first by convention.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    /// Author reference.
    pub user: UserId,
    /// Author display name captured at review time.
    pub name: String,
    /// Star rating, 1-5.
    pub rating: u8,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

/// A catalog product.
///
/// Immutable from the client's perspective except for review appends, which
/// also recompute `rating` and `num_reviews`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub category: String,
    pub sub_category: String,
    /// Current price in USD.
    pub price: Decimal,
    /// Pre-sale price; present only when the product is marked down.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    /// Ordered image URLs; the first is the primary image.
    pub images: Vec<String>,
    pub sizes: Vec<String>,
    pub colors: Vec<String>,
    pub stock: i32,
    /// Arithmetic mean of all review ratings.
    pub rating: Decimal,
    pub num_reviews: i32,
    /// Embedded reviews, newest first.
    pub reviews: Vec<Review>,
}

/// A shipping destination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub address: String,
    pub city: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

/// Contact details collected at checkout.
///
/// The order confirmation email is sent to this address, which may differ
/// from the account email.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// An immutable snapshot of a purchased line item.
///
/// Captured at order time: later catalog price changes do not affect it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// The product this line was snapshotted from.
    pub product: ProductId,
    pub name: String,
    pub qty: u32,
    pub image: String,
    /// Unit price in USD at purchase time.
    pub price: Decimal,
    pub size: String,
    pub color: String,
}

impl OrderItem {
    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.qty)
    }
}

/// A placed order.
///
/// Append-only from the client's perspective; status transitions are
/// server-authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub user: UserId,
    pub items: Vec<OrderItem>,
    pub shipping_address: ShippingAddress,
    pub customer: CustomerDetails,
    pub payment_method: String,
    pub total_amount: Decimal,
    pub status: OrderStatus,
    /// Set only on transition into `Delivered`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// The user profile as seen by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: Email,
    /// Shipping address remembered from a previous checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<ShippingAddress>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_item_line_total() {
        let item = OrderItem {
            product: ProductId::new(1),
            name: "Varsity Bomber".to_owned(),
            qty: 3,
            image: "https://example.com/1.jpg".to_owned(),
            price: Decimal::new(7499, 2),
            size: "M".to_owned(),
            color: "Red".to_owned(),
        };
        assert_eq!(item.line_total(), Decimal::new(22497, 2));
    }

    #[test]
    fn test_product_wire_field_names() {
        let product = Product {
            id: ProductId::new(1),
            name: "Classic Denim Jeans".to_owned(),
            description: "Timeless denim".to_owned(),
            category: "Men".to_owned(),
            sub_category: "Jeans".to_owned(),
            price: Decimal::new(7999, 2),
            original_price: None,
            images: vec![],
            sizes: vec!["M".to_owned()],
            colors: vec!["Blue".to_owned()],
            stock: 10,
            rating: Decimal::ZERO,
            num_reviews: 0,
            reviews: vec![],
        };
        let json = serde_json::to_value(&product).unwrap_or_default();
        assert!(json.get("subCategory").is_some());
        assert!(json.get("numReviews").is_some());
        // originalPrice omitted when not on sale
        assert!(json.get("originalPrice").is_none());
    }

    #[test]
    fn test_order_serde_roundtrip() {
        let order = Order {
            id: OrderId::new(10),
            user: UserId::new(2),
            items: vec![],
            shipping_address: ShippingAddress {
                address: "1 Main St".to_owned(),
                city: "Lahore".to_owned(),
                postal_code: None,
                country: None,
            },
            customer: CustomerDetails {
                name: "Ada".to_owned(),
                email: "ada@example.com".to_owned(),
                phone: "555-0100".to_owned(),
            },
            payment_method: "Cash on Delivery".to_owned(),
            total_amount: Decimal::new(500, 2),
            status: OrderStatus::Confirmed,
            delivered_at: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&order).unwrap_or_default();
        let back: Order = serde_json::from_str(&json).unwrap_or_else(|_| order.clone());
        assert_eq!(back, order);
    }
}
