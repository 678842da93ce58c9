//! Order routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;

use denfit_core::{CustomerDetails, Order, OrderId, OrderItem, OrderStatus, ShippingAddress};

use crate::db::orders::{NewOrder, OrderRepository};
use crate::error::{AppError, Result};
use crate::middleware::auth::{RequireAdmin, RequireAuth};
use crate::services::mail::templates;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/orders", post(create_order))
        .route("/orders/myorders", get(my_orders))
        .route("/admin/orders", get(admin_list_orders))
        .route("/admin/orders/{id}", put(admin_update_status))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderLineRequest {
    product: denfit_core::ProductId,
    name: String,
    quantity: u32,
    image: String,
    price: Decimal,
    size: String,
    color: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateOrderRequest {
    items: Vec<OrderLineRequest>,
    shipping_address: ShippingAddress,
    customer: CustomerDetails,
    payment_method: String,
    total_amount: Decimal,
}

fn validate_order(body: &CreateOrderRequest) -> Result<()> {
    if body.items.is_empty() {
        return Err(AppError::BadRequest("No order items".to_string()));
    }
    if body.shipping_address.address.trim().is_empty()
        || body.shipping_address.city.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Shipping address and city are required".to_string(),
        ));
    }
    if body.customer.name.trim().is_empty()
        || body.customer.email.trim().is_empty()
        || body.customer.phone.trim().is_empty()
    {
        return Err(AppError::BadRequest(
            "Customer name, email, and phone are required".to_string(),
        ));
    }
    if body.payment_method.trim().is_empty() {
        return Err(AppError::BadRequest(
            "Payment method is required".to_string(),
        ));
    }
    Ok(())
}

/// POST /orders
async fn create_order(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(body): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<Order>)> {
    validate_order(&body)?;

    let items = body
        .items
        .into_iter()
        .map(|line| OrderItem {
            product: line.product,
            name: line.name,
            qty: line.quantity,
            image: line.image,
            price: line.price,
            size: line.size,
            color: line.color,
        })
        .collect();

    let order = OrderRepository::new(state.pool())
        .create(&NewOrder {
            user: user.id,
            items,
            shipping_address: body.shipping_address,
            customer: body.customer,
            payment_method: body.payment_method,
            total_amount: body.total_amount,
        })
        .await?;

    tracing::info!(order_id = %order.id, user = %user.id, "Order placed");

    let (subject, text) = templates::order_confirmation(&order);
    state
        .mailer()
        .send_in_background(order.customer.email.clone(), subject, text);

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /orders/myorders
async fn my_orders(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool())
        .list_for_user(user.id)
        .await?;
    Ok(Json(orders))
}

/// GET /admin/orders
async fn admin_list_orders(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Result<Json<Vec<Order>>> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;
    Ok(Json(orders))
}

#[derive(Debug, Deserialize)]
struct UpdateStatusRequest {
    status: String,
}

/// PUT /admin/orders/{id}
async fn admin_update_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Order>> {
    let status = body
        .status
        .parse::<OrderStatus>()
        .map_err(|_| AppError::BadRequest(format!("Invalid order status: {}", body.status)))?;

    let order = OrderRepository::new(state.pool())
        .update_status(id, status)
        .await
        .map_err(|e| match e {
            crate::db::RepositoryError::NotFound => {
                AppError::NotFound("Order not found".to_string())
            }
            other => AppError::Database(other),
        })?;

    tracing::info!(order_id = %order.id, status = %order.status, admin = %admin.id, "Order status updated");
    Ok(Json(order))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateOrderRequest {
        CreateOrderRequest {
            items: vec![OrderLineRequest {
                product: denfit_core::ProductId::new(1),
                name: "Varsity Bomber".to_owned(),
                quantity: 1,
                image: String::new(),
                price: Decimal::new(7499, 2),
                size: "M".to_owned(),
                color: "Red".to_owned(),
            }],
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
            total_amount: Decimal::new(7999, 2),
        }
    }

    #[test]
    fn test_valid_order_passes() {
        assert!(validate_order(&valid_request()).is_ok());
    }

    #[test]
    fn test_empty_items_rejected() {
        let mut req = valid_request();
        req.items.clear();
        let err = validate_order(&req).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(msg) if msg == "No order items"));
    }

    #[test]
    fn test_blank_address_rejected() {
        let mut req = valid_request();
        req.shipping_address.address = "   ".to_owned();
        assert!(validate_order(&req).is_err());
    }

    #[test]
    fn test_missing_contact_rejected() {
        let mut req = valid_request();
        req.customer.phone = String::new();
        assert!(validate_order(&req).is_err());
    }

    #[test]
    fn test_order_request_accepts_client_wire_shape() {
        let json = serde_json::json!({
            "items": [{
                "product": 1,
                "name": "Varsity Bomber",
                "quantity": 2,
                "image": "/images/bomber.jpg",
                "price": "74.99",
                "size": "M",
                "color": "Red"
            }],
            "shippingAddress": { "address": "1 Main St", "city": "Lahore" },
            "customer": { "name": "Ada", "email": "ada@example.com", "phone": "555-0100" },
            "paymentMethod": "Cash on Delivery",
            "totalAmount": "154.98"
        });
        let req: CreateOrderRequest = serde_json::from_value(json).expect("deserialize");
        assert_eq!(req.items[0].quantity, 2);
        assert_eq!(req.total_amount, Decimal::new(15498, 2));
    }
}
