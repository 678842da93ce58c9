//! End-to-end flows through [`AppState`] against an in-memory backend:
//! login/logout, cart mutation, and the checkout orchestrator's
//! success/failure contract.

use std::cell::{Cell, RefCell};

use chrono::Utc;
use denfit_client::api::{
    ApiError, AuthResponse, Backend, CreateOrderRequest, LoginRequest, MessageResponse,
    NewReviewRequest, ResetResponse, SignupRequest,
};
use denfit_client::cart::LineKey;
use denfit_client::checkout::{CheckoutError, CheckoutState, FLAT_SHIPPING};
use denfit_client::state::AppState;
use denfit_client::storage::MemoryStorage;
use denfit_core::{
    CustomerDetails, Email, Order, OrderId, OrderItem, OrderStatus, Product, ProductId, Review,
    ReviewId, ShippingAddress, UserId, UserProfile,
};
use rust_decimal::Decimal;

const TOKEN: &str = "test-bearer-token";

/// In-memory backend with one known account and a controllable failure mode.
struct MockBackend {
    products: Vec<Product>,
    fail_orders: Cell<bool>,
    orders: RefCell<Vec<Order>>,
    next_order_id: Cell<i32>,
}

impl MockBackend {
    fn new(products: Vec<Product>) -> Self {
        Self {
            products,
            fail_orders: Cell::new(false),
            orders: RefCell::new(Vec::new()),
            next_order_id: Cell::new(1),
        }
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: UserId::new(1),
            name: "Ada".to_owned(),
            email: Email::parse("ada@example.com").unwrap(),
            address: None,
        }
    }
}

impl Backend for MockBackend {
    async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        Ok(self.products.clone())
    }

    async fn login(&self, req: &LoginRequest) -> Result<AuthResponse, ApiError> {
        if req.email == "ada@example.com" && req.password == "secret" {
            Ok(AuthResponse {
                token: TOKEN.to_owned(),
                user: Self::profile(),
            })
        } else {
            Err(ApiError::Api {
                status: 401,
                message: "Invalid email or password".to_owned(),
            })
        }
    }

    async fn signup(&self, req: &SignupRequest) -> Result<AuthResponse, ApiError> {
        Ok(AuthResponse {
            token: TOKEN.to_owned(),
            user: UserProfile {
                id: UserId::new(2),
                name: req.name.clone(),
                email: Email::parse(&req.email).map_err(|e| ApiError::Api {
                    status: 400,
                    message: e.to_string(),
                })?,
                address: None,
            },
        })
    }

    async fn forgot_password(&self, _email: &str) -> Result<MessageResponse, ApiError> {
        Ok(MessageResponse {
            message: "If an account exists, a passcode has been sent.".to_owned(),
        })
    }

    async fn verify_passcode(
        &self,
        _email: &str,
        _passcode: &str,
    ) -> Result<MessageResponse, ApiError> {
        Ok(MessageResponse {
            message: "Passcode verified".to_owned(),
        })
    }

    async fn reset_password(
        &self,
        _email: &str,
        _passcode: &str,
        _new_password: &str,
    ) -> Result<ResetResponse, ApiError> {
        Ok(ResetResponse {
            message: "Password reset successful".to_owned(),
            token: TOKEN.to_owned(),
            user: Self::profile(),
        })
    }

    async fn create_order(
        &self,
        token: &str,
        req: &CreateOrderRequest,
    ) -> Result<Order, ApiError> {
        if token != TOKEN {
            return Err(ApiError::Api {
                status: 401,
                message: "Not authorized, token failed".to_owned(),
            });
        }
        if self.fail_orders.get() {
            return Err(ApiError::Api {
                status: 500,
                message: "An unexpected server error occurred. Please try again.".to_owned(),
            });
        }
        if req.items.is_empty() {
            return Err(ApiError::Api {
                status: 400,
                message: "No order items".to_owned(),
            });
        }

        let id = self.next_order_id.get();
        self.next_order_id.set(id + 1);

        let order = Order {
            id: OrderId::new(id),
            user: UserId::new(1),
            items: req
                .items
                .iter()
                .map(|line| OrderItem {
                    product: line.product,
                    name: line.name.clone(),
                    qty: line.quantity,
                    image: line.image.clone(),
                    price: line.price,
                    size: line.size.clone(),
                    color: line.color.clone(),
                })
                .collect(),
            shipping_address: req.shipping_address.clone(),
            customer: req.customer.clone(),
            payment_method: req.payment_method.clone(),
            total_amount: req.total_amount,
            status: OrderStatus::Confirmed,
            delivered_at: None,
            created_at: Utc::now(),
        };
        self.orders.borrow_mut().insert(0, order.clone());
        Ok(order)
    }

    async fn my_orders(&self, token: &str) -> Result<Vec<Order>, ApiError> {
        if token != TOKEN {
            return Err(ApiError::Api {
                status: 401,
                message: "Not authorized, token failed".to_owned(),
            });
        }
        Ok(self.orders.borrow().clone())
    }

    async fn submit_review(
        &self,
        _token: &str,
        _product_id: ProductId,
        req: &NewReviewRequest,
    ) -> Result<Review, ApiError> {
        Ok(Review {
            id: ReviewId::new(1),
            user: UserId::new(1),
            name: "Ada".to_owned(),
            rating: req.rating,
            comment: req.comment.clone(),
            created_at: Utc::now(),
        })
    }
}

fn product(id: i32, name: &str, price: Decimal) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_owned(),
        description: String::new(),
        category: "Men".to_owned(),
        sub_category: "Jackets".to_owned(),
        price,
        original_price: None,
        images: vec![format!("https://example.com/{id}.jpg")],
        sizes: vec!["M".to_owned(), "L".to_owned()],
        colors: vec!["Red".to_owned(), "Blue".to_owned()],
        stock: 10,
        rating: Decimal::ZERO,
        num_reviews: 0,
        reviews: vec![],
    }
}

fn address() -> ShippingAddress {
    ShippingAddress {
        address: "1 Main St".to_owned(),
        city: "Lahore".to_owned(),
        postal_code: Some("54000".to_owned()),
        country: Some("Pakistan".to_owned()),
    }
}

fn customer() -> CustomerDetails {
    CustomerDetails {
        name: "Ada".to_owned(),
        email: "ada@example.com".to_owned(),
        phone: "555-0100".to_owned(),
    }
}

fn state_with_products(products: Vec<Product>) -> AppState<MockBackend> {
    AppState::new(MockBackend::new(products), Box::new(MemoryStorage::new()))
}

async fn logged_in_state(products: Vec<Product>) -> AppState<MockBackend> {
    let mut state = state_with_products(products);
    state.login("ada@example.com", "secret").await.unwrap();
    state
}

#[tokio::test]
async fn test_checkout_success_empties_cart_and_records_order() {
    let price_a = Decimal::new(7499, 2); // 74.99
    let price_b = Decimal::new(7999, 2); // 79.99
    let mut state = logged_in_state(vec![
        product(1, "Varsity Bomber", price_a),
        product(2, "Classic Denim Jeans", price_b),
    ])
    .await;

    // {productA, M, Red, qty 2} and {productB, L, Blue, qty 1}
    state.add_to_cart(product(1, "Varsity Bomber", price_a), "M", "Red");
    state.add_to_cart(product(1, "Varsity Bomber", price_a), "M", "Red");
    state.add_to_cart(product(2, "Classic Denim Jeans", price_b), "L", "Blue");

    let subtotal = state.cart.subtotal();
    assert_eq!(subtotal, price_a * Decimal::from(2) + price_b);

    state
        .place_order(address(), customer(), "Cash on Delivery")
        .await
        .unwrap();

    assert!(state.cart.is_empty());
    let first = &state.orders.orders()[0];
    assert_eq!(first.total_amount, subtotal + FLAT_SHIPPING);
    assert_eq!(first.items.len(), 2);
    assert_eq!(first.items[0].qty, 2);
    assert_eq!(*state.checkout.state(), CheckoutState::Succeeded);
}

#[tokio::test]
async fn test_checkout_failure_preserves_cart_and_history() {
    let mut state = logged_in_state(vec![product(1, "Varsity Bomber", Decimal::new(7499, 2))])
        .await;
    state.add_to_cart(product(1, "Varsity Bomber", Decimal::new(7499, 2)), "M", "Red");
    let lines_before: Vec<_> = state.cart.lines().to_vec();

    state.backend().fail_orders.set(true);
    let err = state
        .place_order(address(), customer(), "Cash on Delivery")
        .await
        .unwrap_err();

    assert!(matches!(err, CheckoutError::Api(_)));
    assert_eq!(state.cart.lines(), lines_before.as_slice());
    assert!(state.orders.orders().is_empty());
    assert!(matches!(state.checkout.state(), CheckoutState::Failed(_)));
}

#[tokio::test]
async fn test_checkout_requires_authentication() {
    let mut state = state_with_products(vec![product(1, "Varsity Bomber", Decimal::ONE)]);
    state.add_to_cart(product(1, "Varsity Bomber", Decimal::ONE), "M", "Red");

    let err = state
        .place_order(address(), customer(), "Cash on Delivery")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::NotAuthenticated));
    assert_eq!(state.cart.lines().len(), 1);
}

#[tokio::test]
async fn test_checkout_rejects_empty_cart() {
    let mut state = logged_in_state(vec![]).await;
    let err = state
        .place_order(address(), customer(), "Cash on Delivery")
        .await
        .unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));
}

#[tokio::test]
async fn test_login_then_logout_restores_unauthenticated_state() {
    let mut state = state_with_products(vec![]);
    assert!(state.user().is_none());

    state.login("ada@example.com", "secret").await.unwrap();
    assert!(state.user().is_some());

    state.logout();
    assert!(state.user().is_none());
    assert!(state.session.token().is_none());
    assert!(state.orders.orders().is_empty());
}

#[tokio::test]
async fn test_login_failure_surfaces_server_message() {
    let mut state = state_with_products(vec![]);
    let err = state.login("ada@example.com", "wrong").await.unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
    assert!(state.user().is_none());
}

#[tokio::test]
async fn test_order_history_survives_relogin() {
    let mut state = logged_in_state(vec![product(1, "Varsity Bomber", Decimal::ONE)]).await;
    state.add_to_cart(product(1, "Varsity Bomber", Decimal::ONE), "M", "Red");
    state
        .place_order(address(), customer(), "Cash on Delivery")
        .await
        .unwrap();

    state.logout();
    assert!(state.orders.orders().is_empty());

    state.login("ada@example.com", "secret").await.unwrap();
    assert_eq!(state.orders.orders().len(), 1);
}

#[tokio::test]
async fn test_checkout_saves_address_for_prefill() {
    let mut state = logged_in_state(vec![product(1, "Varsity Bomber", Decimal::ONE)]).await;
    state.add_to_cart(product(1, "Varsity Bomber", Decimal::ONE), "M", "Red");
    state
        .place_order(address(), customer(), "Cash on Delivery")
        .await
        .unwrap();

    let saved = state.user().unwrap().address.as_ref().unwrap();
    assert_eq!(saved.city, "Lahore");
}

#[tokio::test]
async fn test_update_quantity_zero_removes_line() {
    let mut state = state_with_products(vec![]);
    state.add_to_cart(product(1, "Varsity Bomber", Decimal::ONE), "M", "Red");
    let key = LineKey::new(ProductId::new(1), "M", "Red");

    state.update_quantity(&key, 3);
    assert_eq!(state.cart.lines()[0].quantity, 3);

    state.update_quantity(&key, 0);
    assert!(state.cart.is_empty());
}

#[tokio::test]
async fn test_wishlist_move_to_cart() {
    let mut state = state_with_products(vec![]);
    state.add_to_wishlist(product(1, "Varsity Bomber", Decimal::ONE));
    state.add_to_wishlist(product(1, "Varsity Bomber", Decimal::ONE));
    assert_eq!(state.wishlist.items().len(), 1);

    state.move_to_cart(ProductId::new(1));
    assert!(state.wishlist.items().is_empty());
    assert_eq!(state.cart.lines().len(), 1);
    // Defaults to the first listed size and color.
    assert_eq!(state.cart.lines()[0].size, "M");
    assert_eq!(state.cart.lines()[0].color, "Red");
}

#[tokio::test]
async fn test_submit_review_patches_catalog() {
    let mut state = logged_in_state(vec![product(1, "Varsity Bomber", Decimal::ONE)]).await;
    state.bootstrap().await.unwrap();

    state
        .submit_review(ProductId::new(1), 5, "Great jacket")
        .await
        .unwrap();

    let patched = state.catalog.by_id(ProductId::new(1)).await.unwrap();
    assert_eq!(patched.num_reviews, 1);
    assert_eq!(patched.rating, Decimal::from(5));
    assert_eq!(patched.reviews[0].comment, "Great jacket");
}
