//! The explicit application state struct.
//!
//! [`AppState`] composes every store behind one injectable object, replacing
//! ambient globals. The UI layer holds exactly one instance and drives it
//! with method calls; stores never reach into each other except through the
//! orchestration methods here.

use denfit_core::{
    Currency, CustomerDetails, OrderId, Product, ProductId, ShippingAddress, UserProfile,
};
use rust_decimal::Decimal;

use crate::api::{
    ApiError, Backend, CreateOrderRequest, LoginRequest, NewReviewRequest, OrderLineRequest,
    SignupRequest,
};
use crate::cart::{AddToCart, CartStore, LineKey, WishlistStore};
use crate::catalog::CatalogStore;
use crate::checkout::{CheckoutError, CheckoutFlow, FLAT_SHIPPING, OrderHistory};
use crate::notify::Toasts;
use crate::session::SessionStore;
use crate::storage::Storage;

/// Overlay currently shown above the page, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    /// Slide-in cart drawer.
    Cart,
    /// Login/signup dialog.
    Auth,
    /// Address and payment form.
    Checkout,
    /// Single-product quick view.
    QuickView(ProductId),
}

/// The whole client application state.
pub struct AppState<B: Backend> {
    api: B,
    pub session: SessionStore,
    pub cart: CartStore,
    pub wishlist: WishlistStore,
    pub catalog: CatalogStore,
    pub checkout: CheckoutFlow,
    pub orders: OrderHistory,
    pub toasts: Toasts,
    modal: Option<Modal>,
    currency: Currency,
}

impl<B: Backend> AppState<B> {
    /// Build the application state, restoring any persisted session.
    #[must_use]
    pub fn new(api: B, storage: Box<dyn Storage>) -> Self {
        Self {
            api,
            session: SessionStore::restore(storage),
            cart: CartStore::new(),
            wishlist: WishlistStore::new(),
            catalog: CatalogStore::new(),
            checkout: CheckoutFlow::new(),
            orders: OrderHistory::new(),
            toasts: Toasts::new(),
            modal: None,
            currency: Currency::default(),
        }
    }

    /// Startup work after construction: load the catalog and, if a session
    /// was restored, fetch the order history. History failures are swallowed;
    /// a catalog failure is surfaced since the storefront cannot render
    /// without it.
    pub async fn bootstrap(&mut self) -> Result<(), ApiError> {
        self.catalog.load(&self.api).await?;
        if self.session.is_authenticated() {
            self.refresh_orders().await;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Session
    // -------------------------------------------------------------------------

    /// Log in. On success the order history is fetched in the background
    /// sense: its failure is toasted but never fails the login.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<(), ApiError> {
        let req = LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        };
        match self.api.login(&req).await {
            Ok(auth) => {
                let name = auth.user.name.clone();
                self.session.apply_login(auth.token, auth.user);
                self.toasts.push(format!("Welcome back, {name}!"));
                self.refresh_orders().await;
                Ok(())
            }
            Err(e) => {
                self.toasts.push(e.to_string());
                Err(e)
            }
        }
    }

    /// Register a new account and log it in.
    pub async fn signup(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let req = SignupRequest {
            name: name.to_owned(),
            email: email.to_owned(),
            password: password.to_owned(),
        };
        match self.api.signup(&req).await {
            Ok(auth) => {
                let name = auth.user.name.clone();
                self.session.apply_signup(auth.token, auth.user);
                self.toasts.push(format!("Welcome to DENFIT, {name}!"));
                Ok(())
            }
            Err(e) => {
                self.toasts.push(e.to_string());
                Err(e)
            }
        }
    }

    /// Log out, dropping the session and order history.
    pub fn logout(&mut self) {
        self.session.logout();
        self.orders.clear();
        self.checkout.reset();
        self.toasts.push("You have been logged out.");
    }

    /// Request a password-reset passcode. The response message is identical
    /// whether or not the account exists.
    pub async fn forgot_password(&mut self, email: &str) -> Result<(), ApiError> {
        match self.api.forgot_password(email).await {
            Ok(res) => {
                self.toasts.push(res.message);
                Ok(())
            }
            Err(e) => {
                self.toasts.push(e.to_string());
                Err(e)
            }
        }
    }

    /// Check a passcode without consuming it.
    pub async fn verify_passcode(&mut self, email: &str, passcode: &str) -> Result<(), ApiError> {
        match self.api.verify_passcode(email, passcode).await {
            Ok(_) => Ok(()),
            Err(e) => {
                self.toasts.push(e.to_string());
                Err(e)
            }
        }
    }

    /// Reset the password with a verified passcode. A successful reset logs
    /// the user in with the newly issued token.
    pub async fn reset_password(
        &mut self,
        email: &str,
        passcode: &str,
        new_password: &str,
    ) -> Result<(), ApiError> {
        match self.api.reset_password(email, passcode, new_password).await {
            Ok(res) => {
                self.session.apply_login(res.token, res.user);
                self.toasts.push(res.message);
                Ok(())
            }
            Err(e) => {
                self.toasts.push(e.to_string());
                Err(e)
            }
        }
    }

    // -------------------------------------------------------------------------
    // Cart / wishlist
    // -------------------------------------------------------------------------

    /// Add one unit to the cart, merging into an existing line.
    pub fn add_to_cart(&mut self, product: Product, size: &str, color: &str) {
        let name = product.name.clone();
        match self.cart.add(product, size, color) {
            AddToCart::Added | AddToCart::Merged(_) => {
                self.toasts.push(format!("{name} has been added to your cart"));
            }
        }
    }

    /// Remove a cart line.
    pub fn remove_from_cart(&mut self, key: &LineKey) {
        self.cart.remove(key);
    }

    /// Change a line's quantity; zero removes it.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) {
        self.cart.update_quantity(key, quantity);
    }

    /// Add to the wishlist; a duplicate is a no-op with a notice.
    pub fn add_to_wishlist(&mut self, product: Product) {
        let name = product.name.clone();
        if self.wishlist.add(product) {
            self.toasts
                .push(format!("{name} has been added to your wishlist"));
        } else {
            self.toasts
                .push(format!("{name} is already in your wishlist"));
        }
    }

    /// Remove from the wishlist. Idempotent.
    pub fn remove_from_wishlist(&mut self, product_id: ProductId) {
        self.wishlist.remove(product_id);
    }

    /// Move a wishlist item into the cart, defaulting to the first listed
    /// size and color.
    pub fn move_to_cart(&mut self, product_id: ProductId) {
        let Some(product) = self.wishlist.take(product_id) else {
            return;
        };
        let size = product.sizes.first().cloned().unwrap_or_default();
        let color = product.colors.first().cloned().unwrap_or_default();
        self.add_to_cart(product, &size, &color);
    }

    // -------------------------------------------------------------------------
    // Catalog / reviews / orders
    // -------------------------------------------------------------------------

    /// Submit a product review, then patch the local catalog with the
    /// accepted review.
    pub async fn submit_review(
        &mut self,
        product_id: ProductId,
        rating: u8,
        comment: &str,
    ) -> Result<(), ApiError> {
        let Some(token) = self.session.token().map(ToOwned::to_owned) else {
            self.toasts.push("You must be logged in to leave a review.");
            return Err(ApiError::Api {
                status: 401,
                message: "Not authorized".to_owned(),
            });
        };

        let req = NewReviewRequest {
            rating,
            comment: comment.to_owned(),
        };
        match self.api.submit_review(&token, product_id, &req).await {
            Ok(review) => {
                self.catalog.apply_review(product_id, review).await;
                self.toasts.push("Thank you for your review!");
                Ok(())
            }
            Err(e) => {
                self.toasts.push(e.to_string());
                Err(e)
            }
        }
    }

    /// Refresh the order history. Failures are toasted and logged, never
    /// propagated: history is a background concern.
    pub async fn refresh_orders(&mut self) {
        let Some(token) = self.session.token().map(ToOwned::to_owned) else {
            return;
        };
        match self.api.my_orders(&token).await {
            Ok(orders) => self.orders.replace(orders),
            Err(e) => {
                tracing::warn!("order history fetch failed: {e}");
                self.toasts.push("Could not load your order history.");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Checkout
    // -------------------------------------------------------------------------

    /// Cart subtotal plus flat shipping.
    #[must_use]
    pub fn order_total(&self) -> Decimal {
        self.cart.subtotal() + FLAT_SHIPPING
    }

    /// Place an order from the current cart.
    ///
    /// Preconditions: authenticated session, non-empty cart, no submission
    /// already in flight. The cart is cleared and the order recorded only
    /// after the server confirms; any failure leaves the cart untouched.
    pub async fn place_order(
        &mut self,
        shipping_address: ShippingAddress,
        customer: CustomerDetails,
        payment_method: &str,
    ) -> Result<OrderId, CheckoutError> {
        let Some(token) = self.session.token().map(ToOwned::to_owned) else {
            self.toasts.push("You must be logged in to place an order.");
            return Err(CheckoutError::NotAuthenticated);
        };
        if self.cart.is_empty() {
            self.toasts.push("Your cart is empty.");
            return Err(CheckoutError::EmptyCart);
        }

        let attempt = self.checkout.begin()?;

        let req = CreateOrderRequest {
            items: self
                .cart
                .lines()
                .iter()
                .map(|line| OrderLineRequest {
                    product: line.product.id,
                    name: line.product.name.clone(),
                    quantity: line.quantity,
                    image: line.product.images.first().cloned().unwrap_or_default(),
                    price: line.product.price,
                    size: line.size.clone(),
                    color: line.color.clone(),
                })
                .collect(),
            shipping_address: shipping_address.clone(),
            customer,
            payment_method: payment_method.to_owned(),
            total_amount: self.order_total(),
        };

        match self.api.create_order(&token, &req).await {
            Ok(order) => {
                if !self.checkout.complete(attempt) {
                    // A reset superseded this attempt; drop the response.
                    return Err(CheckoutError::AlreadySubmitting);
                }
                let order_id = order.id;
                self.session.save_address(shipping_address);
                self.orders.prepend(order);
                self.cart.clear();
                self.toasts.push("Order placed successfully!");
                Ok(order_id)
            }
            Err(e) => {
                let message = e.to_string();
                self.checkout.fail(attempt, message.clone());
                self.toasts.push(message);
                Err(CheckoutError::Api(e))
            }
        }
    }

    // -------------------------------------------------------------------------
    // UI chrome
    // -------------------------------------------------------------------------

    /// The overlay currently shown, if any.
    #[must_use]
    pub fn modal(&self) -> Option<Modal> {
        self.modal
    }

    /// Show an overlay, replacing any open one.
    pub fn open_modal(&mut self, modal: Modal) {
        self.modal = Some(modal);
    }

    /// Dismiss the overlay.
    pub fn close_modal(&mut self) {
        self.modal = None;
    }

    /// Selected display currency.
    #[must_use]
    pub fn currency(&self) -> Currency {
        self.currency
    }

    /// Switch the display currency. Display-only; stored amounts stay USD.
    pub fn set_currency(&mut self, currency: Currency) {
        self.currency = currency;
    }

    /// Format a stored USD amount in the selected display currency.
    #[must_use]
    pub fn display_price(&self, usd_amount: Decimal) -> String {
        self.currency.display(usd_amount)
    }

    /// The logged-in profile, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user()
    }

    /// The backend this state talks to.
    #[must_use]
    pub fn backend(&self) -> &B {
        &self.api
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoBackend;

    impl Backend for NoBackend {
        async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
            Ok(vec![])
        }
        async fn login(&self, _req: &LoginRequest) -> Result<crate::api::AuthResponse, ApiError> {
            unimplemented!()
        }
        async fn signup(
            &self,
            _req: &SignupRequest,
        ) -> Result<crate::api::AuthResponse, ApiError> {
            unimplemented!()
        }
        async fn forgot_password(
            &self,
            _email: &str,
        ) -> Result<crate::api::MessageResponse, ApiError> {
            unimplemented!()
        }
        async fn verify_passcode(
            &self,
            _email: &str,
            _passcode: &str,
        ) -> Result<crate::api::MessageResponse, ApiError> {
            unimplemented!()
        }
        async fn reset_password(
            &self,
            _email: &str,
            _passcode: &str,
            _new_password: &str,
        ) -> Result<crate::api::ResetResponse, ApiError> {
            unimplemented!()
        }
        async fn create_order(
            &self,
            _token: &str,
            _req: &CreateOrderRequest,
        ) -> Result<denfit_core::Order, ApiError> {
            unimplemented!()
        }
        async fn my_orders(&self, _token: &str) -> Result<Vec<denfit_core::Order>, ApiError> {
            unimplemented!()
        }
        async fn submit_review(
            &self,
            _token: &str,
            _product_id: ProductId,
            _req: &NewReviewRequest,
        ) -> Result<denfit_core::Review, ApiError> {
            unimplemented!()
        }
    }

    #[test]
    fn test_modal_replaces_open_one() {
        let mut state = AppState::new(NoBackend, Box::new(crate::storage::MemoryStorage::new()));
        assert_eq!(state.modal(), None);
        state.open_modal(Modal::Cart);
        state.open_modal(Modal::QuickView(ProductId::new(3)));
        assert_eq!(state.modal(), Some(Modal::QuickView(ProductId::new(3))));
        state.close_modal();
        assert_eq!(state.modal(), None);
    }

    #[test]
    fn test_currency_is_display_only() {
        let mut state = AppState::new(NoBackend, Box::new(crate::storage::MemoryStorage::new()));
        assert_eq!(state.currency(), Currency::Usd);
        state.set_currency(Currency::Eur);
        assert_eq!(
            state.display_price(Decimal::new(10000, 2)),
            "\u{20ac}93.00"
        );
    }
}
