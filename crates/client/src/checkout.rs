//! Checkout orchestrator and local order history.
//!
//! Checkout is a small state machine: `Editing` while the form is open,
//! `Submitting` while exactly one order request is in flight, then
//! `Succeeded` or `Failed`. Each submission gets an attempt number so a
//! response from an abandoned attempt (e.g. after a reset) cannot corrupt
//! the current one.

use denfit_core::Order;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::api::ApiError;

/// Flat shipping charge added to every order, in USD.
pub const FLAT_SHIPPING: Decimal = Decimal::from_parts(500, 0, 0, false, 2);

/// Why an order submission was rejected before reaching the network.
#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("You must be logged in to place an order.")]
    NotAuthenticated,

    #[error("Your cart is empty.")]
    EmptyCart,

    #[error("Your order is already being placed.")]
    AlreadySubmitting,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Where the checkout flow currently stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutState {
    /// Form is open; no request in flight.
    Editing,
    /// Exactly one order request is in flight.
    Submitting,
    /// The order was accepted.
    Succeeded,
    /// The submission failed; the message is user-visible.
    Failed(String),
}

/// The checkout state machine.
#[derive(Debug)]
pub struct CheckoutFlow {
    state: CheckoutState,
    attempt: u64,
}

impl Default for CheckoutFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckoutFlow {
    /// Start in `Editing`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: CheckoutState::Editing,
            attempt: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> &CheckoutState {
        &self.state
    }

    /// Whether a request is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.state == CheckoutState::Submitting
    }

    /// Begin a submission, returning its attempt number.
    ///
    /// Fails if one is already in flight; this is the duplicate-submit guard.
    pub fn begin(&mut self) -> Result<u64, CheckoutError> {
        if self.is_submitting() {
            return Err(CheckoutError::AlreadySubmitting);
        }
        self.attempt += 1;
        self.state = CheckoutState::Submitting;
        Ok(self.attempt)
    }

    /// Record a successful response for `attempt`.
    ///
    /// Returns `false` (leaving the state untouched) if the response belongs
    /// to a superseded attempt.
    pub fn complete(&mut self, attempt: u64) -> bool {
        if attempt != self.attempt || !self.is_submitting() {
            return false;
        }
        self.state = CheckoutState::Succeeded;
        true
    }

    /// Record a failed response for `attempt`. Stale responses are dropped.
    pub fn fail(&mut self, attempt: u64, message: impl Into<String>) -> bool {
        if attempt != self.attempt || !self.is_submitting() {
            return false;
        }
        self.state = CheckoutState::Failed(message.into());
        true
    }

    /// Return to `Editing`, e.g. when the form is reopened. An in-flight
    /// attempt is abandoned; its eventual response will be ignored.
    pub fn reset(&mut self) {
        self.state = CheckoutState::Editing;
    }
}

/// Locally cached order history, newest first.
#[derive(Debug, Default)]
pub struct OrderHistory {
    orders: Vec<Order>,
}

impl OrderHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the history with a freshly fetched list.
    pub fn replace(&mut self, orders: Vec<Order>) {
        self.orders = orders;
    }

    /// Prepend a just-placed order.
    pub fn prepend(&mut self, order: Order) {
        self.orders.insert(0, order);
    }

    /// Drop all orders, on logout.
    pub fn clear(&mut self) {
        self.orders.clear();
    }

    /// Orders, newest first.
    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use denfit_core::{CustomerDetails, OrderId, OrderStatus, ShippingAddress, UserId};

    fn order(id: i32) -> Order {
        Order {
            id: OrderId::new(id),
            user: UserId::new(1),
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
            total_amount: Decimal::new(8499, 2),
            status: OrderStatus::Confirmed,
            delivered_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_flat_shipping_is_five_dollars() {
        assert_eq!(FLAT_SHIPPING, Decimal::new(500, 2));
    }

    #[test]
    fn test_happy_path() {
        let mut flow = CheckoutFlow::new();
        let attempt = flow.begin().unwrap();
        assert!(flow.is_submitting());
        assert!(flow.complete(attempt));
        assert_eq!(*flow.state(), CheckoutState::Succeeded);
    }

    #[test]
    fn test_double_begin_is_rejected() {
        let mut flow = CheckoutFlow::new();
        flow.begin().unwrap();
        assert!(matches!(
            flow.begin(),
            Err(CheckoutError::AlreadySubmitting)
        ));
    }

    #[test]
    fn test_failure_keeps_message() {
        let mut flow = CheckoutFlow::new();
        let attempt = flow.begin().unwrap();
        assert!(flow.fail(attempt, "No order items"));
        assert_eq!(
            *flow.state(),
            CheckoutState::Failed("No order items".to_owned())
        );
    }

    #[test]
    fn test_stale_response_is_ignored() {
        let mut flow = CheckoutFlow::new();
        let stale = flow.begin().unwrap();
        flow.reset();
        let current = flow.begin().unwrap();

        assert!(!flow.complete(stale));
        assert!(flow.is_submitting());
        assert!(flow.complete(current));
    }

    #[test]
    fn test_response_after_reset_is_ignored() {
        let mut flow = CheckoutFlow::new();
        let attempt = flow.begin().unwrap();
        flow.reset();
        assert!(!flow.fail(attempt, "timeout"));
        assert_eq!(*flow.state(), CheckoutState::Editing);
    }

    #[test]
    fn test_history_prepend_is_newest_first() {
        let mut history = OrderHistory::new();
        history.replace(vec![order(1)]);
        history.prepend(order(2));
        assert_eq!(history.orders()[0].id, OrderId::new(2));

        history.clear();
        assert!(history.orders().is_empty());
    }
}
