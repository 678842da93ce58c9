//! Plain-text bodies for the transactional emails.
//!
//! Each function returns `(subject, body)`.

use denfit_core::Order;

/// Welcome email sent after signup.
#[must_use]
pub fn welcome(name: &str) -> (String, String) {
    (
        "Welcome to DENFIT!".to_owned(),
        format!(
            "Hi {name},\n\n\
             Welcome to DENFIT! Your account is ready.\n\n\
             Browse the latest arrivals any time at https://denfit.com.\n\n\
             The DENFIT Team"
        ),
    )
}

/// Notification sent on each login.
#[must_use]
pub fn login_notification(name: &str) -> (String, String) {
    (
        "New login to your DENFIT account".to_owned(),
        format!(
            "Hi {name},\n\n\
             Your DENFIT account was just signed in to. If this was you, no \
             action is needed.\n\n\
             If you don't recognize this login, please reset your password \
             right away.\n\n\
             The DENFIT Team"
        ),
    )
}

/// Password reset passcode email.
#[must_use]
pub fn reset_passcode(name: &str, passcode: &str) -> (String, String) {
    (
        "Your DENFIT password reset code".to_owned(),
        format!(
            "Hi {name},\n\n\
             Your password reset code is: {passcode}\n\n\
             It expires in 10 minutes. If you didn't request a reset, you can \
             ignore this email.\n\n\
             The DENFIT Team"
        ),
    )
}

/// Order confirmation sent to the checkout contact address.
#[must_use]
pub fn order_confirmation(order: &Order) -> (String, String) {
    let mut lines = String::new();
    for item in &order.items {
        lines.push_str(&format!(
            "  - {} ({} / {}) x{} at ${}\n",
            item.name, item.size, item.color, item.qty, item.price
        ));
    }

    (
        format!("Your DENFIT order #{} is confirmed", order.id),
        format!(
            "Hi {},\n\n\
             Thanks for your order! Here's what you bought:\n\n\
             {lines}\n\
             Total: ${}\n\
             Payment: {}\n\
             Shipping to: {}, {}\n\n\
             We'll let you know when it ships.\n\n\
             The DENFIT Team",
            order.customer.name,
            order.total_amount,
            order.payment_method,
            order.shipping_address.address,
            order.shipping_address.city,
        ),
    )
}
