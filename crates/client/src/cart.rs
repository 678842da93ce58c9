//! Cart and wishlist stores.
//!
//! A cart line is uniquely keyed by (product, size, color): adding the same
//! combination again merges into the existing line. Quantity never reaches
//! zero in a stored line; an update to zero removes the line instead. All
//! mutations are synchronous and immediately observable.

use denfit_core::{Product, ProductId};
use rust_decimal::Decimal;

/// Composite identity of a cart line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineKey {
    pub product_id: ProductId,
    pub size: String,
    pub color: String,
}

impl LineKey {
    /// Build a key from its parts.
    #[must_use]
    pub fn new(product_id: ProductId, size: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            product_id,
            size: size.into(),
            color: color.into(),
        }
    }
}

/// A line item: a product snapshot plus quantity and chosen variant.
///
/// Invariant: `quantity >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    pub product: Product,
    pub quantity: u32,
    pub size: String,
    pub color: String,
}

impl CartLine {
    /// The composite key identifying this line.
    #[must_use]
    pub fn key(&self) -> LineKey {
        LineKey::new(self.product.id, self.size.clone(), self.color.clone())
    }

    /// Line total (unit price times quantity).
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.product.price * Decimal::from(self.quantity)
    }
}

/// Outcome of an add-to-cart mutation, used by the caller to word the
/// confirmation toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddToCart {
    /// A new line was appended with quantity 1.
    Added,
    /// An existing line's quantity was incremented to this value.
    Merged(u32),
}

/// In-memory cart store. Lines keep insertion order.
#[derive(Debug, Default)]
pub struct CartStore {
    lines: Vec<CartLine>,
}

impl CartStore {
    /// Create an empty cart.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of (product, size, color), merging into an existing line
    /// if the composite key matches. Always succeeds.
    pub fn add(&mut self, product: Product, size: &str, color: &str) -> AddToCart {
        if let Some(line) = self
            .lines
            .iter_mut()
            .find(|l| l.product.id == product.id && l.size == size && l.color == color)
        {
            line.quantity += 1;
            return AddToCart::Merged(line.quantity);
        }

        self.lines.push(CartLine {
            product,
            quantity: 1,
            size: size.to_owned(),
            color: color.to_owned(),
        });
        AddToCart::Added
    }

    /// Delete a line. No error if absent.
    pub fn remove(&mut self, key: &LineKey) {
        self.lines.retain(|line| line.key() != *key);
    }

    /// Set a line's quantity.
    ///
    /// Zero removes the line; any other value is stored as given (minimum 1).
    /// Absent lines are ignored.
    pub fn update_quantity(&mut self, key: &LineKey, quantity: u32) {
        if quantity == 0 {
            self.remove(key);
            return;
        }
        if let Some(line) = self.lines.iter_mut().find(|l| l.key() == *key) {
            line.quantity = quantity.max(1);
        }
    }

    /// Remove all lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// In-memory wishlist store with set semantics per product id.
#[derive(Debug, Default)]
pub struct WishlistStore {
    items: Vec<Product>,
}

impl WishlistStore {
    /// Create an empty wishlist.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a product. Returns `false` (and leaves the list unchanged) if the
    /// product id is already present.
    pub fn add(&mut self, product: Product) -> bool {
        if self.contains(product.id) {
            return false;
        }
        self.items.push(product);
        true
    }

    /// Idempotent delete by product id.
    pub fn remove(&mut self, product_id: ProductId) {
        self.items.retain(|item| item.id != product_id);
    }

    /// Remove and return a product, for move-to-cart.
    pub fn take(&mut self, product_id: ProductId) -> Option<Product> {
        let pos = self.items.iter().position(|item| item.id == product_id)?;
        Some(self.items.remove(pos))
    }

    /// Whether the product id is present.
    #[must_use]
    pub fn contains(&self, product_id: ProductId) -> bool {
        self.items.iter().any(|item| item.id == product_id)
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[Product] {
        &self.items
    }
}
